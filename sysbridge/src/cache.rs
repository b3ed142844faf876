//! Single-slot holder of the most recent snapshot.
//!
//! Exactly one writer (the broker subscription) and any number of
//! readers (viewer sessions). The slot holds an `Arc<Snapshot>` and is
//! replaced wholesale, so a reader either sees a complete previous
//! document or a complete new one — never a mix. The lock is held only
//! long enough to clone the pointer, never across a suspension point.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::snapshot::Snapshot;

/// Latest-value-wins cache. Empty until the first broker delivery.
#[derive(Debug, Default)]
pub struct LatestValueCache {
    slot: RwLock<Option<Arc<Snapshot>>>,
}

impl LatestValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held snapshot. Intermediate values a reader never
    /// polled for are simply gone; that is the delivery policy.
    pub async fn update(&self, snapshot: Snapshot) {
        *self.slot.write().await = Some(Arc::new(snapshot));
    }

    /// Current snapshot, or `None` before the first delivery.
    pub async fn read(&self) -> Option<Arc<Snapshot>> {
        self.slot.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{DiskUsage, MemoryUsage};
    use chrono::Utc;

    /// Snapshot whose numeric fields are all derived from one seed, so
    /// a torn read would show up as a cross-field mismatch.
    fn seeded(seed: u64) -> Snapshot {
        Snapshot {
            timestamp: Utc::now(),
            cpu_percent: (seed % 100) as f32,
            memory: MemoryUsage {
                total: seed,
                available: seed / 2,
                percent: 50.0,
            },
            disk: DiskUsage {
                total: seed,
                used: seed / 2,
                free: seed - seed / 2,
            },
            platform: "Linux".into(),
            platform_release: seed.to_string(),
            processor: "x86_64".into(),
        }
    }

    #[tokio::test]
    async fn empty_before_first_delivery() {
        let cache = LatestValueCache::new();
        assert!(cache.read().await.is_none());
    }

    #[tokio::test]
    async fn read_returns_last_of_many_updates() {
        let cache = LatestValueCache::new();
        for seed in 1..=50u64 {
            cache.update(seeded(seed)).await;
        }
        let held = cache.read().await.expect("cache populated");
        assert_eq!(held.memory.total, 50);
        assert_eq!(held.platform_release, "50");
    }

    #[tokio::test]
    async fn update_replaces_wholesale_never_merges() {
        let cache = LatestValueCache::new();
        cache.update(seeded(7)).await;
        cache.update(seeded(8)).await;
        let held = cache.read().await.unwrap();
        assert_eq!(*held, seeded_fields_only(8, held.as_ref()));
    }

    // Compare everything except the timestamp, which is fresh per call.
    fn seeded_fields_only(seed: u64, held: &Snapshot) -> Snapshot {
        Snapshot {
            timestamp: held.timestamp,
            ..seeded(seed)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_readers_never_observe_torn_snapshots() {
        let cache = Arc::new(LatestValueCache::new());

        let writer = {
            let cache = cache.clone();
            tokio::spawn(async move {
                for seed in 1..=1_000u64 {
                    cache.update(seeded(seed)).await;
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..3 {
            let cache = cache.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..1_000 {
                    if let Some(s) = cache.read().await {
                        // Every field must belong to the same write.
                        assert_eq!(s.memory.total, s.disk.total);
                        assert_eq!(s.platform_release, s.memory.total.to_string());
                        assert_eq!(s.disk.used + s.disk.free, s.disk.total);
                    }
                }
            }));
        }

        writer.await.unwrap();
        for r in readers {
            r.await.unwrap();
        }
        assert_eq!(cache.read().await.unwrap().memory.total, 1_000);
    }
}
