//! The snapshot document exchanged between publisher and consumer.
//! Keep this module minimal and stable — it defines the wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Memory usage at sampling time. All byte counts, percent in [0, 100].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MemoryUsage {
    pub total: u64,
    pub available: u64,
    pub percent: f32,
}

/// Disk usage for the fixed mount point the publisher watches.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DiskUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

/// One immutable, fully-populated host-metrics document.
///
/// Constructed once by the sampler and never mutated; the consumer side
/// shares it between sessions as `Arc<Snapshot>`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f32,
    pub memory: MemoryUsage,
    pub disk: DiskUsage,
    pub platform: String,
    pub platform_release: String,
    pub processor: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Snapshot {
        Snapshot {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).unwrap(),
            cpu_percent: 12.5,
            memory: MemoryUsage {
                total: 16_000_000_000,
                available: 8_000_000_000,
                percent: 50.0,
            },
            disk: DiskUsage {
                total: 500_000_000_000,
                used: 200_000_000_000,
                free: 300_000_000_000,
            },
            platform: "Linux".into(),
            platform_release: "5.15".into(),
            processor: "x86_64".into(),
        }
    }

    #[test]
    fn wire_field_names_and_nesting() {
        let v: serde_json::Value = serde_json::to_value(sample()).unwrap();
        let obj = v.as_object().unwrap();
        for key in [
            "timestamp",
            "cpu_percent",
            "memory",
            "disk",
            "platform",
            "platform_release",
            "processor",
        ] {
            assert!(obj.contains_key(key), "missing top-level field {key}");
        }
        // Only memory and disk are nested objects.
        assert!(v["memory"].is_object());
        assert!(v["disk"].is_object());
        assert_eq!(v["memory"]["total"], 16_000_000_000u64);
        assert_eq!(v["memory"]["available"], 8_000_000_000u64);
        assert_eq!(v["memory"]["percent"], 50.0);
        assert_eq!(v["disk"]["total"], 500_000_000_000u64);
        assert_eq!(v["disk"]["used"], 200_000_000_000u64);
        assert_eq!(v["disk"]["free"], 300_000_000_000u64);
        assert_eq!(v["cpu_percent"], 12.5);
        assert_eq!(v["platform"], "Linux");
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let original = sample();
        let json = serde_json::to_string(&original).unwrap();
        let decoded: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn timestamp_is_iso8601() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("2024-05-14T09:30:00Z"));
    }

    #[test]
    fn rejects_document_missing_nested_object() {
        let bad = r#"{"timestamp":"2024-05-14T09:30:00Z","cpu_percent":1.0,
            "platform":"Linux","platform_release":"5.15","processor":"x86_64",
            "disk":{"total":1,"used":1,"free":0}}"#;
        assert!(serde_json::from_str::<Snapshot>(bad).is_err());
    }
}
