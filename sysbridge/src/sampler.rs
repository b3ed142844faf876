//! Host metrics sampling via sysinfo.

use std::path::PathBuf;

use chrono::Utc;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};
use tokio::sync::Mutex;

use crate::error::SampleError;
use crate::snapshot::{DiskUsage, MemoryUsage, Snapshot};

/// Produces one [`Snapshot`] per call.
///
/// Holds persistent `System` and `Disks` handles so CPU usage deltas
/// accumulate across samples and the disk list is refreshed in place
/// rather than rebuilt. Disk usage is read for one fixed mount point,
/// matching the wire format's single `disk` object.
pub struct MetricsSource {
    sys: Mutex<System>,
    disks: Mutex<Disks>,
    mount_point: PathBuf,
}

impl MetricsSource {
    pub fn new(mount_point: PathBuf) -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything());
        let mut sys = System::new_with_specifics(refresh_kind);
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        Self {
            sys: Mutex::new(sys),
            disks: Mutex::new(Disks::new_with_refreshed_list()),
            mount_point,
        }
    }

    /// Sample the host. Blocks (asynchronously) for the minimum CPU
    /// sampling interval between two refreshes — an intentional wait,
    /// since CPU percent is meaningless from a single observation.
    pub async fn sample(&self) -> Result<Snapshot, SampleError> {
        let mut sys = self.sys.lock().await;

        sys.refresh_cpu_usage();
        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let cpu_percent = sys.global_cpu_usage().clamp(0.0, 100.0);

        let total = sys.total_memory();
        let available = sys.available_memory();
        let used = total.saturating_sub(available);
        let percent = if total == 0 {
            0.0
        } else {
            (used as f64 / total as f64 * 100.0) as f32
        };
        let memory = MemoryUsage {
            total,
            available,
            percent: percent.clamp(0.0, 100.0),
        };

        let disk = self.disk_usage().await?;

        Ok(Snapshot {
            timestamp: Utc::now(),
            cpu_percent,
            memory,
            disk,
            platform: System::name().unwrap_or_else(|| "unknown".into()),
            platform_release: System::kernel_version().unwrap_or_else(|| "unknown".into()),
            processor: System::cpu_arch(),
        })
    }

    async fn disk_usage(&self) -> Result<DiskUsage, SampleError> {
        let mut disks = self.disks.lock().await;
        disks.refresh(true);
        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == self.mount_point)
            .ok_or_else(|| SampleError::MountPointMissing(self.mount_point.clone()))?;

        let total = disk.total_space();
        let free = disk.available_space();
        Ok(DiskUsage {
            total,
            used: total.saturating_sub(free),
            free,
        })
    }
}
