//! Low-free-space alert with a persisted cooldown.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::StorageThresholds;
use crate::error::Result;
use crate::store::{load_json, save_json, KeyValueStore, LAST_STORAGE_ALERT_KEY};

/// Free and total bytes of the volume holding the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiskSpace {
    pub free: u64,
    pub total: u64,
}

pub trait StorageProbe {
    fn disk_space(&self) -> Result<DiskSpace>;
}

/// Delivers a local notification.
pub trait Notifier {
    fn notify(&mut self, title: &str, body: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageCheck {
    /// An alert went out within the cooldown window; the disk was not probed.
    CoolingDown { last_alert: DateTime<Utc> },
    Healthy(DiskSpace),
    Notified(DiskSpace),
}

pub struct StorageMonitor {
    thresholds: StorageThresholds,
}

impl StorageMonitor {
    pub fn new(thresholds: StorageThresholds) -> Self {
        Self { thresholds }
    }

    pub fn is_low(&self, space: DiskSpace) -> bool {
        let ratio_limit = space.total as f64 * self.thresholds.low_ratio;
        space.free as f64 <= ratio_limit || space.free <= self.thresholds.low_floor_bytes
    }

    /// Probe the disk and notify when space is low, at most once per
    /// cooldown window. The cooldown timestamp is only written once the
    /// notification was delivered.
    pub fn check<K, P, N>(
        &self,
        store: &mut K,
        probe: &P,
        notifier: &mut N,
        now: DateTime<Utc>,
    ) -> Result<StorageCheck>
    where
        K: KeyValueStore + ?Sized,
        P: StorageProbe + ?Sized,
        N: Notifier + ?Sized,
    {
        let last_alert = match load_json::<i64, _>(store, LAST_STORAGE_ALERT_KEY) {
            Ok(value) => value.and_then(DateTime::from_timestamp_millis),
            Err(e) => {
                tracing::warn!("ignoring unreadable storage alert timestamp: {e}");
                None
            }
        };
        let cooldown = Duration::try_hours(self.thresholds.cooldown_hours.max(0))
            .unwrap_or(Duration::MAX);
        if let Some(last_alert) = last_alert {
            if now - last_alert < cooldown {
                tracing::debug!(%last_alert, "storage alert cooling down");
                return Ok(StorageCheck::CoolingDown { last_alert });
            }
        }

        let space = probe.disk_space()?;
        if !self.is_low(space) {
            tracing::debug!(free = space.free, total = space.total, "storage healthy");
            return Ok(StorageCheck::Healthy(space));
        }

        tracing::info!(free = space.free, total = space.total, "storage low, notifying");
        notifier.notify(
            "Storage running low",
            &format!(
                "Only {} free. Swipe through old photos to clear some space.",
                format_gb(space.free)
            ),
        )?;
        save_json(store, LAST_STORAGE_ALERT_KEY, &now.timestamp_millis())?;
        Ok(StorageCheck::Notified(space))
    }
}

fn format_gb(bytes: u64) -> String {
    format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
}
