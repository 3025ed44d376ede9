use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for the review engine. Every field has a default, so a partial
/// JSON file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Assets requested per enumeration page.
    pub page_size: usize,
    /// Enumeration stops once this many assets have been pulled.
    pub max_assets: usize,
    pub size_estimate: SizeEstimate,
    /// Non-premium users see the paywall after every Nth decision.
    pub paywall_interval: u32,
    pub storage: StorageThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 500,
            max_assets: 2000,
            size_estimate: SizeEstimate::default(),
            paywall_interval: 3,
            storage: StorageThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Size heuristic for assets whose byte size is unknown:
/// `width * height * bytes_per_pixel / compression_ratio`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeEstimate {
    pub bytes_per_pixel: u64,
    pub compression_ratio: u64,
    /// Used when the dimensions are unknown too.
    pub fallback_bytes: u64,
}

impl Default for SizeEstimate {
    fn default() -> Self {
        Self {
            bytes_per_pixel: 3,
            compression_ratio: 10,
            fallback_bytes: 2_000_000,
        }
    }
}

/// Low-free-space alert thresholds. Whichever trips first wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageThresholds {
    pub cooldown_hours: i64,
    /// Free space at or below this fraction of total is low.
    pub low_ratio: f64,
    /// Free space at or below this many bytes is low.
    pub low_floor_bytes: u64,
}

impl Default for StorageThresholds {
    fn default() -> Self {
        Self {
            cooldown_hours: 24,
            low_ratio: 0.10,
            low_floor_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}
