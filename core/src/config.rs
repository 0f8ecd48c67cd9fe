use crate::error::{DashError, DashResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "dashboard.json";

/// Tunables for one dashboard run. Reference data (sectors, products)
/// is static and lives in `sector` / `product`; only behavior knobs
/// are configurable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    /// First month of the generated historical series.
    #[serde(default = "default_history_start")]
    pub history_start: NaiveDate,
    /// Year whose first half is the onset of the revenue shock.
    #[serde(default = "default_shock_year")]
    pub shock_year: i32,
    /// Per-row probability that a live tick changes the row.
    #[serde(default = "default_live_change_probability")]
    pub live_change_probability: f64,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// Ticks between snapshot checkpoints in the journal.
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: u64,
    /// Ticks of journal events kept behind the current tick. Build
    /// events at tick 0 are always kept.
    #[serde(default = "default_journal_retention_ticks")]
    pub journal_retention_ticks: u64,
    /// Most recent snapshot checkpoints kept in the journal.
    #[serde(default = "default_checkpoint_retention")]
    pub checkpoint_retention: u64,
}

fn default_history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_shock_year() -> i32 {
    2020
}

fn default_live_change_probability() -> f64 {
    0.4
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_snapshot_interval() -> u64 {
    10
}

fn default_journal_retention_ticks() -> u64 {
    120
}

fn default_checkpoint_retention() -> u64 {
    12
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            history_start: default_history_start(),
            shock_year: default_shock_year(),
            live_change_probability: default_live_change_probability(),
            refresh_interval_secs: default_refresh_interval_secs(),
            snapshot_interval: default_snapshot_interval(),
            journal_retention_ticks: default_journal_retention_ticks(),
            checkpoint_retention: default_checkpoint_retention(),
        }
    }
}

impl DashboardConfig {
    /// Load `dashboard.json` from `data_dir`. Missing fields take
    /// their defaults; a missing file is an error.
    pub fn load(data_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = data_dir.as_ref().join(CONFIG_FILE);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        let config = Self::from_json(&content)?;
        log::info!("Loaded dashboard config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> DashResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DashResult<()> {
        if !(0.0..=1.0).contains(&self.live_change_probability) {
            return Err(DashError::InvalidConfig {
                reason: format!(
                    "live_change_probability must be within [0, 1], got {}",
                    self.live_change_probability
                ),
            });
        }
        if self.refresh_interval_secs == 0 {
            return Err(DashError::InvalidConfig {
                reason: "refresh_interval_secs must be > 0".into(),
            });
        }
        if self.snapshot_interval == 0 {
            return Err(DashError::InvalidConfig {
                reason: "snapshot_interval must be > 0".into(),
            });
        }
        if self.journal_retention_ticks == 0 || self.checkpoint_retention == 0 {
            return Err(DashError::InvalidConfig {
                reason: "journal retention bounds must be > 0".into(),
            });
        }
        Ok(())
    }
}
