//! Recurring trigger configuration.

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Configuration for the two daily triggers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Time zone in which fire times are interpreted.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// Daily ingestion of the collector's drop file.
    #[serde(default = "default_ingestion")]
    pub ingestion: TriggerConfig,
    /// Daily purge of expired postings. Always enabled.
    #[serde(default = "default_expiry")]
    pub expiry: TriggerConfig,
}

/// A single daily trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Disabled triggers still fire, but the fire is a no-op.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Wall-clock fire time, `HH:MM:SS`.
    pub fire_at: NaiveTime,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            ingestion: default_ingestion(),
            expiry: default_expiry(),
        }
    }
}

fn default_timezone() -> Tz {
    Tz::UTC
}

fn default_ingestion() -> TriggerConfig {
    TriggerConfig {
        enabled: true,
        fire_at: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or(NaiveTime::MIN),
    }
}

fn default_expiry() -> TriggerConfig {
    TriggerConfig {
        enabled: true,
        fire_at: NaiveTime::from_hms_opt(1, 0, 0).unwrap_or(NaiveTime::MIN),
    }
}

fn default_true() -> bool {
    true
}
