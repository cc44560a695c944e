//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Reconciliation configuration.
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
    /// Dispute handling configuration.
    #[serde(default)]
    pub disputes: DisputeConfig,
    /// Background job schedule configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Reconciliation tolerance and severity thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// Absolute amount tolerance in minor units before a mismatch is raised.
    #[serde(default = "default_tolerance_minor_units")]
    pub tolerance_minor_units: i64,
    /// Major-unit difference above which a mismatch is HIGH severity.
    #[serde(default = "default_high_severity_major_units")]
    pub high_severity_major_units: Decimal,
    /// Major-unit difference above which a mismatch is MEDIUM severity.
    #[serde(default = "default_medium_severity_major_units")]
    pub medium_severity_major_units: Decimal,
}

fn default_tolerance_minor_units() -> i64 {
    1
}

fn default_high_severity_major_units() -> Decimal {
    Decimal::from(100)
}

fn default_medium_severity_major_units() -> Decimal {
    Decimal::from(10)
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            tolerance_minor_units: default_tolerance_minor_units(),
            high_severity_major_units: default_high_severity_major_units(),
            medium_severity_major_units: default_medium_severity_major_units(),
        }
    }
}

/// Dispute handling thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct DisputeConfig {
    /// Disputed amount in major units above which a ticket is always filed.
    #[serde(default = "default_high_value_major_units")]
    pub high_value_major_units: Decimal,
}

fn default_high_value_major_units() -> Decimal {
    Decimal::from(500)
}

impl Default for DisputeConfig {
    fn default() -> Self {
        Self {
            high_value_major_units: default_high_value_major_units(),
        }
    }
}

/// Background job schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Interval between ledger verification runs, in seconds.
    #[serde(default = "default_verification_interval_secs")]
    pub verification_interval_secs: u64,
    /// Interval between per-provider reconciliation runs, in seconds.
    #[serde(default = "default_reconciliation_interval_secs")]
    pub reconciliation_interval_secs: u64,
}

fn default_verification_interval_secs() -> u64 {
    86_400 // nightly
}

fn default_reconciliation_interval_secs() -> u64 {
    86_400 // daily, per provider
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            verification_interval_secs: default_verification_interval_secs(),
            reconciliation_interval_secs: default_reconciliation_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reconciliation_defaults() {
        let cfg = ReconciliationConfig::default();
        assert_eq!(cfg.tolerance_minor_units, 1);
        assert_eq!(cfg.high_severity_major_units, dec!(100));
        assert_eq!(cfg.medium_severity_major_units, dec!(10));
    }

    #[test]
    fn test_dispute_defaults() {
        let cfg = DisputeConfig::default();
        assert_eq!(cfg.high_value_major_units, dec!(500));
    }

    #[test]
    fn test_scheduler_defaults() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.verification_interval_secs, 86_400);
        assert_eq!(cfg.reconciliation_interval_secs, 86_400);
    }
}
