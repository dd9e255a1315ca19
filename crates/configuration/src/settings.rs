use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::{RankingMethod, RebalanceFrequency, WeightingKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub backtest: BacktestSettings,
    /// Named instrument universes, e.g. `nifty50 = ["RELIANCE.NS", ...]`.
    #[serde(default)]
    pub universes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Contains parameters for a single backtest run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BacktestSettings {
    /// First rebalance date.
    pub start_date: NaiveDate,
    /// Last date covered by the simulation.
    pub end_date: NaiveDate,
    pub rebalance_frequency: RebalanceFrequency,
    /// Key into the `[universes]` table.
    pub universe: String,
    pub ranking_method: RankingMethod,
    /// Number of top-ranked instruments held each period.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub weighting: WeightingKind,
    /// Reference instrument the strategy is compared against.
    pub benchmark: Option<String>,
    /// Calendar days of price history loaded before each rebalance date for ranking.
    #[serde(default = "default_history_days")]
    pub history_days: u32,
    /// Upper bound on concurrent price fetches within one rebalance step.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Optional wall-clock budget, checked between holding periods.
    #[serde(default)]
    pub time_budget_secs: Option<u64>,
}

fn default_top_n() -> usize {
    30
}

fn default_history_days() -> u32 {
    400
}

fn default_max_concurrency() -> usize {
    8
}

/// Where price history is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    /// The `daily_prices` table; `DATABASE_URL` comes from the environment.
    Postgres,
    /// One `<instrument>.json` file per instrument.
    #[default]
    JsonDir,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataSettings {
    #[serde(default)]
    pub source: DataSourceKind,
    #[serde(default = "default_json_dir")]
    pub json_dir: PathBuf,
}

fn default_json_dir() -> PathBuf {
    PathBuf::from("data/prices")
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            source: DataSourceKind::default(),
            json_dir: default_json_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// If set, logs are also written to a daily-rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "momn.log".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

impl Settings {
    /// The instruments of the configured universe.
    pub fn universe_members(&self) -> Result<&[String], ConfigError> {
        self.universes
            .get(&self.backtest.universe)
            .map(Vec::as_slice)
            .ok_or_else(|| ConfigError::UnknownUniverse(self.backtest.universe.clone()))
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bt = &self.backtest;
        if bt.start_date >= bt.end_date {
            return Err(ConfigError::ValidationError(format!(
                "start_date ({}) must be before end_date ({})",
                bt.start_date, bt.end_date
            )));
        }
        if self.universe_members()?.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "universe '{}' has no instruments",
                bt.universe
            )));
        }
        if bt.max_concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Command-line overrides for the `[backtest]` section.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct BacktestOverrides {
    /// Override the start date (format: YYYY-MM-DD).
    #[cfg_attr(feature = "clap", arg(long))]
    pub start_date: Option<NaiveDate>,

    /// Override the end date (format: YYYY-MM-DD).
    #[cfg_attr(feature = "clap", arg(long))]
    pub end_date: Option<NaiveDate>,

    /// Monthly or Quarterly.
    #[cfg_attr(feature = "clap", arg(long))]
    pub frequency: Option<RebalanceFrequency>,

    /// Name of a universe from the [universes] table.
    #[cfg_attr(feature = "clap", arg(long))]
    pub universe: Option<String>,

    /// avgZScore12_6_3, avgSharpe12_6_3 or avgSharpe9_6_3.
    #[cfg_attr(feature = "clap", arg(long))]
    pub ranking_method: Option<RankingMethod>,

    /// Number of instruments held each period.
    #[cfg_attr(feature = "clap", arg(long))]
    pub top_n: Option<usize>,

    /// equal or score_weighted.
    #[cfg_attr(feature = "clap", arg(long))]
    pub weighting: Option<WeightingKind>,

    /// Benchmark instrument id.
    #[cfg_attr(feature = "clap", arg(long))]
    pub benchmark: Option<String>,
}

impl BacktestOverrides {
    /// Applies every override that was supplied, leaving the rest untouched.
    pub fn apply(&self, settings: &mut Settings) {
        let bt = &mut settings.backtest;
        if let Some(v) = self.start_date {
            bt.start_date = v;
        }
        if let Some(v) = self.end_date {
            bt.end_date = v;
        }
        if let Some(v) = self.frequency {
            bt.rebalance_frequency = v;
        }
        if let Some(v) = &self.universe {
            bt.universe = v.clone();
        }
        if let Some(v) = self.ranking_method {
            bt.ranking_method = v;
        }
        if let Some(v) = self.top_n {
            bt.top_n = v;
        }
        if let Some(v) = self.weighting {
            bt.weighting = v;
        }
        if let Some(v) = &self.benchmark {
            bt.benchmark = Some(v.clone());
        }
    }
}
