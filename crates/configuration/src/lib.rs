use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    BacktestOverrides, BacktestSettings, DataSettings, DataSourceKind, LoggingSettings, Settings,
};

/// Loads the application configuration.
///
/// Reads `path` (or `config.toml` in the working directory when `None`), then
/// layers `MOMN__SECTION__KEY` environment variables on top and deserializes the
/// result into [`Settings`].
///
/// The result is not validated: callers apply any [`BacktestOverrides`] first and
/// then call [`Settings::validate`].
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p),
        None => config::File::with_name("config.toml"),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("MOMN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;

    tracing::debug!(
        universe = %settings.backtest.universe,
        method = %settings.backtest.ranking_method,
        "Configuration loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{RankingMethod, RebalanceFrequency, WeightingKind};
    use std::io::Write;

    const SAMPLE: &str = r#"
[backtest]
start_date = "2020-01-01"
end_date = "2023-12-29"
rebalance_frequency = "Quarterly"
universe = "mini"
ranking_method = "avgSharpe12_6_3"

[universes]
mini = ["AAA", "BBB"]
empty = []
"#;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_settings_applies_defaults() {
        let file = write_config(SAMPLE);
        let settings = load_settings(Some(file.path())).unwrap();

        assert_eq!(settings.backtest.rebalance_frequency, RebalanceFrequency::Quarterly);
        assert_eq!(settings.backtest.ranking_method, RankingMethod::AvgSharpe12_6_3);
        assert_eq!(settings.backtest.top_n, 30);
        assert_eq!(settings.backtest.weighting, WeightingKind::Equal);
        assert_eq!(settings.backtest.max_concurrency, 8);
        assert_eq!(settings.data.source, DataSourceKind::JsonDir);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.universe_members().unwrap(), ["AAA", "BBB"]);
    }

    #[test]
    fn test_validation_rejects_inverted_dates() {
        let file = write_config(&SAMPLE.replace("2023-12-29", "2019-12-31"));
        let settings = load_settings(Some(file.path())).unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validation_rejects_empty_or_unknown_universe() {
        let file = write_config(&SAMPLE.replace("universe = \"mini\"", "universe = \"empty\""));
        let settings = load_settings(Some(file.path())).unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::ValidationError(_))));

        let file = write_config(&SAMPLE.replace("universe = \"mini\"", "universe = \"nifty500\""));
        let settings = load_settings(Some(file.path())).unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::UnknownUniverse(_))));
    }

    #[test]
    fn test_overrides_can_repair_file_before_validation() {
        let file = write_config(
            &SAMPLE
                .replace("universe = \"mini\"", "universe = \"nifty500\"")
                .replace("2023-12-29", "2019-12-31"),
        );
        let mut settings = load_settings(Some(file.path())).unwrap();

        let overrides = BacktestOverrides {
            universe: Some("mini".to_string()),
            end_date: Some(chrono::NaiveDate::from_ymd_opt(2023, 6, 30).unwrap()),
            ..Default::default()
        };
        overrides.apply(&mut settings);

        settings.validate().unwrap();
        assert_eq!(settings.universe_members().unwrap(), ["AAA", "BBB"]);
    }

    #[test]
    fn test_overrides_replace_only_supplied_fields() {
        let file = write_config(SAMPLE);
        let mut settings = load_settings(Some(file.path())).unwrap();

        let overrides = BacktestOverrides {
            top_n: Some(5),
            ranking_method: Some(RankingMethod::AvgZScore12_6_3),
            ..Default::default()
        };
        overrides.apply(&mut settings);

        assert_eq!(settings.backtest.top_n, 5);
        assert_eq!(settings.backtest.ranking_method, RankingMethod::AvgZScore12_6_3);
        assert_eq!(settings.backtest.rebalance_frequency, RebalanceFrequency::Quarterly);
    }
}
