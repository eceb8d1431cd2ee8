//! Run configuration.
//!
//! Settings are an explicit value loaded from a TOML document and handed to
//! the loader and simulator constructors; there is no process-wide
//! configuration state. Validation is fail-fast: a run never starts with
//! ambiguous parameters.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::backtest::{SimulationConfig, StrategyError, StrategyParams};
use crate::data::{LoaderConfig, SessionBoundaries};

/// Timestamp layout used by race schedules, minute resolution.
const SCHEDULE_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("unable to read settings file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("source directory missing from settings")]
    MissingSource,

    #[error("race entry {index} has an empty path")]
    EmptyRacePath { index: usize },

    #[error("race {path}: session times must be strictly increasing (practice < qualifying < race)")]
    UnorderedBoundaries { path: String },

    #[error("strategy {index}: {source}")]
    InvalidStrategy {
        index: usize,
        #[source]
        source: StrategyError,
    },
}

fn deserialize_schedule_time<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, SCHEDULE_TIME_LAYOUT).map_err(serde::de::Error::custom)
}

/// One race directory and its session cutoffs.
#[derive(Debug, Clone, Deserialize)]
pub struct RaceSchedule {
    /// Directory under the source root holding the race's market files.
    pub path: String,

    #[serde(deserialize_with = "deserialize_schedule_time")]
    pub practice: NaiveDateTime,

    #[serde(deserialize_with = "deserialize_schedule_time")]
    pub qualifying: NaiveDateTime,

    #[serde(deserialize_with = "deserialize_schedule_time")]
    pub race: NaiveDateTime,
}

impl RaceSchedule {
    pub fn boundaries(&self) -> SessionBoundaries {
        SessionBoundaries {
            practice: self.practice,
            qualifying: self.qualifying,
            race: self.race,
        }
    }
}

/// Complete configuration for a backtest run.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root directory of the historical market archive.
    #[serde(default)]
    pub source: PathBuf,

    #[serde(default)]
    pub races: Vec<RaceSchedule>,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Strategies the backtest command replays, in order.
    #[serde(default)]
    pub strategies: Vec<StrategyParams>,
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.source.as_os_str().is_empty() {
            return Err(SettingsError::MissingSource);
        }
        for (index, schedule) in self.races.iter().enumerate() {
            if schedule.path.is_empty() {
                return Err(SettingsError::EmptyRacePath { index });
            }
            let ordered = schedule.practice < schedule.qualifying
                && schedule.qualifying < schedule.race;
            if !ordered {
                return Err(SettingsError::UnorderedBoundaries {
                    path: schedule.path.clone(),
                });
            }
        }
        for (index, strategy) in self.strategies.iter().enumerate() {
            strategy
                .validate()
                .map_err(|source| SettingsError::InvalidStrategy { index, source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
source = "data/races"

[[races]]
path = "2025-monza"
practice = "2025-09-05 11:30"
qualifying = "2025-09-06 14:00"
race = "2025-09-07 13:00"

[loader]
min_file_size = 2048

[simulation]
spread = 0.03

[[strategies]]
session = "race"
bets = [{ rank = 1, direction = "against" }]
"#;

    fn parse(contents: &str) -> Result<Settings, SettingsError> {
        let settings: Settings =
            toml::from_str(contents).map_err(|source| SettingsError::Parse {
                path: PathBuf::from("test.toml"),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    #[test]
    fn test_parse_valid_settings() {
        let settings = parse(VALID).unwrap();
        assert_eq!(settings.source, PathBuf::from("data/races"));
        assert_eq!(settings.races.len(), 1);
        assert_eq!(settings.loader.min_file_size, 2048);
        // Untouched tunables keep their defaults.
        assert_eq!(settings.loader.winner_price_limit, 0.95);
        assert_eq!(settings.simulation.spread, 0.03);
        assert_eq!(settings.simulation.position_size, 0.2);
        assert_eq!(settings.strategies.len(), 1);
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let contents = VALID.replace("source = \"data/races\"", "");
        assert!(matches!(
            parse(&contents).unwrap_err(),
            SettingsError::MissingSource
        ));
    }

    #[test]
    fn test_missing_timestamp_is_fatal() {
        let contents = VALID.replace("qualifying = \"2025-09-06 14:00\"\n", "");
        assert!(matches!(
            parse(&contents).unwrap_err(),
            SettingsError::Parse { .. }
        ));
    }

    #[test]
    fn test_unordered_boundaries_are_fatal() {
        let contents = VALID.replace(
            "qualifying = \"2025-09-06 14:00\"",
            "qualifying = \"2025-09-07 14:00\"",
        );
        assert!(matches!(
            parse(&contents).unwrap_err(),
            SettingsError::UnorderedBoundaries { .. }
        ));
    }

    #[test]
    fn test_equal_boundaries_are_fatal() {
        let contents = VALID.replace(
            "practice = \"2025-09-05 11:30\"",
            "practice = \"2025-09-06 14:00\"",
        );
        assert!(matches!(
            parse(&contents).unwrap_err(),
            SettingsError::UnorderedBoundaries { .. }
        ));
    }

    #[test]
    fn test_malformed_timestamp_is_fatal() {
        let contents = VALID.replace("2025-09-05 11:30", "session friday");
        assert!(matches!(
            parse(&contents).unwrap_err(),
            SettingsError::Parse { .. }
        ));
    }

    #[test]
    fn test_strategy_without_session_is_fatal() {
        let contents = VALID.replace("session = \"race\"\n", "");
        assert!(matches!(
            parse(&contents).unwrap_err(),
            SettingsError::Parse { .. }
        ));
    }

    #[test]
    fn test_zero_bet_rank_is_fatal() {
        let contents = VALID.replace("rank = 1", "rank = 0");
        assert!(matches!(
            parse(&contents).unwrap_err(),
            SettingsError::InvalidStrategy {
                source: StrategyError::ZeroRank,
                ..
            }
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(VALID.as_bytes()).unwrap();
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.races[0].path, "2025-monza");
        let bounds = settings.races[0].boundaries();
        assert!(bounds.practice < bounds.qualifying);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(Path::new("does-not-exist.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }
}
