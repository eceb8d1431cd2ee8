//! Race loader.
//!
//! Discovers competitor market files in a race directory, extracts each
//! competitor's snapshot in parallel, and enforces race-level integrity:
//! - regular `.csv` files only, minus the exclusion substring and anything
//!   under the minimum size (undersized recordings are skipped, not errored)
//! - competitor identity taken from the `will-<name>-win-` file naming
//! - exactly one winner per race, checked only after every competitor's
//!   extraction has completed

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::snapshot::{extract_snapshot, SessionBoundaries, SnapshotError};
use super::ticks::{read_ticks, TickError};
use super::types::{DriverSnapshot, Race};

/// Market file naming pattern carrying the competitor identity.
const COMPETITOR_PATTERN: &str = r"will-(.+?)-win-";

/// Extension competitor market files are stored under.
const MARKET_FILE_EXTENSION: &str = "csv";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("unable to read race directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to determine size of {path:?}: {source}")]
    FileSize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to extract competitor name from {file}")]
    CompetitorName { file: String },

    #[error(transparent)]
    Ticks(#[from] TickError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("race {race} settled with {count} winners, expected exactly one")]
    WinnerCount { race: String, count: usize },
}

/// Tunables for race discovery and snapshot extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderConfig {
    /// Files smaller than this are treated as empty or truncated market
    /// recordings and skipped.
    #[serde(default = "default_min_file_size")]
    pub min_file_size: u64,

    /// Settlement prices strictly above this imply the market resolved in
    /// the competitor's favor.
    #[serde(default = "default_winner_price_limit")]
    pub winner_price_limit: f64,

    /// Substring marking known non-competitor files in a race directory.
    #[serde(default = "default_exclude")]
    pub exclude: String,
}

fn default_min_file_size() -> u64 {
    1024
}

fn default_winner_price_limit() -> f64 {
    0.95
}

fn default_exclude() -> String {
    "another".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            min_file_size: default_min_file_size(),
            winner_price_limit: default_winner_price_limit(),
            exclude: default_exclude(),
        }
    }
}

/// Loads races from the historical market archive.
pub struct RaceLoader {
    source_root: PathBuf,
    config: LoaderConfig,
    name_pattern: Regex,
}

impl RaceLoader {
    pub fn new(source_root: impl Into<PathBuf>, config: LoaderConfig) -> Self {
        Self {
            source_root: source_root.into(),
            config,
            name_pattern: Regex::new(COMPETITOR_PATTERN).expect("competitor pattern compiles"),
        }
    }

    /// Load one race from its directory under the source root.
    ///
    /// Competitor extraction is embarrassingly parallel; results are
    /// collected in discovery order and the winner-count invariant is only
    /// evaluated once every competitor is in.
    pub fn load_race(
        &self,
        relative_path: &str,
        boundaries: &SessionBoundaries,
    ) -> Result<Race, LoaderError> {
        let directory = self.source_root.join(relative_path);
        let paths = self.discover_market_files(&directory)?;

        let drivers: Vec<DriverSnapshot> = paths
            .par_iter()
            .map(|path| self.load_driver(path, boundaries))
            .collect::<Result<_, _>>()?;

        let winner_count = drivers.iter().filter(|d| d.winner).count();
        if winner_count != 1 {
            return Err(LoaderError::WinnerCount {
                race: relative_path.to_string(),
                count: winner_count,
            });
        }

        Ok(Race {
            name: relative_path.to_string(),
            drivers,
        })
    }

    /// List retained competitor market files, sorted for determinism
    /// (`fs::read_dir` order is platform-dependent).
    fn discover_market_files(&self, directory: &Path) -> Result<Vec<PathBuf>, LoaderError> {
        let entries = fs::read_dir(directory).map_err(|source| LoaderError::ReadDir {
            path: directory.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LoaderError::ReadDir {
                path: directory.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(MARKET_FILE_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.contains(&self.config.exclude) {
                continue;
            }
            let metadata = entry.metadata().map_err(|source| LoaderError::FileSize {
                path: path.clone(),
                source,
            })?;
            if metadata.len() < self.config.min_file_size {
                debug!(
                    "skipping undersized market file {} ({} bytes)",
                    path.display(),
                    metadata.len()
                );
                continue;
            }
            paths.push(path);
        }
        paths.sort();
        Ok(paths)
    }

    fn load_driver(
        &self,
        path: &Path,
        boundaries: &SessionBoundaries,
    ) -> Result<DriverSnapshot, LoaderError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let name = self
            .name_pattern
            .captures(file_name)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| LoaderError::CompetitorName {
                file: file_name.to_string(),
            })?;

        let ticks = read_ticks(path)?;
        let snapshot = extract_snapshot(
            &name,
            &path.display().to_string(),
            &ticks,
            boundaries,
            self.config.winner_price_limit,
        )?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::io::Write;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap()
    }

    fn boundaries() -> SessionBoundaries {
        SessionBoundaries {
            practice: at(5),
            qualifying: at(15),
            race: at(25),
        }
    }

    /// Market file whose settlement price decides the winner flag.
    fn write_market_file(dir: &Path, file_name: &str, settlement: f64) {
        let mut contents = String::from("timestamp,price\n");
        contents.push_str("2025-03-01 12:00:00,0.10\n");
        contents.push_str("2025-03-01 12:10:00,0.30\n");
        contents.push_str("2025-03-01 12:20:00,0.60\n");
        contents.push_str(&format!("2025-03-01 12:30:00,{settlement}\n"));
        let mut file = fs::File::create(dir.join(file_name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    fn small_loader(root: &Path) -> RaceLoader {
        // Fixture files are tiny; disable the size filter unless a test
        // exercises it.
        let config = LoaderConfig {
            min_file_size: 1,
            ..LoaderConfig::default()
        };
        RaceLoader::new(root, config)
    }

    #[test]
    fn test_load_race_assembles_field() {
        let root = tempfile::tempdir().unwrap();
        let race_dir = root.path().join("2025-monza");
        fs::create_dir(&race_dir).unwrap();
        write_market_file(&race_dir, "will-verstappen-win-the-race.csv", 0.99);
        write_market_file(&race_dir, "will-norris-win-the-race.csv", 0.01);

        let loader = small_loader(root.path());
        let race = loader.load_race("2025-monza", &boundaries()).unwrap();
        assert_eq!(race.name, "2025-monza");
        assert_eq!(race.drivers.len(), 2);
        // Discovery order is sorted by path.
        assert_eq!(race.drivers[0].name, "norris");
        assert_eq!(race.drivers[1].name, "verstappen");
        assert_eq!(race.winner().unwrap().name, "verstappen");
    }

    #[test]
    fn test_load_race_rejects_zero_winners() {
        let root = tempfile::tempdir().unwrap();
        let race_dir = root.path().join("2025-monza");
        fs::create_dir(&race_dir).unwrap();
        write_market_file(&race_dir, "will-verstappen-win-the-race.csv", 0.50);
        write_market_file(&race_dir, "will-norris-win-the-race.csv", 0.40);

        let loader = small_loader(root.path());
        let err = loader.load_race("2025-monza", &boundaries()).unwrap_err();
        assert!(matches!(err, LoaderError::WinnerCount { count: 0, .. }));
    }

    #[test]
    fn test_load_race_rejects_multiple_winners() {
        let root = tempfile::tempdir().unwrap();
        let race_dir = root.path().join("2025-monza");
        fs::create_dir(&race_dir).unwrap();
        write_market_file(&race_dir, "will-verstappen-win-the-race.csv", 0.99);
        write_market_file(&race_dir, "will-norris-win-the-race.csv", 0.98);

        let loader = small_loader(root.path());
        let err = loader.load_race("2025-monza", &boundaries()).unwrap_err();
        assert!(matches!(err, LoaderError::WinnerCount { count: 2, .. }));
    }

    #[test]
    fn test_discovery_filters_extension_exclusion_and_size() {
        let root = tempfile::tempdir().unwrap();
        let race_dir = root.path().join("2025-monza");
        fs::create_dir(&race_dir).unwrap();
        write_market_file(&race_dir, "will-verstappen-win-the-race.csv", 0.99);
        // Wrong extension, excluded substring, and undersized file all drop
        // out of discovery without failing the load.
        write_market_file(&race_dir, "will-norris-win-the-race.txt", 0.98);
        write_market_file(&race_dir, "will-another-driver-win-the-race.csv", 0.97);
        fs::write(race_dir.join("will-stub-win-the-race.csv"), "timestamp,price\n").unwrap();

        let config = LoaderConfig {
            min_file_size: 64,
            ..LoaderConfig::default()
        };
        let loader = RaceLoader::new(root.path(), config);
        let race = loader.load_race("2025-monza", &boundaries()).unwrap();
        assert_eq!(race.drivers.len(), 1);
        assert_eq!(race.drivers[0].name, "verstappen");
    }

    #[test]
    fn test_unmatched_file_name_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let race_dir = root.path().join("2025-monza");
        fs::create_dir(&race_dir).unwrap();
        write_market_file(&race_dir, "verstappen-race-odds.csv", 0.99);

        let loader = small_loader(root.path());
        let err = loader.load_race("2025-monza", &boundaries()).unwrap_err();
        assert!(matches!(err, LoaderError::CompetitorName { .. }));
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let loader = small_loader(root.path());
        let err = loader.load_race("2025-monza", &boundaries()).unwrap_err();
        assert!(matches!(err, LoaderError::ReadDir { .. }));
    }

    #[test]
    fn test_reload_is_bit_identical() {
        let root = tempfile::tempdir().unwrap();
        let race_dir = root.path().join("2025-monza");
        fs::create_dir(&race_dir).unwrap();
        write_market_file(&race_dir, "will-verstappen-win-the-race.csv", 0.99);
        write_market_file(&race_dir, "will-norris-win-the-race.csv", 0.01);
        write_market_file(&race_dir, "will-leclerc-win-the-race.csv", 0.02);

        let loader = small_loader(root.path());
        let first = loader.load_race("2025-monza", &boundaries()).unwrap();
        let second = loader.load_race("2025-monza", &boundaries()).unwrap();
        assert_eq!(first.drivers, second.drivers);
    }
}
