//! Run configuration loading and validation.

pub mod settings;

pub use settings::{RaceSchedule, Settings, SettingsError};
