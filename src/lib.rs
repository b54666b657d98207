//! Race outcome feature engineering
//!
//! Computes leakage-free, point-in-time predictive features from historical
//! race results and lap data, and assembles them into a training dataset.

pub mod data;
pub mod dataset;
pub mod features;

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Driver identifier (three-letter abbreviation, e.g. "VER")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DriverId(pub String);

impl DriverId {
    pub fn new(id: impl Into<String>) -> Self {
        DriverId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One competitor's outcome in one session, as delivered by the data source.
///
/// Position fields arrive unparsed: timing feeds report retirements and
/// classification quirks as non-numeric strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResult {
    pub season: u16,
    pub round: u8,
    pub grand_prix: String,
    pub driver: DriverId,
    pub full_name: String,
    pub team: String,
    pub position: Option<String>,
    pub grid_position: Option<String>,
    pub points: Option<f64>,
    pub status: String,
    pub date: NaiveDate,
}

/// A cleaned result record with coerced numerics and derived flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub season: u16,
    pub round: u8,
    pub grand_prix: String,
    pub driver: DriverId,
    pub full_name: String,
    pub team: String,
    /// Finishing position; None for unclassified results
    pub position: Option<u32>,
    pub grid_position: Option<u32>,
    /// Grid position minus finishing position (positive = gained places)
    pub positions_gained: Option<f64>,
    pub points: f64,
    pub is_finished: bool,
    pub is_dnf: bool,
    pub date: NaiveDate,
}

impl ResultRecord {
    /// Sort key for strict (season, round) chronology
    pub fn round_key(&self) -> (u16, u8) {
        (self.season, self.round)
    }

    pub fn is_win(&self) -> bool {
        self.position == Some(1)
    }

    pub fn is_podium(&self) -> bool {
        matches!(self.position, Some(p) if p <= 3)
    }

    pub fn is_points_finish(&self) -> bool {
        matches!(self.position, Some(p) if p <= 10)
    }
}

/// One lap by one driver, as delivered by the data source.
///
/// Timing gaps and malformed values both surface as `None` durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLap {
    pub driver: DriverId,
    /// 1-based, monotonic within a session per driver
    pub lap_number: u32,
    pub lap_time: Option<Duration>,
    pub sector1_time: Option<Duration>,
    pub sector2_time: Option<Duration>,
    pub sector3_time: Option<Duration>,
    /// Tire compound; changes mark stint boundaries
    pub compound: Option<String>,
    pub pit_in_time: Option<Duration>,
    pub pit_out_time: Option<Duration>,
}

impl RawLap {
    /// Whether this lap touched the pit lane in either direction
    pub fn is_pit_lap(&self) -> bool {
        self.pit_in_time.is_some() || self.pit_out_time.is_some()
    }
}

/// A cleaned lap with times in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lap {
    pub driver: DriverId,
    pub lap_number: u32,
    pub time_secs: f64,
    pub sector1_secs: Option<f64>,
    pub sector2_secs: Option<f64>,
    pub sector3_secs: Option<f64>,
    pub compound: Option<String>,
}

/// One driver's qualifying classification for a round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualiResult {
    pub season: u16,
    pub round: u8,
    pub driver: DriverId,
    pub position: Option<u32>,
    pub q1: Option<Duration>,
    pub q2: Option<Duration>,
    pub q3: Option<Duration>,
}

/// A single telemetry sample; channels missing from the capture are None
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub speed: Option<f64>,
    pub throttle: Option<f64>,
    pub brake: Option<f64>,
    pub gear: Option<u32>,
    pub drs: Option<u32>,
}

/// Crate-wide errors
#[derive(Debug, Error)]
pub enum ApexError {
    #[error("Scaler '{0}' not found - call fit_scaler first")]
    ScalerNotFound(String),

    #[error("Encoder '{0}' not found - call fit_encoder first")]
    EncoderNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ApexError>;

/// Engine configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub cleaning: CleaningConfig,
    pub features: FeatureConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Shortest lap time considered a real flying lap (seconds)
    pub min_lap_time: f64,
    /// Longest lap time considered a real flying lap (seconds)
    pub max_lap_time: f64,
    pub remove_outliers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Trailing window for recent-form statistics (races)
    pub form_window: usize,
    /// Minimum valid laps for a degradation fit
    pub min_stint_laps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub min_rows: usize,
    /// Null share above which a column draws a warning
    pub max_null_fraction: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cleaning: CleaningConfig {
                min_lap_time: 60.0,
                max_lap_time: 180.0,
                remove_outliers: true,
            },
            features: FeatureConfig {
                form_window: 5,
                min_stint_laps: 3,
            },
            validation: ValidationConfig {
                min_rows: 100,
                max_null_fraction: 0.1,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApexError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ApexError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ApexError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
