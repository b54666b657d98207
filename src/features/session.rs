//! Session features
//!
//! Qualifying-derived grid position and gap to pole, plus practice pace when
//! practice laps are available.

use crate::{DriverId, Lap, QualiResult};

/// Practice pace summary for one driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PracticeForm {
    pub best_lap_time: f64,
    pub avg_lap_time: f64,
    pub lap_count: f64,
}

impl PracticeForm {
    pub const DIM: usize = 3;

    pub const NAMES: [&'static str; Self::DIM] =
        ["fp_best_lap_time", "fp_avg_lap_time", "fp_lap_count"];

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.best_lap_time, self.avg_lap_time, self.lap_count]
    }
}

/// Target-event session features for one driver
#[derive(Debug, Clone, PartialEq)]
pub struct SessionForm {
    pub grid_position: f64,
    /// Best Q3 time minus the pole sitter's, in seconds. Falls back to 1.0
    /// whenever either time is missing; treat that value as an
    /// approximation, not a measured gap.
    pub quali_gap_to_pole: f64,
    /// Present only when practice laps were supplied
    pub practice: Option<PracticeForm>,
}

impl SessionForm {
    pub const DIM: usize = 2;

    pub const NAMES: [&'static str; Self::DIM] = ["grid_position", "quali_gap_to_pole"];

    /// Qualifying block only; the practice block is flattened separately
    /// when the builder was configured with practice data
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.grid_position, self.quali_gap_to_pole]
    }
}

impl Default for SessionForm {
    fn default() -> Self {
        SessionForm {
            grid_position: 10.0,
            quali_gap_to_pole: 1.0,
            practice: None,
        }
    }
}

/// Compute session features for one driver from the target event's
/// qualifying classification and optional practice laps
pub fn session_form(
    quali: &[QualiResult],
    practice: Option<&[Lap]>,
    driver: &DriverId,
) -> SessionForm {
    let mut form = SessionForm::default();

    if let Some(row) = quali.iter().find(|q| &q.driver == driver) {
        form.grid_position = row.position.map(f64::from).unwrap_or(10.0);

        let pole_time = quali
            .iter()
            .find(|q| q.position == Some(1))
            .and_then(|pole| pole.q3);

        if let (Some(pole), Some(own)) = (pole_time, row.q3) {
            form.quali_gap_to_pole = own.as_secs_f64() - pole.as_secs_f64();
        }
    }

    if let Some(laps) = practice {
        let driver_laps: Vec<&Lap> = laps.iter().filter(|l| &l.driver == driver).collect();

        if !driver_laps.is_empty() {
            let times: Vec<f64> = driver_laps
                .iter()
                .map(|l| l.time_secs)
                .filter(|t| t.is_finite())
                .collect();

            let (best, avg) = if times.is_empty() {
                (f64::NAN, f64::NAN)
            } else {
                (
                    times.iter().copied().fold(f64::INFINITY, f64::min),
                    times.iter().sum::<f64>() / times.len() as f64,
                )
            };

            form.practice = Some(PracticeForm {
                best_lap_time: best,
                avg_lap_time: avg,
                lap_count: driver_laps.len() as f64,
            });
        }
    }

    form
}
