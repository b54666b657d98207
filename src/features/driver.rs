//! Driver form features
//!
//! Recent-form and career statistics for one driver, computed strictly from
//! records before a cutoff.

use chrono::NaiveDate;

use crate::features::rolling::mean_present;
use crate::{DriverId, ResultRecord};

/// Point-in-time form features for one driver.
///
/// `season_points` and `season_position` are carried as placeholders for the
/// standings computation downstream; they are zero on computed vectors and
/// take the backmarker defaults on the missing-history vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverForm {
    pub avg_finish_last_n: f64,
    pub avg_grid_last_n: f64,
    pub avg_points_last_n: f64,
    pub wins_last_n: f64,
    pub podiums_last_n: f64,
    pub points_finishes_last_n: f64,
    pub avg_positions_gained: f64,
    /// Share of DNFs over the full filtered history, not just the window
    pub dnf_rate: f64,
    pub career_races: f64,
    pub career_wins: f64,
    pub career_podiums: f64,
    pub career_points: f64,
    pub season_points: f64,
    pub season_position: f64,
}

impl DriverForm {
    pub const DIM: usize = 14;

    pub const NAMES: [&'static str; Self::DIM] = [
        "avg_finish_last_n",
        "avg_grid_last_n",
        "avg_points_last_n",
        "wins_last_n",
        "podiums_last_n",
        "points_finishes_last_n",
        "avg_positions_gained",
        "dnf_rate",
        "career_races",
        "career_wins",
        "career_podiums",
        "career_points",
        "season_points",
        "season_position",
    ];

    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.avg_finish_last_n,
            self.avg_grid_last_n,
            self.avg_points_last_n,
            self.wins_last_n,
            self.podiums_last_n,
            self.points_finishes_last_n,
            self.avg_positions_gained,
            self.dnf_rate,
            self.career_races,
            self.career_wins,
            self.career_podiums,
            self.career_points,
            self.season_points,
            self.season_position,
        ]
    }
}

/// The missing-history vector: a midfield-to-backmarker prior used instead
/// of nulls when a driver has no qualifying records
impl Default for DriverForm {
    fn default() -> Self {
        DriverForm {
            avg_finish_last_n: 15.0,
            avg_grid_last_n: 15.0,
            avg_points_last_n: 0.0,
            wins_last_n: 0.0,
            podiums_last_n: 0.0,
            points_finishes_last_n: 0.0,
            avg_positions_gained: 0.0,
            dnf_rate: 0.1,
            career_races: 0.0,
            career_wins: 0.0,
            career_podiums: 0.0,
            career_points: 0.0,
            season_points: 0.0,
            season_position: 20.0,
        }
    }
}

/// Compute form features for one driver from historical results.
///
/// Only records dated strictly before `as_of` contribute (when given; the
/// caller may equally pre-filter by round). Recent-form fields use the last
/// `window` races; career fields and the DNF rate use the whole filtered
/// history.
pub fn driver_form(
    results: &[ResultRecord],
    driver: &DriverId,
    as_of: Option<NaiveDate>,
    window: usize,
) -> DriverForm {
    let mut history: Vec<&ResultRecord> = results
        .iter()
        .filter(|r| &r.driver == driver)
        .filter(|r| as_of.map_or(true, |cutoff| r.date < cutoff))
        .collect();

    if history.is_empty() {
        return DriverForm::default();
    }

    history.sort_by(|a, b| a.date.cmp(&b.date).then(a.round_key().cmp(&b.round_key())));

    let recent = &history[history.len().saturating_sub(window)..];

    DriverForm {
        avg_finish_last_n: mean_present(recent.iter().map(|r| r.position.map(f64::from))),
        avg_grid_last_n: mean_present(recent.iter().map(|r| r.grid_position.map(f64::from))),
        avg_points_last_n: mean_present(recent.iter().map(|r| Some(r.points))),
        wins_last_n: recent.iter().filter(|r| r.is_win()).count() as f64,
        podiums_last_n: recent.iter().filter(|r| r.is_podium()).count() as f64,
        points_finishes_last_n: recent.iter().filter(|r| r.is_points_finish()).count() as f64,
        avg_positions_gained: mean_present(recent.iter().map(|r| r.positions_gained)),
        dnf_rate: history.iter().filter(|r| r.is_dnf).count() as f64 / history.len() as f64,
        career_races: history.len() as f64,
        career_wins: history.iter().filter(|r| r.is_win()).count() as f64,
        career_podiums: history.iter().filter(|r| r.is_podium()).count() as f64,
        career_points: history.iter().map(|r| r.points).sum(),
        season_points: 0.0,
        season_position: 0.0,
    }
}
