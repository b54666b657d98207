//! Team form features
//!
//! A team's outcomes are first collapsed to one aggregate per round (points
//! summed, finishing positions averaged over both entries) before the
//! trailing window is applied; reliability comes from the individual entries.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::features::rolling::mean_present;
use crate::ResultRecord;

/// Point-in-time form features for one team.
///
/// `season_points` and `constructor_position` are standings placeholders,
/// zero and mid-grid respectively until computed downstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamForm {
    pub avg_points_last_n: f64,
    pub avg_finish_last_n: f64,
    pub season_points: f64,
    pub constructor_position: f64,
    /// 1 − DNF rate over the team's individual entries
    pub reliability: f64,
}

impl TeamForm {
    pub const DIM: usize = 5;

    pub const NAMES: [&'static str; Self::DIM] = [
        "team_avg_points_last_n",
        "team_avg_finish_last_n",
        "team_season_points",
        "team_constructor_position",
        "team_reliability_rate",
    ];

    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.avg_points_last_n,
            self.avg_finish_last_n,
            self.season_points,
            self.constructor_position,
            self.reliability,
        ]
    }
}

impl Default for TeamForm {
    fn default() -> Self {
        TeamForm {
            avg_points_last_n: 5.0,
            avg_finish_last_n: 10.0,
            season_points: 0.0,
            constructor_position: 5.0,
            reliability: 0.9,
        }
    }
}

/// Compute form features for one team from historical results.
///
/// Only records dated strictly before `as_of` contribute (when given). The
/// window counts team-races, not individual entries.
pub fn team_form(
    results: &[ResultRecord],
    team: &str,
    as_of: Option<NaiveDate>,
    window: usize,
) -> TeamForm {
    let entries: Vec<&ResultRecord> = results
        .iter()
        .filter(|r| r.team == team)
        .filter(|r| as_of.map_or(true, |cutoff| r.date < cutoff))
        .collect();

    if entries.is_empty() {
        return TeamForm::default();
    }

    // One aggregate per round, keyed and therefore ordered by (season, round)
    let mut races: BTreeMap<(u16, u8), (f64, f64, usize)> = BTreeMap::new();
    for r in &entries {
        let entry = races.entry(r.round_key()).or_insert((0.0, 0.0, 0));
        entry.0 += r.points;
        if let Some(p) = r.position {
            entry.1 += p as f64;
            entry.2 += 1;
        }
    }

    let race_rows: Vec<(f64, Option<f64>)> = races
        .into_values()
        .map(|(points, pos_sum, n)| {
            let avg_pos = if n > 0 { Some(pos_sum / n as f64) } else { None };
            (points, avg_pos)
        })
        .collect();

    let recent = &race_rows[race_rows.len().saturating_sub(window)..];

    let dnf_rate = entries.iter().filter(|r| r.is_dnf).count() as f64 / entries.len() as f64;

    TeamForm {
        avg_points_last_n: mean_present(recent.iter().map(|(points, _)| Some(*points))),
        avg_finish_last_n: mean_present(recent.iter().map(|(_, pos)| *pos)),
        season_points: 0.0,
        constructor_position: 5.0,
        reliability: 1.0 - dnf_rate,
    }
}
