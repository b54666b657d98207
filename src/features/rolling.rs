//! Per-entity rolling-window statistics
//!
//! One pass over a chronologically sorted record stream, with an arena of
//! windows keyed by entity so mixed streams never share state. Windows use
//! minimum-periods semantics: the first row of an entity's history is a
//! window of one, not a gap.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::{DriverId, ResultRecord};

/// Mean over present, finite values; NaN when there are none
pub(crate) fn mean_present(values: impl IntoIterator<Item = Option<f64>>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.into_iter().flatten() {
        if !v.is_nan() {
            sum += v;
            n += 1;
        }
    }
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// A trailing window over the last W observations of one entity
#[derive(Debug, Clone)]
pub struct Rolling {
    window: usize,
    values: VecDeque<Option<f64>>,
}

impl Rolling {
    pub fn new(window: usize) -> Self {
        Rolling {
            window,
            values: VecDeque::with_capacity(window),
        }
    }

    /// Add an observation, evicting the oldest once the window is full
    pub fn push(&mut self, value: Option<f64>) {
        if self.values.len() == self.window {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Mean of present values in the window; NaN when none are present
    pub fn mean(&self) -> f64 {
        mean_present(self.values.iter().copied())
    }

    /// Sum of present values in the window; NaN when none are present
    pub fn sum(&self) -> f64 {
        let present: Vec<f64> = self.values.iter().flatten().copied().collect();
        if present.is_empty() {
            f64::NAN
        } else {
            present.iter().sum()
        }
    }

    /// Observations currently in the window (present or not)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Rolling form windows for one driver
struct FormWindows {
    finish: Rolling,
    grid: Rolling,
    wins: Rolling,
    podiums: Rolling,
    points: Rolling,
    dnfs: Rolling,
}

impl FormWindows {
    fn new(window: usize) -> Self {
        FormWindows {
            finish: Rolling::new(window),
            grid: Rolling::new(window),
            wins: Rolling::new(window),
            podiums: Rolling::new(window),
            points: Rolling::new(window),
            dnfs: Rolling::new(window),
        }
    }
}

/// One result row annotated with the driver's trailing-window form
#[derive(Debug, Clone)]
pub struct DriverFormRow {
    pub record: ResultRecord,
    pub avg_finish: f64,
    pub avg_grid: f64,
    pub wins: f64,
    pub podiums: f64,
    pub points: f64,
    pub dnfs: f64,
}

/// Roll recent-form statistics over each driver's result stream.
///
/// The stream is sorted by (driver, date) once; each driver gets its own
/// window, so statistics never mix entities. Missing positions are skipped
/// by the means and count as false in the win/podium tallies.
pub fn driver_rolling_stats(results: &[ResultRecord], window: usize) -> Vec<DriverFormRow> {
    let mut sorted = results.to_vec();
    sorted.sort_by(|a, b| {
        a.driver
            .cmp(&b.driver)
            .then(a.date.cmp(&b.date))
            .then(a.round_key().cmp(&b.round_key()))
    });

    let mut arena: HashMap<DriverId, FormWindows> = HashMap::new();
    let mut rows = Vec::with_capacity(sorted.len());

    for record in sorted {
        let w = arena
            .entry(record.driver.clone())
            .or_insert_with(|| FormWindows::new(window));

        w.finish.push(record.position.map(|p| p as f64));
        w.grid.push(record.grid_position.map(|p| p as f64));
        w.wins.push(Some(if record.is_win() { 1.0 } else { 0.0 }));
        w.podiums.push(Some(if record.is_podium() { 1.0 } else { 0.0 }));
        w.points.push(Some(record.points));
        w.dnfs.push(Some(if record.is_dnf { 1.0 } else { 0.0 }));

        rows.push(DriverFormRow {
            avg_finish: w.finish.mean(),
            avg_grid: w.grid.mean(),
            wins: w.wins.sum(),
            podiums: w.podiums.sum(),
            points: w.points.sum(),
            dnfs: w.dnfs.sum(),
            record,
        });
    }

    rows
}

/// A team's aggregate outcome for one round: points summed, positions
/// averaged over both entries
#[derive(Debug, Clone)]
pub struct TeamRace {
    pub team: String,
    pub season: u16,
    pub round: u8,
    pub points: f64,
    pub avg_position: f64,
}

/// Collapse individual results into per-(team, season, round) aggregates,
/// ordered by (team, season, round)
pub fn team_race_aggregates(results: &[ResultRecord]) -> Vec<TeamRace> {
    let mut grouped: BTreeMap<(String, u16, u8), (f64, f64, usize)> = BTreeMap::new();

    for r in results {
        let entry = grouped
            .entry((r.team.clone(), r.season, r.round))
            .or_insert((0.0, 0.0, 0));
        entry.0 += r.points;
        if let Some(p) = r.position {
            entry.1 += p as f64;
            entry.2 += 1;
        }
    }

    grouped
        .into_iter()
        .map(|((team, season, round), (points, pos_sum, n))| TeamRace {
            team,
            season,
            round,
            points,
            avg_position: if n > 0 { pos_sum / n as f64 } else { f64::NAN },
        })
        .collect()
}

/// One team-race aggregate annotated with the team's trailing-window form
#[derive(Debug, Clone)]
pub struct TeamFormRow {
    pub race: TeamRace,
    pub avg_points: f64,
    pub avg_finish: f64,
}

/// Roll form statistics over each team's per-race aggregates
pub fn team_rolling_stats(results: &[ResultRecord], window: usize) -> Vec<TeamFormRow> {
    let mut arena: HashMap<String, (Rolling, Rolling)> = HashMap::new();

    team_race_aggregates(results)
        .into_iter()
        .map(|race| {
            let (points_w, finish_w) = arena
                .entry(race.team.clone())
                .or_insert_with(|| (Rolling::new(window), Rolling::new(window)));

            points_w.push(Some(race.points));
            finish_w.push(if race.avg_position.is_nan() {
                None
            } else {
                Some(race.avg_position)
            });

            TeamFormRow {
                avg_points: points_w.mean(),
                avg_finish: finish_w.mean(),
                race,
            }
        })
        .collect()
}
