//! Circuit features
//!
//! Track-level characteristics derived from historical results at a named
//! event, plus a driver's record at that circuit.

use crate::features::rolling::mean_present;
use crate::{DriverId, ResultRecord};

/// Track-level profile for one circuit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitProfile {
    /// Distinct seasons with results at this circuit
    pub races_in_data: f64,
    /// Safety-car likelihood placeholder; needs race-control data to compute
    pub sc_rate: f64,
    /// Mean absolute positions gained: a proxy for how hard overtaking is
    pub avg_position_changes: f64,
    pub dnf_rate: f64,
}

impl CircuitProfile {
    pub const DIM: usize = 4;

    pub const NAMES: [&'static str; Self::DIM] = [
        "circuit_races_in_data",
        "circuit_sc_rate",
        "avg_position_changes",
        "circuit_dnf_rate",
    ];

    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.races_in_data,
            self.sc_rate,
            self.avg_position_changes,
            self.dnf_rate,
        ]
    }
}

impl Default for CircuitProfile {
    fn default() -> Self {
        CircuitProfile {
            races_in_data: 0.0,
            sc_rate: 0.5,
            avg_position_changes: 3.0,
            dnf_rate: 0.1,
        }
    }
}

/// One driver's career record at one circuit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverCircuitForm {
    pub races: f64,
    pub avg_finish: f64,
    pub best_finish: f64,
    pub wins: f64,
    pub podiums: f64,
}

impl DriverCircuitForm {
    pub const DIM: usize = 5;

    pub const NAMES: [&'static str; Self::DIM] = [
        "driver_circuit_races",
        "driver_circuit_avg_finish",
        "driver_circuit_best_finish",
        "driver_circuit_wins",
        "driver_circuit_podiums",
    ];

    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.races,
            self.avg_finish,
            self.best_finish,
            self.wins,
            self.podiums,
        ]
    }
}

impl Default for DriverCircuitForm {
    fn default() -> Self {
        DriverCircuitForm {
            races: 0.0,
            avg_finish: 10.0,
            best_finish: 10.0,
            wins: 0.0,
            podiums: 0.0,
        }
    }
}

/// Compute the track profile from results filtered to the named event
pub fn circuit_profile(results: &[ResultRecord], circuit: &str) -> CircuitProfile {
    let rows: Vec<&ResultRecord> = results
        .iter()
        .filter(|r| r.grand_prix == circuit)
        .collect();

    if rows.is_empty() {
        return CircuitProfile::default();
    }

    let mut seasons: Vec<u16> = rows.iter().map(|r| r.season).collect();
    seasons.sort_unstable();
    seasons.dedup();

    let position_changes = mean_present(rows.iter().map(|r| r.positions_gained.map(f64::abs)));

    CircuitProfile {
        races_in_data: seasons.len() as f64,
        sc_rate: 0.5,
        avg_position_changes: if position_changes.is_nan() {
            3.0
        } else {
            position_changes
        },
        dnf_rate: rows.iter().filter(|r| r.is_dnf).count() as f64 / rows.len() as f64,
    }
}

/// Compute one driver's record at the named event
pub fn driver_circuit_form(
    results: &[ResultRecord],
    circuit: &str,
    driver: &DriverId,
) -> DriverCircuitForm {
    let rows: Vec<&ResultRecord> = results
        .iter()
        .filter(|r| r.grand_prix == circuit && &r.driver == driver)
        .collect();

    if rows.is_empty() {
        return DriverCircuitForm::default();
    }

    let best = rows
        .iter()
        .filter_map(|r| r.position)
        .min()
        .map(f64::from)
        .unwrap_or(f64::NAN);

    DriverCircuitForm {
        races: rows.len() as f64,
        avg_finish: mean_present(rows.iter().map(|r| r.position.map(f64::from))),
        best_finish: best,
        wins: rows.iter().filter(|r| r.is_win()).count() as f64,
        podiums: rows.iter().filter(|r| r.is_podium()).count() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_result(
        season: u16,
        circuit: &str,
        driver: &str,
        position: Option<u32>,
        gained: Option<f64>,
    ) -> ResultRecord {
        ResultRecord {
            season,
            round: 1,
            grand_prix: circuit.to_string(),
            driver: DriverId::new(driver),
            full_name: driver.to_string(),
            team: "Team".to_string(),
            position,
            grid_position: Some(5),
            positions_gained: gained,
            points: 0.0,
            is_finished: position.is_some(),
            is_dnf: position.is_none(),
            date: NaiveDate::from_ymd_opt(season as i32, 5, 28).unwrap(),
        }
    }

    #[test]
    fn test_unknown_circuit_returns_defaults() {
        let profile = circuit_profile(&[], "Jeddah");

        assert_eq!(profile, CircuitProfile::default());
        assert!((profile.avg_position_changes - 3.0).abs() < 1e-9);
        assert!((profile.dnf_rate - 0.1).abs() < 1e-9);
        assert!((profile.sc_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_distinct_seasons_counted_once() {
        let results = vec![
            make_result(2021, "Monaco", "A", Some(1), Some(0.0)),
            make_result(2021, "Monaco", "B", Some(2), Some(1.0)),
            make_result(2022, "Monaco", "A", Some(1), Some(0.0)),
            make_result(2022, "Spa", "A", Some(1), Some(0.0)),
        ];

        let profile = circuit_profile(&results, "Monaco");
        assert!((profile.races_in_data - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_position_changes_use_absolute_values() {
        let results = vec![
            make_result(2022, "Monza", "A", Some(1), Some(4.0)),
            make_result(2022, "Monza", "B", Some(10), Some(-4.0)),
        ];

        let profile = circuit_profile(&results, "Monza");
        assert!((profile.avg_position_changes - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_position_changes_default_when_unavailable() {
        let results = vec![make_result(2022, "Monza", "A", None, None)];

        let profile = circuit_profile(&results, "Monza");
        assert!((profile.avg_position_changes - 3.0).abs() < 1e-9);
        assert!((profile.dnf_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_driver_circuit_record() {
        let results = vec![
            make_result(2020, "Silverstone", "HAM", Some(1), Some(0.0)),
            make_result(2021, "Silverstone", "HAM", Some(3), Some(1.0)),
            make_result(2022, "Silverstone", "HAM", Some(6), Some(-1.0)),
            make_result(2022, "Silverstone", "VER", Some(1), Some(0.0)),
        ];

        let form = driver_circuit_form(&results, "Silverstone", &DriverId::new("HAM"));
        assert!((form.races - 3.0).abs() < 1e-9);
        assert!((form.avg_finish - 10.0 / 3.0).abs() < 1e-9);
        assert!((form.best_finish - 1.0).abs() < 1e-9);
        assert!((form.wins - 1.0).abs() < 1e-9);
        assert!((form.podiums - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_driver_never_raced_here() {
        let results = vec![make_result(2022, "Suzuka", "VER", Some(1), Some(0.0))];

        let form = driver_circuit_form(&results, "Suzuka", &DriverId::new("ROO"));
        assert_eq!(form, DriverCircuitForm::default());
        assert!((form.avg_finish - 10.0).abs() < 1e-9);
        assert!((form.best_finish - 10.0).abs() < 1e-9);
    }
}
