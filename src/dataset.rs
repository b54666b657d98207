//! Race feature assembly
//!
//! Combines the four feature groups into one row per (season, round, driver)
//! and concatenates races into the training dataset. History is partitioned
//! strictly before the target round, so no record at or after the target can
//! reach a feature.

use serde::{Deserialize, Serialize};

use crate::data::table::Tabular;
use crate::features::{
    circuit_profile, driver_circuit_form, driver_form, session_form, team_form, CircuitProfile,
    DriverCircuitForm, DriverForm, SessionForm, TeamForm,
};
use crate::{DriverId, QualiResult, ResultRecord};

/// Identifying columns of the assembled table, in schema order
pub const KEY_COLUMNS: [&str; 5] = ["Season", "Round", "GrandPrix", "Driver", "Team"];

/// Target-label columns of the assembled table, in schema order
pub const TARGET_COLUMNS: [&str; 5] = ["Position", "Points", "IsWinner", "IsPodium", "IsPoints"];

/// Key columns that carry categorical values and can be label-encoded
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["GrandPrix", "Driver", "Team"];

/// Target labels for one race entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RaceTarget {
    pub position: Option<u32>,
    pub points: f64,
    pub is_winner: bool,
    pub is_podium: bool,
    pub is_points: bool,
}

/// One assembled row: keys, feature values, and targets.
///
/// `values` is aligned with the owning table's feature-name list, so every
/// feature key present in one row is present in every row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    pub season: u16,
    pub round: u8,
    pub grand_prix: String,
    pub driver: DriverId,
    pub team: String,
    pub values: Vec<f64>,
    pub target: RaceTarget,
}

/// The assembled feature table: a shared ordered feature-name list plus one
/// row per (season, round, driver)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTable {
    feature_names: Vec<String>,
    rows: Vec<FeatureVector>,
}

impl FeatureTable {
    pub fn new(feature_names: Vec<String>) -> Self {
        FeatureTable {
            feature_names,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(feature_names: Vec<String>, rows: Vec<FeatureVector>) -> Self {
        FeatureTable {
            feature_names,
            rows,
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    /// Values of one feature column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Replace one feature column; false when the column does not exist
    pub fn set_column(&mut self, name: &str, values: &[f64]) -> bool {
        debug_assert_eq!(values.len(), self.rows.len());
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for (row, v) in self.rows.iter_mut().zip(values) {
            row.values[idx] = *v;
        }
        true
    }

    /// Append a new feature column to every row
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.feature_names.push(name.into());
        for (row, v) in self.rows.iter_mut().zip(values) {
            row.values.push(v);
        }
    }

    /// Categorical key value of one row, for the encodable key columns
    pub fn key_value(&self, row: usize, column: &str) -> Option<&str> {
        let r = self.rows.get(row)?;
        match column {
            "GrandPrix" => Some(&r.grand_prix),
            "Driver" => Some(r.driver.as_str()),
            "Team" => Some(&r.team),
            _ => None,
        }
    }

    pub fn push(&mut self, row: FeatureVector) {
        debug_assert_eq!(row.values.len(), self.feature_names.len());
        self.rows.push(row);
    }

    /// Append all rows of another table built with the same feature set
    pub fn extend(&mut self, other: FeatureTable) {
        debug_assert_eq!(self.feature_names, other.feature_names);
        self.rows.extend(other.rows);
    }

    /// Copy of the table ordered by (season, round)
    pub fn sorted_chronological(&self) -> FeatureTable {
        let mut rows = self.rows.clone();
        rows.sort_by_key(|r| (r.season, r.round));
        FeatureTable::from_rows(self.feature_names.clone(), rows)
    }

    /// Copy of the table restricted to the given seasons
    pub fn filter_seasons(&self, seasons: &[u16]) -> FeatureTable {
        let rows = self
            .rows
            .iter()
            .filter(|r| seasons.contains(&r.season))
            .cloned()
            .collect();
        FeatureTable::from_rows(self.feature_names.clone(), rows)
    }
}

impl Tabular for FeatureTable {
    fn n_rows(&self) -> usize {
        self.rows.len()
    }

    fn column_names(&self) -> Vec<String> {
        KEY_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.feature_names.iter().cloned())
            .chain(TARGET_COLUMNS.iter().map(|c| c.to_string()))
            .collect()
    }

    fn null_count(&self, column: &str) -> usize {
        if column == "Position" {
            return self.rows.iter().filter(|r| r.target.position.is_none()).count();
        }
        if let Some(idx) = self.column_index(column) {
            return self.rows.iter().filter(|r| r.values[idx].is_nan()).count();
        }
        0
    }

    fn dtype_of(&self, column: &str) -> String {
        let dtype = match column {
            "Season" | "Round" | "Position" => "int",
            "GrandPrix" | "Driver" | "Team" => "str",
            "IsWinner" | "IsPodium" | "IsPoints" => "bool",
            _ if self.column_index(column).is_some() || column == "Points" => "float",
            _ => "unknown",
        };
        dtype.to_string()
    }
}

/// Feature-name list produced by the race builder, in row-value order
pub fn race_feature_names() -> Vec<String> {
    DriverForm::NAMES
        .iter()
        .chain(CircuitProfile::NAMES.iter())
        .chain(DriverCircuitForm::NAMES.iter())
        .chain(TeamForm::NAMES.iter())
        .chain(SessionForm::NAMES.iter())
        .map(|s| s.to_string())
        .collect()
}

/// Build the feature table for one target race.
///
/// Historical records are those strictly before (season, round); the
/// competitor list and targets come from the target race's own records.
/// A target round with no records yields an empty table, reported at warn
/// level rather than as an error.
pub fn build_race_features(
    results: &[ResultRecord],
    quali: &[QualiResult],
    target_season: u16,
    target_round: u8,
    window: usize,
) -> FeatureTable {
    let target_key = (target_season, target_round);
    let mut table = FeatureTable::new(race_feature_names());

    let target_rows: Vec<&ResultRecord> = results
        .iter()
        .filter(|r| r.round_key() == target_key)
        .collect();

    if target_rows.is_empty() {
        log::warn!(
            "No results for season {} round {}",
            target_season,
            target_round
        );
        return table;
    }

    let historical: Vec<ResultRecord> = results
        .iter()
        .filter(|r| r.round_key() < target_key)
        .cloned()
        .collect();

    let circuit = target_rows[0].grand_prix.clone();

    // Competitors in order of first appearance
    let mut drivers: Vec<DriverId> = Vec::new();
    for row in &target_rows {
        if !drivers.contains(&row.driver) {
            drivers.push(row.driver.clone());
        }
    }

    for driver in &drivers {
        let Some(row) = target_rows.iter().find(|r| &r.driver == driver) else {
            continue;
        };

        let driver_feats = driver_form(&historical, driver, None, window);
        let circuit_feats = circuit_profile(&historical, &circuit);
        let at_circuit = driver_circuit_form(&historical, &circuit, driver);
        let team_feats = team_form(&historical, &row.team, None, window);
        let session_feats = session_form(quali, None, driver);

        let mut values = driver_feats.to_vec();
        values.extend(circuit_feats.to_vec());
        values.extend(at_circuit.to_vec());
        values.extend(team_feats.to_vec());
        values.extend(session_feats.to_vec());

        table.push(FeatureVector {
            season: target_season,
            round: target_round,
            grand_prix: circuit.clone(),
            driver: driver.clone(),
            team: row.team.clone(),
            values,
            target: RaceTarget {
                position: row.position,
                points: row.points,
                is_winner: row.is_win(),
                is_podium: row.is_podium(),
                is_points: row.is_points_finish(),
            },
        });
    }

    table
}

/// Build the full training dataset over every round of the requested
/// seasons. A round that fails to assemble is logged and skipped; it never
/// aborts the remaining build.
pub fn build_training_dataset(
    results: &[ResultRecord],
    quali: &[QualiResult],
    seasons: &[u16],
    window: usize,
) -> FeatureTable {
    let mut combined = FeatureTable::new(race_feature_names());

    for &season in seasons {
        let mut rounds: Vec<u8> = results
            .iter()
            .filter(|r| r.season == season)
            .map(|r| r.round)
            .collect();
        rounds.sort_unstable();
        rounds.dedup();

        for round in rounds {
            let race_quali: Vec<QualiResult> = quali
                .iter()
                .filter(|q| q.season == season && q.round == round)
                .cloned()
                .collect();

            let race = build_race_features(results, &race_quali, season, round, window);
            if race.is_empty() {
                log::warn!("Could not build features for {} R{}", season, round);
                continue;
            }
            combined.extend(race);
        }
    }

    log::info!(
        "Built training dataset with {} rows across {} seasons",
        combined.len(),
        seasons.len()
    );
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn make_result(
        season: u16,
        round: u8,
        circuit: &str,
        driver: &str,
        team: &str,
        position: Option<u32>,
        points: f64,
    ) -> ResultRecord {
        ResultRecord {
            season,
            round,
            grand_prix: circuit.to_string(),
            driver: DriverId::new(driver),
            full_name: driver.to_string(),
            team: team.to_string(),
            position,
            grid_position: position,
            positions_gained: Some(0.0),
            points,
            is_finished: position.is_some(),
            is_dnf: position.is_none(),
            date: NaiveDate::from_ymd_opt(season as i32, 3, 1)
                .unwrap()
                .checked_add_days(chrono::Days::new(round as u64 * 14))
                .unwrap(),
        }
    }

    fn make_quali(season: u16, round: u8, driver: &str, position: u32, q3: f64) -> QualiResult {
        QualiResult {
            season,
            round,
            driver: DriverId::new(driver),
            position: Some(position),
            q1: None,
            q2: None,
            q3: Some(Duration::from_secs_f64(q3)),
        }
    }

    fn season_fixture() -> (Vec<ResultRecord>, Vec<QualiResult>) {
        let mut results = Vec::new();
        let mut quali = Vec::new();

        for round in 1..=4 {
            let circuit = format!("GP {}", round);
            results.push(make_result(2023, round, &circuit, "VER", "Red Bull", Some(1), 25.0));
            results.push(make_result(2023, round, &circuit, "HAM", "Mercedes", Some(2), 18.0));
            quali.push(make_quali(2023, round, "VER", 1, 88.0));
            quali.push(make_quali(2023, round, "HAM", 2, 88.4));
        }

        (results, quali)
    }

    #[test]
    fn test_race_assembly_shape() {
        let (results, quali) = season_fixture();
        let race_quali: Vec<QualiResult> =
            quali.iter().filter(|q| q.round == 4).cloned().collect();

        let table = build_race_features(&results, &race_quali, 2023, 4, 5);

        assert_eq!(table.len(), 2);
        assert_eq!(table.feature_names().len(), race_feature_names().len());
        for row in table.rows() {
            assert_eq!(row.values.len(), table.feature_names().len());
            assert_eq!(row.season, 2023);
            assert_eq!(row.round, 4);
            assert_eq!(row.grand_prix, "GP 4");
        }

        let ver = &table.rows()[0];
        assert_eq!(ver.driver.as_str(), "VER");
        assert!(ver.target.is_winner);
        assert!((ver.target.points - 25.0).abs() < 1e-9);

        // Three prior wins in the window
        let wins = table.column("wins_last_n").unwrap();
        assert!((wins[0] - 3.0).abs() < 1e-9);
        assert!((wins[1] - 0.0).abs() < 1e-9);

        // Gap to pole from qualifying
        let gaps = table.column("quali_gap_to_pole").unwrap();
        assert!((gaps[0] - 0.0).abs() < 1e-9);
        assert!((gaps[1] - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_no_leakage_from_target_or_later_rounds() {
        let (mut results, quali) = season_fixture();
        let race_quali: Vec<QualiResult> =
            quali.iter().filter(|q| q.round == 3).cloned().collect();

        let baseline = build_race_features(&results, &race_quali, 2023, 3, 5);

        // Corrupt the target round and a later round with extreme outcomes
        for r in results.iter_mut() {
            if r.round >= 3 && r.driver.as_str() == "VER" {
                r.position = Some(20);
                r.points = 0.0;
            }
        }
        results.push(make_result(2024, 1, "GP X", "VER", "Red Bull", Some(20), 0.0));

        let perturbed = build_race_features(&results, &race_quali, 2023, 3, 5);

        for name in baseline.feature_names() {
            let before = baseline.column(name).unwrap();
            let after = perturbed.column(name).unwrap();
            for (b, a) in before.iter().zip(after.iter()) {
                assert!(
                    (b == a) || (b.is_nan() && a.is_nan()),
                    "feature {} leaked: {} -> {}",
                    name,
                    b,
                    a
                );
            }
        }
    }

    #[test]
    fn test_rookie_gets_default_vector() {
        let (mut results, quali) = season_fixture();
        results.push(make_result(2023, 4, "GP 4", "ROO", "Williams", Some(15), 0.0));

        let race_quali: Vec<QualiResult> =
            quali.iter().filter(|q| q.round == 4).cloned().collect();
        let table = build_race_features(&results, &race_quali, 2023, 4, 5);

        assert_eq!(table.len(), 3);
        let rookie = table
            .rows()
            .iter()
            .position(|r| r.driver.as_str() == "ROO")
            .unwrap();

        let avg_finish = table.column("avg_finish_last_n").unwrap();
        assert!((avg_finish[rookie] - 15.0).abs() < 1e-9);
        let dnf_rate = table.column("dnf_rate").unwrap();
        assert!((dnf_rate[rookie] - 0.1).abs() < 1e-9);
        // Absent from qualifying: session defaults
        let grid = table.column("grid_position").unwrap();
        assert!((grid[rookie] - 10.0).abs() < 1e-9);
        let gap = table.column("quali_gap_to_pole").unwrap();
        assert!((gap[rookie] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_round_yields_empty_table() {
        let (results, _) = season_fixture();
        let table = build_race_features(&results, &[], 2023, 9, 5);

        assert!(table.is_empty());
        assert_eq!(table.feature_names().len(), race_feature_names().len());
    }

    #[test]
    fn test_training_dataset_concatenates_rounds() {
        let (results, quali) = season_fixture();
        let table = build_training_dataset(&results, &quali, &[2023], 5);

        // 4 rounds x 2 drivers
        assert_eq!(table.len(), 8);
        let sorted = table.sorted_chronological();
        assert!(sorted
            .rows()
            .windows(2)
            .all(|w| (w[0].season, w[0].round) <= (w[1].season, w[1].round)));
    }

    #[test]
    fn test_training_dataset_skips_unknown_season() {
        let (results, quali) = season_fixture();
        let table = build_training_dataset(&results, &quali, &[2022, 2023], 5);

        // 2022 contributes nothing but does not abort the build
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_filter_seasons() {
        let (mut results, mut quali) = season_fixture();
        results.push(make_result(2024, 1, "GP 1", "VER", "Red Bull", Some(1), 25.0));
        quali.push(make_quali(2024, 1, "VER", 1, 87.5));

        let table = build_training_dataset(&results, &quali, &[2023, 2024], 5);
        let only_2024 = table.filter_seasons(&[2024]);

        assert_eq!(only_2024.len(), 1);
        assert_eq!(only_2024.rows()[0].season, 2024);
    }

    #[test]
    fn test_tabular_view_of_feature_table() {
        let (results, quali) = season_fixture();
        let table = build_training_dataset(&results, &quali, &[2023], 5);

        let columns = table.column_names();
        assert!(columns.contains(&"Season".to_string()));
        assert!(columns.contains(&"avg_finish_last_n".to_string()));
        assert!(columns.contains(&"IsWinner".to_string()));
        assert_eq!(table.dtype_of("avg_finish_last_n"), "float");
        assert_eq!(table.null_count("Position"), 0);
    }
}
