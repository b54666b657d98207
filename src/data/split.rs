//! Train/test splits
//!
//! Chronological splitting utilities for the assembled feature table.

use crate::dataset::FeatureTable;

/// Split chronologically at a ratio: the earliest rows train, the latest
/// `test_size` share tests
pub fn time_split(table: &FeatureTable, test_size: f64) -> (FeatureTable, FeatureTable) {
    let sorted = table.sorted_chronological();
    let split_idx = (sorted.len() as f64 * (1.0 - test_size)) as usize;

    let names = sorted.feature_names().to_vec();
    let mut rows = sorted.rows().to_vec();
    let test_rows = rows.split_off(split_idx.min(rows.len()));

    let train = FeatureTable::from_rows(names.clone(), rows);
    let test = FeatureTable::from_rows(names, test_rows);

    log::info!("Split data: {} train, {} test", train.len(), test.len());
    (train, test)
}

/// Split by season membership
pub fn season_split(
    table: &FeatureTable,
    train_seasons: &[u16],
    test_seasons: &[u16],
) -> (FeatureTable, FeatureTable) {
    let train = table.filter_seasons(train_seasons);
    let test = table.filter_seasons(test_seasons);

    log::info!(
        "Split by season: {} train {:?}, {} test {:?}",
        train.len(),
        train_seasons,
        test.len(),
        test_seasons
    );
    (train, test)
}
