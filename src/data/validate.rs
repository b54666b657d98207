//! Table validation
//!
//! Checks a table against minimum-size and required-column contracts and
//! reports data-quality statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::table::Tabular;

/// Null share above which a column draws a warning
const NULL_WARN_FRACTION: f64 = 0.1;

/// Summary statistics for a validated table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStats {
    pub row_count: usize,
    pub column_count: usize,
    pub null_counts: BTreeMap<String, usize>,
    pub dtypes: BTreeMap<String, String>,
}

/// Outcome of a validation pass; immutable once produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: TableStats,
}

/// Validate a table against required columns and a minimum row count.
///
/// Row-count and missing-column failures clear the validity flag; columns
/// with more than 10% nulls only draw a warning. Statistics are computed
/// regardless of validity.
pub fn validate(
    table: &(impl Tabular + ?Sized),
    required_columns: &[&str],
    min_rows: usize,
) -> ValidationReport {
    validate_with(table, required_columns, min_rows, NULL_WARN_FRACTION)
}

/// As [`validate`], with an explicit null-warning threshold
pub fn validate_with(
    table: &(impl Tabular + ?Sized),
    required_columns: &[&str],
    min_rows: usize,
    max_null_fraction: f64,
) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let row_count = table.n_rows();
    let columns = table.column_names();

    if row_count < min_rows {
        errors.push(format!(
            "Insufficient data: {} rows (need {})",
            row_count, min_rows
        ));
    }

    let missing: Vec<&str> = required_columns
        .iter()
        .filter(|c| !columns.iter().any(|name| name == *c))
        .copied()
        .collect();
    if !missing.is_empty() {
        errors.push(format!("Missing columns: {:?}", missing));
    }

    let mut null_counts = BTreeMap::new();
    let mut dtypes = BTreeMap::new();
    let mut high_null = Vec::new();

    for column in &columns {
        let nulls = table.null_count(column);
        if nulls as f64 > row_count as f64 * max_null_fraction {
            high_null.push(column.clone());
        }
        null_counts.insert(column.clone(), nulls);
        dtypes.insert(column.clone(), table.dtype_of(column));
    }

    if !high_null.is_empty() {
        warnings.push(format!("High null percentage in: {:?}", high_null));
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        stats: TableStats {
            row_count,
            column_count: columns.len(),
            null_counts,
            dtypes,
        },
    }
}
