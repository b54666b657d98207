//! Named scaling and encoding transforms
//!
//! A `Processor` owns every fitted transform, keyed by caller-chosen name,
//! so the fit set and the application set go through the identical
//! missing-value policy (zero fill). Looking up a name that was never fit is
//! a programming error and fails hard.

use std::collections::HashMap;

use crate::dataset::{FeatureTable, CATEGORICAL_COLUMNS};
use crate::{ApexError, Result};

/// A standardizing scaler bound to the columns it was fit on
#[derive(Debug, Clone)]
pub struct FittedScaler {
    columns: Vec<String>,
    means: Vec<f64>,
    scales: Vec<f64>,
}

/// A label encoder bound to the columns and classes it was fit on
#[derive(Debug, Clone)]
pub struct FittedEncoder {
    columns: Vec<String>,
    classes: Vec<Vec<String>>,
}

/// Owner of all fitted transforms for one processing pipeline
#[derive(Debug, Default)]
pub struct Processor {
    scalers: HashMap<String, FittedScaler>,
    encoders: HashMap<String, FittedEncoder>,
}

impl Processor {
    pub fn new() -> Self {
        Processor::default()
    }

    /// Fit a standardizing scaler on the requested columns and return the
    /// transformed table.
    ///
    /// Columns absent from the table are dropped from the fit; missing
    /// values are treated as zero. When none of the columns resolve, the
    /// table is returned untouched and nothing is registered.
    pub fn fit_scaler(&mut self, table: &FeatureTable, columns: &[&str], name: &str) -> FeatureTable {
        let valid: Vec<String> = columns
            .iter()
            .filter(|c| table.column_index(c).is_some())
            .map(|c| c.to_string())
            .collect();

        let mut out = table.clone();
        if valid.is_empty() {
            return out;
        }

        let mut means = Vec::with_capacity(valid.len());
        let mut scales = Vec::with_capacity(valid.len());

        for col in &valid {
            let filled = zero_filled(table, col);
            let (mean, scale) = fit_stats(&filled);
            let scaled: Vec<f64> = filled.iter().map(|v| (v - mean) / scale).collect();
            out.set_column(col, &scaled);
            means.push(mean);
            scales.push(scale);
        }

        self.scalers.insert(
            name.to_string(),
            FittedScaler {
                columns: valid,
                means,
                scales,
            },
        );

        out
    }

    /// Apply a previously fitted scaler to a table.
    ///
    /// Fails when `name` was never fit; columns missing from this table are
    /// skipped, matching the fit-time resolution policy.
    pub fn transform_scaler(&self, table: &FeatureTable, name: &str) -> Result<FeatureTable> {
        let scaler = self
            .scalers
            .get(name)
            .ok_or_else(|| ApexError::ScalerNotFound(name.to_string()))?;

        let mut out = table.clone();
        for (i, col) in scaler.columns.iter().enumerate() {
            if table.column_index(col).is_none() {
                continue;
            }
            let filled = zero_filled(table, col);
            let (mean, scale) = (scaler.means[i], scaler.scales[i]);
            let scaled: Vec<f64> = filled.iter().map(|v| (v - mean) / scale).collect();
            out.set_column(col, &scaled);
        }

        Ok(out)
    }

    /// Fit a label encoder on the requested categorical key columns and
    /// return the table with `{col}_encoded` columns appended.
    ///
    /// Classes are the sorted distinct values seen at fit time.
    pub fn fit_encoder(&mut self, table: &FeatureTable, columns: &[&str], name: &str) -> FeatureTable {
        let valid: Vec<String> = columns
            .iter()
            .filter(|c| CATEGORICAL_COLUMNS.contains(*c))
            .map(|c| c.to_string())
            .collect();

        let mut out = table.clone();
        if valid.is_empty() {
            return out;
        }

        let mut all_classes = Vec::with_capacity(valid.len());

        for col in &valid {
            let mut classes: Vec<String> = (0..table.len())
                .filter_map(|i| table.key_value(i, col))
                .map(String::from)
                .collect();
            classes.sort();
            classes.dedup();

            let encoded = encode_column(table, col, &classes);
            upsert_column(&mut out, &format!("{}_encoded", col), encoded);
            all_classes.push(classes);
        }

        self.encoders.insert(
            name.to_string(),
            FittedEncoder {
                columns: valid,
                classes: all_classes,
            },
        );

        out
    }

    /// Apply a previously fitted encoder to a table.
    ///
    /// Fails when `name` was never fit. Labels unseen at fit time map to
    /// the one-past-last index, a stable unknown bucket.
    pub fn transform_encoder(&self, table: &FeatureTable, name: &str) -> Result<FeatureTable> {
        let encoder = self
            .encoders
            .get(name)
            .ok_or_else(|| ApexError::EncoderNotFound(name.to_string()))?;

        let mut out = table.clone();
        for (col, classes) in encoder.columns.iter().zip(&encoder.classes) {
            let encoded = encode_column(table, col, classes);
            upsert_column(&mut out, &format!("{}_encoded", col), encoded);
        }

        Ok(out)
    }
}

/// Column values with missing entries replaced by zero
fn zero_filled(table: &FeatureTable, column: &str) -> Vec<f64> {
    table
        .column(column)
        .unwrap_or_default()
        .iter()
        .map(|v| if v.is_nan() { 0.0 } else { *v })
        .collect()
}

/// Population mean and scale; zero-variance columns scale by one
fn fit_stats(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 1.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let std = variance.sqrt();
    (mean, if std == 0.0 { 1.0 } else { std })
}

fn encode_column(table: &FeatureTable, column: &str, classes: &[String]) -> Vec<f64> {
    (0..table.len())
        .map(|i| {
            let value = table.key_value(i, column).unwrap_or("");
            classes
                .iter()
                .position(|c| c == value)
                .unwrap_or(classes.len()) as f64
        })
        .collect()
}

fn upsert_column(table: &mut FeatureTable, name: &str, values: Vec<f64>) {
    if table.column_index(name).is_some() {
        table.set_column(name, &values);
    } else {
        table.add_column(name, values);
    }
}
