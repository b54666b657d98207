//! Data cleaning, validation, and preprocessing
//!
//! Pure transformations from raw timing records to model-ready tables.

pub mod clean;
pub mod split;
pub mod table;
pub mod transform;
pub mod validate;

pub use clean::{clean_laps, clean_results};
pub use table::{Record, Tabular};
pub use transform::Processor;
pub use validate::{validate, ValidationReport};
