//! Tabular views over typed tables
//!
//! Validation and transforms need column names, nullness, and dtypes without
//! caring which record type backs the table. `Record` describes one row type;
//! any slice of records is then `Tabular`.

use crate::{Lap, ResultRecord};

/// Column-level description of a single record type
pub trait Record {
    /// Column names in schema order
    const COLUMNS: &'static [&'static str];

    /// Whether the named column is missing for this row
    fn is_null(&self, column: &str) -> bool;

    /// Dtype descriptor for the named column ("int", "float", "bool", "str", "date")
    fn dtype(column: &str) -> &'static str;
}

/// Column-level view of a whole table
pub trait Tabular {
    fn n_rows(&self) -> usize;

    fn column_names(&self) -> Vec<String>;

    fn null_count(&self, column: &str) -> usize;

    fn dtype_of(&self, column: &str) -> String;
}

impl<R: Record> Tabular for [R] {
    fn n_rows(&self) -> usize {
        self.len()
    }

    fn column_names(&self) -> Vec<String> {
        R::COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn null_count(&self, column: &str) -> usize {
        self.iter().filter(|r| r.is_null(column)).count()
    }

    fn dtype_of(&self, column: &str) -> String {
        R::dtype(column).to_string()
    }
}

impl Record for ResultRecord {
    const COLUMNS: &'static [&'static str] = &[
        "Season",
        "Round",
        "GrandPrix",
        "Abbreviation",
        "FullName",
        "TeamName",
        "Position",
        "GridPosition",
        "PositionsGained",
        "Points",
        "IsFinished",
        "IsDNF",
        "Date",
    ];

    fn is_null(&self, column: &str) -> bool {
        match column {
            "Position" => self.position.is_none(),
            "GridPosition" => self.grid_position.is_none(),
            "PositionsGained" => self.positions_gained.is_none(),
            _ => false,
        }
    }

    fn dtype(column: &str) -> &'static str {
        match column {
            "Season" | "Round" | "Position" | "GridPosition" => "int",
            "PositionsGained" | "Points" => "float",
            "IsFinished" | "IsDNF" => "bool",
            "Date" => "date",
            "GrandPrix" | "Abbreviation" | "FullName" | "TeamName" => "str",
            _ => "unknown",
        }
    }
}

impl Record for Lap {
    const COLUMNS: &'static [&'static str] = &[
        "Driver",
        "LapNumber",
        "LapTimeSeconds",
        "Sector1TimeSeconds",
        "Sector2TimeSeconds",
        "Sector3TimeSeconds",
        "Compound",
    ];

    fn is_null(&self, column: &str) -> bool {
        match column {
            "LapTimeSeconds" => self.time_secs.is_nan(),
            "Sector1TimeSeconds" => self.sector1_secs.is_none(),
            "Sector2TimeSeconds" => self.sector2_secs.is_none(),
            "Sector3TimeSeconds" => self.sector3_secs.is_none(),
            "Compound" => self.compound.is_none(),
            _ => false,
        }
    }

    fn dtype(column: &str) -> &'static str {
        match column {
            "LapNumber" => "int",
            "LapTimeSeconds" | "Sector1TimeSeconds" | "Sector2TimeSeconds"
            | "Sector3TimeSeconds" => "float",
            "Driver" | "Compound" => "str",
            _ => "unknown",
        }
    }
}
