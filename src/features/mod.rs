//! Feature extraction
//!
//! Point-in-time feature groups and the rolling/stint machinery behind them.

pub mod circuit;
pub mod driver;
pub mod rolling;
pub mod session;
pub mod stint;
pub mod team;
pub mod telemetry;

pub use circuit::{circuit_profile, driver_circuit_form, CircuitProfile, DriverCircuitForm};
pub use driver::{driver_form, DriverForm};
pub use rolling::{driver_rolling_stats, team_rolling_stats, Rolling};
pub use session::{session_form, PracticeForm, SessionForm};
pub use stint::{tire_stints, StintSummary};
pub use team::{team_form, TeamForm};
pub use telemetry::{telemetry_summary, TelemetrySummary};
