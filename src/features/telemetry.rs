//! Telemetry summary features
//!
//! Per-channel aggregates over a stream of car telemetry samples. Channels
//! missing from the capture yield None fields rather than defaults.

use crate::TelemetrySample;

/// Aggregated telemetry features for one stream
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetrySummary {
    pub max_speed: Option<f64>,
    pub avg_speed: Option<f64>,
    pub min_speed: Option<f64>,
    pub avg_throttle: Option<f64>,
    /// Share of samples at (effectively) full throttle, >= 95%
    pub full_throttle_pct: Option<f64>,
    /// Share of samples with any brake application
    pub brake_usage_pct: Option<f64>,
    /// Share of samples with heavy braking, >= 50%
    pub heavy_brake_pct: Option<f64>,
    pub avg_gear: Option<f64>,
    pub drs_usage_pct: Option<f64>,
}

/// Summarize a telemetry stream channel by channel
pub fn telemetry_summary(samples: &[TelemetrySample]) -> TelemetrySummary {
    let mut summary = TelemetrySummary::default();

    let speeds: Vec<f64> = samples.iter().filter_map(|s| s.speed).collect();
    if !speeds.is_empty() {
        summary.max_speed = Some(speeds.iter().copied().fold(f64::NEG_INFINITY, f64::max));
        summary.min_speed = Some(speeds.iter().copied().fold(f64::INFINITY, f64::min));
        summary.avg_speed = Some(speeds.iter().sum::<f64>() / speeds.len() as f64);
    }

    let throttles: Vec<f64> = samples.iter().filter_map(|s| s.throttle).collect();
    if !throttles.is_empty() {
        let n = throttles.len() as f64;
        summary.avg_throttle = Some(throttles.iter().sum::<f64>() / n);
        summary.full_throttle_pct =
            Some(throttles.iter().filter(|t| **t >= 95.0).count() as f64 / n);
    }

    let brakes: Vec<f64> = samples.iter().filter_map(|s| s.brake).collect();
    if !brakes.is_empty() {
        let n = brakes.len() as f64;
        summary.brake_usage_pct = Some(brakes.iter().filter(|b| **b > 0.0).count() as f64 / n);
        summary.heavy_brake_pct = Some(brakes.iter().filter(|b| **b >= 50.0).count() as f64 / n);
    }

    let gears: Vec<f64> = samples.iter().filter_map(|s| s.gear.map(f64::from)).collect();
    if !gears.is_empty() {
        summary.avg_gear = Some(gears.iter().sum::<f64>() / gears.len() as f64);
    }

    let drs: Vec<f64> = samples.iter().filter_map(|s| s.drs.map(f64::from)).collect();
    if !drs.is_empty() {
        summary.drs_usage_pct = Some(drs.iter().sum::<f64>() / drs.len() as f64);
    }

    summary
}
