//! Record cleaning
//!
//! Converts raw timing records into numeric tables: durations to seconds,
//! positions to numbers, and laps that do not represent race pace removed.

use crate::{CleaningConfig, Lap, RawLap, RawResult, ResultRecord};

/// Clean a raw lap table.
///
/// Lap and sector times are converted to seconds (missing times become NaN).
/// When `remove_outliers` is set, laps outside the configured valid range are
/// dropped. Pit-in and pit-out laps are always dropped.
pub fn clean_laps(laps: &[RawLap], config: &CleaningConfig) -> Vec<Lap> {
    let mut cleaned = Vec::with_capacity(laps.len());
    let mut removed = 0usize;

    for lap in laps {
        if lap.is_pit_lap() {
            continue;
        }

        let time_secs = lap
            .lap_time
            .map(|t| t.as_secs_f64())
            .unwrap_or(f64::NAN);

        if config.remove_outliers
            && !(time_secs >= config.min_lap_time && time_secs <= config.max_lap_time)
        {
            removed += 1;
            continue;
        }

        cleaned.push(Lap {
            driver: lap.driver.clone(),
            lap_number: lap.lap_number,
            time_secs,
            sector1_secs: lap.sector1_time.map(|t| t.as_secs_f64()),
            sector2_secs: lap.sector2_time.map(|t| t.as_secs_f64()),
            sector3_secs: lap.sector3_time.map(|t| t.as_secs_f64()),
            compound: lap.compound.clone(),
        });
    }

    if removed > 0 {
        log::info!("Removed {} outlier laps", removed);
    }

    cleaned
}

/// Clean a raw result table.
///
/// Coerces position and grid columns to numbers (non-numeric becomes None),
/// derives positions gained and finished/DNF flags, and fills missing points
/// with zero.
pub fn clean_results(results: &[RawResult]) -> Vec<ResultRecord> {
    results
        .iter()
        .map(|r| {
            let position = parse_position(r.position.as_deref());
            let grid_position = parse_position(r.grid_position.as_deref());

            let positions_gained = match (grid_position, position) {
                (Some(grid), Some(pos)) => Some(grid as f64 - pos as f64),
                _ => None,
            };

            let is_finished = r.status == "Finished";

            ResultRecord {
                season: r.season,
                round: r.round,
                grand_prix: r.grand_prix.clone(),
                driver: r.driver.clone(),
                full_name: r.full_name.clone(),
                team: r.team.clone(),
                position,
                grid_position,
                positions_gained,
                points: r.points.filter(|p| p.is_finite()).unwrap_or(0.0),
                is_finished,
                is_dnf: !is_finished,
                date: r.date,
            }
        })
        .collect()
}

/// Parse a position string; retirement codes and other non-numerics are None
fn parse_position(raw: Option<&str>) -> Option<u32> {
    let value: f64 = raw?.trim().parse().ok()?;
    if value.is_finite() && value >= 1.0 {
        Some(value as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DriverId;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn make_lap(number: u32, secs: Option<f64>) -> RawLap {
        RawLap {
            driver: DriverId::new("HAM"),
            lap_number: number,
            lap_time: secs.map(Duration::from_secs_f64),
            sector1_time: None,
            sector2_time: None,
            sector3_time: None,
            compound: Some("SOFT".to_string()),
            pit_in_time: None,
            pit_out_time: None,
        }
    }

    fn make_raw_result(position: Option<&str>, grid: Option<&str>, status: &str) -> RawResult {
        RawResult {
            season: 2023,
            round: 1,
            grand_prix: "Bahrain".to_string(),
            driver: DriverId::new("HAM"),
            full_name: "Lewis Hamilton".to_string(),
            team: "Mercedes".to_string(),
            position: position.map(String::from),
            grid_position: grid.map(String::from),
            points: Some(10.0),
            status: status.to_string(),
            date: NaiveDate::from_ymd_opt(2023, 3, 5).unwrap(),
        }
    }

    fn config() -> CleaningConfig {
        CleaningConfig {
            min_lap_time: 60.0,
            max_lap_time: 180.0,
            remove_outliers: true,
        }
    }

    #[test]
    fn test_lap_time_range_filter() {
        let laps = vec![
            make_lap(1, Some(92.5)),
            make_lap(2, Some(45.0)),  // too fast to be real
            make_lap(3, Some(240.0)), // red flag crawl
            make_lap(4, Some(93.1)),
        ];

        let cleaned = clean_laps(&laps, &config());
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].lap_number, 1);
        assert_eq!(cleaned[1].lap_number, 4);
    }

    #[test]
    fn test_missing_time_dropped_with_outliers() {
        let laps = vec![make_lap(1, None), make_lap(2, Some(90.0))];

        let cleaned = clean_laps(&laps, &config());
        assert_eq!(cleaned.len(), 1);
        assert!((cleaned[0].time_secs - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_outlier_filter_disabled_keeps_slow_laps() {
        let mut cfg = config();
        cfg.remove_outliers = false;

        let laps = vec![make_lap(1, Some(240.0)), make_lap(2, None)];
        let cleaned = clean_laps(&laps, &cfg);

        assert_eq!(cleaned.len(), 2);
        assert!((cleaned[0].time_secs - 240.0).abs() < 1e-9);
        assert!(cleaned[1].time_secs.is_nan());
    }

    #[test]
    fn test_pit_laps_dropped() {
        let mut pit_in = make_lap(10, Some(95.0));
        pit_in.pit_in_time = Some(Duration::from_secs(5000));
        let mut pit_out = make_lap(11, Some(96.0));
        pit_out.pit_out_time = Some(Duration::from_secs(5030));

        let laps = vec![make_lap(9, Some(91.0)), pit_in, pit_out, make_lap(12, Some(91.5))];
        let cleaned = clean_laps(&laps, &config());

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].lap_number, 9);
        assert_eq!(cleaned[1].lap_number, 12);
    }

    #[test]
    fn test_sector_conversion() {
        let mut lap = make_lap(1, Some(92.0));
        lap.sector1_time = Some(Duration::from_secs_f64(28.4));
        lap.sector3_time = Some(Duration::from_secs_f64(31.2));

        let cleaned = clean_laps(&[lap], &config());
        assert!((cleaned[0].sector1_secs.unwrap() - 28.4).abs() < 1e-9);
        assert!(cleaned[0].sector2_secs.is_none());
        assert!((cleaned[0].sector3_secs.unwrap() - 31.2).abs() < 1e-9);
    }

    #[test]
    fn test_position_coercion() {
        let results = vec![
            make_raw_result(Some("3"), Some("5"), "Finished"),
            make_raw_result(Some("R"), Some("12"), "Engine"),
        ];

        let cleaned = clean_results(&results);
        assert_eq!(cleaned[0].position, Some(3));
        assert_eq!(cleaned[0].positions_gained, Some(2.0));
        assert!(cleaned[0].is_finished);
        assert!(!cleaned[0].is_dnf);

        assert_eq!(cleaned[1].position, None);
        assert_eq!(cleaned[1].positions_gained, None);
        assert!(cleaned[1].is_dnf);
    }

    #[test]
    fn test_missing_points_filled_zero() {
        let mut raw = make_raw_result(Some("15"), Some("15"), "Finished");
        raw.points = None;

        let cleaned = clean_results(&[raw]);
        assert_eq!(cleaned[0].points, 0.0);
    }
}
