//! Stint segmentation and tire degradation
//!
//! Splits one driver's laps into runs of constant compound and fits a linear
//! trend of lap time over in-stint tire age.

use crate::{DriverId, RawLap};

/// Per-stint degradation summary
#[derive(Debug, Clone, PartialEq)]
pub struct StintSummary {
    /// 1-based, in order of appearance
    pub stint_number: u32,
    pub compound: Option<String>,
    /// All laps in the stint, timed or not
    pub length: usize,
    /// OLS slope of lap time vs tire age, seconds per lap; positive means
    /// the tires are slowing down
    pub degradation_rate: f64,
    pub avg_lap_time: f64,
    pub best_lap_time: f64,
}

/// Segment one driver's laps into stints and estimate degradation.
///
/// A stint boundary is a change of compound relative to the previous lap;
/// without compound data the whole session is a single stint. Stints with
/// fewer than `min_laps` timed laps are omitted: too few points for a
/// meaningful trend.
pub fn tire_stints(laps: &[RawLap], driver: &DriverId, min_laps: usize) -> Vec<StintSummary> {
    let mut driver_laps: Vec<&RawLap> = laps.iter().filter(|l| &l.driver == driver).collect();
    if driver_laps.is_empty() {
        return Vec::new();
    }

    driver_laps.sort_by_key(|l| l.lap_number);

    // (stint number, tire age, lap) with both counters 1-based
    let mut tagged: Vec<(u32, u32, &RawLap)> = Vec::with_capacity(driver_laps.len());
    let mut stint = 1u32;
    let mut age = 0u32;
    let mut prev_compound: Option<&Option<String>> = None;

    for lap in driver_laps {
        if let Some(prev) = prev_compound {
            if *prev != lap.compound {
                stint += 1;
                age = 0;
            }
        }
        age += 1;
        prev_compound = Some(&lap.compound);
        tagged.push((stint, age, lap));
    }

    let mut summaries = Vec::new();

    for stint_number in 1..=stint {
        let stint_laps: Vec<&(u32, u32, &RawLap)> =
            tagged.iter().filter(|t| t.0 == stint_number).collect();

        let timed: Vec<(f64, f64)> = stint_laps
            .iter()
            .filter_map(|(_, age, lap)| {
                lap.lap_time.map(|t| (*age as f64, t.as_secs_f64()))
            })
            .collect();

        if timed.len() < min_laps {
            continue;
        }

        let times: Vec<f64> = timed.iter().map(|(_, t)| *t).collect();

        summaries.push(StintSummary {
            stint_number,
            compound: stint_laps[0].2.compound.clone(),
            length: stint_laps.len(),
            degradation_rate: ols_slope(&timed),
            avg_lap_time: times.iter().sum::<f64>() / times.len() as f64,
            best_lap_time: times.iter().copied().fold(f64::INFINITY, f64::min),
        });
    }

    summaries
}

/// Slope of the least-squares line through (x, y) points
fn ols_slope(points: &[(f64, f64)]) -> f64 {
    let n = points.len() as f64;
    let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var = 0.0;
    for (x, y) in points {
        cov += (x - x_mean) * (y - y_mean);
        var += (x - x_mean) * (x - x_mean);
    }

    if var == 0.0 {
        0.0
    } else {
        cov / var
    }
}
