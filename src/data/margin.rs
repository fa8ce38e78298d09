use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{MeasurementSeries, SpecLimit};
use crate::error::{AnalysisError, AnalysisResult};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Overall verdict for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    /// Zero margin sits on the boundary and passes.
    pub fn from_min_margin(min_margin: f64) -> Self {
        if min_margin < 0.0 {
            Status::Fail
        } else {
            Status::Pass
        }
    }

    pub fn is_pass(self) -> bool {
        self == Status::Pass
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => write!(f, "PASS"),
            Status::Fail => write!(f, "FAIL"),
        }
    }
}

// ---------------------------------------------------------------------------
// Margins
// ---------------------------------------------------------------------------

/// Check that point-wise limits match `n` and that min ≤ max everywhere.
pub fn validate_limits(n: usize, spec_min: &SpecLimit, spec_max: &SpecLimit) -> AnalysisResult<()> {
    for (what, limit) in [("spec_min", spec_min), ("spec_max", spec_max)] {
        if let Some(len) = limit.point_count() {
            if len != n {
                return Err(AnalysisError::LengthMismatch {
                    what,
                    expected: n,
                    actual: len,
                });
            }
        }
    }

    for i in 0..n {
        let (Some(min), Some(max)) = (spec_min.at(i), spec_max.at(i)) else {
            continue;
        };
        // Written so that NaN limits are rejected as well.
        if !(min <= max) {
            return Err(AnalysisError::InvertedLimits { index: i, min, max });
        }
    }
    Ok(())
}

/// Per-point margin against both limits, plus the global minimum.
///
/// `margin[i] = min(y[i] - spec_min[i], spec_max[i] - y[i])`, so a point is
/// inside its limits exactly when its margin is non-negative.
pub fn compute_margins(
    y_values: &[f64],
    spec_min: &SpecLimit,
    spec_max: &SpecLimit,
) -> AnalysisResult<(Vec<f64>, f64)> {
    if y_values.is_empty() {
        return Err(AnalysisError::EmptySeries);
    }
    if let Some(index) = y_values.iter().position(|y| !y.is_finite()) {
        return Err(AnalysisError::NonFinite { index });
    }
    validate_limits(y_values.len(), spec_min, spec_max)?;

    let n = y_values.len();
    let lows = spec_min.broadcast(n);
    let highs = spec_max.broadcast(n);

    let margins: Vec<f64> = y_values
        .iter()
        .zip(lows.iter().zip(highs.iter()))
        .map(|(&y, (&low, &high))| (y - low).min(high - y))
        .collect();

    let min_margin = margins.iter().copied().fold(f64::INFINITY, f64::min);
    Ok((margins, min_margin))
}

// ---------------------------------------------------------------------------
// Worst case
// ---------------------------------------------------------------------------

/// The sample with the smallest margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorstCase {
    pub index: usize,
    pub x: f64,
    pub margin: f64,
}

/// Locate the global minimum margin. Ties resolve to the lowest index.
pub fn find_worst_case(margins: &[f64], x_values: &[f64]) -> AnalysisResult<WorstCase> {
    if margins.is_empty() {
        return Err(AnalysisError::EmptySeries);
    }
    if x_values.len() != margins.len() {
        return Err(AnalysisError::LengthMismatch {
            what: "x values",
            expected: margins.len(),
            actual: x_values.len(),
        });
    }

    let mut index = 0;
    for (i, &m) in margins.iter().enumerate().skip(1) {
        if m < margins[index] {
            index = i;
        }
    }

    Ok(WorstCase {
        index,
        x: x_values[index],
        margin: margins[index],
    })
}

/// PASS unless some margin is negative.
pub fn classify(margins: &[f64]) -> AnalysisResult<Status> {
    if margins.is_empty() {
        return Err(AnalysisError::EmptySeries);
    }
    let min_margin = margins.iter().copied().fold(f64::INFINITY, f64::min);
    Ok(Status::from_min_margin(min_margin))
}

// ---------------------------------------------------------------------------
// MarginReport – everything the chart needs
// ---------------------------------------------------------------------------

/// Result of analyzing one series against its limits.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginReport {
    pub margins: Vec<f64>,
    pub min_margin: f64,
    pub worst: WorstCase,
    /// Measured value at the worst-case point, for the marker.
    pub worst_y: f64,
    pub status: Status,
}

impl MarginReport {
    /// Number of samples outside their limits.
    pub fn violations(&self) -> usize {
        self.margins.iter().filter(|&&m| m < 0.0).count()
    }
}

/// Run the full analysis on a loaded series.
pub fn analyze(
    series: &MeasurementSeries,
    spec_min: &SpecLimit,
    spec_max: &SpecLimit,
) -> AnalysisResult<MarginReport> {
    if series.x.len() != series.y.len() {
        return Err(AnalysisError::LengthMismatch {
            what: "x values",
            expected: series.y.len(),
            actual: series.x.len(),
        });
    }

    let (margins, min_margin) = compute_margins(&series.y, spec_min, spec_max)?;
    let worst = find_worst_case(&margins, &series.x)?;
    let status = classify(&margins)?;

    log::debug!(
        "analyzed {} points: status {status}, min margin {min_margin} at x={}",
        margins.len(),
        worst.x
    );

    Ok(MarginReport {
        worst_y: series.y[worst.index],
        margins,
        min_margin,
        worst,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(v: f64) -> SpecLimit {
        SpecLimit::Scalar(v)
    }

    #[test]
    fn test_worked_example() {
        let series = MeasurementSeries::new(vec![1.0, 2.0, 3.0, 4.0], vec![10.0, 20.0, 5.0, 30.0]);
        let report = analyze(&series, &scalar(0.0), &scalar(25.0)).unwrap();

        assert_eq!(report.margins, vec![10.0, 5.0, 5.0, -5.0]);
        assert_eq!(report.worst.index, 3);
        assert_eq!(report.worst.x, 4.0);
        assert_eq!(report.worst.margin, -5.0);
        assert_eq!(report.min_margin, -5.0);
        assert_eq!(report.worst_y, 30.0);
        assert_eq!(report.status, Status::Fail);
        assert_eq!(report.violations(), 1);
    }

    #[test]
    fn test_all_inside_passes() {
        let y = [14.2, 15.0, 15.9, 14.0, 16.0];
        let (margins, min_margin) = compute_margins(&y, &scalar(14.0), &scalar(16.0)).unwrap();
        assert!(margins.iter().all(|&m| m >= 0.0));
        assert!(min_margin >= 0.0);
        assert_eq!(classify(&margins).unwrap(), Status::Pass);
    }

    #[test]
    fn test_any_outside_fails() {
        for bad in [13.9, 16.1] {
            let y = [15.0, bad, 15.0];
            let (margins, min_margin) = compute_margins(&y, &scalar(14.0), &scalar(16.0)).unwrap();
            assert!(min_margin < 0.0);
            assert_eq!(classify(&margins).unwrap(), Status::Fail);
        }
    }

    #[test]
    fn test_boundary_is_pass() {
        let (margins, min_margin) = compute_margins(&[14.0, 16.0], &scalar(14.0), &scalar(16.0)).unwrap();
        assert_eq!(margins, vec![0.0, 0.0]);
        assert_eq!(min_margin, 0.0);
        assert_eq!(classify(&margins).unwrap(), Status::Pass);
    }

    #[test]
    fn test_scalar_matches_uniform_sequence() {
        let y = [14.3, 15.7, 13.1, 16.4, 15.0];
        let scalar_result = compute_margins(&y, &scalar(14.0), &scalar(16.0)).unwrap();
        let seq_result = compute_margins(
            &y,
            &SpecLimit::PerPoint(vec![14.0; 5]),
            &SpecLimit::PerPoint(vec![16.0; 5]),
        )
        .unwrap();

        let bits = |v: &[f64]| v.iter().map(|m| m.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&scalar_result.0), bits(&seq_result.0));
        assert_eq!(scalar_result.1.to_bits(), seq_result.1.to_bits());
    }

    #[test]
    fn test_per_point_limits() {
        let y = [1.0, 2.0, 3.0];
        let (margins, _) = compute_margins(
            &y,
            &SpecLimit::PerPoint(vec![0.0, 1.5, 3.5]),
            &SpecLimit::PerPoint(vec![2.0, 2.5, 5.0]),
        )
        .unwrap();
        assert_eq!(margins, vec![1.0, 0.5, -0.5]);
    }

    #[test]
    fn test_idempotent() {
        let series = MeasurementSeries::new(vec![0.0, 1.0, 2.0], vec![14.5, 15.5, 16.5]);
        let a = analyze(&series, &scalar(14.0), &scalar(16.0)).unwrap();
        let b = analyze(&series, &scalar(14.0), &scalar(16.0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tie_break_first_index() {
        let worst = find_worst_case(&[3.0, 1.0, 2.0, 1.0], &[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert_eq!(worst.index, 1);
        assert_eq!(worst.x, 20.0);
        assert_eq!(worst.margin, 1.0);
    }

    #[test]
    fn test_empty_series() {
        assert_eq!(
            compute_margins(&[], &scalar(0.0), &scalar(1.0)),
            Err(AnalysisError::EmptySeries)
        );
        assert_eq!(find_worst_case(&[], &[]), Err(AnalysisError::EmptySeries));
        assert_eq!(classify(&[]), Err(AnalysisError::EmptySeries));
        assert_eq!(
            analyze(&MeasurementSeries::default(), &scalar(0.0), &scalar(1.0)),
            Err(AnalysisError::EmptySeries)
        );
    }

    #[test]
    fn test_limit_length_mismatch() {
        let err = compute_margins(&[1.0, 2.0, 3.0], &SpecLimit::PerPoint(vec![0.0, 0.0]), &scalar(5.0))
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::LengthMismatch {
                what: "spec_min",
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_x_length_mismatch() {
        let err = find_worst_case(&[1.0, 2.0], &[0.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::LengthMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let err = compute_margins(
            &[1.0, 2.0],
            &SpecLimit::PerPoint(vec![0.0, 3.0]),
            &scalar(2.5),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InvertedLimits {
                index: 1,
                min: 3.0,
                max: 2.5
            }
        );
    }

    #[test]
    fn test_nan_measurement_rejected() {
        let err = compute_margins(&[1.0, f64::NAN], &scalar(0.0), &scalar(2.0)).unwrap_err();
        assert_eq!(err, AnalysisError::NonFinite { index: 1 });
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Pass.to_string(), "PASS");
        assert_eq!(Status::Fail.to_string(), "FAIL");
        assert_eq!(serde_json::to_string(&Status::Fail).unwrap(), "\"FAIL\"");
    }
}
