use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SpecLimit – a scalar or point-wise bound
// ---------------------------------------------------------------------------

/// A pass/fail bound applied to a measurement series.
///
/// In JSON a scalar limit is a bare number and a point-wise limit is an array,
/// so `14.0` and `[14.0, 14.5, 15.0]` both deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecLimit {
    Scalar(f64),
    PerPoint(Vec<f64>),
}

impl SpecLimit {
    /// Limit value at index `i`. Scalars apply everywhere.
    pub fn at(&self, i: usize) -> Option<f64> {
        match self {
            SpecLimit::Scalar(v) => Some(*v),
            SpecLimit::PerPoint(values) => values.get(i).copied(),
        }
    }

    /// Length of a point-wise limit, `None` for scalars.
    pub fn point_count(&self) -> Option<usize> {
        match self {
            SpecLimit::Scalar(_) => None,
            SpecLimit::PerPoint(values) => Some(values.len()),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            SpecLimit::Scalar(v) => Some(*v),
            SpecLimit::PerPoint(_) => None,
        }
    }

    /// Expand to `n` values. Callers check the length of point-wise limits first.
    pub fn broadcast(&self, n: usize) -> Vec<f64> {
        match self {
            SpecLimit::Scalar(v) => vec![*v; n],
            SpecLimit::PerPoint(values) => values.clone(),
        }
    }
}

impl fmt::Display for SpecLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecLimit::Scalar(v) => write!(f, "{v}"),
            SpecLimit::PerPoint(values) => write!(f, "<{} points>", values.len()),
        }
    }
}

// ---------------------------------------------------------------------------
// MeasurementSeries – one sweep from the input file
// ---------------------------------------------------------------------------

/// An ordered sweep of (x, y) samples, e.g. frequency vs. gain.
#[derive(Debug, Clone, Default)]
pub struct MeasurementSeries {
    /// Independent variable (x).
    pub x: Vec<f64>,
    /// Measured value (y) – same length as `x`.
    pub y: Vec<f64>,
    /// Column the x values were read from.
    pub x_column: String,
    /// Column the y values were read from.
    pub y_column: String,
    /// File the series was loaded from, if any.
    pub source: Option<PathBuf>,
}

impl MeasurementSeries {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        MeasurementSeries {
            x,
            y,
            ..Default::default()
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Whether the series has no samples.
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Iterate samples as plot points.
    pub fn points(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.x.iter().zip(self.y.iter()).map(|(&x, &y)| [x, y])
    }
}
