//! Error types for margin analysis and trace resolution.

use thiserror::Error;

/// Errors raised by the margin analyzer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// No samples to analyze.
    #[error("empty series: at least one sample is required")]
    EmptySeries,

    /// A point-wise sequence does not line up with the series.
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Lower limit above upper limit.
    #[error("inverted spec limits at index {index}: min {min} > max {max}")]
    InvertedLimits { index: usize, min: f64, max: f64 },

    /// NaN or infinite measurement.
    #[error("non-finite measurement at index {index}")]
    NonFinite { index: usize },
}

/// Result type for margin analysis.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors raised while building or querying a trace graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// Identifier does not match the configured pattern.
    #[error("invalid record id '{id}': expected at least {min_len} characters from [A-Za-z0-9_]")]
    InvalidId { id: String, min_len: usize },

    /// Two records share an id.
    #[error("duplicate record id '{0}'")]
    DuplicateId(String),

    /// Link option not declared in the trace configuration.
    #[error("record '{record}' uses unknown link type '{link}'")]
    UnknownLinkType { record: String, link: String },

    /// Link target missing and the link type does not allow dead links.
    #[error("record '{record}' links via '{link}' to missing record '{target}'")]
    DeadLink {
        record: String,
        link: String,
        target: String,
    },

    /// Lookup of a record that is not in the graph.
    #[error("unknown record '{0}'")]
    UnknownRecord(String),
}

/// Result type for trace operations.
pub type TraceResult<T> = Result<T, TraceError>;
