/// Traceability records: requirements, specifications, test cases and results.
///
/// ```text
///   Test Result ──validates──▶ Test Case ──covers──▶ Specification ──covers──▶ Requirement
/// ```
///
/// Records are loaded into a [`graph::TraceGraph`]; reverse links
/// ("covered by", "validated by") are derived, never stored in the records.

pub mod graph;
pub mod layout;
pub mod loader;
pub mod model;
