//! Chart annotations and the exported report record.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::data::margin::{MarginReport, Status};
use crate::data::model::{MeasurementSeries, SpecLimit};

/// Text block drawn in the corner of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub status: Status,
    pub lines: Vec<String>,
}

impl Annotation {
    /// Status, min margin (one decimal) and worst-case x (two decimals).
    pub fn new(report: &MarginReport, config: &AnalysisConfig, x_name: &str) -> Self {
        let lines = vec![
            format!("Status: {}", report.status),
            format!("Min Margin: {}", with_unit(format!("{:.1}", report.min_margin), &config.unit)),
            format!("At {x_name}: {}", with_unit(format!("{:.2}", report.worst.x), &config.x_unit)),
        ];
        Annotation {
            status: report.status,
            lines,
        }
    }
}

fn with_unit(value: String, unit: &str) -> String {
    if unit.is_empty() {
        value
    } else {
        format!("{value} {unit}")
    }
}

/// Legend label for a limit line, e.g. `Min Spec (14 dB)`.
pub fn limit_label(kind: &str, limit: &SpecLimit, unit: &str) -> String {
    match limit {
        SpecLimit::Scalar(v) => format!("{kind} Spec ({})", with_unit(v.to_string(), unit)),
        SpecLimit::PerPoint(_) => format!("{kind} Spec"),
    }
}

// ---------------------------------------------------------------------------
// Exported record
// ---------------------------------------------------------------------------

/// Serializable summary of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub title: String,
    pub source: Option<PathBuf>,
    pub x_column: String,
    pub y_column: String,
    pub points: usize,
    pub spec_min: SpecLimit,
    pub spec_max: SpecLimit,
    pub status: Status,
    pub min_margin: f64,
    pub worst_index: usize,
    pub worst_x: f64,
    pub worst_y: f64,
    pub violations: usize,
}

impl ReportRecord {
    pub fn new(series: &MeasurementSeries, config: &AnalysisConfig, report: &MarginReport) -> Self {
        ReportRecord {
            title: config.title.clone(),
            source: series.source.clone(),
            x_column: series.x_column.clone(),
            y_column: series.y_column.clone(),
            points: series.len(),
            spec_min: config.spec_min.clone(),
            spec_max: config.spec_max.clone(),
            status: report.status,
            min_margin: report.min_margin,
            worst_index: report.worst.index,
            worst_x: report.worst.x,
            worst_y: report.worst_y,
            violations: report.violations(),
        }
    }

    /// Write the record as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut f = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        writeln!(f, "{}", serde_json::to_string_pretty(self)?)?;
        log::info!("Wrote report to {:?}", path);
        Ok(())
    }
}
