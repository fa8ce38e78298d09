//! Project configuration: analysis settings and trace link types.
//!
//! Loaded once from a JSON file. Every field has a default, so a file that
//! only sets `analysis.spec_min` is valid.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::SpecLimit;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub analysis: AnalysisConfig,
    pub trace: TraceConfig,
}

impl ProjectConfig {
    /// Load and sanity-check a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: ProjectConfig = serde_json::from_str(text).context("parsing config JSON")?;
        config.trace.check()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Names of the two columns read from the measurement file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub x: String,
    pub y: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            x: "Frequency".to_string(),
            y: "Gain".to_string(),
        }
    }
}

/// Links the current analysis to the trace graph as a test-result record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultBinding {
    /// Id of the generated test-result record.
    pub id: String,
    /// Test case(s) the result validates.
    pub validates: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Settings for the margin analysis and its chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub columns: ColumnConfig,
    pub spec_min: SpecLimit,
    pub spec_max: SpecLimit,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Unit of the measured value, shown with margins.
    pub unit: String,
    /// Unit of the independent variable, shown with the worst-case x.
    pub x_unit: String,
    pub result: Option<ResultBinding>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            columns: ColumnConfig::default(),
            spec_min: SpecLimit::Scalar(14.0),
            spec_max: SpecLimit::Scalar(16.0),
            title: "TX Results".to_string(),
            x_label: "Frequency (Hz)".to_string(),
            y_label: "Gain (dB)".to_string(),
            unit: "dB".to_string(),
            x_unit: "GHz".to_string(),
            result: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Trace
// ---------------------------------------------------------------------------

/// One link type, e.g. `covers` with reverse name `covered by`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkTypeConfig {
    /// Key used in record `links` maps.
    pub option: String,
    pub outgoing: String,
    pub incoming: String,
    /// Targets may be missing from the record set.
    #[serde(default)]
    pub allow_dead_links: bool,
}

impl LinkTypeConfig {
    fn new(option: &str, outgoing: &str, incoming: &str) -> Self {
        Self {
            option: option.to_string(),
            outgoing: outgoing.to_string(),
            incoming: incoming.to_string(),
            allow_dead_links: true,
        }
    }
}

/// A line in a record's metadata block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum LayoutField {
    Status,
    Tags,
    /// Links of one type, outgoing or incoming.
    Links { link: String, incoming: bool },
    /// Transitive results validating the record.
    ValidatedBy,
}

/// Configuration of the trace record set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Minimum id length; ids use `[A-Za-z0-9_]`.
    pub id_min_len: usize,
    pub link_types: Vec<LinkTypeConfig>,
    pub layout: Vec<LayoutField>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            id_min_len: 5,
            link_types: vec![
                LinkTypeConfig::new("covers", "covers", "covered by"),
                LinkTypeConfig::new("validates", "validates", "validated by"),
            ],
            layout: vec![
                LayoutField::Status,
                LayoutField::Tags,
                LayoutField::Links {
                    link: "covers".to_string(),
                    incoming: false,
                },
                LayoutField::Links {
                    link: "covers".to_string(),
                    incoming: true,
                },
                LayoutField::ValidatedBy,
            ],
        }
    }
}

impl TraceConfig {
    pub fn link_type(&self, option: &str) -> Option<&LinkTypeConfig> {
        self.link_types.iter().find(|l| l.option == option)
    }

    /// Whether `id` is a well-formed record id.
    pub fn is_valid_id(&self, id: &str) -> bool {
        id.chars().count() >= self.id_min_len
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn check(&self) -> Result<()> {
        for (i, link) in self.link_types.iter().enumerate() {
            if link.option.is_empty() {
                anyhow::bail!("link type #{i} has an empty option name");
            }
            if self.link_types[..i].iter().any(|l| l.option == link.option) {
                anyhow::bail!("link type '{}' declared twice", link.option);
            }
        }
        for field in &self.layout {
            if let LayoutField::Links { link, .. } = field {
                if self.link_type(link).is_none() {
                    anyhow::bail!("layout refers to undeclared link type '{link}'");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::default();
        assert_eq!(config.analysis.columns.x, "Frequency");
        assert_eq!(config.analysis.columns.y, "Gain");
        assert_eq!(config.analysis.spec_min, SpecLimit::Scalar(14.0));
        assert_eq!(config.analysis.spec_max, SpecLimit::Scalar(16.0));
        assert_eq!(config.trace.id_min_len, 5);
        assert_eq!(config.trace.link_type("covers").unwrap().incoming, "covered by");
    }

    #[test]
    fn test_partial_json() {
        let config = ProjectConfig::from_json(
            r#"{ "analysis": { "spec_min": [1.0, 2.0], "columns": { "y": "Power" } } }"#,
        )
        .unwrap();
        assert_eq!(config.analysis.spec_min, SpecLimit::PerPoint(vec![1.0, 2.0]));
        assert_eq!(config.analysis.spec_max, SpecLimit::Scalar(16.0));
        assert_eq!(config.analysis.columns.x, "Frequency");
        assert_eq!(config.analysis.columns.y, "Power");
        assert_eq!(config.trace, TraceConfig::default());
    }

    #[test]
    fn test_result_binding() {
        let config = ProjectConfig::from_json(
            r#"{ "analysis": { "result": { "id": "TR_TX_001", "validates": ["TC_TX_001"] } } }"#,
        )
        .unwrap();
        let binding = config.analysis.result.unwrap();
        assert_eq!(binding.id, "TR_TX_001");
        assert_eq!(binding.validates, vec!["TC_TX_001".to_string()]);
        assert_eq!(binding.title, None);
    }

    #[test]
    fn test_layout_json() {
        let config = ProjectConfig::from_json(
            r#"{ "trace": { "layout": [
                { "field": "status" },
                { "field": "links", "link": "validates", "incoming": true }
            ] } }"#,
        )
        .unwrap();
        assert_eq!(config.trace.layout.len(), 2);
        assert_eq!(
            config.trace.layout[1],
            LayoutField::Links {
                link: "validates".to_string(),
                incoming: true
            }
        );
    }

    #[test]
    fn test_layout_unknown_link_rejected() {
        let err = ProjectConfig::from_json(
            r#"{ "trace": { "layout": [ { "field": "links", "link": "implements", "incoming": false } ] } }"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("implements"));
    }

    #[test]
    fn test_duplicate_link_type_rejected() {
        let err = ProjectConfig::from_json(
            r#"{ "trace": { "link_types": [
                { "option": "covers", "outgoing": "covers", "incoming": "covered by" },
                { "option": "covers", "outgoing": "covers", "incoming": "covered by" }
            ] } }"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("declared twice"));
    }

    #[test]
    fn test_id_validation() {
        let trace = TraceConfig::default();
        assert!(trace.is_valid_id("REQ_001"));
        assert!(trace.is_valid_id("abcde"));
        assert!(!trace.is_valid_id("R_01"));
        assert!(!trace.is_valid_id("REQ-001"));
        assert!(!trace.is_valid_id("REQ 001"));
    }
}
