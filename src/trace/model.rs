use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ResultBinding;
use crate::data::margin::MarginReport;

/// Record categories in the trace set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedKind {
    Requirement,
    Specification,
    TestCase,
    TestResult,
}

impl fmt::Display for NeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NeedKind::Requirement => "Requirement",
            NeedKind::Specification => "Specification",
            NeedKind::TestCase => "Test Case",
            NeedKind::TestResult => "Test Result",
        };
        f.write_str(name)
    }
}

/// One traceability record.
///
/// ```json
/// { "id": "TC_TX_001", "type": "test_case", "title": "TX gain sweep",
///   "links": { "covers": ["SPEC_TX_GAIN"] } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Need {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NeedKind,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Outgoing links: link type → target ids.
    #[serde(default)]
    pub links: BTreeMap<String, Vec<String>>,
}

impl Need {
    pub fn new(id: &str, kind: NeedKind, title: &str) -> Self {
        Need {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            status: None,
            tags: Vec::new(),
            links: BTreeMap::new(),
        }
    }

    /// Builder-style helper to add outgoing links.
    pub fn with_links(mut self, link: &str, targets: &[&str]) -> Self {
        self.links
            .entry(link.to_string())
            .or_default()
            .extend(targets.iter().map(|t| t.to_string()));
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    /// Test-result record carrying the verdict of a margin analysis.
    pub fn from_report(binding: &ResultBinding, report: &MarginReport) -> Self {
        let title = binding
            .title
            .clone()
            .unwrap_or_else(|| format!("Margin analysis ({})", report.status));
        let targets: Vec<&str> = binding.validates.iter().map(String::as_str).collect();
        let mut need = Need::new(&binding.id, NeedKind::TestResult, &title)
            .with_status(&report.status.to_string())
            .with_links("validates", &targets);
        need.tags.push("margin".to_string());
        need
    }

    /// Verdict implied by the status text, for test results.
    pub fn verdict(&self) -> Option<bool> {
        match self.status.as_deref().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("pass") || s.eq_ignore_ascii_case("passed") => Some(true),
            Some(s) if s.eq_ignore_ascii_case("fail") || s.eq_ignore_ascii_case("failed") => Some(false),
            _ => None,
        }
    }
}
