use std::path::Path;

use anyhow::{Context, Result};

use super::graph::TraceGraph;
use super::model::Need;
use crate::config::TraceConfig;

/// Load a JSON array of records and resolve it into a graph.
pub fn load_graph(path: &Path, config: &TraceConfig) -> Result<TraceGraph> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading trace records {}", path.display()))?;
    parse_graph(&text, config).with_context(|| format!("in {}", path.display()))
}

pub fn parse_graph(text: &str, config: &TraceConfig) -> Result<TraceGraph> {
    let needs: Vec<Need> = serde_json::from_str(text).context("parsing trace records")?;
    let graph = TraceGraph::build(needs, config)?;
    log::info!(
        "Loaded {} trace records ({} dead links)",
        graph.len(),
        graph.dead_links().len()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_graph() {
        let text = r#"[
            { "id": "REQ_TX_001", "type": "requirement", "title": "TX gain" },
            { "id": "TC_TX_001", "type": "test_case", "title": "Sweep",
              "links": { "covers": ["REQ_TX_001"] } }
        ]"#;
        let graph = parse_graph(text, &TraceConfig::default()).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.incoming("REQ_TX_001", "covers"), ["TC_TX_001".to_string()]);
    }

    #[test]
    fn test_parse_graph_reports_trace_error() {
        let text = r#"[ { "id": "bad id", "type": "requirement", "title": "x" } ]"#;
        let err = parse_graph(text, &TraceConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid record id 'bad id'"));
    }

    #[test]
    fn test_parse_graph_rejects_unknown_type() {
        let text = r#"[ { "id": "REQ_00001", "type": "epic", "title": "x" } ]"#;
        assert!(parse_graph(text, &TraceConfig::default()).is_err());
    }
}
