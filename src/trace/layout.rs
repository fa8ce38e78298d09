use super::graph::TraceGraph;
use super::model::Need;
use crate::config::LayoutField;

/// Header line of a record: `Test Case: TX gain sweep (TC_TX_001)`.
pub fn head_line(need: &Need) -> String {
    format!("{}: {} ({})", need.kind, need.title, need.id)
}

/// Metadata lines of a record, in the order the layout lists them.
pub fn meta_lines(graph: &TraceGraph, need: &Need) -> Vec<(String, String)> {
    graph
        .config()
        .layout
        .iter()
        .map(|field| match field {
            LayoutField::Status => (
                "Status".to_string(),
                need.status.clone().unwrap_or_default(),
            ),
            LayoutField::Tags => ("Tags".to_string(), need.tags.join(", ")),
            LayoutField::Links { link, incoming } => {
                let link_type = graph.config().link_type(link);
                let (label, ids) = if *incoming {
                    (
                        link_type.map_or_else(|| link.clone(), |l| l.incoming.clone()),
                        graph.incoming(&need.id, link),
                    )
                } else {
                    (
                        link_type.map_or_else(|| link.clone(), |l| l.outgoing.clone()),
                        graph.outgoing(&need.id, link),
                    )
                };
                (capitalize(&label), ids.join(", "))
            }
            LayoutField::ValidatedBy => (
                "Validated by".to_string(),
                graph
                    .validated_by(&need.id)
                    .unwrap_or_default()
                    .join(", "),
            ),
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
