//! Assembly of the vis-network graph stored for a course.

use serde_json::{json, Value};

use crate::models::GraphRecord;
use crate::pipeline::llm::CrossLink;

const EXTERNAL_NODE_COLOR: &str = "#81D4FA";
const EXTERNAL_NODE_SHAPE: &str = "diamond";
const EXTERNAL_NODE_LEVEL: u32 = 2;
const DEFAULT_LINK_TITLE: &str = "Cross-course connection";

/// Make every node `id` a string. Numbers become their decimal text,
/// missing or null ids become `""`.
pub fn normalize_nodes(nodes: Vec<GraphRecord>) -> Vec<GraphRecord> {
    nodes
        .into_iter()
        .map(|mut node| {
            let id = id_text(node.get("id"));
            node.insert("id".into(), Value::String(id));
            node
        })
        .collect()
}

/// Make every edge `from`/`to` a string, as for node ids.
pub fn normalize_edges(edges: Vec<GraphRecord>) -> Vec<GraphRecord> {
    edges
        .into_iter()
        .map(|mut edge| {
            let from = id_text(edge.get("from"));
            let to = id_text(edge.get("to"));
            edge.insert("from".into(), Value::String(from));
            edge.insert("to".into(), Value::String(to));
            edge
        })
        .collect()
}

fn id_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Add one external node per cross-link, plus a dashed `Related` edge from
/// the first local node whose label matches the link's source concept.
///
/// Matching is case-insensitive substring in either direction. Only nodes
/// present before the merge can anchor a link.
pub fn merge_cross_links(
    nodes: &mut Vec<GraphRecord>,
    edges: &mut Vec<GraphRecord>,
    links: &[CrossLink],
) {
    let local: Vec<(String, String)> = nodes
        .iter()
        .filter_map(|node| {
            let label = node.get("label")?.as_str()?.trim().to_lowercase();
            let id = id_text(node.get("id"));
            (!label.is_empty()).then_some((id, label))
        })
        .collect();

    for link in links {
        let external_id = format!("ext_{}_{}", link.to_course, link.to_concept);
        let reason = link.reason.as_deref().unwrap_or_default();
        nodes.push(record(json!({
            "id": external_id,
            "label": format!("{} ({})", link.to_concept, link.to_course),
            "shape": EXTERNAL_NODE_SHAPE,
            "color": EXTERNAL_NODE_COLOR,
            "level": EXTERNAL_NODE_LEVEL,
            "title": format!("From course: {}\nReason: {}", link.to_course, reason),
        })));

        let wanted = link.from_concept.trim().to_lowercase();
        if wanted.is_empty() {
            continue;
        }
        let anchor = local
            .iter()
            .find(|(_, label)| label.contains(&wanted) || wanted.contains(label.as_str()));

        if let Some((anchor_id, _)) = anchor {
            let title = if reason.is_empty() { DEFAULT_LINK_TITLE } else { reason };
            edges.push(record(json!({
                "from": anchor_id,
                "to": external_id,
                "dashes": true,
                "label": "Related",
                "title": title,
            })));
        }
    }
}

/// Fixed three-node graph used when the model produced no nodes.
pub fn placeholder_graph(course_name: &str) -> (Vec<GraphRecord>, Vec<GraphRecord>) {
    let nodes = vec![
        record(json!({"id": "1", "label": course_name, "shape": "box", "color": "#FFD54F", "level": 0})),
        record(json!({"id": "2", "label": "Preparation", "shape": "dot", "color": "#FFAB91", "level": 1})),
        record(json!({"id": "3", "label": "Core Ingredients", "shape": "dot", "color": "#FFAB91", "level": 1})),
    ];
    let edges = vec![
        record(json!({"from": "1", "to": "2"})),
        record(json!({"from": "1", "to": "3"})),
    ];
    (nodes, edges)
}

pub fn placeholder_tasks(course_name: &str, count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| format!("Cook {course_name} - Step {i}"))
        .collect()
}

fn record(value: Value) -> GraphRecord {
    match value {
        Value::Object(map) => map,
        _ => GraphRecord::new(),
    }
}
