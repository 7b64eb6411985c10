use super::model::KnowledgeGraph;
use crate::types::{AppError, Result};
use serde_json::json;
use std::path::Path;

pub const BACKGROUND_COLOR: &str = "#222222";
pub const FONT_COLOR: &str = "white";
const VIS_NETWORK_JS: &str =
    "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js";

/// forceAtlas2Based layout used for every rendered graph.
pub fn physics_options() -> serde_json::Value {
    json!({
        "physics": {
            "forceAtlas2Based": {
                "gravitationalConstant": -100,
                "centralGravity": 0.01,
                "springLength": 200,
                "springConstant": 0.08
            },
            "minVelocity": 0.75,
            "solver": "forceAtlas2Based"
        },
        "edges": {
            "arrows": { "to": { "enabled": true } },
            "font": { "color": FONT_COLOR, "strokeWidth": 0 }
        },
        "nodes": {
            "font": { "color": FONT_COLOR }
        }
    })
}

// JSON inside <script> must not close the tag early
fn script_safe(value: &serde_json::Value) -> Result<String> {
    let text = serde_json::to_string(value)
        .map_err(|e| AppError::Internal(format!("Failed to serialize graph: {}", e)))?;
    Ok(text.replace("</", "<\\/"))
}

/// Standalone HTML page drawing `graph` with vis-network.
pub fn render_html(graph: &KnowledgeGraph, title: &str) -> Result<String> {
    let vis = graph.to_vis();

    let nodes: Vec<serde_json::Value> = vis
        .nodes
        .iter()
        .map(|n| {
            json!({
                "id": n.id,
                "label": n.label,
                "title": n.group,
                "group": n.group,
            })
        })
        .collect();
    let edges: Vec<serde_json::Value> = vis
        .edges
        .iter()
        .map(|e| {
            json!({
                "from": e.from,
                "to": e.to,
                "label": e.label.to_lowercase(),
                "title": e.title,
            })
        })
        .collect();

    let nodes_js = script_safe(&serde_json::Value::Array(nodes))?;
    let edges_js = script_safe(&serde_json::Value::Array(edges))?;
    let options_js = script_safe(&physics_options())?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{js}"></script>
<style>
  body {{ margin: 0; background-color: {bg}; }}
  #graph {{ width: 100%; height: 1200px; background-color: {bg}; }}
</style>
</head>
<body>
<div id="graph"></div>
<script>
  var nodes = new vis.DataSet({nodes});
  var edges = new vis.DataSet({edges});
  var options = {options};
  new vis.Network(document.getElementById("graph"), {{ nodes: nodes, edges: edges }}, options);
</script>
</body>
</html>
"#,
        title = html_escape::encode_text(title),
        js = VIS_NETWORK_JS,
        bg = BACKGROUND_COLOR,
        nodes = nodes_js,
        edges = edges_js,
        options = options_js,
    ))
}

/// Render and write the page to `path`.
pub async fn write_html(graph: &KnowledgeGraph, title: &str, path: &Path) -> Result<()> {
    let html = render_html(graph, title)?;
    tokio::fs::write(path, html).await.map_err(|e| {
        AppError::Internal(format!("Failed to write {}: {}", path.display(), e))
    })?;
    tracing::info!(path = %path.display(), nodes = graph.node_count(), "Knowledge graph written");
    Ok(())
}
