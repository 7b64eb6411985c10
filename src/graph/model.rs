use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub rel_type: String,
}

/// Raw extraction result. Relationships may name nodes that are not in
/// `nodes`; those are dropped when building a [`KnowledgeGraph`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GraphDocument {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<Relationship>,
}

// ============= Frontend Format =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VisNode {
    pub id: String,
    pub label: String,
    pub group: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VisEdge {
    pub from: String,
    pub to: String,
    pub label: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VisGraph {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
}

/// Directed graph of the entities that take part in at least one valid
/// relationship.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: DiGraph<GraphNode, String>,
}

impl KnowledgeGraph {
    pub fn from_document(doc: &GraphDocument) -> Self {
        let known: HashMap<&str, &GraphNode> =
            doc.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let valid: Vec<&Relationship> = doc
            .relationships
            .iter()
            .filter(|r| known.contains_key(r.source.as_str()) && known.contains_key(r.target.as_str()))
            .collect();

        let mut graph = DiGraph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

        // Insert touched nodes in document order
        for node in &doc.nodes {
            let touched = valid
                .iter()
                .any(|r| r.source == node.id || r.target == node.id);
            if touched && !indices.contains_key(node.id.as_str()) {
                indices.insert(node.id.as_str(), graph.add_node(node.clone()));
            }
        }

        for rel in valid {
            if let (Some(&a), Some(&b)) = (
                indices.get(rel.source.as_str()),
                indices.get(rel.target.as_str()),
            ) {
                graph.add_edge(a, b, rel.rel_type.clone());
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dropped_relationships = doc.relationships.len() - graph.edge_count(),
            "Built knowledge graph"
        );

        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Edges as `(source, target, type)`.
    pub fn edges(&self) -> impl Iterator<Item = (&GraphNode, &GraphNode, &str)> {
        self.graph.edge_references().map(|e| {
            (
                &self.graph[e.source()],
                &self.graph[e.target()],
                e.weight().as_str(),
            )
        })
    }

    /// Number of edges touching the node with `id`.
    pub fn degree(&self, id: &str) -> usize {
        self.graph
            .node_indices()
            .find(|&i| self.graph[i].id == id)
            .map(|i| {
                self.graph
                    .neighbors_undirected(i)
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self.nodes().cloned().collect(),
            relationships: self
                .edges()
                .map(|(s, t, ty)| Relationship {
                    source: s.id.clone(),
                    target: t.id.clone(),
                    rel_type: ty.to_string(),
                })
                .collect(),
        }
    }

    /// Node/edge lists in the shape the vis-network frontend expects.
    pub fn to_vis(&self) -> VisGraph {
        VisGraph {
            nodes: self
                .nodes()
                .map(|n| VisNode {
                    id: n.id.clone(),
                    label: n.id.clone(),
                    group: n.node_type.clone(),
                    title: format!("{}: {}", n.node_type, n.id),
                })
                .collect(),
            edges: self
                .edges()
                .map(|(s, t, ty)| VisEdge {
                    from: s.id.clone(),
                    to: t.id.clone(),
                    label: ty.to_string(),
                    title: format!("{} {} {}", s.id, ty, t.id),
                })
                .collect(),
        }
    }
}
