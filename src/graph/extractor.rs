use super::model::{GraphDocument, GraphNode, Relationship};
use crate::llm::structured::parse_json_reply;
use crate::llm::{CompletionRequest, GenerationParams, LLMClient};
use crate::types::{AppError, ChatTurn, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

const EXTRACTION_SYSTEM_PROMPT: &str = "You are a top-tier algorithm designed for extracting \
information in structured formats to build a knowledge graph. Capture as much information from \
the text as possible without sacrificing accuracy. Do not add any information that is not \
explicitly mentioned in the text.\n\
Nodes represent entities and concepts. Use basic, general types for node labels: for example, \
when you identify an entity representing a person, always label it as \"Person\". Node ids \
should be names or human-readable identifiers found in the text.\n\
Relationships represent connections between entities or concepts. Use general and timeless \
relationship types such as \"USES\" instead of \"USED_IN_2017\".\n\
If an entity is mentioned multiple times by different names, always use the most complete \
identifier for that entity.";

fn extraction_prompt(text: &str) -> String {
    format!(
        "Extract the knowledge graph from the following text. Reply with only a JSON object of \
         the form {{\"nodes\": [{{\"id\": \"...\", \"type\": \"...\"}}], \"relationships\": \
         [{{\"source\": \"node id\", \"target\": \"node id\", \"type\": \"RELATIONSHIP_TYPE\"}}]}}.\n\n\
         Text:\n{}",
        text
    )
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEndpoint {
    Id(String),
    Node {
        id: String,
        #[serde(default, rename = "type")]
        node_type: Option<String>,
    },
}

impl RawEndpoint {
    fn into_parts(self) -> (String, Option<String>) {
        match self {
            RawEndpoint::Id(id) => (id, None),
            RawEndpoint::Node { id, node_type } => (id, node_type),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default, rename = "type")]
    node_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRelationship {
    source: RawEndpoint,
    target: RawEndpoint,
    #[serde(default, rename = "type")]
    rel_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGraph {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    relationships: Vec<RawRelationship>,
}

/// "research PAPER" -> "Research paper"
pub fn normalize_node_type(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => "Node".to_string(),
    }
}

/// "is based on" / "isBasedOn" -> "IS_BASED_ON"
pub fn normalize_relationship_type(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase() && prev_lower && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_uppercase());
            prev_lower = c.is_lowercase() || c.is_numeric();
        } else {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        "RELATED_TO".to_string()
    } else {
        out
    }
}

impl From<RawGraph> for GraphDocument {
    fn from(raw: RawGraph) -> Self {
        let mut nodes: Vec<GraphNode> = Vec::with_capacity(raw.nodes.len());
        let mut seen: HashMap<String, usize> = HashMap::new();

        let mut add_node = |nodes: &mut Vec<GraphNode>, id: &str, node_type: Option<&str>| {
            let id = id.trim();
            if id.is_empty() || seen.contains_key(id) {
                return;
            }
            seen.insert(id.to_string(), nodes.len());
            nodes.push(GraphNode {
                id: id.to_string(),
                node_type: normalize_node_type(node_type.unwrap_or_default()),
            });
        };

        for node in &raw.nodes {
            add_node(&mut nodes, &node.id, node.node_type.as_deref());
        }

        let mut relationships = Vec::with_capacity(raw.relationships.len());
        for rel in raw.relationships {
            let (source, source_type) = rel.source.into_parts();
            let (target, target_type) = rel.target.into_parts();

            // Inline endpoint objects carry their own type and count as listed
            if source_type.is_some() {
                add_node(&mut nodes, &source, source_type.as_deref());
            }
            if target_type.is_some() {
                add_node(&mut nodes, &target, target_type.as_deref());
            }

            let source = source.trim().to_string();
            let target = target.trim().to_string();
            if source.is_empty() || target.is_empty() {
                continue;
            }
            relationships.push(Relationship {
                source,
                target,
                rel_type: normalize_relationship_type(rel.rel_type.as_deref().unwrap_or_default()),
            });
        }

        GraphDocument {
            nodes,
            relationships,
        }
    }
}

/// Turns free text into a [`GraphDocument`] with one model call.
pub struct GraphExtractor {
    llm: Arc<dyn LLMClient>,
}

impl GraphExtractor {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    pub async fn extract(&self, text: &str) -> Result<GraphDocument> {
        if text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "No text to extract a knowledge graph from".to_string(),
            ));
        }

        let request = CompletionRequest {
            system: Some(EXTRACTION_SYSTEM_PROMPT.to_string()),
            turns: vec![ChatTurn::user(extraction_prompt(text))],
            params: GenerationParams {
                temperature: Some(0.0),
                max_output_tokens: None,
            },
        };
        let reply = self.llm.complete(&request).await?;
        let raw: RawGraph = parse_json_reply(&reply)?;
        let doc = GraphDocument::from(raw);

        tracing::info!(
            nodes = doc.nodes.len(),
            relationships = doc.relationships.len(),
            "Extracted graph document"
        );
        Ok(doc)
    }
}
