//! Knowledge graphs extracted from research papers
//!
//! The paper is first condensed with the research summary prompt, then a
//! second model call lists entities and relationships as JSON. Only
//! relationships between listed entities make it into the final graph,
//! which is rendered with vis-network or returned in its node/edge format.

pub mod extractor;
pub mod model;
pub mod pipeline;
pub mod render;

pub use extractor::GraphExtractor;
pub use model::{GraphDocument, GraphNode, KnowledgeGraph, Relationship, VisGraph};
pub use pipeline::{GraphPipeline, GraphRun};
pub use render::{render_html, write_html};
