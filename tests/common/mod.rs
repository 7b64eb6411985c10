//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mocks;

use mocks::{MockEmbedder, MockLLMClient};
use scholar::utils::toml_config::ScholarConfig;
use scholar::{AppState, ConfigManager};
use std::sync::Arc;

/// Config tuned for tests: no pauses between debate turns, small chunks.
pub fn test_config() -> ScholarConfig {
    let mut config = ScholarConfig::default();
    config.debate.delay_ms = 0;
    config.debate.points_per_side = 2;
    config.rag.chunk_size = 200;
    config.rag.chunk_overlap = 20;
    config.rag.top_k = 2;
    config
}

pub fn test_state_with(config: ScholarConfig, llm: MockLLMClient) -> AppState {
    let manager = Arc::new(ConfigManager::from_config(config));
    AppState::new(manager, Arc::new(llm), Arc::new(MockEmbedder::new()))
        .expect("state should build")
}

pub fn test_state(llm: MockLLMClient) -> AppState {
    test_state_with(test_config(), llm)
}

fn escape_pdf_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// A small single-page PDF with one text line per entry of `lines`, set in
/// Helvetica.
pub fn minimal_pdf(lines: &[&str]) -> Vec<u8> {
    let mut content = String::new();
    for (i, line) in lines.iter().enumerate() {
        let y = 720 - (i as i32) * 16;
        content.push_str(&format!(
            "BT /F1 12 Tf 72 {} Td ({}) Tj ET\n",
            y,
            escape_pdf_text(line)
        ));
    }

    let objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    pdf.into_bytes()
}

/// Paper text long enough to produce several chunks.
pub fn sample_paper_lines() -> Vec<&'static str> {
    vec![
        "Attention Is All You Need",
        "We propose a new network architecture based solely on attention.",
        "The method removes recurrence and convolutions entirely.",
        "Results on the WMT 2014 translation task improve the state of the art.",
        "In conclusion the Transformer generalizes well to other tasks.",
    ]
}
