//! Retrieval-augmented summarization with mocked model and embedder.

mod common;

use common::mocks::{MockEmbedder, MockLLMClient};
use common::{minimal_pdf, sample_paper_lines};
use scholar::rag::{PdfSummarizer, Retriever, SummaryCache, TextChunker};
use scholar::types::AppError;
use scholar::utils::toml_config::RagConfig;
use std::sync::Arc;

fn rag_config() -> RagConfig {
    RagConfig {
        chunk_size: 120,
        chunk_overlap: 0,
        top_k: 2,
        max_context_chars: 4000,
        temperature: 0.2,
        max_output_tokens: 512,
        cache_capacity: 8,
        ..RagConfig::default()
    }
}

fn summarizer(llm: &MockLLMClient, embedder: &MockEmbedder, cache: Arc<SummaryCache>) -> PdfSummarizer {
    PdfSummarizer::new(
        Arc::new(llm.clone()),
        Arc::new(embedder.clone()),
        cache,
        rag_config(),
    )
}

#[tokio::test]
async fn test_retriever_ranks_by_similarity() {
    let chunks = vec![
        "Background on recurrent networks.".to_string(),
        "Our method replaces recurrence with attention, attention everywhere.".to_string(),
        "Results improve BLEU by two points.".to_string(),
    ];
    let retriever = Retriever::build(Arc::new(MockEmbedder::new()), chunks)
        .await
        .unwrap();
    assert_eq!(retriever.len(), 3);

    let top = retriever.retrieve("attention", 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert!(top[0].contains("attention everywhere"));

    let top = retriever.retrieve("results", 2).await.unwrap();
    assert_eq!(top[0], "Results improve BLEU by two points.");
}

#[tokio::test]
async fn test_retriever_empty_document() {
    let retriever = Retriever::build(Arc::new(MockEmbedder::new()), Vec::new())
        .await
        .unwrap();
    assert!(retriever.is_empty());
    assert!(retriever.retrieve("anything", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_summarize_text_uses_rag_params() {
    let llm = MockLLMClient::new("Summary of the paper.");
    let embedder = MockEmbedder::new();
    let summarizer = summarizer(&llm, &embedder, Arc::new(SummaryCache::new(0)));

    let text = sample_paper_lines().join("\n\n");
    let summary = summarizer.summarize_text(&text).await.unwrap();
    assert_eq!(summary, "Summary of the paper.");

    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].params.temperature, Some(0.2));
    assert_eq!(requests[0].params.max_output_tokens, Some(512));
    assert!(requests[0].system.is_none());

    let prompt = &requests[0].turns[0].text;
    assert!(prompt.starts_with("Based on the following excerpts from a document"));
    assert!(prompt.trim_end().ends_with("Summary:"));

    // documents once, query once
    assert_eq!(embedder.call_count(), 2);
}

#[tokio::test]
async fn test_summarize_text_truncates_context() {
    let llm = MockLLMClient::new("ok");
    let config = RagConfig {
        max_context_chars: 40,
        ..rag_config()
    };
    let summarizer = PdfSummarizer::new(
        Arc::new(llm.clone()),
        Arc::new(MockEmbedder::new()),
        Arc::new(SummaryCache::new(0)),
        config,
    );

    let text = "attention ".repeat(200);
    summarizer.summarize_text(&text).await.unwrap();

    let prompt = &llm.requests()[0].turns[0].text;
    let context = prompt
        .split("Context:\n")
        .nth(1)
        .and_then(|rest| rest.split("\n\nSummary:").next())
        .unwrap();
    assert_eq!(context.chars().count(), 40);
}

#[tokio::test]
async fn test_summarize_bytes_cache_hit() {
    let llm = MockLLMClient::new("Cached summary.");
    let embedder = MockEmbedder::new();
    let cache = Arc::new(SummaryCache::new(4));
    let summarizer = summarizer(&llm, &embedder, Arc::clone(&cache));
    let pdf = minimal_pdf(&sample_paper_lines());

    let first = summarizer.summarize_bytes(pdf.clone()).await.unwrap();
    let second = summarizer.summarize_bytes(pdf).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(llm.call_count(), 1);
    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entry_count, 1);
}

#[tokio::test]
async fn test_summarize_bytes_cache_disabled() {
    let llm = MockLLMClient::scripted(&["first", "second"]);
    let embedder = MockEmbedder::new();
    let summarizer = summarizer(&llm, &embedder, Arc::new(SummaryCache::new(0)));
    let pdf = minimal_pdf(&sample_paper_lines());

    assert_eq!(summarizer.summarize_bytes(pdf.clone()).await.unwrap(), "first");
    assert_eq!(summarizer.summarize_bytes(pdf).await.unwrap(), "second");
    assert_eq!(llm.call_count(), 2);
}

#[tokio::test]
async fn test_summarize_bytes_without_text_layer() {
    let llm = MockLLMClient::new("unused");
    let summarizer = summarizer(&llm, &MockEmbedder::new(), Arc::new(SummaryCache::new(4)));

    let err = summarizer
        .summarize_bytes(minimal_pdf(&[]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(ref msg) if msg.starts_with("Could not extract text from PDF")));
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_summarize_model_failure_is_not_cached() {
    let llm = MockLLMClient::failing_on_call(0);
    let cache = Arc::new(SummaryCache::new(4));
    let summarizer = summarizer(&llm, &MockEmbedder::new(), Arc::clone(&cache));
    let pdf = minimal_pdf(&sample_paper_lines());

    assert!(summarizer.summarize_bytes(pdf.clone()).await.is_err());
    assert_eq!(cache.stats().entry_count, 0);

    assert_eq!(summarizer.summarize_bytes(pdf).await.unwrap(), "reply 2");
}

#[test]
fn test_chunker_rejects_overlap_larger_than_size() {
    assert!(TextChunker::new(100, 100).is_err());
    assert!(TextChunker::new(100, 20).is_ok());
}
