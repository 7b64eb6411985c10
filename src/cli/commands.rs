//! Subcommand implementations
//!
//! Each command loads what it needs from the configuration, runs one
//! workflow and prints the result through [`Output`].

use super::output::Output;
use crate::debate::DebateOrchestrator;
use crate::documents::read_pdf;
use crate::feeds::{Digest, TitleRewriter};
use crate::graph::{write_html, GraphPipeline};
use crate::llm::{GenerationParams, LLMClient, Provider};
use crate::rag::{create_embedder, PdfSummarizer, SummaryCache};
use crate::transcript::{
    extract_video_id, load_transcript_file, transcript_to_text, TranscriptFetcher,
    TranscriptSummarizer,
};
use crate::types::{AppError, Result};
use crate::utils::toml_config::{ConfigManager, ScholarConfig};
use crate::{build_http_client, AppState};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Build the text generation client named in `[llm]`.
pub async fn build_llm(config: &ScholarConfig) -> Result<Arc<dyn LLMClient>> {
    let provider = Provider::from_config(&config.llm)?;
    tracing::debug!(provider = provider.name(), model = provider.model(), "Creating LLM client");
    Ok(Arc::from(provider.create_client().await?))
}

async fn read_pdf_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::Pdf(format!("PDF file not found: {}", path.display()))
        }
        _ => AppError::Pdf(format!("Failed to read {}: {}", path.display(), e)),
    })
}

fn is_url(source: &str) -> bool {
    let lower = source.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// `scholar serve`
pub async fn serve(
    manager: Arc<ConfigManager>,
    host: Option<String>,
    port: Option<u16>,
    output: &Output,
) -> Result<()> {
    let server = manager.config().server.clone();
    let addr = format!(
        "{}:{}",
        host.unwrap_or(server.host),
        port.unwrap_or(server.port)
    );

    if let Err(e) = manager.start_watching() {
        output.warning(&format!("Config hot reload disabled: {}", e));
    }

    let state = AppState::from_config(Arc::clone(&manager)).await?;
    output.success(&format!("Serving on http://{}", addr));
    crate::api::serve(state, &addr).await
}

/// `scholar summarize <PATH|URL>`
pub async fn summarize(config: &ScholarConfig, source: &str, output: &Output) -> Result<()> {
    let llm = build_llm(config).await?;
    let api_key = config.resolve_env(&config.llm.api_key_env);
    let base_url = if config.llm.provider == "gemini" {
        config.llm.base_url.as_deref()
    } else {
        None
    };
    let embedder = create_embedder(&config.embeddings, api_key.as_deref(), base_url)?;
    let summarizer = PdfSummarizer::new(
        llm,
        embedder,
        Arc::new(SummaryCache::new(0)),
        config.rag.clone(),
    );

    let summary = if is_url(source) {
        output.step(1, 2, &format!("Downloading {}", source));
        let http = build_http_client(config.llm.timeout_secs)?;
        output.step(2, 2, "Summarizing");
        summarizer.summarize_url(&http, source).await?
    } else {
        output.step(1, 2, &format!("Reading {}", source));
        let bytes = read_pdf_bytes(Path::new(source)).await?;
        output.step(2, 2, "Summarizing");
        summarizer.summarize_bytes(bytes).await?
    };

    output.section("Summary");
    output.body(&summary, config.debate.wrap_width);
    Ok(())
}

/// `scholar transcript <URL|ID> [--file PATH] [--lang L]...`
pub async fn transcript(
    config: &ScholarConfig,
    video: Option<&str>,
    file: Option<&Path>,
    languages: &[String],
    output: &Output,
) -> Result<()> {
    let snippets = match (file, video) {
        (Some(path), _) => {
            output.step(1, 2, &format!("Loading transcript from {}", path.display()));
            load_transcript_file(path).await?
        }
        (None, Some(video)) => {
            let video_id = extract_video_id(video).ok_or_else(|| {
                AppError::InvalidInput(format!("Not a YouTube URL or video id: {}", video))
            })?;
            let languages = if languages.is_empty() {
                config.transcript.languages.as_slice()
            } else {
                languages
            };

            output.step(1, 2, &format!("Fetching transcript for {}", video_id));
            let http = build_http_client(config.llm.timeout_secs)?;
            let fetcher = match config.transcript.base_url.as_deref() {
                Some(base) => TranscriptFetcher::with_base_url(http, base),
                None => TranscriptFetcher::new(http),
            };
            fetcher.fetch(&video_id, languages).await?
        }
        (None, None) => {
            return Err(AppError::InvalidInput(
                "Give a video URL or id, or --file".to_string(),
            ));
        }
    };

    let text = transcript_to_text(&snippets);
    output.step(2, 2, "Summarizing");
    let summarizer = TranscriptSummarizer::new(build_llm(config).await?);
    let summary = summarizer.summarize(&text).await?;

    output.section("Summary");
    output.body(&summary, config.debate.wrap_width);
    Ok(())
}

/// `scholar debate <PDF>`
pub async fn debate(
    config: &ScholarConfig,
    pdf: &Path,
    points: Option<usize>,
    no_judge: bool,
    output: &Output,
) -> Result<()> {
    let paper = read_pdf(pdf).await?;
    if paper.trim().is_empty() {
        return Err(AppError::Pdf(format!(
            "Could not extract text from {}",
            pdf.display()
        )));
    }

    let mut settings = config.debate.clone();
    if let Some(points) = points {
        settings.points_per_side = points.max(1);
    }
    if no_judge {
        settings.judge = false;
    }
    let width = settings.wrap_width;

    let orchestrator = DebateOrchestrator::new(
        build_llm(config).await?,
        settings,
        GenerationParams::from_config(&config.llm),
    );
    orchestrator
        .run(&paper, |event| output.debate_event(event, width))
        .await?;
    Ok(())
}

/// `scholar graph <PDF> [--output PATH] [--keyword K]...`
pub async fn graph(
    config: &ScholarConfig,
    pdf: &Path,
    out: Option<PathBuf>,
    keywords: &[String],
    output: &Output,
) -> Result<()> {
    let bytes = read_pdf_bytes(pdf).await?;
    let target = out.unwrap_or_else(|| config.graph.output.clone());

    output.step(1, 2, "Summarizing paper and extracting entities");
    let pipeline = GraphPipeline::new(build_llm(config).await?, config.graph.clone());
    let run = pipeline.run(bytes, keywords).await?;

    if run.graph.is_empty() {
        output.warning("The model found no relationships between listed entities");
    }

    output.step(2, 2, &format!("Rendering {}", target.display()));
    let title = pdf
        .file_stem()
        .map(|s| format!("Knowledge graph: {}", s.to_string_lossy()))
        .unwrap_or_else(|| "Knowledge graph".to_string());
    write_html(&run.graph, &title, &target).await?;

    output.kv("nodes", &run.graph.node_count().to_string());
    output.kv("relationships", &run.graph.edge_count().to_string());
    output.success(&format!("Knowledge graph saved to {}", target.display()));
    Ok(())
}

/// Options for `scholar digest`; `None` falls back to the config.
#[derive(Debug, Default)]
pub struct DigestOptions {
    pub query: Option<String>,
    pub max_results: Option<usize>,
    pub hours_back: Option<i64>,
    pub sources: Vec<String>,
    pub catchy: bool,
}

/// `scholar digest`
pub async fn digest(config: &ScholarConfig, options: DigestOptions, output: &Output) -> Result<()> {
    let mut settings = config.digest.clone();
    if !options.sources.is_empty() {
        settings.sources = options.sources;
    }
    let query = options.query.unwrap_or_else(|| settings.query.clone());
    let max_results = options.max_results.unwrap_or(settings.max_results);
    let hours_back = options.hours_back.unwrap_or(settings.hours_back);
    if max_results == 0 {
        return Err(AppError::InvalidInput(
            "--max-results must be at least 1".to_string(),
        ));
    }
    if hours_back <= 0 {
        return Err(AppError::InvalidInput(
            "--hours-back must be positive".to_string(),
        ));
    }

    let http = build_http_client(config.llm.timeout_secs)?;
    let digest = Digest::from_config(&settings, &http)?;
    output.info(&format!(
        "Fetching papers from {}...",
        digest.source_names().join(", ")
    ));
    let papers = digest.collect(&query, max_results, hours_back).await?;
    output.info(&format!("Total papers found: {}", papers.len()));

    if papers.is_empty() {
        output.warning("No papers found within the specified time window");
        return Ok(());
    }

    output.section("Research Papers Found");
    output.newline();
    for paper in &papers {
        output.paper(paper, settings.preview_chars);
    }

    if options.catchy {
        let rewriter = TitleRewriter::new(build_llm(config).await?);
        let titles = rewriter.rewrite(&papers, settings.catchy_titles).await?;
        output.catchy_titles(&titles);
    }
    Ok(())
}

/// `scholar config [--validate]`
pub fn show_config(manager: &ConfigManager, validate: bool, output: &Output) -> Result<()> {
    let config = manager.config();

    output.section("Configuration");
    output.kv("file", &manager.path().display().to_string());
    if !manager.path().exists() {
        output.warning("Config file not found, showing defaults");
    }

    if validate {
        config.validate()?;
        match config.llm_api_key() {
            Ok(_) => output.success(&format!("{} is set", config.llm.api_key_env)),
            Err(e) if config.llm.provider != "ollama" => output.warning(&e.to_string()),
            Err(_) => {}
        }
        output.success("Configuration is valid");
    }

    let rendered = toml::to_string_pretty(config.as_ref())
        .map_err(|e| AppError::Internal(format!("Failed to render config: {}", e)))?;
    output.newline();
    println!("{}", rendered);
    Ok(())
}
