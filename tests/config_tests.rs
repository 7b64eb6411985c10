//! Integration tests for the TOML configuration system
//!
//! These tests verify that configuration loading works end-to-end:
//! - Loading a file from disk, or falling back to defaults
//! - Validation of provider names and ranges
//! - Reloading through the ConfigManager

use scholar::utils::toml_config::{ConfigError, ConfigManager, ScholarConfig};
use scholar_vector::DistanceMetric;
use std::io::Write;
use std::time::Duration;

const FULL_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 8088
cors_origins = ["http://localhost:3000"]

[llm]
provider = "gemini"
model = "gemini-2.5-pro"
api_key_env = "SCHOLAR_TEST_GOOGLE_KEY"
temperature = 0.4

[embeddings]
provider = "gemini"
batch_size = 16

[rag]
chunk_size = 800
chunk_overlap = 100
top_k = 3
metric = "dot_product"

[debate]
points_per_side = 3
delay_ms = 0
judge = false

[graph]
keywords = ["transformer", "attention"]

[digest]
query = "retrieval augmented generation"
sources = ["arxiv", "semantic_scholar", "pubmed"]
hours_back = 48

[transcript]
languages = ["de", "en"]
"#;

fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("scholar.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_full_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, FULL_CONFIG);

    let config = ScholarConfig::load(&path).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8088);
    assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
    assert_eq!(config.llm.model, "gemini-2.5-pro");
    assert_eq!(config.llm.api_key_env, "SCHOLAR_TEST_GOOGLE_KEY");
    assert_eq!(config.embeddings.batch_size, 16);
    assert_eq!(config.rag.chunk_size, 800);
    assert_eq!(config.rag.top_k, 3);
    assert_eq!(config.rag.metric, DistanceMetric::DotProduct);
    assert_eq!(config.debate.points_per_side, 3);
    assert!(!config.debate.judge);
    assert_eq!(config.graph.keywords, vec!["transformer", "attention"]);
    assert_eq!(config.digest.sources.len(), 3);
    assert_eq!(config.digest.hours_back, 48);
    assert_eq!(config.transcript.languages, vec!["de", "en"]);
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ScholarConfig::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.llm.provider, "gemini");
    assert_eq!(config.digest.sources, vec!["arxiv"]);
    assert_eq!(config.rag.metric, DistanceMetric::Cosine);
}

#[test]
fn test_unknown_llm_provider_rejected() {
    let err = ScholarConfig::from_toml("[llm]\nprovider = \"skynet\"\n").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::UnknownProvider { kind: "llm", ref name } if name == "skynet"
    ));
}

#[test]
fn test_unknown_feed_source_rejected() {
    let err = ScholarConfig::from_toml("[digest]\nsources = [\"arxiv\", \"myspace\"]\n")
        .unwrap_err();
    assert!(err.to_string().contains("myspace"));
}

#[test]
fn test_overlap_must_be_smaller_than_chunk() {
    let err = ScholarConfig::from_toml("[rag]\nchunk_size = 100\nchunk_overlap = 100\n")
        .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(ref msg) if msg.starts_with("rag.chunk_overlap")));
}

#[test]
fn test_zero_points_rejected() {
    let err = ScholarConfig::from_toml("[debate]\npoints_per_side = 0\n").unwrap_err();
    assert!(err.to_string().contains("points_per_side"));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let err = ScholarConfig::from_toml("[server\nport = 1").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_config_manager_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[server]\nport = 7000\n");

    let manager = ConfigManager::new(&path).unwrap();
    assert_eq!(manager.config().server.port, 7000);
    assert_eq!(manager.path(), path.as_path());

    write_config(&dir, "[server]\nport = 7001\n");
    manager.reload().unwrap();
    assert_eq!(manager.config().server.port, 7001);
}

#[test]
fn test_config_manager_keeps_config_on_bad_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[server]\nport = 7000\n");
    let manager = ConfigManager::new(&path).unwrap();

    write_config(&dir, "[llm]\nprovider = \"nope\"\n");
    assert!(manager.reload().is_err());
    assert_eq!(manager.config().server.port, 7000);
}

#[tokio::test]
async fn test_config_manager_hot_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[debate]\npoints_per_side = 2\n");

    let manager = ConfigManager::new(&path).unwrap();
    manager.start_watching().unwrap();

    // Give the watcher time to register before writing
    tokio::time::sleep(Duration::from_millis(200)).await;
    write_config(&dir, "[debate]\npoints_per_side = 4\n");

    let mut reloaded = false;
    for _ in 0..50 {
        if manager.config().debate.points_per_side == 4 {
            reloaded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    manager.stop_watching();
    assert!(reloaded, "config was not hot-reloaded within 5s");
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = ScholarConfig::from_toml(FULL_CONFIG).unwrap();
    let rendered = toml::to_string_pretty(&config).unwrap();
    let parsed = ScholarConfig::from_toml(&rendered).unwrap();
    assert_eq!(parsed.digest.query, "retrieval augmented generation");
    assert_eq!(parsed.rag.chunk_overlap, 100);
}
