//! Research feed sources against mocked upstream APIs.

use chrono::{Duration, Utc};
use scholar::feeds::{ArxivSource, Digest, FeedSource, PubMedSource, SemanticScholarSource};
use scholar::types::AppError;
use scholar::utils::toml_config::DigestConfig;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn atom_entry(id: &str, title: &str, published: &str) -> String {
    format!(
        r#"<entry>
    <id>http://arxiv.org/abs/{id}</id>
    <published>{published}</published>
    <title>{title}</title>
    <summary>  Abstract of
      {title}. </summary>
    <author><name>First Author</name></author>
    <link href="http://arxiv.org/pdf/{id}" rel="related" type="application/pdf"/>
    <link href="http://arxiv.org/abs/{id}" rel="alternate" type="text/html"/>
  </entry>"#
    )
}

fn atom_feed(entries: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query</title>
  {}
</feed>"#,
        entries.join("\n")
    )
}

fn hours_ago(hours: i64) -> String {
    (Utc::now() - Duration::hours(hours)).to_rfc3339()
}

// ============= arXiv =============

#[tokio::test]
async fn test_arxiv_query_and_cutoff() {
    let server = MockServer::start().await;
    let feed = atom_feed(&[
        atom_entry("2410.1", "Fresh Paper", &hours_ago(1)),
        atom_entry("2410.2", "Yesterday Paper", &hours_ago(20)),
        atom_entry("2301.9", "Stale Paper", &hours_ago(500)),
    ]);
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("search_query", "all:graph neural networks"))
        .and(query_param("start", "0"))
        .and(query_param("max_results", "5"))
        .and(query_param("sortBy", "submittedDate"))
        .and(query_param("sortOrder", "descending"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed))
        .expect(1)
        .mount(&server)
        .await;

    let source = ArxivSource::new(
        reqwest::Client::new(),
        Some(&format!("{}/api/query", server.uri())),
    );
    let papers = source
        .fetch("graph neural networks", 5, Utc::now() - Duration::hours(48))
        .await
        .unwrap();

    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].title, "Fresh Paper");
    assert_eq!(papers[0].summary, "Abstract of Fresh Paper.");
    assert_eq!(papers[0].link, "http://arxiv.org/abs/2410.1");
    assert_eq!(papers[0].authors, vec!["First Author"]);
    assert_eq!(papers[1].title, "Yesterday Paper");
}

#[tokio::test]
async fn test_arxiv_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = ArxivSource::new(reqwest::Client::new(), Some(&server.uri()));
    let err = source
        .fetch("x", 5, Utc::now() - Duration::hours(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Feed(ref msg) if msg.contains("500")));
}

// ============= Semantic Scholar =============

#[tokio::test]
async fn test_semantic_scholar_search() {
    let server = MockServer::start().await;
    let cutoff = Utc::now() - Duration::hours(48);
    let today = Utc::now().format("%Y-%m-%d").to_string();

    Mock::given(method("GET"))
        .and(path("/paper/search"))
        .and(query_param("query", "diffusion"))
        .and(query_param("limit", "100"))
        .and(query_param(
            "publicationDateOrYear",
            format!("{}:", cutoff.format("%Y-%m-%d")).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "data": [
                {
                    "paperId": "abc",
                    "title": "Diffusion  Models\nBeat GANs",
                    "abstract": "We show...",
                    "authors": [{"authorId": "1", "name": "Prafulla Dhariwal"}],
                    "url": "https://www.semanticscholar.org/paper/abc",
                    "publicationDate": today
                },
                {
                    "paperId": "old",
                    "title": "Old Diffusion",
                    "publicationDate": "2019-01-01"
                },
                {
                    "paperId": "nodate",
                    "title": "Undated Diffusion",
                    "abstract": null,
                    "url": null
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = SemanticScholarSource::new(reqwest::Client::new(), Some(&server.uri()));
    // limit is capped at 100
    let papers = source.fetch("diffusion", 250, cutoff).await.unwrap();

    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].source, "Semantic Scholar");
    assert_eq!(papers[0].title, "Diffusion Models Beat GANs");
    assert_eq!(papers[0].authors, vec!["Prafulla Dhariwal"]);
    assert!(papers[0].published.is_some());

    assert_eq!(papers[1].title, "Undated Diffusion");
    assert!(papers[1].summary.is_empty());
    assert_eq!(
        papers[1].link,
        "https://www.semanticscholar.org/paper/nodate"
    );
}

#[tokio::test]
async fn test_semantic_scholar_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/paper/search"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let source = SemanticScholarSource::new(reqwest::Client::new(), Some(&server.uri()));
    let err = source
        .fetch("x", 5, Utc::now() - Duration::hours(1))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("429"));
}

// ============= PubMed =============

#[tokio::test]
async fn test_pubmed_search_then_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("term", "radiology"))
        .and(query_param("retmax", "3"))
        .and(query_param("reldate", "3"))
        .and(query_param("datetype", "pdat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"count": "2", "idlist": ["111", "222"]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/esummary.fcgi"))
        .and(query_param("id", "111,222"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "uids": ["111", "222"],
                "111": {
                    "uid": "111",
                    "title": "AI in  radiology.",
                    "authors": [{"name": "Smith J", "authtype": "Author"}],
                    "sortpubdate": "2024/05/01 00:00"
                },
                "222": {"uid": "222", "title": "Second study."}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = PubMedSource::new(reqwest::Client::new(), Some(&server.uri()));
    let papers = source
        .fetch("radiology", 3, Utc::now() - Duration::hours(60))
        .await
        .unwrap();

    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].title, "AI in radiology.");
    assert_eq!(papers[0].link, "https://pubmed.ncbi.nlm.nih.gov/111/");
    assert_eq!(papers[0].authors, vec!["Smith J"]);
    assert!(papers[0].published.is_some());
    assert_eq!(papers[1].title, "Second study.");
    assert!(papers[1].published.is_none());
}

#[tokio::test]
async fn test_pubmed_no_results_skips_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"count": "0", "idlist": []}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/esummary.fcgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let source = PubMedSource::new(reqwest::Client::new(), Some(&server.uri()));
    let papers = source
        .fetch("nothing", 3, Utc::now() - Duration::hours(24))
        .await
        .unwrap();
    assert!(papers.is_empty());
}

// ============= Digest =============

#[tokio::test]
async fn test_digest_skips_failing_source() {
    let arxiv = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(atom_feed(&[atom_entry("2410.5", "Kept", &hours_ago(2))])),
        )
        .mount(&arxiv)
        .await;

    let pubmed = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&pubmed)
        .await;

    let config = DigestConfig {
        sources: vec!["arxiv".to_string(), "pubmed".to_string()],
        arxiv_url: Some(arxiv.uri()),
        pubmed_url: Some(pubmed.uri()),
        ..DigestConfig::default()
    };
    let digest = Digest::from_config(&config, &reqwest::Client::new()).unwrap();
    assert_eq!(digest.source_names(), vec!["arXiv", "PubMed"]);

    let papers = digest.collect("anything", 10, 24).await.unwrap();
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].title, "Kept");
}

#[test]
fn test_digest_unknown_source() {
    let config = DigestConfig {
        sources: vec!["arxiv".to_string(), "myspace".to_string()],
        ..DigestConfig::default()
    };
    let result = Digest::from_config(&config, &reqwest::Client::new());
    assert!(matches!(result, Err(AppError::Config(ref msg)) if msg.contains("myspace")));
}
