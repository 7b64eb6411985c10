mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use common::mocks::MockLLMClient;
use common::{minimal_pdf, sample_paper_lines, test_config, test_state, test_state_with};
use scholar::api::create_router;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GRAPH_JSON: &str = r#"{
  "nodes": [
    {"id": "Transformer", "type": "model"},
    {"id": "Attention", "type": "concept"},
    {"id": "WMT 2014", "type": "dataset"}
  ],
  "relationships": [
    {"source": "Transformer", "target": "Attention", "type": "uses"},
    {"source": "Transformer", "target": "WMT 2014", "type": "evaluatedOn"},
    {"source": "Transformer", "target": "Ghost", "type": "haunts"}
  ]
}"#;

const VERDICT_JSON: &str = r#"{"winner": "pro", "final_decision": "PASS", "final_score": 82, "winning_reasoning": "Evidence held up."}"#;

fn server_with(llm: MockLLMClient) -> TestServer {
    TestServer::new(create_router(test_state(llm))).unwrap()
}

fn pdf_form() -> MultipartForm {
    let pdf = minimal_pdf(&sample_paper_lines());
    MultipartForm::new().add_part(
        "file",
        Part::bytes(pdf)
            .file_name("attention.pdf")
            .mime_type("application/pdf"),
    )
}

/// Debate replies: JSON for the judge, a short point for everyone else.
fn debate_llm() -> MockLLMClient {
    MockLLMClient::with_responder(|request, i| {
        let judging = request
            .system
            .as_deref()
            .is_some_and(|s| s.contains("impartial"));
        Ok(if judging {
            VERDICT_JSON.to_string()
        } else {
            format!("argument {}", i + 1)
        })
    })
}

/// Graph replies: the extraction JSON when the extraction system prompt is
/// set, a plain summary otherwise.
fn graph_llm() -> MockLLMClient {
    MockLLMClient::with_responder(|request, _| {
        Ok(if request.system.is_some() {
            GRAPH_JSON.to_string()
        } else {
            "The Transformer uses attention and is evaluated on WMT 2014.".to_string()
        })
    })
}

fn error_message(body: &Value) -> &str {
    body["error"].as_str().unwrap_or_default()
}

// ============= Health =============

#[tokio::test]
async fn test_health_reports_provider_and_model() {
    let server = server_with(MockLLMClient::new("unused"));

    let response = server.get("/api/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], "gemini");
    assert_eq!(body["model"], "mock-model");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let server = server_with(MockLLMClient::new("unused"));

    let response = server.get("/api/openapi.json").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let paths = body["paths"].as_object().unwrap();
    for route in [
        "/summarize",
        "/summarize_url",
        "/api/health",
        "/api/debate",
        "/api/knowledge-graph",
        "/api/digest",
    ] {
        assert!(paths.contains_key(route), "missing {}", route);
    }
}

// ============= Summarize =============

#[tokio::test]
async fn test_summarize_upload_returns_summary() {
    let llm = MockLLMClient::new("A concise summary.");
    let server = server_with(llm.clone());

    let response = server.post("/summarize").multipart(pdf_form()).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["summary"], "A concise summary.");

    let requests = llm.requests();
    assert_eq!(requests.len(), 1);
    let prompt = &requests[0].turns[0].text;
    assert!(prompt.contains("Context:"));
    assert!(prompt.to_lowercase().contains("attention"));
}

#[tokio::test]
async fn test_summarize_upload_is_cached() {
    let llm = MockLLMClient::new("Cached summary.");
    let server = server_with(llm.clone());

    server.post("/summarize").multipart(pdf_form()).await.assert_status_ok();
    let second = server.post("/summarize").multipart(pdf_form()).await;
    second.assert_status_ok();

    let body: Value = second.json();
    assert_eq!(body["summary"], "Cached summary.");
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_summarize_without_file_part() {
    let server = server_with(MockLLMClient::new("unused"));
    let form = MultipartForm::new().add_text("note", "no file here");

    let response = server.post("/summarize").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(error_message(&body), "No file part in the request");
}

#[tokio::test]
async fn test_summarize_without_filename() {
    let server = server_with(MockLLMClient::new("unused"));
    let form = MultipartForm::new().add_part("file", Part::bytes(b"%PDF-1.4".to_vec()));

    let response = server.post("/summarize").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(error_message(&body), "No file selected");
}

#[tokio::test]
async fn test_summarize_rejects_non_pdf() {
    let server = server_with(MockLLMClient::new("unused"));
    let form = MultipartForm::new().add_part(
        "file",
        Part::text("plain notes").file_name("notes.txt"),
    );

    let response = server.post("/summarize").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(error_message(&body), "Only PDF files are supported");
}

#[tokio::test]
async fn test_summarize_corrupted_pdf() {
    let llm = MockLLMClient::new("unused");
    let server = server_with(llm.clone());
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"this is not a pdf".to_vec()).file_name("broken.pdf"),
    );

    let response = server.post("/summarize").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_summarize_url_requires_url() {
    let server = server_with(MockLLMClient::new("unused"));

    let response = server.post("/summarize_url").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(error_message(&body), "URL not provided in the request body");

    let response = server.post("/summarize_url").json(&json!({"url": "  "})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summarize_url_rejects_non_pdf_link() {
    let server = server_with(MockLLMClient::new("unused"));

    let response = server
        .post("/summarize_url")
        .json(&json!({"url": "https://example.com/index.html"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        error_message(&body),
        "The provided URL does not appear to link to a PDF file."
    );

    let response = server
        .post("/summarize_url")
        .json(&json!({"url": "not a url"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(error_message(&body).starts_with("Invalid URL."));
}

#[tokio::test]
async fn test_summarize_url_downloads_pdf() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/papers/attention.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(minimal_pdf(&sample_paper_lines())),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let server = server_with(MockLLMClient::new("Downloaded summary."));
    let response = server
        .post("/summarize_url")
        .json(&json!({"url": format!("{}/papers/attention.pdf", mock_server.uri())}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["summary"], "Downloaded summary.");
}

#[tokio::test]
async fn test_summarize_url_download_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let server = server_with(MockLLMClient::new("unused"));
    let response = server
        .post("/summarize_url")
        .json(&json!({"url": format!("{}/missing.pdf", mock_server.uri())}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(error_message(&body).starts_with("Failed to download the file from the URL"));
}

// ============= Extract PDF =============

#[tokio::test]
async fn test_extract_pdf_returns_text_and_stats() {
    let server = server_with(MockLLMClient::new("unused"));

    let response = server.post("/api/extract-pdf").multipart(pdf_form()).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "attention.pdf");
    assert!(body["text"].as_str().unwrap().contains("Attention"));
    assert!(body["metadata"]["word_count"].as_u64().unwrap() > 10);
    assert!(body["metadata"]["char_count"].as_u64().unwrap() > 50);
}

// ============= Debate =============

#[tokio::test]
async fn test_debate_json_full_transcript() {
    let llm = debate_llm();
    let server = server_with(llm.clone());

    let response = server.post("/api/debate-json").multipart(pdf_form()).await;
    response.assert_status_ok();

    let body: Value = response.json();
    let messages = body["debate_messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["agent_role"], "critical");
    assert_eq!(messages[0]["round_number"], 1);
    assert_eq!(messages[3]["agent_role"], "pro");
    assert_eq!(messages[3]["round_number"], 2);

    assert_eq!(body["conclusions"].as_array().unwrap().len(), 2);
    assert_eq!(body["winner"], "pro");
    assert_eq!(body["final_decision"], "PASS");
    assert_eq!(body["final_score"], 82.0);
    assert_eq!(body["total_rounds"], 2);

    // 2 points per side, 2 conclusions, 1 verdict
    assert_eq!(llm.call_count(), 7);
}

#[tokio::test]
async fn test_debate_json_without_judge() {
    let mut config = test_config();
    config.debate.judge = false;
    let llm = debate_llm();
    let server = TestServer::new(create_router(test_state_with(config, llm.clone()))).unwrap();

    let response = server.post("/api/debate-json").multipart(pdf_form()).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body.get("winner").is_none());
    assert!(body.get("final_score").is_none());
    assert_eq!(llm.call_count(), 6);
}

#[tokio::test]
async fn test_debate_json_model_failure() {
    let server = server_with(MockLLMClient::failing_on_call(1));

    let response = server.post("/api/debate-json").multipart(pdf_form()).await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert!(error_message(&body).contains("Agent A (Opponent) failed"));
}

#[tokio::test]
async fn test_debate_stream_emits_ndjson_events() {
    let server = server_with(debate_llm());

    let response = server.post("/api/debate").multipart(pdf_form()).await;
    response.assert_status_ok();
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "application/x-ndjson"
    );

    let events: Vec<Value> = response
        .text()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    let kinds: Vec<&str> = events.iter().map(|e| e["type"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        vec![
            "start",
            "point",
            "point",
            "point",
            "point",
            "conclusion",
            "conclusion",
            "verdict",
            "done"
        ]
    );
    assert_eq!(events[0]["points_per_side"], 2);
    assert_eq!(events[7]["winner"], "pro");
}

#[tokio::test]
async fn test_debate_stream_reports_failure_as_last_event() {
    let server = server_with(MockLLMClient::failing_on_call(1));

    let response = server.post("/api/debate").multipart(pdf_form()).await;
    response.assert_status_ok();

    let text = response.text();
    let last: Value = serde_json::from_str(text.lines().last().unwrap()).unwrap();
    assert_eq!(last["type"], "error");
    assert!(last["error"].as_str().unwrap().contains("Mock LLM failure"));
}

#[tokio::test]
async fn test_debate_stream_stops_when_client_disconnects() {
    let mut config = test_config();
    config.debate.points_per_side = 5;
    config.debate.delay_ms = 300;
    let llm = debate_llm();
    let app = create_router(test_state_with(config, llm.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let boundary = "scholar-test-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"attention.pdf\"\r\n\
         Content-Type: application/pdf\r\n\r\n"
    )
    .into_bytes();
    body.extend(minimal_pdf(&sample_paper_lines()));
    body.extend(format!("\r\n--{boundary}--\r\n").into_bytes());

    let client = reqwest::Client::new();
    let mut response = client
        .post(format!("http://{}/api/debate", addr))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(body)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // Read until the first point arrives, then hang up
    let mut received = String::new();
    while !received.contains("\"point\"") {
        let chunk = response
            .chunk()
            .await
            .unwrap()
            .expect("stream ended before the first point");
        received.push_str(&String::from_utf8_lossy(&chunk));
    }
    drop(response);
    drop(client);

    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    let settled = llm.call_count();
    tokio::time::sleep(std::time::Duration::from_millis(1000)).await;

    assert_eq!(llm.call_count(), settled, "debate kept calling the model");
    // A full run would make 10 point calls, 2 conclusions and a verdict
    assert!(settled < 10, "made {} calls after the client left", settled);
}

#[tokio::test]
async fn test_debate_rejects_missing_file() {
    let server = server_with(debate_llm());
    let form = MultipartForm::new().add_text("file_name", "paper.pdf");

    let response = server.post("/api/debate").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============= Knowledge Graph =============

#[tokio::test]
async fn test_knowledge_graph_not_generated_yet() {
    let server = server_with(graph_llm());

    let response = server.get("/api/knowledge-graph").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(
        error_message(&body),
        "No knowledge graph has been generated yet"
    );

    let status: Value = server.get("/api/knowledge-graph/status").await.json();
    assert_eq!(status["connected"], true);
    assert_eq!(status["has_graph"], false);
    assert_eq!(status["model"], "mock-model");
}

#[tokio::test]
async fn test_knowledge_graph_build_then_fetch() {
    let llm = graph_llm();
    let server = server_with(llm.clone());

    let response = server
        .post("/api/knowledge-graph")
        .multipart(pdf_form())
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "attention.pdf");
    // The edge to the unlisted "Ghost" node is dropped
    assert_eq!(body["relationship_count"], 2);
    assert_eq!(body["node_count"], 3);
    assert_eq!(body["relationships"][1]["type"], "EVALUATED_ON");
    assert_eq!(body["nodes"][0]["type"], "Model");
    assert_eq!(body["graph_data"]["edges"].as_array().unwrap().len(), 2);

    // summary, then extraction
    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].system.is_none());
    assert!(requests[1].system.is_some());

    let latest: Value = server.get("/api/knowledge-graph").await.json();
    assert_eq!(latest["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(latest["edges"][0]["from"], "Transformer");
    assert_eq!(latest["edges"][0]["to"], "Attention");

    let status: Value = server.get("/api/knowledge-graph/status").await.json();
    assert_eq!(status["has_graph"], true);
}

#[tokio::test]
async fn test_knowledge_graph_keyword_without_match() {
    let llm = graph_llm();
    let server = server_with(llm.clone());

    let response = server
        .post("/api/knowledge-graph")
        .add_query_param("keywords", "protein folding, genome")
        .multipart(pdf_form())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(llm.call_count(), 0);
}

// ============= Digest =============

fn atom_feed(published: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2410.00001v1</id>
    <published>{published}</published>
    <title>Sparse   Attention
      at Scale</title>
    <summary>We study sparse attention.</summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
    <link href="http://arxiv.org/abs/2410.00001v1" rel="alternate" type="text/html"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v1</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All You Need</title>
    <summary>Old news.</summary>
    <author><name>Ashish Vaswani</name></author>
  </entry>
</feed>"#
    )
}

async fn digest_server(llm: MockLLMClient) -> (TestServer, MockServer) {
    let arxiv = MockServer::start().await;
    let recent = (Utc::now() - Duration::hours(2)).to_rfc3339();
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("sortBy", "submittedDate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(atom_feed(&recent)))
        .mount(&arxiv)
        .await;

    let mut config = test_config();
    config.digest.sources = vec!["arxiv".to_string()];
    config.digest.arxiv_url = Some(format!("{}/api/query", arxiv.uri()));

    let server = TestServer::new(create_router(test_state_with(config, llm))).unwrap();
    (server, arxiv)
}

#[tokio::test]
async fn test_digest_returns_recent_papers() {
    let (server, _arxiv) = digest_server(MockLLMClient::new("unused")).await;

    let response = server
        .get("/api/digest")
        .add_query_param("query", "attention")
        .add_query_param("hours_back", "24")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let papers = body["papers"].as_array().unwrap();
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0]["title"], "Sparse Attention at Scale");
    assert_eq!(papers[0]["source"], "arXiv");
    assert_eq!(papers[0]["authors"], json!(["Ada Lovelace", "Alan Turing"]));
    assert!(body["catchy_titles"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_digest_with_catchy_titles() {
    let llm = MockLLMClient::new("\"Attention, But Make It Sparse\"");
    let (server, _arxiv) = digest_server(llm.clone()).await;

    let response = server
        .get("/api/digest")
        .add_query_param("catchy", "true")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let titles = body["catchy_titles"].as_array().unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0]["original"], "Sparse Attention at Scale");
    assert_eq!(titles[0]["catchy"], "Attention, But Make It Sparse");
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_digest_validates_parameters() {
    let (server, _arxiv) = digest_server(MockLLMClient::new("unused")).await;

    let response = server
        .get("/api/digest")
        .add_query_param("max_results", "0")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(error_message(&body), "max_results must be at least 1");

    let response = server
        .get("/api/digest")
        .add_query_param("hours_back", "-5")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(error_message(&body), "hours_back must be positive");
}

#[tokio::test]
async fn test_digest_rejects_oversized_window() {
    let (server, arxiv) = digest_server(MockLLMClient::new("unused")).await;

    let response = server
        .get("/api/digest")
        .add_query_param("hours_back", "1000000000000000")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(error_message(&body), "hours_back is too large");

    let response = server
        .get("/api/digest")
        .add_query_param("hours_back", i64::MAX.to_string())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let requests = arxiv.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_digest_upstream_failure() {
    let arxiv = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&arxiv)
        .await;

    let mut config = test_config();
    config.digest.arxiv_url = Some(format!("{}/api/query", arxiv.uri()));
    let server = TestServer::new(create_router(test_state_with(
        config,
        MockLLMClient::new("unused"),
    )))
    .unwrap();

    let response = server.get("/api/digest").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
}
