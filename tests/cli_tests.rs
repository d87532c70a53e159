//! End-to-end runs of the `get-papers-list` binary against a mocked server.

use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ESEARCH_ONE: &str = r#"<eSearchResult>
    <Count>1</Count>
    <IdList><Id>12345678</Id></IdList>
</eSearchResult>"#;

const EFETCH_ONE: &str = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
    <PMID>12345678</PMID>
    <Article><ArticleTitle>Cancer Research in Biotech</ArticleTitle></Article>
</MedlineCitation></PubmedArticle></PubmedArticleSet>"#;

fn papers_command(endpoint: &str) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_get-papers-list"));
    command
        .env_remove("PUBMED_ESEARCH_URL")
        .env_remove("PUBMED_EFETCH_URL")
        .env_remove("PUBMED_RETMAX")
        .env_remove("RUST_LOG")
        .args(["--endpoint", endpoint]);
    command
}

#[tokio::test]
async fn test_http_failure_exits_non_zero_with_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let output = papers_command(&mock_server.uri())
        .arg("cancer")
        .output()
        .await
        .expect("binary should start");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("Error:"), "stderr was: {}", stderr);
    assert!(stderr.contains("503"), "stderr was: {}", stderr);
    assert!(output.stdout.is_empty());
}

#[tokio::test]
async fn test_successful_run_prints_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ESEARCH_ONE))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_ONE))
        .mount(&mock_server)
        .await;

    let output = papers_command(&mock_server.uri())
        .arg("cancer")
        .output()
        .await
        .expect("binary should start");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert_eq!(
        stdout.trim(),
        "Title: Cancer Research in Biotech, PubMed ID: 12345678"
    );
}
