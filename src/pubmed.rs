//! PubMed E-utilities client.
//!
//! Issues the outbound ESearch and EFetch requests and hands back the raw
//! response body. Each call is a single request: no retry, no pagination
//! beyond the configured `retmax`. ESearch is a GET; EFetch posts its id list
//! as a form body so long lists stay out of the URL.

use crate::config::FetchConfig;
use crate::error::{PapersError, Result};
use tracing::{debug, info, warn};

/// E-utilities client bound to one [`FetchConfig`]
#[derive(Debug, Clone)]
pub struct PubMedClient {
    client: reqwest::Client,
    config: FetchConfig,
}

impl PubMedClient {
    /// Create a client after validating the configuration
    pub fn new(config: FetchConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder()
            .user_agent(format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PapersError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Run one ESearch request and return the raw payload.
    ///
    /// `debug` only controls the trace line emitted before the request.
    ///
    /// # Errors
    ///
    /// * [`PapersError::InvalidQuery`] for a blank query
    /// * [`PapersError::Fetch`] for a non-success status
    /// * [`PapersError::Transport`] when no response was obtained
    pub async fn search(&self, query: &str, debug: bool) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PapersError::InvalidQuery("query is empty".to_string()));
        }

        if debug {
            info!(query = query, "Fetching papers for query");
        }

        let retmax = self.config.result_limit.to_string();
        let mut params: Vec<(&str, String)> = vec![
            ("db", self.config.database.clone()),
            ("term", query.to_string()),
            ("retmode", self.config.response_format.clone()),
            ("retmax", retmax),
        ];
        params.extend(self.config.api_params());

        let endpoint = &self.config.search_endpoint;
        self.send(endpoint, self.client.get(endpoint).query(&params)).await
    }

    /// Run one EFetch request for `ids` and return the raw article set.
    ///
    /// The ids travel in a form-encoded POST body, which E-utilities accepts
    /// for any list length.
    pub async fn fetch_details(&self, ids: &[String], debug: bool) -> Result<String> {
        if ids.is_empty() {
            return Err(PapersError::InvalidQuery("no ids to fetch".to_string()));
        }

        if debug {
            info!(count = ids.len(), "Fetching article details");
        }

        let mut params: Vec<(&str, String)> = vec![
            ("db", self.config.database.clone()),
            ("id", ids.join(",")),
            ("retmode", self.config.response_format.clone()),
        ];
        params.extend(self.config.api_params());

        let endpoint = &self.config.fetch_endpoint;
        self.send(endpoint, self.client.post(endpoint).form(&params)).await
    }

    async fn send(&self, endpoint: &str, request: reqwest::RequestBuilder) -> Result<String> {
        debug!(endpoint = endpoint, "Sending request");

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = endpoint, status = status.as_u16(), "Request failed");
            return Err(PapersError::Fetch {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(endpoint = endpoint, bytes = body.len(), "Response received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = FetchConfig::new().with_result_limit(0);
        assert!(matches!(PubMedClient::new(config), Err(PapersError::Config(_))));
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected_before_request() {
        // Unroutable endpoint: reaching the network would surface as Transport.
        let config = FetchConfig::new().with_base_url("http://127.0.0.1:9");
        let client = PubMedClient::new(config).expect("valid config");

        let result = client.search("   ", false).await;
        assert!(matches!(result, Err(PapersError::InvalidQuery(_))));
    }

    async fn mock_search_client() -> (MockServer, PubMedClient) {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<eSearchResult/>"))
            .mount(&mock_server)
            .await;

        let config = FetchConfig::new().with_base_url(&mock_server.uri());
        let client = PubMedClient::new(config).expect("valid config");
        (mock_server, client)
    }

    #[tokio::test]
    #[traced_test]
    async fn test_debug_emits_query_trace() {
        let (_server, client) = mock_search_client().await;

        client.search("crispr", true).await.expect("search should succeed");
        assert!(logs_contain("Fetching papers for query"));
        assert!(logs_contain("crispr"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_no_trace_without_debug() {
        let (_server, client) = mock_search_client().await;

        client.search("crispr", false).await.expect("search should succeed");
        assert!(!logs_contain("Fetching papers for query"));
    }

    #[tokio::test]
    async fn test_fetch_details_requires_ids() {
        let client = PubMedClient::new(FetchConfig::default()).expect("valid config");
        let result = client.fetch_details(&[], false).await;
        assert!(matches!(result, Err(PapersError::InvalidQuery(_))));
    }
}
