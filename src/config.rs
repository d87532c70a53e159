//! Fetch configuration.
//!
//! Endpoint URLs, database name and result cap live here instead of inline
//! literals so the client can be pointed at a substitute server.

use crate::error::{PapersError, Result};
use std::time::Duration;
use url::Url;

/// NCBI ESearch endpoint
pub const DEFAULT_SEARCH_ENDPOINT: &str =
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";

/// NCBI EFetch endpoint
pub const DEFAULT_FETCH_ENDPOINT: &str =
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

/// Upper bound NCBI accepts for `retmax` on a single ESearch call
pub const MAX_RESULT_LIMIT: u32 = 10_000;

/// Settings for [`PubMedClient`](crate::pubmed::PubMedClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// ESearch URL
    pub search_endpoint: String,
    /// EFetch URL
    pub fetch_endpoint: String,
    /// Entrez database (`db` parameter)
    pub database: String,
    /// Response format (`retmode` parameter)
    pub response_format: String,
    /// Maximum ids returned by one search (`retmax` parameter)
    pub result_limit: u32,
    /// Follow the search with an EFetch call for full article metadata
    pub fetch_details: bool,
    /// Request timeout; `None` keeps the transport default
    pub timeout_secs: Option<u64>,
    /// NCBI API key
    pub api_key: Option<String>,
    /// Contact email sent to NCBI
    pub email: Option<String>,
    /// Tool name sent to NCBI
    pub tool: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            fetch_endpoint: DEFAULT_FETCH_ENDPOINT.to_string(),
            database: "pubmed".to_string(),
            response_format: "xml".to_string(),
            result_limit: 100,
            fetch_details: true,
            timeout_secs: None,
            api_key: None,
            email: None,
            tool: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

impl FetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `PUBMED_*` / `NCBI_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("PUBMED_ESEARCH_URL") {
            config.search_endpoint = url;
        }
        if let Some(url) = lookup("PUBMED_EFETCH_URL") {
            config.fetch_endpoint = url;
        }
        if let Some(db) = lookup("PUBMED_DB") {
            config.database = db;
        }
        if let Some(retmax) = lookup("PUBMED_RETMAX") {
            config.result_limit = retmax.trim().parse().map_err(|_| {
                PapersError::Config(format!("PUBMED_RETMAX is not a number: {}", retmax))
            })?;
        }
        config.api_key = lookup("NCBI_API_KEY").filter(|k| !k.trim().is_empty());
        config.email = lookup("NCBI_EMAIL").filter(|e| !e.trim().is_empty());

        Ok(config)
    }

    /// Point both endpoints at one E-utilities base URL (e.g. a mock server)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.search_endpoint = format!("{}/esearch.fcgi", base);
        self.fetch_endpoint = format!("{}/efetch.fcgi", base);
        self
    }

    pub fn with_result_limit(mut self, limit: u32) -> Self {
        self.result_limit = limit;
        self
    }

    pub fn with_fetch_details(mut self, enabled: bool) -> Self {
        self.fetch_details = enabled;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Check URLs, database and limits before any request is built
    pub fn validate(&self) -> Result<()> {
        for (name, endpoint) in [
            ("search endpoint", &self.search_endpoint),
            ("fetch endpoint", &self.fetch_endpoint),
        ] {
            let parsed = Url::parse(endpoint)
                .map_err(|e| PapersError::Config(format!("Invalid {} {:?}: {}", name, endpoint, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(PapersError::Config(format!(
                    "Unsupported scheme for {}: {}",
                    name,
                    parsed.scheme()
                )));
            }
        }

        if self.database.trim().is_empty() {
            return Err(PapersError::Config("Database name is empty".to_string()));
        }

        if self.result_limit == 0 || self.result_limit > MAX_RESULT_LIMIT {
            return Err(PapersError::Config(format!(
                "Result limit must be between 1 and {}, got {}",
                MAX_RESULT_LIMIT, self.result_limit
            )));
        }

        if self.timeout_secs == Some(0) {
            return Err(PapersError::Config("Timeout must be at least 1 second".to_string()));
        }

        Ok(())
    }

    /// Optional NCBI identification parameters appended to every request
    pub(crate) fn api_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        if !self.tool.is_empty() {
            params.push(("tool", self.tool.clone()));
        }
        params
    }
}
