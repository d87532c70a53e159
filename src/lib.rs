//! # get-papers-list
//!
//! Fetch PubMed papers for a query and flag authors affiliated with
//! companies rather than academic institutions.
//!
//! ## Modules
//!
//! - [`pubmed`] - E-utilities client (ESearch / EFetch)
//! - [`normalize`] - XML payload to [`PaperRecord`] conversion
//! - [`affiliation`] - Company vs academic affiliation heuristics
//! - [`pipeline`] - `fetch_papers`, the search-then-normalize sequence
//! - [`export`] - CSV export and console output
//! - [`config`] - Endpoint and limit configuration
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use get_papers_list::{fetch_papers, FetchConfig, PubMedClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PubMedClient::new(FetchConfig::from_env()?)?;
//!     let papers = fetch_papers(&client, "cancer immunotherapy", false).await?;
//!     println!("Found {} papers", papers.len());
//!     Ok(())
//! }
//! ```

pub mod affiliation;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod pubmed;

pub use config::FetchConfig;
pub use error::{PapersError, Result};
pub use models::{PaperRecord, SearchSummary, CSV_HEADERS};
pub use pipeline::fetch_papers;
pub use pubmed::PubMedClient;
