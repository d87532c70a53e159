//! Fetch-and-normalize pipeline.
//!
//! Sequences the client and the normalizer. Errors from either step are
//! returned unchanged and no partial result is ever produced.

use crate::models::PaperRecord;
use crate::normalize::{normalize, search_ids};
use crate::pubmed::PubMedClient;
use crate::Result;
use tracing::{debug, info};

/// Search PubMed for `query` and return normalized records in server order.
///
/// With `fetch_details` enabled in the client config, the ids from the
/// search are resolved through EFetch so every field can be populated;
/// otherwise the records carry only their PubMed id.
pub async fn fetch_papers(client: &PubMedClient, query: &str, debug: bool) -> Result<Vec<PaperRecord>> {
    let search_payload = client.search(query, debug).await?;

    if !client.config().fetch_details {
        return normalize(&search_payload);
    }

    let summary = search_ids(&search_payload)?;
    if debug {
        info!(total = summary.count, returned = summary.ids.len(), "Search complete");
    }

    if summary.ids.is_empty() {
        debug!("No matches, skipping detail fetch");
        return Ok(Vec::new());
    }

    let details_payload = client.fetch_details(&summary.ids, debug).await?;
    normalize(&details_payload)
}
