//! Paper record produced by the normalizer.

use serde::{Deserialize, Serialize};

/// CSV column order for exported records
pub const CSV_HEADERS: &[&str] = &[
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

/// One retrieved publication.
///
/// Field order matches [`CSV_HEADERS`]; serde renames keep the two in sync.
/// Multi-valued fields are joined with `", "` and missing data is `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    /// `YYYY-MM-DD`, `YYYY-MM` or `YYYY`; free-text dates pass through
    #[serde(rename = "Publication Date")]
    pub publication_date: String,
    #[serde(rename = "Non-academic Author(s)")]
    pub non_academic_authors: String,
    #[serde(rename = "Company Affiliation(s)")]
    pub company_affiliations: String,
    #[serde(rename = "Corresponding Author Email")]
    pub corresponding_author_email: String,
}

impl PaperRecord {
    /// Record carrying only an identifier, as produced from a search id list
    pub fn with_id(pubmed_id: impl Into<String>) -> Self {
        Self {
            pubmed_id: pubmed_id.into(),
            ..Default::default()
        }
    }
}

/// Hit count and ids from a search envelope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSummary {
    /// Total matches reported by the server, which may exceed `ids.len()`
    pub count: u64,
    /// Returned ids, in server order
    pub ids: Vec<String>,
}
