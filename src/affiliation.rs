//! Author affiliation heuristics.
//!
//! PubMed affiliations are free text such as
//! `"Department of Oncology, Pfizer Inc., New York, NY, USA. jane@pfizer.com"`.
//! An affiliation counts as non-academic when one of its comma-separated
//! segments names a company and that segment is not itself academic.

use regex::Regex;
use std::sync::OnceLock;

fn company_regex() -> &'static Regex {
    static COMPANY_RE: OnceLock<Regex> = OnceLock::new();
    COMPANY_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(inc|incorporated|ltd|limited|llc|corp|corporation|company|gmbh|ag|plc|pharma|pharmaceuticals?|biotech|biotechnology|biopharma|therapeutics|biosciences|biologics|diagnostics|genomics|laboratories)\b",
        )
        .expect("Failed to compile company regex")
    })
}

fn academic_regex() -> &'static Regex {
    static ACADEMIC_RE: OnceLock<Regex> = OnceLock::new();
    ACADEMIC_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(universit\w*|college|institut\w*|hospital|school|department|dept\.?|faculty|academy|clinic|foundation|centre|center|ministry)\b",
        )
        .expect("Failed to compile academic regex")
    })
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}")
            .expect("Failed to compile email regex")
    })
}

fn legal_suffix_regex() -> &'static Regex {
    static SUFFIX_RE: OnceLock<Regex> = OnceLock::new();
    SUFFIX_RE.get_or_init(|| {
        Regex::new(r"(?i)^(inc|incorporated|ltd|limited|llc|corp|corporation|co|gmbh|ag|plc|bv|nv|kk)\.?$")
            .expect("Failed to compile legal suffix regex")
    })
}

fn contact_regex() -> &'static Regex {
    static CONTACT_RE: OnceLock<Regex> = OnceLock::new();
    CONTACT_RE.get_or_init(|| {
        Regex::new(r"(?i)electronic address\s*:?").expect("Failed to compile contact regex")
    })
}

/// Split an affiliation into trimmed segments.
///
/// Email addresses and `Electronic address:` labels are removed first so the
/// text around them is still classified. A segment that is only a legal
/// suffix (`"Inc."`) is joined to the one before it.
fn segments(affiliation: &str) -> Vec<String> {
    let without_emails = email_regex().replace_all(affiliation, "");
    let cleaned = contact_regex().replace_all(&without_emails, "");

    let mut segments: Vec<String> = Vec::new();
    for part in cleaned.split([',', ';']) {
        let part = part.trim();
        if part.trim_matches(|c: char| c == '.' || c.is_whitespace()).is_empty() {
            continue;
        }
        match segments.last_mut() {
            Some(previous) if legal_suffix_regex().is_match(part) => {
                previous.push_str(", ");
                previous.push_str(part);
            }
            _ => segments.push(part.to_string()),
        }
    }
    segments
}

fn is_company_segment(segment: &str) -> bool {
    company_regex().is_match(segment) && !academic_regex().is_match(segment)
}

/// Whether the affiliation names a company rather than an academic body
pub fn is_non_academic(affiliation: &str) -> bool {
    segments(affiliation).iter().any(|s| is_company_segment(s))
}

/// Company names found in an affiliation, in order of appearance
pub fn company_names(affiliation: &str) -> Vec<String> {
    segments(affiliation)
        .iter()
        .filter(|s| is_company_segment(s))
        .map(|s| {
            s.trim_end_matches(|c: char| c == '.' || c.is_whitespace())
                .to_string()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// First email address in `text`, trailing punctuation stripped
pub fn extract_email(text: &str) -> Option<String> {
    email_regex()
        .find(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_academic_affiliations() {
        assert!(!is_non_academic(
            "Department of Medicine, Harvard Medical School, Boston, MA, USA."
        ));
        assert!(!is_non_academic(
            "Department of Pharmacology, University of Oxford, Oxford, UK."
        ));
        assert!(!is_non_academic(
            "Institute for Pharmaceutical Sciences, ETH Zurich, Switzerland."
        ));
        assert!(!is_non_academic(""));
    }

    #[test]
    fn test_company_affiliations() {
        assert!(is_non_academic("Pfizer Inc., New York, NY, USA."));
        assert!(is_non_academic(
            "Department of Oncology, Genentech Inc., South San Francisco, CA, USA."
        ));
        assert!(is_non_academic("Takeda Pharmaceutical Company Limited, Osaka, Japan."));
        assert!(is_non_academic("Roche Diagnostics GmbH, Penzberg, Germany"));
    }

    #[test]
    fn test_company_names() {
        assert_eq!(
            company_names("Department of Oncology, Pfizer Inc., New York, NY, USA."),
            vec!["Pfizer Inc".to_string()]
        );
        assert_eq!(
            company_names("Moderna Therapeutics; Novartis AG, Basel, Switzerland"),
            vec!["Moderna Therapeutics".to_string(), "Novartis AG".to_string()]
        );
        assert!(company_names("University of Tokyo, Tokyo, Japan").is_empty());
    }

    #[test]
    fn test_email_segment_is_not_a_company() {
        assert!(!is_non_academic(
            "Harvard Medical School, Boston, MA, USA. Electronic address: contact@biotech-inc.com"
        ));
    }

    #[test]
    fn test_legal_suffix_joins_company_name() {
        assert_eq!(
            company_names("Merck & Co., Inc., Kenilworth, NJ, USA."),
            vec!["Merck & Co., Inc".to_string()]
        );
        assert_eq!(
            company_names("Takeda Pharmaceuticals U.S.A., Inc., Lexington, MA, USA."),
            vec!["Takeda Pharmaceuticals U.S.A., Inc".to_string()]
        );
        assert!(is_non_academic("Merck & Co., Inc., Kenilworth, NJ, USA."));
    }

    #[test]
    fn test_company_next_to_email_is_kept() {
        assert!(is_non_academic("Genentech Inc. jane.doe@gene.com."));
        assert_eq!(
            company_names("Genentech Inc. jane.doe@gene.com."),
            vec!["Genentech Inc".to_string()]
        );

        let labelled = "South San Francisco, CA, USA; Genentech Inc. Electronic address: jane@gene.com.";
        assert!(is_non_academic(labelled));
        assert_eq!(company_names(labelled), vec!["Genentech Inc".to_string()]);
    }

    #[test]
    fn test_extract_email() {
        assert_eq!(
            extract_email("Pfizer Inc., New York, USA. jane.doe@pfizer.com."),
            Some("jane.doe@pfizer.com".to_string())
        );
        assert_eq!(
            extract_email("Electronic address: a.b@dept.uni-x.ac.uk"),
            Some("a.b@dept.uni-x.ac.uk".to_string())
        );
        assert_eq!(extract_email("No email here"), None);
    }
}
