//! E-utilities XML normalizer.
//!
//! Turns a raw payload into [`PaperRecord`]s, preserving document order.
//! Two envelopes are understood:
//!
//! - `<eSearchResult>` (ESearch): one id-only record per `<IdList><Id>`
//! - `<PubmedArticleSet>` (EFetch): one full record per `<PubmedArticle>`
//!
//! Anything that is not a well-formed document with one of these roots is a
//! [`PapersError::MalformedResponse`]. Missing optional fields inside a
//! well-formed article map to empty strings.

use crate::affiliation::{company_names, extract_email, is_non_academic};
use crate::error::{OptionExt, PapersError, Result};
use crate::models::{PaperRecord, SearchSummary};
use chrono::{Month, NaiveDate};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Convert a raw payload into paper records.
///
/// An envelope with zero matches yields `Ok(vec![])`. Duplicate PMIDs keep
/// their first occurrence.
pub fn normalize(payload: &str) -> Result<Vec<PaperRecord>> {
    let records = match parse_envelope(payload)? {
        Envelope::Search(summary) => summary.ids.into_iter().map(PaperRecord::with_id).collect(),
        Envelope::Articles(records) => records,
    };

    let mut seen = HashSet::new();
    let total = records.len();
    let unique: Vec<PaperRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.pubmed_id.clone()))
        .collect();

    if unique.len() != total {
        warn!(dropped = total - unique.len(), "Dropped duplicate PMIDs");
    }
    debug!(records = unique.len(), "Normalized payload");

    Ok(unique)
}

/// Read the hit count and id list from an ESearch payload
pub fn search_ids(payload: &str) -> Result<SearchSummary> {
    parse_envelope(payload)?
        .into_search()
        .ok_or_malformed("expected an eSearchResult envelope")
}

enum Envelope {
    Search(SearchSummary),
    Articles(Vec<PaperRecord>),
}

impl Envelope {
    fn into_search(self) -> Option<SearchSummary> {
        match self {
            Envelope::Search(summary) => Some(summary),
            Envelope::Articles(_) => None,
        }
    }
}

#[derive(Debug, Default)]
struct AuthorData {
    last_name: String,
    fore_name: String,
    initials: String,
    collective_name: String,
    affiliations: Vec<String>,
}

impl AuthorData {
    fn display_name(&self) -> String {
        let last = collapse_whitespace(&self.last_name);
        let fore = collapse_whitespace(&self.fore_name);
        let initials = collapse_whitespace(&self.initials);

        if !last.is_empty() && !fore.is_empty() {
            format!("{} {}", fore, last)
        } else if !last.is_empty() && !initials.is_empty() {
            format!("{} {}", initials, last)
        } else if !last.is_empty() {
            last
        } else {
            collapse_whitespace(&self.collective_name)
        }
    }
}

#[derive(Debug, Default)]
struct DateParts {
    year: String,
    month: String,
    day: String,
    medline_date: String,
}

impl DateParts {
    fn is_empty(&self) -> bool {
        self.year.trim().is_empty() && self.medline_date.trim().is_empty()
    }

    /// `YYYY-MM-DD`, `YYYY-MM` or `YYYY` when structured, else the free-text date
    fn format(&self) -> String {
        let year = self.year.trim();
        if year.is_empty() {
            return collapse_whitespace(&self.medline_date);
        }

        let Some(month) = parse_month(&self.month) else {
            return year.to_string();
        };

        let day = self.day.trim().parse::<u32>().ok();
        let valid_day = match (year.parse::<i32>().ok(), day) {
            (Some(y), Some(d)) => NaiveDate::from_ymd_opt(y, month, d).map(|_| d),
            _ => None,
        };

        match valid_day {
            Some(d) => format!("{}-{:02}-{:02}", year, month, d),
            None => format!("{}-{:02}", year, month),
        }
    }
}

/// Month as `1..=12` from `"03"`, `"3"`, `"Mar"` or `"March"`
fn parse_month(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(n) = raw.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    raw.parse::<Month>().ok().map(|m| m.number_from_month())
}

#[derive(Debug, Default)]
struct ArticleData {
    pmid: String,
    title: String,
    pub_date: DateParts,
    article_date: DateParts,
    authors: Vec<AuthorData>,
}

impl ArticleData {
    fn into_record(self) -> PaperRecord {
        let mut non_academic_authors: Vec<String> = Vec::new();
        let mut companies: Vec<String> = Vec::new();
        let mut email: Option<String> = None;

        for author in &self.authors {
            let mut flagged = false;
            for affiliation in &author.affiliations {
                if email.is_none() {
                    email = extract_email(affiliation);
                }
                if is_non_academic(affiliation) {
                    flagged = true;
                    for name in company_names(affiliation) {
                        if !companies.contains(&name) {
                            companies.push(name);
                        }
                    }
                }
            }

            if flagged {
                let name = author.display_name();
                if !name.is_empty() && !non_academic_authors.contains(&name) {
                    non_academic_authors.push(name);
                }
            }
        }

        let publication_date = if self.pub_date.is_empty() {
            self.article_date.format()
        } else {
            self.pub_date.format()
        };

        PaperRecord {
            pubmed_id: self.pmid.trim().to_string(),
            title: collapse_whitespace(&self.title),
            publication_date,
            non_academic_authors: non_academic_authors.join(", "),
            company_affiliations: companies.join(", "),
            corresponding_author_email: email.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    Search,
    Articles,
}

/// Event-driven state for one document
#[derive(Default)]
struct EnvelopeParser {
    stack: Vec<String>,
    root: Option<Root>,
    summary: SearchSummary,
    current_id: String,
    count_text: String,
    upstream_error: String,
    records: Vec<PaperRecord>,
    article: Option<ArticleData>,
    author: Option<AuthorData>,
    affiliation: String,
    /// Inside an `<ArticleDate>` after the first one of the article
    repeated_date: bool,
}

impl EnvelopeParser {
    /// Whether `child` sits directly inside `parent` somewhere on the stack
    fn within(&self, parent: &str, child: &str) -> bool {
        self.stack.windows(2).any(|w| w[0] == parent && w[1] == child)
    }

    fn top_is(&self, name: &str) -> bool {
        self.stack.last().is_some_and(|n| n == name)
    }

    fn open(&mut self, name: String) -> Result<()> {
        if self.stack.is_empty() {
            if self.root.is_some() {
                return Err(PapersError::MalformedResponse(
                    "multiple root elements".to_string(),
                ));
            }
            self.root = Some(match name.as_str() {
                "eSearchResult" => Root::Search,
                "PubmedArticleSet" => Root::Articles,
                other => {
                    return Err(PapersError::MalformedResponse(format!(
                        "unexpected root element <{}>",
                        other
                    )))
                }
            });
        } else if self.root == Some(Root::Articles) {
            match name.as_str() {
                "PubmedArticle" if self.stack.len() == 1 => {
                    self.article = Some(ArticleData::default());
                }
                "PubmedBookArticle" if self.stack.len() == 1 => {
                    debug!("Skipping book article");
                }
                "Author" if self.article.is_some() && self.top_is("AuthorList") => {
                    self.author = Some(AuthorData::default());
                }
                "Affiliation" if self.author.is_some() => self.affiliation.clear(),
                "ArticleDate" if self.top_is("Article") => {
                    self.repeated_date = self
                        .article
                        .as_ref()
                        .is_some_and(|a| !a.article_date.is_empty());
                }
                _ => {}
            }
        } else if self.root == Some(Root::Search) && name == "Id" {
            self.current_id.clear();
        }

        self.stack.push(name);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let name = self.stack.pop().ok_or_malformed("unmatched closing tag")?;

        match (self.root, name.as_str()) {
            (Some(Root::Search), "Id") if self.within("eSearchResult", "IdList") => {
                let id = self.current_id.trim();
                if !id.is_empty() {
                    self.summary.ids.push(id.to_string());
                }
            }
            (Some(Root::Search), "Count") if self.stack.len() == 1 => {
                let count = self.count_text.trim();
                self.summary.count = count.parse().map_err(|_| {
                    PapersError::MalformedResponse(format!("invalid Count value {:?}", count))
                })?;
            }
            (Some(Root::Search), "ERROR") if self.stack.len() == 1 => {
                return Err(PapersError::MalformedResponse(format!(
                    "server reported error: {}",
                    collapse_whitespace(&self.upstream_error)
                )));
            }
            (Some(Root::Articles), "Affiliation") => {
                if let Some(author) = self.author.as_mut() {
                    let text = collapse_whitespace(&self.affiliation);
                    if !text.is_empty() {
                        author.affiliations.push(text);
                    }
                }
            }
            (Some(Root::Articles), "ArticleDate") if self.top_is("Article") => {
                self.repeated_date = false;
            }
            (Some(Root::Articles), "Author") if self.top_is("AuthorList") => {
                if let (Some(author), Some(article)) = (self.author.take(), self.article.as_mut()) {
                    article.authors.push(author);
                }
            }
            (Some(Root::Articles), "PubmedArticle") if self.stack.len() == 1 => {
                if let Some(article) = self.article.take() {
                    if article.pmid.trim().is_empty() {
                        return Err(PapersError::MalformedResponse(
                            "PubmedArticle without a PMID".to_string(),
                        ));
                    }
                    self.records.push(article.into_record());
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if self.stack.is_empty() {
            if !text.trim().is_empty() {
                return Err(PapersError::MalformedResponse(
                    "text outside the root element".to_string(),
                ));
            }
            return Ok(());
        }

        match self.root {
            Some(Root::Search) => self.search_text(text),
            Some(Root::Articles) => self.article_text(text),
            None => {}
        }
        Ok(())
    }

    fn search_text(&mut self, text: &str) {
        let depth = self.stack.len();
        match self.stack.last().map(String::as_str) {
            Some("Id") if self.within("IdList", "Id") => self.current_id.push_str(text),
            Some("Count") if depth == 2 => self.count_text.push_str(text),
            Some("ERROR") if depth == 2 => self.upstream_error.push_str(text),
            _ => {}
        }
    }

    fn article_text(&mut self, text: &str) {
        if self.article.is_none() {
            return;
        }

        if self.author.is_some() {
            let in_affiliation = self.within("AffiliationInfo", "Affiliation");
            let field = match self.stack.last().map(String::as_str) {
                Some("LastName") if self.within("Author", "LastName") => Some(AuthorField::Last),
                Some("ForeName") if self.within("Author", "ForeName") => Some(AuthorField::Fore),
                Some("Initials") if self.within("Author", "Initials") => Some(AuthorField::Initials),
                _ if self.within("Author", "CollectiveName") => Some(AuthorField::Collective),
                _ => None,
            };

            if in_affiliation {
                self.affiliation.push_str(text);
            } else if let (Some(field), Some(author)) = (field, self.author.as_mut()) {
                let target = match field {
                    AuthorField::Last => &mut author.last_name,
                    AuthorField::Fore => &mut author.fore_name,
                    AuthorField::Initials => &mut author.initials,
                    AuthorField::Collective => &mut author.collective_name,
                };
                target.push_str(text);
            }
            return;
        }

        let in_pmid = self.within("MedlineCitation", "PMID") && self.top_is("PMID");
        let in_title = self.within("Article", "ArticleTitle");
        let in_pub_date = self.within("JournalIssue", "PubDate");
        let in_article_date = self.within("Article", "ArticleDate") && !self.repeated_date;
        let leaf = self.stack.last().cloned().unwrap_or_default();

        let Some(article) = self.article.as_mut() else {
            return;
        };

        if in_pmid {
            article.pmid.push_str(text);
        } else if in_title {
            article.title.push_str(text);
        } else if in_pub_date || in_article_date {
            let date = if in_pub_date {
                &mut article.pub_date
            } else {
                &mut article.article_date
            };
            match leaf.as_str() {
                "Year" => date.year.push_str(text),
                "Month" => date.month.push_str(text),
                "Day" => date.day.push_str(text),
                "MedlineDate" => date.medline_date.push_str(text),
                _ => {}
            }
        }
    }

    fn finish(self) -> Result<Envelope> {
        if let Some(open) = self.stack.last() {
            return Err(PapersError::MalformedResponse(format!(
                "unexpected end of document inside <{}>",
                open
            )));
        }

        match self.root {
            Some(Root::Search) => Ok(Envelope::Search(self.summary)),
            Some(Root::Articles) => Ok(Envelope::Articles(self.records)),
            None => Err(PapersError::MalformedResponse(
                "payload contains no XML document".to_string(),
            )),
        }
    }
}

#[derive(Clone, Copy)]
enum AuthorField {
    Last,
    Fore,
    Initials,
    Collective,
}

fn parse_envelope(payload: &str) -> Result<Envelope> {
    let mut reader = Reader::from_str(payload);
    let mut parser = EnvelopeParser::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                parser.open(element_name(e.local_name().as_ref()))?;
            }
            Ok(Event::Empty(e)) => {
                parser.open(element_name(e.local_name().as_ref()))?;
                parser.close()?;
            }
            Ok(Event::End(_)) => parser.close()?,
            Ok(Event::Text(t)) => {
                let text = match t.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(e) => {
                        debug!(error = %e, "Keeping unresolved entity text verbatim");
                        String::from_utf8_lossy(&t).into_owned()
                    }
                };
                parser.text(&text)?;
            }
            Ok(Event::CData(c)) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                parser.text(&text)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(PapersError::MalformedResponse(format!(
                    "XML error at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    parser.finish()
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
