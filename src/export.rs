//! Console and CSV output for paper records.

use crate::error::{PapersError, Result};
use crate::models::{PaperRecord, CSV_HEADERS};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write `records` to a CSV file at `path`.
///
/// The header row is always [`CSV_HEADERS`]. An empty slice is rejected
/// with [`PapersError::EmptyResult`] before the file is created.
pub fn save_csv(records: &[PaperRecord], path: &Path) -> Result<()> {
    if records.is_empty() {
        return Err(PapersError::EmptyResult);
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush()?;
    info!(path = %path.display(), rows = records.len(), "Saved CSV");
    Ok(())
}

/// Read records back from a file written by [`save_csv`]
pub fn read_csv(path: &Path) -> Result<Vec<PaperRecord>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let headers = rdr.headers()?;
    if !headers.iter().eq(CSV_HEADERS.iter().copied()) {
        return Err(PapersError::InvalidExport(format!(
            "unexpected header row: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut records = Vec::new();
    for row in rdr.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Print one `Title: ..., PubMed ID: ...` line per record
pub fn print_records<W: Write>(records: &[PaperRecord], out: &mut W) -> Result<()> {
    for record in records {
        writeln!(out, "Title: {}, PubMed ID: {}", record.title, record.pubmed_id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_records() -> Vec<PaperRecord> {
        vec![
            PaperRecord {
                pubmed_id: "12345678".to_string(),
                title: "Cancer Research in Biotech".to_string(),
                publication_date: "2023-01-01".to_string(),
                non_academic_authors: "John Doe, Jane Smith".to_string(),
                company_affiliations: "PharmaCorp, BioTech Ltd.".to_string(),
                corresponding_author_email: "johndoe@pharmacorp.com".to_string(),
            },
            PaperRecord {
                pubmed_id: "87654321".to_string(),
                title: "Genomic \"Studies\" in Pharma\nPart II".to_string(),
                publication_date: "2022-12".to_string(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_save_and_read_back() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("papers.csv");
        let records = sample_records();

        save_csv(&records, &path)?;

        let content = std::fs::read_to_string(&path)?;
        let header = content.lines().next().unwrap_or_default();
        assert_eq!(header, CSV_HEADERS.join(","));

        let loaded = read_csv(&path)?;
        assert_eq!(loaded, records);
        Ok(())
    }

    #[test]
    fn test_empty_export_creates_no_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.csv");

        assert!(matches!(save_csv(&[], &path), Err(PapersError::EmptyResult)));
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_read_rejects_foreign_header() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "id,name\n1,x\n")?;

        assert!(matches!(read_csv(&path), Err(PapersError::InvalidExport(_))));
        Ok(())
    }

    #[test]
    fn test_print_records() -> Result<()> {
        let mut out = Vec::new();
        print_records(&sample_records()[..1], &mut out)?;
        assert_eq!(
            String::from_utf8_lossy(&out),
            "Title: Cancer Research in Biotech, PubMed ID: 12345678\n"
        );
        Ok(())
    }
}
