//! Seed files: a header row, then `category_id, item_vid` rows.

use std::io::Read;
use std::path::Path;

use crate::error::SyncError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRow {
    /// Kept as text; producers decide how to treat values that do not parse.
    pub category_id: String,
    pub item_vid: String,
}

/// Reads a seed file from disk.
///
/// # Errors
///
/// Returns [`SyncError::Seed`] if the file cannot be opened or parsed.
pub fn read_seed_file(path: &Path) -> Result<Vec<SeedRow>, SyncError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    collect_rows(reader)
}

/// Reads seed rows from any reader.
///
/// # Errors
///
/// Returns [`SyncError::Seed`] on malformed input.
pub fn read_seed<R: Read>(input: R) -> Result<Vec<SeedRow>, SyncError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    collect_rows(reader)
}

fn collect_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<SeedRow>, SyncError> {
    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let category_id = record.get(0).unwrap_or_default();
        let item_vid = record.get(1).unwrap_or_default();
        if item_vid.is_empty() {
            tracing::debug!(line = line + 2, "seed row without item_vid skipped");
            continue;
        }
        rows.push(SeedRow {
            category_id: category_id.to_string(),
            item_vid: item_vid.to_string(),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_row_is_skipped_and_fields_trimmed() {
        let rows = read_seed("category_id,item_vid\n 1203 , abc \n1204,def\n".as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![
                SeedRow {
                    category_id: "1203".into(),
                    item_vid: "abc".into()
                },
                SeedRow {
                    category_id: "1204".into(),
                    item_vid: "def".into()
                },
            ]
        );
    }

    #[test]
    fn rows_without_item_vid_are_dropped() {
        let rows = read_seed("category_id,item_vid\n1203\n1203,\n1204,x\n".as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_vid, "x");
    }

    #[test]
    fn header_only_file_has_no_rows() {
        assert!(read_seed("category_id,item_vid\n".as_bytes())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.csv");
        std::fs::write(&path, "category_id,item_vid\n7,v7\n").unwrap();
        let rows = read_seed_file(&path).unwrap();
        assert_eq!(rows[0].category_id, "7");
    }

    #[test]
    fn missing_file_is_a_seed_error() {
        let err = read_seed_file(Path::new("/nonexistent/seed.csv")).unwrap_err();
        assert!(matches!(err, SyncError::Seed(_)));
    }
}
