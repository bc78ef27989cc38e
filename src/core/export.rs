/// Tabular export of assembled scripts.
///
/// Each script becomes one `{ index, text }` record with a 1-based index.
/// The records are written as CSV; spreadsheet front-ends can size columns
/// from [`COLUMNS`].

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One exported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub index: usize,
    pub text: String,
}

/// Display hint for one exported column, width in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnHint {
    pub header: &'static str,
    pub width: u16,
}

/// Narrow index column, wide text column.
pub const COLUMNS: [ColumnHint; 2] = [
    ColumnHint {
        header: "index",
        width: 10,
    },
    ColumnHint {
        header: "text",
        width: 100,
    },
];

pub fn to_records(combinations: &[String]) -> Vec<ExportRecord> {
    combinations
        .iter()
        .enumerate()
        .map(|(i, text)| ExportRecord {
            index: i + 1,
            text: text.clone(),
        })
        .collect()
}

/// Write records as CSV with an `index,text` header row.
pub fn write_csv<W: Write>(writer: W, records: &[ExportRecord]) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    if records.is_empty() {
        csv_writer.write_record(COLUMNS.iter().map(|c| c.header))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_file(path: &Path, records: &[ExportRecord]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_one_based_and_contiguous() {
        let scripts = vec!["a\nb".to_string(), "a\nc".to_string(), "d".to_string()];
        let records = to_records(&scripts);
        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.index, i + 1);
            assert_eq!(record.text, scripts[i]);
        }
    }

    #[test]
    fn empty_input_has_header_only() {
        let mut out = Vec::new();
        write_csv(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "index,text\n");
    }

    #[test]
    fn multiline_text_is_quoted() {
        let records = to_records(&["line one\nline two".to_string()]);
        let mut out = Vec::new();
        write_csv(&mut out, &records).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert_eq!(csv, "index,text\n1,\"line one\nline two\"\n");
    }

    #[test]
    fn csv_reads_back() {
        let scripts = vec!["x, y\nz".to_string(), "\"quoted\"".to_string()];
        let records = to_records(&scripts);
        let mut out = Vec::new();
        write_csv(&mut out, &records).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let back: Vec<ExportRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(back, records);
    }

    #[test]
    fn column_hints_are_narrow_then_wide() {
        assert_eq!(COLUMNS[0].header, "index");
        assert_eq!(COLUMNS[1].header, "text");
        assert!(COLUMNS[0].width < COLUMNS[1].width);
    }

    #[test]
    fn empty_file_export_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scripts.csv");
        write_csv_file(&path, &to_records(&[])).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "index,text\n");
    }
}
