//! CSV import and export
//!
//! Upload: the header row names the fields, each data row becomes one record,
//! and every record of one upload shares a `BatchTimestamp`. Empty cells are
//! treated as missing fields.
//!
//! Download: `Text,Sentiment,Timestamp` columns in store order.

use csv::{ReaderBuilder, Writer};
use serde_json::{Map, Value};
use thiserror::Error;
use twsa_common::db::fields;
use twsa_common::Record;

/// Column order of exported files
pub const EXPORT_COLUMNS: [&str; 3] = [fields::TEXT, fields::SENTIMENT, fields::TIMESTAMP];

/// Suggested file name for downloads
pub const EXPORT_FILE_NAME: &str = "sentiment_data.csv";

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("CSV file has no header row")]
    MissingHeader,

    #[error("Malformed CSV at line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("CSV export failed: {0}")]
    Write(String),
}

fn malformed(err: &csv::Error) -> CsvError {
    CsvError::Malformed {
        line: err.position().map(|p| p.line()).unwrap_or(0),
        message: err.to_string(),
    }
}

/// Parse an uploaded CSV file into records stamped with `batch_timestamp`
///
/// Every row must have as many cells as the header. A file with a header but
/// no data rows yields no records.
pub fn parse_upload(bytes: &[u8], batch_timestamp: &str) -> Result<Vec<Record>, CsvError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers = reader.headers().map_err(|e| malformed(&e))?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::MissingHeader);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| malformed(&e))?;

        let mut document = Map::new();
        for (name, cell) in headers.iter().zip(row.iter()) {
            let name = name.trim();
            if name.is_empty() || cell.is_empty() {
                continue;
            }
            document.insert(name.to_string(), Value::String(cell.to_string()));
        }
        document.insert(
            fields::BATCH_TIMESTAMP.to_string(),
            Value::String(batch_timestamp.to_string()),
        );

        let record = Record::from_document(document).map_err(|e| CsvError::Malformed {
            line: row.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Serialize records for download
///
/// Missing fields are written as empty cells.
pub fn write_download(records: &[Record]) -> Result<Vec<u8>, CsvError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(EXPORT_COLUMNS)
        .map_err(|e| CsvError::Write(e.to_string()))?;

    for record in records {
        writer
            .write_record([
                record.text.as_deref().unwrap_or(""),
                record.sentiment.as_deref().unwrap_or(""),
                record.timestamp.as_deref().unwrap_or(""),
            ])
            .map_err(|e| CsvError::Write(e.to_string()))?;
    }

    writer.into_inner().map_err(|e| CsvError::Write(e.to_string()))
}
