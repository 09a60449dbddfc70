//! CSV parser with encoding and delimiter auto-detection.
//!
//! Turns CSV text into [`Row`] records keyed by header. Blank rows are
//! dropped here so that the generator only ever sees usable rows.
//!
//! Delimiter detection and datatype inference ([`infer_datatype`]) only
//! pre-fill a draft configuration; generation never calls them.

mod infer;

pub use infer::infer_datatype;

use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::Row;

/// Candidate delimiters, in tie-break order.
const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Lines sampled for delimiter detection.
const DETECTION_SAMPLE_LINES: usize = 5;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Non-blank rows, in file order
    pub rows: Vec<Row>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers
    pub headers: Vec<String>,
}

impl ParseResult {
    /// Rows as JSON objects, for display or debugging.
    pub fn rows_as_json(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = self
                    .headers
                    .iter()
                    .map(|h| {
                        let value = row.get(h).cloned().unwrap_or_default();
                        (h.clone(), serde_json::Value::String(value))
                    })
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect()
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter from the first lines.
///
/// A candidate qualifies when every sampled line has a field count within
/// one of the average; the qualifying candidate with the most fields wins.
/// Needs at least two non-blank lines, otherwise `,` is returned.
pub fn detect_delimiter(content: &str) -> char {
    let lines: Vec<&str> = content
        .lines()
        .take(DETECTION_SAMPLE_LINES)
        .filter(|line| !line.trim().is_empty())
        .collect();

    let mut best = ',';
    if lines.len() < 2 {
        return best;
    }

    let mut max_columns = 0.0_f64;
    for &delimiter in &CANDIDATE_DELIMITERS {
        let counts: Vec<f64> = lines
            .iter()
            .map(|line| line.split(delimiter).count() as f64)
            .collect();
        let average = counts.iter().sum::<f64>() / counts.len() as f64;
        let consistent = counts.iter().all(|c| (c - average).abs() <= 1.0);

        if consistent && average > max_columns {
            max_columns = average;
            best = delimiter;
        }
    }

    best
}

/// Parse CSV text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use csv2ttl::parse_csv_str;
///
/// let rows = parse_csv_str("name;age\nAlice;30\nBob;25", ';').unwrap().rows;
///
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0]["name"], "Alice");
/// ```
pub fn parse_csv_str(content: &str, delimiter: char) -> CsvResult<ParseResult> {
    parse_with_metadata(content, delimiter, "utf-8".to_string())
}

/// Parse CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes, None)
}

/// Parse CSV bytes, detecting the encoding and, unless given, the delimiter.
pub fn parse_bytes_auto(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    parse_with_metadata(&content, delimiter, encoding)
}

fn parse_with_metadata(content: &str, delimiter: char, encoding: String) -> CsvResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(CsvError::DuplicateHeader(header.clone()));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }

    Ok(ParseResult {
        rows,
        encoding,
        delimiter,
        headers,
    })
}

/// The csv crate takes single-byte delimiters.
fn delimiter_byte(delimiter: char) -> CsvResult<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(CsvError::InvalidDelimiter(delimiter))
}

/// Drop rows whose every cell is blank.
pub fn filter_blank_rows(rows: &[Row]) -> Vec<Row> {
    rows.iter()
        .filter(|row| row.values().any(|v| !v.trim().is_empty()))
        .cloned()
        .collect()
}
