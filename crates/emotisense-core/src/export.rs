//! Session export
//!
//! Flat CSV with one row per record, plus JSON through serde. The `csv`
//! writer formats floats with their shortest round-trip representation,
//! so a save/load cycle is lossless.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::emotion::EmotionVector;
use crate::fusion::{DominantState, FusedMetrics};
use crate::session::{SessionId, SessionRecord};

pub const CSV_HEADER: &str = "timestamp_us,session_id,audio_stress_score,angry,disgust,fear,happy,sad,surprise,neutral,stress,engagement,confusion,confidence,dominant_state";

/// Column names in file order, matching [`CSV_HEADER`].
pub const CSV_COLUMNS: [&str; 15] = [
    "timestamp_us",
    "session_id",
    "audio_stress_score",
    "angry",
    "disgust",
    "fear",
    "happy",
    "sad",
    "surprise",
    "neutral",
    "stress",
    "engagement",
    "confusion",
    "confidence",
    "dominant_state",
];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing CSV header")]
    MissingHeader,
    #[error("unexpected CSV header: expected `{expected}`, found `{found}`")]
    HeaderMismatch { expected: String, found: String },
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid value `{value}` in column `{column}`")]
    InvalidField {
        line: usize,
        column: &'static str,
        value: String,
    },
    /// Row rejected while decoding a typed column (session id, state).
    #[error("line {line}: {message}")]
    InvalidRow { line: usize, message: String },
}

/// One CSV line. Field order is the column order.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    timestamp_us: i64,
    session_id: SessionId,
    audio_stress_score: f32,
    angry: f32,
    disgust: f32,
    fear: f32,
    happy: f32,
    sad: f32,
    surprise: f32,
    neutral: f32,
    stress: f32,
    engagement: f32,
    confusion: f32,
    confidence: f32,
    dominant_state: DominantState,
}

impl From<&SessionRecord> for CsvRow {
    fn from(r: &SessionRecord) -> Self {
        let [angry, disgust, fear, happy, sad, surprise, neutral] = *r.emotions.as_array();
        Self {
            timestamp_us: r.timestamp_us,
            session_id: r.session_id,
            audio_stress_score: r.audio_stress_score,
            angry,
            disgust,
            fear,
            happy,
            sad,
            surprise,
            neutral,
            stress: r.metrics.stress,
            engagement: r.metrics.engagement,
            confusion: r.metrics.confusion,
            confidence: r.metrics.confidence,
            dominant_state: r.metrics.dominant_state,
        }
    }
}

impl From<CsvRow> for SessionRecord {
    fn from(row: CsvRow) -> Self {
        Self {
            timestamp_us: row.timestamp_us,
            session_id: row.session_id,
            audio_stress_score: row.audio_stress_score,
            emotions: EmotionVector::from_array([
                row.angry,
                row.disgust,
                row.fear,
                row.happy,
                row.sad,
                row.surprise,
                row.neutral,
            ]),
            metrics: FusedMetrics {
                stress: row.stress,
                engagement: row.engagement,
                confusion: row.confusion,
                confidence: row.confidence,
                dominant_state: row.dominant_state,
            },
        }
    }
}

/// Default export file name, `session_<short id>_<start>.csv`.
pub fn session_file_name(session_id: SessionId, start_us: i64) -> String {
    format!("session_{}_{}.csv", session_id.short(), start_us)
}

/// Header plus one line per record.
pub fn to_csv_string(records: &[SessionRecord]) -> Result<String, ExportError> {
    let mut buf = Vec::with_capacity(CSV_HEADER.len() + 1 + records.len() * 160);
    write_csv(&mut buf, records)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

pub fn write_csv<W: Write>(writer: W, records: &[SessionRecord]) -> Result<(), ExportError> {
    // header written by hand so an empty session still gets one
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    wtr.write_record(CSV_COLUMNS)?;
    for r in records {
        wtr.serialize(CsvRow::from(r))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_csv<P: AsRef<Path>>(path: P, records: &[SessionRecord]) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    write_csv(BufWriter::new(file), records)?;
    log::info!("Saved {} records to {}", records.len(), path.as_ref().display());
    Ok(())
}

fn record_line(record: &csv::StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

/// Short rows and other reader errors.
fn read_error(err: csv::Error) -> ExportError {
    if let csv::ErrorKind::UnequalLengths {
        pos,
        expected_len,
        len,
    } = err.kind()
    {
        return ExportError::FieldCount {
            line: pos.as_ref().map_or(0, |p| p.line() as usize),
            expected: *expected_len as usize,
            found: *len as usize,
        };
    }
    ExportError::Csv(err)
}

/// Typed decoding errors, pinned to the offending column when known.
fn decode_error(record: &csv::StringRecord, err: csv::Error) -> ExportError {
    let line = record_line(record);
    let (field, message) = match err.kind() {
        csv::ErrorKind::Deserialize { err: de, .. } => (de.field(), de.to_string()),
        _ => (None, err.to_string()),
    };
    match field.and_then(|f| CSV_COLUMNS.get(f as usize).map(|c| (f as usize, *c))) {
        Some((idx, column)) => ExportError::InvalidField {
            line,
            column,
            value: record.get(idx).unwrap_or_default().to_string(),
        },
        None => ExportError::InvalidRow { line, message },
    }
}

/// Parse an export. The header must match exactly; fields are trimmed.
/// Line numbers in errors are 1-based.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<SessionRecord>, ExportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(read_error)?.clone();
    if headers.is_empty() {
        return Err(ExportError::MissingHeader);
    }
    if !headers.iter().eq(CSV_COLUMNS.iter().copied()) {
        return Err(ExportError::HeaderMismatch {
            expected: CSV_HEADER.to_string(),
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut records = Vec::new();
    let mut raw = csv::StringRecord::new();
    while rdr.read_record(&mut raw).map_err(read_error)? {
        let row: CsvRow = raw.deserialize(None).map_err(|e| decode_error(&raw, e))?;
        records.push(row.into());
    }
    Ok(records)
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<SessionRecord>, ExportError> {
    let file = File::open(path.as_ref())?;
    let records = read_csv(BufReader::new(file))?;
    log::debug!("Loaded {} records from {}", records.len(), path.as_ref().display());
    Ok(records)
}

/// Records as a pretty-printed JSON array.
pub fn to_json_string(records: &[SessionRecord]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn from_json_str(json: &str) -> Result<Vec<SessionRecord>, ExportError> {
    Ok(serde_json::from_str(json)?)
}
