//! CSV reading and writing for question batches.
//!
//! The input file must carry the exact header
//! `qid,question,answer,research,citations,datetime`. Output files keep the
//! header, the column order, and the row order of the input.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use csv::ReaderBuilder;
use tracing::debug;

use askglean_shared::{AskGleanError, CSV_HEADERS, QuestionRecord, Result};

/// Timestamp suffix format for output file names.
const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Read all records from `path`, validating the header row.
pub fn read_records(path: &Path) -> Result<Vec<QuestionRecord>> {
    let mut reader = ReaderBuilder::new()
        .from_path(path)
        .map_err(|e| csv_err(path, e))?;

    let headers = reader.headers().map_err(|e| csv_err(path, e))?.clone();
    let actual: Vec<&str> = headers.iter().collect();
    if actual != CSV_HEADERS {
        return Err(AskGleanError::input_format(format!(
            "{}: expected header `{}`, found `{}`",
            path.display(),
            CSV_HEADERS.join(","),
            actual.join(","),
        )));
    }

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: QuestionRecord = result.map_err(|e| csv_err(path, e))?;
        records.push(record);
    }

    debug!(path = %path.display(), rows = records.len(), "read question records");
    Ok(records)
}

/// Write header plus all records to `path`, preserving input order.
pub fn write_records(path: &Path, records: &[QuestionRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_err(path, e))?;

    for record in records {
        writer.serialize(record).map_err(|e| csv_err(path, e))?;
    }
    writer.flush().map_err(|e| AskGleanError::io(path, e))?;

    debug!(path = %path.display(), rows = records.len(), "wrote question records");
    Ok(())
}

/// Output file for a run: `<stem>_<YYYYMMDD_HHMMSS>[_<user>].csv`, placed
/// next to the input file.
pub fn output_path_for(
    input: &Path,
    started_at: DateTime<Local>,
    user: Option<&str>,
) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("questions");
    let timestamp = started_at.format(OUTPUT_TIMESTAMP_FORMAT);

    let name = match user {
        Some(user) => format!("{stem}_{timestamp}_{user}.csv"),
        None => format!("{stem}_{timestamp}.csv"),
    };
    input.with_file_name(name)
}

/// Map a `csv::Error` onto the shared taxonomy: I/O failures keep their
/// path, everything else is an input format problem.
fn csv_err(path: &Path, e: csv::Error) -> AskGleanError {
    if e.is_io_error() {
        match e.into_kind() {
            csv::ErrorKind::Io(io) => AskGleanError::io(path, io),
            _ => AskGleanError::input_format(path.display().to_string()),
        }
    } else {
        AskGleanError::input_format(format!("{}: {e}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_records() -> Vec<QuestionRecord> {
        vec![
            QuestionRecord::new("1", "What is the VPN policy?"),
            QuestionRecord::new("2", "Where is the handbook?"),
        ]
    }

    #[test]
    fn write_then_read_preserves_rows_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.csv");

        let mut records = sample_records();
        records[0].answer = "Use the corporate VPN.".into();
        records[0].citations = "https://kb/a\nhttps://kb/b".into();
        records[0].datetime = "2026-08-06 12:00:00".into();

        write_records(&path, &records).unwrap();
        let read_back = read_records(&path).unwrap();

        assert_eq!(read_back, records);
        assert_eq!(read_back[0].citation_list(), vec!["https://kb/a", "https://kb/b"]);
    }

    #[test]
    fn written_header_matches_expected_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.csv");

        write_records(&path, &sample_records()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let first_line = content.lines().next().unwrap();
        assert_eq!(first_line, "qid,question,answer,research,citations,datetime");
    }

    #[test]
    fn missing_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "qid,question,answer,research,datetime\n1,q,,,\n").unwrap();

        let err = read_records(&path).unwrap_err();
        assert!(matches!(err, AskGleanError::InputFormat { .. }), "got {err}");
        assert!(err.to_string().contains("expected header"));
    }

    #[test]
    fn reordered_columns_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(
            &path,
            "question,qid,answer,research,citations,datetime\nq,1,,,,\n",
        )
        .unwrap();

        let err = read_records(&path).unwrap_err();
        assert!(matches!(err, AskGleanError::InputFormat { .. }), "got {err}");
    }

    #[test]
    fn header_only_file_yields_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "qid,question,answer,research,citations,datetime\n").unwrap();

        let records = read_records(&path).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");

        let err = read_records(&path).unwrap_err();
        assert!(matches!(err, AskGleanError::Io { .. }), "got {err}");
    }

    #[test]
    fn output_path_embeds_timestamp() {
        let started = Local.with_ymd_and_hms(2026, 8, 6, 9, 30, 5).unwrap();
        let out = output_path_for(Path::new("/data/questions.csv"), started, None);
        assert_eq!(out, PathBuf::from("/data/questions_20260806_093005.csv"));
    }

    #[test]
    fn output_path_appends_user_suffix() {
        let started = Local.with_ymd_and_hms(2026, 8, 6, 9, 30, 5).unwrap();
        let out = output_path_for(
            Path::new("/data/questions.csv"),
            started,
            Some("bot@acme.com"),
        );
        assert_eq!(
            out,
            PathBuf::from("/data/questions_20260806_093005_bot@acme.com.csv")
        );
    }
}
