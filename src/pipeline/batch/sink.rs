use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::AnalysisRecord;
use crate::pipeline::analysis::AnalysisError;

/// What gets handed to a sink for one analyzed email.
#[derive(Debug, Clone)]
pub struct NewAnalysis<'a> {
    pub record: &'a AnalysisRecord,
    pub email_text: &'a str,
    pub email_date: Option<&'a str>,
    /// Diagnostic for an analysis that fell back after a hard failure.
    pub error: Option<&'a str>,
}

/// Storage for finished analyses. Returns the identifier it assigned.
pub trait AnalysisSink: Send + Sync {
    fn save(&self, analysis: &NewAnalysis<'_>) -> Result<String, AnalysisError>;
}

/// One line of the JSONL output.
#[derive(Serialize)]
struct StoredAnalysis<'a> {
    id: String,
    analyzed_at: DateTime<Utc>,
    email_date: Option<&'a str>,
    email_day: Option<NaiveDate>,
    email_text: &'a str,
    #[serde(flatten)]
    record: &'a AnalysisRecord,
    error: Option<&'a str>,
}

/// Append-only JSON Lines sink. Each `save` writes and flushes one line.
pub struct JsonlSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonlSink {
    /// Create (or truncate) `path`.
    pub fn create(path: &Path) -> Result<Self, AnalysisError> {
        let file = File::create(path)?;
        Ok(Self::from_file(file))
    }

    /// Open `path` for appending, creating it if missing.
    pub fn append(path: &Path) -> Result<Self, AnalysisError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: File) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(file)),
        }
    }
}

impl AnalysisSink for JsonlSink {
    fn save(&self, analysis: &NewAnalysis<'_>) -> Result<String, AnalysisError> {
        let id = Uuid::new_v4().to_string();
        let row = StoredAnalysis {
            id: id.clone(),
            analyzed_at: Utc::now(),
            email_date: analysis.email_date,
            email_day: analysis.email_date.and_then(parse_email_date),
            email_text: analysis.email_text,
            record: analysis.record,
            error: analysis.error,
        };
        let line = serde_json::to_string(&row)?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| AnalysisError::Io(std::io::Error::other("sink writer poisoned")))?;
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(id)
    }
}

/// Calendar day of an email date in any of the common export formats.
pub fn parse_email_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d %b %Y"];
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Sentiment};
    use std::collections::HashSet;

    fn record() -> AnalysisRecord {
        AnalysisRecord {
            sentiment: Sentiment::Negative,
            classification: Category::MaintenanceRepairs,
            confidence: 100.0,
            tags: vec!["Pepsi machine".into()],
            raw_response: None,
        }
    }

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn writes_one_parseable_line_per_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let sink = JsonlSink::create(&path).unwrap();
        let record = record();

        let id = sink
            .save(&NewAnalysis {
                record: &record,
                email_text: "The Pepsi machine is not cooling.",
                email_date: Some("2024-03-05 09:15:00"),
                error: None,
            })
            .unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 1);
        let row = &lines[0];
        assert_eq!(row["id"], id.as_str());
        assert_eq!(row["email_date"], "2024-03-05 09:15:00");
        assert_eq!(row["email_day"], "2024-03-05");
        assert_eq!(row["sentiment"], "Negative");
        assert_eq!(row["classification"], "Maintenance/Repairs");
        assert_eq!(row["confidence"], 100);
        assert_eq!(row["tags"], serde_json::json!(["Pepsi machine"]));
        assert!(row["error"].is_null());
        assert!(row["analyzed_at"].is_string());
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn ids_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let sink = JsonlSink::create(&path).unwrap();
        let record = record();
        let ids: HashSet<String> = (0..20)
            .map(|_| {
                sink.save(&NewAnalysis {
                    record: &record,
                    email_text: "x",
                    email_date: None,
                    error: None,
                })
                .unwrap()
            })
            .collect();
        assert_eq!(ids.len(), 20);
        assert_eq!(read_lines(&path).len(), 20);
    }

    #[test]
    fn error_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let sink = JsonlSink::create(&path).unwrap();
        let record = AnalysisRecord::fallback();
        sink.save(&NewAnalysis {
            record: &record,
            email_text: "x",
            email_date: Some("not a date"),
            error: Some("Ollama is not running at http://localhost:11434"),
        })
        .unwrap();
        let row = &read_lines(&path)[0];
        assert!(row["error"].as_str().unwrap().contains("not running"));
        assert!(row["email_day"].is_null());
        assert_eq!(row["classification"], "General Follow-ups");
    }

    #[test]
    fn append_keeps_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let record = record();
        let save = |sink: &JsonlSink| {
            sink.save(&NewAnalysis {
                record: &record,
                email_text: "x",
                email_date: None,
                error: None,
            })
            .unwrap();
        };
        save(&JsonlSink::create(&path).unwrap());
        save(&JsonlSink::append(&path).unwrap());
        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn parses_common_date_formats() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        for raw in [
            "2024-03-05",
            "2024-03-05 09:15:00",
            "2024-03-05T09:15:00",
            "2024-03-05T09:15:00Z",
            "Tue, 05 Mar 2024 09:15:00 +0000",
            "03/05/2024",
            "03/05/2024 09:15",
            "5 Mar 2024",
        ] {
            assert_eq!(parse_email_date(raw), Some(day), "{raw}");
        }
        assert_eq!(parse_email_date(""), None);
        assert_eq!(parse_email_date("yesterday"), None);
    }
}
