//! JSONL file writer for run events.
//!
//! Each [`RunEvent`] is serialized as a single JSON line with a `type` field
//! and `timestamp`. The file is opened in append mode so restarts keep the
//! history of earlier runs.

use council_application::{RunEvent, RunEventLogger};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Run event logger that appends one JSON object per line.
pub struct JsonlRunEventLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlRunEventLogger {
    /// Open (or create) the log file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: RunEvent) -> Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        match event.payload {
            Value::Object(mut map) => {
                map.insert("type".to_string(), Value::String(event.event_type.to_string()));
                map.insert("timestamp".to_string(), Value::String(timestamp));
                Value::Object(map)
            }
            other => json!({
                "type": event.event_type,
                "timestamp": timestamp,
                "data": other,
            }),
        }
    }
}

impl RunEventLogger for JsonlRunEventLogger {
    fn log(&self, event: RunEvent) {
        let Ok(line) = serde_json::to_string(&Self::record(event)) else {
            return;
        };

        let mut writer = self.writer.lock();
        // Flushed per line; a crash loses at most the event being written.
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!("Could not write run event to {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlRunEventLogger {
    fn drop(&mut self) {
        let _ = self.writer.lock().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{BackendId, RunStatus, Stage};

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("runs.jsonl");
        let logger = JsonlRunEventLogger::open(&path).unwrap();
        let member = BackendId::parse("http://m1").unwrap();

        logger.log(RunEvent::stage_started("r1", Stage::Answer, 2));
        logger.log(RunEvent::backend_result(
            "r1",
            Stage::Answer,
            &member,
            Some(12),
            None,
        ));
        logger.log(RunEvent::stage_completed(
            "r1",
            Stage::Answer,
            RunStatus::Stage1Done,
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.get("timestamp").is_some()));
        assert_eq!(lines[0]["type"], "stage_started");
        assert_eq!(lines[0]["stage"], "stage1");
        assert_eq!(lines[1]["backend"], "http://m1");
        assert_eq!(lines[1]["ok"], true);
        assert_eq!(lines[2]["status"], "stage1_done");
    }

    #[test]
    fn test_appends_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.jsonl");

        JsonlRunEventLogger::open(&path)
            .unwrap()
            .log(RunEvent::run_deleted("r1"));
        JsonlRunEventLogger::open(&path)
            .unwrap()
            .log(RunEvent::run_deleted("r2"));

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["request_id"], "r2");
    }

    #[test]
    fn test_non_object_payload_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.jsonl");
        let logger = JsonlRunEventLogger::open(&path).unwrap();
        logger.log(RunEvent::new("note", json!("just a string")));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "note");
        assert_eq!(lines[0]["data"], "just a string");
    }
}
