//! Row-oriented output: CSV with `url,email,password,source` columns.

use crate::error::{Result, SinkError};
use crate::sink::{
    ensure_parent_dir, is_absent_or_empty, missing_final_newline, read_existing, OutputSink,
};
use leakhound_core::{CredentialRecord, DedupKey, OutputFormat};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Persisted columns, in order. `raw` is not persisted.
pub const COLUMNS: [&str; 4] = ["url", "email", "password", "source"];

#[derive(Debug, Serialize)]
struct Row<'a> {
    url: &'a str,
    email: &'a str,
    password: &'a str,
    source: &'a str,
}

impl<'a> From<&'a CredentialRecord> for Row<'a> {
    fn from(record: &'a CredentialRecord) -> Self {
        Self {
            url: &record.url,
            email: &record.email,
            password: &record.password,
            source: &record.source,
        }
    }
}

/// Appends CSV rows, writing the header only into an absent or empty file.
#[derive(Debug, Clone)]
pub struct RowSink {
    path: PathBuf,
}

impl RowSink {
    /// Create a sink writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputSink for RowSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load_keys(&self) -> Result<Vec<DedupKey>> {
        let Some(bytes) = read_existing(&self.path)? else {
            return Ok(Vec::new());
        };
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes.as_slice());

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);
        let (Some(email_idx), Some(password_idx)) = (column("email"), column("password")) else {
            return Err(SinkError::Corrupt {
                path: self.path.clone(),
                reason: "header has no email/password columns".to_string(),
            });
        };

        let mut keys = Vec::new();
        for row in reader.records() {
            let row = row?;
            keys.push(DedupKey::new(
                row.get(email_idx).unwrap_or_default(),
                row.get(password_idx).unwrap_or_default(),
            ));
        }
        Ok(keys)
    }

    fn append(&self, records: &[CredentialRecord]) -> Result<()> {
        ensure_parent_dir(&self.path)?;
        let write_header = is_absent_or_empty(&self.path);
        let needs_newline = missing_final_newline(&self.path)?;

        let write_err = |source: std::io::Error| SinkError::Write {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        if needs_newline {
            writeln!(file).map_err(write_err)?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(COLUMNS)?;
        }
        for record in records {
            writer.serialize(Row::from(record))?;
        }
        writer.flush().map_err(write_err)?;

        tracing::debug!("Appended {} rows to {}", records.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(email: &str, password: &str) -> CredentialRecord {
        CredentialRecord {
            url: "https://site.example/login".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            source: "combo, part 1.txt".to_string(),
            raw: format!("https://site.example/login:{email}:{password}"),
        }
    }

    #[test]
    fn test_header_written_once() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("creds.csv");
        let sink = RowSink::new(&path);

        sink.append(&[record("a@corp.example", "1")]).expect("first append");
        sink.append(&[record("b@corp.example", "2")]).expect("second append");

        let contents = fs::read_to_string(&path).expect("read output");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "url,email,password,source");
        assert_eq!(
            contents.matches("url,email,password,source").count(),
            1,
            "header must not repeat"
        );
    }

    #[test]
    fn test_header_written_into_empty_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("creds.csv");
        fs::write(&path, "").expect("create empty file");

        RowSink::new(&path)
            .append(&[record("a@corp.example", "1")])
            .expect("append");

        let contents = fs::read_to_string(&path).expect("read output");
        assert!(contents.starts_with("url,email,password,source"));
    }

    #[test]
    fn test_roundtrip_keys_with_awkward_passwords() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("creds.csv");
        let sink = RowSink::new(&path);

        let records = vec![
            record("a@corp.example", "with,comma"),
            record("b@corp.example", "with \"quotes\""),
            record("c@corp.example", "colon:inside"),
        ];
        sink.append(&records).expect("append");

        let keys = sink.load_keys().expect("load");
        let expected: Vec<DedupKey> = records.iter().map(CredentialRecord::key).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_load_without_credential_columns_is_corrupt() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("creds.csv");
        fs::write(&path, "name,value\nx,y\n").expect("write fixture");

        let err = RowSink::new(&path).load_keys().expect_err("no email column");
        assert!(matches!(err, SinkError::Corrupt { .. }));
    }

    #[test]
    fn test_load_tolerates_short_rows() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("creds.csv");
        fs::write(
            &path,
            "url,email,password,source\n,a@corp.example,pw,src\n,b@corp.example\n",
        )
        .expect("write fixture");

        let keys = RowSink::new(&path).load_keys().expect("load");
        assert_eq!(keys[0].as_str(), "a@corp.example:pw");
        assert_eq!(keys[1].as_str(), "b@corp.example:");
    }
}
