//! Line-oriented output: one raw matched line per credential.

use crate::error::{Result, SinkError};
use crate::sink::{ensure_parent_dir, missing_final_newline, read_existing, OutputSink};
use leakhound_core::{CredentialPattern, CredentialRecord, DedupKey, OutputFormat};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends each record's `raw` line.
///
/// Loading re-parses every line with the credential pattern; lines that no
/// longer parse are keyed by their own text so they still count as seen.
#[derive(Debug, Clone)]
pub struct LineSink {
    path: PathBuf,
    pattern: CredentialPattern,
}

impl LineSink {
    /// Create a sink writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pattern: CredentialPattern::new(),
        }
    }
}

impl OutputSink for LineSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Txt
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load_keys(&self) -> Result<Vec<DedupKey>> {
        let Some(bytes) = read_existing(&self.path)? else {
            return Ok(Vec::new());
        };

        let contents = String::from_utf8_lossy(&bytes);
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| self.pattern.key_for_persisted_line(line))
            .collect())
    }

    fn append(&self, records: &[CredentialRecord]) -> Result<()> {
        ensure_parent_dir(&self.path)?;
        let needs_newline = missing_final_newline(&self.path)?;

        let write_err = |source: std::io::Error| SinkError::Write {
            path: self.path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        let mut writer = BufWriter::new(file);

        if needs_newline {
            writeln!(writer).map_err(write_err)?;
        }
        for record in records {
            writeln!(writer, "{}", record.raw).map_err(write_err)?;
        }
        writer.flush().map_err(write_err)?;

        tracing::debug!("Appended {} lines to {}", records.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(email: &str, password: &str, raw: &str) -> CredentialRecord {
        CredentialRecord {
            url: String::new(),
            email: email.to_string(),
            password: password.to_string(),
            source: "dump.txt".to_string(),
            raw: raw.to_string(),
        }
    }

    #[test]
    fn test_absent_file_loads_empty() {
        let tmp = TempDir::new().expect("create temp dir");
        let sink = LineSink::new(tmp.path().join("missing.txt"));
        assert!(sink.load_keys().expect("load").is_empty());
    }

    #[test]
    fn test_load_reparses_and_falls_back_to_raw() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("creds.txt");
        fs::write(
            &path,
            "https://a.example/login:user@corp.example:pw1\n\n   \nnot a credential\nadmin@corp.example:p:w\n",
        )
        .expect("write fixture");

        let keys = LineSink::new(&path).load_keys().expect("load");
        let keys: Vec<&str> = keys.iter().map(DedupKey::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "user@corp.example:pw1",
                "not a credential",
                "admin@corp.example:p:w"
            ]
        );
    }

    #[test]
    fn test_append_preserves_existing_lines() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("out").join("creds.txt");
        let sink = LineSink::new(&path);

        sink.append(&[record("a@corp.example", "1", "a@corp.example:1")])
            .expect("first append");
        sink.append(&[
            record("b@corp.example", "2", "x.example:b@corp.example:2"),
            record("c@corp.example", "3", "c@corp.example:3"),
        ])
        .expect("second append");

        let contents = fs::read_to_string(&path).expect("read output");
        assert_eq!(
            contents,
            "a@corp.example:1\nx.example:b@corp.example:2\nc@corp.example:3\n"
        );
    }

    #[test]
    fn test_append_after_unterminated_line() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("creds.txt");
        fs::write(&path, "old@corp.example:pw").expect("write fixture");

        LineSink::new(&path)
            .append(&[record("new@corp.example", "pw", "new@corp.example:pw")])
            .expect("append");

        let contents = fs::read_to_string(&path).expect("read output");
        assert_eq!(contents, "old@corp.example:pw\nnew@corp.example:pw\n");
    }
}
