//! Whole-document output: a single JSON array rewritten on every run.

use crate::error::{Result, SinkError};
use crate::sink::{ensure_parent_dir, read_existing, OutputSink};
use leakhound_core::{CredentialRecord, DedupKey, OutputFormat};
use serde_json::Value;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Rewrites the destination with existing entries followed by new records.
///
/// Existing entries are carried as opaque JSON so fields this version does not
/// know about survive the rewrite. The rewrite goes through a temporary file
/// in the same directory and a rename.
#[derive(Debug, Clone)]
pub struct DocumentSink {
    path: PathBuf,
}

impl DocumentSink {
    /// Create a sink writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load_entries(&self) -> Result<Vec<Value>> {
        let Some(bytes) = read_existing(&self.path)? else {
            return Ok(Vec::new());
        };

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| SinkError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        match value {
            Value::Array(entries) => Ok(entries),
            other => Err(SinkError::Corrupt {
                path: self.path.clone(),
                reason: format!("expected an array, found {}", json_kind(&other)),
            }),
        }
    }

    /// Move an unparseable destination aside before it is replaced.
    fn quarantine(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let backup = self.path.with_file_name(format!("{file_name}.corrupt"));

        fs::rename(&self.path, &backup).map_err(|source| SinkError::Write {
            path: backup.clone(),
            source,
        })?;
        Ok(backup)
    }
}

impl OutputSink for DocumentSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load_keys(&self) -> Result<Vec<DedupKey>> {
        let entries = self.load_entries()?;
        let mut keys = Vec::with_capacity(entries.len());

        for entry in &entries {
            let Some(object) = entry.as_object() else {
                tracing::debug!("Ignoring non-object entry in {}", self.path.display());
                continue;
            };
            let field = |name: &str| object.get(name).and_then(Value::as_str).unwrap_or_default();
            keys.push(DedupKey::new(field("email"), field("password")));
        }

        Ok(keys)
    }

    fn append(&self, records: &[CredentialRecord]) -> Result<()> {
        let mut entries = match self.load_entries() {
            Ok(entries) => entries,
            Err(SinkError::Corrupt { reason, .. }) => {
                let backup = self.quarantine()?;
                tracing::warn!(
                    "Existing output {} is corrupt ({}), moved to {}",
                    self.path.display(),
                    reason,
                    backup.display()
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        for record in records {
            entries.push(serde_json::to_value(record)?);
        }

        ensure_parent_dir(&self.path)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let write_err = |source: std::io::Error| SinkError::Write {
            path: self.path.clone(),
            source,
        };

        let tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, &entries)?;
            writer.flush().map_err(write_err)?;
        }
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        tracing::debug!(
            "Rewrote {} with {} entries ({} new)",
            self.path.display(),
            entries.len(),
            records.len()
        );
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
