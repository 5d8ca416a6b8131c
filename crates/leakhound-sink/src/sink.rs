//! The `OutputSink` trait and helpers shared by the format implementations.

use crate::document::DocumentSink;
use crate::error::{Result, SinkError};
use crate::line::LineSink;
use crate::row::RowSink;
use leakhound_core::{CredentialRecord, DedupKey, OutputFormat};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A format-specific persistence strategy for credential records.
///
/// Implementations must be able to reconstruct, from their own output, the
/// dedup keys of every record they ever persisted.
pub trait OutputSink: Send + Sync {
    /// Format written by this sink.
    fn format(&self) -> OutputFormat;

    /// Destination path.
    fn path(&self) -> &Path;

    /// Dedup keys of everything already persisted, in file order.
    ///
    /// An absent destination yields no keys. Unreadable or malformed output is
    /// an error; callers decide whether that is fatal.
    fn load_keys(&self) -> Result<Vec<DedupKey>>;

    /// Persist new records after whatever is already there.
    fn append(&self, records: &[CredentialRecord]) -> Result<()>;
}

/// Build the sink for a format.
#[must_use]
pub fn open_sink(format: OutputFormat, path: impl Into<PathBuf>) -> Box<dyn OutputSink> {
    let path = path.into();
    match format {
        OutputFormat::Txt => Box::new(LineSink::new(path)),
        OutputFormat::Csv => Box::new(RowSink::new(path)),
        OutputFormat::Json => Box::new(DocumentSink::new(path)),
    }
}

/// Read the destination, or `None` when it does not exist yet.
pub(crate) fn read_existing(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SinkError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Create the destination's parent directory.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| SinkError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Whether the destination has content that does not end in a newline.
///
/// Appending to such a file would glue the first new entry onto the last
/// existing one.
pub(crate) fn missing_final_newline(path: &Path) -> Result<bool> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(source) => {
            return Err(SinkError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let read_err = |source: std::io::Error| SinkError::Read {
        path: path.to_path_buf(),
        source,
    };

    let len = file.metadata().map_err(read_err)?.len();
    if len == 0 {
        return Ok(false);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1)).map_err(read_err)?;
    file.read_exact(&mut last).map_err(read_err)?;
    Ok(last[0] != b'\n')
}

/// Whether the destination is absent or empty.
pub(crate) fn is_absent_or_empty(path: &Path) -> bool {
    fs::metadata(path).map_or(true, |m| m.len() == 0)
}
