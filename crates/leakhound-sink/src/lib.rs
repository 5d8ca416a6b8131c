//! Leakhound Sink - resumable credential output.
//!
//! Every output format implements [`OutputSink`], which covers both halves of
//! the resume model: reading back the dedup keys of everything a previous run
//! persisted, and persisting the new records of this run without losing or
//! reordering what is already there.
//!
//! | Format | Sink | Load | Write |
//! |---|---|---|---|
//! | `txt` | [`LineSink`] | re-parse each line | append raw lines |
//! | `csv` | [`RowSink`] | `email`/`password` columns | append rows, header once |
//! | `json` | [`DocumentSink`] | `email`/`password` fields | atomic merged rewrite |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod document;
pub mod error;
pub mod line;
pub mod row;
pub mod sink;

// Re-export commonly used types
pub use document::DocumentSink;
pub use error::{Result, SinkError};
pub use line::LineSink;
pub use row::RowSink;
pub use sink::{open_sink, OutputSink};
