//! Leakhound Core - Foundation crate for the leakhound credential leak scanner.
//!
//! This crate provides the shared data model, the credential pattern used both
//! at extraction time and when re-reading persisted output, configuration
//! management, and the central error types that all other leakhound crates
//! depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`Target`, `DocumentRef`, `CredentialRecord`, `OutputFormat`)
//! - [`credential`] - The `email:password` pattern and dedup key derivation
//!
//! # Example
//!
//! ```rust
//! use leakhound_core::{CredentialPattern, Target};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let target = Target::new("corp.example")?;
//! let pattern = CredentialPattern::new();
//!
//! let line = "https://site.example/login:user@corp.example:Sup3rSecret!";
//! assert!(target.appears_in(line));
//!
//! let found = pattern.find(line).expect("line holds a credential");
//! assert_eq!(found.email, "user@corp.example");
//! assert_eq!(found.password, "Sup3rSecret!");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod credential;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, IntelxConfig, OutputConfig, RetryConfig, ScanningConfig};
pub use credential::{CredentialMatch, CredentialPattern, DedupKey};
pub use error::{ConfigError, ConfigResult, LeakhoundError};
pub use types::{
    Bucket, CredentialRecord, DocumentRef, OutputFormat, SearchHit, Target, UNKNOWN_SOURCE,
};
