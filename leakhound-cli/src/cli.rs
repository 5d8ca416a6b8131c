//! Command-line arguments.

use clap::Parser;
use leakhound_core::{AppConfig, OutputFormat, Target};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Environment variable holding the API key when `-k` is not given.
pub const API_KEY_ENV: &str = "INTELX_API_KEY";

/// Find leaked credentials for a domain in Intelligence X.
#[derive(Parser, Debug, Clone)]
#[command(name = "leakhound", version)]
pub struct Cli {
    /// Target domain to search for
    #[arg(short = 't', long)]
    pub target: String,

    /// Maximum results per bucket and search term [default: 100]
    #[arg(short = 'm', long = "max-results")]
    pub max_results: Option<u32>,

    /// Intelligence X API key (falls back to INTELX_API_KEY)
    #[arg(short = 'k', long = "api-key")]
    pub api_key: Option<String>,

    /// Output file name, placed in the output directory
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Output format: txt, json or csv
    #[arg(short = 'f', long, default_value_t = OutputFormat::Txt)]
    pub format: OutputFormat,

    /// Search window in months [default: 6]
    #[arg(short = 'r', long = "range")]
    pub range_months: Option<u32>,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Also search for "@target" to catch email-formatted leaks
    #[arg(short = 'e', long = "email")]
    pub email_search: bool,

    /// Configuration file [default: platform config dir]
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Overlay flags that were given on top of file/env configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(max_results) = self.max_results {
            config.scanning.max_results = max_results;
        }
        if let Some(months) = self.range_months {
            config.scanning.range_months = months;
        }
        if self.email_search {
            config.scanning.email_search = true;
        }
    }

    /// Destination file: `<dir>/<output>` when `-o` is given, otherwise
    /// `<dir>/<target>-creds.<format>`.
    #[must_use]
    pub fn output_path(&self, directory: &Path, target: &Target) -> PathBuf {
        match &self.output {
            Some(name) => directory.join(name),
            None => directory.join(format!(
                "{}-creds.{}",
                target.as_str(),
                self.format.extension()
            )),
        }
    }

    /// API key from `-k`, else from the environment value given.
    #[must_use]
    pub fn api_key(&self, from_env: Option<String>) -> Option<Zeroizing<String>> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .map(|key| {
                tracing::debug!("Using API key from command line");
                key
            })
            .or_else(|| {
                let key = from_env.filter(|key| !key.trim().is_empty())?;
                tracing::debug!("Using API key from {}", API_KEY_ENV);
                Some(key)
            })
            .map(|key| Zeroizing::new(key.trim().to_string()))
    }
}
