//! Command implementations for the secstudy CLI.

pub mod chat;
pub mod explain;
pub mod init;
pub mod progress;
pub mod quiz;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use secstudy_core::session::{SessionConfig, StudySession};
use secstudy_core::store::ProgressStore;
use secstudy_providers::config::{create_provider, load_config_from, StudyConfig};

/// Load config, build the default provider, and open a study session.
///
/// A missing provider entry or credential fails here, before any
/// interaction starts.
pub(crate) fn open_session(config_path: Option<&Path>) -> Result<(StudySession, StudyConfig)> {
    let config = load_config_from(config_path)?;

    let provider_config = config
        .providers
        .get(&config.default_provider)
        .with_context(|| {
            format!(
                "provider '{}' is not configured. Run `secstudy init` and edit secstudy.toml.",
                config.default_provider
            )
        })?;
    let provider = create_provider(
        &config.default_provider,
        provider_config,
        config.request_timeout_secs,
    )?;

    let store = ProgressStore::new(&config.progress_file);
    let session = StudySession::open(
        Arc::from(provider),
        store,
        SessionConfig {
            model: config.default_model.clone(),
            temperature: config.default_temperature,
            max_output_tokens: config.max_output_tokens,
        },
    )?;

    Ok((session, config))
}

/// Print a prompt and read one trimmed line from stdin.
///
/// Returns `None` on end of input.
pub(crate) fn prompt_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
