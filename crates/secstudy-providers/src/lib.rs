//! secstudy-providers — generative-language model backends.
//!
//! Implements the `ModelProvider` trait for Gemini (the hosted default) and
//! Ollama (local models), plus a mock provider for offline testing.

pub mod config;
pub mod gemini;
pub mod mock;
pub mod ollama;

pub use config::{create_provider, load_config, ProviderConfig, StudyConfig};
