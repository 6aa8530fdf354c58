//! The `secstudy init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("secstudy.toml").exists() {
        println!("secstudy.toml already exists, skipping.");
    } else {
        std::fs::write("secstudy.toml", SAMPLE_CONFIG)?;
        println!("Created secstudy.toml");
    }

    println!("\nNext steps:");
    println!("  1. Put your Gemini API key in the SECSTUDY_GEMINI_KEY environment variable");
    println!("     (or edit secstudy.toml directly)");
    println!("  2. Run: secstudy chat");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# secstudy configuration

[providers.gemini]
type = "gemini"
api_key = "${SECSTUDY_GEMINI_KEY}"

# Local models via Ollama:
# [providers.ollama]
# type = "ollama"
# base_url = "http://localhost:11434"

default_provider = "gemini"
default_model = "gemini-1.5-flash"
default_temperature = 0.7
request_timeout_secs = 30
progress_file = "study_progress.json"
catalog = ["phishing", "passwords", "malware", "firewalls", "encryption"]
"#;
