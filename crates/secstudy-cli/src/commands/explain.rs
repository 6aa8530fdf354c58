//! The `secstudy explain` command.

use std::path::Path;

use anyhow::Result;

pub async fn execute(config_path: Option<&Path>, topic: &str) -> Result<()> {
    let (mut session, _config) = super::open_session(config_path)?;

    let explanation = session.explain(topic).await?;
    println!("{explanation}");
    println!("\nTest yourself next: secstudy quiz \"{}\"", topic.trim());

    Ok(())
}
