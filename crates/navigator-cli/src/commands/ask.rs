use anyhow::Result;

use crate::commands::session::{build_session, build_tracker};
use crate::configuration::CliConfig;
use crate::prompt::cliclack::CliclackPrompt;

pub async fn execute(config: &CliConfig, question: &str, resume: Option<String>) -> Result<()> {
    let tracker = build_tracker(config)?;
    let prompt = Box::new(CliclackPrompt::new());
    let mut session = build_session(config, prompt, tracker, resume.as_deref()).await?;
    session.headless_start(question).await?;
    Ok(())
}
