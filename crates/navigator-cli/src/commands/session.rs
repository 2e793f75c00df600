use anyhow::Result;
use std::sync::Arc;

use navigator::analytics::{AnalyticsSink, HttpAnalyticsSink, LogAnalyticsSink, Tracker};
use navigator::client::ChatClient;
use navigator::settings::{ChatSettings, SettingsUpdate};
use navigator::stream::StreamingAnswerAccumulator;

use crate::configuration::{config_dir, user_id, CliConfig};
use crate::prompt::Prompt;
use crate::session::session_file::{ensure_session_dir, history_file, load_turns};
use crate::session::Session;

/// Connect a session to the configured server, optionally resuming a recorded conversation
pub async fn build_session<'a>(
    config: &CliConfig,
    prompt: Box<dyn Prompt + 'a>,
    tracker: Tracker,
    resume: Option<&str>,
) -> Result<Session<'a>> {
    let client = ChatClient::new(config.client_config())?;
    let session_dir = ensure_session_dir()?;

    let mut session = Session::new(Box::new(client), prompt, ChatSettings::default(), tracker)
        .with_accumulator(StreamingAnswerAccumulator::new().with_pacing(config.pacing()))
        .with_promoter(config.promoter())
        .with_history_dir(session_dir.clone());

    if let Some(key) = resume {
        let turns = load_turns(&history_file(&session_dir, key))?;
        tracing::info!(key, turns = turns.len(), "Resuming recorded conversation");
        session = session.with_turns(turns);
    }

    session.sync_settings().await;
    if let Some(stream) = config.stream {
        session.update_settings(SettingsUpdate::ShouldStream(stream));
    }
    Ok(session)
}

pub fn build_tracker(config: &CliConfig) -> Result<Tracker> {
    let user = match config_dir().and_then(|dir| user_id(&dir)) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!("Analytics user id unavailable: {}", e);
            None
        }
    };

    let sink: Arc<dyn AnalyticsSink> = match &config.analytics.endpoint {
        Some(endpoint) => Arc::new(HttpAnalyticsSink::new(endpoint.clone())?),
        None => Arc::new(LogAnalyticsSink),
    };
    Ok(Tracker::new(sink, user))
}
