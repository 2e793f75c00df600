use anyhow::Result;
use console::measure_text_width;
use serde_json::{json, Map};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use navigator::analytics::Tracker;
use navigator::chat::ask;
use navigator::client::ChatBackend;
use navigator::conversation::Conversation;
use navigator::errors::{TurnError, TurnResult};
use navigator::models::response::AnswerResponse;
use navigator::models::turn::ConversationTurn;
use navigator::overflow::{line_count, Measurement, OverflowPromoter};
use navigator::settings::{reduce, ChatSettings, SettingsUpdate};
use navigator::stream::StreamingAnswerAccumulator;

use crate::prompt::{InputType, Prompt};
use session_file::{history_file, persist_turns};

#[cfg(test)]
pub mod mock_backend;
pub mod session_file;

/// Height units per terminal row when measuring a rendered answer
const ROW_HEIGHT: u32 = 20;

pub struct Session<'a> {
    backend: Box<dyn ChatBackend + 'a>,
    prompt: Box<dyn Prompt + 'a>,
    accumulator: StreamingAnswerAccumulator,
    settings: ChatSettings,
    conversation: Conversation,
    tracker: Tracker,
    history_dir: Option<PathBuf>,
}

impl<'a> Session<'a> {
    pub fn new(
        backend: Box<dyn ChatBackend + 'a>,
        prompt: Box<dyn Prompt + 'a>,
        settings: ChatSettings,
        tracker: Tracker,
    ) -> Self {
        Session {
            backend,
            prompt,
            accumulator: StreamingAnswerAccumulator::new(),
            settings,
            conversation: Conversation::default(),
            tracker,
            history_dir: None,
        }
    }

    pub fn with_accumulator(mut self, accumulator: StreamingAnswerAccumulator) -> Self {
        self.accumulator = accumulator;
        self
    }

    pub fn with_promoter(mut self, promoter: OverflowPromoter) -> Self {
        self.conversation = Conversation::new(promoter);
        self
    }

    /// Record turns that carry a history key as files under `dir`
    pub fn with_history_dir(mut self, dir: PathBuf) -> Self {
        self.history_dir = Some(dir);
        self
    }

    /// Continue a previously recorded conversation
    pub fn with_turns(mut self, turns: Vec<ConversationTurn>) -> Self {
        self.conversation.restore(turns);
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Fold the server's feature flags into the chat settings
    pub async fn sync_settings(&mut self) {
        match self.backend.config().await {
            Ok(config) => self.settings = self.settings.clone().apply_server_config(&config),
            Err(e) => tracing::warn!("Could not fetch server config, keeping defaults: {}", e),
        }
    }

    pub fn update_settings(&mut self, update: SettingsUpdate) {
        self.settings = reduce(self.settings.clone(), update);
    }

    pub async fn start(&mut self) -> Result<()> {
        let label = self.tracker_label();
        self.prompt.render_notice(&format!("Starting {}", label));
        self.tracker.track_page_view("chat").await;
        self.prompt.navigator_ready();

        loop {
            let input = self.prompt.get_input()?;
            self.conversation.dismiss_full_screen();

            match input.input_type {
                InputType::Message => {
                    if let Some(content) = &input.content {
                        // Failures are rendered; the session continues
                        let _ = self.process_turn(content).await;
                    }
                }
                InputType::Retry => match self.conversation.retry_question().map(String::from) {
                    Some(question) => {
                        let _ = self.process_turn(&question).await;
                    }
                    None => self.prompt.render_notice("Nothing to retry."),
                },
                InputType::Clear => {
                    self.conversation.clear();
                    self.prompt.render_notice("Started a new conversation.");
                }
                InputType::Exit => break,
                InputType::AskAgain => continue,
            }
        }

        self.prompt.close();
        Ok(())
    }

    /// Ask one question without reading any input
    pub async fn headless_start(&mut self, question: &str) -> TurnResult<AnswerResponse> {
        self.process_turn(question).await
    }

    async fn process_turn(&mut self, question: &str) -> TurnResult<AnswerResponse> {
        let question = match self.conversation.begin(question) {
            Ok(question) => question,
            Err(e) => {
                self.prompt.render_error(&e);
                return Err(e);
            }
        };

        let mut details = Map::new();
        details.insert("length".to_string(), json!(question.chars().count()));
        self.tracker.track_user_action("ask_question", details).await;

        self.prompt.show_busy();
        let result = self.request_answer(&question).await;
        self.prompt.hide_busy();

        match result {
            Ok(response) => {
                let index = self.conversation.commit(&question, response.clone());
                if let Some(turn) = self.conversation.turns().get(index) {
                    self.prompt.render_answer(turn);
                }
                self.record_history(&response);
                self.check_overflow(&response);
                Ok(response)
            }
            Err(e) => {
                tracing::info!(error = %e, "Turn failed");
                self.conversation.fail(e.clone());
                self.prompt.render_error(&e);
                Err(e)
            }
        }
    }

    /// Run the request, cancelling it on Ctrl+C
    async fn request_answer(&mut self, question: &str) -> TurnResult<AnswerResponse> {
        let cancel = CancellationToken::new();
        let accumulator = self.accumulator.clone().with_cancellation(cancel.clone());
        let interrupt = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            }
        });

        let prompt = &mut self.prompt;
        let mut sink = |turns: Vec<ConversationTurn>| {
            if let Some(turn) = turns.last() {
                prompt.render_snapshot(turn);
            }
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TurnError::Cancelled),
            result = ask(
                self.backend.as_ref(),
                &accumulator,
                &self.settings,
                question,
                self.conversation.turns(),
                &mut sink,
            ) => result,
        };

        interrupt.abort();
        result
    }

    fn record_history(&self, response: &AnswerResponse) {
        let (Some(dir), Some(key)) = (&self.history_dir, response.history_key()) else {
            return;
        };
        let path = history_file(dir, key);
        if let Err(e) = persist_turns(&path, self.conversation.turns()) {
            tracing::warn!("Failed to record history: {}", e);
        }
    }

    fn check_overflow(&mut self, response: &AnswerResponse) {
        let measurement = measure(&response.message.content, self.prompt.terminal_width());
        let promoted = self
            .conversation
            .check_overflow(measurement)
            .is_some_and(|decision| decision.promote);
        if promoted {
            if let Some(view) = self.conversation.full_screen() {
                self.prompt.render_full_screen(view);
            }
        }
    }

    fn tracker_label(&self) -> String {
        match self.tracker.user_id() {
            Some(user) => format!("session {} as {}", self.tracker.session_id(), user),
            None => format!("session {}", self.tracker.session_id()),
        }
    }
}

/// Size of `text` once wrapped to a terminal `width` columns wide
pub fn measure(text: &str, width: usize) -> Measurement {
    let width = width.max(1);
    let rows: usize = text
        .split('\n')
        .map(|line| measure_text_width(line).div_ceil(width).max(1))
        .sum();
    let height = u32::try_from(rows)
        .unwrap_or(u32::MAX)
        .saturating_mul(ROW_HEIGHT);
    Measurement::new(Some(height), line_count(text))
}
