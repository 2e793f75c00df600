use futures::{Stream, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::errors::{TurnError, TurnResult};
use crate::models::event::StreamEvent;
use crate::models::message::ResponseMessage;
use crate::models::response::AnswerResponse;
use crate::models::turn::ConversationTurn;

/// Delay before each appended fragment becomes visible
pub const DEFAULT_PACING: Duration = Duration::from_millis(33);

/// Receives a full copy of the conversation after every visible update.
///
/// The last turn in the published list is the one being streamed.
pub trait SnapshotSink: Send {
    fn publish(&mut self, turns: Vec<ConversationTurn>);
}

impl<F> SnapshotSink for F
where
    F: FnMut(Vec<ConversationTurn>) + Send,
{
    fn publish(&mut self, turns: Vec<ConversationTurn>) {
        self(turns)
    }
}

/// What the driver has to do after an event was applied
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Nothing visible changed
    Silent,
    /// Text to append once the pacing delay has passed
    Append(String),
}

/// The state of a single streaming turn, independent of timing and transport.
#[derive(Debug, Clone)]
pub struct TurnState {
    question: String,
    base: AnswerResponse,
    answer: String,
    // Attached only when the turn is finalized
    session_state: Option<Value>,
    has_base_message: bool,
    // Once text is visible the answer only grows
    appended: bool,
    finalized: Option<AnswerResponse>,
}

impl TurnState {
    pub fn new<S: Into<String>>(question: S) -> Self {
        TurnState {
            question: question.into(),
            base: AnswerResponse::default(),
            answer: String::new(),
            session_state: None,
            has_base_message: false,
            appended: false,
            finalized: None,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    /// Apply one event. An `Error` event fails the turn.
    pub fn apply(&mut self, event: StreamEvent) -> TurnResult<Effect> {
        if self.finalized.is_some() {
            tracing::warn!("Ignoring stream event received after the turn was finalized");
            return Ok(Effect::Silent);
        }

        match event {
            StreamEvent::ContextAndDelta {
                context,
                delta,
                session_state,
            } => {
                if self.appended {
                    tracing::debug!("Keeping streamed text, late base message only updates the role");
                } else {
                    self.answer = delta.content.clone();
                }
                self.base.message = delta;
                self.base.merge_context(context);
                if session_state.is_some() {
                    self.session_state = session_state;
                }
                self.has_base_message = true;
                Ok(Effect::Silent)
            }
            StreamEvent::ContentDelta { content, role } => {
                if let (false, Some(role)) = (self.has_base_message, role) {
                    self.base.message.role = role;
                }
                Ok(Effect::Append(content))
            }
            StreamEvent::ContextUpdate {
                context,
                session_state,
            } => {
                self.base.merge_context(context);
                if session_state.is_some() {
                    self.session_state = session_state;
                }
                Ok(Effect::Silent)
            }
            StreamEvent::Error { message } => Err(TurnError::Server(message)),
            StreamEvent::Ignored => {
                tracing::debug!("Skipping unrecognized stream event");
                Ok(Effect::Silent)
            }
        }
    }

    pub fn append(&mut self, content: &str) {
        if self.finalized.is_none() {
            self.answer.push_str(content);
            self.appended = true;
        }
    }

    /// The response as it stands right now
    pub fn current(&self) -> AnswerResponse {
        AnswerResponse {
            message: ResponseMessage::new(self.base.message.role.clone(), self.answer.clone()),
            ..self.base.clone()
        }
    }

    /// Finalize the turn. Further calls return the same response.
    pub fn finish(&mut self) -> &AnswerResponse {
        if self.finalized.is_none() {
            let mut current = self.current();
            current.session_state = self.session_state.clone();
            self.finalized = Some(current);
        }
        self.finalized.get_or_insert_with(AnswerResponse::default)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }
}

/// Assembles a streamed answer, publishing paced snapshots along the way.
#[derive(Debug, Clone)]
pub struct StreamingAnswerAccumulator {
    pacing: Duration,
    cancel: CancellationToken,
}

impl Default for StreamingAnswerAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingAnswerAccumulator {
    pub fn new() -> Self {
        StreamingAnswerAccumulator {
            pacing: DEFAULT_PACING,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that aborts the running turn when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Consume `events` for `question`, returning the final answer.
    ///
    /// Events are processed strictly in order. On failure or cancellation the
    /// event stream is dropped, which closes the underlying transport, and
    /// nothing more is published.
    pub async fn accumulate<S, K>(
        &self,
        question: &str,
        prior_turns: &[ConversationTurn],
        events: S,
        sink: &mut K,
    ) -> TurnResult<AnswerResponse>
    where
        S: Stream<Item = TurnResult<StreamEvent>>,
        K: SnapshotSink + ?Sized,
    {
        let mut events = std::pin::pin!(events);
        let mut state = TurnState::new(question);
        let mut published = 0usize;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(self.cancelled(published)),
                next = events.next() => next,
            };
            let Some(event) = next else {
                break;
            };

            let content = match state.apply(event?)? {
                Effect::Silent => continue,
                Effect::Append(content) => content,
            };

            if !self.pacing.is_zero() {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Err(self.cancelled(published)),
                    _ = tokio::time::sleep(self.pacing) => {}
                }
            }

            state.append(&content);
            let mut turns = prior_turns.to_vec();
            turns.push(ConversationTurn::new(question, state.current()));
            sink.publish(turns);
            published += 1;
        }

        tracing::debug!(snapshots = published, "Stream finished");
        Ok(state.finish().clone())
    }

    fn cancelled(&self, published: usize) -> TurnError {
        tracing::info!(snapshots = published, "Turn cancelled by caller");
        TurnError::Cancelled
    }
}
