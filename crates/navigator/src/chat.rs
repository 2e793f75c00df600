//! Runs one conversation turn against a [`ChatBackend`].
use crate::client::{ChatBackend, ChatReply};
use crate::errors::TurnResult;
use crate::models::request::ChatAppRequest;
use crate::models::response::AnswerResponse;
use crate::models::turn::ConversationTurn;
use crate::settings::ChatSettings;
use crate::stream::{SnapshotSink, StreamingAnswerAccumulator};

/// Ask `question` with `prior_turns` as history.
///
/// With streaming enabled in `settings` the answer is assembled by
/// `accumulator`, publishing snapshots to `sink`; otherwise the complete
/// answer is returned directly and `sink` is never called.
pub async fn ask<B, K>(
    backend: &B,
    accumulator: &StreamingAnswerAccumulator,
    settings: &ChatSettings,
    question: &str,
    prior_turns: &[ConversationTurn],
    sink: &mut K,
) -> TurnResult<AnswerResponse>
where
    B: ChatBackend + ?Sized,
    K: SnapshotSink + ?Sized,
{
    let request = ChatAppRequest::new(question, prior_turns, settings.to_overrides());

    match backend.chat(&request, settings.should_stream).await? {
        ChatReply::Stream(events) => {
            accumulator
                .accumulate(question, prior_turns, events, sink)
                .await
        }
        ChatReply::Complete(response) => Ok(response),
    }
}
