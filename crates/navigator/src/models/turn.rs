use serde::{Deserialize, Serialize};

use super::message::ResponseMessage;
use super::response::AnswerResponse;

/// One question/answer exchange.
///
/// Serialized as a `[question, response]` pair, the shape the chat history
/// endpoint and the session files use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "(String, AnswerResponse)",
    into = "(String, AnswerResponse)"
)]
pub struct ConversationTurn {
    pub question: String,
    pub response: AnswerResponse,
}

impl ConversationTurn {
    pub fn new<S: Into<String>>(question: S, response: AnswerResponse) -> Self {
        ConversationTurn {
            question: question.into(),
            response,
        }
    }

    /// The turn as the user/assistant message pair sent back to the API as history
    pub fn to_messages(&self) -> [ResponseMessage; 2] {
        [
            ResponseMessage::user(self.question.clone()),
            ResponseMessage::assistant(self.response.message.content.clone()),
        ]
    }
}

impl From<(String, AnswerResponse)> for ConversationTurn {
    fn from((question, response): (String, AnswerResponse)) -> Self {
        ConversationTurn { question, response }
    }
}

impl From<ConversationTurn> for (String, AnswerResponse) {
    fn from(turn: ConversationTurn) -> Self {
        (turn.question, turn.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_serializes_as_pair() {
        let turn = ConversationTurn::new(
            "How do I negotiate salary?",
            AnswerResponse::new(ResponseMessage::assistant("Research the market first.")),
        );
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value[0], json!("How do I negotiate salary?"));
        assert_eq!(value[1]["message"]["content"], json!("Research the market first."));

        let back: ConversationTurn = serde_json::from_value(value).unwrap();
        assert_eq!(back, turn);
    }
}
