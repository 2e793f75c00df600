use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::message::ResponseMessage;
use crate::errors::{TurnError, TurnResult};

/// Context object attached to an answer; arbitrary keys supplied by the server.
pub type Context = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// A (possibly partial) answer to one question
pub struct AnswerResponse {
    #[serde(default)]
    pub message: ResponseMessage,
    #[serde(default)]
    pub context: Context,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_state: Option<Value>,
}

impl AnswerResponse {
    pub fn new(message: ResponseMessage) -> Self {
        AnswerResponse {
            message,
            ..Default::default()
        }
    }

    /// Shallow merge: keys from `update` replace same-named keys, others are kept
    pub fn merge_context(&mut self, update: Context) {
        for (key, value) in update {
            self.context.insert(key, value);
        }
    }

    pub fn data_points(&self) -> Option<&Value> {
        self.context.get("data_points")
    }

    /// The session state as a history key, when the server handed out a non-empty string
    pub fn history_key(&self) -> Option<&str> {
        match &self.session_state {
            Some(Value::String(key)) if !key.is_empty() => Some(key),
            _ => None,
        }
    }

    /// Parse a complete, non-streamed response body.
    ///
    /// A body carrying an `error` field fails the turn with that message.
    pub fn from_body(body: Value) -> TurnResult<Self> {
        if let Some(error) = body.get("error") {
            let message = match error {
                Value::String(message) => message.clone(),
                other => other.to_string(),
            };
            return Err(TurnError::Server(message));
        }
        Ok(serde_json::from_value(body)?)
    }
}
