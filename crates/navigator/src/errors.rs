use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single conversation turn.
///
/// Every variant aborts the turn; no partial answer is committed.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum TurnError {
    /// The request or the event sequence failed before completion.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server reported a failure through an `error` field.
    #[error("{0}")]
    Server(String),

    /// Required input was missing; no request was issued.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Turn cancelled")]
    Cancelled,
}

impl TurnError {
    pub fn transport<S: Into<String>>(message: S) -> Self {
        TurnError::Transport(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        TurnError::Validation(message.into())
    }
}

impl From<reqwest::Error> for TurnError {
    fn from(err: reqwest::Error) -> Self {
        TurnError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for TurnError {
    fn from(err: serde_json::Error) -> Self {
        TurnError::Transport(format!("invalid JSON: {}", err))
    }
}

pub type TurnResult<T> = Result<T, TurnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_displays_message_verbatim() {
        let err = TurnError::Server("upstream failure".to_string());
        assert_eq!(err.to_string(), "upstream failure");
    }

    #[test]
    fn test_json_error_maps_to_transport() {
        let err: TurnError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, TurnError::Transport(_)));
    }
}
