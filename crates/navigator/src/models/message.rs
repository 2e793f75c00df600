use serde::{Deserialize, Serialize};

use super::role::Role;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// A single chat message as it appears on the wire
pub struct ResponseMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub role: Role,
}

impl ResponseMessage {
    pub fn new<S: Into<String>>(role: Role, content: S) -> Self {
        ResponseMessage {
            content: content.into(),
            role,
        }
    }

    /// Create a new user message
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(Role::Assistant, content)
    }
}
