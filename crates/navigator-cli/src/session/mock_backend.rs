use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use navigator::client::{ChatBackend, ChatReply};
use navigator::errors::{TurnError, TurnResult};
use navigator::models::event::StreamEvent;
use navigator::models::request::ChatAppRequest;
use navigator::models::response::AnswerResponse;
use navigator::models::server_config::ServerConfig;
use serde_json::Value;

pub enum Scripted {
    Stream(Vec<Value>),
    Complete(AnswerResponse),
    Fail(TurnError),
}

/// A backend that answers from a script and remembers every request
pub struct MockBackend {
    config: ServerConfig,
    replies: Mutex<VecDeque<Scripted>>,
    requests: Arc<Mutex<Vec<(ChatAppRequest, bool)>>>,
}

impl MockBackend {
    pub fn new(replies: Vec<Scripted>) -> Self {
        MockBackend {
            config: ServerConfig::default(),
            replies: Mutex::new(replies.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<(ChatAppRequest, bool)>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn config(&self) -> TurnResult<ServerConfig> {
        Ok(self.config.clone())
    }

    async fn chat(&self, request: &ChatAppRequest, stream: bool) -> TurnResult<ChatReply> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), stream));

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Scripted::Fail(TurnError::transport("no scripted reply")));

        match reply {
            Scripted::Stream(values) => {
                let events = futures::stream::iter(
                    values
                        .into_iter()
                        .map(|value| Ok(StreamEvent::classify(value))),
                );
                Ok(ChatReply::Stream(events.boxed()))
            }
            Scripted::Complete(response) => Ok(ChatReply::Complete(response)),
            Scripted::Fail(error) => Err(error),
        }
    }
}
