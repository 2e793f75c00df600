use async_trait::async_trait;
use futures::stream::BoxStream;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

use crate::errors::{TurnError, TurnResult};
use crate::models::event::StreamEvent;
use crate::models::request::ChatAppRequest;
use crate::models::response::AnswerResponse;
use crate::models::server_config::ServerConfig;
use crate::stream::decode_events;

pub const DEFAULT_HOST: &str = "http://localhost:50505";

/// What the chat endpoint sent back
pub enum ChatReply {
    /// NDJSON events, to be fed through the accumulator
    Stream(BoxStream<'static, TurnResult<StreamEvent>>),
    /// A complete answer from the non-streaming endpoint
    Complete(AnswerResponse),
}

impl std::fmt::Debug for ChatReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatReply::Stream(_) => write!(f, "ChatReply::Stream(..)"),
            ChatReply::Complete(response) => f.debug_tuple("ChatReply::Complete").field(response).finish(),
        }
    }
}

/// Remote chat API the front ends talk to
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Fetch the server's feature flags
    async fn config(&self) -> TurnResult<ServerConfig>;

    /// Send a chat request, streaming the answer when `stream` is set
    async fn chat(&self, request: &ChatAppRequest, stream: bool) -> TurnResult<ChatReply>;
}

#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub host: String,
    /// Bearer token sent with every request, when the deployment requires login
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ChatClientConfig {
    fn default() -> Self {
        ChatClientConfig {
            host: DEFAULT_HOST.to_string(),
            token: None,
            timeout: Duration::from_secs(600),
        }
    }
}

pub struct ChatClient {
    client: Client,
    config: ChatClientConfig,
}

impl ChatClient {
    pub fn new(config: ChatClientConfig) -> TurnResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.host.trim_end_matches('/'), path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> TurnResult<Response> {
        let response = self.authorize(builder).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Chat API request failed");
            return Err(TurnError::transport(format!(
                "Request failed with status {}",
                status.as_u16()
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn config(&self) -> TurnResult<ServerConfig> {
        let response = self.send(self.client.get(self.url("config"))).await?;
        Ok(response.json().await?)
    }

    async fn chat(&self, request: &ChatAppRequest, stream: bool) -> TurnResult<ChatReply> {
        let path = if stream { "chat/stream" } else { "chat" };
        tracing::debug!(path, messages = request.messages.len(), "Sending chat request");

        let response = self
            .send(self.client.post(self.url(path)).json(request))
            .await?;

        if stream {
            Ok(ChatReply::Stream(decode_events(response.bytes_stream())))
        } else {
            let body: serde_json::Value = response.json().await?;
            Ok(ChatReply::Complete(AnswerResponse::from_body(body)?))
        }
    }
}
