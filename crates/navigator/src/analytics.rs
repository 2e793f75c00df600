//! Usage analytics.
//!
//! A [`Tracker`] is constructed explicitly and handed to whatever needs it;
//! where the events end up is decided by the [`AnalyticsSink`] it was given.
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub event: String,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub data: Map<String, Value>,
}

/// Destination for analytics events
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn send(&self, event: &AnalyticsEvent) -> Result<()>;
}

/// Posts events as JSON to an analytics endpoint
pub struct HttpAnalyticsSink {
    client: Client,
    endpoint: String,
}

impl HttpAnalyticsSink {
    pub fn new<S: Into<String>>(endpoint: S) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl AnalyticsSink for HttpAnalyticsSink {
    async fn send(&self, event: &AnalyticsEvent) -> Result<()> {
        self.client
            .post(&self.endpoint)
            .json(event)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Development sink: events are only logged
pub struct LogAnalyticsSink;

#[async_trait]
impl AnalyticsSink for LogAnalyticsSink {
    async fn send(&self, event: &AnalyticsEvent) -> Result<()> {
        let data = Value::Object(event.data.clone());
        tracing::info!(event = %event.event, data = %data, "Analytics (dev mode)");
        Ok(())
    }
}

/// Timing and outcome of a resume analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysisMetrics {
    pub match_score: f32,
    pub skills_found: u32,
    pub skills_missing: u32,
    pub analysis_time: u64,
}

#[derive(Clone)]
pub struct Tracker {
    session_id: String,
    user_id: Option<String>,
    client_name: String,
    sink: Arc<dyn AnalyticsSink>,
}

impl Tracker {
    pub fn new(sink: Arc<dyn AnalyticsSink>, user_id: Option<String>) -> Self {
        Tracker {
            session_id: prefixed_id("session"),
            user_id,
            client_name: format!("navigator/{}", env!("CARGO_PKG_VERSION")),
            sink,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Build the event that [`Tracker::track`] would send
    pub fn event(&self, event: &str, data: Map<String, Value>) -> AnalyticsEvent {
        let mut data = data;
        data.insert("sessionId".to_string(), json!(self.session_id));
        data.insert("client".to_string(), json!(self.client_name));
        data.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));

        AnalyticsEvent {
            event: event.to_string(),
            user_id: self.user_id.clone(),
            data,
        }
    }

    /// Send an event. Failures are logged and never reach the caller.
    pub async fn track(&self, event: &str, data: Map<String, Value>) {
        let event = self.event(event, data);
        if let Err(e) = self.sink.send(&event).await {
            tracing::warn!("Analytics tracking failed: {}", e);
        }
    }

    pub async fn track_page_view(&self, page: &str) {
        self.track("page_view", object(json!({ "page": page }))).await
    }

    pub async fn track_user_action(&self, action: &str, details: Map<String, Value>) {
        let mut data = details;
        data.insert("action".to_string(), json!(action));
        self.track("user_action", data).await
    }

    pub async fn track_resume_analysis(&self, metrics: ResumeAnalysisMetrics) {
        let data = serde_json::to_value(metrics).map(object).unwrap_or_default();
        self.track("resume_analysis", data).await
    }
}

/// A fresh id such as `user_1718000000000_3f9a2b1c4`
pub fn prefixed_id(prefix: &str) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), &random[..9])
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
