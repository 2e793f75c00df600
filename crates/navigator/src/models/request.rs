use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::ResponseMessage;
use super::turn::ConversationTurn;
use crate::settings::{Gpt4vInput, RetrievalMode, VectorFields};

/// Per-request knobs forwarded to the retrieval backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_category: Option<String>,
    pub top: u32,
    pub max_subqueries: u32,
    pub results_merge_strategy: String,
    pub temperature: f32,
    pub minimum_reranker_score: f32,
    pub minimum_search_score: f32,
    pub retrieval_mode: RetrievalMode,
    pub semantic_ranker: bool,
    pub semantic_captions: bool,
    pub query_rewriting: bool,
    pub reasoning_effort: String,
    pub suggest_followup_questions: bool,
    pub use_oid_security_filter: bool,
    pub use_groups_security_filter: bool,
    pub vector_fields: VectorFields,
    pub use_gpt4v: bool,
    pub gpt4v_input: Gpt4vInput,
    pub language: String,
    pub use_agentic_retrieval: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestContext {
    pub overrides: Overrides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAppRequest {
    pub messages: Vec<ResponseMessage>,
    pub context: RequestContext,
    /// Whatever session state the server handed out on the previous turn
    pub session_state: Option<Value>,
}

impl ChatAppRequest {
    /// Build the request for `question`, replaying `prior_turns` as history
    pub fn new(question: &str, prior_turns: &[ConversationTurn], overrides: Overrides) -> Self {
        let mut messages: Vec<ResponseMessage> = prior_turns
            .iter()
            .flat_map(ConversationTurn::to_messages)
            .collect();
        messages.push(ResponseMessage::user(question));

        ChatAppRequest {
            messages,
            context: RequestContext { overrides },
            session_state: prior_turns
                .last()
                .and_then(|turn| turn.response.session_state.clone()),
        }
    }
}
