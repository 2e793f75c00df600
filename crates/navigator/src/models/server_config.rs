use serde::{Deserialize, Serialize};

/// Feature flags published by the backend's `/config` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    #[serde(rename = "showGPT4VOptions")]
    pub show_gpt4v_options: bool,
    pub show_semantic_ranker_option: bool,
    pub show_query_rewriting_option: bool,
    pub show_reasoning_effort_option: bool,
    pub default_reasoning_effort: String,
    pub streaming_enabled: bool,
    pub show_vector_option: bool,
    pub show_agentic_retrieval_option: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            show_gpt4v_options: false,
            show_semantic_ranker_option: true,
            show_query_rewriting_option: false,
            show_reasoning_effort_option: false,
            default_reasoning_effort: String::new(),
            streaming_enabled: true,
            show_vector_option: true,
            show_agentic_retrieval_option: false,
        }
    }
}
