//! Chat settings and the reducer that applies updates to them.
//!
//! Settings are a plain record. Every change goes through [`reduce`] with a
//! [`SettingsUpdate`] command, so the record is never mutated field by field
//! from the outside.
use serde::{Deserialize, Serialize};

use crate::models::request::Overrides;
use crate::models::server_config::ServerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    #[default]
    Hybrid,
    Vectors,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorFields {
    #[default]
    TextAndImageEmbeddings,
    Text,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gpt4vInput {
    #[default]
    TextAndImages,
    Text,
    Images,
}

/// Retrieve count used once the server enables agentic retrieval
const AGENTIC_RETRIEVE_COUNT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub prompt_template: String,
    pub temperature: f32,
    pub seed: Option<i64>,
    pub minimum_reranker_score: f32,
    pub minimum_search_score: f32,
    pub retrieve_count: u32,
    pub max_subquery_count: u32,
    pub results_merge_strategy: String,
    pub retrieval_mode: RetrievalMode,
    pub use_semantic_ranker: bool,
    pub use_query_rewriting: bool,
    pub reasoning_effort: String,
    pub should_stream: bool,
    pub use_semantic_captions: bool,
    pub include_category: String,
    pub exclude_category: String,
    pub use_suggest_followup_questions: bool,
    pub vector_fields: VectorFields,
    pub use_oid_security_filter: bool,
    pub use_groups_security_filter: bool,
    pub gpt4v_input: Gpt4vInput,
    pub use_gpt4v: bool,
    pub use_agentic_retrieval: bool,
    pub language: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        ChatSettings {
            prompt_template: String::new(),
            temperature: 0.3,
            seed: None,
            minimum_reranker_score: 0.0,
            minimum_search_score: 0.0,
            retrieve_count: 3,
            max_subquery_count: 10,
            results_merge_strategy: "interleaved".to_string(),
            retrieval_mode: RetrievalMode::Hybrid,
            use_semantic_ranker: true,
            use_query_rewriting: false,
            reasoning_effort: String::new(),
            should_stream: true,
            use_semantic_captions: false,
            include_category: String::new(),
            exclude_category: String::new(),
            use_suggest_followup_questions: false,
            vector_fields: VectorFields::TextAndImageEmbeddings,
            use_oid_security_filter: false,
            use_groups_security_filter: false,
            gpt4v_input: Gpt4vInput::TextAndImages,
            use_gpt4v: false,
            use_agentic_retrieval: false,
            language: "en".to_string(),
        }
    }
}

/// A single change to [`ChatSettings`]
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsUpdate {
    PromptTemplate(String),
    Temperature(f32),
    Seed(Option<i64>),
    MinimumRerankerScore(f32),
    MinimumSearchScore(f32),
    RetrieveCount(u32),
    MaxSubqueryCount(u32),
    ResultsMergeStrategy(String),
    UseSemanticRanker(bool),
    UseQueryRewriting(bool),
    ReasoningEffort(String),
    UseSemanticCaptions(bool),
    ExcludeCategory(String),
    IncludeCategory(String),
    UseOidSecurityFilter(bool),
    UseGroupsSecurityFilter(bool),
    ShouldStream(bool),
    UseSuggestFollowupQuestions(bool),
    UseGpt4v(bool),
    Gpt4vInput(Gpt4vInput),
    VectorFields(VectorFields),
    RetrievalMode(RetrievalMode),
    UseAgenticRetrieval(bool),
    Language(String),
}

/// Apply `update` to `settings`, returning the new record
pub fn reduce(settings: ChatSettings, update: SettingsUpdate) -> ChatSettings {
    let mut next = settings;
    match update {
        SettingsUpdate::PromptTemplate(value) => next.prompt_template = value,
        SettingsUpdate::Temperature(value) => next.temperature = value,
        SettingsUpdate::Seed(value) => next.seed = value,
        SettingsUpdate::MinimumRerankerScore(value) => next.minimum_reranker_score = value,
        SettingsUpdate::MinimumSearchScore(value) => next.minimum_search_score = value,
        SettingsUpdate::RetrieveCount(value) => next.retrieve_count = value,
        SettingsUpdate::MaxSubqueryCount(value) => next.max_subquery_count = value,
        SettingsUpdate::ResultsMergeStrategy(value) => next.results_merge_strategy = value,
        SettingsUpdate::UseSemanticRanker(value) => next.use_semantic_ranker = value,
        SettingsUpdate::UseQueryRewriting(value) => next.use_query_rewriting = value,
        SettingsUpdate::ReasoningEffort(value) => next.reasoning_effort = value,
        SettingsUpdate::UseSemanticCaptions(value) => next.use_semantic_captions = value,
        SettingsUpdate::ExcludeCategory(value) => next.exclude_category = value,
        SettingsUpdate::IncludeCategory(value) => next.include_category = value,
        SettingsUpdate::UseOidSecurityFilter(value) => next.use_oid_security_filter = value,
        SettingsUpdate::UseGroupsSecurityFilter(value) => next.use_groups_security_filter = value,
        SettingsUpdate::ShouldStream(value) => next.should_stream = value,
        SettingsUpdate::UseSuggestFollowupQuestions(value) => next.use_suggest_followup_questions = value,
        SettingsUpdate::UseGpt4v(value) => next.use_gpt4v = value,
        SettingsUpdate::Gpt4vInput(value) => next.gpt4v_input = value,
        SettingsUpdate::VectorFields(value) => next.vector_fields = value,
        SettingsUpdate::RetrievalMode(value) => next.retrieval_mode = value,
        SettingsUpdate::UseAgenticRetrieval(value) => next.use_agentic_retrieval = value,
        SettingsUpdate::Language(value) => next.language = value,
    }
    next
}

impl ChatSettings {
    /// Fold the server's feature flags into the settings
    pub fn apply_server_config(self, config: &ServerConfig) -> ChatSettings {
        let mut updates = vec![
            SettingsUpdate::UseSemanticRanker(config.show_semantic_ranker_option),
            SettingsUpdate::UseQueryRewriting(config.show_query_rewriting_option),
            SettingsUpdate::UseAgenticRetrieval(config.show_agentic_retrieval_option),
        ];
        if config.show_gpt4v_options {
            updates.push(SettingsUpdate::UseGpt4v(true));
        }
        if !config.streaming_enabled {
            updates.push(SettingsUpdate::ShouldStream(false));
        }
        if config.show_reasoning_effort_option {
            updates.push(SettingsUpdate::ReasoningEffort(
                config.default_reasoning_effort.clone(),
            ));
        }
        if !config.show_vector_option {
            updates.push(SettingsUpdate::RetrievalMode(RetrievalMode::Text));
        }
        if config.show_agentic_retrieval_option {
            updates.push(SettingsUpdate::RetrieveCount(AGENTIC_RETRIEVE_COUNT));
        }
        updates.into_iter().fold(self, reduce)
    }

    pub fn to_overrides(&self) -> Overrides {
        Overrides {
            prompt_template: non_empty(&self.prompt_template),
            include_category: non_empty(&self.include_category),
            exclude_category: non_empty(&self.exclude_category),
            top: self.retrieve_count,
            max_subqueries: self.max_subquery_count,
            results_merge_strategy: self.results_merge_strategy.clone(),
            temperature: self.temperature,
            minimum_reranker_score: self.minimum_reranker_score,
            minimum_search_score: self.minimum_search_score,
            retrieval_mode: self.retrieval_mode,
            semantic_ranker: self.use_semantic_ranker,
            semantic_captions: self.use_semantic_captions,
            query_rewriting: self.use_query_rewriting,
            reasoning_effort: self.reasoning_effort.clone(),
            suggest_followup_questions: self.use_suggest_followup_questions,
            use_oid_security_filter: self.use_oid_security_filter,
            use_groups_security_filter: self.use_groups_security_filter,
            vector_fields: self.vector_fields,
            use_gpt4v: self.use_gpt4v,
            gpt4v_input: self.gpt4v_input,
            language: self.language.clone(),
            use_agentic_retrieval: self.use_agentic_retrieval,
            seed: self.seed,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_touches_only_target_field() {
        let before = ChatSettings::default();
        let after = reduce(before.clone(), SettingsUpdate::Temperature(0.9));
        assert_eq!(after.temperature, 0.9);
        assert_eq!(
            ChatSettings {
                temperature: before.temperature,
                ..after
            },
            before
        );
    }

    #[test]
    fn test_reduce_sequence() {
        let settings = [
            SettingsUpdate::RetrieveCount(5),
            SettingsUpdate::ShouldStream(false),
            SettingsUpdate::RetrievalMode(RetrievalMode::Vectors),
        ]
        .into_iter()
        .fold(ChatSettings::default(), reduce);

        assert_eq!(settings.retrieve_count, 5);
        assert!(!settings.should_stream);
        assert_eq!(settings.retrieval_mode, RetrievalMode::Vectors);
    }

    #[test]
    fn test_apply_server_config() {
        let config = ServerConfig {
            streaming_enabled: false,
            show_vector_option: false,
            show_agentic_retrieval_option: true,
            show_reasoning_effort_option: true,
            default_reasoning_effort: "low".to_string(),
            ..Default::default()
        };
        let settings = ChatSettings::default().apply_server_config(&config);

        assert!(!settings.should_stream);
        assert_eq!(settings.retrieval_mode, RetrievalMode::Text);
        assert!(settings.use_agentic_retrieval);
        assert_eq!(settings.retrieve_count, 10);
        assert_eq!(settings.reasoning_effort, "low");
        assert!(!settings.use_gpt4v);
    }

    #[test]
    fn test_overrides_omit_empty_strings() {
        let settings = reduce(
            ChatSettings::default(),
            SettingsUpdate::IncludeCategory("tech".to_string()),
        );
        let overrides = settings.to_overrides();
        assert_eq!(overrides.include_category.as_deref(), Some("tech"));
        assert_eq!(overrides.exclude_category, None);
        assert_eq!(overrides.prompt_template, None);
        assert_eq!(overrides.top, 3);
        assert_eq!(overrides.retrieval_mode, RetrievalMode::Hybrid);
    }
}
