use crate::errors::{TurnError, TurnResult};
use crate::models::response::AnswerResponse;
use crate::models::turn::ConversationTurn;
use crate::overflow::{Measurement, OverflowPromoter, PromotionDecision};

/// An answer currently shown in the full-screen view
#[derive(Debug, Clone, PartialEq)]
pub struct FullScreenView {
    pub turn_index: usize,
    pub turn: ConversationTurn,
}

/// View state of a chat: committed turns, the last failure and the
/// full-screen presentation.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    last_question: Option<String>,
    error: Option<TurnError>,
    pending_check: Option<usize>,
    full_screen: Option<FullScreenView>,
    promoter: OverflowPromoter,
}

impl Conversation {
    pub fn new(promoter: OverflowPromoter) -> Self {
        Conversation {
            promoter,
            ..Default::default()
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last_question(&self) -> Option<&str> {
        self.last_question.as_deref()
    }

    pub fn error(&self) -> Option<&TurnError> {
        self.error.as_ref()
    }

    /// Start a turn. Blank questions are rejected before any request is made.
    pub fn begin(&mut self, question: &str) -> TurnResult<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(TurnError::validation("a question is required"));
        }
        self.last_question = Some(question.to_string());
        self.error = None;
        Ok(question.to_string())
    }

    /// Record a finished turn and schedule its overflow check
    pub fn commit(&mut self, question: &str, response: AnswerResponse) -> usize {
        self.turns.push(ConversationTurn::new(question, response));
        let index = self.turns.len() - 1;
        self.pending_check = Some(index);
        index
    }

    /// Record a failed turn. The question is kept for a retry; no partial answer is stored.
    pub fn fail(&mut self, error: TurnError) {
        self.error = Some(error);
    }

    /// The question to re-issue after a failure
    pub fn retry_question(&self) -> Option<&str> {
        self.error.as_ref().and(self.last_question.as_deref())
    }

    pub fn pending_check(&self) -> Option<usize> {
        self.pending_check
    }

    /// Run the pending overflow check once, with the rendered size of that turn
    pub fn check_overflow(&mut self, measurement: Measurement) -> Option<PromotionDecision> {
        let index = self.pending_check.take()?;
        let turn = self.turns.get(index)?;
        let decision = self.promoter.decide(index, measurement);
        if decision.promote {
            self.full_screen = Some(FullScreenView {
                turn_index: index,
                turn: turn.clone(),
            });
        }
        Some(decision)
    }

    pub fn full_screen(&self) -> Option<&FullScreenView> {
        self.full_screen.as_ref()
    }

    /// Close the full-screen view; the rule is not evaluated again
    pub fn dismiss_full_screen(&mut self) {
        self.full_screen = None;
    }

    /// Replace the conversation with previously recorded turns
    pub fn restore(&mut self, turns: Vec<ConversationTurn>) {
        self.clear();
        self.turns = turns;
    }

    pub fn clear(&mut self) {
        let promoter = self.promoter;
        *self = Conversation::new(promoter);
    }
}
