use anyhow::Result;
use navigator::conversation::FullScreenView;
use navigator::errors::TurnError;
use navigator::models::turn::ConversationTurn;

pub mod cliclack;
#[cfg(test)]
pub mod mock_prompt;

/// Terminal width assumed when the real one is unknown
pub const DEFAULT_WIDTH: usize = 80;

pub trait Prompt: Send {
    /// Show the turn being streamed; called once per published snapshot
    fn render_snapshot(&mut self, turn: &ConversationTurn);
    /// Show a finished answer
    fn render_answer(&mut self, turn: &ConversationTurn);
    fn render_full_screen(&mut self, view: &FullScreenView);
    fn render_error(&mut self, error: &TurnError);
    fn render_notice(&mut self, text: &str);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn terminal_width(&self) -> usize {
        DEFAULT_WIDTH
    }
    fn close(&self);
    fn navigator_ready(&self) {
        println!("\n");
        println!("Career Navigator is ready. Ask about roles, skills or your next move.");
        println!("\n");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Only set for messages
}

impl Input {
    pub fn message<S: Into<String>>(content: S) -> Self {
        Input {
            input_type: InputType::Message,
            content: Some(content.into()),
        }
    }

    pub fn command(input_type: InputType) -> Self {
        Input {
            input_type,
            content: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a question
    Retry,    // Re-issue the last failed question
    Clear,    // Start over with an empty conversation
    Exit,     // User wants to exit the session
}

pub enum Theme {
    Light,
    Dark,
}
