use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use navigator::conversation::FullScreenView;
use navigator::errors::TurnError;
use navigator::models::turn::ConversationTurn;

use super::{Input, InputType, Prompt};

#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Snapshot(String),
    Answer(String),
    FullScreen(usize),
    Error(TurnError),
    Notice(String),
}

/// Replays scripted input and records everything rendered
pub struct MockPrompt {
    inputs: VecDeque<Input>,
    rendered: Arc<Mutex<Vec<Rendered>>>,
    width: usize,
}

impl MockPrompt {
    pub fn new(inputs: Vec<Input>) -> Self {
        MockPrompt {
            inputs: inputs.into(),
            rendered: Arc::new(Mutex::new(Vec::new())),
            width: super::DEFAULT_WIDTH,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn rendered(&self) -> Arc<Mutex<Vec<Rendered>>> {
        self.rendered.clone()
    }

    fn record(&self, item: Rendered) {
        self.rendered.lock().unwrap().push(item);
    }
}

impl Prompt for MockPrompt {
    fn render_snapshot(&mut self, turn: &ConversationTurn) {
        self.record(Rendered::Snapshot(turn.response.message.content.clone()));
    }

    fn render_answer(&mut self, turn: &ConversationTurn) {
        self.record(Rendered::Answer(turn.response.message.content.clone()));
    }

    fn render_full_screen(&mut self, view: &FullScreenView) {
        self.record(Rendered::FullScreen(view.turn_index));
    }

    fn render_error(&mut self, error: &TurnError) {
        self.record(Rendered::Error(error.clone()));
    }

    fn render_notice(&mut self, text: &str) {
        self.record(Rendered::Notice(text.to_string()));
    }

    fn get_input(&mut self) -> Result<Input> {
        Ok(self
            .inputs
            .pop_front()
            .unwrap_or_else(|| Input::command(InputType::Exit)))
    }

    fn show_busy(&mut self) {}

    fn hide_busy(&mut self) {}

    fn terminal_width(&self) -> usize {
        self.width
    }

    fn close(&self) {}

    fn navigator_ready(&self) {}
}
