use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::{input, spinner};
use console::{style, Term};
use navigator::conversation::FullScreenView;
use navigator::errors::TurnError;
use navigator::models::turn::ConversationTurn;
use serde_json::Value;

use super::{Input, InputType, Prompt, Theme, DEFAULT_WIDTH};

pub struct CliclackPrompt {
    spinner: cliclack::ProgressBar,
    busy: bool,
    // Answer text already written for the turn being streamed
    streamed: String,
    theme: Theme,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt {
            spinner: spinner(),
            busy: false,
            streamed: String::new(),
            theme: Theme::Dark,
        }
    }

    fn theme_name(&self) -> &'static str {
        match self.theme {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }
}

impl Default for CliclackPrompt {
    fn default() -> Self {
        Self::new()
    }
}

fn print(content: &str, theme: &str) {
    let result = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();
    if let Err(e) = result {
        tracing::warn!("Markdown rendering failed: {}", e);
        println!("{}", content);
    }
}

fn print_framed(content: &str, theme: &str, title: &str) {
    let result = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()).name(title))
        .theme(theme)
        .language("Markdown")
        .grid(true)
        .header(true)
        .wrapping_mode(WrappingMode::Character)
        .print();
    if let Err(e) = result {
        tracing::warn!("Markdown rendering failed: {}", e);
        println!("{}\n{}", title, content);
    }
}

fn flush() {
    if let Err(e) = io::stdout().flush() {
        tracing::warn!("Failed to flush stdout: {}", e);
    }
}

/// The part of `text` not yet printed. Text already on screen is never repeated.
fn unseen_suffix<'a>(streamed: &str, text: &'a str) -> &'a str {
    text.strip_prefix(streamed).unwrap_or_default()
}

fn describe_data_point(point: &Value) -> String {
    match point {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl Prompt for CliclackPrompt {
    fn render_snapshot(&mut self, turn: &ConversationTurn) {
        self.hide_busy();
        let text = &turn.response.message.content;
        print!("{}", unseen_suffix(&self.streamed, text));
        self.streamed = text.clone();
        flush();
    }

    fn render_answer(&mut self, turn: &ConversationTurn) {
        self.hide_busy();
        if self.streamed.is_empty() {
            print(&turn.response.message.content, self.theme_name());
        } else {
            println!();
        }
        self.streamed.clear();

        if let Some(points) = turn.response.data_points().and_then(Value::as_array) {
            if !points.is_empty() {
                let sources: Vec<String> = points.iter().map(describe_data_point).collect();
                println!("{}", style(format!("Sources: {}", sources.join(", "))).dim());
            }
        }
        println!();
        flush();
    }

    fn render_full_screen(&mut self, view: &FullScreenView) {
        let title = format!("Answer {}: {}", view.turn_index + 1, view.turn.question);
        print_framed(&view.turn.response.message.content, self.theme_name(), &title);
        println!();
    }

    fn render_error(&mut self, error: &TurnError) {
        self.hide_busy();
        if !self.streamed.is_empty() {
            println!();
            self.streamed.clear();
        }
        println!("{} {}", style("Error:").red().bold(), error);
        if !matches!(error, TurnError::Validation(_)) {
            println!("{}", style("Type /retry to ask again.").dim());
        }
    }

    fn render_notice(&mut self, text: &str) {
        println!("{}", style(text).dim());
    }

    fn show_busy(&mut self) {
        self.spinner = spinner();
        self.spinner.start("awaiting reply");
        self.busy = true;
    }

    fn hide_busy(&mut self) {
        if self.busy {
            self.spinner.stop("");
            self.busy = false;
        }
    }

    fn terminal_width(&self) -> usize {
        match Term::stdout().size_checked() {
            Some((_rows, cols)) if cols > 0 => cols as usize,
            _ => DEFAULT_WIDTH,
        }
    }

    fn get_input(&mut self) -> Result<Input> {
        let message_text: String = input("Ask Navigator:              [Help: /?]")
            .placeholder("")
            .interact()?;
        let message_text = message_text.trim();

        if message_text.eq_ignore_ascii_case("/exit") || message_text.eq_ignore_ascii_case("/quit")
        {
            Ok(Input::command(InputType::Exit))
        } else if message_text.eq_ignore_ascii_case("/retry") {
            Ok(Input::command(InputType::Retry))
        } else if message_text.eq_ignore_ascii_case("/clear") {
            Ok(Input::command(InputType::Clear))
        } else if message_text.eq_ignore_ascii_case("/t") {
            self.theme = match self.theme {
                Theme::Light => {
                    println!("Switching to Dark theme");
                    Theme::Dark
                }
                Theme::Dark => {
                    println!("Switching to Light theme");
                    Theme::Light
                }
            };
            Ok(Input::command(InputType::AskAgain))
        } else if message_text.eq_ignore_ascii_case("/?") {
            println!("Commands:");
            println!("/exit - Exit the session");
            println!("/retry - Ask the last failed question again");
            println!("/clear - Start a new conversation");
            println!("/t - Toggle Light/Dark theme");
            println!("/? - Display this help message");
            println!("Ctrl+C - Stop the answer being streamed");
            Ok(Input::command(InputType::AskAgain))
        } else {
            Ok(Input::message(message_text))
        }
    }

    fn close(&self) {
        // No cleanup required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_suffix_prints_only_new_text() {
        assert_eq!(unseen_suffix("", "Hello world"), "Hello world");
        assert_eq!(unseen_suffix("Hello world", "Hello world!"), "!");
        assert_eq!(unseen_suffix("Hello world!", "Hello world!"), "");
    }

    #[test]
    fn test_unseen_suffix_never_reprints() {
        assert_eq!(unseen_suffix("Hello world", "!"), "");
    }
}
