use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use navigator::models::turn::ConversationTurn;

use crate::configuration::config_dir;

pub fn ensure_session_dir() -> Result<PathBuf> {
    let session_dir = config_dir()?.join("sessions");

    if !session_dir.exists() {
        fs::create_dir_all(&session_dir)?;
    }

    Ok(session_dir)
}

/// File holding the conversation recorded under `key`
pub fn history_file(session_dir: &Path, key: &str) -> PathBuf {
    let name: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    session_dir.join(format!("{}.jsonl", name))
}

/// Write every turn as one JSON line, replacing the file
pub fn persist_turns(session_file: &Path, turns: &[ConversationTurn]) -> Result<()> {
    let file = File::create(session_file)
        .with_context(|| format!("Failed to create {}", session_file.display()))?;
    let mut writer = std::io::BufWriter::new(file);

    for turn in turns {
        serde_json::to_writer(&mut writer, turn)?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn load_turns(session_file: &Path) -> Result<Vec<ConversationTurn>> {
    let file = File::open(session_file)
        .with_context(|| format!("No recorded session at {}", session_file.display()))?;

    let mut turns = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        turns.push(serde_json::from_str(&line)?);
    }
    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigator::models::message::ResponseMessage;
    use navigator::models::response::AnswerResponse;
    use serde_json::json;
    use tempfile::tempdir;

    fn turn(question: &str, answer: &str) -> ConversationTurn {
        let mut response = AnswerResponse::new(ResponseMessage::assistant(answer));
        response.session_state = Some(json!("s-1"));
        ConversationTurn::new(question, response)
    }

    #[test]
    fn test_history_file_name_is_sanitized() {
        let dir = Path::new("/tmp/sessions");
        assert_eq!(
            history_file(dir, "abc-123_x"),
            dir.join("abc-123_x.jsonl")
        );
        assert_eq!(history_file(dir, "../etc/passwd"), dir.join("___etc_passwd.jsonl"));
    }

    #[test]
    fn test_persist_writes_one_line_per_turn() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s-1.jsonl");
        let turns = vec![turn("first", "one"), turn("second", "two\nlines")];

        persist_turns(&path, &turns).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        let loaded = load_turns(&path).unwrap();
        assert_eq!(loaded, turns);
    }

    #[test]
    fn test_persist_replaces_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("s-1.jsonl");
        persist_turns(&path, &[turn("a", "1"), turn("b", "2")]).unwrap();
        persist_turns(&path, &[turn("c", "3")]).unwrap();

        let loaded = load_turns(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].question, "c");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(load_turns(&dir.path().join("absent.jsonl")).is_err());
    }
}
