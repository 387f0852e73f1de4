//! Line editing for the chat prompt.
//!
//! The prompt shows the active persona. Ctrl+C and Ctrl+D surface as their
//! own [`Line`] variants so the loop can cancel a pending turn or leave.

use console::style;
use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};
use tracing::debug;

/// One read from the terminal.
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    /// Trimmed, non-empty text.
    Text(String),
    /// Enter on an empty or whitespace-only line.
    Blank,
    /// Ctrl+C.
    Interrupt,
    /// Ctrl+D, or the terminal went away.
    Hangup,
}

impl Line {
    fn from_raw(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() {
            Line::Blank
        } else {
            Line::Text(text.to_string())
        }
    }
}

fn prompt_for(persona: &str) -> String {
    format!("  {} ", style(format!("You [{persona}] >")).green().bold())
}

pub struct LineReader {
    editor: Readline,
    last_entry: Option<String>,
}

impl LineReader {
    /// Start reading with a prompt for `persona`. The returned writer prints
    /// above the prompt without corrupting it.
    pub fn open(persona: &str) -> Result<(Self, SharedWriter), ReadlineError> {
        let (editor, writer) = Readline::new(prompt_for(persona))?;
        let reader = Self {
            editor,
            last_entry: None,
        };
        Ok((reader, writer))
    }

    pub fn set_persona(&mut self, persona: &str) {
        if let Err(e) = self.editor.update_prompt(&prompt_for(persona)) {
            debug!(error = %e, "Could not update prompt");
        }
    }

    pub async fn next_line(&mut self) -> Line {
        let raw = match self.editor.readline().await {
            Ok(ReadlineEvent::Line(raw)) => raw,
            Ok(ReadlineEvent::Interrupted) => return Line::Interrupt,
            Ok(ReadlineEvent::Eof) => return Line::Hangup,
            Err(e) => {
                debug!(error = %e, "Readline failed, ending input");
                return Line::Hangup;
            }
        };
        let line = Line::from_raw(&raw);
        if let Line::Text(text) = &line {
            self.remember(text);
        }
        line
    }

    /// Add to recall history unless it repeats the previous entry.
    fn remember(&mut self, text: &str) {
        if self.last_entry.as_deref() == Some(text) {
            return;
        }
        self.editor.add_history_entry(text.to_string());
        self.last_entry = Some(text.to_string());
    }

    /// Restore the terminal before exiting.
    pub fn close(&mut self) {
        if let Err(e) = self.editor.flush() {
            debug!(error = %e, "Could not flush terminal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_lines_are_trimmed() {
        assert_eq!(Line::from_raw("  hello there \n"), Line::Text("hello there".to_string()));
        assert_eq!(Line::from_raw("/persona technical"), Line::Text("/persona technical".to_string()));
    }

    #[test]
    fn whitespace_is_blank() {
        assert_eq!(Line::from_raw(""), Line::Blank);
        assert_eq!(Line::from_raw(" \t "), Line::Blank);
    }

    #[test]
    fn prompt_names_persona() {
        let prompt = prompt_for("creative");
        assert!(prompt.contains("You [creative] >"));
        assert!(prompt.ends_with(' '));
    }
}
