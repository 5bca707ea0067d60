//! Stateful chat session over the loaded document
//!
//! A session holds the full turn history, starting with one system turn
//! that embeds the (truncated) document text. At most one session is
//! active at a time; the owner replaces it wholesale when a new document
//! loads, discarding the previous conversation entirely.

use serde::Serialize;

use crate::prompts::{chat_system_prompt, truncate_chars, MAX_ANALYSIS_CHARS};

/// Wire role labels match the chat-completions API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Assistant,
}

/// One turn in the conversation history.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

/// Conversational context for one loaded document.
#[derive(Debug, Clone)]
pub struct ChatSession {
    turns: Vec<Turn>,
}

impl ChatSession {
    /// Start a session with the document text injected as system context.
    pub fn new(document_text: &str) -> Self {
        let context = truncate_chars(document_text, MAX_ANALYSIS_CHARS);
        Self {
            turns: vec![Turn {
                role: TurnRole::System,
                content: chat_system_prompt(context),
            }],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            role: TurnRole::User,
            content: text.into(),
        });
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            role: TurnRole::Assistant,
            content: text.into(),
        });
    }
}
