//! Chat transcript state for the assistant panel
//!
//! The transcript is append-only and scoped to one chat session: it is
//! seeded with a synthetic assistant greeting, and a failed turn appends
//! a fixed apology instead of dropping the user's message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Greeting shown before the user has said anything
pub const GREETING: &str =
    "Hi! I've reviewed your document. Ask me anything about its clauses, risks, or next steps.";

/// Fixed message appended when the assistant call fails
pub const APOLOGY: &str =
    "Sorry, I couldn't process that just now. Please try again in a moment.";

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single transcript entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered, append-only message sequence plus the typing indicator
#[derive(Debug, Clone, Serialize)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
    /// True while an assistant reply is pending
    pub typing: bool,
}

impl ChatTranscript {
    /// A fresh transcript, already seeded with the greeting
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::new(ChatRole::Assistant, GREETING)],
            typing: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Append the user's message and mark the assistant as typing
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::new(ChatRole::User, text));
        self.typing = true;
    }

    /// Append the assistant's reply and clear the typing indicator
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::new(ChatRole::Assistant, text));
        self.typing = false;
    }

    /// Append the fixed apology after a failed turn
    pub fn push_apology(&mut self) {
        self.push_assistant(APOLOGY);
    }
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}
