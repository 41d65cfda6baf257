use serde::{Deserialize, Serialize};

/// An entry in the recent chats sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub name: String,
    /// Human-readable last activity ("10:30", "Yesterday", ...)
    pub date: String,
}

impl Chat {
    pub fn new(name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
        }
    }
}

/// A single message in a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    /// `true` for assistant answers, `false` for the user's own queries
    pub is_answer: bool,
}

impl Message {
    pub fn answer(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_answer: true,
        }
    }

    pub fn query(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_answer: false,
        }
    }
}

/// A quick-action card shown above the message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickAction {
    pub header: String,
    pub details: String,
}

impl QuickAction {
    pub fn new(header: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            details: details.into(),
        }
    }
}
