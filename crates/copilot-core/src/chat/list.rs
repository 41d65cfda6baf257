use crate::models::Chat;

/// Recent chats with one active selection.
#[derive(Debug, Clone)]
pub struct ChatList {
    chats: Vec<Chat>,
    active: usize,
}

impl ChatList {
    /// The first chat starts out active
    pub fn new(chats: Vec<Chat>) -> Self {
        Self { chats, active: 0 }
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&Chat> {
        self.chats.get(self.active)
    }

    pub fn next(&mut self) {
        if !self.chats.is_empty() {
            self.active = (self.active + 1) % self.chats.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.chats.is_empty() {
            self.active = (self.active + self.chats.len() - 1) % self.chats.len();
        }
    }
}
