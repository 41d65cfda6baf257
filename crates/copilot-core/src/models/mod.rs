//! Data models shared by the API client, session and UI.
//!
//! - `user`: what the authentication endpoint returns and what the session
//!   keeps about the signed-in user
//! - `chat`: chats, messages and quick-action cards shown on the chat screen

pub mod chat;
pub mod user;

pub use chat::{Chat, Message, QuickAction};
pub use user::{UserInfo, UserState};
