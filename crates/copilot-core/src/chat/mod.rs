//! Chat screen data and capabilities.
//!
//! The chat list, messages and quick actions are mock data. Creating a
//! chat, sending a query and running a quick action go through
//! [`ChatService`]; the only implementation today is
//! [`UnimplementedChatService`], which reports every operation as not
//! available.

pub mod list;
pub mod mock;
pub mod service;

pub use list::ChatList;
pub use service::{ChatError, ChatService, ResponseStream, UnimplementedChatService};
