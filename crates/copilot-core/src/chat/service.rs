use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use thiserror::Error;

use crate::models::{Chat, QuickAction};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Not available yet: {0}")]
    Unimplemented(&'static str),
}

/// Lazily produced chunks of an assistant response.
pub type ResponseStream = BoxStream<'static, Result<String, ChatError>>;

/// Operations behind the chat screen's actions.
///
/// A backend-connected implementation streams the assistant's reply chunk by
/// chunk from `send_query` and `run_quick_action`.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn create_chat(&self) -> Result<Chat, ChatError>;

    fn send_query(&self, chat: &Chat, query: &str) -> ResponseStream;

    fn run_quick_action(&self, action: &QuickAction) -> ResponseStream;
}

/// Chat service with no backend: every operation fails with `Unimplemented`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnimplementedChatService;

impl UnimplementedChatService {
    fn unavailable(operation: &'static str) -> ResponseStream {
        stream::once(async move { Err(ChatError::Unimplemented(operation)) }).boxed()
    }
}

#[async_trait]
impl ChatService for UnimplementedChatService {
    async fn create_chat(&self) -> Result<Chat, ChatError> {
        Err(ChatError::Unimplemented("create chat"))
    }

    fn send_query(&self, _chat: &Chat, _query: &str) -> ResponseStream {
        Self::unavailable("send query")
    }

    fn run_quick_action(&self, _action: &QuickAction) -> ResponseStream {
        Self::unavailable("quick action")
    }
}
