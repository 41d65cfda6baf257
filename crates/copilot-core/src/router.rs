//! Route table and navigation requests.
//!
//! Screens are addressed by path the same way the web client addressed its
//! pages: `/` is the chat, `/login` the login screen, and everything else
//! lands on the not-found screen.

use tokio::sync::mpsc;
use tracing::debug;

pub const CHAT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Chat,
    Login,
    /// Unknown path, kept for display
    NotFound(String),
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        match path.trim() {
            "" | CHAT_PATH => Route::Chat,
            LOGIN_PATH | "/login/" => Route::Login,
            other => Route::NotFound(other.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Chat => CHAT_PATH,
            Route::Login => LOGIN_PATH,
            Route::NotFound(path) => path,
        }
    }

    /// The chat requires a session; without one it redirects to login.
    pub fn guard(self, authenticated: bool) -> Self {
        match self {
            Route::Chat if !authenticated => Route::Login,
            route => route,
        }
    }
}

/// Handle used to request navigation. The receiving side is drained by the
/// application loop.
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: mpsc::UnboundedSender<String>,
}

impl Navigator {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn navigate(&self, path: &str) {
        debug!(path, "Navigation requested");
        if self.tx.send(path.to_string()).is_err() {
            debug!(path, "Navigation receiver dropped");
        }
    }
}
