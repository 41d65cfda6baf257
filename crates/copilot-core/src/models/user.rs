use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User information returned by the authentication endpoint.
///
/// Only `email` is required. Anything else the server sends is kept in
/// `extra` and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserInfo {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }

    /// The state attached to a session for this user
    pub fn user_state(&self) -> UserState {
        UserState {
            email: self.email.clone(),
        }
    }
}

/// User state attached to an established session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    pub email: String,
}
