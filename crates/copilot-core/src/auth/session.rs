use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::Credentials;
use crate::models::UserState;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Authorization scheme a session token is presented under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthScheme {
    Basic,
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::Basic => write!(f, "Basic"),
        }
    }
}

/// Client-side session token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
    #[serde(rename = "type")]
    pub scheme: AuthScheme,
}

impl SessionToken {
    /// `"<email>:<password>"` under the Basic scheme
    pub fn basic(credentials: &Credentials) -> Self {
        Self {
            token: format!("{}:{}", credentials.email, credentials.password),
            scheme: AuthScheme::Basic,
        }
    }

    /// Value for an `Authorization` header
    pub fn authorization(&self) -> String {
        format!("{} {}", self.scheme, self.token)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("token", &"***")
            .field("scheme", &self.scheme)
            .finish()
    }
}

/// What the establisher hands to the session context on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    pub auth: SessionToken,
    pub user_state: UserState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub auth: SessionToken,
    pub user_state: UserState,
    pub signed_in_at: DateTime<Utc>,
}

impl From<SignIn> for SessionData {
    fn from(sign_in: SignIn) -> Self {
        Self {
            auth: sign_in.auth,
            user_state: sign_in.user_state,
            signed_in_at: Utc::now(),
        }
    }
}

/// Persistence for the session across launches.
pub trait SessionStore: Send + 'static {
    fn load(&self) -> Result<Option<SessionData>>;
    fn save(&mut self, data: &SessionData) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Session persisted as JSON in the cache directory.
pub struct FileSessionStore {
    cache_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionData>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data = serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(data))
    }

    fn save(&mut self, data: &SessionData) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&path, contents).context("Failed to write session file")?;

        // The token embeds the password
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// Session held in memory only; lost when the process exits.
#[derive(Default)]
pub struct MemorySessionStore {
    data: Option<SessionData>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionData>> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &SessionData) -> Result<()> {
        self.data = Some(data.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.data = None;
        Ok(())
    }
}

struct SessionState<S> {
    store: S,
    current: Option<SessionData>,
}

/// Shared handle to the active session.
///
/// Clones refer to the same session. Writes are serialized by an async
/// mutex, so the login task and the UI can both hold a handle.
pub struct SessionContext<S> {
    inner: Arc<Mutex<SessionState<S>>>,
}

impl<S> Clone for SessionContext<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SessionStore> SessionContext<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                store,
                current: None,
            })),
        }
    }

    /// Restore a persisted session. Returns true if one was found.
    pub async fn init(&self) -> Result<bool> {
        let mut state = self.inner.lock().await;
        let restored = state.store.load()?;
        debug!(found = restored.is_some(), "Session restore");
        state.current = restored;
        Ok(state.current.is_some())
    }

    /// Activate and persist a session. Returns false if the store rejected it,
    /// in which case no session is active.
    pub async fn sign_in(&self, sign_in: SignIn) -> bool {
        let data = SessionData::from(sign_in);
        let mut state = self.inner.lock().await;
        match state.store.save(&data) {
            Ok(()) => {
                info!(email = %data.user_state.email, "Session established");
                state.current = Some(data);
                true
            }
            Err(e) => {
                warn!(error = %e, "Session store rejected sign-in");
                false
            }
        }
    }

    /// Clear the session from memory and the store
    pub async fn sign_out(&self) -> Result<()> {
        let mut state = self.inner.lock().await;
        state.current = None;
        state.store.clear()?;
        info!("Session cleared");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.lock().await.current.is_some()
    }

    pub async fn user_state(&self) -> Option<UserState> {
        self.inner
            .lock()
            .await
            .current
            .as_ref()
            .map(|d| d.user_state.clone())
    }

    /// `Authorization` header value for the active session
    pub async fn authorization(&self) -> Option<String> {
        self.inner
            .lock()
            .await
            .current
            .as_ref()
            .map(|d| d.auth.authorization())
    }

    pub async fn current(&self) -> Option<SessionData> {
        self.inner.lock().await.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RejectingStore;

    impl SessionStore for RejectingStore {
        fn load(&self) -> Result<Option<SessionData>> {
            Ok(None)
        }

        fn save(&mut self, _: &SessionData) -> Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }

        fn clear(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn sample_sign_in() -> SignIn {
        SignIn {
            auth: SessionToken::basic(&Credentials::new("a@b.com", "secret")),
            user_state: UserState {
                email: "a@b.com".to_string(),
            },
        }
    }

    #[test]
    fn test_basic_token_format() {
        let token = SessionToken::basic(&Credentials::new("a@b.com", "secret"));
        assert_eq!(token.token, "a@b.com:secret");
        assert_eq!(token.scheme, AuthScheme::Basic);
        assert_eq!(token.authorization(), "Basic a@b.com:secret");
    }

    #[test]
    fn test_token_serializes_scheme_as_type() {
        let token = SessionToken::basic(&Credentials::new("a@b.com", "secret"));
        let value = serde_json::to_value(&token).unwrap();
        assert_eq!(value, serde_json::json!({"token": "a@b.com:secret", "type": "Basic"}));
        assert!(!format!("{:?}", token).contains("secret"));
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSessionStore::new(dir.path().join("nested"));
        assert!(store.load().unwrap().is_none());

        let data = SessionData::from(sample_sign_in());
        store.save(&data).unwrap();
        assert!(store.session_path().exists());
        assert_eq!(store.load().unwrap(), Some(data));

        store.clear().unwrap();
        assert!(!store.session_path().exists());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().to_path_buf());
        std::fs::write(store.session_path(), "{not json").unwrap();
        assert!(store.load().is_err());
    }

    #[tokio::test]
    async fn test_context_sign_in_and_out() {
        let context = SessionContext::new(MemorySessionStore::default());
        assert!(!context.is_authenticated().await);

        assert!(context.sign_in(sample_sign_in()).await);
        assert!(context.is_authenticated().await);
        assert_eq!(context.user_state().await.unwrap().email, "a@b.com");
        assert_eq!(
            context.authorization().await.as_deref(),
            Some("Basic a@b.com:secret")
        );

        context.sign_out().await.unwrap();
        assert!(!context.is_authenticated().await);
        assert!(context.authorization().await.is_none());
    }

    #[tokio::test]
    async fn test_context_restores_persisted_session() {
        let dir = tempfile::tempdir().unwrap();

        let first = SessionContext::new(FileSessionStore::new(dir.path().to_path_buf()));
        assert!(!first.init().await.unwrap());
        assert!(first.sign_in(sample_sign_in()).await);

        let second = SessionContext::new(FileSessionStore::new(dir.path().to_path_buf()));
        assert!(second.init().await.unwrap());
        assert_eq!(second.user_state().await.unwrap().email, "a@b.com");

        second.sign_out().await.unwrap();
        let third = SessionContext::new(FileSessionStore::new(dir.path().to_path_buf()));
        assert!(!third.init().await.unwrap());
    }

    #[tokio::test]
    async fn test_context_reports_rejected_sign_in() {
        let context = SessionContext::new(RejectingStore);
        assert!(!context.sign_in(sample_sign_in()).await);
        assert!(!context.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_clones_share_session() {
        let context = SessionContext::new(MemorySessionStore::default());
        let other = context.clone();
        context.sign_in(sample_sign_in()).await;
        assert!(other.is_authenticated().await);
    }
}
