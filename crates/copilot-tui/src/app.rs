//! Application state management for Alfa Copilot.
//!
//! This module contains the core `App` struct that manages all application state,
//! including the current screen, login form, chat screen state, session handling
//! and background task coordination.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use copilot_core::api::ApiClient;
use copilot_core::auth::{
    AuthenticationFailure, CredentialStore, Credentials, FileSessionStore, LoginPhase,
    SessionContext, SessionEstablisher, SignInOutcome,
};
use copilot_core::chat::{
    mock, ChatError, ChatList, ChatService, ResponseStream, UnimplementedChatService,
};
use copilot_core::config::{Config, ENV_PASSWORD};
use copilot_core::models::{Message, QuickAction, UserState};
use copilot_core::router::{Navigator, Route, CHAT_PATH, LOGIN_PATH};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// Login results and response chunks are drained every tick, 32 is plenty.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for the query input.
const MAX_QUERY_LENGTH: usize = 4000;

pub type Establisher = SessionEstablisher<ApiClient, FileSessionStore>;

/// Platform cache directory, or `./cache` when there is none
pub fn default_cache_dir() -> PathBuf {
    Config::cache_dir().unwrap_or_else(|e| {
        warn!(error = %e, "No cache directory, using ./cache");
        PathBuf::from("./cache")
    })
}

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    RememberMe,
    Button,
}

impl LoginFocus {
    pub fn next(self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::RememberMe,
            LoginFocus::RememberMe => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Email,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::RememberMe => LoginFocus::Password,
            LoginFocus::Button => LoginFocus::RememberMe,
        }
    }
}

/// Chat screen focus area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatFocus {
    NewChat,
    Chats,
    QuickActions,
    Input,
}

impl ChatFocus {
    pub fn next(self) -> Self {
        match self {
            ChatFocus::NewChat => ChatFocus::Chats,
            ChatFocus::Chats => ChatFocus::QuickActions,
            ChatFocus::QuickActions => ChatFocus::Input,
            ChatFocus::Input => ChatFocus::NewChat,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ChatFocus::NewChat => ChatFocus::Input,
            ChatFocus::Chats => ChatFocus::NewChat,
            ChatFocus::QuickActions => ChatFocus::Chats,
            ChatFocus::Input => ChatFocus::QuickActions,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned tasks back to the main loop.
enum BackgroundResult {
    /// A login submission settled
    Login {
        credentials: Credentials,
        remember: bool,
        result: Result<SignInOutcome, AuthenticationFailure>,
    },
    /// One chunk of an assistant response
    ResponseChunk(String),
    /// The response stream ended with an error
    ResponseFailed(ChatError),
    /// The response stream finished
    ResponseComplete,
}

/// A query whose response is being streamed.
struct InFlightQuery {
    query: String,
    answer: String,
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    establisher: Establisher,
    chat_service: Arc<dyn ChatService>,

    // Navigation
    pub route: Route,
    nav_rx: mpsc::UnboundedReceiver<String>,

    // UI State
    pub state: AppState,
    pub user: Option<UserState>,
    pub status_message: Option<String>,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,
    pub remember_me: bool,

    // Chat screen state
    pub chats: ChatList,
    pub messages: Vec<Message>,
    pub quick_actions: Vec<QuickAction>,
    pub quick_action_selection: usize,
    pub chat_focus: ChatFocus,
    pub query_input: String,
    pub message_scroll: u16,
    in_flight: Option<InFlightQuery>,

    // Background task channel
    background_rx: mpsc::Receiver<BackgroundResult>,
    background_tx: mpsc::Sender<BackgroundResult>,
}

impl App {
    /// Create a new application instance using the platform cache directory
    pub fn new(config: Config) -> Result<Self> {
        Self::with_cache_dir(config, default_cache_dir())
    }

    /// Create a new application instance persisting its session under `cache_dir`
    pub fn with_cache_dir(config: Config, cache_dir: PathBuf) -> Result<Self> {
        debug!(?cache_dir, api_base = %config.api_base(), "App::new() starting");

        let api = ApiClient::new(&config)?;
        let session = SessionContext::new(FileSessionStore::new(cache_dir));
        let (navigator, nav_rx) = Navigator::channel();
        let establisher = SessionEstablisher::new(Arc::new(api), session, navigator);

        let (background_tx, background_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_email = config.last_email.clone().unwrap_or_default();
        let login_password = Self::initial_password(&config, &login_email);
        let remember_me = config.remember_me;

        Ok(Self {
            config,
            establisher,
            chat_service: Arc::new(UnimplementedChatService),

            route: Route::Login,
            nav_rx,

            state: AppState::Normal,
            user: None,
            status_message: None,

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,
            remember_me,

            chats: ChatList::new(mock::chats()),
            messages: mock::messages(),
            quick_actions: mock::quick_actions(),
            quick_action_selection: 0,
            chat_focus: ChatFocus::Input,
            query_input: String::new(),
            message_scroll: 0,
            in_flight: None,

            background_rx,
            background_tx,
        })
    }

    /// Password from the environment, else from the keyring when remembered
    fn initial_password(config: &Config, email: &str) -> String {
        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            return password;
        }
        if config.remember_me && !email.is_empty() {
            match CredentialStore::get_password(email) {
                Ok(password) => return password,
                Err(e) => debug!(error = %e, "No remembered password"),
            }
        }
        String::new()
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Restore a persisted session and open the start screen
    pub async fn init_session(&mut self) {
        let session = self.establisher.session();
        match session.init().await {
            Ok(true) => info!("Restored persisted session"),
            Ok(false) => debug!("No persisted session"),
            Err(e) => warn!(error = %e, "Failed to restore session"),
        }
        self.user = session.user_state().await;
        self.start_login();
        self.navigate(CHAT_PATH);
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() || self.establisher.phase() == LoginPhase::Authenticated
    }

    /// True while a login request is in flight
    pub fn login_pending(&self) -> bool {
        self.establisher.is_pending()
    }

    /// Log out and return to the login screen
    pub async fn logout(&mut self) {
        if let Err(e) = self.establisher.sign_out().await {
            warn!(error = %e, "Failed to clear session");
        }
        if let Some(email) = self.user.take().map(|u| u.email) {
            if self.config.remember_me {
                if let Err(e) = CredentialStore::delete(&email) {
                    debug!(error = %e, "No remembered password to delete");
                }
            }
        }
        self.login_password.clear();
        self.status_message = None;
        self.navigate(LOGIN_PATH);
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigate(&mut self, path: &str) {
        let route = Route::from_path(path).guard(self.is_authenticated());
        debug!(path, ?route, "Navigating");
        if route == Route::Login && self.route != Route::Login {
            self.start_login();
        }
        self.route = route;
    }

    /// Reset the login form for a fresh attempt
    pub fn start_login(&mut self) {
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Submit the login form. The request runs in the background; the result
    /// arrives through `check_background_tasks`.
    pub fn submit_login(&mut self) {
        let credentials = Credentials::new(self.login_email.trim(), self.login_password.clone());
        if !credentials.is_complete() {
            self.login_error = Some("Email and password are required".to_string());
            return;
        }
        self.login_error = None;

        let establisher = self.establisher.clone();
        let tx = self.background_tx.clone();
        let remember = self.remember_me;

        tokio::spawn(async move {
            let result = establisher.submit(credentials.clone()).await;
            Self::send_result(
                &tx,
                BackgroundResult::Login {
                    credentials,
                    remember,
                    result,
                },
            )
            .await;
        });
    }

    fn finish_login(
        &mut self,
        credentials: Credentials,
        remember: bool,
        result: Result<SignInOutcome, AuthenticationFailure>,
    ) {
        match result {
            Ok(SignInOutcome::Established(user)) => {
                self.user = Some(user.user_state());
                self.login_password.clear();
                self.remember(&credentials, remember);
                self.status_message = Some(format!("Signed in as {}", user.email));
            }
            Ok(SignInOutcome::Rejected(_)) => {
                self.login_error = Some("Could not save the session".to_string());
            }
            Err(e) => {
                self.login_error = Some(e.to_string());
            }
        }
    }

    /// Persist "remember me" choices after a successful login
    fn remember(&mut self, credentials: &Credentials, remember: bool) {
        let forget = self.update_remembered(&credentials.email, remember);

        if remember {
            if let Err(e) = CredentialStore::store(&credentials.email, &credentials.password) {
                warn!(error = %e, "Failed to store credentials");
            }
        }
        for email in forget {
            if let Err(e) = CredentialStore::delete(&email) {
                debug!(error = %e, %email, "No remembered password to delete");
            }
        }

        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    /// Update the remember-me settings in config. Returns the emails whose
    /// keyring entries are no longer wanted.
    fn update_remembered(&mut self, email: &str, remember: bool) -> Vec<String> {
        let previous = self.config.last_email.take().filter(|p| p != email);
        self.config.remember_me = remember;

        let mut forget: Vec<String> = previous.into_iter().collect();
        if remember {
            self.config.last_email = Some(email.to_string());
        } else {
            forget.insert(0, email.to_string());
        }
        forget
    }

    // =========================================================================
    // Chat Actions
    // =========================================================================

    pub async fn create_chat(&mut self) {
        match self.chat_service.create_chat().await {
            Ok(chat) => {
                info!(name = %chat.name, "Chat created");
                self.status_message = Some(format!("Created {}", chat.name));
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// Send the query input to the active chat. Empty queries are ignored.
    pub fn send_query(&mut self) {
        let query = self.query_input.trim().to_string();
        if query.is_empty() || self.in_flight.is_some() {
            return;
        }
        let Some(chat) = self.chats.active().cloned() else {
            return;
        };
        let stream = self.chat_service.send_query(&chat, &query);
        self.stream_response(query, stream);
    }

    pub fn run_quick_action(&mut self) {
        if self.in_flight.is_some() {
            return;
        }
        let Some(action) = self.quick_actions.get(self.quick_action_selection).cloned() else {
            return;
        };
        let stream = self.chat_service.run_quick_action(&action);
        self.stream_response(action.header, stream);
    }

    fn stream_response(&mut self, query: String, mut stream: ResponseStream) {
        self.in_flight = Some(InFlightQuery {
            query,
            answer: String::new(),
        });
        let tx = self.background_tx.clone();

        tokio::spawn(async move {
            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(text) => {
                        Self::send_result(&tx, BackgroundResult::ResponseChunk(text)).await;
                    }
                    Err(e) => {
                        Self::send_result(&tx, BackgroundResult::ResponseFailed(e)).await;
                        return;
                    }
                }
            }
            Self::send_result(&tx, BackgroundResult::ResponseComplete).await;
        });
    }

    pub fn is_response_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The query being answered and the answer streamed so far
    pub fn in_flight_response(&self) -> Option<(&str, &str)> {
        self.in_flight
            .as_ref()
            .map(|q| (q.query.as_str(), q.answer.as_str()))
    }

    pub fn scroll_messages_up(&mut self, lines: u16) {
        self.message_scroll = self.message_scroll.saturating_sub(lines);
    }

    pub fn scroll_messages_down(&mut self, lines: u16) {
        self.message_scroll = self.message_scroll.saturating_add(lines);
    }

    pub fn select_next_quick_action(&mut self) {
        if !self.quick_actions.is_empty() {
            self.quick_action_selection =
                (self.quick_action_selection + 1) % self.quick_actions.len();
        }
    }

    pub fn select_prev_quick_action(&mut self) {
        if !self.quick_actions.is_empty() {
            let len = self.quick_actions.len();
            self.quick_action_selection = (self.quick_action_selection + len - 1) % len;
        }
    }

    pub fn push_query_char(&mut self, c: char) {
        let accepted = c == '\n' || !c.is_control();
        if accepted && self.query_input.chars().count() < MAX_QUERY_LENGTH {
            self.query_input.push(c);
        }
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Helper to send background results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if tx.send(result).await.is_err() {
            error!("Failed to send background result - channel closed");
        }
    }

    /// Apply finished background work and pending navigation requests
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.background_rx.try_recv() {
            self.process_background_result(result);
        }
        while let Ok(path) = self.nav_rx.try_recv() {
            self.navigate(&path);
        }
    }

    fn process_background_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Login {
                credentials,
                remember,
                result,
            } => self.finish_login(credentials, remember, result),
            BackgroundResult::ResponseChunk(text) => {
                if let Some(ref mut in_flight) = self.in_flight {
                    in_flight.answer.push_str(&text);
                }
            }
            BackgroundResult::ResponseFailed(e) => {
                warn!(error = %e, "Chat response failed");
                self.in_flight = None;
                self.status_message = Some(e.to_string());
            }
            BackgroundResult::ResponseComplete => {
                if let Some(done) = self.in_flight.take() {
                    self.messages.push(Message::query(done.query));
                    self.messages.push(Message::answer(done.answer));
                    self.query_input.clear();
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app(dir: &tempfile::TempDir) -> App {
        let config = Config {
            // Nothing listens here; logins fail fast with a network error
            api_base: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        };
        App::with_cache_dir(config, dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_login_focus_cycle() {
        let mut focus = LoginFocus::Email;
        for _ in 0..4 {
            focus = focus.next();
        }
        assert_eq!(focus, LoginFocus::Email);
        assert_eq!(LoginFocus::Email.prev(), LoginFocus::Button);
        assert_eq!(LoginFocus::Password.next(), LoginFocus::RememberMe);
    }

    #[test]
    fn test_chat_focus_cycle() {
        assert_eq!(ChatFocus::Input.next(), ChatFocus::NewChat);
        assert_eq!(ChatFocus::NewChat.prev(), ChatFocus::Input);
        assert_eq!(ChatFocus::Chats.next(), ChatFocus::QuickActions);
    }

    #[tokio::test]
    async fn test_unauthenticated_start_lands_on_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.init_session().await;
        assert_eq!(app.route, Route::Login);
        assert!(!app.is_authenticated());
    }

    #[tokio::test]
    async fn test_persisted_session_lands_on_chat() {
        let dir = tempfile::tempdir().unwrap();
        {
            let session = SessionContext::new(FileSessionStore::new(dir.path().to_path_buf()));
            let sign_in = copilot_core::auth::SignIn {
                auth: copilot_core::auth::SessionToken::basic(&Credentials::new("a@b.com", "pw")),
                user_state: UserState { email: "a@b.com".to_string() },
            };
            assert!(session.sign_in(sign_in).await);
        }

        let mut app = test_app(&dir);
        app.init_session().await;
        assert_eq!(app.route, Route::Chat);
        assert_eq!(app.user.as_ref().unwrap().email, "a@b.com");

        app.logout().await;
        assert_eq!(app.route, Route::Login);
        assert!(app.user.is_none());
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.navigate("/settings");
        assert_eq!(app.route, Route::NotFound("/settings".to_string()));
    }

    #[tokio::test]
    async fn test_submit_requires_both_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.login_email = "a@b.com".to_string();
        app.login_password.clear();
        app.submit_login();
        assert_eq!(
            app.login_error.as_deref(),
            Some("Email and password are required")
        );
        assert!(!app.login_pending());
    }

    #[tokio::test]
    async fn test_failed_login_shows_invalid_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.init_session().await;
        app.login_email = "a@b.com".to_string();
        app.login_password = "pw".to_string();

        app.submit_login();
        let result = app.background_rx.recv().await.unwrap();
        app.process_background_result(result);
        app.check_background_tasks();

        assert_eq!(app.login_error.as_deref(), Some("Invalid credentials"));
        assert_eq!(app.route, Route::Login);
        assert!(!app.login_pending());
        // Password stays in the form so the user can retry
        assert_eq!(app.login_password, "pw");
    }

    #[tokio::test]
    async fn test_login_without_remember_me_forgets_stored_passwords() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.config.remember_me = true;
        app.config.last_email = Some("old@b.com".to_string());

        let forget = app.update_remembered("a@b.com", false);

        assert!(!app.config.remember_me);
        assert_eq!(app.config.last_email, None);
        assert_eq!(forget, vec!["a@b.com".to_string(), "old@b.com".to_string()]);
    }

    #[tokio::test]
    async fn test_login_with_remember_me_keeps_email() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.config.last_email = Some("a@b.com".to_string());

        let forget = app.update_remembered("a@b.com", true);

        assert!(app.config.remember_me);
        assert_eq!(app.config.last_email.as_deref(), Some("a@b.com"));
        assert!(forget.is_empty());

        // Switching accounts drops the previous account's password
        let forget = app.update_remembered("c@d.com", true);
        assert_eq!(app.config.last_email.as_deref(), Some("c@d.com"));
        assert_eq!(forget, vec!["a@b.com".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_query_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.query_input = "   ".to_string();
        app.send_query();
        assert!(!app.is_response_pending());
    }

    #[tokio::test]
    async fn test_unimplemented_send_reports_status_and_keeps_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        let before = app.messages.len();
        app.query_input = "Привет".to_string();

        app.send_query();
        assert!(app.is_response_pending());
        let result = app.background_rx.recv().await.unwrap();
        app.process_background_result(result);

        assert!(!app.is_response_pending());
        assert_eq!(app.status_message.as_deref(), Some("Not available yet: send query"));
        assert_eq!(app.query_input, "Привет");
        assert_eq!(app.messages.len(), before);
    }

    #[tokio::test]
    async fn test_create_chat_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.create_chat().await;
        assert_eq!(app.status_message.as_deref(), Some("Not available yet: create chat"));
    }

    #[tokio::test]
    async fn test_quick_action_selection_wraps() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.select_prev_quick_action();
        assert_eq!(app.quick_action_selection, 2);
        app.select_next_quick_action();
        assert_eq!(app.quick_action_selection, 0);
    }

    #[tokio::test]
    async fn test_query_input_rejects_control_chars() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.push_query_char('a');
        app.push_query_char('\x07');
        app.push_query_char('\n');
        assert_eq!(app.query_input, "a\n");
    }
}
