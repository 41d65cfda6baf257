//! Authentication module for establishing and keeping user sessions.
//!
//! This module provides:
//! - `Credentials`: what the login form collects
//! - `SessionEstablisher`: the login flow (one request, token, navigation)
//! - `SessionContext`: the active session with restore and logout
//! - `CredentialStore`: remembered passwords via the OS keyring

pub mod credentials;
pub mod establisher;
pub mod session;

pub use credentials::{
    can_add_email_char, can_add_password_char, CredentialStore, Credentials,
};
pub use establisher::{
    AuthBackend, AuthenticationFailure, LoginPhase, SessionEstablisher, SignInOutcome,
};
pub use session::{
    AuthScheme, FileSessionStore, MemorySessionStore, SessionContext, SessionData,
    SessionStore, SessionToken, SignIn,
};
