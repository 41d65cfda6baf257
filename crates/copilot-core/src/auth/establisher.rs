//! Login flow: credentials in, session and navigation out.
//!
//! One submission issues exactly one request to the authentication backend.
//! On success the session context receives a `Basic` token built from the
//! submitted credentials and the app is sent to the chat. Every failure
//! collapses into [`AuthenticationFailure`]; the underlying cause is logged.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use super::{Credentials, SessionContext, SessionStore, SessionToken, SignIn};
use crate::api::ApiError;
use crate::models::UserInfo;
use crate::router::{Navigator, CHAT_PATH};

/// Anything that can check credentials against the authentication endpoint.
#[async_trait]
pub trait AuthBackend: Send + Sync + 'static {
    async fn login(&self, credentials: &Credentials) -> Result<UserInfo, ApiError>;
}

/// The only error a login submission reports.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid credentials")]
pub struct AuthenticationFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPhase {
    Idle,
    Pending,
    Authenticated,
    /// Same as `Idle` for resubmission purposes
    Failed,
}

impl LoginPhase {
    pub fn is_pending(self) -> bool {
        self == LoginPhase::Pending
    }
}

/// Result of a submission the backend accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum SignInOutcome {
    /// Session active, navigation to the chat requested
    Established(UserInfo),
    /// Backend accepted the credentials but the session store did not;
    /// no navigation happened
    Rejected(UserInfo),
}

pub struct SessionEstablisher<B, S> {
    backend: Arc<B>,
    session: SessionContext<S>,
    navigator: Navigator,
    phase: Arc<watch::Sender<LoginPhase>>,
}

impl<B, S> Clone for SessionEstablisher<B, S> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            session: self.session.clone(),
            navigator: self.navigator.clone(),
            phase: Arc::clone(&self.phase),
        }
    }
}

impl<B: AuthBackend, S: SessionStore> SessionEstablisher<B, S> {
    pub fn new(backend: Arc<B>, session: SessionContext<S>, navigator: Navigator) -> Self {
        let (phase, _) = watch::channel(LoginPhase::Idle);
        Self {
            backend,
            session,
            navigator,
            phase: Arc::new(phase),
        }
    }

    pub fn phase(&self) -> LoginPhase {
        *self.phase.borrow()
    }

    /// True strictly while a login request is in flight
    pub fn is_pending(&self) -> bool {
        self.phase().is_pending()
    }

    /// Watch phase transitions
    pub fn subscribe(&self) -> watch::Receiver<LoginPhase> {
        self.phase.subscribe()
    }

    pub fn session(&self) -> &SessionContext<S> {
        &self.session
    }

    /// Log out: clear the session and return to `Idle`
    pub async fn sign_out(&self) -> anyhow::Result<()> {
        self.session.sign_out().await?;
        self.phase.send_replace(LoginPhase::Idle);
        Ok(())
    }

    /// Submit credentials.
    ///
    /// Callers are expected to have checked `Credentials::is_complete`. There
    /// is no guard against overlapping submissions and no retry.
    pub async fn submit(
        &self,
        credentials: Credentials,
    ) -> Result<SignInOutcome, AuthenticationFailure> {
        self.phase.send_replace(LoginPhase::Pending);

        let user = match self.backend.login(&credentials).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, email = %credentials.email, "Login failed");
                self.phase.send_replace(LoginPhase::Failed);
                return Err(AuthenticationFailure);
            }
        };

        let accepted = self
            .session
            .sign_in(SignIn {
                auth: SessionToken::basic(&credentials),
                user_state: user.user_state(),
            })
            .await;

        if accepted {
            self.phase.send_replace(LoginPhase::Authenticated);
            info!(email = %user.email, "Login successful");
            self.navigator.navigate(CHAT_PATH);
            Ok(SignInOutcome::Established(user))
        } else {
            self.phase.send_replace(LoginPhase::Idle);
            Ok(SignInOutcome::Rejected(user))
        }
    }
}
