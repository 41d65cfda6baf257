//! Non-interactive subcommands: `login`, `logout` and `status`.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use copilot_core::api::ApiClient;
use copilot_core::auth::{
    CredentialStore, Credentials, FileSessionStore, SessionContext, SessionEstablisher,
    SignInOutcome,
};
use copilot_core::config::Config;
use copilot_core::router::Navigator;

use crate::app::default_cache_dir;

fn session() -> SessionContext<FileSessionStore> {
    SessionContext::new(FileSessionStore::new(default_cache_dir()))
}

fn prompt_email(default: Option<&str>) -> Result<String> {
    let mut stdout = io::stdout();
    match default {
        Some(email) => write!(stdout, "Email [{}]: ", email)?,
        None => write!(stdout, "Email: ")?,
    }
    stdout.flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read email")?;
    let email = line.trim();

    Ok(match (email.is_empty(), default) {
        (true, Some(default)) => default.to_string(),
        _ => email.to_string(),
    })
}

/// Prompt for credentials and establish a session without the UI
pub async fn login(mut config: Config) -> Result<()> {
    let email = prompt_email(config.last_email.as_deref())?;
    let password = match std::env::var(copilot_core::config::ENV_PASSWORD) {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    let credentials = Credentials::new(email, password);
    if !credentials.is_complete() {
        anyhow::bail!("Email and password are required");
    }

    let api = ApiClient::new(&config)?;
    // Nothing to navigate to outside the UI
    let (navigator, _nav_rx) = Navigator::channel();
    let establisher = SessionEstablisher::new(Arc::new(api), session(), navigator);

    match establisher.submit(credentials).await? {
        SignInOutcome::Established(user) => {
            config.last_email = Some(user.email.clone());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            println!("Signed in as {}", user.email);
            Ok(())
        }
        SignInOutcome::Rejected(_) => anyhow::bail!("Could not save the session"),
    }
}

/// Restore the persisted session. A corrupt or unreadable session file
/// counts as no session.
async fn restore(session: &SessionContext<FileSessionStore>) -> Option<String> {
    if let Err(e) = session.init().await {
        warn!(error = %e, "Failed to restore session");
        return None;
    }
    session.user_state().await.map(|user| user.email)
}

/// Remove the persisted session, returning the email it belonged to
async fn clear_session(session: &SessionContext<FileSessionStore>) -> Result<Option<String>> {
    let email = restore(session).await;
    session.sign_out().await?;
    Ok(email)
}

/// Clear the persisted session and any remembered password
pub async fn logout(config: &Config) -> Result<()> {
    match clear_session(&session()).await? {
        Some(email) => {
            if config.remember_me {
                if let Err(e) = CredentialStore::delete(&email) {
                    debug!(error = %e, "No remembered password to delete");
                }
            }
            println!("Signed out {}", email);
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

/// Print the signed-in user
pub async fn status() -> Result<()> {
    match restore(&session()).await {
        Some(email) => println!("Signed in as {}", email),
        None => println!("Not signed in"),
    }
    Ok(())
}
