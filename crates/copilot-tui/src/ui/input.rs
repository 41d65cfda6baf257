//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use copilot_core::auth::{can_add_email_char, can_add_password_char};
use copilot_core::router::{Route, CHAT_PATH};

use crate::app::{App, AppState, ChatFocus, LoginFocus};

/// Lines moved by PageUp/PageDown in the message list
const PAGE_SCROLL_SIZE: u16 = 10;

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if key.code == KeyCode::F(1) {
        app.state = AppState::ShowingHelp;
        return Ok(false);
    }

    match app.route {
        Route::Login => handle_login_input(app, key),
        Route::Chat => handle_chat_input(app, key).await,
        Route::NotFound(_) => handle_not_found_input(app, key),
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password => app.login_focus = LoginFocus::RememberMe,
            LoginFocus::RememberMe => app.remember_me = !app.remember_me,
            LoginFocus::Button => app.submit_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::RememberMe | LoginFocus::Button => {}
        },
        KeyCode::Char(' ') if app.login_focus == LoginFocus::RememberMe => {
            app.remember_me = !app.remember_me;
        }
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::RememberMe | LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

async fn handle_chat_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('l') {
            app.logout().await;
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Tab => {
            app.chat_focus = app.chat_focus.next();
        }
        KeyCode::BackTab => {
            app.chat_focus = app.chat_focus.prev();
        }
        KeyCode::PageUp => app.scroll_messages_up(PAGE_SCROLL_SIZE),
        KeyCode::PageDown => app.scroll_messages_down(PAGE_SCROLL_SIZE),
        _ => match app.chat_focus {
            ChatFocus::NewChat => {
                if key.code == KeyCode::Enter {
                    app.create_chat().await;
                }
            }
            ChatFocus::Chats => match key.code {
                KeyCode::Up => app.chats.prev(),
                KeyCode::Down => app.chats.next(),
                _ => {}
            },
            ChatFocus::QuickActions => match key.code {
                KeyCode::Left => app.select_prev_quick_action(),
                KeyCode::Right => app.select_next_quick_action(),
                KeyCode::Enter => app.run_quick_action(),
                _ => {}
            },
            ChatFocus::Input => handle_query_input(app, key),
        },
    }
    Ok(false)
}

fn handle_query_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            app.push_query_char('\n');
        }
        KeyCode::Enter => app.send_query(),
        KeyCode::Backspace => {
            app.query_input.pop();
        }
        KeyCode::Up => app.scroll_messages_up(1),
        KeyCode::Down => app.scroll_messages_down(1),
        KeyCode::Char(c) => app.push_query_char(c),
        _ => {}
    }
}

fn handle_not_found_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => app.navigate(CHAT_PATH),
        KeyCode::Esc => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::config::Config;

    fn test_app(dir: &tempfile::TempDir) -> App {
        let config = Config {
            api_base: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        };
        App::with_cache_dir(config, dir.path().to_path_buf()).unwrap()
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            handle_input(app, press(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_login_typing_and_focus() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.route = Route::Login;
        app.login_focus = LoginFocus::Email;

        type_str(&mut app, "a @b.com").await;
        assert_eq!(app.login_email, "a@b.com");

        handle_input(&mut app, press(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.login_focus, LoginFocus::Password);
        type_str(&mut app, "p w").await;
        assert_eq!(app.login_password, "p w");

        handle_input(&mut app, press(KeyCode::Backspace)).await.unwrap();
        assert_eq!(app.login_password, "p ");
    }

    #[tokio::test]
    async fn test_remember_me_toggles() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.route = Route::Login;
        app.login_focus = LoginFocus::RememberMe;
        let before = app.remember_me;

        handle_input(&mut app, press(KeyCode::Char(' '))).await.unwrap();
        assert_eq!(app.remember_me, !before);
        handle_input(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.remember_me, before);
    }

    #[tokio::test]
    async fn test_esc_on_login_quits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.route = Route::Login;
        assert!(handle_input(&mut app, press(KeyCode::Esc)).await.unwrap());
    }

    #[tokio::test]
    async fn test_chat_quit_needs_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.route = Route::Chat;

        assert!(!handle_input(&mut app, press(KeyCode::Esc)).await.unwrap());
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!handle_input(&mut app, press(KeyCode::Char('n'))).await.unwrap());
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, press(KeyCode::Esc)).await.unwrap();
        assert!(handle_input(&mut app, press(KeyCode::Char('y'))).await.unwrap());
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_help_overlay_swallows_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.route = Route::Chat;
        app.chat_focus = ChatFocus::Input;

        handle_input(&mut app, press(KeyCode::F(1))).await.unwrap();
        assert_eq!(app.state, AppState::ShowingHelp);
        handle_input(&mut app, press(KeyCode::Char('x'))).await.unwrap();
        assert!(app.query_input.is_empty());
        handle_input(&mut app, press(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_query_editing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.route = Route::Chat;
        app.chat_focus = ChatFocus::Input;

        type_str(&mut app, "ab").await;
        handle_input(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT))
            .await
            .unwrap();
        type_str(&mut app, "c").await;
        assert_eq!(app.query_input, "ab\nc");
        assert!(!app.is_response_pending());
    }

    #[tokio::test]
    async fn test_chat_selection_and_focus() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.route = Route::Chat;
        app.chat_focus = ChatFocus::NewChat;

        handle_input(&mut app, press(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.chat_focus, ChatFocus::Chats);
        handle_input(&mut app, press(KeyCode::Down)).await.unwrap();
        assert_eq!(app.chats.active_index(), 1);

        handle_input(&mut app, press(KeyCode::Tab)).await.unwrap();
        handle_input(&mut app, press(KeyCode::Right)).await.unwrap();
        assert_eq!(app.quick_action_selection, 1);
    }

    #[tokio::test]
    async fn test_not_found_enter_goes_home() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(&dir);
        app.navigate("/missing");
        assert!(matches!(app.route, Route::NotFound(_)));

        handle_input(&mut app, press(KeyCode::Enter)).await.unwrap();
        // Not signed in, so home redirects to login
        assert_eq!(app.route, Route::Login);
    }
}
