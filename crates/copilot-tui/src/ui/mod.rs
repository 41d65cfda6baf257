//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Frame layout, status bar and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `screens`: One renderer per route (login, chat, not found)

pub mod input;
pub mod render;
pub mod screens;
pub mod styles;
