//! Core library for Alfa Copilot.
//!
//! - `api`: HTTP client for the authentication endpoint
//! - `auth`: credentials, the login flow and the session context
//! - `chat`: chat list, mock data and the chat capability trait
//! - `config`: configuration file and environment overrides
//! - `models`: shared data types
//! - `router`: route table and navigation requests

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod models;
pub mod router;
