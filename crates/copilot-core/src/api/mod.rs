//! REST API client module for the Alfa Copilot backend.
//!
//! This module provides the `ApiClient`, which implements the
//! authentication backend used by the login flow.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
