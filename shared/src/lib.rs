//! Shared types and models for the Agri Assistant client
//!
//! This crate contains the client-owned logic bound to by the web UI (via
//! WASM): the shopping cart, the NPK questionnaire, checkout preparation, and
//! the shapes of backend payloads.

pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod types;
pub mod validation;

pub use crate::config::*;
pub use error::*;
pub use models::*;
pub use storage::*;
pub use types::*;
pub use validation::*;
