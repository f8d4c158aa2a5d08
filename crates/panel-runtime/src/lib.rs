//! Runtime layer for the Claude usage panel.
//!
//! Defines the backend boundary, the controller that owns all panel state,
//! the tokio actor loop that drives it, and a file-backed backend.

pub mod bridge;
pub mod controller;
pub mod local_backend;
pub mod orchestrator;
