//! Core types and pure logic for the Claude usage panel.
//!
//! Holds the usage data model, error types, countdown/progress metrics, the
//! usage render model, the view-mode state machine, the profile list, and
//! CLI settings. Nothing here performs I/O beyond settings persistence.

pub mod error;
pub mod formatting;
pub mod models;
pub mod profiles;
pub mod render_model;
pub mod settings;
pub mod time_utils;
pub mod view_mode;
