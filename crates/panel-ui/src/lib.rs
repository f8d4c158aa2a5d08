//! Terminal UI layer for the Claude usage panel.
//!
//! Provides themes, the usage/timer meters, header and profile list
//! components, the panel view, and the main application event loop built on
//! top of [`ratatui`].

pub mod app;
pub mod components;
pub mod panel_view;
pub mod themes;
