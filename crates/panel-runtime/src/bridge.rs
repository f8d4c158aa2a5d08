//! Boundary between the panel and the backend process.
//!
//! Inbound traffic is a [`BackendEvent`] pushed on an `mpsc` channel.
//! Outbound traffic is one [`Backend`] method per request; each call either
//! returns a value or fails with a [`PanelError`](panel_core::error::PanelError).

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use panel_core::error::Result;
use panel_core::models::{Profile, UsageSnapshot};

/// Event name of a pushed usage snapshot.
pub const USAGE_UPDATED: &str = "usage-updated";
/// Event name of a pushed usage error.
pub const USAGE_ERROR: &str = "usage-error";

/// Events pushed from the backend to the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    UsageUpdated(UsageSnapshot),
    UsageError(String),
}

impl BackendEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            BackendEvent::UsageUpdated(_) => USAGE_UPDATED,
            BackendEvent::UsageError(_) => USAGE_ERROR,
        }
    }
}

/// Outbound requests, as issued by the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    GetUsage,
    GetLastError,
    RefreshUsage,
    GetChromeProfiles,
    GetSelectedProfile,
    SetSelectedProfile { profile_id: String },
    SetWindowHeight { height: u32 },
    OpenUrl { url: String },
}

impl Request {
    /// Wire name of the request.
    pub fn name(&self) -> &'static str {
        match self {
            Request::GetUsage => "get_usage",
            Request::GetLastError => "get_last_error",
            Request::RefreshUsage => "refresh_usage",
            Request::GetChromeProfiles => "get_chrome_profiles",
            Request::GetSelectedProfile => "get_selected_profile",
            Request::SetSelectedProfile { .. } => "set_selected_profile",
            Request::SetWindowHeight { .. } => "set_window_height",
            Request::OpenUrl { .. } => "open_url",
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Request/response surface of the backend.
///
/// Calls may block on I/O; the runtime runs them off the actor task.
pub trait Backend: Send + Sync + 'static {
    /// Cached snapshot, if the backend has one.
    fn get_usage(&self) -> Result<Option<UsageSnapshot>>;
    /// Cached error message, if the last refresh failed.
    fn get_last_error(&self) -> Result<Option<String>>;
    /// Refresh now. Results are also pushed as [`BackendEvent`]s.
    fn refresh_usage(&self) -> Result<()>;
    /// Browser profiles available for selection, in display order.
    fn get_chrome_profiles(&self) -> Result<Vec<Profile>>;
    /// Persisted profile id, if one was chosen.
    fn get_selected_profile(&self) -> Result<Option<String>>;
    fn set_selected_profile(&self, profile_id: &str) -> Result<()>;
    /// Resize the host panel to `height` logical pixels.
    fn set_window_height(&self, height: u32) -> Result<()>;
    /// Open `url` in the system browser.
    fn open_url(&self, url: &str) -> Result<()>;
}

/// Shared handle to the panel height most recently requested of the host.
#[derive(Debug, Clone)]
pub struct PanelHeight(Arc<AtomicU32>);

impl PanelHeight {
    pub fn new(initial: u32) -> Self {
        Self(Arc::new(AtomicU32::new(initial)))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, height: u32) {
        self.0.store(height, Ordering::Relaxed);
    }
}
