//! Which panel body is visible and how tall the panel should be.
//!
//! Two independent axes:
//!
//! | axis     | states                        | driven by                  |
//! |----------|-------------------------------|----------------------------|
//! | content  | `Loading`, `Usage`, `Error`   | inbound data / bootstrap   |
//! | overlay  | `Main`, `ProfileSelect`       | profile button, first run  |
//!
//! While the overlay is `ProfileSelect` no content region is visible.

use tracing::debug;

/// Panel body selected by inbound data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentMode {
    /// Nothing received yet.
    #[default]
    Loading,
    /// Usage bars are shown.
    Usage,
    /// An error message replaces the usage bars.
    Error(String),
}

/// Main view or the profile list on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    Main,
    ProfileSelect,
}

/// The single region currently visible in the panel body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleRegion {
    Loading,
    Usage,
    Error,
    Profiles,
}

/// Panel sizes in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelGeometry {
    /// Fixed height of the main view.
    pub compact_height: u32,
    /// Height of the profile list's title area.
    pub profile_header_height: u32,
    /// Height of one profile row.
    pub profile_item_height: u32,
}

impl PanelGeometry {
    pub const COMPACT_HEIGHT: u32 = 109;
    pub const PROFILE_HEADER_HEIGHT: u32 = 45;
    pub const PROFILE_ITEM_HEIGHT: u32 = 40;

    /// Height of the profile list for `profile_count` rows.
    pub fn expanded_height(&self, profile_count: usize) -> u32 {
        let count = u32::try_from(profile_count).unwrap_or(u32::MAX);
        self.profile_header_height
            .saturating_add(count.saturating_mul(self.profile_item_height))
    }
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self {
            compact_height: Self::COMPACT_HEIGHT,
            profile_header_height: Self::PROFILE_HEADER_HEIGHT,
            profile_item_height: Self::PROFILE_ITEM_HEIGHT,
        }
    }
}

/// Combined content × overlay state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    content: ContentMode,
    overlay: Overlay,
    profile_count: usize,
    geometry: PanelGeometry,
}

impl ViewState {
    pub fn new(geometry: PanelGeometry) -> Self {
        Self {
            geometry,
            ..Self::default()
        }
    }

    pub fn content(&self) -> &ContentMode {
        &self.content
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn is_loading(&self) -> bool {
        self.content == ContentMode::Loading
    }

    pub fn is_profile_select(&self) -> bool {
        self.overlay == Overlay::ProfileSelect
    }

    /// A snapshot arrived: show usage and drop any error.
    pub fn show_usage(&mut self) {
        if self.content != ContentMode::Usage {
            debug!(from = ?self.content, "content -> usage");
        }
        self.content = ContentMode::Usage;
    }

    /// An error arrived: hide loading/usage and show `message`.
    pub fn show_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(from = ?self.content, %message, "content -> error");
        self.content = ContentMode::Error(message);
    }

    /// Enter the profile list; returns the panel height to request.
    pub fn open_profiles(&mut self, profile_count: usize) -> u32 {
        self.overlay = Overlay::ProfileSelect;
        self.profile_count = profile_count;
        debug!(profile_count, "overlay -> profile select");
        self.target_height()
    }

    /// Return to the main view; returns the panel height to request.
    pub fn close_profiles(&mut self) -> u32 {
        self.overlay = Overlay::Main;
        self.profile_count = 0;
        debug!("overlay -> main");
        self.target_height()
    }

    /// Panel height implied by the current state.
    pub fn target_height(&self) -> u32 {
        match self.overlay {
            Overlay::ProfileSelect => self.geometry.expanded_height(self.profile_count),
            Overlay::Main => self.geometry.compact_height,
        }
    }

    pub fn visible_region(&self) -> VisibleRegion {
        match (self.overlay, &self.content) {
            (Overlay::ProfileSelect, _) => VisibleRegion::Profiles,
            (Overlay::Main, ContentMode::Loading) => VisibleRegion::Loading,
            (Overlay::Main, ContentMode::Usage) => VisibleRegion::Usage,
            (Overlay::Main, ContentMode::Error(_)) => VisibleRegion::Error,
        }
    }
}
