//! The panel actor's state machine.
//!
//! [`PanelController`] owns the usage render model, the view state and the
//! open profile list. It consumes one [`Message`] at a time and answers with
//! the [`Command`]s the runtime should carry out against the backend. It
//! never performs I/O itself, which keeps every transition testable with a
//! fixed clock.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use panel_core::models::{Profile, UsageSnapshot, WindowKind};
use panel_core::profiles::{is_unselected, ProfileRow, ProfileSelector};
use panel_core::render_model::{ResetTimes, UsageRenderModel, WindowDisplay};
use panel_core::view_mode::{ContentMode, PanelGeometry, ViewState, VisibleRegion};

use crate::bridge::BackendEvent;

/// Opened by the home button.
pub const HOME_URL: &str = "https://claude.ai/";
/// Opened by the settings button.
pub const USAGE_SETTINGS_URL: &str = "https://claude.ai/settings/usage";

/// Something the user did in the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Profile button: open the list, or close it when open.
    ToggleProfiles,
    /// A profile row was chosen.
    SelectProfile(String),
    /// Dismiss the profile list without choosing.
    CloseProfiles,
    OpenHome,
    OpenUsageSettings,
    /// Ask the backend to refresh now.
    Refresh,
}

/// Everything the actor reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Once-per-second timer.
    Tick,
    /// The panel window gained focus.
    Focus,
    /// The panel became visible again.
    VisibilityRegained,
    UsageUpdated(UsageSnapshot),
    UsageError(String),
    UserClick(UserAction),
    /// The startup grace period elapsed.
    BootstrapDeadline,
    /// Reply to [`Command::LoadCachedState`]. Failed reads arrive as `None`.
    CachedStateLoaded {
        usage: Option<UsageSnapshot>,
        last_error: Option<String>,
    },
    /// [`Command::Refresh`] failed with this message.
    RefreshFailed(String),
    /// Reply to [`Command::CheckSelectedProfile`].
    SelectedProfileChecked(Option<String>),
    /// Reply to [`Command::LoadProfiles`].
    ProfilesLoaded {
        profiles: Vec<Profile>,
        selected: Option<String>,
    },
    /// [`Command::LoadProfiles`] failed with this message.
    ProfilesFailed(String),
}

impl From<BackendEvent> for Message {
    fn from(event: BackendEvent) -> Self {
        match event {
            BackendEvent::UsageUpdated(snapshot) => Message::UsageUpdated(snapshot),
            BackendEvent::UsageError(message) => Message::UsageError(message),
        }
    }
}

/// Work the runtime performs on the controller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `get_usage` then `get_last_error`; failures are swallowed.
    LoadCachedState,
    /// `refresh_usage`; a failure comes back as [`Message::RefreshFailed`].
    Refresh,
    /// `get_selected_profile`.
    CheckSelectedProfile,
    /// `get_chrome_profiles` + `get_selected_profile`.
    LoadProfiles,
    /// `set_selected_profile`, fire-and-forget.
    SelectProfile(String),
    /// `set_window_height`, fire-and-forget.
    SetWindowHeight(u32),
    /// `open_url`, fire-and-forget.
    OpenUrl(String),
}

/// Render-ready copy of the controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub region: VisibleRegion,
    pub content: ContentMode,
    pub five_hour: WindowDisplay,
    pub seven_day: WindowDisplay,
    pub profiles: Vec<ProfileRow>,
    /// Row of the currently selected profile, when the list shows it.
    pub selected_row: Option<usize>,
    pub target_height: u32,
}

impl PanelView {
    pub fn window(&self, kind: WindowKind) -> &WindowDisplay {
        match kind {
            WindowKind::FiveHour => &self.five_hour,
            WindowKind::SevenDay => &self.seven_day,
        }
    }

    /// Message shown in the error region, when that is the content mode.
    pub fn error_message(&self) -> Option<&str> {
        match &self.content {
            ContentMode::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl Default for PanelView {
    fn default() -> Self {
        PanelController::new(PanelGeometry::default()).view()
    }
}

/// Single owner of all panel state.
#[derive(Debug, Clone)]
pub struct PanelController {
    render: UsageRenderModel,
    view: ViewState,
    selector: Option<ProfileSelector>,
    profiles_pending: bool,
}

impl PanelController {
    pub fn new(geometry: PanelGeometry) -> Self {
        Self {
            render: UsageRenderModel::new(),
            view: ViewState::new(geometry),
            selector: None,
            profiles_pending: false,
        }
    }

    /// Startup requests: cached state and the first-run profile check.
    pub fn bootstrap(&mut self) -> Vec<Command> {
        debug!("bootstrapping panel");
        vec![Command::LoadCachedState, Command::CheckSelectedProfile]
    }

    /// Apply one message and return the commands it triggers.
    pub fn handle(&mut self, message: Message, now: DateTime<Utc>) -> Vec<Command> {
        match message {
            Message::Tick | Message::Focus | Message::VisibilityRegained => {
                self.render.refresh_timers(now);
                Vec::new()
            }

            Message::UsageUpdated(snapshot) => {
                self.render.ingest(&snapshot, now);
                self.view.show_usage();
                Vec::new()
            }

            Message::UsageError(message) | Message::RefreshFailed(message) => {
                self.view.show_error(message);
                Vec::new()
            }

            Message::BootstrapDeadline => {
                if self.view.is_loading() {
                    debug!("still loading after grace period; requesting refresh");
                    vec![Command::Refresh]
                } else {
                    Vec::new()
                }
            }

            Message::CachedStateLoaded { usage, last_error } => {
                if !self.view.is_loading() {
                    debug!("cached state superseded by newer data; ignoring");
                    return Vec::new();
                }
                if let Some(snapshot) = usage {
                    self.render.ingest(&snapshot, now);
                    self.view.show_usage();
                }
                if let Some(message) = last_error.filter(|m| !m.is_empty()) {
                    self.view.show_error(message);
                }
                Vec::new()
            }

            Message::SelectedProfileChecked(selected) => {
                if is_unselected(selected.as_deref()) {
                    debug!("no profile selected yet; opening profile list");
                    self.open_profiles()
                } else {
                    Vec::new()
                }
            }

            Message::ProfilesLoaded { profiles, selected } => {
                self.profiles_pending = false;
                let selector = ProfileSelector::build(profiles, selected.as_deref());
                let height = self.view.open_profiles(selector.len());
                self.selector = Some(selector);
                vec![Command::SetWindowHeight(height)]
            }

            Message::ProfilesFailed(message) => {
                self.profiles_pending = false;
                warn!(error = %message, "could not load profiles");
                Vec::new()
            }

            Message::UserClick(action) => self.handle_action(action),
        }
    }

    fn handle_action(&mut self, action: UserAction) -> Vec<Command> {
        match action {
            UserAction::ToggleProfiles => {
                if self.view.is_profile_select() {
                    self.close_profiles()
                } else {
                    self.open_profiles()
                }
            }
            UserAction::CloseProfiles => {
                if self.view.is_profile_select() {
                    self.close_profiles()
                } else {
                    Vec::new()
                }
            }
            UserAction::SelectProfile(profile_id) => {
                if !self.view.is_profile_select() {
                    return Vec::new();
                }
                debug!(%profile_id, "profile selected");
                let mut commands = vec![Command::SelectProfile(profile_id)];
                commands.extend(self.close_profiles());
                commands
            }
            UserAction::OpenHome => vec![Command::OpenUrl(HOME_URL.to_string())],
            UserAction::OpenUsageSettings => {
                vec![Command::OpenUrl(USAGE_SETTINGS_URL.to_string())]
            }
            UserAction::Refresh => vec![Command::Refresh],
        }
    }

    fn open_profiles(&mut self) -> Vec<Command> {
        if self.profiles_pending || self.view.is_profile_select() {
            return Vec::new();
        }
        self.profiles_pending = true;
        vec![Command::LoadProfiles]
    }

    fn close_profiles(&mut self) -> Vec<Command> {
        self.selector = None;
        let height = self.view.close_profiles();
        vec![Command::SetWindowHeight(height)]
    }

    pub fn view(&self) -> PanelView {
        PanelView {
            region: self.view.visible_region(),
            content: self.view.content().clone(),
            five_hour: self.render.window(WindowKind::FiveHour).clone(),
            seven_day: self.render.window(WindowKind::SevenDay).clone(),
            profiles: self
                .selector
                .as_ref()
                .map(|s| s.rows().to_vec())
                .unwrap_or_default(),
            selected_row: self.selector.as_ref().and_then(ProfileSelector::selected_index),
            target_height: self.view.target_height(),
        }
    }

    pub fn reset_times(&self) -> ResetTimes {
        self.render.reset_times()
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }
}
