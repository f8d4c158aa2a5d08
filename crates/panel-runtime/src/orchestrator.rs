//! Async panel orchestrator.
//!
//! Runs the [`PanelController`] inside a single tokio task. Timer ticks, UI
//! actions, backend events and request completions are all funnelled into
//! that task and applied one at a time. The latest [`PanelView`] is published
//! on a `watch` channel so the TUI can render without sharing mutable state.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use panel_core::view_mode::PanelGeometry;

use crate::bridge::{Backend, BackendEvent};
use crate::controller::{Command, Message, PanelController, PanelView};

/// Period of the countdown timer.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Startup grace period before a refresh is forced.
pub const BOOTSTRAP_GRACE: Duration = Duration::from_secs(2);

// ── PanelOrchestrator ─────────────────────────────────────────────────────────

/// Owns the backend and the timing configuration of the panel actor.
///
/// Call [`PanelOrchestrator::start`] to spawn the actor task.
pub struct PanelOrchestrator<B: Backend> {
    backend: Arc<B>,
    geometry: PanelGeometry,
    tick_interval: Duration,
    bootstrap_grace: Duration,
}

impl<B: Backend> PanelOrchestrator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            geometry: PanelGeometry::default(),
            tick_interval: TICK_INTERVAL,
            bootstrap_grace: BOOTSTRAP_GRACE,
        }
    }

    pub fn with_geometry(mut self, geometry: PanelGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_bootstrap_grace(mut self, grace: Duration) -> Self {
        self.bootstrap_grace = grace;
        self
    }

    /// Spawn the actor.
    ///
    /// `events` carries pushes from the backend. Returns a handle for sending
    /// UI messages and a `watch::Receiver` holding the latest [`PanelView`].
    pub fn start(
        self,
        events: mpsc::Receiver<BackendEvent>,
    ) -> (PanelHandle, watch::Receiver<PanelView>) {
        let (ui_tx, ui_rx) = mpsc::channel(32);
        let (view_tx, view_rx) = watch::channel(PanelView::default());

        let handle = tokio::spawn(async move {
            self.actor_loop(ui_rx, events, view_tx).await;
        });

        (
            PanelHandle {
                messages: ui_tx,
                handle,
            },
            view_rx,
        )
    }

    // ── Private implementation ────────────────────────────────────────────

    /// The actor loop. Exits when the UI side drops its sender or every view
    /// receiver is gone.
    async fn actor_loop(
        self,
        mut ui_rx: mpsc::Receiver<Message>,
        mut events: mpsc::Receiver<BackendEvent>,
        view_tx: watch::Sender<PanelView>,
    ) {
        let mut controller = PanelController::new(self.geometry);
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Message>();

        for command in controller.bootstrap() {
            self.dispatch(command, &done_tx);
        }
        view_tx.send_replace(controller.view());

        let mut ticker = time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; timers were just initialised.
        ticker.tick().await;

        let deadline = time::sleep(self.bootstrap_grace);
        tokio::pin!(deadline);
        let mut deadline_pending = true;
        let mut events_open = true;

        loop {
            let message = tokio::select! {
                _ = ticker.tick() => Message::Tick,
                _ = &mut deadline, if deadline_pending => {
                    deadline_pending = false;
                    Message::BootstrapDeadline
                }
                msg = ui_rx.recv() => match msg {
                    Some(msg) => msg,
                    None => {
                        debug!("ui channel closed; exiting panel loop");
                        break;
                    }
                },
                event = events.recv(), if events_open => match event {
                    Some(event) => {
                        debug!(event = event.name(), "backend event");
                        Message::from(event)
                    }
                    None => {
                        debug!("backend event channel closed");
                        events_open = false;
                        continue;
                    }
                },
                Some(reply) = done_rx.recv() => reply,
            };

            for command in controller.handle(message, Utc::now()) {
                self.dispatch(command, &done_tx);
            }

            let next = controller.view();
            view_tx.send_if_modified(|current| {
                if *current == next {
                    false
                } else {
                    *current = next;
                    true
                }
            });

            if view_tx.is_closed() {
                debug!("no view receivers left; exiting panel loop");
                break;
            }
        }
    }

    /// Run `command` on the blocking pool and feed its reply back to the loop.
    fn dispatch(&self, command: Command, done: &mpsc::UnboundedSender<Message>) {
        let backend = Arc::clone(&self.backend);
        let done = done.clone();
        tokio::task::spawn_blocking(move || {
            if let Some(reply) = execute(backend.as_ref(), command) {
                if done.send(reply).is_err() {
                    debug!("panel loop stopped before reply was delivered");
                }
            }
        });
    }
}

// ── PanelHandle ───────────────────────────────────────────────────────────────

/// A handle to the running panel actor.
///
/// Drop or call [`PanelHandle::abort`] to stop it.
pub struct PanelHandle {
    messages: mpsc::Sender<Message>,
    handle: tokio::task::JoinHandle<()>,
}

impl PanelHandle {
    /// A sender for UI messages, usable from synchronous code via `try_send`.
    pub fn sender(&self) -> mpsc::Sender<Message> {
        self.messages.clone()
    }

    /// Queue a message for the actor. Returns `false` when it is gone.
    pub async fn send(&self, message: Message) -> bool {
        self.messages.send(message).await.is_ok()
    }

    /// Immediately abort the actor task.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Perform one backend command, mapping the outcome to a reply message.
fn execute<B: Backend + ?Sized>(backend: &B, command: Command) -> Option<Message> {
    match command {
        Command::LoadCachedState => {
            let usage = backend.get_usage().unwrap_or_else(|e| {
                debug!(error = %e, "no cached usage");
                None
            });
            let last_error = backend.get_last_error().unwrap_or_else(|e| {
                debug!(error = %e, "no cached error");
                None
            });
            Some(Message::CachedStateLoaded { usage, last_error })
        }
        Command::Refresh => match backend.refresh_usage() {
            Ok(()) => None,
            Err(e) => Some(Message::RefreshFailed(e.to_string())),
        },
        Command::CheckSelectedProfile => match backend.get_selected_profile() {
            Ok(selected) => Some(Message::SelectedProfileChecked(selected)),
            Err(e) => {
                warn!(error = %e, "could not read selected profile");
                None
            }
        },
        Command::LoadProfiles => match backend.get_chrome_profiles() {
            Ok(profiles) => {
                let selected = backend.get_selected_profile().unwrap_or_else(|e| {
                    warn!(error = %e, "could not read selected profile");
                    None
                });
                Some(Message::ProfilesLoaded { profiles, selected })
            }
            Err(e) => Some(Message::ProfilesFailed(e.to_string())),
        },
        Command::SelectProfile(profile_id) => {
            if let Err(e) = backend.set_selected_profile(&profile_id) {
                warn!(error = %e, %profile_id, "could not save selected profile");
            }
            None
        }
        Command::SetWindowHeight(height) => {
            if let Err(e) = backend.set_window_height(height) {
                warn!(error = %e, height, "could not resize panel");
            }
            None
        }
        Command::OpenUrl(url) => {
            if let Err(e) = backend.open_url(&url) {
                warn!(error = %e, %url, "could not open url");
            }
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
