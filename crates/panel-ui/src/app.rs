//! Main application state and TUI event loop for the usage panel.
//!
//! [`App`] owns the theme and the profile-list cursor. It renders the latest
//! [`PanelView`] published by the runtime and translates terminal input into
//! controller [`Message`]s.

use std::io;
use std::time::Duration;

use crossterm::{
    cursor::Show,
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Frame, Terminal};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use panel_core::view_mode::VisibleRegion;
use panel_runtime::bridge::PanelHeight;
use panel_runtime::controller::{Message, PanelView, UserAction};

use crate::panel_view::{self, panel_area, profile_row_at};
use crate::themes::Theme;

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the panel TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    /// Keyboard cursor in the profile list.
    cursor: usize,
    /// Region drawn on the previous frame.
    last_region: VisibleRegion,
    /// Messages for the panel controller.
    messages: mpsc::Sender<Message>,
    /// Panel height in logical pixels, as last requested by the controller.
    height: PanelHeight,
}

impl App {
    pub fn new(theme_name: &str, messages: mpsc::Sender<Message>, height: PanelHeight) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            should_quit: false,
            cursor: 0,
            last_region: VisibleRegion::Loading,
            messages,
            height,
        }
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Run the panel TUI, rendering views received on `views`.
    ///
    /// Uses `crossterm::event::poll` (synchronous, with a 250 ms timeout) so
    /// that the terminal event loop stays on the current thread while view
    /// updates arrive on the `watch` channel.
    ///
    /// The loop exits on `q`, `Q`, `Ctrl+C`, or when the runtime stops. The
    /// terminal is restored on every exit path, including I/O errors.
    pub async fn run(mut self, mut views: watch::Receiver<PanelView>) -> io::Result<()> {
        enable_raw_mode()?;
        let mut terminal = match enter_terminal() {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = restore_terminal();
                return Err(e);
            }
        };

        let tick_rate = Duration::from_millis(250);
        let result = self.pump(
            &mut views,
            |app, view| {
                let mut panel = Rect::default();
                terminal.draw(|frame| panel = app.render(frame, view))?;
                Ok(panel)
            },
            || {
                if event::poll(tick_rate)? {
                    event::read().map(Some)
                } else {
                    Ok(None)
                }
            },
        );

        let restored = restore_terminal();
        result.and(restored)
    }

    /// Draw, read one input event and dispatch it, until quit or the runtime
    /// stops. Returns the first draw or input error.
    fn pump<D, E>(
        &mut self,
        views: &mut watch::Receiver<PanelView>,
        mut draw: D,
        mut next_event: E,
    ) -> io::Result<()>
    where
        D: FnMut(&Self, &PanelView) -> io::Result<Rect>,
        E: FnMut() -> io::Result<Option<Event>>,
    {
        loop {
            if views.has_changed().is_err() {
                debug!("panel runtime stopped; leaving TUI");
                return Ok(());
            }
            let view = views.borrow_and_update().clone();
            self.sync_cursor(&view);

            let panel = draw(self, &view)?;

            if let Some(ev) = next_event()? {
                if let Some(message) = self.handle_event(ev, &view, panel) {
                    self.send(message);
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    // ── Input mapping ─────────────────────────────────────────────────────────

    /// Translate one terminal event into a controller message.
    ///
    /// `panel` is the area the panel was last drawn in, for mouse hit-testing.
    pub fn handle_event(&mut self, ev: Event, view: &PanelView, panel: Rect) -> Option<Message> {
        match ev {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key, view),
            Event::Mouse(mouse) => self.handle_mouse(mouse, view, panel),
            Event::FocusGained => Some(Message::Focus),
            Event::Resize(..) => Some(Message::VisibilityRegained),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, view: &PanelView) -> Option<Message> {
        let profiles_open = view.region == VisibleRegion::Profiles;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('p') => Some(Message::UserClick(UserAction::ToggleProfiles)),
            KeyCode::Char('h') => Some(Message::UserClick(UserAction::OpenHome)),
            KeyCode::Char('s') => Some(Message::UserClick(UserAction::OpenUsageSettings)),
            KeyCode::Char('r') => Some(Message::UserClick(UserAction::Refresh)),
            KeyCode::Esc if profiles_open => Some(Message::UserClick(UserAction::CloseProfiles)),
            KeyCode::Up | KeyCode::Char('k') if profiles_open => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') if profiles_open => {
                if self.cursor + 1 < view.profiles.len() {
                    self.cursor += 1;
                }
                None
            }
            KeyCode::Enter if profiles_open => self.select(view, self.cursor),
            _ => None,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, view: &PanelView, panel: Rect) -> Option<Message> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        let index = profile_row_at(panel, view, mouse.column, mouse.row)?;
        self.cursor = index;
        self.select(view, index)
    }

    fn select(&self, view: &PanelView, index: usize) -> Option<Message> {
        view.profiles.get(index).map(|row| {
            Message::UserClick(UserAction::SelectProfile(row.profile.id.clone()))
        })
    }

    /// Reset the cursor to the selected row whenever the list opens.
    fn sync_cursor(&mut self, view: &PanelView) {
        if view.region == VisibleRegion::Profiles && self.last_region != VisibleRegion::Profiles {
            self.cursor = view.selected_row.unwrap_or(0);
        }
        self.last_region = view.region;
    }

    fn send(&mut self, message: Message) {
        match self.messages.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(message)) => {
                warn!(?message, "panel runtime busy; dropping input");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.should_quit = true;
            }
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// Draw the panel and return the area it occupies.
    fn render(&self, frame: &mut Frame, view: &PanelView) -> Rect {
        let area = panel_area(frame.area(), self.height.get());
        let cursor = (view.region == VisibleRegion::Profiles).then_some(self.cursor);
        panel_view::render_panel(frame, area, view, cursor, &self.theme);
        area
    }
}

fn enter_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Leave raw mode and the alternate screen. Every step is attempted; the
/// first failure is returned.
fn restore_terminal() -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(
        io::stdout(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen,
        Show
    );
    raw.and(screen)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
