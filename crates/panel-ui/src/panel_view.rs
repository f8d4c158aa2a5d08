//! The usage panel drawn into the terminal.
//!
//! A bordered box of fixed width whose height follows the pixel height last
//! requested by the controller, converted to terminal rows. Exactly one of
//! the loading, usage, error or profile regions is drawn inside it.

use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use panel_core::models::WindowKind;
use panel_core::view_mode::VisibleRegion;
use panel_runtime::controller::PanelView;

use crate::components::header::Header;
use crate::components::profile_list::ProfileList;
use crate::components::usage_meter::{BarConfig, TimerBar, UsageBar};
use crate::themes::Theme;

/// Logical pixels per terminal row.
pub const PX_PER_ROW: u32 = 15;
/// Panel width in columns, borders included.
pub const PANEL_WIDTH: u16 = 40;
/// Lines the header occupies at the top of the panel body.
pub const HEADER_ROWS: u16 = 2;
/// Lines above the first profile row (header plus list title).
pub const PROFILE_ROWS_OFFSET: u16 = HEADER_ROWS + 1;

const PANEL_TITLE: &str = " Claude Usage ";

/// Convert a pixel height to whole terminal rows, rounding up.
pub fn px_to_rows(px: u32) -> u16 {
    px.div_ceil(PX_PER_ROW).min(u16::MAX as u32) as u16
}

/// Rectangle the panel occupies inside `screen` for a height of `height_px`.
pub fn panel_area(screen: Rect, height_px: u32) -> Rect {
    Rect {
        x: screen.x,
        y: screen.y,
        width: PANEL_WIDTH.min(screen.width),
        height: px_to_rows(height_px).min(screen.height),
    }
}

/// Index of the profile row drawn at terminal position (`column`, `row`).
pub fn profile_row_at(panel: Rect, view: &PanelView, column: u16, row: u16) -> Option<usize> {
    if view.region != VisibleRegion::Profiles {
        return None;
    }
    let inner = inner_area(panel);
    let first = inner.y + PROFILE_ROWS_OFFSET;
    if column < inner.x || column >= inner.x + inner.width || row < first {
        return None;
    }
    if row >= inner.y + inner.height {
        return None;
    }
    let index = (row - first) as usize;
    (index < view.profiles.len()).then_some(index)
}

fn inner_area(panel: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(panel)
}

// ── Main render ───────────────────────────────────────────────────────────────

/// Render the panel for `view` into `area`.
pub fn render_panel(
    frame: &mut Frame,
    area: Rect,
    view: &PanelView,
    cursor: Option<usize>,
    theme: &Theme,
) {
    let inner_width = area.width.saturating_sub(2);
    let lines = build_panel_lines(view, cursor, inner_width, theme);
    let paragraph = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.separator)
                .title(Span::styled(PANEL_TITLE, theme.header)),
        );
    frame.render_widget(paragraph, area);
}

/// Build the body lines of the panel (extracted for testability).
pub fn build_panel_lines<'a>(
    view: &'a PanelView,
    cursor: Option<usize>,
    width: u16,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    let profiles_open = view.region == VisibleRegion::Profiles;
    let mut lines = Header::new(profiles_open, width, theme).to_lines();

    match view.region {
        VisibleRegion::Loading => {
            lines.push(Line::from(Span::styled("Loading...", theme.dim)));
        }
        VisibleRegion::Error => {
            let message = view.error_message().unwrap_or_default();
            lines.push(Line::from(Span::styled(message.to_string(), theme.error)));
        }
        VisibleRegion::Usage => {
            let bar_width = width.saturating_sub(9).max(4);
            for kind in WindowKind::ALL {
                let window = view.window(kind);
                let mut usage = UsageBar::new(kind, &window.usage, theme);
                usage.config = BarConfig::with_width(bar_width);
                let mut timer = TimerBar::new(&window.timer, theme);
                timer.config = BarConfig::with_width(bar_width);
                lines.push(usage.to_line());
                lines.push(timer.to_line());
            }
        }
        VisibleRegion::Profiles => {
            lines.extend(ProfileList::new(&view.profiles, cursor, width, theme).to_lines());
        }
    }
    lines
}

// ── Tests ──────────────────────────────────────────────────────────────────────
