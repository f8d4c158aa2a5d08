use crate::themes::Theme;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Key hints shown on the main view.
pub const MAIN_HINTS: [(&str, &str); 4] = [
    ("p", "profile"),
    ("h", "home"),
    ("s", "settings"),
    ("r", "refresh"),
];

/// Key hints shown while the profile list is open.
pub const PROFILE_HINTS: [(&str, &str); 3] = [("↑↓", "move"), ("⏎", "select"), ("esc", "back")];

/// Panel header: a key-hint line followed by a separator, both within
/// `width` columns.
pub struct Header<'a> {
    /// `true` while the profile list is open.
    pub profiles_open: bool,
    /// Separator width in columns.
    pub width: u16,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(profiles_open: bool, width: u16, theme: &'a Theme) -> Self {
        Self {
            profiles_open,
            width,
            theme,
        }
    }

    /// Render the header as exactly two lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let hints: &[(&str, &str)] = if self.profiles_open {
            &PROFILE_HINTS
        } else {
            &MAIN_HINTS
        };

        // Hints that do not fit are dropped whole so the line never wraps.
        let mut spans = Vec::with_capacity(hints.len() * 3);
        let mut used = 0;
        for (key, action) in hints {
            let gap = usize::from(!spans.is_empty());
            let needed = gap + key.width() + 1 + action.width();
            if used + needed > self.width as usize {
                break;
            }
            if gap > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(key.to_string(), self.theme.info));
            spans.push(Span::styled(format!(" {action}"), self.theme.key_hint));
            used += needed;
        }

        vec![
            Line::from(spans),
            Line::from(Span::styled(
                "─".repeat(self.width as usize),
                self.theme.separator,
            )),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
