use crate::themes::Theme;
use panel_core::profiles::ProfileRow;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Title line above the profile rows.
pub const PROFILE_LIST_TITLE: &str = "Select Chrome profile";

const MARKER_SELECTED: &str = "● ";
const MARKER_UNSELECTED: &str = "○ ";

/// Chooser overlay listing browser profiles, one per line.
pub struct ProfileList<'a> {
    pub rows: &'a [ProfileRow],
    /// Row under the keyboard cursor.
    pub cursor: Option<usize>,
    /// Available width in columns.
    pub width: u16,
    pub theme: &'a Theme,
}

impl<'a> ProfileList<'a> {
    pub fn new(rows: &'a [ProfileRow], cursor: Option<usize>, width: u16, theme: &'a Theme) -> Self {
        Self {
            rows,
            cursor,
            width,
            theme,
        }
    }

    /// Title line followed by one line per profile.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(Line::from(Span::styled(
            truncate_to_width(PROFILE_LIST_TITLE, self.width as usize),
            self.theme.header,
        )));
        if self.rows.is_empty() {
            lines.push(Line::from(Span::styled("No profiles found", self.theme.dim)));
            return lines;
        }
        for (i, row) in self.rows.iter().enumerate() {
            lines.push(self.row_line(row, self.cursor == Some(i)));
        }
        lines
    }

    fn row_line(&self, row: &ProfileRow, under_cursor: bool) -> Line<'a> {
        let (marker, name_style) = if row.selected {
            (MARKER_SELECTED, self.theme.profile_selected)
        } else {
            (MARKER_UNSELECTED, self.theme.profile_name)
        };

        let budget = (self.width as usize).saturating_sub(marker.width());
        let name = truncate_to_width(&row.profile.name, budget);
        let mut spans = vec![
            Span::styled(marker, name_style),
            Span::styled(name.clone(), name_style),
        ];

        if let Some(email) = &row.profile.email {
            let left = budget.saturating_sub(name.width() + 1);
            if left > 1 {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    truncate_to_width(email, left),
                    self.theme.profile_email,
                ));
            }
        }

        let line = Line::from(spans);
        if under_cursor {
            line.patch_style(self.theme.profile_cursor)
        } else {
            line
        }
    }
}

/// Cut `s` to at most `max` display columns, ending in `…` when shortened.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use panel_core::models::Profile;
    use panel_core::profiles::ProfileSelector;
    use ratatui::style::Modifier;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn selector() -> ProfileSelector {
        ProfileSelector::build(
            vec![
                Profile::new("Default", "Personal", Some("me@example.com")),
                Profile::new("Profile 1", "Work", None),
            ],
            Some("Profile 1"),
        )
    }

    #[test]
    fn test_lines_title_then_rows() {
        let theme = Theme::dark();
        let s = selector();
        let lines = ProfileList::new(s.rows(), None, 40, &theme).to_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(text(&lines[0]), PROFILE_LIST_TITLE);
        assert_eq!(text(&lines[1]), "○ Personal me@example.com");
        assert_eq!(text(&lines[2]), "● Work");
    }

    #[test]
    fn test_selected_row_styled() {
        let theme = Theme::dark();
        let s = selector();
        let lines = ProfileList::new(s.rows(), None, 40, &theme).to_lines();
        assert_eq!(lines[2].spans[1].style.fg, theme.profile_selected.fg);
    }

    #[test]
    fn test_cursor_row_reversed() {
        let theme = Theme::dark();
        let s = selector();
        let lines = ProfileList::new(s.rows(), Some(0), 40, &theme).to_lines();
        assert!(lines[1].style.add_modifier.contains(Modifier::REVERSED));
        assert!(!lines[2].style.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_narrow_width_truncates_email_first() {
        let theme = Theme::dark();
        let s = selector();
        let lines = ProfileList::new(s.rows(), None, 16, &theme).to_lines();
        let row = text(&lines[1]);
        assert!(row.width() <= 16, "{row}");
        assert!(row.starts_with("○ Personal "));
        assert!(row.ends_with('…'));
    }

    #[test]
    fn test_title_truncated_to_width() {
        let theme = Theme::dark();
        let s = selector();
        let lines = ProfileList::new(s.rows(), None, 10, &theme).to_lines();
        assert_eq!(text(&lines[0]), "Select Ch…");
    }

    #[test]
    fn test_empty_list_message() {
        let theme = Theme::dark();
        let lines = ProfileList::new(&[], None, 40, &theme).to_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(text(&lines[1]), "No profiles found");
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
