use ratatui::style::{Color, Modifier, Style};

use panel_core::models::UsageTier;

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 are considered light.  If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned.
pub fn detect_background() -> BackgroundType {
    match std::env::var("COLORFGBG") {
        Ok(val) => background_from_colorfgbg(&val),
        Err(_) => BackgroundType::Dark,
    }
}

fn background_from_colorfgbg(val: &str) -> BackgroundType {
    match val.split(';').next_back().map(str::parse::<u8>) {
        Some(Ok(bg)) if bg <= 6 => BackgroundType::Dark,
        Some(Ok(_)) => BackgroundType::Light,
        _ => BackgroundType::Dark,
    }
}

/// Every style the panel components draw with.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Chrome ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,
    pub key_hint: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub error: Style,

    // ── Usage bars ───────────────────────────────────────────────────────────
    /// Fill below 50 % utilization.
    pub usage_normal: Style,
    /// Fill from 50 % to below 80 %.
    pub usage_warning: Style,
    /// Fill at or above 80 %.
    pub usage_critical: Style,
    /// Unfilled portion of any bar.
    pub progress_empty: Style,
    /// Fill of the time-remaining bars.
    pub timer_fill: Style,

    // ── Profile list ─────────────────────────────────────────────────────────
    pub profile_name: Style,
    pub profile_email: Style,
    /// Row of the currently selected profile.
    pub profile_selected: Style,
    /// Row under the keyboard cursor.
    pub profile_cursor: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),
            key_hint: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            error: Style::default().fg(Color::Red),

            usage_normal: Style::default().fg(Color::Green),
            usage_warning: Style::default().fg(Color::Yellow),
            usage_critical: Style::default().fg(Color::Red),
            progress_empty: Style::default().fg(Color::DarkGray),
            timer_fill: Style::default().fg(Color::Blue),

            profile_name: Style::default().fg(Color::White),
            profile_email: Style::default().fg(Color::Gray),
            profile_selected: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            profile_cursor: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),
            key_hint: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            error: Style::default().fg(Color::Red),

            usage_normal: Style::default().fg(Color::Green),
            usage_warning: Style::default().fg(Color::Yellow),
            usage_critical: Style::default().fg(Color::Red),
            progress_empty: Style::default().fg(Color::Gray),
            timer_fill: Style::default().fg(Color::Blue),

            profile_name: Style::default().fg(Color::Black),
            profile_email: Style::default().fg(Color::DarkGray),
            profile_selected: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            profile_cursor: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Basic 8-colour ANSI palette without bold modifiers.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            separator: Style::default().fg(Color::DarkGray),
            key_hint: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            error: Style::default().fg(Color::Red),

            usage_normal: Style::default().fg(Color::Green),
            usage_warning: Style::default().fg(Color::Yellow),
            usage_critical: Style::default().fg(Color::Red),
            progress_empty: Style::default().fg(Color::DarkGray),
            timer_fill: Style::default().fg(Color::Cyan),

            profile_name: Style::default().fg(Color::White),
            profile_email: Style::default().fg(Color::Gray),
            profile_selected: Style::default().fg(Color::Green),
            profile_cursor: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Fill style of a usage bar in the given tier.
    pub fn tier_style(&self, tier: UsageTier) -> Style {
        match tier {
            UsageTier::Normal => self.usage_normal,
            UsageTier::Warning => self.usage_warning,
            UsageTier::Critical => self.usage_critical,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Theme construction ───────────────────────────────────────────────────

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.error.fg, Some(Color::Red));
        assert_eq!(t.usage_normal.fg, Some(Color::Green));
        assert_eq!(t.timer_fill.fg, Some(Color::Blue));
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.header.fg, Some(Color::Blue));
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.profile_name.fg, Some(Color::Black));
    }

    #[test]
    fn test_classic_theme_has_no_bold() {
        let t = Theme::classic();
        assert!(!t.header.add_modifier.contains(Modifier::BOLD));
        assert!(!t.value.add_modifier.contains(Modifier::BOLD));
        assert!(!t.profile_selected.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark").header.fg, Some(Color::Cyan));
        assert_eq!(Theme::from_name("light").header.fg, Some(Color::Blue));
        assert!(!Theme::from_name("classic")
            .header
            .add_modifier
            .contains(Modifier::BOLD));
    }

    #[test]
    fn test_from_name_unknown_falls_back() {
        let t = Theme::from_name("does-not-exist");
        assert!(t.header.fg.is_some());
    }

    // ── tier_style ───────────────────────────────────────────────────────────

    #[test]
    fn test_tier_style() {
        let t = Theme::dark();
        assert_eq!(t.tier_style(UsageTier::Normal).fg, Some(Color::Green));
        assert_eq!(t.tier_style(UsageTier::Warning).fg, Some(Color::Yellow));
        assert_eq!(t.tier_style(UsageTier::Critical).fg, Some(Color::Red));
    }

    #[test]
    fn test_tier_style_from_raw_utilization() {
        let t = Theme::dark();
        let style = t.tier_style(UsageTier::from_utilization(49.9));
        assert_eq!(style.fg, Some(Color::Green));
        let style = t.tier_style(UsageTier::from_utilization(80.0));
        assert_eq!(style.fg, Some(Color::Red));
    }

    // ── background detection ─────────────────────────────────────────────────

    #[test]
    fn test_background_from_colorfgbg() {
        assert_eq!(background_from_colorfgbg("15;0"), BackgroundType::Dark);
        assert_eq!(background_from_colorfgbg("0;15"), BackgroundType::Light);
        assert_eq!(background_from_colorfgbg("garbage"), BackgroundType::Dark);
        assert_eq!(background_from_colorfgbg(""), BackgroundType::Dark);
    }
}
