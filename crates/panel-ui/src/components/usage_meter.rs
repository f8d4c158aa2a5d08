use crate::themes::Theme;
use panel_core::models::WindowKind;
use panel_core::render_model::{TimerMeter, UsageMeter};
use ratatui::text::{Line, Span};

/// Configuration controlling visual appearance of a meter bar.
#[derive(Debug, Clone, Copy)]
pub struct BarConfig {
    /// Width in terminal columns of the bar portion (excluding labels).
    pub width: u16,
    /// Character used to fill the completed portion of the bar.
    pub filled_char: char,
    /// Character used to fill the empty portion of the bar.
    pub empty_char: char,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: 24,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

impl BarConfig {
    pub fn with_width(width: u16) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Split the bar into filled and empty strings for `percent` in `0..=100`.
    fn segments(&self, percent: f64) -> (String, String) {
        let capped = percent.clamp(0.0, 100.0);
        let filled = ((capped / 100.0) * self.width as f64).round() as usize;
        let empty = (self.width as usize).saturating_sub(filled);
        (
            std::iter::repeat_n(self.filled_char, filled).collect(),
            std::iter::repeat_n(self.empty_char, empty).collect(),
        )
    }
}

/// Width of the window label column (`"5h "`).
const LABEL_WIDTH: usize = 3;

// ── UsageBar ─────────────────────────────────────────────────────────────────

/// Utilization bar for one rate-limit window.
///
/// Renders as `5h ████░░░░ 42%`, the fill coloured by tier.
pub struct UsageBar<'a> {
    pub kind: WindowKind,
    pub meter: &'a UsageMeter,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> UsageBar<'a> {
    pub fn new(kind: WindowKind, meter: &'a UsageMeter, theme: &'a Theme) -> Self {
        Self {
            kind,
            meter,
            theme,
            config: BarConfig::default(),
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let (filled, empty) = self.config.segments(self.meter.fill as f64);
        Line::from(vec![
            Span::styled(
                format!("{:<LABEL_WIDTH$}", self.kind.label()),
                self.theme.label,
            ),
            Span::styled(filled, self.theme.tier_style(self.meter.tier)),
            Span::styled(empty, self.theme.progress_empty),
            Span::styled(format!(" {:>4}", self.meter.label()), self.theme.value),
        ])
    }
}

// ── TimerBar ─────────────────────────────────────────────────────────────────

/// Time-remaining bar shown under a [`UsageBar`].
///
/// The fill is the share of the window still left; the label is the
/// countdown to reset.
pub struct TimerBar<'a> {
    pub timer: &'a TimerMeter,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> TimerBar<'a> {
    pub fn new(timer: &'a TimerMeter, theme: &'a Theme) -> Self {
        Self {
            timer,
            theme,
            config: BarConfig::default(),
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let (filled, empty) = self.config.segments(self.timer.remaining_percent);
        Line::from(vec![
            Span::raw(" ".repeat(LABEL_WIDTH)),
            Span::styled(filled, self.theme.timer_fill),
            Span::styled(empty, self.theme.progress_empty),
            Span::styled(format!(" {}", self.timer.countdown), self.theme.dim),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
