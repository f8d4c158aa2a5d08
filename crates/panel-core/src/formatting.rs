//! Countdown and progress values derived from reset timestamps.
//!
//! Nothing here caches: every call reads the clock (or the `now` it is
//! given) and recomputes from the absolute reset instant, so skipped ticks
//! never accumulate drift.

use chrono::{DateTime, Utc};

/// Shown in place of a countdown when no reset time is known.
pub const COUNTDOWN_PLACEHOLDER: &str = "--";

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_MINUTE: i64 = 60;

/// Format the time remaining until `reset_at` as a compact countdown.
///
/// * absent            → `"--"`
/// * already elapsed   → `"0m"`
/// * `≥ 1` day         → `"1d1h"`
/// * `≥ 1` hour        → `"1h30m"`
/// * otherwise         → `"45m"`
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use panel_core::formatting::format_countdown_at;
///
/// let now = Utc::now();
/// let reset = now + Duration::minutes(90);
/// assert_eq!(format_countdown_at(Some(reset), now), "1h30m");
/// assert_eq!(format_countdown_at(None, now), "--");
/// ```
pub fn format_countdown_at(reset_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(reset_at) = reset_at else {
        return COUNTDOWN_PLACEHOLDER.to_string();
    };

    let remaining_ms = (reset_at - now).num_milliseconds();
    if remaining_ms <= 0 {
        return "0m".to_string();
    }

    let total_secs = remaining_ms / 1000;
    let days = total_secs / SECS_PER_DAY;
    let hours = (total_secs % SECS_PER_DAY) / SECS_PER_HOUR;
    let minutes = (total_secs % SECS_PER_HOUR) / SECS_PER_MINUTE;

    if days > 0 {
        format!("{}d{}h", days, hours)
    } else if hours > 0 {
        format!("{}h{}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// [`format_countdown_at`] against the current wall clock.
pub fn format_countdown(reset_at: Option<DateTime<Utc>>) -> String {
    format_countdown_at(reset_at, Utc::now())
}

/// Fraction of a window's nominal duration still remaining, as `0.0..=100.0`.
///
/// Returns `0.0` when `reset_at` is absent or already elapsed, and clamps to
/// `100.0` when the reset lies further out than one full window.
pub fn progress_percent_at(
    reset_at: Option<DateTime<Utc>>,
    window_hours: f64,
    now: DateTime<Utc>,
) -> f64 {
    let Some(reset_at) = reset_at else {
        return 0.0;
    };

    let remaining_ms = (reset_at - now).num_milliseconds();
    if remaining_ms <= 0 {
        return 0.0;
    }

    let total_ms = window_hours * 60.0 * 60.0 * 1000.0;
    if total_ms <= 0.0 {
        return 0.0;
    }
    (remaining_ms as f64 / total_ms * 100.0).min(100.0)
}

/// [`progress_percent_at`] against the current wall clock.
pub fn progress_percent(reset_at: Option<DateTime<Utc>>, window_hours: f64) -> f64 {
    progress_percent_at(reset_at, window_hours, Utc::now())
}

/// Round a utilization for the numeric label (half away from zero).
pub fn display_percent(utilization: f64) -> i64 {
    utilization.round() as i64
}

/// Bar fill width for a rounded percentage, bounded to `0..=100`.
pub fn bar_fill(percent: i64) -> u16 {
    percent.clamp(0, 100) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone as _};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    // ── format_countdown ────────────────────────────────────────────────────

    #[test]
    fn test_countdown_absent_is_placeholder() {
        assert_eq!(format_countdown_at(None, now()), "--");
        assert_eq!(format_countdown(None), COUNTDOWN_PLACEHOLDER);
    }

    #[test]
    fn test_countdown_elapsed_is_zero_minutes() {
        assert_eq!(format_countdown_at(Some(now()), now()), "0m");
        assert_eq!(
            format_countdown_at(Some(now() - Duration::hours(3)), now()),
            "0m"
        );
    }

    #[test]
    fn test_countdown_days_and_hours() {
        let reset = now() + Duration::hours(25) + Duration::minutes(30);
        assert_eq!(format_countdown_at(Some(reset), now()), "1d1h");
    }

    #[test]
    fn test_countdown_exact_day_shows_zero_hours() {
        let reset = now() + Duration::days(2);
        assert_eq!(format_countdown_at(Some(reset), now()), "2d0h");
    }

    #[test]
    fn test_countdown_hours_and_minutes() {
        let reset = now() + Duration::minutes(90);
        assert_eq!(format_countdown_at(Some(reset), now()), "1h30m");
    }

    #[test]
    fn test_countdown_minutes_only() {
        let reset = now() + Duration::minutes(59) + Duration::seconds(59);
        assert_eq!(format_countdown_at(Some(reset), now()), "59m");
    }

    #[test]
    fn test_countdown_under_a_minute() {
        let reset = now() + Duration::seconds(45);
        assert_eq!(format_countdown_at(Some(reset), now()), "0m");
    }

    #[test]
    fn test_countdown_full_week() {
        let reset = now() + Duration::hours(168);
        assert_eq!(format_countdown_at(Some(reset), now()), "7d0h");
    }

    // ── progress_percent ────────────────────────────────────────────────────

    #[test]
    fn test_progress_absent_is_zero() {
        assert_eq!(progress_percent_at(None, 5.0, now()), 0.0);
        assert_eq!(progress_percent(None, 168.0), 0.0);
    }

    #[test]
    fn test_progress_elapsed_is_zero() {
        let reset = now() - Duration::seconds(1);
        assert_eq!(progress_percent_at(Some(reset), 5.0, now()), 0.0);
    }

    #[test]
    fn test_progress_half_window() {
        let reset = now() + Duration::minutes(150);
        let p = progress_percent_at(Some(reset), 5.0, now());
        assert!((p - 50.0).abs() < 1e-9, "progress = {p}");
    }

    #[test]
    fn test_progress_clamped_beyond_window() {
        let reset = now() + Duration::hours(6);
        assert_eq!(progress_percent_at(Some(reset), 5.0, now()), 100.0);
        let reset = now() + Duration::hours(200);
        assert_eq!(progress_percent_at(Some(reset), 168.0, now()), 100.0);
    }

    #[test]
    fn test_progress_exact_window_is_full() {
        let reset = now() + Duration::hours(5);
        assert_eq!(progress_percent_at(Some(reset), 5.0, now()), 100.0);
    }

    #[test]
    fn test_progress_seven_day_window() {
        let reset = now() + Duration::hours(42);
        let p = progress_percent_at(Some(reset), 168.0, now());
        assert!((p - 25.0).abs() < 1e-9, "progress = {p}");
    }

    // ── display helpers ─────────────────────────────────────────────────────

    #[test]
    fn test_display_percent_rounds_half_up() {
        assert_eq!(display_percent(42.5), 43);
        assert_eq!(display_percent(42.4), 42);
        assert_eq!(display_percent(0.0), 0);
    }

    #[test]
    fn test_bar_fill_bounded() {
        assert_eq!(bar_fill(-3), 0);
        assert_eq!(bar_fill(55), 55);
        assert_eq!(bar_fill(130), 100);
    }
}
