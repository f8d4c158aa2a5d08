//! Latest-known usage state and the display values derived from it.
//!
//! [`UsageRenderModel`] keeps the reset timestamps of both windows between
//! snapshots. Countdown and timer bars are recomputed from those timestamps on
//! every [`UsageRenderModel::refresh_timers`] call, independently of whether
//! new data arrived.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::formatting::{
    bar_fill, display_percent, format_countdown_at, progress_percent_at, COUNTDOWN_PLACEHOLDER,
};
use crate::models::{UsageSnapshot, UsageTier, WindowKind};
use crate::time_utils::parse_reset_at;

/// Reset instants carried between an ingested snapshot and the timer tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetTimes {
    pub five_hour: Option<DateTime<Utc>>,
    pub seven_day: Option<DateTime<Utc>>,
}

impl ResetTimes {
    pub fn get(&self, kind: WindowKind) -> Option<DateTime<Utc>> {
        match kind {
            WindowKind::FiveHour => self.five_hour,
            WindowKind::SevenDay => self.seven_day,
        }
    }

    fn set(&mut self, kind: WindowKind, value: Option<DateTime<Utc>>) {
        match kind {
            WindowKind::FiveHour => self.five_hour = value,
            WindowKind::SevenDay => self.seven_day = value,
        }
    }
}

/// Utilization bar of one window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsageMeter {
    /// Rounded utilization shown in the label (e.g. `42` → `"42%"`).
    pub percent: i64,
    /// Fill width of the bar, `0..=100`.
    pub fill: u16,
    pub tier: UsageTier,
}

impl UsageMeter {
    pub fn label(&self) -> String {
        format!("{}%", self.percent)
    }
}

/// Countdown bar of one window.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerMeter {
    /// Countdown text such as `"2h14m"`, or the placeholder.
    pub countdown: String,
    /// Share of the nominal window still remaining, `0.0..=100.0`.
    pub remaining_percent: f64,
}

impl Default for TimerMeter {
    fn default() -> Self {
        Self {
            countdown: COUNTDOWN_PLACEHOLDER.to_string(),
            remaining_percent: 0.0,
        }
    }
}

/// Everything shown for one window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowDisplay {
    pub usage: UsageMeter,
    pub timer: TimerMeter,
}

/// Display state for both usage windows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsageRenderModel {
    reset_times: ResetTimes,
    five_hour: WindowDisplay,
    seven_day: WindowDisplay,
}

impl UsageRenderModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a snapshot. Windows absent from `snapshot` keep their current
    /// display and reset time. A window present without a reset time goes
    /// back to the placeholder countdown.
    pub fn ingest(&mut self, snapshot: &UsageSnapshot, now: DateTime<Utc>) {
        for kind in WindowKind::ALL {
            let Some(window) = snapshot.window(kind) else {
                continue;
            };

            let utilization = window.utilization_or_zero();
            let percent = display_percent(utilization);
            let meter = UsageMeter {
                percent,
                fill: bar_fill(percent),
                tier: UsageTier::from_utilization(utilization),
            };
            debug!(window = kind.label(), percent, tier = ?meter.tier, "usage window ingested");

            let reset_at = parse_reset_at(window.resets_at.as_deref());
            let display = self.display_mut(kind);
            display.usage = meter;
            if reset_at.is_none() {
                display.timer = TimerMeter::default();
            }
            self.reset_times.set(kind, reset_at);
        }

        self.refresh_timers(now);
    }

    /// Recompute countdown and timer bars from the stored reset times.
    ///
    /// Windows without a reset time are left as they are.
    pub fn refresh_timers(&mut self, now: DateTime<Utc>) {
        for kind in WindowKind::ALL {
            let Some(reset_at) = self.reset_times.get(kind) else {
                continue;
            };
            let timer = &mut self.display_mut(kind).timer;
            timer.remaining_percent =
                progress_percent_at(Some(reset_at), kind.nominal_hours(), now);
            timer.countdown = format_countdown_at(Some(reset_at), now);
        }
    }

    pub fn reset_times(&self) -> ResetTimes {
        self.reset_times
    }

    pub fn window(&self, kind: WindowKind) -> &WindowDisplay {
        match kind {
            WindowKind::FiveHour => &self.five_hour,
            WindowKind::SevenDay => &self.seven_day,
        }
    }

    fn display_mut(&mut self, kind: WindowKind) -> &mut WindowDisplay {
        match kind {
            WindowKind::FiveHour => &mut self.five_hour,
            WindowKind::SevenDay => &mut self.seven_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UsageWindow;
    use chrono::{Duration, SecondsFormat, TimeZone as _};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    fn iso(dt: DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn snapshot(five: Option<(f64, Option<String>)>, seven: Option<(f64, Option<String>)>) -> UsageSnapshot {
        let to_window = |(u, r): (f64, Option<String>)| UsageWindow {
            utilization: Some(u),
            resets_at: r,
        };
        UsageSnapshot {
            five_hour: five.map(to_window),
            seven_day: seven.map(to_window),
        }
    }

    #[test]
    fn test_new_model_shows_placeholders() {
        let model = UsageRenderModel::new();
        for kind in WindowKind::ALL {
            let w = model.window(kind);
            assert_eq!(w.usage.percent, 0);
            assert_eq!(w.timer.countdown, "--");
            assert_eq!(w.timer.remaining_percent, 0.0);
        }
        assert_eq!(model.reset_times(), ResetTimes::default());
    }

    #[test]
    fn test_ingest_updates_meter_and_timer_immediately() {
        let mut model = UsageRenderModel::new();
        let reset = now() + Duration::minutes(150);
        model.ingest(&snapshot(Some((63.4, Some(iso(reset)))), None), now());

        let five = model.window(WindowKind::FiveHour);
        assert_eq!(five.usage.percent, 63);
        assert_eq!(five.usage.label(), "63%");
        assert_eq!(five.usage.fill, 63);
        assert_eq!(five.usage.tier, UsageTier::Warning);
        assert_eq!(five.timer.countdown, "2h30m");
        assert!((five.timer.remaining_percent - 50.0).abs() < 1e-9);
        assert_eq!(model.reset_times().five_hour, Some(reset));
    }

    #[test]
    fn test_ingest_five_hour_only_leaves_seven_day_untouched() {
        let mut model = UsageRenderModel::new();
        let seven_reset = now() + Duration::hours(100);
        model.ingest(
            &snapshot(
                Some((10.0, Some(iso(now() + Duration::hours(1))))),
                Some((55.0, Some(iso(seven_reset)))),
            ),
            now(),
        );
        let seven_before = model.window(WindowKind::SevenDay).clone();

        model.ingest(
            &snapshot(Some((90.0, Some(iso(now() + Duration::hours(2))))), None),
            now(),
        );

        assert_eq!(model.window(WindowKind::SevenDay), &seven_before);
        assert_eq!(model.reset_times().seven_day, Some(seven_reset));
        assert_eq!(
            model.window(WindowKind::FiveHour).usage.tier,
            UsageTier::Critical
        );
    }

    #[test]
    fn test_tier_uses_raw_utilization() {
        let mut model = UsageRenderModel::new();
        model.ingest(&snapshot(Some((49.9, None)), Some((80.0, None))), now());
        let five = model.window(WindowKind::FiveHour);
        // Label rounds to 50 but the tier stays below the warning threshold.
        assert_eq!(five.usage.percent, 50);
        assert_eq!(five.usage.tier, UsageTier::Normal);
        assert_eq!(
            model.window(WindowKind::SevenDay).usage.tier,
            UsageTier::Critical
        );
    }

    #[test]
    fn test_missing_utilization_counts_as_zero() {
        let mut model = UsageRenderModel::new();
        let snap = UsageSnapshot {
            five_hour: Some(UsageWindow::default()),
            seven_day: None,
        };
        model.ingest(&snap, now());
        let five = model.window(WindowKind::FiveHour);
        assert_eq!(five.usage.percent, 0);
        assert_eq!(five.usage.tier, UsageTier::Normal);
    }

    #[test]
    fn test_over_limit_bar_is_bounded() {
        let mut model = UsageRenderModel::new();
        model.ingest(&snapshot(Some((104.2, None)), None), now());
        let five = model.window(WindowKind::FiveHour);
        assert_eq!(five.usage.percent, 104);
        assert_eq!(five.usage.fill, 100);
    }

    #[test]
    fn test_window_without_reset_keeps_placeholder() {
        let mut model = UsageRenderModel::new();
        model.ingest(&snapshot(Some((20.0, None)), None), now());
        assert_eq!(model.window(WindowKind::FiveHour).timer.countdown, "--");
        assert!(model.reset_times().five_hour.is_none());
    }

    #[test]
    fn test_cleared_reset_returns_timer_to_placeholder() {
        let mut model = UsageRenderModel::new();
        model.ingest(
            &snapshot(Some((30.0, Some("2025-03-10T10:30:00Z".to_string()))), None),
            now(),
        );
        assert_eq!(model.window(WindowKind::FiveHour).timer.countdown, "1h30m");

        model.ingest(&snapshot(Some((35.0, None)), None), now());
        model.refresh_timers(now() + Duration::hours(5));

        let five = model.window(WindowKind::FiveHour);
        assert!(model.reset_times().five_hour.is_none());
        assert_eq!(five.timer, TimerMeter::default());
        assert_eq!(five.usage.percent, 35);
    }

    #[test]
    fn test_unparseable_reset_is_treated_as_absent() {
        let mut model = UsageRenderModel::new();
        model.ingest(
            &snapshot(Some((20.0, Some("soon".to_string()))), None),
            now(),
        );
        assert!(model.reset_times().five_hour.is_none());
        assert_eq!(model.window(WindowKind::FiveHour).timer.countdown, "--");
    }

    #[test]
    fn test_refresh_timers_counts_down_to_zero() {
        let mut model = UsageRenderModel::new();
        let start = now();
        model.ingest(
            &snapshot(Some((5.0, Some(iso(start + Duration::minutes(10))))), None),
            start,
        );

        let mut last = model.window(WindowKind::FiveHour).timer.remaining_percent;
        for secs in 1..=600 {
            model.refresh_timers(start + Duration::seconds(secs));
            let current = model.window(WindowKind::FiveHour).timer.remaining_percent;
            assert!(current <= last, "progress rose at t+{secs}s");
            assert!(current >= 0.0);
            last = current;
        }

        let five = model.window(WindowKind::FiveHour);
        assert_eq!(five.timer.remaining_percent, 0.0);
        assert_eq!(five.timer.countdown, "0m");

        model.refresh_timers(start + Duration::minutes(30));
        let five = model.window(WindowKind::FiveHour);
        assert_eq!(five.timer.remaining_percent, 0.0);
        assert_eq!(five.timer.countdown, "0m");
    }

    #[test]
    fn test_refresh_timers_is_idempotent() {
        let mut model = UsageRenderModel::new();
        model.ingest(
            &snapshot(None, Some((30.0, Some(iso(now() + Duration::hours(84)))))),
            now(),
        );
        let once = model.clone();
        model.refresh_timers(now());
        model.refresh_timers(now());
        assert_eq!(model, once);
    }

    #[test]
    fn test_refresh_timers_does_not_touch_reset_times() {
        let mut model = UsageRenderModel::new();
        let reset = now() + Duration::hours(3);
        model.ingest(&snapshot(Some((30.0, Some(iso(reset)))), None), now());
        model.refresh_timers(now() + Duration::hours(1));
        assert_eq!(model.reset_times().five_hour, Some(reset));
        assert_eq!(model.window(WindowKind::FiveHour).timer.countdown, "2h0m");
    }
}
