use serde::{Deserialize, Serialize};

/// One rolling quota window as reported by the backend.
///
/// Both fields are optional on the wire: a missing utilization is displayed
/// as 0 % and a missing reset timestamp leaves the countdown untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageWindow {
    /// Percentage of the window's quota consumed (0–100, may be fractional).
    #[serde(default)]
    pub utilization: Option<f64>,
    /// ISO-8601 instant at which the window's counter resets.
    #[serde(default)]
    pub resets_at: Option<String>,
}

impl UsageWindow {
    /// Construct a window from a utilization and an optional reset timestamp.
    pub fn new(utilization: f64, resets_at: Option<&str>) -> Self {
        Self {
            utilization: Some(utilization),
            resets_at: resets_at.map(str::to_string),
        }
    }

    /// Utilization with an absent value treated as zero.
    pub fn utilization_or_zero(&self) -> f64 {
        self.utilization.unwrap_or(0.0)
    }
}

/// A usage snapshot pushed by (or cached in) the backend.
///
/// A snapshot may carry one or both windows. Unknown keys such as
/// `seven_day_opus` or `extra_usage` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub five_hour: Option<UsageWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seven_day: Option<UsageWindow>,
}

impl UsageSnapshot {
    /// The window carried for `kind`, if present in this snapshot.
    pub fn window(&self, kind: WindowKind) -> Option<&UsageWindow> {
        match kind {
            WindowKind::FiveHour => self.five_hour.as_ref(),
            WindowKind::SevenDay => self.seven_day.as_ref(),
        }
    }
}

/// The two named quota windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    /// Short rolling window, nominally 5 hours.
    FiveHour,
    /// Long rolling window, nominally 7 days.
    SevenDay,
}

impl WindowKind {
    /// Both windows in display order.
    pub const ALL: [WindowKind; 2] = [WindowKind::FiveHour, WindowKind::SevenDay];

    /// Nominal duration of the window in hours.
    pub fn nominal_hours(self) -> f64 {
        match self {
            WindowKind::FiveHour => 5.0,
            WindowKind::SevenDay => 168.0,
        }
    }

    /// Short label shown next to the window's bars.
    pub fn label(self) -> &'static str {
        match self {
            WindowKind::FiveHour => "5h",
            WindowKind::SevenDay => "7d",
        }
    }
}

/// Display colour classification derived from utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageTier {
    /// Below 50 %.
    #[default]
    Normal,
    /// 50 % up to (but excluding) 80 %.
    Warning,
    /// 80 % and above.
    Critical,
}

impl UsageTier {
    /// Classify a raw utilization value. Both thresholds are inclusive.
    pub fn from_utilization(utilization: f64) -> Self {
        if utilization >= 80.0 {
            UsageTier::Critical
        } else if utilization >= 50.0 {
            UsageTier::Warning
        } else {
            UsageTier::Normal
        }
    }
}

/// A locally stored browser profile the user can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Directory-style identifier, e.g. `"Default"` or `"Profile 2"`.
    pub id: String,
    /// Human-readable profile name.
    pub name: String,
    /// Signed-in account email, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Profile {
    pub fn new(id: &str, name: &str, email: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            email: email.map(str::to_string),
        }
    }
}
