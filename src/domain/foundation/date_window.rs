//! Date window value object for dashboard queries.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Look-back window applied to `service_date`.
///
/// Every window except `All` maps to `service_date >= today - N days`,
/// inclusive of the boundary day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DateWindow {
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl DateWindow {
    /// Number of days looked back, or `None` for the unbounded window.
    pub fn days(&self) -> Option<i64> {
        match self {
            DateWindow::Last7Days => Some(7),
            DateWindow::Last30Days => Some(30),
            DateWindow::Last90Days => Some(90),
            DateWindow::All => None,
        }
    }

    /// First service date included by this window, relative to `today`.
    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.days().map(|days| today - Duration::days(days))
    }

    /// Whether the trend series for this window is capped for display.
    pub fn caps_trend_series(&self) -> bool {
        matches!(self, DateWindow::Last90Days | DateWindow::All)
    }

    /// Short code used on the wire (`7d`, `30d`, `90d`, `all`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DateWindow::Last7Days => "7d",
            DateWindow::Last30Days => "30d",
            DateWindow::Last90Days => "90d",
            DateWindow::All => "all",
        }
    }

    /// Human readable caption for dashboards.
    pub fn caption(&self) -> &'static str {
        match self {
            DateWindow::Last7Days => "Last 7 days",
            DateWindow::Last30Days => "Last 30 days",
            DateWindow::Last90Days => "Last 90 days",
            DateWindow::All => "Historical total",
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateWindow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(DateWindow::Last7Days),
            "30d" => Ok(DateWindow::Last30Days),
            "90d" => Ok(DateWindow::Last90Days),
            "all" => Ok(DateWindow::All),
            other => Err(ValidationError::invalid_format(
                "window",
                format!("expected one of 7d, 30d, 90d, all; got '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn seven_day_window_starts_seven_days_back() {
        let today = date(2024, 3, 10);
        assert_eq!(DateWindow::Last7Days.start_date(today), Some(date(2024, 3, 3)));
    }

    #[test]
    fn ninety_day_window_crosses_months() {
        let today = date(2024, 3, 31);
        assert_eq!(DateWindow::Last90Days.start_date(today), Some(date(2024, 1, 1)));
    }

    #[test]
    fn all_window_has_no_start() {
        assert_eq!(DateWindow::All.start_date(date(2024, 1, 1)), None);
    }

    #[test]
    fn only_long_windows_cap_trends() {
        assert!(DateWindow::All.caps_trend_series());
        assert!(DateWindow::Last90Days.caps_trend_series());
        assert!(!DateWindow::Last30Days.caps_trend_series());
        assert!(!DateWindow::Last7Days.caps_trend_series());
    }

    #[test]
    fn parses_wire_codes() {
        assert_eq!("7d".parse::<DateWindow>().unwrap(), DateWindow::Last7Days);
        assert_eq!("all".parse::<DateWindow>().unwrap(), DateWindow::All);
        assert!("14d".parse::<DateWindow>().is_err());
    }

    #[test]
    fn serde_uses_wire_codes() {
        let json = serde_json::to_string(&DateWindow::Last30Days).unwrap();
        assert_eq!(json, "\"30d\"");
        let back: DateWindow = serde_json::from_str("\"90d\"").unwrap();
        assert_eq!(back, DateWindow::Last90Days);
    }
}
