//! Eligibility predicate and local time rendering.

use chrono::{DateTime, Datelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::Error;
use crate::Result;

/// Timezone the remote service operates in.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Jerusalem;

/// Days on which balance loading is refused by the remote service.
pub const WEEKEND: [Weekday; 2] = [Weekday::Fri, Weekday::Sat];

/// Which local days an action may run on.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    blocked: Vec<Weekday>,
    timezone: Tz,
}

impl Default for Schedule {
    fn default() -> Self {
        Self::always()
    }
}

impl Schedule {
    /// No blocked days.
    pub fn always() -> Self {
        Self {
            blocked: Vec::new(),
            timezone: DEFAULT_TIMEZONE,
        }
    }

    pub fn blocked_on(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut blocked: Vec<Weekday> = Vec::new();
        for day in days {
            if !blocked.contains(&day) {
                blocked.push(day);
            }
        }
        Self {
            blocked,
            timezone: DEFAULT_TIMEZONE,
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn blocked_days(&self) -> &[Weekday] {
        &self.blocked
    }

    /// The local weekday if `now` falls on a blocked day.
    pub fn blocked_day(&self, now: DateTime<Utc>) -> Option<Weekday> {
        let weekday = now.with_timezone(&self.timezone).weekday();
        self.blocked.contains(&weekday).then_some(weekday)
    }

    /// Render `now` in local 12-hour time, e.g. `10/19/2026, 09:00:00 AM`.
    pub fn format_local(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.timezone)
            .format("%m/%d/%Y, %I:%M:%S %p")
            .to_string()
    }
}

/// Parse an IANA timezone name.
///
/// # Errors
///
/// Returns an error for unknown names.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| Error::InvalidInput(format!("invalid timezone '{}': {}", name, e)))
}

/// Parse a weekday name such as `fri` or `Saturday`.
///
/// # Errors
///
/// Returns an error for anything chrono does not recognise.
pub fn parse_weekday(name: &str) -> Result<Weekday> {
    name.trim()
        .parse::<Weekday>()
        .map_err(|_| Error::InvalidInput(format!("invalid weekday '{}'", name)))
}
