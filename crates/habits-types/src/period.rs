use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};

/// Reporting window recognized by the adherence report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown period: {0:?}")]
pub struct UnknownPeriod(pub String);

impl Period {
    pub const ALL: [Period; 3] = [Period::Week, Period::Month, Period::Year];

    /// Number of calendar days covered by the window.
    pub fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Inclusive `(first, last)` dates of the trailing window ending at `today`.
    pub fn window(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let back = Days::new(u64::from(self.days() - 1));
        let first = today.checked_sub_days(back).unwrap_or(NaiveDate::MIN);
        (first, today)
    }

    /// Occurrences a habit performed `frequency` days per week is expected to
    /// have over this window, rounded up.
    pub fn expected_occurrences(self, frequency: u32) -> u32 {
        (frequency * self.days()).div_ceil(7)
    }
}

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(UnknownPeriod(s.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
