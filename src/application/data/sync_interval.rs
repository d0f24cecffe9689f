use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;
use std::time::Duration;

use snafu::{ResultExt, Snafu};

/// Time between two passes. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncInterval(Duration);

impl SyncInterval {
    pub fn from_secs_f64(seconds: f64) -> Result<Self, IntervalParseError> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return NotPositiveSnafu { seconds }.fail();
        }
        let duration = Duration::try_from_secs_f64(seconds)
            .ok()
            .filter(|duration| !duration.is_zero())
            .ok_or(IntervalParseError::OutOfRange { seconds })?;
        Ok(Self(duration))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl FromStr for SyncInterval {
    type Err = IntervalParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let seconds: f64 = input.trim().parse().context(NotANumberSnafu { input })?;
        Self::from_secs_f64(seconds)
    }
}

impl fmt::Display for SyncInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0.as_secs_f64())
    }
}

impl From<SyncInterval> for Duration {
    fn from(interval: SyncInterval) -> Self {
        interval.0
    }
}

#[derive(Debug, Snafu)]
pub enum IntervalParseError {
    #[snafu(display("'{}' is not a number of seconds", input))]
    NotANumber {
        input: String,
        source: ParseFloatError,
    },
    #[snafu(display("Interval must be a positive number of seconds, got {}", seconds))]
    NotPositive { seconds: f64 },
    #[snafu(display("Interval of {} seconds cannot be represented", seconds))]
    OutOfRange { seconds: f64 },
}
