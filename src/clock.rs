//! The clock used to decide what "today" is.

use std::fmt::Debug;

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, timezones};

use crate::Error;

/// Provides the current calendar date.
pub trait Clock: Debug + Send + Sync {
    /// Today's date in the user's local timezone.
    fn today(&self) -> Date;
}

/// The UTC offset in effect right now for `canonical_timezone`, or `None` if the name is unknown.
fn current_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    let timezone = timezones::get_by_name(canonical_timezone)?;

    Some(timezone.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// A clock that reads the system time and converts it to a local timezone.
#[derive(Debug, Clone)]
pub struct LocalClock {
    timezone: String,
}

impl LocalClock {
    /// Create a clock for a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTimezoneError] if `canonical_timezone` is not a known timezone.
    pub fn new(canonical_timezone: &str) -> Result<Self, Error> {
        match current_offset(canonical_timezone) {
            Some(_) => Ok(Self {
                timezone: canonical_timezone.to_owned(),
            }),
            None => Err(Error::InvalidTimezoneError(canonical_timezone.to_owned())),
        }
    }
}

impl Clock for LocalClock {
    fn today(&self) -> Date {
        // The offset changes with daylight saving.
        let now = OffsetDateTime::now_utc();

        match current_offset(&self.timezone) {
            Some(offset) => now.to_offset(offset).date(),
            None => now.date(),
        }
    }
}

/// A clock that is stuck on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use time::UtcOffset;

    use crate::{
        Error,
        clock::{Clock, FixedClock, LocalClock, current_offset},
    };

    #[test]
    fn utc_has_zero_offset() {
        assert_eq!(current_offset("Etc/UTC"), Some(UtcOffset::UTC));
    }

    #[test]
    fn unknown_timezone_has_no_offset() {
        assert_eq!(current_offset("Middle/Earth"), None);
    }

    #[test]
    fn local_clock_rejects_unknown_timezone() {
        let result = LocalClock::new("Not/A_Timezone");

        assert_eq!(
            result.map(|_| ()),
            Err(Error::InvalidTimezoneError("Not/A_Timezone".to_owned()))
        );
    }

    #[test]
    fn local_clock_accepts_canonical_timezone() {
        assert!(LocalClock::new("Pacific/Auckland").is_ok());
    }

    #[test]
    fn fixed_clock_returns_its_date() {
        let clock = FixedClock(date!(2025 - 03 - 14));

        assert_eq!(clock.today(), date!(2025 - 03 - 14));
    }
}
