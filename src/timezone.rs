//! Conversions between UTC and the configured civil timezone.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The timezone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Asia/Karachi";

pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current instant in `canonical_timezone`, e.g. "Asia/Karachi".
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if `canonical_timezone` is not a
/// known timezone.
pub fn local_now(canonical_timezone: &str) -> Result<OffsetDateTime, Error> {
    let Some(local_offset) = get_local_offset(canonical_timezone) else {
        tracing::error!("Invalid timezone {}", canonical_timezone);
        return Err(Error::InvalidTimezoneError(canonical_timezone.to_owned()));
    };

    Ok(OffsetDateTime::now_utc().to_offset(local_offset))
}

#[cfg(test)]
mod tests {
    use time::UtcOffset;

    use crate::Error;

    use super::{DEFAULT_TIMEZONE, get_local_offset, local_now};

    #[test]
    fn karachi_is_five_hours_ahead_of_utc() {
        let offset = get_local_offset(DEFAULT_TIMEZONE).unwrap();

        assert_eq!(offset, UtcOffset::from_hms(5, 0, 0).unwrap());
    }

    #[test]
    fn local_now_uses_timezone_offset() {
        let now = local_now("Etc/UTC").unwrap();

        assert_eq!(now.offset(), UtcOffset::UTC);
    }

    #[test]
    fn local_now_rejects_unknown_timezone() {
        assert_eq!(
            local_now("Mars/Olympus_Mons"),
            Err(Error::InvalidTimezoneError("Mars/Olympus_Mons".to_owned()))
        );
    }
}
