//! IANA timezone resolution.

use chrono_tz::Tz;

use ck_domain::ComputeError;

/// Parse an IANA timezone name into a `chrono_tz::Tz`.
pub fn resolve_timezone(name: &str) -> Result<Tz, ComputeError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ComputeError::InvalidTimezone(name.to_owned()))
}

/// Validate an IANA timezone string.
pub fn validate_timezone(name: &str) -> Result<(), ComputeError> {
    resolve_timezone(name).map(|_| ())
}
