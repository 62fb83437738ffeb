//! Relative duration strings such as `2 minutes` or `90 sec`.

// self
use crate::{_prelude::*, error::ConfigError};

/// Parses `<n> <unit>` (or a bare number of seconds) into a [`Duration`].
///
/// Units are case-insensitive: `s`, `sec`, `second` (and plurals), `m`, `min`, `minute`,
/// `h`, `hr`, `hour`, `d`, `day`. Whitespace between number and unit is optional and a
/// leading `+` is accepted.
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
	let invalid = || ConfigError::InvalidDuration { value: value.to_owned() };
	let trimmed = value.trim();
	let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
	let digits = trimmed.find(|c: char| !c.is_ascii_digit()).unwrap_or(trimmed.len());

	if digits == 0 {
		return Err(invalid());
	}

	let amount = trimmed[..digits].parse::<i64>().map_err(|_| invalid())?;
	let unit = trimmed[digits..].trim().to_ascii_lowercase();
	let unit_seconds = match unit.as_str() {
		"" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
		"m" | "min" | "mins" | "minute" | "minutes" => 60,
		"h" | "hr" | "hrs" | "hour" | "hours" => 3_600,
		"d" | "day" | "days" => 86_400,
		_ => return Err(invalid()),
	};
	let seconds = amount.checked_mul(unit_seconds).ok_or_else(invalid)?;

	Ok(Duration::seconds(seconds))
}
