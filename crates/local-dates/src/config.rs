//! Typed configuration for a single rendered date tag.
//!
//! The markup parser hands over a flat record of string attributes;
//! [`DateConfig::from_attrs`] validates it exactly once — zone names are
//! checked against the timezone database, the recurrence period and the
//! booleans are parsed into real types — so nothing downstream ever
//! re-parses a string. Unknown zone names and malformed recurrences are
//! dropped rather than propagated.

use std::collections::HashMap;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::error::LocalDateError;

/// The unit of a recurrence period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

/// A fixed repetition period: the event repeats every `count` `unit`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    pub count: u32,
    pub unit: RecurrenceUnit,
}

impl Recurrence {
    pub fn new(count: u32, unit: RecurrenceUnit) -> Self {
        Self { count, unit }
    }
}

impl FromStr for Recurrence {
    type Err = LocalDateError;

    /// Parses the `"<count>.<unit>"` form, e.g. `"1.weeks"` or `"2.months"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LocalDateError::InvalidRecurrence(s.to_string());
        let (count, unit) = s.split_once('.').ok_or_else(invalid)?;

        let count: u32 = count.parse().map_err(|_| invalid())?;
        if count == 0 {
            return Err(invalid());
        }

        let unit = match unit {
            "minutes" => RecurrenceUnit::Minutes,
            "hours" => RecurrenceUnit::Hours,
            "days" => RecurrenceUnit::Days,
            "weeks" => RecurrenceUnit::Weeks,
            "months" => RecurrenceUnit::Months,
            "years" => RecurrenceUnit::Years,
            _ => return Err(invalid()),
        };

        Ok(Recurrence { count, unit })
    }
}

/// Everything a `[date=...]` tag can configure, validated and typed.
///
/// Immutable per resolution call: build one per rendered tag (or per editor
/// preview keystroke) and hand it to
/// [`LocalDateResolver`](crate::LocalDateResolver).
#[derive(Debug, Clone)]
pub struct DateConfig {
    /// Calendar date, `YYYY-MM-DD`. Parsed strictly inside `build()`.
    pub date: String,
    /// Wall-clock time `HH:mm[:ss]`. Absence means all-day semantics.
    pub time: Option<String>,
    /// The zone the date/time literal is anchored in. Defaults to UTC.
    pub timezone: Option<Tz>,
    /// Repeat the event every `count` `unit`s.
    pub recurring: Option<Recurrence>,
    /// Additional zones to show as preview rows, first occurrence wins.
    pub timezones: Vec<Tz>,
    /// Explicit zone to render the primary string in.
    pub displayed_timezone: Option<Tz>,
    /// Enables Today/Tomorrow/Yesterday phrasing near "now". Default true.
    pub calendar: bool,
    /// Render the primary string as a humanized countdown instead.
    pub countdown: bool,
    /// Display pattern (chrono strftime). Defaults to a long date+time
    /// pattern when `time` is present, else a long date-only pattern.
    pub format: Option<String>,
}

impl DateConfig {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: None,
            timezone: None,
            recurring: None,
            timezones: Vec::new(),
            displayed_timezone: None,
            calendar: true,
            countdown: false,
            format: None,
        }
    }

    /// Builds a config from the flat attribute record produced by the
    /// markup parser.
    ///
    /// Recognized keys: `date`, `time`, `timezone`, `format`, `timezones`
    /// (pipe-joined), `displayed-timezone`, `recurring`, `calendar`,
    /// `countdown`. Zone names not present in the timezone database are
    /// dropped, never passed through.
    pub fn from_attrs(attrs: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            attrs
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::new(get("date").unwrap_or_default());
        config.time = get("time").map(str::to_string);
        config.timezone = get("timezone").and_then(|name| parse_zone(name).ok());
        config.displayed_timezone = get("displayed-timezone").and_then(|name| parse_zone(name).ok());
        config.timezones = get("timezones")
            .map(|list| {
                list.split('|')
                    .filter_map(|name| parse_zone(name.trim()).ok())
                    .collect()
            })
            .unwrap_or_default();
        config.recurring = get("recurring").and_then(|period| period.parse().ok());
        config.calendar = get("calendar").map_or(true, parse_bool);
        config.countdown = get("countdown").map_or(false, parse_bool);
        config.format = get("format").map(str::to_string);
        config
    }
}

/// Validates a zone name against the timezone database.
///
/// # Errors
///
/// Returns [`LocalDateError::InvalidTimezone`] for names the database does
/// not know.
pub fn parse_zone(name: &str) -> Result<Tz, LocalDateError> {
    name.parse::<Tz>()
        .map_err(|_| LocalDateError::InvalidTimezone(name.to_string()))
}

fn parse_bool(s: &str) -> bool {
    s.eq_ignore_ascii_case("true")
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_recurrence_parse() {
        let recurrence: Recurrence = "1.weeks".parse().unwrap();
        assert_eq!(recurrence, Recurrence::new(1, RecurrenceUnit::Weeks));

        let recurrence: Recurrence = "3.months".parse().unwrap();
        assert_eq!(recurrence, Recurrence::new(3, RecurrenceUnit::Months));
    }

    #[test]
    fn test_recurrence_rejects_malformed() {
        assert!("weeks".parse::<Recurrence>().is_err());
        assert!("0.weeks".parse::<Recurrence>().is_err());
        assert!("1.fortnights".parse::<Recurrence>().is_err());
        assert!("one.weeks".parse::<Recurrence>().is_err());
    }

    #[test]
    fn test_from_attrs_full_record() {
        let config = DateConfig::from_attrs(&attrs(&[
            ("date", "2021-05-04"),
            ("time", "15:00"),
            ("timezone", "Europe/Paris"),
            ("timezones", "Europe/Berlin|Asia/Tokyo"),
            ("displayed-timezone", "America/New_York"),
            ("recurring", "1.weeks"),
            ("calendar", "false"),
            ("countdown", "true"),
            ("format", "%Y-%m-%d"),
        ]));

        assert_eq!(config.date, "2021-05-04");
        assert_eq!(config.time.as_deref(), Some("15:00"));
        assert_eq!(config.timezone, Some(chrono_tz::Europe::Paris));
        assert_eq!(
            config.timezones,
            vec![chrono_tz::Europe::Berlin, chrono_tz::Asia::Tokyo]
        );
        assert_eq!(config.displayed_timezone, Some(chrono_tz::America::New_York));
        assert_eq!(config.recurring, Some(Recurrence::new(1, RecurrenceUnit::Weeks)));
        assert!(!config.calendar);
        assert!(config.countdown);
        assert_eq!(config.format.as_deref(), Some("%Y-%m-%d"));
    }

    #[test]
    fn test_from_attrs_defaults() {
        let config = DateConfig::from_attrs(&attrs(&[("date", "2021-05-04")]));
        assert!(config.calendar);
        assert!(!config.countdown);
        assert!(config.time.is_none());
        assert!(config.timezone.is_none());
        assert!(config.timezones.is_empty());
    }

    #[test]
    fn test_from_attrs_drops_unknown_zones() {
        let config = DateConfig::from_attrs(&attrs(&[
            ("date", "2021-05-04"),
            ("timezone", "Mars/Olympus_Mons"),
            ("timezones", "Europe/Paris|Not/A_Zone|Asia/Tokyo"),
        ]));
        assert!(config.timezone.is_none());
        assert_eq!(
            config.timezones,
            vec![chrono_tz::Europe::Paris, chrono_tz::Asia::Tokyo]
        );
    }

    #[test]
    fn test_from_attrs_drops_malformed_recurring() {
        let config = DateConfig::from_attrs(&attrs(&[
            ("date", "2021-05-04"),
            ("recurring", "every so often"),
        ]));
        assert!(config.recurring.is_none());
    }

    #[test]
    fn test_parse_zone_known_and_unknown() {
        assert!(parse_zone("America/New_York").is_ok());
        let err = parse_zone("Invalid/Zone").unwrap_err().to_string();
        assert!(err.contains("Invalid timezone"), "got: {err}");
    }
}
