//! The local-date resolution and formatting engine.
//!
//! [`LocalDateResolver::build`] is a pure function of `(config, viewer
//! timezone, now)` — the caller supplies the "now" anchor explicitly, so
//! resolutions are deterministic, testable, and safe to run concurrently.
//! Given a [`DateConfig`] it produces:
//!
//! - whether the event is already in the past,
//! - the single formatted display string (calendar-relative, countdown, or
//!   plain, with a zone suffix when the displayed zone is foreign),
//! - an ordered list of per-timezone preview rows, the viewer's own zone
//!   always first and never duplicated by offset equivalence,
//! - a flattened text summary of those rows for accessible/alt text.
//!
//! Nothing here returns an error: malformed date or time literals degrade
//! every output to the [`INVALID_DATE`] sentinel, and recurring events are
//! fast-forwarded so the displayed occurrence is never in the past.

use chrono::{DateTime, Offset, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::config::DateConfig;
use crate::i18n::Translate;
use crate::moment::{project_local, ZonedMoment, INVALID_DATE};

/// Long date+time pattern, the default when a time is configured.
pub const DATE_TIME_FORMAT: &str = "%B %-d, %Y %-I:%M %p";
/// Long date-only pattern, the default for all-day dates.
pub const DATE_FORMAT: &str = "%B %-d, %Y";

/// Full weekday+date+time pattern used for the ends of an all-day range.
const RANGE_FORMAT: &str = "%A, %B %-d, %Y %-I:%M %p";
/// Clock-time pattern substituted into the relative phrases.
const TIME_FORMAT: &str = "%-I:%M %p";
const RANGE_SEPARATOR: &str = "→";

/// One line of the multi-timezone preview: the same instant as seen from a
/// given zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRow {
    /// Short zone label, e.g. `"New York"` for `America/New_York`.
    pub timezone: String,
    /// The instant (or 24-hour window) rendered in that zone.
    pub formatted: String,
    /// Marks the viewer's own row. Exactly one row carries it, always first.
    pub current: bool,
}

/// The complete output of one resolution call.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLocalDate {
    /// True when the event already occurred and does not recur.
    pub past_event: bool,
    /// The primary display string.
    pub formatted: String,
    /// Per-timezone preview rows, viewer first.
    pub previews: Vec<PreviewRow>,
    /// `"<label> <formatted>"` for every row, comma-joined, in row order.
    pub text_preview: String,
}

/// Resolves a [`DateConfig`] into display text for one viewer.
pub struct LocalDateResolver<'a> {
    config: &'a DateConfig,
    viewer_zone: Tz,
    translator: &'a dyn Translate,
}

impl<'a> LocalDateResolver<'a> {
    pub fn new(config: &'a DateConfig, viewer_zone: Tz, translator: &'a dyn Translate) -> Self {
        Self {
            config,
            viewer_zone,
            translator,
        }
    }

    /// Resolves the configured date for the given "now" instant.
    pub fn build(&self, now: DateTime<Utc>) -> ResolvedLocalDate {
        let Some((year, month0, day)) = parse_date(&self.config.date) else {
            return self.invalid_result();
        };
        let (hour, minute, second) = match &self.config.time {
            Some(time) => match parse_time(time) {
                Some(components) => components,
                None => return self.invalid_result(),
            },
            None => (0, 0, 0),
        };

        let displayed = self.resolve_displayed_timezone();
        let anchor_zone = self.config.timezone.unwrap_or(chrono_tz::UTC);

        let mut anchor = ZonedMoment::create(
            year,
            month0,
            day,
            hour,
            minute,
            second,
            anchor_zone,
            self.viewer_zone,
        );
        if !anchor.is_valid() {
            return self.invalid_result();
        }

        if let Some(recurrence) = &self.config.recurring {
            if anchor.is_before(now) {
                let repetitions = anchor.repetitions_between(recurrence, now);
                anchor = anchor.add(
                    (repetitions + u64::from(recurrence.count)) as i64,
                    recurrence.unit,
                );
                // The repetition count is truncated, so a multi-unit period
                // can still land one period short of "now". Top up until the
                // displayed occurrence is no longer past.
                while anchor.is_before(now) {
                    anchor = anchor.add(i64::from(recurrence.count), recurrence.unit);
                }
            }
        }

        let past_event =
            self.config.recurring.is_none() && anchor.instant().is_some_and(|i| now > i);

        let previews = self.generate_previews(&anchor, displayed, now);
        let formatted = self.apply_formatting(&anchor, displayed, now);
        let text_preview = previews
            .iter()
            .map(|row| format!("{} {}", row.timezone, row.formatted))
            .collect::<Vec<_>>()
            .join(", ");

        ResolvedLocalDate {
            past_event,
            formatted,
            previews,
            text_preview,
        }
    }

    /// The zone the primary string renders in — never left unresolved.
    fn resolve_displayed_timezone(&self) -> Tz {
        if self.config.time.is_some() {
            self.config.displayed_timezone.unwrap_or(self.viewer_zone)
        } else {
            self.config
                .displayed_timezone
                .or(self.config.timezone)
                .unwrap_or(self.viewer_zone)
        }
    }

    /// All four outputs degrade together when the date/time literal is
    /// malformed; the viewer row stays present so the current-row invariant
    /// holds unconditionally.
    fn invalid_result(&self) -> ResolvedLocalDate {
        let row = PreviewRow {
            timezone: zone_without_prefix(self.viewer_zone.name()),
            formatted: INVALID_DATE.to_string(),
            current: true,
        };
        let text_preview = format!("{} {}", row.timezone, row.formatted);
        ResolvedLocalDate {
            past_event: false,
            formatted: INVALID_DATE.to_string(),
            previews: vec![row],
            text_preview,
        }
    }

    fn generate_previews(
        &self,
        anchor: &ZonedMoment,
        displayed: Tz,
        now: DateTime<Utc>,
    ) -> Vec<PreviewRow> {
        let time_given = self.config.time.is_some();

        let mut rows = vec![PreviewRow {
            timezone: zone_without_prefix(self.viewer_zone.name()),
            formatted: self
                .create_date_time_range(&anchor.reproject_to_zone(self.viewer_zone), time_given),
            current: true,
        }];
        let mut emitted: Vec<Tz> = vec![self.viewer_zone];

        let mut candidates: Vec<Tz> = self
            .config
            .timezones
            .iter()
            .copied()
            .filter(|zone| !is_equal_zones(*zone, self.viewer_zone, now))
            .collect();

        // Surface the authoring zone even when not explicitly requested.
        // The first condition is literal zone identity, not offset
        // equivalence: an explicit displayed zone that merely shares the
        // viewer's offset does not trigger the prepend. The condition
        // order is load-bearing.
        if let Some(authoring) = self.config.timezone {
            if displayed == self.viewer_zone
                && authoring != displayed
                && !is_equal_zones(authoring, displayed, now)
                && !candidates
                    .iter()
                    .any(|candidate| is_equal_zones(authoring, *candidate, now))
            {
                candidates.insert(0, authoring);
            }
        }

        for zone in candidates {
            if is_equal_zones(zone, displayed, now) {
                continue;
            }
            let zone = if is_equal_zones(zone, self.viewer_zone, now) {
                self.viewer_zone
            } else {
                zone
            };
            if emitted.iter().any(|seen| is_equal_zones(zone, *seen, now)) {
                continue;
            }
            rows.push(PreviewRow {
                timezone: zone_without_prefix(zone.name()),
                formatted: self.create_date_time_range(&anchor.reproject_to_zone(zone), time_given),
                current: false,
            });
            emitted.push(zone);
        }

        // First occurrence wins per short label.
        let mut seen = std::collections::HashSet::new();
        rows.retain(|row| seen.insert(row.timezone.clone()));
        rows
    }

    /// A point when a time was configured; otherwise the full calendar-day
    /// window, since an all-day local date is ambiguous without an explicit
    /// duration.
    fn create_date_time_range(&self, moment: &ZonedMoment, time_given: bool) -> String {
        if time_given {
            moment.format(Some(DATE_TIME_FORMAT), &moment.zone())
        } else {
            let end = moment.add(24, crate::config::RecurrenceUnit::Hours);
            format!(
                "{} {RANGE_SEPARATOR} {}",
                moment.format(Some(RANGE_FORMAT), &moment.zone()),
                end.format(Some(RANGE_FORMAT), &end.zone()),
            )
        }
    }

    fn apply_formatting(&self, anchor: &ZonedMoment, displayed: Tz, now: DateTime<Utc>) -> String {
        if self.config.countdown {
            let Some(instant) = anchor.instant() else {
                return INVALID_DATE.to_string();
            };
            return if instant > now {
                humanize_duration(instant - now)
            } else {
                self.translator
                    .translate("relative_dates.countdown.passed", &[])
            };
        }

        let format = self.resolved_format();
        let same_zone = is_equal_zones(displayed, self.viewer_zone, now);

        if self.config.calendar && same_zone && self.in_calendar_range(anchor, now) {
            if let Some(text) = self.relative_calendar_text(anchor, now) {
                return text;
            }
        }

        if !same_zone || !is_equal_zones(displayed, anchor.zone(), now) {
            return format!(
                "{} ({})",
                anchor.format(Some(format), &displayed),
                zone_without_prefix(displayed.name())
            );
        }

        anchor.format(Some(format), &displayed)
    }

    fn resolved_format(&self) -> &str {
        match &self.config.format {
            Some(format) => format,
            None if self.config.time.is_some() => DATE_TIME_FORMAT,
            None => DATE_FORMAT,
        }
    }

    /// Closed interval `[anchor − 2 days, end of day(anchor + 1 day)]`,
    /// evaluated in the viewer's zone.
    fn in_calendar_range(&self, anchor: &ZonedMoment, now: DateTime<Utc>) -> bool {
        let Some(instant) = anchor.instant() else {
            return false;
        };
        let lower = instant - chrono::Duration::days(2);

        let local_date = instant.with_timezone(&self.viewer_zone).date_naive();
        let Some(next_day) = local_date.succ_opt() else {
            return false;
        };
        let Some(end_naive) = next_day.and_hms_opt(23, 59, 59) else {
            return false;
        };
        let Some(upper) = project_local(end_naive, &self.viewer_zone) else {
            return false;
        };

        now >= lower && now <= upper.with_timezone(&Utc)
    }

    /// "Today/Tomorrow/Yesterday (at <time>)" phrasing for near days, the
    /// weekday name for other bare-midnight moments, `None` to fall through
    /// to the plain format.
    fn relative_calendar_text(&self, anchor: &ZonedMoment, now: DateTime<Utc>) -> Option<String> {
        let instant = anchor.instant()?;
        let local = instant.with_timezone(&self.viewer_zone);
        let now_local = now.with_timezone(&self.viewer_zone);
        let day_diff = (local.date_naive() - now_local.date_naive()).num_days();

        let key = match day_diff {
            -1 => "relative_dates.yesterday",
            0 => "relative_dates.today",
            1 => "relative_dates.tomorrow",
            _ => {
                if local.hour() == 0 && local.minute() == 0 {
                    return Some(local.format("%A").to_string());
                }
                return None;
            }
        };

        let time = match &self.config.time {
            Some(_) => format!("at {}", local.format(TIME_FORMAT)),
            None => String::new(),
        };
        Some(
            self.translator
                .translate(key, &[("time", &time)])
                .trim()
                .to_string(),
        )
    }
}

// ── Zone helpers ────────────────────────────────────────────────────────────

/// Whether two zone identifiers are practically interchangeable: one is a
/// non-empty substring of the other (abbreviated vs. full IANA names), or
/// their UTC offsets at `now` are equal. Empty names never match anything.
pub fn is_equal_zones(a: Tz, b: Tz, now: DateTime<Utc>) -> bool {
    let (a_name, b_name) = (a.name(), b.name());
    if a_name.is_empty() || b_name.is_empty() {
        return false;
    }
    if a_name.contains(b_name) || b_name.contains(a_name) {
        return true;
    }

    let a_offset = now.with_timezone(&a).offset().fix().local_minus_utc();
    let b_offset = now.with_timezone(&b).offset().fix().local_minus_utc();
    a_offset == b_offset
}

/// Short display label for a zone name: strips any `Etc/` prefix, replaces
/// underscores with spaces, and keeps the last non-empty `/`-segment.
pub fn zone_without_prefix(name: &str) -> String {
    let stripped = name.strip_prefix("Etc/").unwrap_or(name).replace('_', " ");
    match stripped.split('/').filter(|segment| !segment.is_empty()).last() {
        Some(segment) => segment.to_string(),
        None => stripped,
    }
}

/// Humanizes a future-facing duration to its largest sensible unit,
/// matching the thresholds of the original engine's time library.
fn humanize_duration(duration: chrono::Duration) -> String {
    let seconds = duration.num_seconds().max(0);
    let minutes = (seconds as f64 / 60.0).round() as i64;
    let hours = (minutes as f64 / 60.0).round() as i64;
    let days = (hours as f64 / 24.0).round() as i64;
    let months = (days as f64 / 30.436875).round() as i64;
    let years = (days as f64 / 365.25).round() as i64;

    if seconds < 45 {
        "a few seconds".to_string()
    } else if seconds < 90 {
        "a minute".to_string()
    } else if minutes < 45 {
        format!("{minutes} minutes")
    } else if minutes < 90 {
        "an hour".to_string()
    } else if hours < 22 {
        format!("{hours} hours")
    } else if hours < 36 {
        "a day".to_string()
    } else if days < 26 {
        format!("{days} days")
    } else if days < 46 {
        "a month".to_string()
    } else if days < 320 {
        format!("{months} months")
    } else if months < 18 {
        "a year".to_string()
    } else {
        format!("{years} years")
    }
}

// ── Strict literal parsing ──────────────────────────────────────────────────

/// `YYYY-MM-DD` with numeric-only components. Returns the month 0-based —
/// this is the single 1-based → 0-based conversion point.
fn parse_date(date: &str) -> Option<(i32, u32, u32)> {
    let mut parts = date.split('-');
    let year = i32::try_from(parse_component(parts.next()?)?).ok()?;
    let month: u32 = parse_component(parts.next()?)?;
    let day: u32 = parse_component(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((year, month.checked_sub(1)?, day))
}

/// `HH[:mm[:ss]]` with numeric-only components; missing components are 0.
fn parse_time(time: &str) -> Option<(u32, u32, u32)> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() > 3 {
        return None;
    }
    let hour = parse_component(parts[0])?;
    let minute = match parts.get(1) {
        Some(part) => parse_component(part)?,
        None => 0,
    };
    let second = match parts.get(2) {
        Some(part) => parse_component(part)?,
        None => 0,
    };
    Some((hour, minute, second))
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// ── Tests ───────────────────────────────────────────────────────────────────
