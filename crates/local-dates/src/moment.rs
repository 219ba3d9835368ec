//! A wall-clock date/time anchored to a named timezone.
//!
//! [`ZonedMoment`] wraps an opaque `chrono` instant and exposes only the
//! arithmetic the resolver needs: zone-aware construction, calendar-aware
//! add/subtract, reprojection into another zone, and whole-period counting
//! for recurrence fast-forwarding. The chrono types are never extended —
//! composition only.
//!
//! Construction from impossible calendar components yields an *invalid
//! moment* rather than an error: a sentinel value whose [`ZonedMoment::format`]
//! renders [`INVALID_DATE`]. Callers check [`ZonedMoment::is_valid`] before
//! trusting any derived value; every operation on an invalid moment stays
//! invalid.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::{Recurrence, RecurrenceUnit};

/// The marker string rendered for a moment that could not be constructed.
pub const INVALID_DATE: &str = "Invalid date";

/// A wall-clock instant anchored to a timezone, plus the viewer's zone.
#[derive(Debug, Clone)]
pub struct ZonedMoment {
    datetime: Option<DateTime<Tz>>,
    zone: Tz,
    viewer_zone: Tz,
}

impl ZonedMoment {
    /// Builds a moment from calendar components read in `zone`.
    ///
    /// `month0` is **0-based** (the 1-based → 0-based conversion happens
    /// exactly once, at the config boundary). Components that cannot form a
    /// real calendar date or time produce the invalid sentinel.
    pub fn create(
        year: i32,
        month0: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        zone: Tz,
        viewer_zone: Tz,
    ) -> ZonedMoment {
        let datetime = NaiveDate::from_ymd_opt(year, month0 + 1, day)
            .zip(NaiveTime::from_hms_opt(hour, minute, second))
            .and_then(|(date, time)| project_local(date.and_time(time), &zone));

        ZonedMoment {
            datetime,
            zone,
            viewer_zone,
        }
    }

    /// Whether this moment holds a real instant.
    pub fn is_valid(&self) -> bool {
        self.datetime.is_some()
    }

    /// The anchor timezone.
    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// The absolute instant, if valid.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.datetime.map(|dt| dt.with_timezone(&Utc))
    }

    /// True if this moment is strictly before `instant`. Invalid moments
    /// compare false.
    pub fn is_before(&self, instant: DateTime<Utc>) -> bool {
        self.instant().is_some_and(|i| i < instant)
    }

    /// Advances by `count` calendar units.
    ///
    /// Day and week arithmetic preserves the local wall-clock time across
    /// DST transitions; month and year arithmetic clamps the day-of-month
    /// when the target month is shorter.
    pub fn add(&self, count: i64, unit: RecurrenceUnit) -> ZonedMoment {
        let Some(dt) = self.datetime else {
            return self.clone();
        };

        let datetime = match unit {
            RecurrenceUnit::Minutes => Some(dt + chrono::Duration::minutes(count)),
            RecurrenceUnit::Hours => Some(dt + chrono::Duration::hours(count)),
            RecurrenceUnit::Days => {
                project_local(dt.naive_local() + chrono::Duration::days(count), &self.zone)
            }
            RecurrenceUnit::Weeks => {
                project_local(dt.naive_local() + chrono::Duration::days(count * 7), &self.zone)
            }
            RecurrenceUnit::Months => {
                project_local(add_months_clamped(dt.naive_local(), count), &self.zone)
            }
            RecurrenceUnit::Years => {
                project_local(add_months_clamped(dt.naive_local(), count * 12), &self.zone)
            }
        };

        ZonedMoment {
            datetime,
            zone: self.zone,
            viewer_zone: self.viewer_zone,
        }
    }

    /// Moves back by `count` calendar units. Mirror of [`ZonedMoment::add`].
    pub fn subtract(&self, count: i64, unit: RecurrenceUnit) -> ZonedMoment {
        self.add(-count, unit)
    }

    /// The same absolute instant, re-expressed in wall-clock terms for
    /// `zone`. The instant itself never changes.
    pub fn reproject_to_zone(&self, zone: Tz) -> ZonedMoment {
        ZonedMoment {
            datetime: self.datetime.map(|dt| dt.with_timezone(&zone)),
            zone,
            viewer_zone: self.viewer_zone,
        }
    }

    /// Whether the instant falls in daylight-saving time for `zone`.
    ///
    /// Compares the current offset with the January 1 (standard) offset;
    /// if they differ, DST is active.
    pub fn is_dst(&self, zone: &Tz) -> bool {
        let Some(dt) = self.datetime else {
            return false;
        };
        let utc = dt.with_timezone(&Utc);
        let local = dt.with_timezone(zone);

        let jan1 = Utc
            .with_ymd_and_hms(utc.year(), 1, 1, 12, 0, 0)
            .single()
            .unwrap_or(utc);
        let jan1_local = jan1.with_timezone(zone);

        local.offset().fix().local_minus_utc() != jan1_local.offset().fix().local_minus_utc()
    }

    /// How many whole `period`s separate this moment from `reference`.
    ///
    /// The unit difference is divided by the period count, rounded to the
    /// nearest tenth, and the absolute value truncated. A reference on
    /// either side of the moment works; an equal reference yields 0.
    pub fn repetitions_between(&self, period: &Recurrence, reference: DateTime<Utc>) -> u64 {
        let Some(dt) = self.datetime else {
            return 0;
        };

        let diff = match period.unit {
            RecurrenceUnit::Minutes => (dt.with_timezone(&Utc) - reference).num_minutes(),
            RecurrenceUnit::Hours => (dt.with_timezone(&Utc) - reference).num_hours(),
            RecurrenceUnit::Days => (dt.with_timezone(&Utc) - reference).num_days(),
            RecurrenceUnit::Weeks => (dt.with_timezone(&Utc) - reference).num_weeks(),
            RecurrenceUnit::Months => {
                whole_months_between(dt.naive_local(), reference.with_timezone(&self.zone).naive_local())
            }
            RecurrenceUnit::Years => {
                whole_months_between(dt.naive_local(), reference.with_timezone(&self.zone).naive_local())
                    / 12
            }
        };

        let repetitions = diff as f64 / period.count.max(1) as f64;
        ((repetitions * 10.0).round() / 10.0).abs().trunc() as u64
    }

    /// Renders with `pattern` in `zone`; `None` renders RFC 3339 with
    /// offset. Invalid moments render [`INVALID_DATE`].
    pub fn format(&self, pattern: Option<&str>, zone: &Tz) -> String {
        let Some(dt) = self.datetime else {
            return INVALID_DATE.to_string();
        };
        let local = dt.with_timezone(zone);
        match pattern {
            Some(p) => local.format(p).to_string(),
            None => local.to_rfc3339(),
        }
    }
}

/// Anchors a naive wall-clock value in `tz`.
///
/// An ambiguous local time (fall-back overlap) resolves to the earliest
/// mapping; a nonexistent one (spring-forward gap) shifts forward an hour.
pub(crate) fn project_local(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest().or_else(|| {
        tz.from_local_datetime(&(naive + chrono::Duration::hours(1)))
            .earliest()
    })
}

/// Adds `months` to a naive datetime, clamping the day-of-month.
fn add_months_clamped(dt: NaiveDateTime, months: i64) -> NaiveDateTime {
    if months >= 0 {
        dt.checked_add_months(Months::new(months as u32)).unwrap_or(dt)
    } else {
        dt.checked_sub_months(Months::new((-months) as u32)).unwrap_or(dt)
    }
}

/// Whole calendar months from `b` to `a`, truncated toward zero.
fn whole_months_between(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    let mut months =
        (a.year() as i64 - b.year() as i64) * 12 + (a.month() as i64 - b.month() as i64);
    if months > 0 && add_months_clamped(b, months) > a {
        months -= 1;
    } else if months < 0 && add_months_clamped(b, months) < a {
        months += 1;
    }
    months
}

// ── Tests ───────────────────────────────────────────────────────────────────
