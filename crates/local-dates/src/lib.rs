//! # local-dates
//!
//! Timezone-aware local date resolution.
//!
//! Given a date tag's configuration — a calendar date, an optional time and
//! anchor timezone, an optional recurrence period, and a set of preview
//! timezones — this crate computes the correctly-localized, possibly
//! recurring, possibly range, possibly countdown representation of that
//! moment for an arbitrary viewer: a short rendered string plus a
//! multi-timezone preview list.
//!
//! All computation is pure and deterministic: the caller supplies the
//! viewer's timezone and the "now" instant explicitly, and no call touches
//! the system clock or any global locale state.
//!
//! ## Modules
//!
//! - [`moment`] — [`ZonedMoment`]: a wall-clock instant anchored to a zone,
//!   with calendar-aware arithmetic and reprojection
//! - [`resolver`] — [`LocalDateResolver`]: the resolution and formatting
//!   engine
//! - [`config`] — [`DateConfig`]: typed configuration, parsed once from the
//!   markup parser's attribute record
//! - [`i18n`] — the [`Translate`] capability and a catalog implementation
//! - [`error`] — error types
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use local_dates::{Catalog, DateConfig, LocalDateResolver};
//!
//! let mut config = DateConfig::new("2021-05-04");
//! config.time = Some("15:00".to_string());
//! config.timezone = Some(chrono_tz::Europe::Paris);
//!
//! let catalog = Catalog::english();
//! let resolver = LocalDateResolver::new(&config, chrono_tz::America::New_York, &catalog);
//! let now = Utc.with_ymd_and_hms(2021, 5, 1, 12, 0, 0).unwrap();
//!
//! let resolved = resolver.build(now);
//! assert_eq!(resolved.formatted, "May 4, 2021 9:00 AM (New York)");
//! assert_eq!(resolved.previews[0].timezone, "New York");
//! assert!(resolved.previews[0].current);
//! ```

pub mod config;
pub mod error;
pub mod i18n;
pub mod moment;
pub mod resolver;

pub use config::{DateConfig, Recurrence, RecurrenceUnit};
pub use error::LocalDateError;
pub use i18n::{Catalog, Translate};
pub use moment::{ZonedMoment, INVALID_DATE};
pub use resolver::{
    is_equal_zones, zone_without_prefix, LocalDateResolver, PreviewRow, ResolvedLocalDate,
    DATE_FORMAT, DATE_TIME_FORMAT,
};
