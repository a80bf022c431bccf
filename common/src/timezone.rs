//! Timezone-aware formatting of [`DateTime`]s.
//!
//! The offset of a zone observing DST is always derived from the formatted
//! timestamp itself, never from any process-wide "current offset" state.

use time::{
    macros::format_description, Date, Month, OffsetDateTime, PrimitiveDateTime,
    Time, UtcOffset, Weekday,
};

#[cfg(doc)]
use crate::DateTime;
use crate::DateTimeOf;

/// Timezone a [`DateTime`] may be rendered in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Timezone {
    /// Coordinated Universal Time.
    Utc,

    /// US-Eastern time (`America/New_York`), the agency's local zone.
    Eastern,
}

impl Timezone {
    /// Returns the [`UtcOffset`] of this [`Timezone`] at the provided moment.
    #[must_use]
    pub fn offset_at<Of: ?Sized>(self, at: DateTimeOf<Of>) -> UtcOffset {
        match self {
            Self::Utc => UtcOffset::UTC,
            Self::Eastern => {
                if is_eastern_dst(at.into()) {
                    UtcOffset::from_hms(-4, 0, 0).expect("valid offset")
                } else {
                    UtcOffset::from_hms(-5, 0, 0).expect("valid offset")
                }
            }
        }
    }

    /// Returns the abbreviation of this [`Timezone`] at the provided moment.
    #[must_use]
    pub fn abbreviation<Of: ?Sized>(self, at: DateTimeOf<Of>) -> &'static str {
        match self {
            Self::Utc => "UTC",
            Self::Eastern => {
                if is_eastern_dst(at.into()) {
                    "EDT"
                } else {
                    "EST"
                }
            }
        }
    }
}

/// Formats the provided [`DateTime`] in the provided [`Timezone`] as
/// `MM/DD/YYYY hh:mm AM|PM <zone>`.
#[expect(clippy::missing_panics_doc, reason = "infallible")]
#[must_use]
pub fn format<Of: ?Sized>(dt: DateTimeOf<Of>, tz: Timezone) -> String {
    let local =
        OffsetDateTime::from(dt).to_offset(tz.offset_at(dt));
    let formatted = local
        .format(format_description!(
            "[month]/[day]/[year] [hour repr:12]:[minute] [period]"
        ))
        .unwrap_or_else(|e| panic!("cannot format `DateTime`: {e}"));
    format!("{formatted} {}", tz.abbreviation(dt))
}

/// Formats the provided [`DateTime`] in the provided [`Timezone`] as a
/// compact `YYYYMMDDTHHMMSS` calendar stamp (no zone suffix).
#[expect(clippy::missing_panics_doc, reason = "infallible")]
#[must_use]
pub fn format_stamp<Of: ?Sized>(dt: DateTimeOf<Of>, tz: Timezone) -> String {
    OffsetDateTime::from(dt)
        .to_offset(tz.offset_at(dt))
        .format(format_description!(
            "[year][month][day]T[hour][minute][second]"
        ))
        .unwrap_or_else(|e| panic!("cannot format `DateTime`: {e}"))
}

/// Checks whether US-Eastern time observes DST at the provided UTC moment.
///
/// DST runs from the second Sunday of March, 02:00 EST (07:00 UTC), until
/// the first Sunday of November, 02:00 EDT (06:00 UTC).
fn is_eastern_dst(at: OffsetDateTime) -> bool {
    let at = at.to_offset(UtcOffset::UTC);
    let year = at.year();

    let start = PrimitiveDateTime::new(
        nth_sunday(year, Month::March, 2),
        Time::from_hms(7, 0, 0).expect("valid time"),
    )
    .assume_utc();
    let end = PrimitiveDateTime::new(
        nth_sunday(year, Month::November, 1),
        Time::from_hms(6, 0, 0).expect("valid time"),
    )
    .assume_utc();

    at >= start && at < end
}

/// Returns the `n`-th Sunday of the provided month (1-based `n`).
fn nth_sunday(year: i32, month: Month, n: u8) -> Date {
    let first = Date::from_calendar_date(year, month, 1).expect("valid date");
    let to_sunday =
        Weekday::Sunday.number_days_from_monday() + 7
            - first.weekday().number_days_from_monday();
    let day = 1 + to_sunday % 7 + 7 * (n - 1);
    Date::from_calendar_date(year, month, day).expect("valid date")
}

#[cfg(test)]
mod spec {
    use time::{Month, UtcOffset};

    use crate::DateTime;

    use super::{format, format_stamp, nth_sunday, Timezone};

    fn at(rfc3339: &str) -> DateTime {
        DateTime::from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn finds_nth_sunday() {
        assert_eq!(nth_sunday(2025, Month::March, 2).day(), 9);
        assert_eq!(nth_sunday(2025, Month::November, 1).day(), 2);
        assert_eq!(nth_sunday(2026, Month::March, 2).day(), 8);
        assert_eq!(nth_sunday(2026, Month::November, 1).day(), 1);
    }

    #[test]
    fn eastern_standard_in_winter() {
        let dt = at("2025-01-15T12:00:00Z");
        assert_eq!(
            Timezone::Eastern.offset_at(dt),
            UtcOffset::from_hms(-5, 0, 0).unwrap(),
        );
        assert_eq!(Timezone::Eastern.abbreviation(dt), "EST");
    }

    #[test]
    fn eastern_daylight_in_summer() {
        let dt = at("2025-07-04T12:00:00Z");
        assert_eq!(
            Timezone::Eastern.offset_at(dt),
            UtcOffset::from_hms(-4, 0, 0).unwrap(),
        );
        assert_eq!(Timezone::Eastern.abbreviation(dt), "EDT");
    }

    #[test]
    fn dst_boundaries() {
        // 2025 spring-forward moment is 2025-03-09T07:00:00Z.
        assert_eq!(
            Timezone::Eastern.abbreviation(at("2025-03-09T06:59:59Z")),
            "EST",
        );
        assert_eq!(
            Timezone::Eastern.abbreviation(at("2025-03-09T07:00:00Z")),
            "EDT",
        );

        // 2025 fall-back moment is 2025-11-02T06:00:00Z.
        assert_eq!(
            Timezone::Eastern.abbreviation(at("2025-11-02T05:59:59Z")),
            "EDT",
        );
        assert_eq!(
            Timezone::Eastern.abbreviation(at("2025-11-02T06:00:00Z")),
            "EST",
        );
    }

    #[test]
    fn formats_calendar_stamps() {
        let dt = at("2025-07-04T23:30:00Z");
        assert_eq!(format_stamp(dt, Timezone::Eastern), "20250704T193000");
        assert_eq!(format_stamp(dt, Timezone::Utc), "20250704T233000");
    }

    #[test]
    fn formats_in_zone() {
        assert_eq!(
            format(at("2025-01-15T12:00:00Z"), Timezone::Eastern),
            "01/15/2025 07:00 AM EST",
        );
        assert_eq!(
            format(at("2025-07-04T23:30:00Z"), Timezone::Eastern),
            "07/04/2025 07:30 PM EDT",
        );
        assert_eq!(
            format(at("2025-07-04T23:30:00Z"), Timezone::Utc),
            "07/04/2025 11:30 PM UTC",
        );
    }
}
