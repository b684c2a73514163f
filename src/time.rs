//! # Calendar and Julian Date conversions
//!
//! Conversions between civil calendar dates and Julian Dates, the time
//! backbone of every propagation and search routine in this crate.
//!
//! ## Overview
//!
//! * [`CalendarDate`] – a validated Gregorian date-time (UTC civil scale),
//! * [`calendar_to_jd`] / [`jd_to_calendar`] – the Meeus algorithm and its
//!   exact inverse,
//! * [`jd_to_mjd`] / [`mjd_to_jd`] – Modified Julian Date helpers,
//! * bridges to [`hifitime::Epoch`] for callers that already use it.
//!
//! The conversions round-trip to within one second for any date in
//! [1900, 2200], and `2000-01-01T12:00:00` maps to exactly `2451545.0`
//! (the J2000.0 epoch).

use hifitime::{Epoch, TimeScale};

use crate::constants::{JulianDate, JDTOMJD, MJD};
use crate::spaceguard_errors::{Result, SpaceguardError};

/// A Gregorian calendar date and time of day, UTC civil scale.
///
/// Seconds are fractional so that sub-second instants survive a round trip
/// through [`jd_to_calendar`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: f64,
}

/// Length of a Gregorian month, leap years included.
fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29
            } else {
                28
            }
        }
    }
}

impl CalendarDate {
    /// Build a validated calendar date.
    ///
    /// Arguments
    /// ---------
    /// * `year`, `month` (1–12), `day` (1 to the month's length, leap years
    ///   included), `hour` (< 24), `minute` (< 60), `second` (< 60,
    ///   fractional).
    ///
    /// Return
    /// ------
    /// * `Ok(CalendarDate)` or [`SpaceguardError::InvalidDate`] when a field
    ///   is out of range.
    pub fn new(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: f64) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(SpaceguardError::InvalidDate(format!(
                "month {month} out of range 1..=12"
            )));
        }
        let month_length = days_in_month(year, month);
        if !(1..=month_length).contains(&day) {
            return Err(SpaceguardError::InvalidDate(format!(
                "day {day} out of range 1..={month_length} for {year:04}-{month:02}"
            )));
        }
        if hour >= 24 || minute >= 60 || !(0.0..60.0).contains(&second) {
            return Err(SpaceguardError::InvalidDate(format!(
                "time of day {hour:02}:{minute:02}:{second} out of range"
            )));
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Fraction of the day elapsed at this time, in [0, 1).
    fn day_fraction(&self) -> f64 {
        (self.hour as f64 * 3600.0 + self.minute as f64 * 60.0 + self.second) / 86_400.0
    }

    /// Convert to a [`hifitime::Epoch`] on the UTC scale.
    pub fn to_epoch(self) -> Epoch {
        let whole = self.second.trunc() as u8;
        let nanos = ((self.second - whole as f64) * 1e9) as u32;
        Epoch::from_gregorian(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            whole,
            nanos,
            TimeScale::UTC,
        )
    }

    /// Build from a [`hifitime::Epoch`], truncated to whole nanoseconds.
    pub fn from_epoch(epoch: &Epoch) -> Self {
        let (year, month, day, hour, minute, second, nanos) = epoch.to_gregorian_utc();
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second: second as f64 + nanos as f64 * 1e-9,
        }
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:06.3}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Convert a calendar date to a Julian Date with the Meeus algorithm
/// (Gregorian branch).
///
/// Arguments
/// ---------
/// * `date`: the civil date to convert.
///
/// Return
/// ------
/// * The Julian Date as a float day count.
///
/// See also
/// --------
/// * [`jd_to_calendar`] – the exact inverse.
pub fn calendar_to_jd(date: &CalendarDate) -> JulianDate {
    let mut y = date.year as f64;
    let mut m = date.month as f64;
    let d = date.day as f64 + date.day_fraction();

    if m <= 2.0 {
        y -= 1.0;
        m += 12.0;
    }

    let a = (y / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + d + b - 1524.5
}

/// Convert a Julian Date back to a calendar date (Meeus, inverse direction).
///
/// Arguments
/// ---------
/// * `jd`: the Julian Date to convert (must be finite).
///
/// Return
/// ------
/// * The civil date, with the day fraction split into hour/minute/second.
///
/// See also
/// --------
/// * [`calendar_to_jd`] – the forward direction.
pub fn jd_to_calendar(jd: JulianDate) -> Result<CalendarDate> {
    if !jd.is_finite() {
        return Err(SpaceguardError::InvalidDate(format!(
            "Julian Date {jd} is not finite"
        )));
    }

    let z = (jd + 0.5).floor();
    let f = jd + 0.5 - z;

    let a = if z < 2_299_161.0 {
        z
    } else {
        let alpha = ((z - 1_867_216.25) / 36_524.25).floor();
        z + 1.0 + alpha - (alpha / 4.0).floor()
    };

    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).floor();
    let d = (365.25 * c).floor();
    let e = ((b - d) / 30.6001).floor();

    let day_frac = b - d - (30.6001 * e).floor() + f;
    let day = day_frac.trunc();
    let fraction = day_frac - day;

    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
    let year = if month > 2.0 { c - 4716.0 } else { c - 4715.0 };

    // Split the day fraction into clock fields, keeping fractional seconds.
    let hours = fraction * 24.0;
    let hour = hours.trunc();
    let minutes = (hours - hour) * 60.0;
    let minute = minutes.trunc();
    let second = (minutes - minute) * 60.0;

    CalendarDate::new(
        year as i32,
        month as u8,
        day as u8,
        hour as u8,
        minute as u8,
        // Guard against 60.0 produced by floating-point carry.
        second.min(59.999_999_999),
    )
}

/// Transformation from julian date (JD) to modified julian date (MJD)
///
/// Argument
/// --------
/// * `jd`: a julian date
///
/// Return
/// ------
/// * the corresponding modified julian date
pub fn jd_to_mjd(jd: JulianDate) -> MJD {
    jd - JDTOMJD
}

/// Transformation from modified julian date (MJD) to julian date (JD)
///
/// Argument
/// --------
/// * `mjd`: a modified julian date
///
/// Return
/// ------
/// * the corresponding julian date
pub fn mjd_to_jd(mjd: MJD) -> JulianDate {
    mjd + JDTOMJD
}

/// Convert a [`hifitime::Epoch`] to a Julian Date on the UTC scale.
pub fn epoch_to_jd(epoch: &Epoch) -> JulianDate {
    epoch.to_jde_utc_days()
}

/// Convert a Julian Date to a [`hifitime::Epoch`] on the UTC scale.
pub fn jd_to_epoch(jd: JulianDate) -> Epoch {
    Epoch::from_jde_utc(jd)
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_j2000_is_exact() {
        let date = CalendarDate::new(2000, 1, 1, 12, 0, 0.0).unwrap();
        assert_eq!(calendar_to_jd(&date), 2451545.0);
    }

    #[test]
    fn test_known_dates() {
        // Meeus, "Astronomical Algorithms", example 7.a adapted to the
        // Gregorian branch plus a couple of round figures.
        let date = CalendarDate::new(1999, 1, 1, 0, 0, 0.0).unwrap();
        assert_eq!(calendar_to_jd(&date), 2451179.5);

        let date = CalendarDate::new(2021, 1, 1, 0, 0, 0.0).unwrap();
        assert_eq!(calendar_to_jd(&date), 2459215.5);

        let date = CalendarDate::new(1987, 6, 19, 12, 0, 0.0).unwrap();
        assert_eq!(calendar_to_jd(&date), 2446966.0);
    }

    #[test]
    fn test_jd_to_calendar_inverse() {
        let date = jd_to_calendar(2451545.0).unwrap();
        assert_eq!(date.year, 2000);
        assert_eq!(date.month, 1);
        assert_eq!(date.day, 1);
        assert_eq!(date.hour, 12);
        assert_eq!(date.minute, 0);
        assert_relative_eq!(date.second, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_round_trip_within_one_second() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let date = CalendarDate::new(
                rng.random_range(1900..=2200),
                rng.random_range(1..=12),
                rng.random_range(1..=28),
                rng.random_range(0..24),
                rng.random_range(0..60),
                rng.random_range(0.0..60.0),
            )
            .unwrap();

            let jd = calendar_to_jd(&date);
            let back = jd_to_calendar(jd).unwrap();
            let jd_back = calendar_to_jd(&back);

            // One second expressed in days.
            assert!(
                (jd - jd_back).abs() < 1.0 / 86_400.0,
                "round trip drifted by more than 1 s for {date}"
            );
        }
    }

    #[test]
    fn test_agreement_with_hifitime() {
        let date = CalendarDate::new(2021, 1, 1, 0, 0, 0.0).unwrap();
        let jd_meeus = calendar_to_jd(&date);
        let jd_hifitime = epoch_to_jd(&date.to_epoch());
        assert_relative_eq!(jd_meeus, jd_hifitime, epsilon = 1e-9);

        let back = CalendarDate::from_epoch(&jd_to_epoch(jd_meeus));
        assert_eq!(back.year, 2021);
        assert_eq!(back.month, 1);
        assert_eq!(back.day, 1);
    }

    #[test]
    fn test_mjd_helpers() {
        assert_eq!(jd_to_mjd(2459215.5), 59215.0);
        assert_eq!(mjd_to_jd(59215.0), 2459215.5);
    }

    #[test]
    fn test_invalid_dates_rejected() {
        assert!(CalendarDate::new(2021, 13, 1, 0, 0, 0.0).is_err());
        assert!(CalendarDate::new(2021, 0, 1, 0, 0, 0.0).is_err());
        assert!(CalendarDate::new(2021, 1, 32, 0, 0, 0.0).is_err());
        assert!(CalendarDate::new(2021, 1, 1, 24, 0, 0.0).is_err());
        assert!(CalendarDate::new(2021, 1, 1, 0, 0, 60.0).is_err());
        assert!(jd_to_calendar(f64::NAN).is_err());
    }

    #[test]
    fn test_day_validation_is_month_aware() {
        // Nonexistent civil dates must be rejected at construction, so the
        // hifitime bridge only ever sees valid dates.
        assert!(CalendarDate::new(2021, 2, 30, 0, 0, 0.0).is_err());
        assert!(CalendarDate::new(2021, 2, 29, 0, 0, 0.0).is_err());
        assert!(CalendarDate::new(2021, 4, 31, 0, 0, 0.0).is_err());
        assert!(CalendarDate::new(2021, 11, 31, 0, 0, 0.0).is_err());

        // Leap-year rules: divisible by 4, except centuries, except
        // those divisible by 400.
        assert!(CalendarDate::new(2020, 2, 29, 0, 0, 0.0).is_ok());
        assert!(CalendarDate::new(2000, 2, 29, 0, 0, 0.0).is_ok());
        assert!(CalendarDate::new(2100, 2, 29, 0, 0, 0.0).is_err());

        // A valid leap day survives the full epoch round trip.
        let leap_day = CalendarDate::new(2024, 2, 29, 12, 0, 0.0).unwrap();
        let back = CalendarDate::from_epoch(&leap_day.to_epoch());
        assert_eq!((back.year, back.month, back.day), (2024, 2, 29));
    }
}
