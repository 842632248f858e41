//! Booking price computation
//!
//! The price of a booking is the elapsed time in hours multiplied by the
//! location's hourly rate, expressed in integer cents. Elapsed time is counted
//! in whole minutes and the cent amount is truncated, never rounded.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Compute the price in cents for the interval `[start, end)` at `price_per_hour`.
///
/// The caller guarantees `end > start` and a positive rate. Partial minutes are
/// dropped before conversion, so 90 minutes and 30 seconds bill as 1.5 hours.
pub fn price_cents(start: DateTime<Utc>, end: DateTime<Utc>, price_per_hour: Decimal) -> i64 {
    let minutes = (end - start).num_minutes().max(0);
    // minutes / 60 is inexact in decimal, so divide last
    let cents = price_per_hour * Decimal::from(minutes) * Decimal::ONE_HUNDRED / Decimal::from(60);

    cents.trunc().to_i64().unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::str::FromStr;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, hour, minute, 0).unwrap()
    }

    fn rate(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_ninety_minutes_at_five_per_hour() {
        assert_eq!(price_cents(at(10, 0), at(11, 30), rate("5.00")), 750);
    }

    #[test]
    fn test_two_hours_at_ten_per_hour() {
        assert_eq!(price_cents(at(9, 0), at(11, 0), rate("10.00")), 2000);
    }

    #[test]
    fn test_fractional_cents_are_truncated() {
        // 10 minutes at 3.33/h = 55.5 cents
        assert_eq!(price_cents(at(9, 0), at(9, 10), rate("3.33")), 55);
    }

    #[test]
    fn test_thirds_of_an_hour_bill_exactly() {
        assert_eq!(price_cents(at(9, 0), at(9, 20), rate("3.00")), 100);
        assert_eq!(price_cents(at(9, 0), at(9, 40), rate("3.00")), 200);
        assert_eq!(price_cents(at(9, 0), at(9, 10), rate("6.00")), 100);
    }

    #[test]
    fn test_partial_minutes_are_ignored() {
        let start = at(9, 0);
        let end = start + Duration::minutes(90) + Duration::seconds(59);
        assert_eq!(price_cents(start, end, rate("5.00")), 750);
    }

    #[test]
    fn test_multi_day_booking() {
        let start = at(0, 0);
        let end = start + Duration::days(3);
        assert_eq!(price_cents(start, end, rate("2.50")), 72 * 250);
    }
}
