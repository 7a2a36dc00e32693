//! Opening-hours evaluation.
//!
//! Schedules are compared in "week minutes": minutes since Sunday 00:00 in
//! the shop's local time. A period whose close falls at or before its open
//! wraps into the following week, which covers both ordinary overnight
//! periods and Saturday night into Sunday morning.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use cuppa_core::{ClockTime, Period, Shop};

const MINUTES_PER_DAY: u32 = 24 * 60;
const MINUTES_PER_WEEK: u32 = 7 * MINUTES_PER_DAY;

/// Whether `shop` is open at `now`.
///
/// Uses the weekly periods when both periods and a UTC offset are known;
/// otherwise falls back to the provider's `open_now` flag. Shops with no
/// hours at all are treated as closed.
#[must_use]
pub fn is_open_now(shop: &Shop, now: DateTime<Utc>) -> bool {
    let Some(hours) = &shop.opening_hours else {
        return false;
    };

    match shop.utc_offset_minutes {
        Some(offset) if !hours.periods.is_empty() => {
            let local = now + Duration::minutes(i64::from(offset));
            let minute = week_minute(
                local.weekday().num_days_from_sunday(),
                local.hour() * 60 + local.minute(),
            );
            hours.periods.iter().any(|p| period_contains(p, minute))
        }
        _ => hours.open_now == Some(true),
    }
}

/// Whether any of `shop`'s periods closes at or after `threshold`.
///
/// The close time is measured from midnight of the period's opening day, so
/// a close at 02:00 the next morning counts as 26:00. A 24-hour period always
/// matches; shops with no periods never do.
#[must_use]
pub fn matches_open_after(shop: &Shop, threshold: ClockTime) -> bool {
    let Some(hours) = &shop.opening_hours else {
        return false;
    };
    let threshold = threshold.minutes_since_midnight();

    hours.periods.iter().any(|period| {
        if period.is_always_open() {
            return true;
        }
        close_since_open_day(period).is_some_and(|close| close >= threshold)
    })
}

fn week_minute(day: u32, minute_of_day: u32) -> u32 {
    (day % 7) * MINUTES_PER_DAY + minute_of_day
}

fn period_contains(period: &Period, minute: u32) -> bool {
    if period.is_always_open() {
        return true;
    }
    let Some(close) = &period.close else {
        return false;
    };
    let (Some(open_min), Some(close_min)) = (period.open.minutes(), close.minutes()) else {
        return false;
    };

    let open = week_minute(u32::from(period.open.day), open_min);
    let mut end = week_minute(u32::from(close.day), close_min);
    if end <= open {
        end += MINUTES_PER_WEEK;
    }

    // `minute + MINUTES_PER_WEEK` catches the tail of a period that began
    // late in the previous week.
    (open..end).contains(&minute) || (open..end).contains(&(minute + MINUTES_PER_WEEK))
}

fn close_since_open_day(period: &Period) -> Option<u32> {
    let close = period.close.as_ref()?;
    let open_min = period.open.minutes()?;
    let close_min = close.minutes()?;

    if close.day != period.open.day || close_min <= open_min {
        Some(close_min + MINUTES_PER_DAY)
    } else {
        Some(close_min)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use cuppa_core::{Amenities, OpeningHours, TimePoint};

    use super::*;

    fn shop_with(periods: Vec<Period>, open_now: Option<bool>, offset: Option<i32>) -> Shop {
        Shop {
            id: None,
            external_id: "place".to_string(),
            name: "Test".to_string(),
            address: None,
            location: None,
            opening_hours: Some(OpeningHours {
                open_now,
                periods,
                weekday_text: vec![],
            }),
            utc_offset_minutes: offset,
            price_level: None,
            rating: None,
            photo_refs: vec![],
            amenities: Amenities::default(),
        }
    }

    fn period(open_day: u8, open: &str, close_day: u8, close: &str) -> Period {
        Period {
            open: TimePoint::new(open_day, open),
            close: Some(TimePoint::new(close_day, close)),
        }
    }

    // 2024-01-01 was a Monday.
    fn utc(day_of_jan: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day_of_jan, hour, minute, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn falls_back_to_provider_flag_without_periods() {
        let open = shop_with(vec![], Some(true), Some(0));
        let closed = shop_with(vec![], Some(false), Some(0));
        let unknown = shop_with(vec![], None, Some(0));

        assert!(is_open_now(&open, utc(1, 12, 0)));
        assert!(!is_open_now(&closed, utc(1, 12, 0)));
        assert!(!is_open_now(&unknown, utc(1, 12, 0)));
    }

    #[test]
    fn falls_back_to_provider_flag_without_offset() {
        let shop = shop_with(vec![period(1, "0900", 1, "1000")], Some(true), None);

        assert!(is_open_now(&shop, utc(1, 23, 0)));
    }

    #[test]
    fn shop_without_hours_is_closed() {
        let mut shop = shop_with(vec![], Some(true), Some(0));
        shop.opening_hours = None;

        assert!(!is_open_now(&shop, utc(1, 12, 0)));
        assert!(!matches_open_after(&shop, ClockTime::new(9, 0).unwrap()));
    }

    #[test]
    fn same_day_period_uses_local_time() {
        // Monday 09:00-17:00 local, shop at UTC+9.
        let shop = shop_with(vec![period(1, "0900", 1, "1700")], Some(false), Some(540));

        // Monday 01:00 UTC is Monday 10:00 local.
        assert!(is_open_now(&shop, utc(1, 1, 0)));
        // Monday 09:00 UTC is Monday 18:00 local.
        assert!(!is_open_now(&shop, utc(1, 9, 0)));
    }

    #[test]
    fn overnight_period_covers_early_morning_of_next_day() {
        // Monday 22:00 to Tuesday 02:00.
        let shop = shop_with(vec![period(1, "2200", 2, "0200")], None, Some(0));

        assert!(is_open_now(&shop, utc(2, 1, 0)));
        assert!(is_open_now(&shop, utc(1, 23, 30)));
        assert!(!is_open_now(&shop, utc(2, 2, 0)));
    }

    #[test]
    fn saturday_night_period_wraps_into_sunday() {
        // Saturday 22:00 to Sunday 02:00; 2024-01-07 was a Sunday.
        let shop = shop_with(vec![period(6, "2200", 0, "0200")], None, Some(0));

        assert!(is_open_now(&shop, utc(7, 1, 0)));
        assert!(is_open_now(&shop, utc(6, 23, 0)));
        assert!(!is_open_now(&shop, utc(7, 3, 0)));
    }

    #[test]
    fn always_open_period_is_open_at_any_time() {
        let shop = shop_with(
            vec![Period {
                open: TimePoint::new(0, "0000"),
                close: None,
            }],
            Some(false),
            Some(0),
        );

        assert!(is_open_now(&shop, utc(3, 4, 15)));
        assert!(matches_open_after(&shop, ClockTime::new(23, 59).unwrap()));
    }

    #[test]
    fn open_after_rejects_earlier_close() {
        let shop = shop_with(vec![period(1, "0800", 1, "2030")], None, None);

        assert!(!matches_open_after(&shop, ClockTime::new(21, 0).unwrap()));
        assert!(matches_open_after(&shop, ClockTime::new(20, 30).unwrap()));
    }

    #[test]
    fn open_after_projects_next_day_close() {
        let shop = shop_with(vec![period(1, "1800", 2, "0200")], None, None);

        let periods = &shop.opening_hours.as_ref().unwrap().periods;
        assert_eq!(close_since_open_day(&periods[0]), Some(1560));
        assert!(matches_open_after(&shop, ClockTime::new(21, 0).unwrap()));
    }

    #[test]
    fn open_after_requires_periods() {
        let shop = shop_with(vec![], Some(true), Some(0));

        assert!(!matches_open_after(&shop, ClockTime::new(9, 0).unwrap()));
    }
}
