use chrono::{Datelike, NaiveDate, Weekday};

/// Working days in a single week
pub const WORKING_DAYS_PER_WEEK: i64 = 5;

/// Calendar days in a single week
const DAYS_PER_WEEK: i64 = 7;

/// Whole days elapsed between `epoch` and `date` (negative before the epoch)
#[inline]
fn elapsed_days(date: NaiveDate, epoch: NaiveDate) -> i64 {
    (date - epoch).num_days()
}

/// Check if nobody should be matched on `date`
///
/// Saturdays and Sundays are always off; any other day is off only when
/// listed in `days_off`. No other holidays are inferred.
pub fn is_non_working_day(date: NaiveDate, days_off: &[NaiveDate]) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun) || days_off.contains(&date)
}

/// Check if `date` opens a new rotation period
///
/// Periods are `week_period * 7` calendar days long and aligned on `epoch`,
/// so the epoch itself always starts a period.
pub fn is_period_reset(date: NaiveDate, epoch: NaiveDate, week_period: u32) -> bool {
    let period_days = i64::from(week_period.max(1)) * DAYS_PER_WEEK;
    elapsed_days(date, epoch).rem_euclid(period_days) == 0
}

/// Number of working days left in the current period, today included
///
/// Assumes `epoch` falls on a Monday. Weekends are removed from the elapsed
/// day count two days per full week, so the value holds flat from Friday
/// to Saturday and Sunday. The result is always in `1..=week_period * 5`.
pub fn working_days_remaining(date: NaiveDate, epoch: NaiveDate, week_period: u32) -> u32 {
    let budget = i64::from(week_period.max(1)) * WORKING_DAYS_PER_WEEK;
    let elapsed = elapsed_days(date, epoch);
    let weekend_days = elapsed.div_euclid(DAYS_PER_WEEK) * 2;
    let remaining = budget - (elapsed - weekend_days).rem_euclid(budget);

    // `remaining` is bounded by `budget`, which comes from a u32
    remaining as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_weekend_is_off() {
        assert!(!is_non_working_day(date("2018-06-11"), &[]));
        assert!(!is_non_working_day(date("2018-06-15"), &[]));
        assert!(is_non_working_day(date("2018-06-16"), &[]));
        assert!(is_non_working_day(date("2018-06-17"), &[]));
    }

    #[test]
    fn test_listed_holiday_is_off() {
        let days_off = vec![date("2018-08-15"), date("2018-12-25")];
        assert!(is_non_working_day(date("2018-12-25"), &days_off));
        assert!(!is_non_working_day(date("2018-12-26"), &days_off));
    }

    #[test]
    fn test_reset_on_period_boundaries() {
        let epoch = date("2018-06-11");
        assert!(is_period_reset(date("2018-06-11"), epoch, 2));
        assert!(!is_period_reset(date("2018-06-12"), epoch, 2));
        assert!(!is_period_reset(date("2018-06-18"), epoch, 2));
        assert!(is_period_reset(date("2018-06-25"), epoch, 2));
    }

    #[test]
    fn test_reset_every_monday_for_weekly_period() {
        let epoch = date("2018-06-11");
        assert!(is_period_reset(date("2018-06-18"), epoch, 1));
        assert!(!is_period_reset(date("2018-06-19"), epoch, 1));
    }

    #[test]
    fn test_days_remaining_one_week() {
        let epoch = date("2018-06-11");
        assert_eq!(working_days_remaining(date("2018-06-11"), epoch, 1), 5);
        assert_eq!(working_days_remaining(date("2018-06-12"), epoch, 1), 4);
        assert_eq!(working_days_remaining(date("2018-06-15"), epoch, 1), 1);
        assert_eq!(working_days_remaining(date("2018-06-20"), epoch, 1), 3);
    }

    #[test]
    fn test_days_remaining_two_weeks() {
        let epoch = date("2018-06-11");
        assert_eq!(working_days_remaining(date("2018-06-11"), epoch, 2), 10);
        assert_eq!(working_days_remaining(date("2018-06-12"), epoch, 2), 9);
        assert_eq!(working_days_remaining(date("2018-06-15"), epoch, 2), 6);
        assert_eq!(working_days_remaining(date("2018-06-20"), epoch, 2), 3);
        assert_eq!(working_days_remaining(date("2018-06-22"), epoch, 2), 1);
        assert_eq!(working_days_remaining(date("2018-06-25"), epoch, 2), 10);
    }

    #[test]
    fn test_days_remaining_at_epoch_is_full_budget() {
        let epoch = date("2018-06-11");
        for week_period in 1..=4 {
            assert_eq!(
                working_days_remaining(epoch, epoch, week_period),
                week_period * 5
            );
        }
    }

    #[test]
    fn test_friday_to_monday_skips_weekend() {
        let epoch = date("2018-06-11");
        // Friday of week one, then Monday of week two in a two-week period
        let friday = working_days_remaining(date("2018-06-15"), epoch, 2);
        let monday = working_days_remaining(date("2018-06-18"), epoch, 2);
        assert_eq!(friday - monday, 1);
    }

    #[test]
    fn test_days_remaining_is_never_zero() {
        let epoch = date("2018-06-11");
        let mut day = epoch;
        for _ in 0..60 {
            let remaining = working_days_remaining(day, epoch, 2);
            assert!((1..=10).contains(&remaining));
            day = day.succ_opt().unwrap();
        }
    }
}
