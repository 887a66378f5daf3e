use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Weekday};

// ---------------------------------------------------------------------------
// Calendar arithmetic
// ---------------------------------------------------------------------------

/// Add a whole number of days. Negative values move backwards.
pub fn add_days(dt: NaiveDateTime, days: i64) -> NaiveDateTime {
    dt.checked_add_signed(Duration::days(days)).unwrap_or(dt)
}

/// Add calendar months, clamping the day to the length of the target
/// month (Jan 31 + 1 month is Feb 29 in a leap year, Feb 28 otherwise).
pub fn add_months(dt: NaiveDateTime, months: u32) -> NaiveDateTime {
    dt.checked_add_months(Months::new(months)).unwrap_or(dt)
}

/// Add calendar years. Feb 29 clamps to Feb 28 in non-leap years.
pub fn add_years(dt: NaiveDateTime, years: u32) -> NaiveDateTime {
    dt.checked_add_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(dt)
}

// ---------------------------------------------------------------------------
// Week and month boundaries
// ---------------------------------------------------------------------------

/// Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(back)
}

/// Next occurrence of `target` strictly after `today`. Asking for
/// today's own weekday lands a full week out.
pub fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let ahead = (target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let ahead = if ahead == 0 { 7 } else { ahead };
    today + Duration::days(ahead)
}

/// First day of the month after the one containing `date`.
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_next_month(date) - Duration::days(1)
}

// ---------------------------------------------------------------------------
// Component differences
// ---------------------------------------------------------------------------

/// Difference in calendar months, counting year and month components
/// only. Days within the month are ignored.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32
}

/// Difference in calendar years, counting the year component only.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    to.year() - from.year()
}
