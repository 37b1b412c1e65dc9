use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};

/// Resolves the booking time from the current timestamp, an optional
/// `hour[:minute]` token and the recognized time-period keywords.
///
/// The day-offset keywords and the time-of-day keywords are two independent
/// chains; within each chain the first matching rule wins, and both chains
/// apply to the same timestamp.
pub fn resolve(now: NaiveDateTime, date_time: Option<&str>, periods: &[String]) -> NaiveDateTime {
    let clock = date_time
        .and_then(|token| apply_clock_token(now, token))
        .unwrap_or(now);
    let dated = apply_day_offset(clock, periods);
    let timed = apply_time_of_day(dated, periods);

    timed
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timed)
}

/// `" am 5.3. um 09:05 Uhr"`
pub fn render(dt: NaiveDateTime) -> String {
    format!(" am {}.{}. um {} Uhr", dt.day(), dt.month(), dt.format("%H:%M"))
}

fn has(periods: &[String], keyword: &str) -> bool {
    periods.iter().any(|p| p == keyword)
}

fn apply_clock_token(dt: NaiveDateTime, token: &str) -> Option<NaiveDateTime> {
    let mut parts = token.split(':');
    let hour: i64 = parts.next()?.trim().parse().ok()?;
    let minute: i64 = match parts.next() {
        Some(m) => m.trim().parse().ok()?,
        None => 0,
    };
    with_clock(dt, hour, minute)
}

/// Sets hour and minute relative to midnight of the same day, so values out
/// of range roll over into neighbouring days.
fn with_clock(dt: NaiveDateTime, hour: i64, minute: i64) -> Option<NaiveDateTime> {
    dt.date()
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::try_hours(hour)?)?
        .checked_add_signed(Duration::try_minutes(minute)?)
}

fn at(dt: NaiveDateTime, hour: i64, minute: i64) -> NaiveDateTime {
    with_clock(dt, hour, minute).unwrap_or(dt)
}

fn shift_days(dt: NaiveDateTime, days: i64) -> NaiveDateTime {
    dt.checked_add_signed(Duration::days(days)).unwrap_or(dt)
}

fn apply_day_offset(dt: NaiveDateTime, periods: &[String]) -> NaiveDateTime {
    if has(periods, "gestern") {
        shift_days(dt, -1)
    } else if has(periods, "morgen") && !has(periods, "morgens") {
        shift_days(dt, 1)
    } else if has(periods, "morgen") && has(periods, "morgens") {
        at(shift_days(dt, 1), 9, 0)
    } else if has(periods, "übermorgen") || has(periods, "über morgen") {
        shift_days(dt, 2)
    } else {
        dt
    }
}

fn apply_time_of_day(dt: NaiveDateTime, periods: &[String]) -> NaiveDateTime {
    if has(periods, "abend") || has(periods, "abends") {
        at(dt, 18, 0)
    } else if has(periods, "mittag") || has(periods, "mittags") {
        at(dt, 13, 0)
    } else if has(periods, "nachmittag")
        || has(periods, "nachmittags")
        || has(periods, "nach mittags")
    {
        at(dt, 15, 30)
    } else if has(periods, "morgens") || has(periods, "früh") {
        at(dt, 9, 0)
    } else if has(periods, "gleich") {
        // 10:50 -> 11:05, 10:20 -> 10:35
        dt.checked_add_signed(Duration::minutes(15)).unwrap_or(dt)
    } else {
        dt
    }
}
