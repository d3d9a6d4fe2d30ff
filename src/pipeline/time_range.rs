use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeDelta, Utc};

use super::request::ReportRequest;

/// Inclusive report period covering one calendar month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    fn month_starting(first_day: NaiveDate) -> Self {
        let start = first_day.and_time(NaiveTime::MIN).and_utc();
        let end = first_day
            .checked_add_months(Months::new(1))
            .map(|next| next.and_time(NaiveTime::MIN).and_utc() - TimeDelta::seconds(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start, end }
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }
}

/// Report period for `request`, relative to the current time.
pub fn resolve(request: &ReportRequest) -> TimeRange {
    resolve_at(request, Utc::now())
}

/// Uses the requested month when year and month are valid together, otherwise the
/// calendar month before `now`.
pub fn resolve_at(request: &ReportRequest, now: DateTime<Utc>) -> TimeRange {
    if let (Some(year), Some(month)) = (request.year, request.month)
        && year >= 2000
        && (1..=12).contains(&month)
        && let Some(first_day) = NaiveDate::from_ymd_opt(year, month as u32, 1)
    {
        return TimeRange::month_starting(first_day);
    }

    let today = now.date_naive();
    let first_of_this_month = today.with_day(1).unwrap_or(today);
    let first_of_last_month = first_of_this_month
        .checked_sub_months(Months::new(1))
        .unwrap_or(first_of_this_month);
    TimeRange::month_starting(first_of_last_month)
}
