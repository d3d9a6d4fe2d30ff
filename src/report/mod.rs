pub mod calculator;

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::Serialize;

use crate::calendar::Holiday;
use crate::timetracker::{RecordType, TimeTrackingRecord};

pub use calculator::ReportCalculator;

/// Country specific settings affecting report calculation and rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub country: String,
    pub timezone: Option<String>,
    /// Reference-date layout for dates in rendered reports.
    pub date_format: Option<String>,
    pub default_work_time: Duration,
    /// Break time required once the working time reaches the key.
    pub breaks: BTreeMap<Duration, Duration>,
}

impl Locale {
    pub fn break_for(&self, working_time: Duration) -> Duration {
        self.breaks
            .range(..=working_time)
            .next_back()
            .map(|(_, break_time)| *break_time)
            .unwrap_or_default()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            country: "de".to_string(),
            timezone: None,
            date_format: None,
            default_work_time: Duration::from_secs(8 * 60 * 60),
            breaks: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub break_time: Duration,
    pub working_time: Duration,
    /// A single capture without a matching start or end.
    pub incomplete: bool,
    pub holiday: Option<String>,
}

impl DailyReport {
    pub fn is_weekend(&self) -> bool {
        matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn is_workday(&self) -> bool {
        !self.is_weekend() && self.holiday.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub classification: RecordType,
    pub country: String,
    pub default_work_time: Duration,
    /// One entry per calendar day.
    pub days: Vec<DailyReport>,
    pub holidays: Vec<Holiday>,
}

impl MonthlyReport {
    /// Marks matching days as holidays. Holidays outside the report month are ignored.
    pub fn with_holidays(mut self, holidays: Vec<Holiday>) -> Self {
        for day in &mut self.days {
            if let Some(holiday) = holidays.iter().find(|h| h.date == day.date) {
                day.holiday = Some(holiday.name.clone());
            }
        }
        self.holidays = holidays
            .into_iter()
            .filter(|h| h.date.year() == self.year && h.date.month() == self.month)
            .collect();
        self
    }

    pub fn total_working_time(&self) -> Duration {
        self.days.iter().map(|d| d.working_time).sum()
    }

    pub fn expected_working_time(&self) -> Duration {
        let workdays = self.days.iter().filter(|d| d.is_workday()).count() as u32;
        self.default_work_time * workdays
    }

    /// Worked minus expected time, in seconds.
    pub fn balance_seconds(&self) -> i64 {
        self.total_working_time().as_secs() as i64 - self.expected_working_time().as_secs() as i64
    }

    pub fn days_worked(&self) -> usize {
        self.days.iter().filter(|d| d.start.is_some()).count()
    }
}

/// Turns time tracking records into a monthly report.
pub trait Calculator: Send + Sync {
    fn monthly_report(
        &self,
        records: &[TimeTrackingRecord],
        year: i32,
        month: u32,
        classification: RecordType,
    ) -> anyhow::Result<MonthlyReport>;
}
