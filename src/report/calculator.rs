use std::collections::BTreeMap;

use anyhow::Context;
use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::{Calculator, DailyReport, Locale, MonthlyReport};
use crate::timetracker::{RecordType, TimeTrackingRecord};

/// Working time per day is the span between the first and the last capture of the
/// day, minus the break the locale requires for that span.
#[derive(Debug, Clone)]
pub struct ReportCalculator {
    locale: Locale,
}

impl ReportCalculator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    fn daily_report(&self, date: NaiveDate, captures: Option<&Vec<DateTime<Utc>>>) -> DailyReport {
        let mut report = DailyReport {
            date,
            start: None,
            end: None,
            break_time: std::time::Duration::ZERO,
            working_time: std::time::Duration::ZERO,
            incomplete: false,
            holiday: None,
        };

        let Some(captures) = captures else {
            return report;
        };
        let (Some(first), Some(last)) = (captures.iter().min(), captures.iter().max()) else {
            return report;
        };

        report.start = Some(*first);
        report.end = Some(*last);
        if captures.len() < 2 {
            report.incomplete = true;
            return report;
        }

        let span = (*last - *first).to_std().unwrap_or_default();
        report.break_time = self.locale.break_for(span);
        report.working_time = span.saturating_sub(report.break_time);
        report
    }
}

impl Calculator for ReportCalculator {
    #[tracing::instrument(
        name = "report.calculate",
        skip(self, records),
        fields(report.records = records.len(), report.days_worked)
    )]
    fn monthly_report(
        &self,
        records: &[TimeTrackingRecord],
        year: i32,
        month: u32,
        classification: RecordType,
    ) -> anyhow::Result<MonthlyReport> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .with_context(|| format!("Invalid report month {year}-{month}"))?;

        let mut captures: BTreeMap<NaiveDate, Vec<DateTime<Utc>>> = BTreeMap::new();
        for record in records.iter().filter(|r| r.record_type == classification) {
            let date = record.timestamp.date_naive();
            if date.year() == year && date.month() == month {
                captures.entry(date).or_default().push(record.timestamp);
            }
        }

        let days: Vec<DailyReport> = first_day
            .iter_days()
            .take_while(|date| date.month() == month)
            .map(|date| self.daily_report(date, captures.get(&date)))
            .collect();

        let report = MonthlyReport {
            year,
            month,
            classification,
            country: self.locale.country.clone(),
            default_work_time: self.locale.default_work_time,
            days,
            holidays: Vec::new(),
        };

        tracing::Span::current().record("report.days_worked", report.days_worked());

        Ok(report)
    }
}
