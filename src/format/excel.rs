use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_xlsxwriter::{Color, Format, Workbook};

use super::{Formatter, hours_minutes, signed_hours_minutes};
use crate::layout;
use crate::report::{DailyReport, Locale, MonthlyReport};

const DEFAULT_DATE_LAYOUT: &str = "2006-01-02";
const HEADER_ROW: u32 = 3;
const COLUMNS: [(&str, f64); 7] = [
    ("Date", 14.0),
    ("Weekday", 10.0),
    ("Start", 8.0),
    ("End", 8.0),
    ("Break", 8.0),
    ("Working Time", 14.0),
    ("Notes", 30.0),
];

/// Writes a monthly report as a single worksheet workbook.
#[derive(Debug, Clone)]
pub struct ExcelFormatter {
    date_layout: String,
}

impl ExcelFormatter {
    pub fn new(locale: &Locale) -> Self {
        Self {
            date_layout: locale
                .date_format
                .clone()
                .unwrap_or_else(|| DEFAULT_DATE_LAYOUT.to_string()),
        }
    }

    fn date_cell(&self, date: NaiveDate) -> String {
        layout::format(&date.and_time(NaiveTime::MIN).and_utc(), &self.date_layout)
    }
}

fn time_cell(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| layout::format(&t, "15:04")).unwrap_or_default()
}

fn notes(day: &DailyReport) -> String {
    if let Some(holiday) = &day.holiday {
        holiday.clone()
    } else if day.incomplete {
        "Incomplete".to_string()
    } else if day.is_weekend() {
        "Weekend".to_string()
    } else {
        String::new()
    }
}

impl Formatter for ExcelFormatter {
    #[tracing::instrument(
        name = "report.render",
        skip_all,
        fields(report.format = "excel", report.bytes)
    )]
    fn render(&self, report: &MonthlyReport) -> anyhow::Result<Vec<u8>> {
        let bold = Format::new().set_bold();
        let header = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(0xD9E1F2));
        let off_day = Format::new().set_background_color(Color::RGB(0xF2F2F2));

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        let period = NaiveDate::from_ymd_opt(report.year, report.month, 1)
            .with_context(|| format!("Invalid report month {}-{}", report.year, report.month))?
            .and_time(NaiveTime::MIN)
            .and_utc();
        worksheet.set_name(layout::format(&period, "2006-01"))?;
        worksheet.write_string_with_format(0, 0, "Time Tracking Report", &bold)?;
        worksheet.write_string(0, 2, layout::format(&period, "January 2006"))?;
        worksheet.write_string(1, 0, "Country")?;
        worksheet.write_string(1, 2, report.country.to_uppercase())?;

        for (col, (title, width)) in COLUMNS.iter().enumerate() {
            let col = col as u16;
            worksheet.set_column_width(col, *width)?;
            worksheet.write_string_with_format(HEADER_ROW, col, *title, &header)?;
        }

        let mut row = HEADER_ROW + 1;
        for day in &report.days {
            let cells = [
                self.date_cell(day.date),
                layout::format(&day.date.and_time(NaiveTime::MIN).and_utc(), "Mon"),
                time_cell(day.start),
                time_cell(day.end),
                hours_minutes(day.break_time),
                hours_minutes(day.working_time),
                notes(day),
            ];
            for (col, value) in cells.into_iter().enumerate() {
                if day.is_workday() {
                    worksheet.write_string(row, col as u16, value)?;
                } else {
                    worksheet.write_string_with_format(row, col as u16, value, &off_day)?;
                }
            }
            row += 1;
        }

        row += 1;
        let totals = [
            ("Total", hours_minutes(report.total_working_time())),
            ("Expected", hours_minutes(report.expected_working_time())),
            ("Balance", signed_hours_minutes(report.balance_seconds())),
            ("Days worked", report.days_worked().to_string()),
        ];
        for (label, value) in totals {
            worksheet.write_string_with_format(row, 0, label, &bold)?;
            worksheet.write_string(row, 5, value)?;
            row += 1;
        }

        let buffer = workbook.save_to_buffer()?;
        tracing::Span::current().record("report.bytes", buffer.len());
        Ok(buffer)
    }

    fn file_extension(&self) -> &str {
        ".xlsx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Calculator, ReportCalculator};
    use crate::timetracker::RecordType;

    #[test]
    fn test_render_produces_workbook() {
        let locale = Locale::default();
        let report = ReportCalculator::new(locale.clone())
            .monthly_report(&[], 2022, 1, RecordType::Workday)
            .unwrap();

        let formatter = ExcelFormatter::new(&locale);
        let bytes = formatter.render(&report).unwrap();

        // xlsx files are zip archives
        assert!(bytes.starts_with(b"PK"));
        assert_eq!(formatter.file_extension(), ".xlsx");
    }

    #[test]
    fn test_date_cell_uses_locale_layout() {
        let locale = Locale {
            date_format: Some("02.01.2006".into()),
            ..Locale::default()
        };
        let formatter = ExcelFormatter::new(&locale);
        let date = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        assert_eq!(formatter.date_cell(date), "03.01.2022");
        assert_eq!(
            ExcelFormatter::new(&Locale::default()).date_cell(date),
            "2022-01-03"
        );
    }

    #[test]
    fn test_notes() {
        let mut day = DailyReport {
            date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            start: None,
            end: None,
            break_time: Default::default(),
            working_time: Default::default(),
            incomplete: false,
            holiday: None,
        };
        assert_eq!(notes(&day), "Weekend");
        day.holiday = Some("Neujahr".into());
        assert_eq!(notes(&day), "Neujahr");
    }
}
