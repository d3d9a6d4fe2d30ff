pub mod excel;

use std::time::Duration;

pub use excel::ExcelFormatter;

use crate::report::MonthlyReport;

/// Renders a monthly report into a downloadable artifact.
pub trait Formatter: Send + Sync {
    fn render(&self, report: &MonthlyReport) -> anyhow::Result<Vec<u8>>;

    /// Extension including the leading dot, e.g. `.xlsx`.
    fn file_extension(&self) -> &str;
}

/// Formats a duration as `H:MM`.
pub(crate) fn hours_minutes(duration: Duration) -> String {
    let minutes = duration.as_secs() / 60;
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// Formats a signed number of seconds as `+H:MM` / `-H:MM`.
pub(crate) fn signed_hours_minutes(seconds: i64) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    format!(
        "{sign}{}",
        hours_minutes(Duration::from_secs(seconds.unsigned_abs()))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_minutes() {
        assert_eq!(hours_minutes(Duration::ZERO), "0:00");
        assert_eq!(hours_minutes(Duration::from_secs(6 * 3600 + 5 * 60 + 59)), "6:05");
        assert_eq!(hours_minutes(Duration::from_secs(170 * 3600)), "170:00");
    }

    #[test]
    fn test_signed_hours_minutes() {
        assert_eq!(signed_hours_minutes(0), "+0:00");
        assert_eq!(signed_hours_minutes(-(8 * 3600 + 30 * 60)), "-8:30");
        assert_eq!(signed_hours_minutes(90 * 60), "+1:30");
    }
}
