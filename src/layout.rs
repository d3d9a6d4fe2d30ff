//! Reference-date layouts.
//!
//! A layout is the reference time `Mon Jan 2 15:04:05 MST 2006` written the way the
//! output should look, e.g. `Report_200601` renders January 2022 as `Report_202201`.
//! Text that is not a recognised token is copied verbatim.

use chrono::{DateTime, Datelike, Timelike, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    LongYear,
    UnderLongYear,
    Year,
    LongMonth,
    Month,
    ZeroMonth,
    NumMonth,
    LongWeekday,
    Weekday,
    ZeroDay,
    UnderDay,
    Day,
    Hour,
    ZeroHour12,
    Hour12,
    ZeroMinute,
    Minute,
    ZeroSecond,
    Second,
    UpperPm,
    LowerPm,
    ZoneName,
    IsoColonZone,
    ColonZone,
    Zone,
}

// Longer tokens sharing a prefix must come first.
const TOKENS: &[(&str, Token)] = &[
    ("January", Token::LongMonth),
    ("Jan", Token::Month),
    ("Monday", Token::LongWeekday),
    ("Mon", Token::Weekday),
    ("MST", Token::ZoneName),
    ("2006", Token::LongYear),
    ("_2006", Token::UnderLongYear),
    ("_2", Token::UnderDay),
    ("01", Token::ZeroMonth),
    ("02", Token::ZeroDay),
    ("03", Token::ZeroHour12),
    ("04", Token::ZeroMinute),
    ("05", Token::ZeroSecond),
    ("06", Token::Year),
    ("15", Token::Hour),
    ("1", Token::NumMonth),
    ("2", Token::Day),
    ("3", Token::Hour12),
    ("4", Token::Minute),
    ("5", Token::Second),
    ("PM", Token::UpperPm),
    ("pm", Token::LowerPm),
    ("Z07:00", Token::IsoColonZone),
    ("-07:00", Token::ColonZone),
    ("-0700", Token::Zone),
];

/// Renders `time` according to `layout`.
pub fn format(time: &DateTime<Utc>, layout: &str) -> String {
    let mut out = String::with_capacity(layout.len() + 8);
    let mut rest = layout;

    while !rest.is_empty() {
        if let Some((text, token)) = TOKENS.iter().find(|(text, _)| rest.starts_with(text)) {
            push_token(&mut out, time, *token);
            rest = &rest[text.len()..];
            continue;
        }

        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }

    out
}

fn push_token(out: &mut String, time: &DateTime<Utc>, token: Token) {
    let hour12 = match time.hour() % 12 {
        0 => 12,
        h => h,
    };

    let rendered = match token {
        Token::LongYear => format!("{:04}", time.year()),
        Token::UnderLongYear => format!("_{:04}", time.year()),
        Token::Year => format!("{:02}", time.year().rem_euclid(100)),
        Token::LongMonth => time.format("%B").to_string(),
        Token::Month => time.format("%b").to_string(),
        Token::ZeroMonth => format!("{:02}", time.month()),
        Token::NumMonth => time.month().to_string(),
        Token::LongWeekday => time.format("%A").to_string(),
        Token::Weekday => time.format("%a").to_string(),
        Token::ZeroDay => format!("{:02}", time.day()),
        Token::UnderDay => format!("{:>2}", time.day()),
        Token::Day => time.day().to_string(),
        Token::Hour => format!("{:02}", time.hour()),
        Token::ZeroHour12 => format!("{hour12:02}"),
        Token::Hour12 => hour12.to_string(),
        Token::ZeroMinute => format!("{:02}", time.minute()),
        Token::Minute => time.minute().to_string(),
        Token::ZeroSecond => format!("{:02}", time.second()),
        Token::Second => time.second().to_string(),
        Token::UpperPm => if time.hour() >= 12 { "PM" } else { "AM" }.to_string(),
        Token::LowerPm => if time.hour() >= 12 { "pm" } else { "am" }.to_string(),
        Token::ZoneName => "UTC".to_string(),
        Token::IsoColonZone => "Z".to_string(),
        Token::ColonZone => "+00:00".to_string(),
        Token::Zone => "+0000".to_string(),
    };

    out.push_str(&rendered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn end_of_january() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 1, 31, 23, 59, 59).unwrap()
    }

    #[test]
    fn test_report_name_pattern() {
        let start = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format(&start, "Report_200601"), "Report_202201");
    }

    #[test]
    fn test_full_timestamp_layout() {
        assert_eq!(
            format(&end_of_january(), "2006-01-02T15:04:05"),
            "2022-01-31T23:59:59"
        );
    }

    #[test]
    fn test_names_and_twelve_hour_clock() {
        assert_eq!(
            format(&end_of_january(), "Mon, Jan 2 2006 at 3:04pm (MST)"),
            "Mon, Jan 31 2022 at 11:59pm (UTC)"
        );
        assert_eq!(
            format(&end_of_january(), "Monday January 02"),
            "Monday January 31"
        );
    }

    #[test]
    fn test_short_year_and_padded_day() {
        let time = Utc.with_ymd_and_hms(2009, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(format(&time, "06/1/_2 03:4:5 PM"), "09/3/ 5 07:8:9 AM");
    }

    #[test]
    fn test_underscore_before_year_is_literal() {
        let time = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(format(&time, "report_2006"), "report_2023");
    }

    #[test]
    fn test_zone_tokens_render_utc() {
        let time = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(format(&time, "15Z07:00"), "12Z");
        assert_eq!(format(&time, "15-07:00"), "12+00:00");
        assert_eq!(format(&time, "15-0700"), "12+0000");
    }

    #[test]
    fn test_plain_text_is_copied() {
        let time = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(format(&time, "överzicht"), "överzicht");
    }
}
