use std::fmt;

use serde::Deserialize;

use crate::error::ReportError;

/// Enum values arrive either by name or by number; `null` means unset.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnumValue {
    Null(()),
    Number(i64),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "EnumValue")]
pub enum ReportFormat {
    #[default]
    NoFormat,
    Excel,
    Unknown(String),
}

impl From<EnumValue> for ReportFormat {
    fn from(value: EnumValue) -> Self {
        match value {
            EnumValue::Null(()) | EnumValue::Number(0) => ReportFormat::NoFormat,
            EnumValue::Number(1) => ReportFormat::Excel,
            EnumValue::Number(n) => ReportFormat::Unknown(n.to_string()),
            EnumValue::Name(name) => match name.as_str() {
                "" | "NO_FORMAT" => ReportFormat::NoFormat,
                "EXCEL" => ReportFormat::Excel,
                _ => ReportFormat::Unknown(name),
            },
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::NoFormat => f.write_str("NO_FORMAT"),
            ReportFormat::Excel => f.write_str("EXCEL"),
            ReportFormat::Unknown(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "EnumValue")]
pub enum ReportType {
    #[default]
    NoType,
    MonthlyReport,
    Unknown(String),
}

impl From<EnumValue> for ReportType {
    fn from(value: EnumValue) -> Self {
        match value {
            EnumValue::Null(()) | EnumValue::Number(0) => ReportType::NoType,
            EnumValue::Number(1) => ReportType::MonthlyReport,
            EnumValue::Number(n) => ReportType::Unknown(n.to_string()),
            EnumValue::Name(name) => match name.as_str() {
                "" | "NO_TYPE" => ReportType::NoType,
                "MONTHLY_REPORT" => ReportType::MonthlyReport,
                _ => ReportType::Unknown(name),
            },
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::NoType => f.write_str("NO_TYPE"),
            ReportType::MonthlyReport => f.write_str("MONTHLY_REPORT"),
            ReportType::Unknown(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct S3Target {
    pub region: String,
    pub bucket: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileTarget {
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MailTarget {
    #[serde(alias = "to_addresses")]
    pub to_addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Delivery {
    #[serde(alias = "s3Target", alias = "s3_target")]
    pub s3: Option<S3Target>,
    #[serde(alias = "fileTarget", alias = "file_target")]
    pub file: Option<FileTarget>,
    #[serde(alias = "mailTarget", alias = "mail_target")]
    pub mail: Option<MailTarget>,
}

/// A "generate report" request. Semantic checks happen in the stage using a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportRequest {
    pub format: ReportFormat,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub year: Option<i32>,
    pub month: Option<i32>,
    /// Reference-date layout for the artifact base name.
    #[serde(alias = "name_pattern")]
    pub name_pattern: String,
    #[serde(alias = "device_ids")]
    pub device_ids: Vec<String>,
    pub delivery: Delivery,
}

pub fn parse_request(payload: &str) -> Result<ReportRequest, ReportError> {
    Ok(serde_json::from_str(payload)?)
}
