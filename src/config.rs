use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use anyhow::Context;

use crate::report::Locale;

/// Storage defaults used to fill gaps in an S3 delivery target and to locate the
/// time tracking store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsStorageDefaults {
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub base_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
    pub storage: AwsStorageDefaults,
    pub report_sender: Option<String>,
    pub device_ids: Vec<String>,
    pub locale: Locale,
    pub calendar_api_key: Option<String>,
    pub calendar_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("APP_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("APP_PORT must be a number, got {port:?}"))?,
            None => 8080,
        };

        let storage = AwsStorageDefaults {
            region: get("AWS_S3_REGION").or_else(|| get("AWS_REGION")),
            bucket: get("AWS_S3_BUCKET"),
            base_path: get("AWS_S3_BASEPATH"),
        };

        let device_ids = get("HOB_DEVICE_IDS")
            .map(|ids| {
                ids.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let default_work_time = match get("HOB_LOCALE_DEFAULT_WORKTIME") {
            Some(value) => parse_duration("HOB_LOCALE_DEFAULT_WORKTIME", &value)?,
            None => Duration::from_secs(8 * 60 * 60),
        };

        let breaks = match get("HOB_LOCALE_BREAKS") {
            Some(value) => parse_breaks(&value)?,
            None => BTreeMap::new(),
        };

        let locale = Locale {
            country: get("HOB_LOCALE_COUNTRY").unwrap_or_else(|| "de".to_string()),
            timezone: get("HOB_LOCALE_TIMEZONE"),
            date_format: get("HOB_LOCALE_DATEFORMAT"),
            default_work_time,
            breaks,
        };

        Ok(Self {
            port,
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            otel_service_name: get("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| "hob-report-generator".to_string()),
            otel_exporter_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|| "http://localhost:4317".to_string()),
            storage,
            report_sender: get("HOB_EMAIL_SOURCE"),
            device_ids,
            locale,
            calendar_api_key: get("HOB_CALENDAR_APIKEY"),
            calendar_url: get("HOB_CALENDAR_URL")
                .unwrap_or_else(|| "https://date.nager.at/api/v3".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_duration(key: &str, value: &str) -> anyhow::Result<Duration> {
    humantime::parse_duration(value.trim())
        .with_context(|| format!("{key} must be a duration like 8h or 30m, got {value:?}"))
}

/// Parses break rules written as `worktime=breaktime` pairs, e.g. `6h=30m,9h=15m`.
fn parse_breaks(value: &str) -> anyhow::Result<BTreeMap<Duration, Duration>> {
    let mut breaks = BTreeMap::new();
    for rule in value.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        let (work_time, break_time) = rule
            .split_once('=')
            .with_context(|| format!("HOB_LOCALE_BREAKS entry {rule:?} must be worktime=breaktime"))?;
        breaks.insert(
            parse_duration("HOB_LOCALE_BREAKS", work_time)?,
            parse_duration("HOB_LOCALE_BREAKS", break_time)?,
        );
    }
    Ok(breaks)
}
