use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

/// Lookup of public holidays. Failures are tolerated by callers.
#[async_trait::async_trait]
pub trait Calendar: Send + Sync {
    async fn holidays(&self, year: i32, month: u32) -> anyhow::Result<Vec<Holiday>>;
}

/// Public holiday API client (`GET {base_url}/PublicHolidays/{year}/{country}`).
pub struct CalendarApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    country: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicHoliday {
    date: NaiveDate,
    #[serde(default)]
    local_name: Option<String>,
    name: String,
}

impl CalendarApi {
    pub fn new(base_url: &str, api_key: &str, country: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            country: country.to_uppercase(),
        }
    }
}

fn holidays_in_month(entries: Vec<PublicHoliday>, year: i32, month: u32) -> Vec<Holiday> {
    entries
        .into_iter()
        .filter(|e| e.date.year() == year && e.date.month() == month)
        .map(|e| Holiday {
            date: e.date,
            name: e.local_name.filter(|n| !n.is_empty()).unwrap_or(e.name),
        })
        .collect()
}

#[async_trait::async_trait]
impl Calendar for CalendarApi {
    #[tracing::instrument(name = "calendar.holidays", skip(self), fields(calendar.country = %self.country))]
    async fn holidays(&self, year: i32, month: u32) -> anyhow::Result<Vec<Holiday>> {
        let url = format!("{}/PublicHolidays/{}/{}", self.base_url, year, self.country);

        let entries: Vec<PublicHoliday> = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .with_context(|| format!("Calendar request to {url} failed"))?
            .error_for_status()
            .context("Calendar API returned an error status")?
            .json()
            .await
            .context("Calendar API returned malformed holidays")?;

        Ok(holidays_in_month(entries, year, month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holidays_in_month() {
        let entries: Vec<PublicHoliday> = serde_json::from_str(
            r#"[
                {"date": "2022-01-01", "localName": "Neujahr", "name": "New Year's Day", "countryCode": "DE"},
                {"date": "2022-01-06", "localName": "", "name": "Epiphany", "countryCode": "DE"},
                {"date": "2022-04-15", "localName": "Karfreitag", "name": "Good Friday", "countryCode": "DE"}
            ]"#,
        )
        .unwrap();

        let holidays = holidays_in_month(entries, 2022, 1);
        assert_eq!(
            holidays,
            vec![
                Holiday {
                    date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
                    name: "Neujahr".into(),
                },
                Holiday {
                    date: NaiveDate::from_ymd_opt(2022, 1, 6).unwrap(),
                    name: "Epiphany".into(),
                },
            ]
        );
    }

    #[test]
    fn test_new_normalises_inputs() {
        let api = CalendarApi::new("https://date.nager.at/api/v3/", "key", "de");
        assert_eq!(api.base_url, "https://date.nager.at/api/v3");
        assert_eq!(api.country, "DE");
    }
}
