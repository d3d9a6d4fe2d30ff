use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use serde::Serialize;

use super::delivery::{self, DeliveryDefaults};
use super::envelope::{self, QueueEvent};
use super::request::{self, ReportFormat, ReportRequest, ReportType};
use super::time_range::{self, TimeRange};
use crate::calendar::{Calendar, Holiday};
use crate::error::{AppError, AppResult, ReportError};
use crate::format::Formatter;
use crate::layout;
use crate::publish::{DefaultPublisherFactory, Publisher, PublisherFactory};
use crate::report::Calculator;
use crate::telemetry::metrics::{
    REPORT_DELIVERIES, REPORT_FAILURES, REPORT_GENERATION_DURATION, REPORT_RECORDS,
    REPORTS_GENERATED,
};
use crate::timetracker::{RecordType, TimeTracker, TimeTrackingRecord};

/// Name pattern used when a request does not carry one.
const DEFAULT_NAME_PATTERN: &str = "Report_200601";

/// Read-only settings established at startup.
#[derive(Debug, Clone, Default)]
pub struct GeneratorSettings {
    pub delivery: DeliveryDefaults,
    /// Devices reported on when a request does not name any.
    pub device_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportOutcome {
    pub artifact: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub records: usize,
    pub deliveries: Vec<&'static str>,
}

/// Turns report requests into delivered reports.
pub struct ReportGenerator {
    settings: GeneratorSettings,
    time_tracker: Arc<dyn TimeTracker>,
    calculator: Arc<dyn Calculator>,
    excel: Arc<dyn Formatter>,
    calendar: Option<Arc<dyn Calendar>>,
    publishers: Arc<dyn PublisherFactory>,
}

impl ReportGenerator {
    pub fn new(
        settings: GeneratorSettings,
        time_tracker: Arc<dyn TimeTracker>,
        calculator: Arc<dyn Calculator>,
        excel: Arc<dyn Formatter>,
    ) -> Self {
        Self {
            settings,
            time_tracker,
            calculator,
            excel,
            calendar: None,
            publishers: Arc::new(DefaultPublisherFactory),
        }
    }

    pub fn with_calendar(mut self, calendar: Arc<dyn Calendar>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn with_publisher_factory(mut self, publishers: Arc<dyn PublisherFactory>) -> Self {
        self.publishers = publishers;
        self
    }

    /// Processes a batch in order. The first failing message fails the whole batch; reports
    /// of earlier messages, and deliveries already made for the failing one, stay in place.
    #[tracing::instrument(
        name = "pipeline batch",
        skip_all,
        fields(batch.id = %uuid::Uuid::new_v4(), batch.size = event.records.len())
    )]
    pub async fn handle_events(&self, event: &QueueEvent) -> AppResult<Vec<ReportOutcome>> {
        let mut outcomes = Vec::with_capacity(event.records.len());

        for message in &event.records {
            tracing::debug!(
                message_id = %message.message_id,
                event_source = %message.event_source,
                "Processing message"
            );

            let start = Instant::now();
            match self.process_message(&message.body).await {
                Ok(outcome) => {
                    REPORTS_GENERATED.add(1, &[]);
                    REPORT_GENERATION_DURATION.record(start.elapsed().as_secs_f64(), &[]);
                    tracing::info!(
                        message_id = %message.message_id,
                        artifact = %outcome.artifact,
                        deliveries = outcome.deliveries.len(),
                        "Report generated"
                    );
                    outcomes.push(outcome);
                }
                Err(source) => {
                    REPORT_FAILURES.add(1, &[KeyValue::new("error.kind", source.kind())]);
                    tracing::error!(
                        message_id = %message.message_id,
                        error.kind = source.kind(),
                        error = %source,
                        "Unable to process message"
                    );
                    return Err(AppError::Report {
                        message_id: message.message_id.clone(),
                        source,
                    });
                }
            }
        }

        Ok(outcomes)
    }

    /// Runs one message body through the pipeline.
    pub async fn process_message(&self, body: &str) -> Result<ReportOutcome, ReportError> {
        let payload = envelope::unwrap_payload(body);
        let request = request::parse_request(&payload)?;
        self.generate_report(&request).await
    }

    #[tracing::instrument(
        name = "pipeline report",
        skip_all,
        fields(
            report.format = %request.format,
            report.kind = %request.report_type,
            report.period = tracing::field::Empty,
            report.publishers = tracing::field::Empty,
        )
    )]
    pub async fn generate_report(
        &self,
        request: &ReportRequest,
    ) -> Result<ReportOutcome, ReportError> {
        let formatter = self.formatter_for(&request.format)?;

        let range = time_range::resolve(request);
        let span = tracing::Span::current();
        span.record(
            "report.period",
            format!("{} - {}", range.start.to_rfc3339(), range.end.to_rfc3339()),
        );

        let targets =
            delivery::resolve_targets(&self.settings.delivery, &range, &request.delivery)?;
        let publishers: Vec<Arc<dyn Publisher>> = targets
            .iter()
            .map(|target| self.publishers.publisher(target))
            .collect();
        span.record("report.publishers", publishers.len());

        match &request.report_type {
            ReportType::MonthlyReport => {
                self.generate_monthly_report(request, &range, formatter.as_ref(), &publishers)
                    .await
            }
            other => Err(ReportError::UnsupportedType(other.to_string())),
        }
    }

    fn formatter_for(&self, format: &ReportFormat) -> Result<Arc<dyn Formatter>, ReportError> {
        match format {
            ReportFormat::Excel => Ok(self.excel.clone()),
            other => Err(ReportError::UnsupportedFormat(other.to_string())),
        }
    }

    async fn generate_monthly_report(
        &self,
        request: &ReportRequest,
        range: &TimeRange,
        formatter: &dyn Formatter,
        publishers: &[Arc<dyn Publisher>],
    ) -> Result<ReportOutcome, ReportError> {
        let records = self.fetch_records(request, range).await?;
        REPORT_RECORDS.record(records.len() as f64, &[]);

        let holidays = self.holidays(range.year(), range.month()).await;

        let mut report = self
            .calculator
            .monthly_report(&records, range.year(), range.month(), RecordType::Workday)
            .map_err(|e| ReportError::Calculation(format!("{e:#}")))?;
        if let Some(holidays) = holidays {
            report = report.with_holidays(holidays);
        }

        let content = formatter
            .render(&report)
            .map_err(|e| ReportError::Render(format!("{e:#}")))?;

        let name_pattern = if request.name_pattern.is_empty() {
            DEFAULT_NAME_PATTERN
        } else {
            request.name_pattern.as_str()
        };
        let artifact = layout::format(&range.start, name_pattern) + formatter.file_extension();

        let mut deliveries = Vec::with_capacity(publishers.len());
        for publisher in publishers {
            tracing::debug!(artifact = %artifact, publisher = publisher.kind(), "Publishing report");
            publisher
                .send(&content, &artifact)
                .await
                .map_err(|e| ReportError::Delivery {
                    publisher: publisher.kind().to_string(),
                    reason: format!("{e:#}"),
                })?;
            REPORT_DELIVERIES.add(1, &[KeyValue::new("publisher.kind", publisher.kind())]);
            deliveries.push(publisher.kind());
        }

        Ok(ReportOutcome {
            artifact,
            period_start: range.start,
            period_end: range.end,
            records: records.len(),
            deliveries,
        })
    }

    async fn fetch_records(
        &self,
        request: &ReportRequest,
        range: &TimeRange,
    ) -> Result<Vec<TimeTrackingRecord>, ReportError> {
        let device_ids = if request.device_ids.is_empty() {
            &self.settings.device_ids
        } else {
            &request.device_ids
        };

        let mut records = Vec::new();
        for device_id in device_ids {
            let device_records = self
                .time_tracker
                .list_records(device_id, range.start, range.end)
                .await
                .map_err(|e| ReportError::RecordFetch {
                    device_id: device_id.clone(),
                    reason: format!("{e:#}"),
                })?;
            tracing::debug!(device_id = %device_id, records = device_records.len(), "Fetched records");
            records.extend(device_records);
        }
        Ok(records)
    }

    /// Holidays are optional; a missing or failing calendar only drops the annotation.
    async fn holidays(&self, year: i32, month: u32) -> Option<Vec<Holiday>> {
        let calendar = self.calendar.as_ref()?;
        match calendar.holidays(year, month).await {
            Ok(holidays) => Some(holidays),
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), year, month, "Holiday lookup failed");
                None
            }
        }
    }
}
