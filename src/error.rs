use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use opentelemetry::trace::TraceContextExt;
use serde_json::json;
use thiserror::Error;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Failures that abort processing of a report request. None of them is retried in
/// process; the queue runtime redelivers the whole message.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Unable to deserialize event: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Unsupported report type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported report format: {0}")]
    UnsupportedFormat(String),

    #[error("No report delivery defined!")]
    NoDeliveryTarget,

    #[error("Unable to fetch records for device {device_id}: {reason}")]
    RecordFetch { device_id: String, reason: String },

    #[error("Unable to calculate report: {0}")]
    Calculation(String),

    #[error("Unable to render report: {0}")]
    Render(String),

    #[error("Unable to deliver report via {publisher}: {reason}")]
    Delivery { publisher: String, reason: String },
}

impl ReportError {
    /// Stable label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Deserialization(_) => "deserialization",
            ReportError::UnsupportedType(_) => "unsupported_type",
            ReportError::UnsupportedFormat(_) => "unsupported_format",
            ReportError::NoDeliveryTarget => "no_delivery_target",
            ReportError::RecordFetch { .. } => "record_fetch",
            ReportError::Calculation(_) => "calculation",
            ReportError::Render(_) => "render",
            ReportError::Delivery { .. } => "delivery",
        }
    }

    /// Whether the request itself is unusable, as opposed to a collaborator failing.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            ReportError::Deserialization(_)
                | ReportError::UnsupportedType(_)
                | ReportError::UnsupportedFormat(_)
                | ReportError::NoDeliveryTarget
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Report error in message {message_id}: {source}")]
    Report {
        message_id: String,
        #[source]
        source: ReportError,
    },
}

fn get_trace_id() -> Option<String> {
    let span = Span::current();
    let context = span.context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    if span_context.is_valid() {
        Some(span_context.trace_id().to_string())
    } else {
        None
    }
}

impl AppError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            AppError::Report { source, .. } if source.is_request_error() => {
                (StatusCode::UNPROCESSABLE_ENTITY, source.kind())
            }
            AppError::Report { source, .. } => (StatusCode::BAD_GATEWAY, source.kind()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();

        let error_message = match &self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Report { message_id, source } => {
                tracing::error!(message_id = %message_id, error.kind = kind, error = %source, "Report generation failed");
                self.to_string()
            }
        };

        let body = if let Some(trace_id) = get_trace_id() {
            json!({
                "error": error_message,
                "kind": kind,
                "status": status.as_u16(),
                "trace_id": trace_id,
            })
        } else {
            json!({
                "error": error_message,
                "kind": kind,
                "status": status.as_u16(),
            })
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn report_error(source: ReportError) -> AppError {
        AppError::Report {
            message_id: "msg-1".to_string(),
            source,
        }
    }

    #[test]
    fn test_report_error_messages() {
        assert_eq!(
            ReportError::UnsupportedFormat("NO_FORMAT".into()).to_string(),
            "Unsupported report format: NO_FORMAT"
        );
        assert_eq!(
            ReportError::NoDeliveryTarget.to_string(),
            "No report delivery defined!"
        );
        assert_eq!(
            ReportError::RecordFetch {
                device_id: "Device01".into(),
                reason: "timeout".into(),
            }
            .to_string(),
            "Unable to fetch records for device Device01: timeout"
        );
    }

    #[test]
    fn test_deserialization_error_from_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ReportError = err.into();
        assert_eq!(err.kind(), "deserialization");
        assert!(err.is_request_error());
    }

    #[test]
    fn test_request_errors_are_unprocessable() {
        let cases = vec![
            ReportError::UnsupportedType("NO_TYPE".into()),
            ReportError::UnsupportedFormat("NO_FORMAT".into()),
            ReportError::NoDeliveryTarget,
        ];
        for source in cases {
            let (status, _) = report_error(source).status_and_kind();
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn test_collaborator_errors_are_bad_gateway() {
        let cases = vec![
            ReportError::RecordFetch {
                device_id: "d".into(),
                reason: "r".into(),
            },
            ReportError::Calculation("c".into()),
            ReportError::Render("r".into()),
            ReportError::Delivery {
                publisher: "file".into(),
                reason: "r".into(),
            },
        ];
        for source in cases {
            let kind = source.kind();
            let (status, reported_kind) = report_error(source).status_and_kind();
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(reported_kind, kind);
        }
    }

    #[test]
    fn test_validation_error() {
        let error = AppError::Validation("empty batch".to_string());
        assert_eq!(error.to_string(), "Validation error: empty batch");
        assert_eq!(error.status_and_kind().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_into_response_status() {
        let response = report_error(ReportError::NoDeliveryTarget).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
