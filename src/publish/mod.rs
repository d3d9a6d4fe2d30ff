pub mod email;
pub mod file;
pub mod s3;

use std::sync::Arc;

pub use email::EmailPublisher;
pub use file::FilePublisher;
pub use s3::S3Publisher;

/// Sends a rendered report to one destination.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn send(&self, content: &[u8], name: &str) -> anyhow::Result<()>;

    /// Short label of the destination kind, used in logs and metrics.
    fn kind(&self) -> &'static str;
}

/// A destination resolved from a report request, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    Email {
        source: String,
        to_addresses: Vec<String>,
        subject: String,
        message: String,
    },
    S3 {
        region: Option<String>,
        bucket: Option<String>,
        base_path: Option<String>,
    },
    File {
        path: String,
    },
}

impl DeliveryTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            DeliveryTarget::Email { .. } => "email",
            DeliveryTarget::S3 { .. } => "s3",
            DeliveryTarget::File { .. } => "file",
        }
    }
}

/// Builds publisher handles for resolved delivery targets.
pub trait PublisherFactory: Send + Sync {
    fn publisher(&self, target: &DeliveryTarget) -> Arc<dyn Publisher>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPublisherFactory;

impl PublisherFactory for DefaultPublisherFactory {
    fn publisher(&self, target: &DeliveryTarget) -> Arc<dyn Publisher> {
        match target.clone() {
            DeliveryTarget::Email {
                source,
                to_addresses,
                subject,
                message,
            } => Arc::new(EmailPublisher::new(source, to_addresses, subject, message)),
            DeliveryTarget::S3 {
                region,
                bucket,
                base_path,
            } => Arc::new(S3Publisher::new(region, bucket, base_path)),
            DeliveryTarget::File { path } => Arc::new(FilePublisher::new(path)),
        }
    }
}

pub(crate) fn content_type(name: &str) -> &'static str {
    if name.ends_with(".xlsx") {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_matching_kind() {
        let factory = DefaultPublisherFactory;
        let targets = [
            DeliveryTarget::Email {
                source: "reports@example.com".into(),
                to_addresses: vec!["me@example.com".into()],
                subject: "s".into(),
                message: "m".into(),
            },
            DeliveryTarget::S3 {
                region: None,
                bucket: Some("b".into()),
                base_path: None,
            },
            DeliveryTarget::File { path: "./".into() },
        ];
        for target in &targets {
            assert_eq!(factory.publisher(target).kind(), target.kind());
        }
    }

    #[test]
    fn test_content_type() {
        assert_eq!(
            content_type("Report_202201.xlsx"),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(content_type("report.bin"), "application/octet-stream");
    }
}
