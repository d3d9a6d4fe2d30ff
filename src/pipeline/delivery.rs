use tracing::warn;

use super::request::Delivery;
use super::time_range::TimeRange;
use crate::config::AwsStorageDefaults;
use crate::error::ReportError;
use crate::layout;
use crate::publish::DeliveryTarget;

const MAIL_SUBJECT_LAYOUT: &str = "Time Tracking Report 200601";
const MAIL_MESSAGE: &str = "<p>PFA your monthly time tracking report!</p></br>";

/// Process-wide defaults applied while resolving delivery targets.
#[derive(Debug, Clone, Default)]
pub struct DeliveryDefaults {
    pub storage: AwsStorageDefaults,
    pub report_sender: Option<String>,
}

fn field_or_default(value: &str, default: &Option<String>) -> Option<String> {
    if value.is_empty() {
        default.clone()
    } else {
        Some(value.to_string())
    }
}

/// Resolves every target in `delivery`, in mail, S3, file order. A mail target without a
/// configured sender is skipped; only an empty result is an error.
pub fn resolve_targets(
    defaults: &DeliveryDefaults,
    range: &TimeRange,
    delivery: &Delivery,
) -> Result<Vec<DeliveryTarget>, ReportError> {
    let mut targets = Vec::new();

    if let Some(mail) = &delivery.mail {
        let to_addresses: Vec<String> = mail
            .to_addresses
            .iter()
            .filter(|a| !a.trim().is_empty())
            .cloned()
            .collect();

        if !to_addresses.is_empty() {
            match &defaults.report_sender {
                Some(source) => targets.push(DeliveryTarget::Email {
                    source: source.clone(),
                    to_addresses,
                    subject: layout::format(&range.start, MAIL_SUBJECT_LAYOUT),
                    message: MAIL_MESSAGE.to_string(),
                }),
                None => warn!("No report sender address configured, skipping mail delivery"),
            }
        }
    }

    if let Some(s3) = &delivery.s3 {
        targets.push(DeliveryTarget::S3 {
            region: field_or_default(&s3.region, &defaults.storage.region),
            bucket: field_or_default(&s3.bucket, &defaults.storage.bucket),
            base_path: field_or_default(&s3.path, &defaults.storage.base_path),
        });
    }

    if let Some(file) = &delivery.file {
        targets.push(DeliveryTarget::File {
            path: file.path.clone(),
        });
    }

    if targets.is_empty() {
        return Err(ReportError::NoDeliveryTarget);
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::request::{FileTarget, MailTarget, S3Target};
    use chrono::{TimeZone, Utc};

    fn january() -> TimeRange {
        TimeRange {
            start: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2022, 1, 31, 23, 59, 59).unwrap(),
        }
    }

    fn defaults(sender: Option<&str>) -> DeliveryDefaults {
        DeliveryDefaults {
            storage: AwsStorageDefaults {
                region: Some("eu-central-1".into()),
                bucket: Some("default-bucket".into()),
                base_path: Some("default/path".into()),
            },
            report_sender: sender.map(String::from),
        }
    }

    fn mail_to(addresses: &[&str]) -> Option<MailTarget> {
        Some(MailTarget {
            to_addresses: addresses.iter().map(|a| a.to_string()).collect(),
        })
    }

    #[test]
    fn test_empty_s3_target_uses_defaults() {
        let delivery = Delivery {
            s3: Some(S3Target::default()),
            ..Delivery::default()
        };
        let targets = resolve_targets(&defaults(None), &january(), &delivery).unwrap();
        assert_eq!(
            targets,
            vec![DeliveryTarget::S3 {
                region: Some("eu-central-1".into()),
                bucket: Some("default-bucket".into()),
                base_path: Some("default/path".into()),
            }]
        );
    }

    #[test]
    fn test_s3_target_overrides_defaults_per_field() {
        let delivery = Delivery {
            s3: Some(S3Target {
                region: "r".into(),
                bucket: "b".into(),
                path: "p".into(),
            }),
            ..Delivery::default()
        };
        let targets = resolve_targets(&defaults(None), &january(), &delivery).unwrap();
        assert_eq!(
            targets,
            vec![DeliveryTarget::S3 {
                region: Some("r".into()),
                bucket: Some("b".into()),
                base_path: Some("p".into()),
            }]
        );

        let delivery = Delivery {
            s3: Some(S3Target {
                bucket: "b".into(),
                ..S3Target::default()
            }),
            ..Delivery::default()
        };
        let targets = resolve_targets(&defaults(None), &january(), &delivery).unwrap();
        assert_eq!(
            targets,
            vec![DeliveryTarget::S3 {
                region: Some("eu-central-1".into()),
                bucket: Some("b".into()),
                base_path: Some("default/path".into()),
            }]
        );
    }

    #[test]
    fn test_s3_fields_may_stay_unset() {
        let delivery = Delivery {
            s3: Some(S3Target::default()),
            ..Delivery::default()
        };
        let targets = resolve_targets(&DeliveryDefaults::default(), &january(), &delivery).unwrap();
        assert_eq!(
            targets,
            vec![DeliveryTarget::S3 {
                region: None,
                bucket: None,
                base_path: None,
            }]
        );
    }

    #[test]
    fn test_no_targets_fails() {
        let result = resolve_targets(&defaults(Some("a@b.c")), &january(), &Delivery::default());
        assert!(matches!(result, Err(ReportError::NoDeliveryTarget)));
    }

    #[test]
    fn test_mail_without_sender_is_skipped() {
        let delivery = Delivery {
            mail: mail_to(&["me@example.com"]),
            ..Delivery::default()
        };
        let result = resolve_targets(&defaults(None), &january(), &delivery);
        assert!(matches!(result, Err(ReportError::NoDeliveryTarget)));

        let delivery = Delivery {
            mail: mail_to(&["me@example.com"]),
            file: Some(FileTarget { path: "./".into() }),
            ..Delivery::default()
        };
        let targets = resolve_targets(&defaults(None), &january(), &delivery).unwrap();
        assert_eq!(targets, vec![DeliveryTarget::File { path: "./".into() }]);
    }

    #[test]
    fn test_mail_without_recipients_is_absent() {
        let delivery = Delivery {
            mail: mail_to(&[" "]),
            ..Delivery::default()
        };
        let result = resolve_targets(&defaults(Some("reports@example.com")), &january(), &delivery);
        assert!(matches!(result, Err(ReportError::NoDeliveryTarget)));
    }

    #[test]
    fn test_all_targets_in_order() {
        let delivery = Delivery {
            s3: Some(S3Target::default()),
            file: Some(FileTarget {
                path: "::not a path::".into(),
            }),
            mail: mail_to(&["me@example.com", "boss@example.com"]),
        };
        let targets =
            resolve_targets(&defaults(Some("reports@example.com")), &january(), &delivery).unwrap();

        let kinds: Vec<_> = targets.iter().map(DeliveryTarget::kind).collect();
        assert_eq!(kinds, vec!["email", "s3", "file"]);
        assert_eq!(
            targets[0],
            DeliveryTarget::Email {
                source: "reports@example.com".into(),
                to_addresses: vec!["me@example.com".into(), "boss@example.com".into()],
                subject: "Time Tracking Report 202201".into(),
                message: MAIL_MESSAGE.into(),
            }
        );
        assert_eq!(
            targets[2],
            DeliveryTarget::File {
                path: "::not a path::".into()
            }
        );
    }
}
