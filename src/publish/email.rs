use anyhow::Context;
use aws_sdk_sesv2::primitives::Blob;
use aws_sdk_sesv2::types::{Destination, EmailContent, RawMessage};
use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};

use super::{Publisher, content_type};

/// Mails reports as attachment through SES.
#[derive(Debug, Clone)]
pub struct EmailPublisher {
    source: String,
    to_addresses: Vec<String>,
    subject: String,
    message: String,
}

impl EmailPublisher {
    pub fn new(source: String, to_addresses: Vec<String>, subject: String, message: String) -> Self {
        Self {
            source,
            to_addresses,
            subject,
            message,
        }
    }

    fn build_message(&self, content: &[u8], name: &str) -> anyhow::Result<Vec<u8>> {
        let mut builder = Message::builder()
            .from(
                self.source
                    .parse::<Mailbox>()
                    .with_context(|| format!("Invalid sender address {:?}", self.source))?,
            )
            .subject(self.subject.clone());
        for address in &self.to_addresses {
            let recipient = address
                .parse::<Mailbox>()
                .with_context(|| format!("Invalid recipient address {address:?}"))?;
            builder = builder.to(recipient);
        }

        let attachment = Attachment::new(name.to_string())
            .body(content.to_vec(), ContentType::parse(content_type(name))?);
        let email = builder.multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::html(self.message.clone()))
                .singlepart(attachment),
        )?;

        Ok(email.formatted())
    }
}

#[async_trait::async_trait]
impl Publisher for EmailPublisher {
    async fn send(&self, content: &[u8], name: &str) -> anyhow::Result<()> {
        let raw = self.build_message(content, name)?;

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        let client = aws_sdk_sesv2::Client::new(&config);

        client
            .send_email()
            .from_email_address(&self.source)
            .destination(
                Destination::builder()
                    .set_to_addresses(Some(self.to_addresses.clone()))
                    .build(),
            )
            .content(
                EmailContent::builder()
                    .raw(RawMessage::builder().data(Blob::new(raw)).build()?)
                    .build(),
            )
            .send()
            .await
            .context("Failed to send report mail")?;

        tracing::info!(
            recipients = self.to_addresses.len(),
            attachment = %name,
            "Report mailed"
        );
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "email"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher(to: &[&str]) -> EmailPublisher {
        EmailPublisher::new(
            "reports@example.com".into(),
            to.iter().map(|a| a.to_string()).collect(),
            "Time Tracking Report 202201".into(),
            "<p>PFA your monthly time tracking report!</p></br>".into(),
        )
    }

    #[test]
    fn test_build_message_with_attachment() {
        let raw = publisher(&["me@example.com", "boss@example.com"])
            .build_message(b"xlsx bytes", "Report_202201.xlsx")
            .unwrap();
        let text = String::from_utf8_lossy(&raw);

        assert!(text.contains("Subject: Time Tracking Report 202201"));
        assert!(text.contains("From: reports@example.com"));
        assert!(text.contains("me@example.com"));
        assert!(text.contains("boss@example.com"));
        assert!(text.contains("Report_202201.xlsx"));
        assert!(text.contains("spreadsheetml.sheet"));
    }

    #[test]
    fn test_invalid_recipient_fails() {
        let result = publisher(&["not an address"]).build_message(b"x", "r.xlsx");
        assert!(result.is_err());
    }
}
