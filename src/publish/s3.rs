use anyhow::Context;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;

use super::{Publisher, content_type};

/// Uploads reports to `<base_path>/<name>` in an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Publisher {
    region: Option<String>,
    bucket: Option<String>,
    base_path: Option<String>,
}

impl S3Publisher {
    pub fn new(region: Option<String>, bucket: Option<String>, base_path: Option<String>) -> Self {
        Self {
            region,
            bucket,
            base_path,
        }
    }

    fn object_key(&self, name: &str) -> String {
        match self
            .base_path
            .as_deref()
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
        {
            Some(base) => format!("{base}/{name}"),
            None => name.to_string(),
        }
    }

    async fn client(&self) -> Client {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        Client::new(&loader.load().await)
    }
}

#[async_trait::async_trait]
impl Publisher for S3Publisher {
    async fn send(&self, content: &[u8], name: &str) -> anyhow::Result<()> {
        let bucket = self
            .bucket
            .as_deref()
            .context("No S3 bucket specified for report delivery")?;
        let key = self.object_key(name);

        self.client()
            .await
            .put_object()
            .bucket(bucket)
            .key(&key)
            .content_type(content_type(name))
            .body(ByteStream::from(content.to_vec()))
            .send()
            .await
            .with_context(|| format!("Failed to upload s3://{bucket}/{key}"))?;

        tracing::info!(bucket = %bucket, key = %key, bytes = content.len(), "Report uploaded");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "s3"
    }
}
