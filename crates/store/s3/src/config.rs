/// Configuration for the S3 blob store backend.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 bucket holding fragment payloads.
    pub bucket: String,

    /// AWS region (e.g. `"us-east-1"`).
    pub region: String,

    /// Optional endpoint URL for local development (e.g. `LocalStack`
    /// or MinIO).
    pub endpoint_url: Option<String>,

    /// Use path-style addressing, required by most local S3 stand-ins.
    pub force_path_style: bool,
}

impl S3Config {
    /// Create a config for the given bucket in the given region.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint_url: None,
            force_path_style: false,
        }
    }

    /// Set the endpoint URL override.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Enable path-style addressing.
    #[must_use]
    pub fn with_path_style(mut self) -> Self {
        self.force_path_style = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_bucket_and_region() {
        let cfg = S3Config::new("fragments", "us-west-2");
        assert_eq!(cfg.bucket, "fragments");
        assert_eq!(cfg.region, "us-west-2");
        assert!(cfg.endpoint_url.is_none());
        assert!(!cfg.force_path_style);
    }

    #[test]
    fn builder_chain() {
        let cfg = S3Config::new("fragments", "us-east-1")
            .with_endpoint_url("http://localhost:4566")
            .with_path_style();
        assert_eq!(cfg.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert!(cfg.force_path_style);
    }
}
