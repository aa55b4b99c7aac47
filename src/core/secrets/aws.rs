//! AWS Secrets Manager source.
//!
//! Enable with `--features aws` (on by default).
//!
//! Credentials come from the environment (AWS_ACCESS_KEY_ID, etc.) or the
//! default credential provider chain. The region is taken from
//! `secrets.region` in `.snowdeploy.toml`.

use tracing::trace;

use super::{SecretBundle, SecretSource};
use crate::error::{Result, SecretError};

/// Secrets Manager client for one region.
pub struct AwsSecretsManager {
    region: String,
}

impl AwsSecretsManager {
    pub fn new(region: String) -> Self {
        Self { region }
    }
}

impl SecretSource for AwsSecretsManager {
    fn fetch(&self, name: &str) -> Result<SecretBundle> {
        trace!(name, region = %self.region, "fetching secret from AWS Secrets Manager");

        // Create a tokio runtime for the async AWS SDK
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SecretError::Fetch(format!("failed to create runtime: {}", e)))?;

        let payload = rt.block_on(async {
            let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(self.region.clone()))
                .load()
                .await;
            let client = aws_sdk_secretsmanager::Client::new(&config);

            let result = client
                .get_secret_value()
                .secret_id(name)
                .send()
                .await
                .map_err(|e| {
                    SecretError::Fetch(format!(
                        "GetSecretValue for '{}' failed: {}",
                        name,
                        aws_sdk_secretsmanager::error::DisplayErrorContext(&e)
                    ))
                })?;

            result
                .secret_string()
                .map(str::to_string)
                .ok_or_else(|| SecretError::EmptyPayload(name.to_string()))
        })?;

        let payload = zeroize::Zeroizing::new(payload);
        trace!(payload_len = payload.len(), "secret fetched");
        SecretBundle::from_json(name, &payload)
    }

    fn name(&self) -> &'static str {
        "aws-secretsmanager"
    }
}
