//! AWS SDK configuration
//!
//! This module provides the credential and region collaborator the deployment
//! facade depends on, supporting named profiles and custom endpoint URLs for
//! local development and testing.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_elasticbeanstalk::Client as ElasticBeanstalkClient;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;

use crate::error::{BeanstalkError, Result};
use crate::services::BeanstalkApi;

/// Region used when neither the deployment nor the environment names one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// AWS settings shared by every deployment in a build
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AwsSettings {
    /// Profile used when a deployment does not name its own
    pub profile_name: Option<String>,
    /// Fallback region
    pub region: String,
    /// Custom Elastic Beanstalk endpoint (LocalStack, mocks)
    pub endpoint_url: Option<String>,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            profile_name: None,
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
        }
    }
}

impl AwsSettings {
    /// Load settings from environment variables with defaults
    pub fn load() -> Self {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self {
            profile_name: non_empty_var("AWS_PROFILE"),
            region: non_empty_var("AWS_REGION")
                .or_else(|| non_empty_var("AWS_DEFAULT_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint_url: non_empty_var("BEANSTALK_ENDPOINT_URL"),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Credential and region resolution for Elastic Beanstalk clients.
///
/// The deployment facade calls each method once, when its client is first
/// needed.
#[async_trait]
pub trait AwsExtension: Send + Sync {
    /// Effective region: `region` when given, otherwise this extension's default.
    fn active_region(&self, region: Option<&str>) -> Region;

    /// Build an authenticated client for `profile_name` in `region`.
    async fn create_client(
        &self,
        profile_name: Option<&str>,
        region: Region,
    ) -> Result<Arc<dyn BeanstalkApi>>;
}

/// [`AwsExtension`] backed by the AWS SDK default credential chain.
///
/// Credentials come from the named profile when one is given, otherwise from
/// the usual chain (env vars, shared config, instance profile, ...).
#[derive(Debug, Clone, Default)]
pub struct SdkAwsExtension {
    settings: AwsSettings,
}

impl SdkAwsExtension {
    pub fn new(settings: AwsSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AwsSettings {
        &self.settings
    }

    /// Build the base AWS SDK configuration for one profile and region
    pub async fn build_sdk_config(&self, profile_name: Option<&str>, region: Region) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);

        if let Some(profile) = profile_name.or(self.settings.profile_name.as_deref()) {
            loader = loader.profile_name(profile);
        }

        loader.load().await
    }

    /// Create an Elastic Beanstalk client with optional custom endpoint
    pub async fn build_client(&self, profile_name: Option<&str>, region: Region) -> ElasticBeanstalkClient {
        let sdk_config = self.build_sdk_config(profile_name, region).await;

        if let Some(endpoint_url) = &self.settings.endpoint_url {
            tracing::info!(endpoint = %endpoint_url, "Using custom Elastic Beanstalk endpoint");

            let eb_config = aws_sdk_elasticbeanstalk::config::Builder::from(&sdk_config)
                .endpoint_url(endpoint_url)
                .build();

            ElasticBeanstalkClient::from_conf(eb_config)
        } else {
            ElasticBeanstalkClient::new(&sdk_config)
        }
    }
}

#[async_trait]
impl AwsExtension for SdkAwsExtension {
    fn active_region(&self, region: Option<&str>) -> Region {
        match region.map(str::trim).filter(|r| !r.is_empty()) {
            Some(explicit) => Region::new(explicit.to_string()),
            None => Region::new(self.settings.region.clone()),
        }
    }

    async fn create_client(
        &self,
        profile_name: Option<&str>,
        region: Region,
    ) -> Result<Arc<dyn BeanstalkApi>> {
        if matches!(profile_name, Some(p) if p.trim().is_empty()) {
            return Err(BeanstalkError::ClientInit(
                "profile name must not be empty".to_string(),
            ));
        }

        let client = self.build_client(profile_name, region).await;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_region_prefers_explicit() {
        let aws = SdkAwsExtension::default();
        assert_eq!(aws.active_region(Some("eu-west-1")).as_ref(), "eu-west-1");
    }

    #[test]
    fn test_active_region_falls_back_to_settings() {
        let aws = SdkAwsExtension::new(AwsSettings {
            region: "ap-northeast-1".to_string(),
            ..Default::default()
        });
        assert_eq!(aws.active_region(None).as_ref(), "ap-northeast-1");
        assert_eq!(aws.active_region(Some("  ")).as_ref(), "ap-northeast-1");
    }

    #[tokio::test]
    async fn test_build_sdk_config() {
        let aws = SdkAwsExtension::default();
        let config = aws.build_sdk_config(None, Region::new("us-west-2")).await;

        assert_eq!(config.region().unwrap().as_ref(), "us-west-2");
    }

    #[tokio::test]
    async fn test_client_creation_with_custom_endpoint() {
        let aws = SdkAwsExtension::new(AwsSettings {
            endpoint_url: Some("http://localhost:4566".to_string()),
            ..Default::default()
        });
        let _client = aws.create_client(None, Region::new(DEFAULT_REGION)).await.unwrap();
        // Client created with custom endpoint
    }

    #[tokio::test]
    async fn test_empty_profile_is_rejected() {
        let aws = SdkAwsExtension::default();
        let result = aws.create_client(Some(""), Region::new(DEFAULT_REGION)).await;
        assert!(matches!(result, Err(BeanstalkError::ClientInit(_))));
    }
}
