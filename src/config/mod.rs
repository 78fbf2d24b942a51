//! Configuration management module
//!
//! Deployment settings declared by the build author, and the AWS
//! credential/region settings loaded from the environment and .env files.

pub mod aws;
pub mod deployment;
pub mod nested;

pub use aws::{AwsExtension, AwsSettings, SdkAwsExtension, DEFAULT_REGION};
pub use deployment::{DeploymentConfig, Tier, ENV_PREFIX};
pub use nested::{
    load_option_settings, AppVersionConfig, ConfigurationTemplateConfig, ConfigurationTemplates,
    EnvironmentConfig, OptionSetting,
};
