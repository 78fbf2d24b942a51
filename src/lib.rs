//! Elastic Beanstalk deployment configuration library

// Public modules
pub mod config;
pub mod error;
pub mod extension;
pub mod logging;
pub mod services;

// Re-export commonly used types
pub use config::{AwsExtension, AwsSettings, DeploymentConfig, SdkAwsExtension, Tier};
pub use error::{BeanstalkError, Result};
pub use extension::BeanstalkExtension;
pub use services::{BeanstalkApi, EnvironmentDescription};
