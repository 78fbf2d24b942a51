//! Beanstalk error taxonomy

use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = BeanstalkError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum BeanstalkError {
    /// `app_name` was empty when a query needed it
    #[error("Application name is not configured")]
    MissingAppName,

    /// No environment with this name exists for the application
    #[error("Environment '{environment}' not found in application '{application}'")]
    EnvironmentNotFound {
        application: String,
        environment: String,
    },

    /// The environment exists but lacks an attribute the caller asked for
    #[error("Environment '{environment}' has no {attribute}")]
    MissingAttribute {
        environment: String,
        attribute: &'static str,
    },

    /// Endpoint URL does not have the `<name>-<suffix>.<domain>` shape
    #[error("Malformed endpoint URL: {0:?}")]
    MalformedEndpoint(String),

    /// No available solution stack matched the OS and platform
    #[error("No solution stack matches os '{os}' running '{platform}'")]
    NoMatchingSolutionStack { os: String, platform: String },

    /// Deployment configuration is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The credential/region collaborator could not produce a client
    #[error("Failed to initialize Elastic Beanstalk client: {0}")]
    ClientInit(String),

    /// Request was throttled by the service
    #[error("Throttled: {0}")]
    Throttled(String),

    /// Credentials were rejected
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Caller lacks the IAM permissions for the operation
    #[error("Insufficient privileges: {0}")]
    InsufficientPrivileges(String),

    /// Any other error returned by the service
    #[error("{operation} failed ({code}): {message}")]
    Service {
        operation: &'static str,
        code: String,
        message: String,
    },

    /// Request never produced a service response (dispatch, timeout, parse)
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl BeanstalkError {
    /// Map an SDK error returned by `operation` onto the taxonomy.
    ///
    /// Elastic Beanstalk models almost no per-operation exceptions, so the
    /// classification is driven by the error code in the response metadata.
    pub fn from_sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        match &err {
            SdkError::ServiceError(service_err) => {
                let error = service_err.err();
                let message = error.message().unwrap_or("no message").to_string();
                match error.code() {
                    Some("Throttling") | Some("ThrottlingException") => {
                        BeanstalkError::Throttled(message)
                    }
                    Some("AccessDenied") | Some("AccessDeniedException") => {
                        BeanstalkError::AccessDenied(message)
                    }
                    Some("InsufficientPrivilegesException") => {
                        BeanstalkError::InsufficientPrivileges(message)
                    }
                    code => BeanstalkError::Service {
                        operation,
                        code: code.unwrap_or("Unknown").to_string(),
                        message,
                    },
                }
            }
            _ => BeanstalkError::Transport(format!(
                "{}: {}",
                operation,
                DisplayErrorContext(&err)
            )),
        }
    }

    /// Whether a caller could reasonably try again.
    ///
    /// Informational only; this crate never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BeanstalkError::Throttled(_) | BeanstalkError::Transport(_)
        )
    }
}
