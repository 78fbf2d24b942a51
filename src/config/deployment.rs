//! Deployment configuration
//!
//! [`DeploymentConfig`] holds everything the build author declares about a
//! Beanstalk deployment. It can be built in code, through the
//! configuration-block appliers, or loaded from a file plus environment
//! variables.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

use super::nested::{
    AppVersionConfig, ConfigurationTemplateConfig, ConfigurationTemplates, EnvironmentConfig,
};
use crate::error::{BeanstalkError, Result};

/// Prefix for environment variable overrides, e.g. `BEANSTALK__APP_NAME`.
pub const ENV_PREFIX: &str = "BEANSTALK";

/// Deployment role of an environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Tier {
    #[default]
    #[serde(alias = "webserver", alias = "web-server")]
    WebServer,
    #[serde(alias = "worker")]
    Worker,
}

impl Tier {
    /// Tier name as the service spells it
    pub fn name(&self) -> &'static str {
        match self {
            Tier::WebServer => "WebServer",
            Tier::Worker => "Worker",
        }
    }

    /// Tier type as the service spells it
    pub fn tier_type(&self) -> &'static str {
        match self {
            Tier::WebServer => "Standard",
            Tier::Worker => "SQS/HTTP",
        }
    }

    pub fn version(&self) -> &'static str {
        "1.0"
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Tier {
    type Err = BeanstalkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "webserver" | "web-server" | "web" => Ok(Tier::WebServer),
            "worker" => Ok(Tier::Worker),
            _ => Err(BeanstalkError::InvalidConfig(format!(
                "invalid tier: {}. Expected: WebServer or Worker",
                s
            ))),
        }
    }
}

/// Root deployment configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Credential profile; `None` defers to the AWS settings
    pub profile_name: Option<String>,
    /// Explicit region; `None` defers to the active region
    pub region: Option<String>,
    pub app_name: String,
    pub app_desc: String,
    pub tier: Tier,
    pub version: AppVersionConfig,
    pub environment: EnvironmentConfig,
    pub configuration_templates: ConfigurationTemplates,
}

impl DeploymentConfig {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    pub fn with_profile_name(mut self, profile_name: impl Into<String>) -> Self {
        self.profile_name = Some(profile_name.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_app_desc(mut self, app_desc: impl Into<String>) -> Self {
        self.app_desc = app_desc.into();
        self
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Apply a configuration block to the application version.
    pub fn version<F>(&mut self, configure: F)
    where
        F: FnOnce(&mut AppVersionConfig),
    {
        configure(&mut self.version);
    }

    /// Apply a configuration block to the environment.
    pub fn environment<F>(&mut self, configure: F)
    where
        F: FnOnce(&mut EnvironmentConfig),
    {
        configure(&mut self.environment);
    }

    /// Apply a configuration block to the template collection.
    pub fn configuration_templates<F>(&mut self, configure: F)
    where
        F: FnOnce(&mut ConfigurationTemplates),
    {
        configure(&mut self.configuration_templates);
    }

    /// Apply a configuration block to one named template, creating it if needed.
    pub fn configuration_template<F>(&mut self, name: &str, configure: F)
    where
        F: FnOnce(&mut ConfigurationTemplateConfig),
    {
        self.configuration_templates.template(name, configure);
    }

    /// The application name as configured.
    ///
    /// Blank gives [`BeanstalkError::MissingAppName`]; surrounding whitespace
    /// is rejected rather than trimmed, so the service sees exactly this name.
    pub fn require_app_name(&self) -> Result<&str> {
        let trimmed = self.app_name.trim();
        if trimmed.is_empty() {
            return Err(BeanstalkError::MissingAppName);
        }
        if trimmed.len() != self.app_name.len() {
            return Err(BeanstalkError::InvalidConfig(format!(
                "app_name {:?} has surrounding whitespace",
                self.app_name
            )));
        }
        Ok(&self.app_name)
    }

    /// Load from an optional file, then `BEANSTALK__*` environment overrides.
    ///
    /// The file format follows its extension (toml, yaml, json) and its keys
    /// keep their case. Nested keys use `__` in variable names:
    /// `BEANSTALK__ENVIRONMENT__ENV_NAME`. Variable names are lowercased, so
    /// mixed-case template names and tag keys belong in the file.
    ///
    /// `app_name` may be left empty; queries that send it check it.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_app_name(path, None)
    }

    /// Like [`load`](Self::load), with `app_name` taking precedence over
    /// both the file and the environment.
    pub fn load_with_app_name(path: Option<&Path>, app_name: Option<&str>) -> Result<Self> {
        Self::load_from_sources(path, app_name, None)
    }

    // `env_vars` of `None` reads the process environment.
    fn load_from_sources(
        path: Option<&Path>,
        app_name: Option<&str>,
        env_vars: Option<::config::Map<String, String>>,
    ) -> Result<Self> {
        let mut merged = match path {
            Some(path) => read_config_file(path)?,
            None => Value::Object(Default::default()),
        };

        let overrides: Value = ::config::Config::builder()
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .source(env_vars),
            )
            .set_override_option("app_name", app_name)?
            .build()?
            .try_deserialize()?;
        merge_values(&mut merged, overrides);

        let mut config: DeploymentConfig = serde_json::from_value(merged)?;
        config.configuration_templates.assign_names();
        if !config.app_name.is_empty() {
            config.require_app_name()?;
        }
        config.validate_settings()?;

        tracing::debug!(
            app_name = %config.app_name,
            tier = %config.tier,
            templates = config.configuration_templates.len(),
            "Loaded deployment configuration"
        );

        Ok(config)
    }

    /// Check the configuration is usable for a deployment.
    pub fn validate(&self) -> Result<()> {
        self.require_app_name()?;
        self.validate_settings()
    }

    /// Everything [`validate`](Self::validate) checks except the app name.
    pub fn validate_settings(&self) -> Result<()> {
        if matches!(self.profile_name.as_deref(), Some(p) if p.trim().is_empty()) {
            return Err(BeanstalkError::InvalidConfig(
                "profile_name must not be empty when set".to_string(),
            ));
        }

        self.version.validate()?;
        self.environment.validate()?;
        self.configuration_templates.validate()?;
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("toml") => Ok(toml::from_str(&content)?),
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        Some("json") => Ok(serde_json::from_str(&content)?),
        _ => Err(BeanstalkError::InvalidConfig(format!(
            "unsupported configuration file {}: expected .toml, .yaml or .json",
            path.display()
        ))),
    }
}

// Tables merge key by key; any other value replaces what was there.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
