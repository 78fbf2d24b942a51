//! Nested configuration groups
//!
//! The application version, target environment and named configuration
//! templates owned by a [`DeploymentConfig`](super::DeploymentConfig).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BeanstalkError, Result};

/// One Elastic Beanstalk option setting.
///
/// Accepts both snake_case keys and the `Namespace`/`OptionName`/`Value`
/// keys the AWS CLI writes in option-settings JSON files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OptionSetting {
    #[serde(alias = "Namespace")]
    pub namespace: String,
    #[serde(alias = "OptionName")]
    pub option_name: String,
    #[serde(default, alias = "Value")]
    pub value: Option<String>,
    #[serde(default, alias = "ResourceName", skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
}

impl OptionSetting {
    pub fn new(
        namespace: impl Into<String>,
        option_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            option_name: option_name.into(),
            value: Some(value.into()),
            resource_name: None,
        }
    }

    fn same_option(&self, other: &OptionSetting) -> bool {
        self.namespace == other.namespace
            && self.option_name == other.option_name
            && self.resource_name == other.resource_name
    }
}

/// Read option settings from a JSON array file.
pub fn load_option_settings(path: impl AsRef<Path>) -> Result<Vec<OptionSetting>> {
    let content = fs::read_to_string(path.as_ref())?;
    let settings = serde_json::from_str(&content)?;
    Ok(settings)
}

/// Application version artifact to deploy
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppVersionConfig {
    pub label: Option<String>,
    pub description: String,
    /// S3 bucket holding the source bundle
    pub bucket: Option<String>,
    /// S3 key of the source bundle
    pub key: Option<String>,
    /// Local bundle file, if the build produces one
    pub file: Option<PathBuf>,
}

impl AppVersionConfig {
    /// Bucket and key, only when both are configured.
    pub fn s3_location(&self) -> Option<(&str, &str)> {
        match (self.bucket.as_deref(), self.key.as_deref()) {
            (Some(bucket), Some(key)) => Some((bucket, key)),
            _ => None,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.bucket.is_some() != self.key.is_some() {
            return Err(BeanstalkError::InvalidConfig(
                "version.bucket and version.key must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

/// Target environment settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub env_name: Option<String>,
    pub env_desc: String,
    pub cname_prefix: Option<String>,
    pub template_name: Option<String>,
    pub version_label: Option<String>,
    pub solution_stack_name: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub option_settings: Vec<OptionSetting>,
}

impl EnvironmentConfig {
    pub fn tag(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn option(
        &mut self,
        namespace: impl Into<String>,
        option_name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.option_settings
            .push(OptionSetting::new(namespace, option_name, value));
        self
    }

    /// Version label to deploy: the environment's own, else the version's.
    pub fn effective_version_label<'a>(&'a self, version: &'a AppVersionConfig) -> Option<&'a str> {
        self.version_label.as_deref().or(version.label.as_deref())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(name) = &self.env_name {
            validate_environment_name(name)?;
        }
        Ok(())
    }
}

// Elastic Beanstalk: 4-40 chars, ASCII letters, digits and hyphens,
// no leading or trailing hyphen.
fn validate_environment_name(name: &str) -> Result<()> {
    let valid_chars = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !(4..=40).contains(&name.len())
        || !valid_chars
        || name.starts_with('-')
        || name.ends_with('-')
    {
        return Err(BeanstalkError::InvalidConfig(format!(
            "invalid environment name {:?}",
            name
        )));
    }
    Ok(())
}

/// One reusable configuration template
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigurationTemplateConfig {
    pub name: String,
    pub desc: String,
    pub solution_stack_name: Option<String>,
    pub option_settings: Vec<OptionSetting>,
    /// JSON file of option settings, applied before the inline ones
    pub option_settings_file: Option<PathBuf>,
}

impl ConfigurationTemplateConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn option(
        &mut self,
        namespace: impl Into<String>,
        option_name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.option_settings
            .push(OptionSetting::new(namespace, option_name, value));
        self
    }

    /// File settings followed by inline settings.
    ///
    /// A later entry for the same namespace/option/resource replaces the
    /// earlier one in place.
    pub fn resolved_option_settings(&self) -> Result<Vec<OptionSetting>> {
        let mut resolved = match &self.option_settings_file {
            Some(path) => load_option_settings(path)?,
            None => Vec::new(),
        };

        for setting in &self.option_settings {
            match resolved.iter_mut().find(|s| s.same_option(setting)) {
                Some(existing) => *existing = setting.clone(),
                None => resolved.push(setting.clone()),
            }
        }

        Ok(resolved)
    }
}

/// Configuration templates keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ConfigurationTemplates {
    templates: BTreeMap<String, ConfigurationTemplateConfig>,
}

impl ConfigurationTemplates {
    /// Template called `name`, created empty on first reference.
    pub fn get_or_create(&mut self, name: &str) -> &mut ConfigurationTemplateConfig {
        self.templates
            .entry(name.to_string())
            .or_insert_with(|| ConfigurationTemplateConfig::named(name))
    }

    /// Apply `configure` to the template called `name`.
    pub fn template<F>(&mut self, name: &str, configure: F) -> &mut Self
    where
        F: FnOnce(&mut ConfigurationTemplateConfig),
    {
        configure(self.get_or_create(name));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ConfigurationTemplateConfig> {
        self.templates.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigurationTemplateConfig)> {
        self.templates.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    // Deserialized entries carry their name only as the map key.
    pub(crate) fn assign_names(&mut self) {
        for (key, template) in self.templates.iter_mut() {
            if template.name.is_empty() {
                template.name = key.clone();
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (key, template) in &self.templates {
            if key.trim().is_empty() || template.name.trim().is_empty() {
                return Err(BeanstalkError::InvalidConfig(
                    "configuration template names must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_s3_location_requires_both_parts() {
        let mut version = AppVersionConfig::default();
        assert_eq!(version.s3_location(), None);

        version.bucket = Some("artifacts".into());
        assert_eq!(version.s3_location(), None);
        assert!(version.validate().is_err());

        version.key = Some("shop/1.0.zip".into());
        assert_eq!(version.s3_location(), Some(("artifacts", "shop/1.0.zip")));
        assert!(version.validate().is_ok());
    }

    #[test]
    fn test_environment_name_rules() {
        assert!(validate_environment_name("shop-prod").is_ok());
        assert!(validate_environment_name("abc").is_err());
        assert!(validate_environment_name("-shop").is_err());
        assert!(validate_environment_name("shop-").is_err());
        assert!(validate_environment_name("shop_prod").is_err());
        assert!(validate_environment_name(&"a".repeat(41)).is_err());
    }

    #[test]
    fn test_effective_version_label() {
        let version = AppVersionConfig {
            label: Some("v1".into()),
            ..Default::default()
        };
        let mut env = EnvironmentConfig::default();
        assert_eq!(env.effective_version_label(&version), Some("v1"));

        env.version_label = Some("v2".into());
        assert_eq!(env.effective_version_label(&version), Some("v2"));
    }

    #[test]
    fn test_get_or_create_returns_same_template() {
        let mut templates = ConfigurationTemplates::default();
        templates.get_or_create("prod").desc = "production".into();
        templates.get_or_create("prod").solution_stack_name = Some("stack".into());

        assert_eq!(templates.len(), 1);
        let prod = templates.get("prod").unwrap();
        assert_eq!(prod.name, "prod");
        assert_eq!(prod.desc, "production");
        assert_eq!(prod.solution_stack_name.as_deref(), Some("stack"));
    }

    #[test]
    fn test_template_applier_creates_distinct_entries() {
        let mut templates = ConfigurationTemplates::default();
        templates
            .template("prod", |t| t.desc = "p".into())
            .template("staging", |t| t.desc = "s".into());

        let names: Vec<&str> = templates.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["prod", "staging"]);
    }

    #[test]
    fn test_option_settings_file_in_aws_cli_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"Namespace": "aws:autoscaling:asg", "OptionName": "MinSize", "Value": "1"}},
                {{"Namespace": "aws:autoscaling:asg", "OptionName": "MaxSize", "Value": "4"}}
            ]"#
        )
        .unwrap();

        let mut template = ConfigurationTemplateConfig::named("prod");
        template.option_settings_file = Some(file.path().to_path_buf());
        template.option("aws:autoscaling:asg", "MaxSize", "8");
        template.option("aws:elasticbeanstalk:environment", "EnvironmentType", "LoadBalanced");

        let resolved = template.resolved_option_settings().unwrap();
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].option_name, "MinSize");
        assert_eq!(resolved[1].option_name, "MaxSize");
        assert_eq!(resolved[1].value.as_deref(), Some("8"));
        assert_eq!(resolved[2].option_name, "EnvironmentType");
    }

    #[test]
    fn test_missing_option_settings_file_is_io_error() {
        let mut template = ConfigurationTemplateConfig::named("prod");
        template.option_settings_file = Some(PathBuf::from("/nonexistent/options.json"));
        assert!(matches!(
            template.resolved_option_settings(),
            Err(BeanstalkError::Io(_))
        ));
    }

    #[test]
    fn test_assign_names_from_keys() {
        let mut templates: ConfigurationTemplates =
            serde_json::from_str(r#"{"prod": {"desc": "production"}}"#).unwrap();
        assert!(templates.get("prod").unwrap().name.is_empty());

        templates.assign_names();
        assert_eq!(templates.get("prod").unwrap().name, "prod");
        assert!(templates.validate().is_ok());
    }
}
