//! Beanstalk deployment facade
//!
//! [`BeanstalkExtension`] pairs a [`DeploymentConfig`] with an
//! [`AwsExtension`] and answers the read-only queries a build needs:
//! environment CNAMEs and descriptions, load balancer names, and the newest
//! solution stack for a platform.
//!
//! The Elastic Beanstalk client is created on first use and reused for the
//! life of the facade. Changing `profile_name` or `region` afterwards does not
//! rebuild it.

use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::config::{
    AppVersionConfig, AwsExtension, ConfigurationTemplateConfig, ConfigurationTemplates,
    DeploymentConfig, EnvironmentConfig,
};
use crate::error::{BeanstalkError, Result};
use crate::services::{naming, BeanstalkApi, EnvironmentDescription};

pub struct BeanstalkExtension {
    config: DeploymentConfig,
    aws: Arc<dyn AwsExtension>,
    client: OnceCell<Arc<dyn BeanstalkApi>>,
}

impl BeanstalkExtension {
    /// Name the extension is registered under in a build.
    pub const NAME: &'static str = "beanstalk";

    pub fn new(config: DeploymentConfig, aws: Arc<dyn AwsExtension>) -> Self {
        Self {
            config,
            aws,
            client: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DeploymentConfig {
        &mut self.config
    }

    pub fn version<F>(&mut self, configure: F)
    where
        F: FnOnce(&mut AppVersionConfig),
    {
        self.config.version(configure);
    }

    pub fn environment<F>(&mut self, configure: F)
    where
        F: FnOnce(&mut EnvironmentConfig),
    {
        self.config.environment(configure);
    }

    pub fn configuration_templates<F>(&mut self, configure: F)
    where
        F: FnOnce(&mut ConfigurationTemplates),
    {
        self.config.configuration_templates(configure);
    }

    pub fn configuration_template<F>(&mut self, name: &str, configure: F)
    where
        F: FnOnce(&mut ConfigurationTemplateConfig),
    {
        self.config.configuration_template(name, configure);
    }

    /// Whether the client has been built yet.
    pub fn is_client_initialized(&self) -> bool {
        self.client.initialized()
    }

    /// The Elastic Beanstalk client, built on first call.
    ///
    /// Concurrent first callers wait on a single construction. A failed
    /// construction is not cached; the next call tries again.
    pub async fn client(&self) -> Result<Arc<dyn BeanstalkApi>> {
        let client = self
            .client
            .get_or_try_init(|| self.init_client())
            .await?;
        Ok(Arc::clone(client))
    }

    async fn init_client(&self) -> Result<Arc<dyn BeanstalkApi>> {
        let region = self.aws.active_region(self.config.region.as_deref());

        tracing::info!(
            profile = ?self.config.profile_name,
            region = %region,
            "Creating Elastic Beanstalk client"
        );

        self.aws
            .create_client(self.config.profile_name.as_deref(), region)
            .await
    }

    /// CNAME of the named environment.
    ///
    /// Fails with [`BeanstalkError::EnvironmentNotFound`] when the application
    /// has no such environment, and [`BeanstalkError::MissingAttribute`] when
    /// the environment has no CNAME.
    pub async fn environment_cname(&self, environment_name: &str) -> Result<String> {
        let env = self.environment_desc(environment_name).await?;

        env.cname
            .filter(|cname| !cname.is_empty())
            .ok_or_else(|| BeanstalkError::MissingAttribute {
                environment: environment_name.to_string(),
                attribute: "CNAME",
            })
    }

    /// Description of the named environment.
    pub async fn environment_desc(&self, environment_name: &str) -> Result<EnvironmentDescription> {
        let app_name = self.config.require_app_name()?;

        self.environment_descs(&[environment_name.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BeanstalkError::EnvironmentNotFound {
                application: app_name.to_string(),
                environment: environment_name.to_string(),
            })
    }

    /// Descriptions of the application's environments, in service order.
    ///
    /// An empty `environment_names` applies no name filter. Only the first
    /// page of results is returned.
    pub async fn environment_descs(
        &self,
        environment_names: &[String],
    ) -> Result<Vec<EnvironmentDescription>> {
        let app_name = self.config.require_app_name()?;
        let filter = if environment_names.is_empty() {
            None
        } else {
            Some(environment_names.to_vec())
        };

        let client = self.client().await?;
        client.describe_environments(app_name, filter).await
    }

    /// Load balancer name derived from the environment's endpoint URL.
    ///
    /// See [`naming::elb_name_from_endpoint`] for the expected URL shape.
    pub fn elb_name(env: &EnvironmentDescription) -> Result<String> {
        let endpoint = env
            .endpoint_url
            .as_deref()
            .ok_or_else(|| BeanstalkError::MalformedEndpoint(String::new()))?;

        naming::elb_name_from_endpoint(endpoint).map(str::to_string)
    }

    /// First available solution stack for `os` running `platform`.
    ///
    /// Stacks are not scoped to an application, so no `app_name` is needed.
    pub async fn latest_solution_stack_name(&self, os: &str, platform: &str) -> Result<String> {
        let stacks = self.client().await?.list_available_solution_stacks().await?;

        naming::find_solution_stack(&stacks, os, platform)
            .map(str::to_string)
            .ok_or_else(|| BeanstalkError::NoMatchingSolutionStack {
                os: os.to_string(),
                platform: platform.to_string(),
            })
    }
}
