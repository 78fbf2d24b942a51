//! Elastic Beanstalk service access
//!
//! [`BeanstalkApi`] is the narrow slice of the Elastic Beanstalk API the
//! deployment facade consumes. The production implementation is the AWS SDK
//! client itself; tests substitute an in-memory fake.

use async_trait::async_trait;
use aws_sdk_elasticbeanstalk::{types, Client as ElasticBeanstalkClient};
use serde::Serialize;

use crate::error::{BeanstalkError, Result};

/// Summary of one Elastic Beanstalk environment.
///
/// Mirrors the fields of the service's `EnvironmentDescription` that callers
/// of this crate read. Absent fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvironmentDescription {
    pub environment_name: Option<String>,
    pub environment_id: Option<String>,
    pub application_name: Option<String>,
    pub version_label: Option<String>,
    pub solution_stack_name: Option<String>,
    pub template_name: Option<String>,
    pub description: Option<String>,
    pub endpoint_url: Option<String>,
    pub cname: Option<String>,
    pub status: Option<String>,
    pub health: Option<String>,
    pub tier: Option<String>,
}

impl From<&types::EnvironmentDescription> for EnvironmentDescription {
    fn from(env: &types::EnvironmentDescription) -> Self {
        Self {
            environment_name: env.environment_name().map(str::to_string),
            environment_id: env.environment_id().map(str::to_string),
            application_name: env.application_name().map(str::to_string),
            version_label: env.version_label().map(str::to_string),
            solution_stack_name: env.solution_stack_name().map(str::to_string),
            template_name: env.template_name().map(str::to_string),
            description: env.description().map(str::to_string),
            endpoint_url: env.endpoint_url().map(str::to_string),
            cname: env.cname().map(str::to_string),
            status: env.status().map(|s| s.as_str().to_string()),
            health: env.health().map(|h| h.as_str().to_string()),
            tier: env.tier().and_then(|t| t.name()).map(str::to_string),
        }
    }
}

/// Remote operations used by the deployment facade.
#[async_trait]
pub trait BeanstalkApi: Send + Sync {
    /// `DescribeEnvironments` for one application.
    ///
    /// `environment_names` of `None` means no name filter. Only the first
    /// page of results is returned.
    async fn describe_environments(
        &self,
        application_name: &str,
        environment_names: Option<Vec<String>>,
    ) -> Result<Vec<EnvironmentDescription>>;

    /// `ListAvailableSolutionStacks`, names only, in service order.
    async fn list_available_solution_stacks(&self) -> Result<Vec<String>>;
}

#[async_trait]
impl BeanstalkApi for ElasticBeanstalkClient {
    async fn describe_environments(
        &self,
        application_name: &str,
        environment_names: Option<Vec<String>>,
    ) -> Result<Vec<EnvironmentDescription>> {
        tracing::debug!(
            application = %application_name,
            filter = ?environment_names,
            "Calling Elastic Beanstalk DescribeEnvironments"
        );

        let output = ElasticBeanstalkClient::describe_environments(self)
            .application_name(application_name)
            .set_environment_names(environment_names)
            .send()
            .await
            .map_err(|e| BeanstalkError::from_sdk_error("DescribeEnvironments", e))?;

        let environments: Vec<EnvironmentDescription> = output
            .environments()
            .iter()
            .map(EnvironmentDescription::from)
            .collect();

        tracing::debug!(
            count = environments.len(),
            "DescribeEnvironments completed"
        );

        Ok(environments)
    }

    async fn list_available_solution_stacks(&self) -> Result<Vec<String>> {
        tracing::debug!("Calling Elastic Beanstalk ListAvailableSolutionStacks");

        let output = ElasticBeanstalkClient::list_available_solution_stacks(self)
            .send()
            .await
            .map_err(|e| BeanstalkError::from_sdk_error("ListAvailableSolutionStacks", e))?;

        Ok(output.solution_stacks().to_vec())
    }
}
