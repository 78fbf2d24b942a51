//! Beanstalk Deploy
//!
//! Command-line driver for the Elastic Beanstalk deployment facade.

use anyhow::{Context, Result};
use beanstalk_deploy::{
    config::{AwsSettings, DeploymentConfig, SdkAwsExtension},
    logging::{self, DEFAULT_LOG_LEVEL},
    BeanstalkExtension,
};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Beanstalk Deploy
///
/// Query Elastic Beanstalk on behalf of a deployment configuration.
#[derive(Parser, Debug)]
#[command(name = "beanstalk-deploy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Deployment configuration file (toml, yaml or json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Credential profile (overrides the configuration file)
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Region (overrides the configuration file)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Application name (overrides the configuration file)
    #[arg(long, global = true)]
    app_name: Option<String>,

    /// Log level: trace, debug, info, warn, error (overrides LOG_LEVEL env var)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the CNAME of an environment
    Cname {
        /// Environment name
        environment: String,
    },
    /// Describe environments of the application (all when none are named)
    Describe {
        /// Environment names to filter on
        environments: Vec<String>,
    },
    /// Print the load balancer name of an environment
    ElbName {
        /// Environment name
        environment: String,
    },
    /// Print the newest solution stack for an OS and platform
    LatestStack {
        /// Solution stack prefix, e.g. "64bit Amazon Linux 2"
        #[arg(long)]
        os: String,
        /// Platform, e.g. "Corretto 17"
        #[arg(long)]
        platform: String,
    },
    /// Print the resolved deployment configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = args
        .log_level
        .clone()
        .or_else(|| env::var("LOG_LEVEL").ok())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    logging::init_tracing(&log_level, args.json_logs);

    let aws_settings = AwsSettings::load();

    let mut config = load_config(&args)?;
    if let Some(profile) = args.profile {
        config.profile_name = Some(profile);
    }
    if let Some(region) = args.region {
        config.region = Some(region);
    }

    tracing::debug!(
        app_name = %config.app_name,
        profile = ?config.profile_name,
        region = ?config.region,
        default_region = %aws_settings.region,
        "Resolved deployment configuration"
    );

    let aws = Arc::new(SdkAwsExtension::new(aws_settings));
    let extension = BeanstalkExtension::new(config, aws);

    match args.command {
        Command::Cname { environment } => {
            println!("{}", extension.environment_cname(&environment).await?);
        }
        Command::Describe { environments } => {
            let descs = extension.environment_descs(&environments).await?;
            println!("{}", serde_json::to_string_pretty(&descs)?);
        }
        Command::ElbName { environment } => {
            let desc = extension.environment_desc(&environment).await?;
            println!("{}", BeanstalkExtension::elb_name(&desc)?);
        }
        Command::LatestStack { os, platform } => {
            println!(
                "{}",
                extension.latest_solution_stack_name(&os, &platform).await?
            );
        }
        Command::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(extension.config())?);
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<DeploymentConfig> {
    DeploymentConfig::load_with_app_name(args.config.as_deref(), args.app_name.as_deref())
        .with_context(|| match &args.config {
            Some(path) => format!(
                "Failed to load deployment configuration from {}",
                path.display()
            ),
            None => "Failed to load deployment configuration".to_string(),
        })
}
