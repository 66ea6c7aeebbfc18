use super::commands::{Cli, Command};
use crate::build::BuildUserResolver;
use crate::config::{Config, ConfigLoader};
use crate::exporter::{CorrelationEngine, EngineOptions, ExporterServer};
use crate::kube::KubeClient;
use crate::logging::setup_logging;
use crate::prow::{AnonymousJobSource, AuthenticatedJobSource, JobSourceKind};
use crate::vsphere::VsphereClient;
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info};

/// Process the command line.
pub fn process_command() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Start(args) => {
            let config = ConfigLoader::load(cli.config.as_deref(), &args)?;
            setup_logging(&config.log_level)?;
            start(config)
        }
    }
}

fn job_source(config: &Config) -> Result<JobSourceKind> {
    let source = match &config.prow_kubeconfig {
        Some(path) => {
            let client = KubeClient::from_kubeconfig(path)
                .with_context(|| format!("error loading prow kubeconfig {}", path.display()))?;
            JobSourceKind::Authenticated(AuthenticatedJobSource::new(
                client,
                &config.prow_cluster_alias,
            ))
        }
        None => JobSourceKind::Anonymous(AnonymousJobSource::new(
            &config.prow,
            &config.prow_cluster_alias,
        )?),
    };
    Ok(source)
}

#[tokio::main]
pub async fn start(config: Config) -> Result<()> {
    config.validate().await?;
    debug!("configuration: {:?}", config);

    let build_cluster = KubeClient::from_kubeconfig(&config.build_kubeconfig).with_context(|| {
        format!(
            "error loading build kubeconfig {}",
            config.build_kubeconfig.display()
        )
    })?;
    let jobs = job_source(&config)?;
    info!("Reading Prow jobs with {}", jobs.variant_name());

    let vsphere = VsphereClient::new(
        &config.vsphere,
        &config.vsphere_user,
        &config.vsphere_passwd,
        &config.vsphere_user_agent,
        config.vsphere_insecure,
    )?;

    let engine = CorrelationEngine::new(
        Arc::new(vsphere),
        BuildUserResolver::new(Arc::new(build_cluster), &config.vsphere),
        Arc::new(jobs),
        EngineOptions::from_config(&config),
    )
    .context("failed to create exporter metrics")?;

    let server = ExporterServer::bind(Arc::new(engine), config.listen_port).await?;
    info!("Launching on :{}...", config.listen_port);
    server.run().await
}
