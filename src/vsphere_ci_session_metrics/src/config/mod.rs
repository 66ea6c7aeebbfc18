mod config_loader;
mod tests;

pub use config_loader::ConfigLoader;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, trace};

#[derive(Clone, Deserialize)]
pub struct Config {
    pub warning_threshold: f64,
    pub listen_port: u16,
    pub log_level: String,

    pub build_kubeconfig: PathBuf,
    pub prow_kubeconfig: Option<PathBuf>,

    pub vsphere: String,
    pub vsphere_user: String,
    pub vsphere_passwd: String,
    pub vsphere_user_agent: String,
    pub vsphere_insecure: bool,
    pub vsphere_domain: String,

    pub prow: String,
    pub prow_cluster_alias: String,

    pub login_timeout: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("warning_threshold", &self.warning_threshold)
            .field("listen_port", &self.listen_port)
            .field("log_level", &self.log_level)
            .field("build_kubeconfig", &self.build_kubeconfig)
            .field("prow_kubeconfig", &self.prow_kubeconfig)
            .field("vsphere", &self.vsphere)
            .field("vsphere_user", &self.vsphere_user)
            .field("vsphere_passwd", &"<redacted>")
            .field("vsphere_user_agent", &self.vsphere_user_agent)
            .field("vsphere_insecure", &self.vsphere_insecure)
            .field("vsphere_domain", &self.vsphere_domain)
            .field("prow", &self.prow)
            .field("prow_cluster_alias", &self.prow_cluster_alias)
            .field("login_timeout", &self.login_timeout)
            .finish()
    }
}

impl Config {
    /// Checks that referenced files exist and hostnames resolve.
    pub async fn validate(&self) -> Result<()> {
        ensure!(
            self.warning_threshold.is_finite() && self.warning_threshold >= 0.0,
            "warning threshold must be a non-negative number of seconds, got {}",
            self.warning_threshold
        );
        ensure!(
            self.login_timeout > 0,
            "login timeout must be at least one second"
        );

        trace!(
            "validating build cluster kubeconfig path: {}",
            self.build_kubeconfig.display()
        );
        ensure!(
            self.build_kubeconfig.exists(),
            "error finding build kubeconfig {}",
            self.build_kubeconfig.display()
        );

        if let Some(path) = &self.prow_kubeconfig {
            trace!("validating prow kubeconfig path: {}", path.display());
            ensure!(path.exists(), "error finding prow kubeconfig {}", path.display());
        }

        for host in [&self.vsphere, &self.prow] {
            trace!("validating hostname: {}", host);
            let mut addrs = tokio::net::lookup_host((host.as_str(), 443))
                .await
                .with_context(|| format!("unable to resolve {host}"))?;
            ensure!(addrs.next().is_some(), "no addresses found: {host}");
            debug!("resolved hostname: {}", host);
        }

        Ok(())
    }
}
