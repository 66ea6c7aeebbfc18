use super::Config;
use crate::cli::StartArgs;
use crate::constants::{
    DEFAULT_LISTEN_PORT, DEFAULT_LOGIN_TIMEOUT_SECS, DEFAULT_LOG_LEVEL, DEFAULT_PROW_CLUSTER_ALIAS,
    DEFAULT_PROW_HOST, DEFAULT_VSPHERE_DOMAIN, DEFAULT_VSPHERE_USER_AGENT,
    DEFAULT_WARNING_THRESHOLD_SECS,
};
use anyhow::{Context, Result};
use config::{Config as RConfig, Environment, File, FileFormat};
use std::path::PathBuf;

fn path_value(path: Option<&PathBuf>) -> Option<String> {
    path.map(|path| path.to_string_lossy().into_owned())
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Layers defaults, the optional TOML file, the environment and finally
    /// command line flags.
    pub fn load(config_file: Option<&str>, args: &StartArgs) -> Result<Config> {
        let mut builder = RConfig::builder()
            .set_default("warning_threshold", DEFAULT_WARNING_THRESHOLD_SECS)?
            .set_default("listen_port", i64::from(DEFAULT_LISTEN_PORT))?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("vsphere_user_agent", DEFAULT_VSPHERE_USER_AGENT)?
            .set_default("vsphere_insecure", false)?
            .set_default("vsphere_domain", DEFAULT_VSPHERE_DOMAIN)?
            .set_default("prow", DEFAULT_PROW_HOST)?
            .set_default("prow_cluster_alias", DEFAULT_PROW_CLUSTER_ALIAS)?
            .set_default("login_timeout", DEFAULT_LOGIN_TIMEOUT_SECS)?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder
            .add_source(Environment::default().try_parsing(true))
            .set_override_option("warning_threshold", args.warning_threshold)?
            .set_override_option("listen_port", args.listen_port.map(i64::from))?
            .set_override_option("log_level", args.log_level.clone())?
            .set_override_option("build_kubeconfig", path_value(args.build_kubeconfig.as_ref()))?
            .set_override_option("prow_kubeconfig", path_value(args.prow_kubeconfig.as_ref()))?
            .set_override_option("vsphere", args.vsphere.clone())?
            .set_override_option("vsphere_user", args.vsphere_user.clone())?
            .set_override_option("vsphere_passwd", args.vsphere_passwd.clone())?
            .set_override_option("vsphere_user_agent", args.vsphere_user_agent.clone())?
            .set_override_option("vsphere_insecure", args.vsphere_insecure.then_some(true))?
            .set_override_option("vsphere_domain", args.vsphere_domain.clone())?
            .set_override_option("prow", args.prow.clone())?
            .set_override_option("prow_cluster_alias", args.prow_cluster_alias.clone())?
            .set_override_option("login_timeout", args.login_timeout)?;

        let mut config: Config = builder
            .build()?
            .try_deserialize()
            .context("failed to parse configuration")?;

        // an empty PROW_KUBECONFIG means the public feed is used
        config.prow_kubeconfig = config
            .prow_kubeconfig
            .filter(|path| !path.as_os_str().is_empty());

        Ok(config)
    }
}
