use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(
    name = "vsphere-ci-session-metrics",
    about = "Correlates vCenter sessions with the Prow CI jobs that opened them",
    version
)]
pub struct Cli {
    /// Optional TOML file with any of the start settings
    #[clap(long, global = true)]
    pub config: Option<String>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start metrics exporter server
    Start(Box<StartArgs>),
}

/// Every value is optional here so that unset flags fall through to the
/// config file and built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct StartArgs {
    /// print a warning when scrapes take more than this many seconds
    #[clap(long, env = "WARNING_THRESHOLD")]
    pub warning_threshold: Option<f64>,

    /// exporter will listen on this port
    #[clap(long, env = "LISTEN_PORT")]
    pub listen_port: Option<u16>,

    /// set log level (e.g. debug, warn, error)
    #[clap(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// path to build cluster kubeconfig
    #[clap(long, env = "BUILD_KUBECONFIG")]
    pub build_kubeconfig: Option<PathBuf>,

    /// path to prow kubeconfig
    #[clap(long, env = "PROW_KUBECONFIG")]
    pub prow_kubeconfig: Option<PathBuf>,

    /// vSphere hostname (do not include scheme)
    #[clap(long, env = "VSPHERE")]
    pub vsphere: Option<String>,

    /// username for vSphere
    #[clap(long, env = "VSPHERE_USER")]
    pub vsphere_user: Option<String>,

    /// password for vSphere
    #[clap(long, env = "VSPHERE_PASSWD", hide_env_values = true)]
    pub vsphere_passwd: Option<String>,

    /// user agent to vSphere communication
    #[clap(long, env = "VSPHERE_USER_AGENT")]
    pub vsphere_user_agent: Option<String>,

    /// skip TLS certificate verification towards vSphere
    #[clap(long, env = "VSPHERE_INSECURE")]
    pub vsphere_insecure: bool,

    /// SSO domain of the vSphere users
    #[clap(long, env = "VSPHERE_DOMAIN")]
    pub vsphere_domain: Option<String>,

    /// hostname of the Prow CI instance
    #[clap(long, env = "PROW")]
    pub prow: Option<String>,

    /// Prow cluster alias of this vSphere backend
    #[clap(long, env = "PROW_CLUSTER_ALIAS")]
    pub prow_cluster_alias: Option<String>,

    /// seconds to wait for a vSphere login
    #[clap(long, env = "LOGIN_TIMEOUT")]
    pub login_timeout: Option<u64>,
}
