pub const METRICS_NAMESPACE: &str = "vsphere_ci_user_sessions";

pub const DEFAULT_WARNING_THRESHOLD_SECS: f64 = 30.0;
pub const DEFAULT_LISTEN_PORT: u16 = 8090;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_VSPHERE_USER_AGENT: &str = "vsphere-ci-session-metrics";
pub const DEFAULT_VSPHERE_DOMAIN: &str = "vsphere.local";
pub const DEFAULT_PROW_HOST: &str = "prow.ci.openshift.org";
pub const DEFAULT_PROW_CLUSTER_ALIAS: &str = "vsphere";
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 60;

// Prow job labels
pub const BUILD_ID_LABEL: &str = "prow.k8s.io/build-id";
pub const JOB_NAME_LABEL: &str = "prow.k8s.io/job";
pub const CLOUD_LABEL: &str = "ci-operator.openshift.io/cloud";

// Build cluster layout
pub const CI_NAMESPACE: &str = "ci";
pub const TEST_CONTAINER: &str = "test";
pub const METADATA_SECRET_KEY: &str = "metadata.json";

pub const PROWJOBS_FEED_PATH: &str = "prowjobs.js?omit=decoration_config";
