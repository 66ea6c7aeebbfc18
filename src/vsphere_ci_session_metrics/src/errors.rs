use thiserror::Error;

#[derive(Debug, Error)]
pub enum VsphereError {
    #[error("vsphere session acquisition timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("vsphere request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vsphere returned fault: {fault}")]
    Fault { fault: String },

    #[error("unable to decode vsphere response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum KubeError {
    #[error("invalid kubeconfig: {0}")]
    Config(String),

    #[error("kubernetes request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("kubernetes API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unable to decode kubernetes response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum JobSourceError {
    #[error("job source unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("unable to decode job list: {0}")]
    DecodeError(String),
}

impl From<KubeError> for JobSourceError {
    fn from(err: KubeError) -> Self {
        match err {
            KubeError::Decode(msg) => JobSourceError::DecodeError(msg),
            other => JobSourceError::UpstreamUnavailable(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
#[error("unable to find --target arg in prow job")]
pub struct TargetNotFound;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("error listing pods for build id {build_id}: {source}")]
    PodQuery {
        build_id: String,
        #[source]
        source: KubeError,
    },

    #[error("expected exactly one pod for build id {build_id}, found {found}")]
    Resolution { build_id: String, found: usize },

    #[error("error streaming logs of pod {pod}: {source}")]
    LogStream {
        pod: String,
        #[source]
        source: KubeError,
    },

    #[error("unable to find any matching ci-op-* namespace in logs of pod {pod}")]
    NamespaceNotFound { pod: String },

    #[error("error reading secret {namespace}/{name}: {source}")]
    SecretFetch {
        namespace: String,
        name: String,
        #[source]
        source: KubeError,
    },
}
