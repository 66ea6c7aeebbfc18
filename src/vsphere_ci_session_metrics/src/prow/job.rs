use crate::constants::{BUILD_ID_LABEL, JOB_NAME_LABEL};
use crate::errors::TargetNotFound;
use serde::Deserialize;
use std::collections::HashMap;

const TARGET_ARG_PREFIX: &str = "--target=";

// Wire format of ProwJobs, shared by the public feed and the prowjobs CRD.
// Only the fields read by the exporter are modelled.

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProwJobList {
    #[serde(default)]
    pub items: Vec<ProwJob>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProwJob {
    #[serde(default)]
    pub metadata: ProwJobMeta,
    #[serde(default)]
    pub spec: ProwJobSpec,
    #[serde(default)]
    pub status: ProwJobStatus,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProwJobMeta {
    #[serde(default)]
    pub name: String,
    pub labels: Option<HashMap<String, String>>,
    pub annotations: Option<HashMap<String, String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProwJobSpec {
    /// Build cluster alias the job is scheduled on.
    pub cluster: Option<String>,
    pub refs: Option<Refs>,
    pub pod_spec: Option<PodSpec>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Refs {
    pub pulls: Option<Vec<Pull>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Pull {
    #[serde(default)]
    pub number: u64,
    pub link: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PodSpec {
    pub containers: Option<Vec<Container>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Container {
    pub args: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProwJobStatus {
    pub state: Option<JobState>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    #[default]
    #[serde(other)]
    Other,
}

impl ProwJob {
    pub fn cluster_alias(&self) -> &str {
        self.spec.cluster.as_deref().unwrap_or_default()
    }

    pub fn state(&self) -> JobState {
        self.status.state.unwrap_or_default()
    }
}

/// A CI job as seen by the correlation engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Job {
    pub labels: HashMap<String, String>,
    pub annotations: HashMap<String, String>,
    /// Arguments of the job's first container.
    pub pod_spec_args: Vec<String>,
    pub pull_request_links: Vec<String>,
    pub state: JobState,
}

impl From<ProwJob> for Job {
    fn from(job: ProwJob) -> Self {
        let state = job.state();
        let ProwJob { metadata, spec, .. } = job;

        let pod_spec_args = spec
            .pod_spec
            .and_then(|pod_spec| pod_spec.containers)
            .and_then(|containers| containers.into_iter().next())
            .and_then(|container| container.args)
            .unwrap_or_default();

        let pull_request_links = spec
            .refs
            .and_then(|refs| refs.pulls)
            .unwrap_or_default()
            .into_iter()
            .map(|pull| pull.link.unwrap_or_default())
            .collect();

        Self {
            labels: metadata.labels.unwrap_or_default(),
            annotations: metadata.annotations.unwrap_or_default(),
            pod_spec_args,
            pull_request_links,
            state,
        }
    }
}

impl Job {
    fn label(&self, key: &str) -> &str {
        self.labels.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn build_id(&self) -> &str {
        self.label(BUILD_ID_LABEL)
    }

    pub fn job_name(&self) -> &str {
        self.label(JOB_NAME_LABEL)
    }

    pub fn is_pending(&self) -> bool {
        self.state == JobState::Pending
    }
}

fn target_from_args(args: &[String]) -> Option<&str> {
    args.iter()
        .find_map(|arg| arg.strip_prefix(TARGET_ARG_PREFIX))
}

/// Value of the first `--target=` argument of the job's step.
pub fn target_of(job: &Job) -> Result<String, TargetNotFound> {
    match target_from_args(&job.pod_spec_args) {
        Some(target) if !target.is_empty() => Ok(target.to_string()),
        _ => Err(TargetNotFound),
    }
}

/// First non-empty pull request link; jobs covering several PRs report only one.
pub fn pull_request_link_of(job: &Job) -> String {
    job.pull_request_links
        .iter()
        .find(|link| !link.is_empty())
        .cloned()
        .unwrap_or_default()
}
