use super::job::{Job, JobState, ProwJob};
use super::JobSource;
use crate::constants::{CI_NAMESPACE, CLOUD_LABEL};
use crate::errors::JobSourceError;
use crate::kube::KubeClient;
use async_trait::async_trait;
use tracing::{debug, trace};

/// Lists ProwJob objects straight from the Prow control plane cluster.
pub struct AuthenticatedJobSource {
    client: KubeClient,
    label_selector: String,
}

impl AuthenticatedJobSource {
    pub fn new(client: KubeClient, cluster_alias: &str) -> Self {
        Self {
            client,
            label_selector: format!("{CLOUD_LABEL}={cluster_alias}"),
        }
    }

    fn path() -> String {
        format!("/apis/prow.k8s.io/v1/namespaces/{CI_NAMESPACE}/prowjobs")
    }
}

#[async_trait]
impl JobSource for AuthenticatedJobSource {
    async fn fetch(&self) -> Result<Vec<Job>, JobSourceError> {
        trace!("Getting data from k8s");
        let prow_jobs: Vec<ProwJob> = self
            .client
            .list(&Self::path(), &self.label_selector)
            .await?;

        // The label selector narrows candidates, state is filtered here
        let jobs: Vec<Job> = prow_jobs
            .into_iter()
            .filter(|job| job.state() == JobState::Pending)
            .map(Job::from)
            .collect();

        debug!("Found {} relevant Prow jobs", jobs.len());
        Ok(jobs)
    }
}
