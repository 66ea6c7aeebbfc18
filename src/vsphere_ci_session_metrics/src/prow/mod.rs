mod anonymous;
mod authenticated;
mod job;

pub use anonymous::AnonymousJobSource;
pub use authenticated::AuthenticatedJobSource;
pub use job::{pull_request_link_of, target_of, Job, JobState, ProwJob, ProwJobList};

use crate::errors::JobSourceError;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Provides the pending Prow jobs scheduled on this vSphere backend.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Job>, JobSourceError>;
}

/// The job source picked at startup: the authenticated one when a Prow
/// kubeconfig was supplied, the public feed otherwise.
pub enum JobSourceKind {
    Anonymous(AnonymousJobSource),
    Authenticated(AuthenticatedJobSource),
}

#[async_trait]
impl JobSource for JobSourceKind {
    async fn fetch(&self) -> Result<Vec<Job>, JobSourceError> {
        match self {
            JobSourceKind::Anonymous(source) => source.fetch().await,
            JobSourceKind::Authenticated(source) => source.fetch().await,
        }
    }
}

impl JobSourceKind {
    pub fn variant_name(&self) -> &'static str {
        match self {
            JobSourceKind::Anonymous(_) => "AnonymousJobSource",
            JobSourceKind::Authenticated(_) => "AuthenticatedJobSource",
        }
    }
}
