use super::job::{Job, JobState, ProwJobList};
use super::JobSource;
use crate::constants::PROWJOBS_FEED_PATH;
use crate::errors::JobSourceError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, trace};
use url::Url;

/// Reads the public `prowjobs.js` feed of a Prow deployment.
pub struct AnonymousJobSource {
    url: Url,
    cluster_alias: String,
    http: Client,
}

impl AnonymousJobSource {
    pub fn new(prow_host: &str, cluster_alias: &str) -> Result<Self, JobSourceError> {
        let url = Url::parse(&format!("https://{prow_host}/{PROWJOBS_FEED_PATH}")).map_err(|e| {
            JobSourceError::UpstreamUnavailable(format!("invalid prow host {prow_host}: {e}"))
        })?;
        Ok(Self::with_url(url, cluster_alias))
    }

    pub fn with_url(url: Url, cluster_alias: &str) -> Self {
        Self {
            url,
            cluster_alias: cluster_alias.to_string(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl JobSource for AnonymousJobSource {
    async fn fetch(&self) -> Result<Vec<Job>, JobSourceError> {
        trace!("Getting data from {}", self.url);
        let response = self.http.get(self.url.clone()).send().await.map_err(|e| {
            JobSourceError::UpstreamUnavailable(format!("error retrieving list of prow jobs: {e}"))
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(JobSourceError::UpstreamUnavailable(format!(
                "unexpected status from prow ({})",
                status.as_u16()
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            JobSourceError::UpstreamUnavailable(format!("error while reading prow response body: {e}"))
        })?;
        let job_list: ProwJobList = serde_json::from_slice(&body).map_err(|e| {
            JobSourceError::DecodeError(format!("error while parsing prow JSON response: {e}"))
        })?;

        // Only keep pending jobs scheduled on this backend
        let jobs: Vec<Job> = job_list
            .items
            .into_iter()
            .filter(|job| job.cluster_alias() == self.cluster_alias)
            .filter(|job| job.state() == JobState::Pending)
            .map(Job::from)
            .collect();

        debug!("Found {} relevant Prow jobs", jobs.len());
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::spawn_router;
    use axum::extract::Query;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;

    const FEED: &str = r#"{"items": [
        {"metadata": {"labels": {"prow.k8s.io/build-id": "1"}}, "spec": {"cluster": "vsphere"}, "status": {"state": "pending"}},
        {"metadata": {"labels": {"prow.k8s.io/build-id": "2"}}, "spec": {"cluster": "vsphere"}, "status": {"state": "success"}},
        {"metadata": {"labels": {"prow.k8s.io/build-id": "3"}}, "spec": {"cluster": "build01"}, "status": {"state": "pending"}},
        {"metadata": {"labels": {"prow.k8s.io/build-id": "4"}}, "spec": {"cluster": "vsphere"}, "status": {"state": "pending"}}
    ]}"#;

    async fn feed(Query(query): Query<HashMap<String, String>>) -> (AxumStatus, &'static str) {
        if query.get("omit").map(String::as_str) != Some("decoration_config") {
            return (AxumStatus::BAD_REQUEST, "missing omit");
        }
        (AxumStatus::OK, FEED)
    }

    fn source_for(addr: std::net::SocketAddr, path: &str) -> AnonymousJobSource {
        let url = Url::parse(&format!("http://{addr}{path}")).unwrap();
        AnonymousJobSource::with_url(url, "vsphere")
    }

    #[tokio::test]
    async fn test_fetch_keeps_pending_jobs_of_alias() {
        let addr = spawn_router(Router::new().route("/prowjobs.js", get(feed))).await;
        let source = source_for(addr, "/prowjobs.js?omit=decoration_config");

        let jobs = source.fetch().await.unwrap();
        let build_ids: Vec<&str> = jobs.iter().map(Job::build_id).collect();
        assert_eq!(build_ids, vec!["1", "4"]);
        assert!(jobs.iter().all(Job::is_pending));
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let router = Router::new().route(
            "/prowjobs.js",
            get(|| async { (AxumStatus::SERVICE_UNAVAILABLE, "down") }),
        );
        let addr = spawn_router(router).await;
        let source = source_for(addr, "/prowjobs.js");

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, JobSourceError::UpstreamUnavailable(msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_fetch_undecodable_body() {
        let router = Router::new().route("/prowjobs.js", get(|| async { "var allBuilds = [];" }));
        let addr = spawn_router(router).await;
        let source = source_for(addr, "/prowjobs.js");

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, JobSourceError::DecodeError(_)));
    }

    #[test]
    fn test_new_builds_feed_url() {
        let source = AnonymousJobSource::new("prow.ci.openshift.org", "vsphere").unwrap();
        assert_eq!(
            source.url.as_str(),
            "https://prow.ci.openshift.org/prowjobs.js?omit=decoration_config"
        );
    }
}
