#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use vsphere_ci_session_metrics::build::BuildUserResolver;
use vsphere_ci_session_metrics::constants::{BUILD_ID_LABEL, JOB_NAME_LABEL, METADATA_SECRET_KEY};
use vsphere_ci_session_metrics::errors::{JobSourceError, KubeError, VsphereError};
use vsphere_ci_session_metrics::exporter::{get_router, CorrelationEngine, EngineOptions};
use vsphere_ci_session_metrics::kube::{BuildCluster, LogStream, PodRef, Secret};
use vsphere_ci_session_metrics::prow::{Job, JobSource, JobState};
use vsphere_ci_session_metrics::vsphere::{ServiceContent, Session, VsphereApi, VsphereSession};

pub const VCENTER: &str = "vcenter.ci.example.com";

/// vCenter that serves a fixed session table and records overlapping scrapes.
#[derive(Default)]
pub struct FakeVsphere {
    pub sessions: Vec<Session>,
    pub fail_login: bool,
    pub list_delay: Duration,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub logouts: AtomicUsize,
}

#[async_trait]
impl VsphereApi for FakeVsphere {
    async fn login(&self) -> Result<VsphereSession, VsphereError> {
        if self.fail_login {
            return Err(VsphereError::Fault {
                fault: "Cannot complete login due to an incorrect user name or password."
                    .to_string(),
            });
        }
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        Ok(VsphereSession::new(
            reqwest::Client::new(),
            ServiceContent::default(),
        ))
    }

    async fn list_sessions(&self, _: &VsphereSession) -> Result<Vec<Session>, VsphereError> {
        tokio::time::sleep(self.list_delay).await;
        Ok(self.sessions.clone())
    }

    async fn logout(&self, _: VsphereSession) -> Result<(), VsphereError> {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.logouts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Build cluster where each build id maps to (namespace, metadata.json user).
#[derive(Default)]
pub struct FakeBuildCluster {
    pub builds: HashMap<String, (String, String)>,
}

impl FakeBuildCluster {
    pub fn with_build(mut self, build_id: &str, namespace: &str, user: &str) -> Self {
        self.builds
            .insert(build_id.to_string(), (namespace.to_string(), user.to_string()));
        self
    }
}

#[async_trait]
impl BuildCluster for FakeBuildCluster {
    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<PodRef>, KubeError> {
        let build_id = selector.rsplit('=').next().unwrap_or_default();
        Ok(self
            .builds
            .contains_key(build_id)
            .then(|| PodRef {
                namespace: namespace.to_string(),
                name: build_id.to_string(),
            })
            .into_iter()
            .collect())
    }

    async fn stream_pod_log(&self, pod: &PodRef, _: &str) -> Result<LogStream, KubeError> {
        let (namespace, _) = &self.builds[&pod.name];
        let log = format!(
            "INFO Resolved release latest\nINFO Using namespace https://console/k8s/cluster/projects/{namespace}\nINFO Running e2e-vsphere\n"
        );
        Ok(stream::iter(vec![Ok::<_, KubeError>(Bytes::from(log))]).boxed())
    }

    async fn get_secret(&self, namespace: &str, _: &str) -> Result<Secret, KubeError> {
        let (_, user) = self
            .builds
            .values()
            .find(|(ns, _)| ns == namespace)
            .ok_or_else(|| KubeError::Status {
                status: 404,
                body: "not found".to_string(),
            })?;
        let metadata = serde_json::json!({"vsphere": {"vCenter": VCENTER, "username": user}});
        Ok(Secret {
            data: BTreeMap::from([(
                METADATA_SECRET_KEY.to_string(),
                metadata.to_string().into_bytes(),
            )]),
        })
    }
}

pub struct FakeJobSource {
    pub jobs: Result<Vec<Job>, String>,
}

#[async_trait]
impl JobSource for FakeJobSource {
    async fn fetch(&self) -> Result<Vec<Job>, JobSourceError> {
        self.jobs
            .clone()
            .map_err(JobSourceError::UpstreamUnavailable)
    }
}

pub fn pending_job(build_id: &str, name: &str, target: &str, pull: &str) -> Job {
    Job {
        labels: HashMap::from([
            (BUILD_ID_LABEL.to_string(), build_id.to_string()),
            (JOB_NAME_LABEL.to_string(), name.to_string()),
        ]),
        pod_spec_args: vec![
            "--secret-dir=/usr/local/e2e-vsphere-cluster-profile".to_string(),
            format!("--target={target}"),
        ],
        pull_request_links: vec![pull.to_string()],
        state: JobState::Pending,
        ..Default::default()
    }
}

pub fn engine(
    vsphere: Arc<FakeVsphere>,
    cluster: FakeBuildCluster,
    jobs: FakeJobSource,
) -> CorrelationEngine {
    CorrelationEngine::new(
        vsphere,
        BuildUserResolver::new(Arc::new(cluster), VCENTER),
        Arc::new(jobs),
        EngineOptions {
            backend: VCENTER.to_string(),
            domain: "vsphere.local".to_string(),
            warning_threshold: Duration::from_secs(30),
            login_timeout: Duration::from_secs(5),
        },
    )
    .unwrap()
}

/// Serves the exporter router on an ephemeral port.
pub async fn serve(engine: CorrelationEngine) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = get_router(Arc::new(engine));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Value of the unlabelled series `name`, if present.
pub fn sample(body: &str, name: &str) -> Option<f64> {
    body.lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| line.strip_prefix(name)?.strip_prefix(' ')?.parse().ok())
}
