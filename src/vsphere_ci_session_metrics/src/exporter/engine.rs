use super::metrics::{correlated_gauge, ExporterMetrics};
use crate::build::BuildUserResolver;
use crate::config::Config;
use crate::errors::VsphereError;
use crate::prow::{pull_request_link_of, target_of, Job, JobSource};
use crate::vsphere::{SessionDirectory, UsernameNormalizer, VsphereApi, VsphereSession};
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// One correlated (job, vCenter session user agent) pair of a scrape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelatedObservation {
    pub username: String,
    pub user_agent: String,
    pub job_name: String,
    pub build_id: String,
    pub pull_request_link: String,
    pub backend: String,
    pub count: u64,
}

/// Result of the data gathering part of a scrape, before it is turned into metrics.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ScrapeOutcome {
    pub observations: Vec<CorrelatedObservation>,
    pub backend_up: bool,
    /// `None` when the scrape was aborted before Prow was queried.
    pub job_source_up: Option<bool>,
}

impl ScrapeOutcome {
    fn backend_down() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug)]
pub struct EngineOptions {
    /// Identifies the vCenter in the `vcenter` label and in build secrets.
    pub backend: String,
    pub domain: String,
    pub warning_threshold: Duration,
    pub login_timeout: Duration,
}

impl EngineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            backend: config.vsphere.clone(),
            domain: config.vsphere_domain.clone(),
            warning_threshold: Duration::try_from_secs_f64(config.warning_threshold)
                .unwrap_or(Duration::ZERO),
            login_timeout: Duration::from_secs(config.login_timeout),
        }
    }
}

/// Joins vCenter sessions with the Prow jobs that opened them.
pub struct CorrelationEngine {
    vsphere: Arc<dyn VsphereApi>,
    resolver: BuildUserResolver,
    jobs: Arc<dyn JobSource>,
    normalizer: UsernameNormalizer,
    options: EngineOptions,
    // Held for the whole collect sequence, so scrapes never overlap.
    metrics: Mutex<ExporterMetrics>,
}

impl CorrelationEngine {
    pub fn new(
        vsphere: Arc<dyn VsphereApi>,
        resolver: BuildUserResolver,
        jobs: Arc<dyn JobSource>,
        options: EngineOptions,
    ) -> prometheus::Result<Self> {
        Ok(Self {
            vsphere,
            resolver,
            jobs,
            normalizer: UsernameNormalizer::new(&options.domain),
            options,
            metrics: Mutex::new(ExporterMetrics::new()?),
        })
    }

    /// Runs one scrape and renders it in the Prometheus text format.
    pub async fn collect(&self) -> prometheus::Result<String> {
        let metrics = self.metrics.lock().await;

        debug!("Metric collection starting...");
        let start = Instant::now();
        metrics.scrapes_total.inc();

        let outcome = self.scrape().await;
        metrics
            .vcenter_up
            .set(if outcome.backend_up { 1.0 } else { 0.0 });
        if let Some(job_source_up) = outcome.job_source_up {
            metrics.prow_up.set(if job_source_up { 1.0 } else { 0.0 });
        }

        let correlated = correlated_gauge()?;
        for observation in &outcome.observations {
            correlated
                .with_label_values(&[
                    observation.username.as_str(),
                    observation.user_agent.as_str(),
                    observation.job_name.as_str(),
                    observation.build_id.as_str(),
                    observation.pull_request_link.as_str(),
                    observation.backend.as_str(),
                ])
                .set(observation.count as f64);
        }

        let registry = Registry::new();
        metrics.register(&registry)?;
        registry.register(Box::new(correlated))?;
        let families = registry.gather();

        let duration = start.elapsed();
        if duration > self.options.warning_threshold {
            warn!(
                "scrape operation took too long: {:.2}s",
                duration.as_secs_f64()
            );
        }
        debug!("Metric collection complete.");

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub(crate) async fn scrape(&self) -> ScrapeOutcome {
        let login = tokio::time::timeout(self.options.login_timeout, self.vsphere.login()).await;
        let session = match login {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                error!("failed scraping vsphere: {}", e);
                return ScrapeOutcome::backend_down();
            }
            Err(_) => {
                error!(
                    "failed scraping vsphere: {}",
                    VsphereError::Timeout(self.options.login_timeout)
                );
                return ScrapeOutcome::backend_down();
            }
        };

        let outcome = self.scrape_with_session(&session).await;

        if let Err(e) = self.vsphere.logout(session).await {
            warn!("failed to log out of vsphere: {}", e);
        }
        outcome
    }

    async fn scrape_with_session(&self, session: &VsphereSession) -> ScrapeOutcome {
        let sessions = match self.vsphere.list_sessions(session).await {
            Ok(sessions) => sessions,
            Err(e) => {
                error!("failed scraping vsphere: {}", e);
                return ScrapeOutcome::backend_down();
            }
        };
        let directory = SessionDirectory::build(&sessions, &self.normalizer);
        debug!(
            "{} sessions across {} users",
            directory.session_count(),
            directory.user_count()
        );

        let (jobs, job_source_up) = match self.jobs.fetch().await {
            Ok(jobs) => (jobs, true),
            Err(e) => {
                error!("failed getting prow jobs: {}", e);
                (Vec::new(), false)
            }
        };

        let mut observations = Vec::new();
        for job in &jobs {
            observations.extend(self.correlate(job, &directory).await);
        }

        ScrapeOutcome {
            observations,
            backend_up: true,
            job_source_up: Some(job_source_up),
        }
    }

    async fn correlate(
        &self,
        job: &Job,
        directory: &SessionDirectory,
    ) -> Vec<CorrelatedObservation> {
        let build_id = job.build_id();
        let job_name = job.job_name();
        if build_id.is_empty() {
            debug!("job {} has no build id", job_name);
            return Vec::new();
        }

        let target = match target_of(job) {
            Ok(target) => target,
            Err(e) => {
                debug!("build-id: {} job: {}: {}", build_id, job_name, e);
                return Vec::new();
            }
        };
        let pull_request_link = pull_request_link_of(job);
        debug!(
            "build-id: {} job: {} PR: {}",
            build_id, job_name, pull_request_link
        );

        let user = match self.resolver.resolve(build_id, &target).await {
            Ok(user) => user,
            Err(e) => {
                debug!("build-id: {} job: {}: {}", build_id, job_name, e);
                return Vec::new();
            }
        };

        let Some(username) = self.normalizer.normalize(&user) else {
            debug!(
                "build-id: {} job: {}: no vsphere user resolved from {:?}",
                build_id, job_name, user
            );
            return Vec::new();
        };

        let Some(user_agents) = directory.lookup(&username) else {
            debug!("no sessions for user: {}", username);
            return Vec::new();
        };

        user_agents
            .iter()
            .map(|(user_agent, count)| CorrelatedObservation {
                username: username.clone(),
                user_agent: user_agent.clone(),
                job_name: job_name.to_string(),
                build_id: build_id.to_string(),
                pull_request_link: pull_request_link.clone(),
                backend: self.options.backend.clone(),
                count: *count,
            })
            .collect()
    }
}
