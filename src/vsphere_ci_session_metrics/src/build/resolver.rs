use super::namespace::scan_for_namespace;
use crate::constants::{BUILD_ID_LABEL, CI_NAMESPACE, METADATA_SECRET_KEY, TEST_CONTAINER};
use crate::errors::ResolveError;
use crate::kube::{BuildCluster, PodRef};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Default, Deserialize)]
struct ClusterMetadata {
    #[serde(default)]
    vsphere: VsphereMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct VsphereMetadata {
    #[serde(rename = "vCenter", default)]
    vcenter: String,
    #[serde(default)]
    username: String,
}

/// Username recorded in a `metadata.json` blob, when it was issued for `vcenter`.
fn user_from_metadata(raw: &[u8], vcenter: &str) -> Option<String> {
    let metadata: ClusterMetadata = match serde_json::from_slice(raw) {
        Ok(metadata) => metadata,
        Err(e) => {
            debug!("unable to parse {}: {}", METADATA_SECRET_KEY, e);
            return None;
        }
    };

    (metadata.vsphere.vcenter == vcenter).then_some(metadata.vsphere.username)
}

/// Resolves which vCenter user a CI job step authenticated as.
pub struct BuildUserResolver {
    cluster: Arc<dyn BuildCluster>,
    vcenter: String,
}

impl BuildUserResolver {
    pub fn new(cluster: Arc<dyn BuildCluster>, vcenter: &str) -> Self {
        Self {
            cluster,
            vcenter: vcenter.to_string(),
        }
    }

    /// Returns the raw username, or an empty string when the step's secret
    /// was not issued for this vCenter.
    pub async fn resolve(&self, build_id: &str, target: &str) -> Result<String, ResolveError> {
        let pod = self.build_pod(build_id).await?;
        let namespace = self.execution_namespace(&pod).await?;
        trace!("build {} runs in namespace {}", build_id, namespace);
        self.user_from_secret(&namespace, target).await
    }

    async fn build_pod(&self, build_id: &str) -> Result<PodRef, ResolveError> {
        let selector = format!("{BUILD_ID_LABEL}={build_id}");
        let pods = self
            .cluster
            .list_pods(CI_NAMESPACE, &selector)
            .await
            .map_err(|source| ResolveError::PodQuery {
                build_id: build_id.to_string(),
                source,
            })?;

        let found = pods.len();
        let mut pods = pods.into_iter();
        match (pods.next(), pods.next()) {
            (Some(pod), None) => Ok(pod),
            _ => Err(ResolveError::Resolution {
                build_id: build_id.to_string(),
                found,
            }),
        }
    }

    async fn execution_namespace(&self, pod: &PodRef) -> Result<String, ResolveError> {
        let stream = self
            .cluster
            .stream_pod_log(pod, TEST_CONTAINER)
            .await
            .map_err(|source| ResolveError::LogStream {
                pod: pod.name.clone(),
                source,
            })?;

        scan_for_namespace(stream)
            .await
            .map_err(|source| ResolveError::LogStream {
                pod: pod.name.clone(),
                source,
            })?
            .ok_or_else(|| ResolveError::NamespaceNotFound {
                pod: pod.name.clone(),
            })
    }

    async fn user_from_secret(&self, namespace: &str, name: &str) -> Result<String, ResolveError> {
        let secret = self
            .cluster
            .get_secret(namespace, name)
            .await
            .map_err(|source| ResolveError::SecretFetch {
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            })?;

        let Some(raw) = secret.data.get(METADATA_SECRET_KEY) else {
            debug!("secret {}/{} has no {}", namespace, name, METADATA_SECRET_KEY);
            return Ok(String::new());
        };

        Ok(user_from_metadata(raw, &self.vcenter).unwrap_or_default())
    }
}
