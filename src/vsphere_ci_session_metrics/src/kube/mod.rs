mod client;
mod kubeconfig;

pub use client::KubeClient;
pub use kubeconfig::{KubeAuth, KubeConfig};

use crate::errors::KubeError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
#[cfg(test)]
use mockall::automock;
use std::collections::BTreeMap;

pub type LogStream = BoxStream<'static, Result<Bytes, KubeError>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodRef {
    pub namespace: String,
    pub name: String,
}

/// Secret with its values already base64-decoded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Secret {
    pub data: BTreeMap<String, Vec<u8>>,
}

/// The build cluster operations needed to resolve which CI user a job ran as.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BuildCluster: Send + Sync {
    async fn list_pods(&self, namespace: &str, label_selector: &str)
        -> Result<Vec<PodRef>, KubeError>;

    async fn stream_pod_log(&self, pod: &PodRef, container: &str) -> Result<LogStream, KubeError>;

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, KubeError>;
}
