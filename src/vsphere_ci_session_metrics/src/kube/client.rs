use super::kubeconfig::{KubeAuth, KubeConfig};
use super::{BuildCluster, LogStream, PodRef, Secret};
use crate::errors::KubeError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures_util::StreamExt;
use reqwest::{Certificate, Client, Identity, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, trace};
use url::Url;

#[derive(Deserialize)]
struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct ObjectMeta {
    name: String,
    #[serde(default)]
    namespace: String,
}

#[derive(Deserialize)]
struct Pod {
    metadata: ObjectMeta,
}

#[derive(Deserialize)]
struct RawSecret {
    #[serde(default)]
    data: BTreeMap<String, String>,
}

/// Thin REST client for the Kubernetes API server described by a kubeconfig.
#[derive(Clone)]
pub struct KubeClient {
    base: Url,
    http: Client,
    token: Option<String>,
}

impl KubeClient {
    pub fn from_kubeconfig(path: &Path) -> Result<Self, KubeError> {
        let config = KubeConfig::load(path)?;
        Self::try_new(&config)
    }

    pub fn try_new(config: &KubeConfig) -> Result<Self, KubeError> {
        let mut builder =
            Client::builder().danger_accept_invalid_certs(config.insecure_skip_tls_verify);

        if let Some(ca_pem) = &config.ca_pem {
            let ca = Certificate::from_pem(ca_pem)
                .map_err(|e| KubeError::Config(format!("invalid certificate authority: {e}")))?;
            builder = builder.add_root_certificate(ca);
        }

        let token = match &config.auth {
            KubeAuth::None => None,
            KubeAuth::Token(token) => Some(token.clone()),
            KubeAuth::ClientCertificate { cert_pem, key_pem } => {
                let mut pem = cert_pem.clone();
                pem.push(b'\n');
                pem.extend_from_slice(key_pem);
                let identity = Identity::from_pem(&pem)
                    .map_err(|e| KubeError::Config(format!("invalid client certificate: {e}")))?;
                builder = builder.identity(identity);
                None
            }
        };

        Ok(Self {
            base: config.server.clone(),
            http: builder.build()?,
            token,
        })
    }

    /// An unauthenticated client against `base`, used for local API servers.
    pub fn anonymous(base: Url) -> Self {
        Self {
            base,
            http: Client::new(),
            token: None,
        }
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, KubeError> {
        // String concatenation keeps any path prefix of the server URL
        let raw = format!("{}{}", self.base.as_str().trim_end_matches('/'), path);
        let mut url =
            Url::parse(&raw).map_err(|e| KubeError::Config(format!("invalid url {raw}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Response, KubeError> {
        trace!("GET {}", url);
        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KubeError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, KubeError> {
        let body = self.get(url).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| KubeError::Decode(e.to_string()))
    }

    /// Lists objects under a collection path, e.g. `/api/v1/namespaces/ci/pods`.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        label_selector: &str,
    ) -> Result<Vec<T>, KubeError> {
        let url = self.url(path, &[("labelSelector", label_selector)])?;
        let list: ObjectList<T> = self.get_json(url).await?;
        Ok(list.items)
    }
}

#[async_trait]
impl BuildCluster for KubeClient {
    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PodRef>, KubeError> {
        debug!(
            "looking for pods in {} namespace with label selector: {}",
            namespace, label_selector
        );
        let pods: Vec<Pod> = self
            .list(&format!("/api/v1/namespaces/{namespace}/pods"), label_selector)
            .await?;

        Ok(pods
            .into_iter()
            .map(|pod| PodRef {
                namespace: if pod.metadata.namespace.is_empty() {
                    namespace.to_string()
                } else {
                    pod.metadata.namespace
                },
                name: pod.metadata.name,
            })
            .collect())
    }

    async fn stream_pod_log(&self, pod: &PodRef, container: &str) -> Result<LogStream, KubeError> {
        let url = self.url(
            &format!("/api/v1/namespaces/{}/pods/{}/log", pod.namespace, pod.name),
            &[("container", container)],
        )?;
        let response = self.get(url).await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(KubeError::from))
            .boxed())
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, KubeError> {
        let url = self.url(&format!("/api/v1/namespaces/{namespace}/secrets/{name}"), &[])?;
        let raw: RawSecret = self.get_json(url).await?;

        let mut data = BTreeMap::new();
        for (key, value) in raw.data {
            let decoded = STANDARD
                .decode(value.as_bytes())
                .map_err(|e| KubeError::Decode(format!("secret key {key}: {e}")))?;
            data.insert(key, decoded);
        }
        Ok(Secret { data })
    }
}
