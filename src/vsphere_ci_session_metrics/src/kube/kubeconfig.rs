use crate::errors::KubeError;
use crate::utils::yaml::{self, Yaml, YamlExt};
use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KubeAuth {
    None,
    Token(String),
    ClientCertificate { cert_pem: Vec<u8>, key_pem: Vec<u8> },
}

/// The parts of a kubeconfig's current context needed to talk to the API server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KubeConfig {
    pub server: Url,
    pub ca_pem: Option<Vec<u8>>,
    pub insecure_skip_tls_verify: bool,
    pub auth: KubeAuth,
}

impl KubeConfig {
    pub fn load(path: &Path) -> Result<Self, KubeError> {
        let doc = yaml::load_document_file(path)
            .with_context(|| format!("reading kubeconfig {}", path.display()))
            .map_err(config_error)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_yaml(&doc, base_dir).map_err(config_error)
    }

    pub fn from_yaml_str(yaml_str: &str, base_dir: &Path) -> Result<Self, KubeError> {
        let doc = yaml::load_document_str(yaml_str).map_err(config_error)?;
        Self::from_yaml(&doc, base_dir).map_err(config_error)
    }

    fn from_yaml(doc: &Yaml, base_dir: &Path) -> Result<Self> {
        let contexts = doc.optional_vec("contexts")?.map(Vec::as_slice).unwrap_or(&[]);
        let context = match doc.optional_string("current-context")? {
            Some(name) => Yaml::find_named(contexts, &name)
                .ok_or_else(|| anyhow!("current-context {} not found", name))?,
            None => contexts
                .first()
                .ok_or_else(|| anyhow!("kubeconfig has no contexts"))?,
        }
        .required("context")?;

        let cluster_name = context.required_string("cluster")?;
        let clusters = doc.optional_vec("clusters")?.map(Vec::as_slice).unwrap_or(&[]);
        let cluster = Yaml::find_named(clusters, &cluster_name)
            .ok_or_else(|| anyhow!("cluster {} not found", cluster_name))?
            .required("cluster")?;

        let server = cluster.required_string("server")?;
        let server = Url::parse(&server).with_context(|| format!("invalid server {}", server))?;

        let ca_pem = inline_or_file(
            cluster,
            "certificate-authority-data",
            "certificate-authority",
            base_dir,
        )?;
        let insecure_skip_tls_verify = cluster
            .optional_bool("insecure-skip-tls-verify")?
            .unwrap_or(false);

        let auth = match context.optional_string("user")? {
            Some(user_name) => {
                let users = doc.optional_vec("users")?.map(Vec::as_slice).unwrap_or(&[]);
                let user = Yaml::find_named(users, &user_name)
                    .ok_or_else(|| anyhow!("user {} not found", user_name))?
                    .required("user")?;
                user_auth(user, base_dir)?
            }
            None => KubeAuth::None,
        };

        Ok(Self {
            server,
            ca_pem,
            insecure_skip_tls_verify,
            auth,
        })
    }
}

fn config_error(err: anyhow::Error) -> KubeError {
    KubeError::Config(format!("{:#}", err))
}

fn resolve(base_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Reads a `*-data` (base64) key, falling back to its file-path sibling.
fn inline_or_file(
    entry: &Yaml,
    data_key: &'static str,
    file_key: &'static str,
    base_dir: &Path,
) -> Result<Option<Vec<u8>>> {
    if let Some(data) = entry.optional_string(data_key)? {
        let decoded = STANDARD
            .decode(data.trim())
            .with_context(|| format!("{} is not valid base64", data_key))?;
        return Ok(Some(decoded));
    }
    match entry.optional_string(file_key)? {
        Some(file) => {
            let path = resolve(base_dir, &file);
            let contents =
                fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            Ok(Some(contents))
        }
        None => Ok(None),
    }
}

fn user_auth(user: &Yaml, base_dir: &Path) -> Result<KubeAuth> {
    if let Some(token) = user.optional_string("token")? {
        return Ok(KubeAuth::Token(token));
    }
    if let Some(file) = user.optional_string("tokenFile")? {
        let path = resolve(base_dir, &file);
        let token =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        return Ok(KubeAuth::Token(token.trim().to_string()));
    }

    let cert = inline_or_file(user, "client-certificate-data", "client-certificate", base_dir)?;
    let key = inline_or_file(user, "client-key-data", "client-key", base_dir)?;
    match (cert, key) {
        (Some(cert_pem), Some(key_pem)) => Ok(KubeAuth::ClientCertificate { cert_pem, key_pem }),
        (None, None) => Ok(KubeAuth::None),
        _ => Err(anyhow!("client certificate and key must be configured together")),
    }
}
