mod client;
mod session_directory;
mod soap;

pub use client::VsphereClient;
pub use session_directory::{SessionDirectory, UserAgentCounts, UsernameNormalizer};

use crate::errors::VsphereError;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// One authenticated client connection recorded by vCenter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub user_agent: String,
}

impl Session {
    pub fn new(username: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            user_agent: user_agent.into(),
        }
    }
}

/// Managed object references needed after login.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceContent {
    pub session_manager: String,
    pub property_collector: String,
}

/// A logged-in vCenter session. The cookie jar of `http` carries the session.
#[derive(Clone, Debug)]
pub struct VsphereSession {
    http: reqwest::Client,
    service: ServiceContent,
}

impl VsphereSession {
    pub fn new(http: reqwest::Client, service: ServiceContent) -> Self {
        Self { http, service }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn service(&self) -> &ServiceContent {
        &self.service
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait VsphereApi: Send + Sync {
    async fn login(&self) -> Result<VsphereSession, VsphereError>;

    async fn list_sessions(&self, session: &VsphereSession) -> Result<Vec<Session>, VsphereError>;

    async fn logout(&self, session: VsphereSession) -> Result<(), VsphereError>;
}
