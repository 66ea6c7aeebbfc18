use super::soap;
use super::{ServiceContent, Session, VsphereApi, VsphereSession};
use crate::errors::VsphereError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info, trace};
use url::Url;

/// SOAP client for the vCenter `/sdk` endpoint.
///
/// Every `login` builds a fresh HTTP client with its own cookie jar, so the
/// `vmware_soap_session` cookie lives exactly as long as the returned session.
pub struct VsphereClient {
    endpoint: Url,
    user: String,
    password: String,
    user_agent: String,
    insecure: bool,
}

impl VsphereClient {
    pub fn new(
        host: &str,
        user: &str,
        password: &str,
        user_agent: &str,
        insecure: bool,
    ) -> Result<Self, VsphereError> {
        let endpoint = Url::parse(&format!("https://{host}/sdk"))
            .map_err(|e| VsphereError::Decode(format!("invalid vsphere host {host}: {e}")))?;
        Ok(Self::with_endpoint(endpoint, user, password, user_agent, insecure))
    }

    pub fn with_endpoint(
        endpoint: Url,
        user: &str,
        password: &str,
        user_agent: &str,
        insecure: bool,
    ) -> Self {
        Self {
            endpoint,
            user: user.to_string(),
            password: password.to_string(),
            user_agent: user_agent.to_string(),
            insecure,
        }
    }

    fn http_client(&self) -> Result<Client, VsphereError> {
        Ok(Client::builder()
            .cookie_store(true)
            .user_agent(self.user_agent.as_str())
            .danger_accept_invalid_certs(self.insecure)
            .build()?)
    }

    async fn call(&self, http: &Client, body: String) -> Result<String, VsphereError> {
        let response = http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", soap::SOAP_ACTION)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        trace!("vsphere responded {} ({} bytes)", status, text.len());

        if let Some(fault) = soap::parse_fault(&text) {
            return Err(VsphereError::Fault { fault });
        }
        if !status.is_success() {
            return Err(VsphereError::Fault {
                fault: format!("unexpected status from vsphere ({})", status.as_u16()),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl VsphereApi for VsphereClient {
    async fn login(&self) -> Result<VsphereSession, VsphereError> {
        let http = self.http_client()?;

        let response = self.call(&http, soap::retrieve_service_content()).await?;
        let service = soap::parse_service_content(&response)?;

        self.call(
            &http,
            soap::login(&service.session_manager, &self.user, &self.password),
        )
        .await?;
        debug!("logged into {} as {}", self.endpoint, self.user);

        Ok(VsphereSession::new(http, service))
    }

    async fn list_sessions(&self, session: &VsphereSession) -> Result<Vec<Session>, VsphereError> {
        let ServiceContent {
            session_manager,
            property_collector,
        } = session.service();

        let response = self
            .call(
                session.http(),
                soap::retrieve_session_list(property_collector, session_manager),
            )
            .await?;
        let sessions = soap::parse_user_sessions(&response)?;

        info!("Found {} user sessions", sessions.len());
        Ok(sessions)
    }

    async fn logout(&self, session: VsphereSession) -> Result<(), VsphereError> {
        self.call(
            session.http(),
            soap::logout(&session.service().session_manager),
        )
        .await?;
        debug!("logged out of {}", self.endpoint);
        Ok(())
    }
}
