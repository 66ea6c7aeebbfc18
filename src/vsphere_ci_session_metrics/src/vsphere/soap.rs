//! Minimal vim25 SOAP envelopes and response parsing for the handful of
//! calls the exporter needs.

use super::{ServiceContent, Session};
use crate::errors::VsphereError;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

pub(crate) const SOAP_ACTION: &str = "urn:vim25/7.0.3.0";

fn envelope(body: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:vim25="urn:vim25">"#,
            "<soapenv:Body>{}</soapenv:Body>",
            "</soapenv:Envelope>"
        ),
        body
    )
}

pub(crate) fn retrieve_service_content() -> String {
    envelope(
        r#"<vim25:RetrieveServiceContent><vim25:_this type="ServiceInstance">ServiceInstance</vim25:_this></vim25:RetrieveServiceContent>"#,
    )
}

pub(crate) fn login(session_manager: &str, user: &str, password: &str) -> String {
    envelope(&format!(
        r#"<vim25:Login><vim25:_this type="SessionManager">{}</vim25:_this><vim25:userName>{}</vim25:userName><vim25:password>{}</vim25:password></vim25:Login>"#,
        escape(session_manager),
        escape(user),
        escape(password),
    ))
}

pub(crate) fn logout(session_manager: &str) -> String {
    envelope(&format!(
        r#"<vim25:Logout><vim25:_this type="SessionManager">{}</vim25:_this></vim25:Logout>"#,
        escape(session_manager),
    ))
}

pub(crate) fn retrieve_session_list(property_collector: &str, session_manager: &str) -> String {
    envelope(&format!(
        concat!(
            r#"<vim25:RetrievePropertiesEx><vim25:_this type="PropertyCollector">{}</vim25:_this>"#,
            "<vim25:specSet>",
            "<vim25:propSet><vim25:type>SessionManager</vim25:type><vim25:pathSet>sessionList</vim25:pathSet></vim25:propSet>",
            r#"<vim25:objectSet><vim25:obj type="SessionManager">{}</vim25:obj></vim25:objectSet>"#,
            "</vim25:specSet>",
            "<vim25:options/>",
            "</vim25:RetrievePropertiesEx>"
        ),
        escape(property_collector),
        escape(session_manager),
    ))
}

fn decode_error(err: impl std::fmt::Display) -> VsphereError {
    VsphereError::Decode(err.to_string())
}

/// Text content of the first element whose local name is `tag`.
fn first_text(xml: &str, tag: &[u8]) -> Result<Option<String>, VsphereError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut inside = false;
    loop {
        match reader.read_event().map_err(decode_error)? {
            Event::Start(e) if e.local_name().as_ref() == tag => inside = true,
            Event::Text(t) if inside => {
                return Ok(Some(t.unescape().map_err(decode_error)?.into_owned()));
            }
            Event::End(e) if e.local_name().as_ref() == tag => return Ok(Some(String::new())),
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

pub(crate) fn parse_fault(xml: &str) -> Option<String> {
    first_text(xml, b"faultstring").ok().flatten()
}

pub(crate) fn parse_service_content(xml: &str) -> Result<ServiceContent, VsphereError> {
    let session_manager = first_text(xml, b"sessionManager")?
        .filter(|s| !s.is_empty())
        .ok_or_else(|| decode_error("service content has no sessionManager"))?;
    let property_collector = first_text(xml, b"propertyCollector")?
        .filter(|s| !s.is_empty())
        .ok_or_else(|| decode_error("service content has no propertyCollector"))?;

    Ok(ServiceContent {
        session_manager,
        property_collector,
    })
}

/// Extracts every `UserSession` from a `RetrievePropertiesEx` response.
pub(crate) fn parse_user_sessions(xml: &str) -> Result<Vec<Session>, VsphereError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut sessions = Vec::new();
    let mut in_session = false;
    let mut field: Option<Vec<u8>> = None;
    let mut username = String::new();
    let mut user_agent = String::new();

    loop {
        match reader.read_event().map_err(decode_error)? {
            Event::Start(e) => {
                let name = e.local_name();
                if name.as_ref() == b"UserSession" {
                    in_session = true;
                    username.clear();
                    user_agent.clear();
                } else if in_session {
                    field = Some(name.as_ref().to_vec());
                }
            }
            Event::Text(t) if in_session => {
                let text = t.unescape().map_err(decode_error)?;
                match field.as_deref() {
                    Some(b"userName") => username.push_str(&text),
                    Some(b"userAgent") => user_agent.push_str(&text),
                    _ => {}
                }
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"UserSession" {
                    in_session = false;
                    sessions.push(Session {
                        username: std::mem::take(&mut username),
                        user_agent: std::mem::take(&mut user_agent),
                    });
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sessions)
}
