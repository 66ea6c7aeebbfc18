use super::Session;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, trace};

/// user agent => number of sessions opened with it
pub type UserAgentCounts = HashMap<String, u64>;

/// Strips the SSO domain from vCenter usernames.
///
/// Exactly two spellings are recognized: `<name>@<domain>` and
/// `<DOMAIN>\<name>`, where the second form uses the upper-cased domain.
/// Matching is case-sensitive.
#[derive(Clone, Debug)]
pub struct UsernameNormalizer {
    at_suffix: String,
    backslash_prefix: String,
}

impl UsernameNormalizer {
    pub fn new(domain: &str) -> Self {
        Self {
            at_suffix: format!("@{domain}"),
            backslash_prefix: format!("{}\\", domain.to_uppercase()),
        }
    }

    /// Returns the bare name, or `None` when `username` is not domain-qualified.
    pub fn normalize(&self, username: &str) -> Option<String> {
        let name = username
            .strip_suffix(self.at_suffix.as_str())
            .or_else(|| username.strip_prefix(self.backslash_prefix.as_str()))?;

        if name.is_empty() {
            return None;
        }
        Some(name.to_string())
    }

    /// Both domain-qualified spellings vCenter may record for a bare name.
    pub fn qualified_spellings(&self, name: &str) -> [String; 2] {
        [
            format!("{}{}", self.backslash_prefix, name),
            format!("{}{}", name, self.at_suffix),
        ]
    }
}

/// Snapshot of who is logged into vCenter and from which client, keyed by
/// normalized username. Built once per scrape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionDirectory {
    mappings: HashMap<String, UserAgentCounts>,
}

impl SessionDirectory {
    pub fn build<'a>(
        sessions: impl IntoIterator<Item = &'a Session>,
        normalizer: &UsernameNormalizer,
    ) -> Self {
        let mut directory = Self::default();
        for session in sessions {
            match normalizer.normalize(&session.username) {
                Some(username) => directory.add_mapping(username, &session.user_agent),
                None => trace!("dropping session of unqualified user {}", session.username),
            }
        }
        directory
    }

    fn add_mapping(&mut self, username: String, user_agent: &str) {
        let user_agents = match self.mappings.entry(username) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!("added mapping for user {} ({})", entry.key(), user_agent);
                entry.insert(HashMap::new())
            }
        };
        *user_agents.entry(user_agent.to_string()).or_insert(0) += 1;
    }

    pub fn lookup(&self, username: &str) -> Option<&UserAgentCounts> {
        trace!("checking sessions for user {}", username);
        self.mappings.get(username)
    }

    pub fn user_count(&self) -> usize {
        self.mappings.len()
    }

    pub fn session_count(&self) -> u64 {
        self.mappings.values().flat_map(|agents| agents.values()).sum()
    }
}
