//! Logging and session settings.

use std::collections::BTreeSet;

use super::Config;

/// Controls what the logging filters and the executor print.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig {
    blacklisted_headers: BTreeSet<String>,
    log_if_validation_fails: bool,
    user_configured: bool,
}

impl LogConfig {
    /// Create the default log config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask the values of these headers in log output.
    pub fn blacklist_headers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.blacklisted_headers
            .extend(names.into_iter().map(|n| n.as_ref().to_ascii_lowercase()));
        self.user_configured = true;
        self
    }

    /// Log the request and response when a response expectation fails.
    pub fn enable_logging_of_request_and_response_if_validation_fails(mut self) -> Self {
        self.log_if_validation_fails = true;
        self.user_configured = true;
        self
    }

    /// Check if a header's value should be masked.
    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.blacklisted_headers.contains(&name.to_ascii_lowercase())
    }

    /// Blacklisted header names, lowercased.
    pub fn blacklisted_headers(&self) -> impl Iterator<Item = &str> {
        self.blacklisted_headers.iter().map(String::as_str)
    }

    /// Whether validation failures trigger request/response logging.
    pub fn logs_if_validation_fails(&self) -> bool {
        self.log_if_validation_fails
    }
}

impl Config for LogConfig {
    fn is_user_configured(&self) -> bool {
        self.user_configured
    }
}

/// Session id cookie settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    session_id_name: String,
    session_id_value: Option<String>,
    user_configured: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id_name: "JSESSIONID".to_string(),
            session_id_value: None,
            user_configured: false,
        }
    }
}

impl SessionConfig {
    /// Create the default session config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cookie name that carries the session id.
    pub fn session_id_name(mut self, name: impl Into<String>) -> Self {
        self.session_id_name = name.into();
        self.user_configured = true;
        self
    }

    /// Send this session id with every request.
    pub fn session_id_value(mut self, value: impl Into<String>) -> Self {
        self.session_id_value = Some(value.into());
        self.user_configured = true;
        self
    }

    /// The session cookie name.
    pub fn name(&self) -> &str {
        &self.session_id_name
    }

    /// The configured session id, if any.
    pub fn value(&self) -> Option<&str> {
        self.session_id_value.as_deref()
    }
}

impl Config for SessionConfig {
    fn is_user_configured(&self) -> bool {
        self.user_configured
    }
}
