//! Settings that shape the underlying HTTP client.
//!
//! The engine never reads these beyond [`HttpClientConfig::reuses_client`];
//! they are handed to the transport as-is.

use std::time::Duration;

use super::Config;

/// HTTP client construction settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    reuse_client: bool,
    timeout: Option<Duration>,
    connect_timeout: Duration,
    user_agent: String,
    user_configured: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            reuse_client: false,
            timeout: None,
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("assured/{}", env!("CARGO_PKG_VERSION")),
            user_configured: false,
        }
    }
}

impl HttpClientConfig {
    /// Create the default client config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep one client instance across requests instead of building a new one
    /// each time.
    pub fn reuse_client_instance(mut self) -> Self {
        self.reuse_client = true;
        self.user_configured = true;
        self
    }

    /// Build a fresh client for every request.
    pub fn dont_reuse_client_instance(mut self) -> Self {
        self.reuse_client = false;
        self.user_configured = true;
        self
    }

    /// Set the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self.user_configured = true;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.user_configured = true;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self.user_configured = true;
        self
    }

    /// Whether the client instance is reused.
    pub fn reuses_client(&self) -> bool {
        self.reuse_client
    }

    /// The request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The connection timeout.
    pub fn connection_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// The user agent string.
    pub fn user_agent_value(&self) -> &str {
        &self.user_agent
    }
}

impl Config for HttpClientConfig {
    fn is_user_configured(&self) -> bool {
        self.user_configured
    }
}

/// Redirect handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectConfig {
    follow: bool,
    max_redirects: usize,
    user_configured: bool,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            follow: true,
            max_redirects: 100,
            user_configured: false,
        }
    }
}

impl RedirectConfig {
    /// Create the default redirect config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable following redirects.
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow = follow;
        self.user_configured = true;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self.user_configured = true;
        self
    }

    /// Whether redirects are followed.
    pub fn follows(&self) -> bool {
        self.follow
    }

    /// Maximum number of redirects.
    pub fn max(&self) -> usize {
        self.max_redirects
    }
}

impl Config for RedirectConfig {
    fn is_user_configured(&self) -> bool {
        self.user_configured
    }
}

/// Connection lifecycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionConfig {
    close_idle_connections: bool,
    user_configured: bool,
}

impl ConnectionConfig {
    /// Create the default connection config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Don't keep idle connections around after a response has been read.
    pub fn close_idle_connections_after_each_response(mut self) -> Self {
        self.close_idle_connections = true;
        self.user_configured = true;
        self
    }

    /// Whether idle connections are closed after each response.
    pub fn closes_idle_connections(&self) -> bool {
        self.close_idle_connections
    }
}

impl Config for ConnectionConfig {
    fn is_user_configured(&self) -> bool {
        self.user_configured
    }
}

/// TLS settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SslConfig {
    relaxed_https: bool,
    user_configured: bool,
}

impl SslConfig {
    /// Create the default SSL config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trust every certificate. Only meant for test servers with self-signed certs.
    pub fn relaxed_https_validation(mut self) -> Self {
        self.relaxed_https = true;
        self.user_configured = true;
        self
    }

    /// Whether certificate validation is relaxed.
    pub fn is_relaxed(&self) -> bool {
        self.relaxed_https
    }
}

impl Config for SslConfig {
    fn is_user_configured(&self) -> bool {
        self.user_configured
    }
}
