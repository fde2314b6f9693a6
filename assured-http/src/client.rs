//! Blocking reqwest transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use assured_core::config::ConfigLayer;
use assured_core::{RequestSpec, Response, ResponseSpecification, Transport};
use parking_lot::Mutex;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use tracing::debug;

use crate::{request, HttpTransportError};

/// Everything about a request config that shapes the client itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    timeout: Option<Duration>,
    connect_timeout: Duration,
    user_agent: String,
    follow_redirects: bool,
    max_redirects: usize,
    relaxed_https: bool,
    close_idle_connections: bool,
    gzip: bool,
    brotli: bool,
}

impl ClientSettings {
    /// Extract the client settings from a config layer.
    pub fn from_config(config: &ConfigLayer) -> Self {
        let http_client = config.http_client();
        Self {
            timeout: http_client.request_timeout(),
            connect_timeout: http_client.connection_timeout(),
            user_agent: http_client.user_agent_value().to_string(),
            follow_redirects: config.redirect().follows(),
            max_redirects: config.redirect().max(),
            relaxed_https: config.ssl().is_relaxed(),
            close_idle_connections: config.connection().closes_idle_connections(),
            gzip: config.decoder().decodes_gzip(),
            brotli: config.decoder().decodes_brotli(),
        }
    }

    /// Build a client with these settings.
    pub fn build(&self) -> Result<Client, HttpTransportError> {
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(&self.user_agent)
            .gzip(self.gzip)
            .brotli(self.brotli);

        if self.follow_redirects {
            builder = builder.redirect(Policy::limited(self.max_redirects));
        } else {
            builder = builder.redirect(Policy::none());
        }
        if self.relaxed_https {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if self.close_idle_connections {
            builder = builder.pool_max_idle_per_host(0);
        }

        builder.build().map_err(HttpTransportError::ClientBuild)
    }
}

/// [`Transport`] that performs real HTTP calls with a blocking reqwest
/// client.
///
/// A client is built per request unless the request's config asks for
/// client reuse, in which case the last client is kept for as long as the
/// client settings stay the same.
#[derive(Debug, Default)]
pub struct ReqwestTransport {
    cached: Mutex<Option<(ClientSettings, Client)>>,
    built: AtomicUsize,
}

impl ReqwestTransport {
    /// Create a transport with no cached client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clients built so far.
    pub fn clients_built(&self) -> usize {
        self.built.load(Ordering::Relaxed)
    }

    /// Drop the cached client.
    pub fn clear_cached_client(&self) {
        *self.cached.lock() = None;
    }

    fn build(&self, settings: &ClientSettings) -> Result<Client, HttpTransportError> {
        let client = settings.build()?;
        let count = self.built.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(clients_built = count, "Built HTTP client");
        Ok(client)
    }

    /// The client for a request.
    fn client_for(&self, config: &ConfigLayer) -> Result<Client, HttpTransportError> {
        let settings = ClientSettings::from_config(config);

        if !config.http_client().reuses_client() {
            return self.build(&settings);
        }

        let mut cached = self.cached.lock();
        if let Some((cached_settings, client)) = cached.as_ref()
            && *cached_settings == settings
        {
            return Ok(client.clone());
        }
        let client = self.build(&settings)?;
        *cached = Some((settings, client.clone()));
        Ok(client)
    }
}

impl Transport for ReqwestTransport {
    fn execute(
        &self,
        request: &RequestSpec,
        _expectations: &ResponseSpecification,
    ) -> assured_core::Result<Response> {
        let client = self.client_for(request.get_config())?;
        request::send(&client, request)
    }
}
