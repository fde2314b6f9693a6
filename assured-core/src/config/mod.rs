//! Layered configuration.
//!
//! A [`ConfigLayer`] holds exactly one instance of each sub-config. Every
//! sub-config remembers whether the user touched it, which is what lets
//! [`ConfigLayer::merge`] replace only what an overlay explicitly set:
//!
//! ```
//! use assured_core::config::{ConfigLayer, DecoderConfig, LogConfig};
//!
//! let base = ConfigLayer::new().with_decoder(DecoderConfig::new().no_content_decoders());
//! let overlay = ConfigLayer::new().with_log(LogConfig::new().blacklist_headers(["Cookie"]));
//!
//! let merged = ConfigLayer::merge(&base, &overlay);
//! assert!(!merged.decoder().decodes_gzip());
//! assert!(merged.log().is_blacklisted("cookie"));
//! ```

mod client;
mod codec;
mod logging;
mod params;

pub use client::{ConnectionConfig, HttpClientConfig, RedirectConfig, SslConfig};
pub use codec::{DecoderConfig, EncoderConfig};
pub use logging::{LogConfig, SessionConfig};
pub use params::{HeaderConfig, ParamConfig, UpdateStrategy};

/// Common behaviour of every sub-config.
pub trait Config {
    /// Whether the value was set by the user rather than left at its default.
    fn is_user_configured(&self) -> bool;
}

/// Immutable bag of sub-configs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigLayer {
    params: ParamConfig,
    headers: HeaderConfig,
    http_client: HttpClientConfig,
    redirect: RedirectConfig,
    connection: ConnectionConfig,
    ssl: SslConfig,
    encoder: EncoderConfig,
    decoder: DecoderConfig,
    log: LogConfig,
    session: SessionConfig,
}

fn pick<C: Config + Clone>(base: &C, overlay: &C) -> C {
    if overlay.is_user_configured() {
        overlay.clone()
    } else {
        base.clone()
    }
}

impl ConfigLayer {
    /// Create a layer with every sub-config at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine two layers: overlay's user-configured sub-configs replace
    /// base's, everything else passes through from base.
    pub fn merge(base: &ConfigLayer, overlay: &ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            params: pick(&base.params, &overlay.params),
            headers: pick(&base.headers, &overlay.headers),
            http_client: pick(&base.http_client, &overlay.http_client),
            redirect: pick(&base.redirect, &overlay.redirect),
            connection: pick(&base.connection, &overlay.connection),
            ssl: pick(&base.ssl, &overlay.ssl),
            encoder: pick(&base.encoder, &overlay.encoder),
            decoder: pick(&base.decoder, &overlay.decoder),
            log: pick(&base.log, &overlay.log),
            session: pick(&base.session, &overlay.session),
        }
    }

    /// Check if any sub-config was set by the user.
    pub fn is_user_configured(&self) -> bool {
        self.params.is_user_configured()
            || self.headers.is_user_configured()
            || self.http_client.is_user_configured()
            || self.redirect.is_user_configured()
            || self.connection.is_user_configured()
            || self.ssl.is_user_configured()
            || self.encoder.is_user_configured()
            || self.decoder.is_user_configured()
            || self.log.is_user_configured()
            || self.session.is_user_configured()
    }

    /// Replace the parameter config.
    pub fn with_params(self, params: ParamConfig) -> Self {
        Self { params, ..self }
    }

    /// Replace the header config.
    pub fn with_headers(self, headers: HeaderConfig) -> Self {
        Self { headers, ..self }
    }

    /// Replace the HTTP client config.
    pub fn with_http_client(self, http_client: HttpClientConfig) -> Self {
        Self {
            http_client,
            ..self
        }
    }

    /// Replace the redirect config.
    pub fn with_redirect(self, redirect: RedirectConfig) -> Self {
        Self { redirect, ..self }
    }

    /// Replace the connection config.
    pub fn with_connection(self, connection: ConnectionConfig) -> Self {
        Self { connection, ..self }
    }

    /// Replace the SSL config.
    pub fn with_ssl(self, ssl: SslConfig) -> Self {
        Self { ssl, ..self }
    }

    /// Replace the encoder config.
    pub fn with_encoder(self, encoder: EncoderConfig) -> Self {
        Self { encoder, ..self }
    }

    /// Replace the decoder config.
    pub fn with_decoder(self, decoder: DecoderConfig) -> Self {
        Self { decoder, ..self }
    }

    /// Replace the log config.
    pub fn with_log(self, log: LogConfig) -> Self {
        Self { log, ..self }
    }

    /// Replace the session config.
    pub fn with_session(self, session: SessionConfig) -> Self {
        Self { session, ..self }
    }

    /// Parameter update strategies.
    pub fn params(&self) -> &ParamConfig {
        &self.params
    }

    /// Header overwrite rules.
    pub fn headers(&self) -> &HeaderConfig {
        &self.headers
    }

    /// HTTP client settings.
    pub fn http_client(&self) -> &HttpClientConfig {
        &self.http_client
    }

    /// Redirect settings.
    pub fn redirect(&self) -> &RedirectConfig {
        &self.redirect
    }

    /// Connection settings.
    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    /// SSL settings.
    pub fn ssl(&self) -> &SslConfig {
        &self.ssl
    }

    /// Encoder settings.
    pub fn encoder(&self) -> &EncoderConfig {
        &self.encoder
    }

    /// Decoder settings.
    pub fn decoder(&self) -> &DecoderConfig {
        &self.decoder
    }

    /// Log settings.
    pub fn log(&self) -> &LogConfig {
        &self.log
    }

    /// Session settings.
    pub fn session(&self) -> &SessionConfig {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_replaces_one_sub_config() {
        let original = ConfigLayer::new();
        let updated = original
            .clone()
            .with_redirect(RedirectConfig::new().follow_redirects(false));

        assert!(!updated.redirect().follows());
        assert!(original.redirect().follows());
        assert_eq!(updated.log(), original.log());
        assert!(updated.is_user_configured());
        assert!(!original.is_user_configured());
    }

    #[test]
    fn test_merge_keeps_base_sub_configs_the_overlay_did_not_set() {
        let base = ConfigLayer::new().with_decoder(DecoderConfig::new().gzip(false));
        let overlay =
            ConfigLayer::new().with_log(LogConfig::new().blacklist_headers(["Authorization"]));

        let merged = ConfigLayer::merge(&base, &overlay);

        assert_eq!(merged.decoder(), base.decoder());
        assert!(!merged.decoder().decodes_gzip());
        assert_eq!(merged.log(), overlay.log());
        assert!(merged.log().is_blacklisted("authorization"));
    }

    #[test]
    fn test_merge_prefers_explicit_overlay_over_explicit_base() {
        let base = ConfigLayer::new().with_session(SessionConfig::new().session_id_name("a"));
        let overlay = ConfigLayer::new().with_session(SessionConfig::new().session_id_name("b"));
        assert_eq!(ConfigLayer::merge(&base, &overlay).session().name(), "b");
        assert_eq!(ConfigLayer::merge(&overlay, &ConfigLayer::new()).session().name(), "b");
    }
}
