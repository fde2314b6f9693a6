//! Process-wide defaults.
//!
//! Every request started with [`given`] is resolved against a snapshot of the
//! static default specification taken at that moment. Tests that change the
//! defaults should call [`reset`] when done and must not run concurrently
//! with tests that depend on other defaults.

use std::env;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::config::ConfigLayer;
use crate::dsl::RequestSender;
use crate::executor::RequestExecutor;
use crate::expect::ResponseSpecification;
use crate::response::Response;
use crate::spec::RequestSpec;
use crate::transport::Transport;
use crate::{AssuredError, Result};

// ============================================================================
// Global State
// ============================================================================

struct Defaults {
    spec: RequestSpec,
    transport: Option<Arc<dyn Transport>>,
}

static DEFAULTS: Lazy<RwLock<Defaults>> = Lazy::new(|| {
    RwLock::new(Defaults {
        spec: spec_from_env(),
        transport: None,
    })
});

/// Default specification seeded from `ASSURED_BASE_URI`, `ASSURED_PORT` and
/// `ASSURED_BASE_PATH` when they are set.
fn spec_from_env() -> RequestSpec {
    let mut spec = RequestSpec::new();
    if let Ok(uri) = env::var("ASSURED_BASE_URI") {
        spec = spec.base_uri(uri);
    }
    match env::var("ASSURED_PORT").map(|p| p.parse::<u16>()) {
        Ok(Ok(port)) => spec = spec.port(port),
        Ok(Err(e)) => tracing::warn!(error = %e, "Ignoring invalid ASSURED_PORT"),
        Err(_) => {}
    }
    if let Ok(base_path) = env::var("ASSURED_BASE_PATH") {
        spec = spec.base_path(base_path);
    }
    spec
}

/// Used when no transport has been installed.
struct MissingTransport;

impl Transport for MissingTransport {
    fn execute(&self, _: &RequestSpec, _: &ResponseSpecification) -> Result<Response> {
        Err(AssuredError::NoTransport)
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Start a request against the current defaults.
pub fn given() -> RequestSender {
    RequestSender::new(executor())
}

/// An executor over a snapshot of the current defaults.
pub fn executor() -> RequestExecutor {
    let defaults = DEFAULTS.read();
    let transport: Arc<dyn Transport> = match &defaults.transport {
        Some(transport) => Arc::clone(transport),
        None => Arc::new(MissingTransport),
    };
    RequestExecutor::new(defaults.spec.clone(), transport)
}

/// A copy of the static default specification.
pub fn default_spec() -> RequestSpec {
    DEFAULTS.read().spec.clone()
}

/// Replace the static default specification.
pub fn set_default_spec(spec: RequestSpec) {
    DEFAULTS.write().spec = spec;
}

/// Rebuild the static default specification from the current one.
pub fn update_defaults<F>(update: F)
where
    F: FnOnce(RequestSpec) -> RequestSpec,
{
    let mut defaults = DEFAULTS.write();
    let current = std::mem::take(&mut defaults.spec);
    defaults.spec = update(current);
}

/// Replace the default config layer.
pub fn set_config(config: ConfigLayer) {
    DEFAULTS.write().spec.set_config(config);
}

/// The default config layer.
pub fn config() -> ConfigLayer {
    DEFAULTS.read().spec.get_config().clone()
}

/// Install the transport used by [`given`].
pub fn set_transport(transport: Arc<dyn Transport>) {
    DEFAULTS.write().transport = Some(transport);
}

/// Install a transport unless one is already present.
pub fn set_transport_if_absent<F>(make: F)
where
    F: FnOnce() -> Arc<dyn Transport>,
{
    let mut defaults = DEFAULTS.write();
    if defaults.transport.is_none() {
        defaults.transport = Some(make());
    }
}

/// Check if a transport is installed.
pub fn has_transport() -> bool {
    DEFAULTS.read().transport.is_some()
}

/// Remove the installed transport.
pub fn clear_transport() {
    DEFAULTS.write().transport = None;
}

/// Restore the default specification and config. The installed transport is
/// kept.
pub fn reset() {
    DEFAULTS.write().spec = spec_from_env();
    tracing::debug!("Static defaults reset");
}
