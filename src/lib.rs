// Assured - a fluent DSL for testing HTTP APIs
//
// This library re-exports the specification engine and, with the `http`
// feature, installs a reqwest transport behind `given()`.

//! ```no_run
//! use assured::prelude::*;
//!
//! assured::update_defaults(|spec| spec.base_uri("http://localhost:8080"));
//!
//! given()
//!     .path_param("id", "42")
//!     .when()
//!     .get("/users/{id}")
//!     .unwrap()
//!     .then()
//!     .status_code(200)
//!     .body("user.id", equal_to(42));
//! ```

// Re-export core functionality
pub use assured_core::*;
pub use assured_core::global::{
    clear_transport, config, default_spec, executor, has_transport, reset, set_config,
    set_default_spec, set_transport, set_transport_if_absent, update_defaults,
};

#[cfg(feature = "http")]
pub use assured_http;

#[cfg(feature = "http")]
pub use assured_http::ReqwestTransport;

/// Start a request against the static defaults.
///
/// With the `http` feature a [`ReqwestTransport`] is installed on first use
/// unless another transport was set with [`set_transport`].
pub fn given() -> assured_core::RequestSender {
    #[cfg(feature = "http")]
    set_transport_if_absent(|| std::sync::Arc::new(ReqwestTransport::new()));
    assured_core::given()
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::given;
    pub use assured_core::prelude::*;

    #[cfg(feature = "http")]
    pub use assured_http::ReqwestTransport;
}
