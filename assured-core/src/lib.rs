//! Specification merge and filter chain engine for fluent HTTP API tests.
//!
//! A request is described by a [`RequestSpec`]. At dispatch the
//! [`RequestExecutor`] folds three layers together (the static defaults,
//! any attached reusable specs, then the calls made inline) and runs the
//! result through the registered [`Filter`]s down to a [`Transport`].
//!
//! ```
//! use assured_core::prelude::*;
//! use std::sync::Arc;
//!
//! let transport = transport_fn(|request| {
//!     let url = request.resolve_uri()?;
//!     Response::with_status(200).with_json(&serde_json::json!({"url": url.as_str()}))
//! });
//! let executor = RequestExecutor::new(RequestSpec::new(), Arc::new(transport));
//!
//! let response = RequestSender::new(executor)
//!     .base_uri("http://api.test")
//!     .path_param("id", "42")
//!     .expect(ResponseSpecification::new().status_code(200))
//!     .when()
//!     .get("/users/{id}")
//!     .unwrap();
//!
//! response
//!     .then()
//!     .body("url", equal_to("http://api.test/users/42"));
//! ```

pub mod config;
pub mod dsl;
pub mod error;
pub mod executor;
pub mod expect;
pub mod filter;
pub mod global;
pub mod merge;
pub mod params;
pub mod response;
pub mod root_path;
pub mod spec;
pub mod transport;

pub use config::ConfigLayer;
pub use dsl::RequestSender;
pub use error::{AssuredError, Result};
pub use executor::RequestExecutor;
pub use expect::{PathMatcher, ResponseSpecification, ValidatableResponse};
pub use filter::{filter_fn, Filter, FilterChain, FilterContext};
pub use global::given;
pub use merge::merge_specs;
pub use params::{NameMatching, ParameterMultiMap};
pub use response::Response;
pub use root_path::{PathArg, RootPathState};
pub use spec::{AuthScheme, MultiPart, RequestSpec};
pub use transport::Transport;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        ConfigLayer, DecoderConfig, EncoderConfig, HeaderConfig, HttpClientConfig, LogConfig,
        ParamConfig, RedirectConfig, SessionConfig, UpdateStrategy,
    };
    pub use crate::dsl::RequestSender;
    pub use crate::error::{AssuredError, Result};
    pub use crate::executor::RequestExecutor;
    pub use crate::expect::json::{absent, contains, equal_to, has_size, present};
    pub use crate::expect::{ResponseSpecification, ValidatableResponse};
    pub use crate::filter::{
        filter_fn, CookieFilter, Filter, FilterContext, LogDetail, RequestLoggingFilter,
        ResponseLoggingFilter, SessionFilter, TimingFilter,
    };
    pub use crate::path_args;
    pub use crate::response::Response;
    pub use crate::root_path::PathArg;
    pub use crate::spec::{AuthScheme, MultiPart, RequestSpec};
    pub use crate::transport::{transport_fn, Transport};
}
