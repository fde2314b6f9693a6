//! Blocking HTTP transport for the Assured test DSL, built on reqwest.
//!
//! The transport turns a fully merged [`RequestSpec`](assured_core::RequestSpec)
//! into a wire request, sends it and reads the whole body back:
//!
//! - the URL comes from the request's base URI, port, base path, path and query
//! - cookies travel in a single `Cookie` header
//! - form parameters are url-encoded unless the body or multipart parts are set
//! - client construction follows the request's config layer
//!
//! ```no_run
//! use assured_core::prelude::*;
//! use assured_http::ReqwestTransport;
//! use std::sync::Arc;
//!
//! let executor = RequestExecutor::new(
//!     RequestSpec::new().base_uri("http://localhost:8080"),
//!     Arc::new(ReqwestTransport::new()),
//! );
//! let response = RequestSender::new(executor).when().get("/health").unwrap();
//! response.then().status_code(200);
//! ```

mod client;
mod error;
mod request;

pub use client::{ClientSettings, ReqwestTransport};
pub use error::{HttpTransportError, Result};
