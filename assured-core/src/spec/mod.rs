//! The request specification store.
//!
//! A [`RequestSpec`] is built with consuming builder methods, may be reused
//! as a template across many requests, and is mutated through `&mut self`
//! methods by filters while a request is in flight. Every dispatch works on
//! its own merged copy, so a filter's changes never reach the template.

mod auth;
mod path;

pub use auth::AuthScheme;
pub use path::DEFAULT_BASE_URI;

use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use serde::Serialize;

use crate::config::{ConfigLayer, UpdateStrategy};
use crate::filter::Filter;
use crate::params::ParameterMultiMap;
use crate::root_path::RootPathState;
use crate::{AssuredError, Result};

/// One part of a multipart request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiPart {
    control_name: String,
    content: Bytes,
    file_name: Option<String>,
    mime_type: Option<String>,
}

impl MultiPart {
    /// A text part.
    pub fn text(control_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            control_name: control_name.into(),
            content: Bytes::from(value.into()),
            file_name: None,
            mime_type: Some("text/plain".to_string()),
        }
    }

    /// A binary part.
    pub fn bytes(control_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            control_name: control_name.into(),
            content: content.into(),
            file_name: None,
            mime_type: Some("application/octet-stream".to_string()),
        }
    }

    /// Set the file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Set the mime type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Form control name.
    pub fn control_name(&self) -> &str {
        &self.control_name
    }

    /// Part content.
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// File name, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Mime type, if any.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }
}

/// Aggregate description of an HTTP request before dispatch.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub(crate) method: Option<Method>,
    pub(crate) base_uri: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) base_path: Option<String>,
    pub(crate) path: Option<String>,
    pub(crate) query_params: ParameterMultiMap,
    pub(crate) form_params: ParameterMultiMap,
    pub(crate) request_params: ParameterMultiMap,
    pub(crate) path_params: ParameterMultiMap,
    pub(crate) unnamed_path_params: Vec<String>,
    pub(crate) headers: ParameterMultiMap,
    pub(crate) cookies: ParameterMultiMap,
    pub(crate) multiparts: ParameterMultiMap<MultiPart>,
    pub(crate) body: Option<Bytes>,
    pub(crate) auth: Option<AuthScheme>,
    pub(crate) config: ConfigLayer,
    pub(crate) filters: Vec<Arc<dyn Filter>>,
    pub(crate) root_path: RootPathState,
}

impl Default for RequestSpec {
    fn default() -> Self {
        Self {
            method: None,
            base_uri: None,
            port: None,
            base_path: None,
            path: None,
            query_params: ParameterMultiMap::exact(),
            form_params: ParameterMultiMap::exact(),
            request_params: ParameterMultiMap::exact(),
            path_params: ParameterMultiMap::exact(),
            unnamed_path_params: Vec::new(),
            headers: ParameterMultiMap::case_insensitive(),
            cookies: ParameterMultiMap::exact(),
            multiparts: ParameterMultiMap::exact(),
            body: None,
            auth: None,
            config: ConfigLayer::default(),
            filters: Vec::new(),
            root_path: RootPathState::new(),
        }
    }
}

impl RequestSpec {
    /// Create an empty specification.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Builder methods
    // ------------------------------------------------------------------

    /// Set the base URI, e.g. `http://localhost`.
    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = Some(uri.into());
        self
    }

    /// Override the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set a path prefix placed between the base URI and the request path.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Set the request path. May contain `{placeholders}` or be an absolute URL.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_header(name, value);
        self
    }

    /// Add several headers.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.add_header(name, value);
        }
        self
    }

    /// Set the content type.
    pub fn content_type(self, content_type: impl Into<String>) -> Self {
        self.header(http::header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Set the accept header.
    pub fn accept(self, accept: impl Into<String>) -> Self {
        self.header(http::header::ACCEPT.as_str(), accept)
    }

    /// Add a request parameter: a query parameter for GET-like requests, a
    /// form parameter otherwise.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_param(name, value);
        self
    }

    /// Add a query parameter.
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_query_param(name, value);
        self
    }

    /// Add several query parameters.
    pub fn query_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            self.add_query_param(name, value);
        }
        self
    }

    /// Add a form parameter.
    pub fn form_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_form_param(name, value);
        self
    }

    /// Set a named path parameter.
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_path_param(name, value);
        self
    }

    /// Set positional path parameters, filled into placeholders in order.
    pub fn unnamed_path_params<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.unnamed_path_params = values.into_iter().map(Into::into).collect();
        self
    }

    /// Add a cookie.
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_cookie(name, value);
        self
    }

    /// Set the session id cookie, named by the session config.
    pub fn session_id(mut self, value: impl Into<String>) -> Self {
        self.set_session_id(value);
        self
    }

    /// Add a multipart body part.
    pub fn multipart(mut self, part: MultiPart) -> Self {
        let name = part.control_name.clone();
        self.multiparts.add(name, part, UpdateStrategy::Merge);
        self
    }

    /// Set the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize a value as the JSON body and set the content type.
    pub fn json<T: Serialize>(self, value: &T) -> Result<Self> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| AssuredError::Serialization(e.to_string()))?;
        Ok(self.content_type("application/json").body(bytes))
    }

    /// Set the authentication scheme.
    pub fn auth(mut self, auth: AuthScheme) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Use preemptive basic authentication.
    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth(AuthScheme::basic(username, password))
    }

    /// Use bearer authentication.
    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.auth(AuthScheme::bearer(token))
    }

    /// Apply the user-configured parts of a config layer on top of the
    /// current one.
    pub fn config(mut self, config: ConfigLayer) -> Self {
        self.config = ConfigLayer::merge(&self.config, &config);
        self
    }

    /// Register a filter. Filters run in registration order.
    pub fn filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Register several shared filters.
    pub fn filters<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Filter>>,
    {
        self.filters.extend(filters);
        self
    }

    /// Set the root path that body expectations are scoped to.
    pub fn root_path(mut self, path: impl Into<String>) -> Self {
        self.root_path = RootPathState::with_path(path);
        self
    }

    // ------------------------------------------------------------------
    // In-place mutation (used by filters and the builder methods)
    // ------------------------------------------------------------------

    /// Add a header, honouring the header overwrite rules.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let strategy = self.config.headers().strategy_for(&name);
        self.headers.add(name, value.into(), strategy);
    }

    /// Set a header, dropping earlier values regardless of the overwrite rules.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.add(name, value.into(), UpdateStrategy::Replace);
    }

    /// Remove a header.
    pub fn remove_header(&mut self, name: &str) -> usize {
        self.headers.remove(name)
    }

    /// Add a request parameter.
    pub fn add_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let strategy = self.config.params().request_strategy();
        self.request_params.add(name, value.into(), strategy);
    }

    /// Add a query parameter.
    pub fn add_query_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let strategy = self.config.params().query_strategy();
        self.query_params.add(name, value.into(), strategy);
    }

    /// Remove a query parameter.
    pub fn remove_query_param(&mut self, name: &str) -> usize {
        self.query_params.remove(name)
    }

    /// Add a form parameter.
    pub fn add_form_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let strategy = self.config.params().form_strategy();
        self.form_params.add(name, value.into(), strategy);
    }

    /// Set a named path parameter.
    pub fn add_path_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.path_params
            .add(name, value.into(), UpdateStrategy::Replace);
    }

    /// Add a cookie.
    pub fn add_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.add(name, value.into(), UpdateStrategy::Merge);
    }

    /// Remove a cookie.
    pub fn remove_cookie(&mut self, name: &str) -> usize {
        self.cookies.remove(name)
    }

    /// Set the session id cookie.
    pub fn set_session_id(&mut self, value: impl Into<String>) {
        let name = self.config.session().name().to_string();
        self.cookies.add(name, value.into(), UpdateStrategy::Replace);
    }

    /// Add a header under the overwrite rules of `policy` rather than this
    /// spec's own config.
    pub(crate) fn add_header_under(
        &mut self,
        policy: &ConfigLayer,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        let name = name.into();
        let strategy = policy.headers().strategy_for(&name);
        self.headers.add(name, value.into(), strategy);
    }

    pub(crate) fn add_param_under(
        &mut self,
        policy: &ConfigLayer,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        let strategy = policy.params().request_strategy();
        self.request_params.add(name, value.into(), strategy);
    }

    pub(crate) fn add_query_param_under(
        &mut self,
        policy: &ConfigLayer,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        let strategy = policy.params().query_strategy();
        self.query_params.add(name, value.into(), strategy);
    }

    pub(crate) fn add_form_param_under(
        &mut self,
        policy: &ConfigLayer,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        let strategy = policy.params().form_strategy();
        self.form_params.add(name, value.into(), strategy);
    }

    pub(crate) fn set_session_id_under(&mut self, policy: &ConfigLayer, value: impl Into<String>) {
        let name = policy.session().name().to_string();
        self.cookies.add(name, value.into(), UpdateStrategy::Replace);
    }

    /// Replace the body.
    pub fn set_body(&mut self, body: Option<Bytes>) {
        self.body = body;
    }

    /// Replace the method.
    pub fn set_method(&mut self, method: Method) {
        self.method = Some(method);
    }

    /// Replace the request path.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    /// Replace the base URI.
    pub fn set_base_uri(&mut self, uri: impl Into<String>) {
        self.base_uri = Some(uri.into());
    }

    /// Replace the port.
    pub fn set_port(&mut self, port: u16) {
        self.port = Some(port);
    }

    /// Replace the authentication scheme.
    pub fn set_auth(&mut self, auth: Option<AuthScheme>) {
        self.auth = auth;
    }

    /// Replace the whole config layer.
    pub fn set_config(&mut self, config: ConfigLayer) {
        self.config = config;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The method, defaulting to GET.
    pub fn method_or_default(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }

    /// The explicitly set method.
    pub fn get_method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// The explicitly set base URI.
    pub fn get_base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    /// The explicitly set port.
    pub fn get_port(&self) -> Option<u16> {
        self.port
    }

    /// The explicitly set base path.
    pub fn get_base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// The unresolved request path.
    pub fn get_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Headers.
    pub fn get_headers(&self) -> &ParameterMultiMap {
        &self.headers
    }

    /// Query parameters.
    pub fn get_query_params(&self) -> &ParameterMultiMap {
        &self.query_params
    }

    /// Form parameters.
    pub fn get_form_params(&self) -> &ParameterMultiMap {
        &self.form_params
    }

    /// Request parameters.
    pub fn get_request_params(&self) -> &ParameterMultiMap {
        &self.request_params
    }

    /// Named path parameters.
    pub fn get_path_params(&self) -> &ParameterMultiMap {
        &self.path_params
    }

    /// Positional path parameters.
    pub fn get_unnamed_path_params(&self) -> &[String] {
        &self.unnamed_path_params
    }

    /// Cookies.
    pub fn get_cookies(&self) -> &ParameterMultiMap {
        &self.cookies
    }

    /// Multipart body parts.
    pub fn get_multiparts(&self) -> &ParameterMultiMap<MultiPart> {
        &self.multiparts
    }

    /// The body.
    pub fn get_body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// The authentication scheme.
    pub fn get_auth(&self) -> Option<&AuthScheme> {
        self.auth.as_ref()
    }

    /// The config layer.
    pub fn get_config(&self) -> &ConfigLayer {
        &self.config
    }

    /// Registered filters in execution order.
    pub fn get_filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }

    /// The root path.
    pub fn get_root_path(&self) -> &RootPathState {
        &self.root_path
    }
}
