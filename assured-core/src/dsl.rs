//! The `given().when().get(...)` chain.

use bytes::Bytes;
use http::Method;
use serde::Serialize;

use crate::config::ConfigLayer;
use crate::executor::RequestExecutor;
use crate::expect::ResponseSpecification;
use crate::filter::Filter;
use crate::merge::merge_specs;
use crate::response::Response;
use crate::spec::{AuthScheme, MultiPart, RequestSpec};
use crate::{AssuredError, Result};

macro_rules! inline {
    ($($(#[$meta:meta])* $name:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            $(#[$meta])*
            pub fn $name(mut self, $($arg: $ty),*) -> Self {
                self.inline = self.inline.$name($($arg),*);
                self
            }
        )*
    };
}

/// Builds and sends one request.
///
/// Calls made directly on the sender take precedence over every spec
/// attached with [`spec`](Self::spec), which in turn take precedence over
/// the static defaults.
#[derive(Debug, Clone)]
pub struct RequestSender {
    executor: RequestExecutor,
    attached: Option<RequestSpec>,
    inline: RequestSpec,
    expectations: ResponseSpecification,
}

impl RequestSender {
    /// Create a sender backed by an executor.
    pub fn new(executor: RequestExecutor) -> Self {
        Self {
            executor,
            attached: None,
            inline: RequestSpec::new(),
            expectations: ResponseSpecification::new(),
        }
    }

    /// The config that decides MERGE or REPLACE for inline values: the
    /// defaults' config, then the attached spec's, then the inline one.
    fn policy(&self) -> ConfigLayer {
        let mut policy = self.executor.defaults().get_config().clone();
        if let Some(attached) = &self.attached {
            policy = ConfigLayer::merge(&policy, attached.get_config());
        }
        ConfigLayer::merge(&policy, self.inline.get_config())
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let policy = self.policy();
        self.inline.add_header_under(&policy, name, value);
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

    /// Add a request parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let policy = self.policy();
        self.inline.add_param_under(&policy, name, value);
        self
    }

    /// Add a query parameter.
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let policy = self.policy();
        self.inline.add_query_param_under(&policy, name, value);
        self
    }

    /// Add a form parameter.
    pub fn form_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let policy = self.policy();
        self.inline.add_form_param_under(&policy, name, value);
        self
    }

    /// Set the session id cookie, named by the session config in effect.
    pub fn session_id(mut self, value: impl Into<String>) -> Self {
        let policy = self.policy();
        self.inline.set_session_id_under(&policy, value);
        self
    }

    inline! {
        /// Set a named path parameter.
        path_param(name: impl Into<String>, value: impl Into<String>);
        /// Add a cookie.
        cookie(name: impl Into<String>, value: impl Into<String>);
        /// Add a multipart body part.
        multipart(part: MultiPart);
        /// Set the raw body.
        body(body: impl Into<Bytes>);
        /// Set the authentication scheme.
        auth(auth: AuthScheme);
        /// Use preemptive basic authentication.
        basic_auth(username: impl Into<String>, password: impl Into<String>);
        /// Use bearer authentication.
        bearer_auth(token: impl Into<String>);
        /// Set the base URI.
        base_uri(uri: impl Into<String>);
        /// Override the port.
        port(port: u16);
        /// Set the base path.
        base_path(base_path: impl Into<String>);
        /// Apply a config layer.
        config(config: ConfigLayer);
        /// Set the root path for body expectations.
        root_path(path: impl Into<String>);
    }

    /// Serialize a value as the JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| AssuredError::Serialization(e.to_string()))?;
        self.inline = self.inline.body(bytes);
        Ok(self.content_type("application/json"))
    }

    /// Register a filter.
    pub fn filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.inline = self.inline.filter(filter);
        self
    }

    /// Attach a reusable specification. Several attached specs merge in
    /// call order.
    pub fn spec(mut self, spec: &RequestSpec) -> Self {
        self.attached = Some(match self.attached.take() {
            Some(previous) => merge_specs(&previous, spec),
            None => spec.clone(),
        });
        self
    }

    /// Set the response expectations checked after the request.
    pub fn expect(mut self, expectations: ResponseSpecification) -> Self {
        self.expectations = expectations;
        self
    }

    /// Syntactic sugar before the method call.
    pub fn when(self) -> Self {
        self
    }

    /// Send a GET request.
    pub fn get(self, path: &str) -> Result<Response> {
        self.request(Method::GET, path)
    }

    /// Send a GET request filling `{placeholders}` in order.
    pub fn get_with<I, V>(self, path: &str, params: I) -> Result<Response>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.request_with(Method::GET, path, params)
    }

    /// Send a POST request.
    pub fn post(self, path: &str) -> Result<Response> {
        self.request(Method::POST, path)
    }

    /// Send a PUT request.
    pub fn put(self, path: &str) -> Result<Response> {
        self.request(Method::PUT, path)
    }

    /// Send a PATCH request.
    pub fn patch(self, path: &str) -> Result<Response> {
        self.request(Method::PATCH, path)
    }

    /// Send a DELETE request.
    pub fn delete(self, path: &str) -> Result<Response> {
        self.request(Method::DELETE, path)
    }

    /// Send a HEAD request.
    pub fn head(self, path: &str) -> Result<Response> {
        self.request(Method::HEAD, path)
    }

    /// Send an OPTIONS request.
    pub fn options(self, path: &str) -> Result<Response> {
        self.request(Method::OPTIONS, path)
    }

    /// Send a request with positional path parameters.
    pub fn request_with<I, V>(mut self, method: Method, path: &str, params: I) -> Result<Response>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.inline = self.inline.unnamed_path_params(params);
        self.request(method, path)
    }

    /// Send a request. An empty path keeps whatever path the attached specs set.
    pub fn request(mut self, method: Method, path: &str) -> Result<Response> {
        self.inline = self.inline.method(method);
        if !path.is_empty() {
            self.inline = self.inline.path(path);
        }
        self.executor
            .execute(self.attached.as_ref(), &self.inline, &self.expectations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HeaderConfig, ParamConfig, SessionConfig};
    use crate::transport::{transport_fn, Transport};
    use std::sync::Arc;

    fn echo() -> Arc<dyn Transport> {
        Arc::new(transport_fn(|request| {
            let url = request.resolve_uri()?;
            Ok(Response::with_status(200)
                .with_body(format!("{} {}", request.method_or_default(), url)))
        }))
    }

    #[test]
    fn test_inline_calls_reach_transport() {
        let sender = RequestSender::new(RequestExecutor::new(RequestSpec::new(), echo()));
        let response = sender
            .base_uri("http://api.test")
            .query_param("page", "1")
            .when()
            .get("/items")
            .unwrap();
        assert_eq!(response.text().unwrap(), "GET http://api.test/items?page=1");
    }

    #[test]
    fn test_positional_path_params() {
        let sender = RequestSender::new(RequestExecutor::new(RequestSpec::new(), echo()));
        let response = sender
            .get_with("/users/{id}/posts/{post}", ["5", "a b"])
            .unwrap();
        assert_eq!(
            response.text().unwrap(),
            "GET http://localhost:8080/users/5/posts/a%20b"
        );
    }

    #[test]
    fn test_attached_specs_merge_in_order() {
        let first = RequestSpec::new().base_uri("http://first").base_path("/v1");
        let second = RequestSpec::new().base_uri("http://second");
        let sender = RequestSender::new(RequestExecutor::new(RequestSpec::new(), echo()));
        let response = sender.spec(&first).spec(&second).delete("/x").unwrap();
        assert_eq!(response.text().unwrap(), "DELETE http://second/v1/x");
    }

    #[test]
    fn test_inline_values_follow_default_replace_policy() {
        let defaults = RequestSpec::new().config(
            ConfigLayer::new()
                .with_params(ParamConfig::new().replace_all_parameters())
                .with_headers(HeaderConfig::new().overwrite_headers_with_name(["X"])),
        );
        let sender = RequestSender::new(RequestExecutor::new(defaults, echo()))
            .query_param("page", "1")
            .query_param("page", "2")
            .form_param("name", "a")
            .form_param("name", "b")
            .header("X", "3")
            .header("x", "4");

        let resolved = sender.executor.resolve(sender.attached.as_ref(), &sender.inline);
        assert_eq!(resolved.get_query_params().get("page"), vec!["2"]);
        assert_eq!(resolved.get_form_params().get("name"), vec!["b"]);
        assert_eq!(resolved.get_headers().get("X"), vec!["4"]);

        let response = sender.get("/items").unwrap();
        assert_eq!(response.text().unwrap(), "GET http://localhost:8080/items?page=2");
    }

    #[test]
    fn test_inline_values_follow_attached_policies() {
        let attached = RequestSpec::new().config(
            ConfigLayer::new()
                .with_params(ParamConfig::new().replace_all_parameters())
                .with_session(SessionConfig::new().session_id_name("SID")),
        );
        let sender = RequestSender::new(RequestExecutor::new(RequestSpec::new(), echo()))
            .spec(&attached)
            .param("q", "a")
            .param("q", "b")
            .session_id("s-1");

        let resolved = sender.executor.resolve(sender.attached.as_ref(), &sender.inline);
        assert_eq!(resolved.get_request_params().get("q"), vec!["b"]);
        assert_eq!(resolved.get_cookies().get("SID"), vec!["s-1"]);
    }

    #[test]
    fn test_inline_values_merge_without_replace_policy() {
        let sender = RequestSender::new(RequestExecutor::new(RequestSpec::new(), echo()))
            .query_param("page", "1")
            .query_param("page", "2");
        let resolved = sender.executor.resolve(None, &sender.inline);
        assert_eq!(resolved.get_query_params().get("page"), vec!["1", "2"]);
    }

    #[test]
    fn test_expectations_are_checked() {
        let sender = RequestSender::new(RequestExecutor::new(RequestSpec::new(), echo()));
        let err = sender
            .expect(ResponseSpecification::new().status_code(201))
            .post("/items")
            .unwrap_err();
        assert_eq!(err.failures(), ["Expected status code <201> but was <200>."]);
    }
}
