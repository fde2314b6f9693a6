//! Request and response logging filters.

use std::fmt::Write;
use std::sync::Arc;

use http::StatusCode;

use super::{Filter, FilterContext};
use crate::config::LogConfig;
use crate::expect::ResponseSpecification;
use crate::params::ParameterMultiMap;
use crate::response::Response;
use crate::spec::RequestSpec;
use crate::Result;

const BLACKLISTED: &str = "[ BLACKLISTED ]";

/// What part of a request or response to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDetail {
    /// Everything.
    #[default]
    All,
    /// Request method.
    Method,
    /// Request URI.
    Uri,
    /// Request, query, form and path parameters.
    Params,
    /// Headers.
    Headers,
    /// Cookies.
    Cookies,
    /// Body.
    Body,
    /// Response status line.
    Status,
}

impl LogDetail {
    fn includes(self, part: LogDetail) -> bool {
        self == LogDetail::All || self == part
    }
}

fn write_map(out: &mut String, title: &str, map: &ParameterMultiMap, mask: impl Fn(&str) -> bool) {
    let _ = write!(out, "{:<16}", format!("{}:", title));
    if map.is_empty() {
        out.push_str("<none>\n");
        return;
    }
    for (i, (name, value)) in map.iter().enumerate() {
        if i > 0 {
            out.push_str(&" ".repeat(16));
        }
        let value = if mask(name) { BLACKLISTED } else { value.as_str() };
        let _ = writeln!(out, "{}={}", name, value);
    }
}

/// Render a request for logging.
pub(crate) fn describe_request(request: &RequestSpec, detail: LogDetail) -> String {
    let log = request.get_config().log();
    let mut out = String::new();

    if detail.includes(LogDetail::Method) {
        let _ = writeln!(out, "{:<16}{}", "Request method:", request.method_or_default());
    }
    if detail.includes(LogDetail::Uri) {
        let uri = match request.resolve_uri() {
            Ok(uri) => uri.to_string(),
            Err(_) => request.get_path().unwrap_or_default().to_string(),
        };
        let _ = writeln!(out, "{:<16}{}", "Request URI:", uri);
    }
    if detail.includes(LogDetail::Params) {
        write_map(&mut out, "Request params", request.get_request_params(), |_| false);
        write_map(&mut out, "Query params", request.get_query_params(), |_| false);
        write_map(&mut out, "Form params", request.get_form_params(), |_| false);
        write_map(&mut out, "Path params", request.get_path_params(), |_| false);
    }
    if detail.includes(LogDetail::Headers) {
        write_map(&mut out, "Headers", request.get_headers(), |name| {
            log.is_blacklisted(name)
        });
    }
    if detail.includes(LogDetail::Cookies) {
        write_map(&mut out, "Cookies", request.get_cookies(), |_| false);
    }
    if detail.includes(LogDetail::Body) {
        let body = request
            .get_body()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_else(|| "<none>".to_string());
        let _ = writeln!(out, "{:<16}{}", "Body:", body);
    }
    out
}

/// Render a response for logging.
pub(crate) fn describe_response(response: &Response, detail: LogDetail, log: &LogConfig) -> String {
    let mut out = String::new();

    if detail.includes(LogDetail::Status) {
        let status = response.status();
        let _ = writeln!(
            out,
            "HTTP/1.1 {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        );
    }
    if detail.includes(LogDetail::Headers) {
        for (name, value) in response.headers() {
            let value = if log.is_blacklisted(name.as_str()) {
                BLACKLISTED.to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            let _ = writeln!(out, "{}: {}", name, value);
        }
    }
    if detail.includes(LogDetail::Cookies) {
        for (name, value) in response.cookies() {
            let _ = writeln!(out, "Cookie: {}={}", name, value);
        }
    }
    if detail.includes(LogDetail::Body) && !response.bytes().is_empty() {
        out.push('\n');
        out.push_str(&String::from_utf8_lossy(response.bytes()));
        out.push('\n');
    }
    out
}

/// Logs the request as it leaves the filter.
///
/// Headers blacklisted in the log config are masked.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLoggingFilter {
    detail: LogDetail,
}

impl RequestLoggingFilter {
    /// Log everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log only one part of the request.
    pub fn with_detail(detail: LogDetail) -> Self {
        Self { detail }
    }
}

impl Filter for RequestLoggingFilter {
    fn filter(
        &self,
        request: &mut RequestSpec,
        response: &ResponseSpecification,
        ctx: &mut FilterContext<'_>,
    ) -> Result<Response> {
        tracing::info!(target: "assured::request", "\n{}", describe_request(request, self.detail));
        ctx.next(request, response)
    }

    fn name(&self) -> &str {
        "request_logging"
    }
}

type StatusPredicate = Arc<dyn Fn(StatusCode) -> bool + Send + Sync>;

/// Logs the response on its way back through the filter.
#[derive(Clone)]
pub struct ResponseLoggingFilter {
    detail: LogDetail,
    predicate: Option<StatusPredicate>,
}

impl Default for ResponseLoggingFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResponseLoggingFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseLoggingFilter")
            .field("detail", &self.detail)
            .field("conditional", &self.predicate.is_some())
            .finish()
    }
}

impl ResponseLoggingFilter {
    /// Log every response in full.
    pub fn new() -> Self {
        Self {
            detail: LogDetail::All,
            predicate: None,
        }
    }

    /// Log only one part of the response.
    pub fn with_detail(detail: LogDetail) -> Self {
        Self {
            detail,
            predicate: None,
        }
    }

    /// Log only responses whose status matches.
    pub fn on_status<F>(mut self, predicate: F) -> Self
    where
        F: Fn(StatusCode) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Log only error responses (4xx and 5xx).
    pub fn errors_only(self) -> Self {
        self.on_status(|status| status.is_client_error() || status.is_server_error())
    }

    fn should_log(&self, status: StatusCode) -> bool {
        self.predicate.as_ref().map_or(true, |p| p(status))
    }
}

impl Filter for ResponseLoggingFilter {
    fn filter(
        &self,
        request: &mut RequestSpec,
        response: &ResponseSpecification,
        ctx: &mut FilterContext<'_>,
    ) -> Result<Response> {
        let result = ctx.next(request, response)?;
        if self.should_log(result.status()) {
            let text = describe_response(&result, self.detail, request.get_config().log());
            tracing::info!(target: "assured::response", status = result.status_code(), "\n{}", text);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "response_logging"
    }
}
