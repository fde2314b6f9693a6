//! Response expectations.
//!
//! [`ResponseSpecification`] collects expectations before a request is sent
//! and is checked after the filter chain returns, reporting every failure at
//! once. [`ValidatableResponse`] checks the same things eagerly on a response
//! already in hand.
//!
//! Body expectations are addressed by path strings resolved against the root
//! path. Interpreting a path is left to a [`PathMatcher`]; the [`json`]
//! module provides matchers for JSON bodies.

pub mod json;
mod validatable;

pub use validatable::ValidatableResponse;

use std::fmt;
use std::sync::Arc;

use crate::response::Response;
use crate::root_path::{PathArg, RootPathState};
use crate::{AssuredError, Result};

/// Evaluates a resolved path against a response.
pub trait PathMatcher: Send + Sync {
    /// Return `Err` with a description of the mismatch.
    fn matches(&self, response: &Response, path: &str) -> std::result::Result<(), String>;
}

impl<F> PathMatcher for F
where
    F: Fn(&Response, &str) -> std::result::Result<(), String> + Send + Sync,
{
    fn matches(&self, response: &Response, path: &str) -> std::result::Result<(), String> {
        self(response, path)
    }
}

#[derive(Clone)]
struct BodyExpectation {
    relative: String,
    args: Vec<PathArg>,
    root: RootPathState,
    // No root was declared on the specification before this expectation.
    inherits_request_root: bool,
    matcher: Arc<dyn PathMatcher>,
}

impl fmt::Debug for BodyExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyExpectation")
            .field("relative", &self.relative)
            .field("args", &self.args)
            .field("root", &self.root)
            .field("inherits_request_root", &self.inherits_request_root)
            .finish_non_exhaustive()
    }
}

pub(crate) fn check_status(response: &Response, expected: u16) -> Option<String> {
    let actual = response.status_code();
    (actual != expected)
        .then(|| format!("Expected status code <{}> but was <{}>.", expected, actual))
}

pub(crate) fn check_header(response: &Response, name: &str, expected: &str) -> Option<String> {
    let values = response.header_values(name);
    if values.iter().any(|v| *v == expected) {
        return None;
    }
    if values.is_empty() {
        return Some(format!(
            "Expected header \"{}\" was not present in the response.",
            name
        ));
    }
    Some(format!(
        "Expected header \"{}\" to be \"{}\" but was \"{}\".",
        name,
        expected,
        values.join(", ")
    ))
}

pub(crate) fn check_content_type(response: &Response, expected: &str) -> Option<String> {
    let actual = response.content_type().unwrap_or_default();
    let mime = actual.split(';').next().unwrap_or_default().trim();
    if mime.eq_ignore_ascii_case(expected) || actual.eq_ignore_ascii_case(expected) {
        None
    } else {
        Some(format!(
            "Expected content-type \"{}\" doesn't match actual content-type \"{}\".",
            expected, actual
        ))
    }
}

pub(crate) fn check_body(
    response: &Response,
    path: &str,
    matcher: &dyn PathMatcher,
) -> Option<String> {
    matcher
        .matches(response, path)
        .err()
        .map(|reason| format!("Path \"{}\": {}", path, reason))
}

/// Expectations declared before the request is sent.
#[derive(Debug, Clone, Default)]
pub struct ResponseSpecification {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    content_type: Option<String>,
    body: Vec<BodyExpectation>,
    root_path: RootPathState,
    root_declared: bool,
}

impl ResponseSpecification {
    /// Create an empty specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect a status code.
    pub fn status_code(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Expect a header value.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Expect a content type. Parameters such as `charset` are ignored
    /// unless `content_type` includes them.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Expect a body path to match. The path is attached to the root path in
    /// effect now.
    pub fn body<M: PathMatcher + 'static>(self, path: impl Into<String>, matcher: M) -> Self {
        self.body_with_args(path, Vec::new(), matcher)
    }

    /// Expect a body path with `%s`/`%d` arguments to match.
    pub fn body_with_args<M: PathMatcher + 'static>(
        mut self,
        path: impl Into<String>,
        args: Vec<PathArg>,
        matcher: M,
    ) -> Self {
        let root = self.root_path.take_for_body();
        self.body.push(BodyExpectation {
            relative: path.into(),
            args,
            root,
            inherits_request_root: !self.root_declared,
            matcher: Arc::new(matcher),
        });
        self
    }

    /// Set the root path.
    pub fn root(mut self, path: impl Into<String>) -> Self {
        self.root_path = RootPathState::with_path(path);
        self.root_declared = true;
        self
    }

    /// Set the root path from a template. Arguments beyond the template's
    /// specifiers are kept for the next body expectation.
    pub fn root_with_args(mut self, template: &str, args: &[PathArg]) -> Result<Self> {
        self.root_path.set_root(template, args)?;
        self.root_declared = true;
        Ok(self)
    }

    /// Append to the root path.
    pub fn append_root(self, template: &str) -> Result<Self> {
        self.append_root_with_args(template, &[])
    }

    /// Append a template to the root path.
    pub fn append_root_with_args(mut self, template: &str, args: &[PathArg]) -> Result<Self> {
        self.root_path.append_root(template, args)?;
        self.root_declared = true;
        Ok(self)
    }

    /// Remove a trailing segment from the root path.
    pub fn detach_root(mut self, suffix: &str) -> Result<Self> {
        self.root_path.detach_root(suffix)?;
        self.root_declared = true;
        Ok(self)
    }

    /// Clear the root path. Later body expectations no longer pick up the
    /// request's root path either.
    pub fn no_root(mut self) -> Self {
        self.root_path.reset();
        self.root_declared = true;
        self
    }

    /// The current root path.
    pub fn get_root_path(&self) -> &RootPathState {
        &self.root_path
    }

    /// Check if nothing is expected.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.headers.is_empty()
            && self.content_type.is_none()
            && self.body.is_empty()
    }

    /// Apply a request's root path to every body expectation declared
    /// before any root operation on this specification.
    pub fn seeded_with(&self, root: &RootPathState) -> ResponseSpecification {
        let mut seeded = self.clone();
        if root.is_empty() {
            return seeded;
        }
        for expectation in seeded.body.iter_mut().filter(|e| e.inherits_request_root) {
            expectation.root = expectation.root.seeded_with(root);
        }
        if !seeded.root_declared {
            seeded.root_path = root.clone();
        }
        seeded
    }

    /// Resolved paths of the body expectations, in declaration order.
    pub fn resolved_body_paths(&self) -> Result<Vec<String>> {
        self.body
            .iter()
            .map(|e| e.root.clone().resolve_body_path(&e.relative, &e.args))
            .collect()
    }

    /// Check a response. A path that can't be resolved is a configuration
    /// error; otherwise every failed expectation is reported together.
    pub fn validate(&self, response: &Response) -> Result<()> {
        let paths = self.resolved_body_paths()?;
        let mut failures = Vec::new();

        if let Some(status) = self.status {
            failures.extend(check_status(response, status));
        }
        for (name, value) in &self.headers {
            failures.extend(check_header(response, name, value));
        }
        if let Some(content_type) = &self.content_type {
            failures.extend(check_content_type(response, content_type));
        }
        for (expectation, path) in self.body.iter().zip(&paths) {
            failures.extend(check_body(response, path, expectation.matcher.as_ref()));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AssuredError::AssertionFailed(failures))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::json::{equal_to, has_size};
    use super::*;
    use crate::path_args;

    fn store() -> Response {
        Response::with_status(200)
            .with_json(&serde_json::json!({
                "store": {
                    "book": [
                        {"author": "Nigel Rees", "category": "reference", "price": 8.95},
                        {"author": "Evelyn Waugh", "category": "fiction", "price": 12.99}
                    ]
                }
            }))
            .unwrap()
    }

    #[test]
    fn test_status_and_header_failures_are_collected() {
        let spec = ResponseSpecification::new()
            .status_code(201)
            .header("X-Missing", "1")
            .content_type("text/html");

        let err = spec.validate(&store()).unwrap_err();
        assert_eq!(err.failures().len(), 3);
        assert_eq!(
            err.failures()[0],
            "Expected status code <201> but was <200>."
        );
    }

    #[test]
    fn test_content_type_ignores_parameters() {
        let response = Response::with_status(200)
            .with_header("Content-Type", "application/json; charset=utf-8");
        assert!(ResponseSpecification::new()
            .content_type("application/json")
            .validate(&response)
            .is_ok());
    }

    #[test]
    fn test_body_paths_use_root_in_effect_at_declaration() {
        let spec = ResponseSpecification::new()
            .root("store.book")
            .body("size()", has_size(2))
            .body("[0].author", equal_to("Nigel Rees"))
            .no_root()
            .body("store.book[1].price", equal_to(12.99));

        assert_eq!(
            spec.resolved_body_paths().unwrap(),
            vec!["store.book.size()", "store.book.[0].author", "store.book[1].price"]
        );
    }

    #[test]
    fn test_body_expectations_pass_and_fail() {
        let spec = ResponseSpecification::new()
            .root("store.book[0]")
            .body("author", equal_to("Nigel Rees"))
            .body("price", equal_to(1));
        let err = spec.validate(&store()).unwrap_err();
        assert_eq!(err.failures().len(), 1);
        assert!(err.failures()[0].contains("store.book[0].price"));
    }

    #[test]
    fn test_leftover_root_args_fill_next_body_path() {
        let spec = ResponseSpecification::new()
            .root_with_args("store.%s[%d]", &path_args!["book"])
            .unwrap()
            .body_with_args("category", path_args![1], equal_to("fiction"));
        assert_eq!(
            spec.resolved_body_paths().unwrap(),
            vec!["store.book[1].category"]
        );
        assert!(spec.validate(&store()).is_ok());
    }

    #[test]
    fn test_root_operations_report_configuration_errors() {
        let err = ResponseSpecification::new()
            .append_root("book")
            .unwrap_err();
        assert!(err.is_configuration_error());

        let err = ResponseSpecification::new()
            .root("store.book")
            .detach_root("another")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot detach path 'another' since root path 'store.book' doesn't end with 'another'."
        );
    }

    #[test]
    fn test_unresolvable_path_is_not_an_assertion_failure() {
        let spec = ResponseSpecification::new()
            .root("store.%s.%s")
            .body_with_args("", path_args!["book"], has_size(2));
        let err = spec.validate(&store()).unwrap_err();
        assert!(matches!(err, AssuredError::MissingPathArguments { .. }));
    }

    #[test]
    fn test_seeded_root_applies_to_unrooted_expectations() {
        let spec = ResponseSpecification::new().body("size()", has_size(2));
        let seeded = spec.seeded_with(&RootPathState::with_path("store.book"));
        assert_eq!(seeded.resolved_body_paths().unwrap(), vec!["store.book.size()"]);
        assert!(seeded.validate(&store()).is_ok());

        let rooted = ResponseSpecification::new()
            .root("store")
            .body("book.size()", has_size(2))
            .seeded_with(&RootPathState::with_path("other"));
        assert_eq!(rooted.resolved_body_paths().unwrap(), vec!["store.book.size()"]);
    }

    #[test]
    fn test_seeding_is_decided_per_expectation() {
        let spec = ResponseSpecification::new()
            .body("size()", has_size(2))
            .root("store.book[1]")
            .body("author", equal_to("Evelyn Waugh"))
            .seeded_with(&RootPathState::with_path("store.book"));
        assert_eq!(
            spec.resolved_body_paths().unwrap(),
            vec!["store.book.size()", "store.book[1].author"]
        );
        assert!(spec.validate(&store()).is_ok());

        let cleared = ResponseSpecification::new()
            .no_root()
            .body("store.book[0].author", equal_to("Nigel Rees"))
            .seeded_with(&RootPathState::with_path("store.book"));
        assert_eq!(
            cleared.resolved_body_paths().unwrap(),
            vec!["store.book[0].author"]
        );
        assert!(cleared.validate(&store()).is_ok());
    }

    #[test]
    fn test_closure_matcher() {
        let spec = ResponseSpecification::new().body("anything", |response: &Response, path: &str| {
            if response.is_success() && path == "anything" {
                Ok(())
            } else {
                Err("unexpected".to_string())
            }
        });
        assert!(spec.validate(&store()).is_ok());
    }
}
