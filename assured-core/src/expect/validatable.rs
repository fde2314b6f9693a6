//! Eager assertions on a received response.

use super::{
    check_body, check_content_type, check_header, check_status, PathMatcher,
    ResponseSpecification,
};
use crate::response::Response;
use crate::root_path::{PathArg, RootPathState};

/// A response under test. Each assertion panics with a descriptive message
/// when it fails, like the standard `assert!` family.
#[derive(Debug, Clone)]
pub struct ValidatableResponse {
    response: Response,
    root_path: RootPathState,
}

impl ValidatableResponse {
    /// Wrap a response.
    pub fn new(response: Response) -> Self {
        Self {
            response,
            root_path: RootPathState::new(),
        }
    }

    #[track_caller]
    fn fail_if(self, failure: Option<String>) -> Self {
        if let Some(message) = failure {
            panic!("{}", message);
        }
        self
    }

    /// Assert the status code.
    #[track_caller]
    pub fn status_code(self, expected: u16) -> Self {
        let failure = check_status(&self.response, expected);
        self.fail_if(failure)
    }

    /// Assert a header value.
    #[track_caller]
    pub fn header(self, name: &str, expected: &str) -> Self {
        let failure = check_header(&self.response, name, expected);
        self.fail_if(failure)
    }

    /// Assert the content type.
    #[track_caller]
    pub fn content_type(self, expected: &str) -> Self {
        let failure = check_content_type(&self.response, expected);
        self.fail_if(failure)
    }

    /// Assert that a body path matches.
    #[track_caller]
    pub fn body<M: PathMatcher>(self, path: &str, matcher: M) -> Self {
        self.body_with_args(path, &[], matcher)
    }

    /// Assert that a body path with `%s`/`%d` arguments matches.
    #[track_caller]
    pub fn body_with_args<M: PathMatcher>(
        mut self,
        path: &str,
        args: &[PathArg],
        matcher: M,
    ) -> Self {
        let resolved = match self.root_path.resolve_body_path(path, args) {
            Ok(resolved) => resolved,
            Err(e) => panic!("{}", e),
        };
        let failure = check_body(&self.response, &resolved, &matcher);
        self.fail_if(failure)
    }

    /// Assert every expectation of a specification, reporting all failures.
    #[track_caller]
    pub fn spec(self, spec: &ResponseSpecification) -> Self {
        if let Err(e) = spec.validate(&self.response) {
            panic!("{}", e);
        }
        self
    }

    /// Set the root path for later body assertions.
    pub fn root(mut self, path: &str) -> Self {
        self.root_path = RootPathState::with_path(path);
        self
    }

    /// Set the root path from a template.
    #[track_caller]
    pub fn root_with_args(mut self, template: &str, args: &[PathArg]) -> Self {
        if let Err(e) = self.root_path.set_root(template, args) {
            panic!("{}", e);
        }
        self
    }

    /// Append to the root path.
    #[track_caller]
    pub fn append_root(mut self, template: &str) -> Self {
        if let Err(e) = self.root_path.append_root(template, &[]) {
            panic!("{}", e);
        }
        self
    }

    /// Remove a trailing segment from the root path.
    #[track_caller]
    pub fn detach_root(mut self, suffix: &str) -> Self {
        if let Err(e) = self.root_path.detach_root(suffix) {
            panic!("{}", e);
        }
        self
    }

    /// Clear the root path.
    pub fn no_root(mut self) -> Self {
        self.root_path.reset();
        self
    }

    /// The response.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Finish asserting and take the response.
    pub fn extract(self) -> Response {
        self.response
    }
}
