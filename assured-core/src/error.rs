//! Error types for specification resolution, filters and expectations.

use thiserror::Error;

/// Result type for Assured operations.
pub type Result<T> = std::result::Result<T, AssuredError>;

/// Errors raised while building, resolving or executing a request.
#[derive(Debug, Error)]
pub enum AssuredError {
    /// Positional path parameters don't match the placeholders in the path.
    #[error(
        "Invalid number of path parameters. Expected {expected}, was {actual}. Path: '{path}'"
    )]
    PathParamCount {
        /// Number of placeholders in the path.
        expected: usize,
        /// Number of positional parameters supplied.
        actual: usize,
        /// The unresolved path.
        path: String,
    },

    /// Placeholders in the path with no named parameter supplied.
    #[error("You specified too few path parameters to the request. Undefined path parameters are: {}", .0.join(", "))]
    UndefinedPathParams(Vec<String>),

    /// Named parameters supplied that don't appear in the path.
    #[error("Path parameters were not correctly defined. Redundant path parameters are: {}", .0.join(", "))]
    RedundantPathParams(Vec<String>),

    /// Both named and positional path parameters were supplied.
    #[error("Cannot mix named path parameters ({}) with positional path parameters ({positional})", .named.join(", "))]
    MixedPathParams {
        /// Names of the named parameters.
        named: Vec<String>,
        /// Number of positional parameters.
        positional: usize,
    },

    /// Root path operation attempted while the root path is empty.
    #[error("Cannot {operation} path when root path is empty")]
    EmptyRootPath {
        /// The attempted operation ("append" or "detach").
        operation: &'static str,
    },

    /// Root path doesn't end with the segment being detached.
    #[error("Cannot detach path '{suffix}' since root path '{root}' doesn't end with '{suffix}'.")]
    DetachMismatch {
        /// The suffix the caller tried to detach.
        suffix: String,
        /// The current root path.
        root: String,
    },

    /// Arguments were supplied but there is no path to apply them to.
    #[error("Cannot specify arguments when root path is empty")]
    ArgumentsWithoutPath,

    /// Fewer arguments than format specifiers.
    #[error("Path '{path}' has {missing} unresolved placeholder(s) after applying arguments")]
    MissingPathArguments {
        /// The partially resolved path.
        path: String,
        /// Number of placeholders left without a value.
        missing: usize,
    },

    /// More arguments than format specifiers.
    #[error("Path '{path}' has no placeholder for {unused} argument(s)")]
    UnusedPathArguments {
        /// The resolved path.
        path: String,
        /// Number of arguments that had nowhere to go.
        unused: usize,
    },

    /// An argument that can't be formatted with its specifier (e.g. text for `%d`).
    #[error("Argument '{argument}' cannot be formatted with '%{specifier}'")]
    InvalidPathArgument {
        /// The argument as text.
        argument: String,
        /// The format specifier character.
        specifier: char,
    },

    /// The request URL couldn't be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name or value is not valid HTTP.
    #[error("Invalid header '{name}': {message}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Reason.
        message: String,
    },

    /// Body serialization failed.
    #[error("Failed to serialize body: {0}")]
    Serialization(String),

    /// No transport has been installed to perform the request.
    #[error("No transport configured; install one with `set_transport`")]
    NoTransport,

    /// The terminal transport step failed.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A filter failed.
    #[error("Filter error: {0}")]
    Filter(String),

    /// One or more response expectations were not met.
    #[error("{} expectation(s) failed:\n{}", .0.len(), .0.join("\n"))]
    AssertionFailed(Vec<String>),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssuredError {
    /// Wrap a transport-level error.
    pub fn transport<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(error))
    }

    /// Check if this is a mistake in the test code rather than a runtime failure.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::PathParamCount { .. }
                | Self::UndefinedPathParams(_)
                | Self::RedundantPathParams(_)
                | Self::MixedPathParams { .. }
                | Self::EmptyRootPath { .. }
                | Self::DetachMismatch { .. }
                | Self::ArgumentsWithoutPath
                | Self::MissingPathArguments { .. }
                | Self::UnusedPathArguments { .. }
                | Self::InvalidPathArgument { .. }
                | Self::InvalidUrl(_)
                | Self::InvalidHeader { .. }
                | Self::NoTransport
        )
    }

    /// Check if this is an expectation failure.
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed(_))
    }

    /// Get the failure messages if this is an expectation failure.
    pub fn failures(&self) -> &[String] {
        match self {
            Self::AssertionFailed(failures) => failures,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detach_mismatch_names_suffix_and_root() {
        let err = AssuredError::DetachMismatch {
            suffix: "another".to_string(),
            root: "store.book".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot detach path 'another' since root path 'store.book' doesn't end with 'another'."
        );
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_assertion_failures_are_listed() {
        let err = AssuredError::AssertionFailed(vec!["a".to_string(), "b".to_string()]);
        assert!(err.is_assertion());
        assert!(!err.is_configuration_error());
        assert_eq!(err.failures().len(), 2);
        assert_eq!(err.to_string(), "2 expectation(s) failed:\na\nb");
    }

    #[test]
    fn test_undefined_path_params_message() {
        let err = AssuredError::UndefinedPathParams(vec!["id".to_string(), "name".to_string()]);
        assert!(err.to_string().ends_with("id, name"));
    }
}
