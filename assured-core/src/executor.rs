//! Request orchestration.

use std::sync::Arc;

use crate::expect::ResponseSpecification;
use crate::filter::logging::{describe_request, describe_response};
use crate::filter::{FilterChain, LogDetail};
use crate::merge::merge_specs;
use crate::response::Response;
use crate::spec::RequestSpec;
use crate::transport::Transport;
use crate::Result;

/// Resolves the layered specification and drives the filter chain.
///
/// The static defaults are handed in at construction, so resolution never
/// reads global state.
#[derive(Clone)]
pub struct RequestExecutor {
    defaults: RequestSpec,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl RequestExecutor {
    /// Create an executor.
    pub fn new(defaults: RequestSpec, transport: Arc<dyn Transport>) -> Self {
        Self {
            defaults,
            transport,
        }
    }

    /// The static default specification.
    pub fn defaults(&self) -> &RequestSpec {
        &self.defaults
    }

    /// Fold the layers together: defaults, then the attached spec, then the
    /// inline calls.
    pub fn resolve(&self, attached: Option<&RequestSpec>, inline: &RequestSpec) -> RequestSpec {
        match attached {
            Some(attached) => merge_specs(&merge_specs(&self.defaults, attached), inline),
            None => merge_specs(&self.defaults, inline),
        }
    }

    /// Resolve and send a request, then check the expectations.
    ///
    /// Path parameters and body paths are validated before anything is
    /// sent. The filter list is fixed at this point; the request the chain
    /// mutates is a fresh copy, so neither input is affected.
    pub fn execute(
        &self,
        attached: Option<&RequestSpec>,
        inline: &RequestSpec,
        expectations: &ResponseSpecification,
    ) -> Result<Response> {
        let mut request = self.resolve(attached, inline);
        request.validate_path_params()?;

        let expectations = expectations.seeded_with(request.get_root_path());
        expectations.resolved_body_paths()?;

        let chain = FilterChain::new(request.get_filters().to_vec());
        tracing::debug!(
            method = %request.method_or_default(),
            path = request.get_path().unwrap_or_default(),
            filters = chain.len(),
            "Executing request"
        );

        let response = chain.execute(&mut request, &expectations, self.transport.as_ref())?;

        if let Err(e) = expectations.validate(&response) {
            let log = request.get_config().log();
            if e.is_assertion() && log.logs_if_validation_fails() {
                tracing::warn!(
                    request = %describe_request(&request, LogDetail::All),
                    response = %describe_response(&response, LogDetail::All, log),
                    "Response validation failed"
                );
            }
            return Err(e);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLayer, HeaderConfig, LogConfig};
    use crate::expect::json::equal_to;
    use crate::filter::filter_fn;
    use crate::transport::transport_fn;
    use crate::AssuredError;
    use parking_lot::Mutex;

    fn echo_header(name: &'static str) -> Arc<dyn Transport> {
        Arc::new(transport_fn(move |request| {
            let values: Vec<String> = request
                .get_headers()
                .get(name)
                .into_iter()
                .cloned()
                .collect();
            Ok(Response::with_status(200).with_body(values.join(",")))
        }))
    }

    #[test]
    fn test_precedence_with_merging_header() {
        let executor = RequestExecutor::new(RequestSpec::new().header("X", "1"), echo_header("X"));
        let attached = RequestSpec::new().header("X", "2");
        let inline = RequestSpec::new().header("X", "3");

        let response = executor
            .execute(Some(&attached), &inline, &ResponseSpecification::new())
            .unwrap();
        assert_eq!(response.text().unwrap(), "1,2,3");
    }

    #[test]
    fn test_precedence_with_replacing_header() {
        let replace_x = ConfigLayer::new()
            .with_headers(HeaderConfig::new().overwrite_headers_with_name(["X"]));
        let executor = RequestExecutor::new(
            RequestSpec::new().config(replace_x).header("X", "1"),
            echo_header("X"),
        );
        let attached = RequestSpec::new().header("X", "2");
        let inline = RequestSpec::new().header("X", "3");

        let resolved = executor.resolve(Some(&attached), &inline);
        assert_eq!(resolved.get_headers().get("X"), vec!["3"]);
    }

    #[test]
    fn test_filter_mutation_does_not_leak_into_attached_spec() {
        let attached = RequestSpec::new()
            .header("X", "original")
            .filter(filter_fn(|request, response, ctx| {
                request.set_header("X", "mutated");
                request.add_query_param("extra", "1");
                ctx.next(request, response)
            }));
        let executor = RequestExecutor::new(RequestSpec::new(), echo_header("X"));

        for _ in 0..2 {
            let response = executor
                .execute(Some(&attached), &RequestSpec::new(), &ResponseSpecification::new())
                .unwrap();
            assert_eq!(response.text().unwrap(), "mutated");
        }
        assert_eq!(attached.get_headers().get("X"), vec!["original"]);
        assert!(attached.get_query_params().is_empty());
    }

    #[test]
    fn test_invalid_path_params_fail_before_dispatch() {
        let sent = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&sent);
        let transport: Arc<dyn Transport> = Arc::new(transport_fn(move |_| {
            *counter.lock() += 1;
            Ok(Response::with_status(200))
        }));
        let executor = RequestExecutor::new(RequestSpec::new(), transport);

        let inline = RequestSpec::new()
            .path("/users/{id}")
            .unnamed_path_params(["1", "2"]);
        let err = executor
            .execute(None, &inline, &ResponseSpecification::new())
            .unwrap_err();
        assert!(err.is_configuration_error());
        assert_eq!(*sent.lock(), 0);
    }

    #[test]
    fn test_expectation_failures_are_returned() {
        let transport: Arc<dyn Transport> =
            Arc::new(transport_fn(|_| Ok(Response::with_status(500))));
        let executor = RequestExecutor::new(
            RequestSpec::new().config(
                ConfigLayer::new().with_log(
                    LogConfig::new().enable_logging_of_request_and_response_if_validation_fails(),
                ),
            ),
            transport,
        );

        let err = executor
            .execute(
                None,
                &RequestSpec::new().path("/"),
                &ResponseSpecification::new().status_code(200),
            )
            .unwrap_err();
        assert!(err.is_assertion());
    }

    #[test]
    fn test_request_root_path_seeds_expectations() {
        let transport: Arc<dyn Transport> = Arc::new(transport_fn(|_| {
            Response::with_status(200).with_json(&serde_json::json!({"store": {"name": "corner"}}))
        }));
        let executor = RequestExecutor::new(RequestSpec::new().root_path("store"), transport);

        let response = executor.execute(
            None,
            &RequestSpec::new(),
            &ResponseSpecification::new().body("name", equal_to("corner")),
        );
        assert!(response.is_ok());
    }

    #[test]
    fn test_transport_errors_propagate() {
        let transport: Arc<dyn Transport> = Arc::new(transport_fn(|_| {
            Err(AssuredError::transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "refused",
            )))
        }));
        let executor = RequestExecutor::new(RequestSpec::new(), transport);
        let err = executor
            .execute(None, &RequestSpec::new(), &ResponseSpecification::new())
            .unwrap_err();
        assert!(matches!(err, AssuredError::Transport(_)));
    }
}
