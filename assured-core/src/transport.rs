//! The terminal step of the filter chain.

use crate::expect::ResponseSpecification;
use crate::response::Response;
use crate::spec::RequestSpec;
use crate::Result;

/// Performs the actual network call for a fully merged request.
///
/// Errors are returned unchanged to whoever dispatched the request.
pub trait Transport: Send + Sync {
    /// Send the request and return the response.
    fn execute(&self, request: &RequestSpec, expectations: &ResponseSpecification)
        -> Result<Response>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn execute(
        &self,
        request: &RequestSpec,
        expectations: &ResponseSpecification,
    ) -> Result<Response> {
        (**self).execute(request, expectations)
    }
}

/// Create a transport from a closure.
pub fn transport_fn<F>(f: F) -> FnTransport<F>
where
    F: Fn(&RequestSpec) -> Result<Response> + Send + Sync,
{
    FnTransport(f)
}

/// Transport backed by a closure. Mostly useful in tests.
pub struct FnTransport<F>(F);

impl<F> Transport for FnTransport<F>
where
    F: Fn(&RequestSpec) -> Result<Response> + Send + Sync,
{
    fn execute(&self, request: &RequestSpec, _: &ResponseSpecification) -> Result<Response> {
        (self.0)(request)
    }
}
