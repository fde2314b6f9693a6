//! Filter chain.
//!
//! Filters run in registration order. Each one receives the request being
//! built, the response expectations and a [`FilterContext`] whose
//! [`next`](FilterContext::next) runs the rest of the chain. A filter that
//! returns without calling `next` replaces the network call entirely:
//!
//! ```
//! use assured_core::filter::{filter_fn, FilterChain};
//! use assured_core::transport::transport_fn;
//! use assured_core::{RequestSpec, ResponseSpecification, Response};
//!
//! let chain = FilterChain::default()
//!     .with_filter(filter_fn(|request, response, ctx| {
//!         request.add_header("X-Trace", "1");
//!         ctx.next(request, response)
//!     }))
//!     .with_filter(filter_fn(|_, _, _| Ok(Response::with_status(418))));
//!
//! let transport = transport_fn(|_| Ok(Response::with_status(200)));
//! let mut request = RequestSpec::new();
//! let response = chain
//!     .execute(&mut request, &ResponseSpecification::new(), &transport)
//!     .unwrap();
//! assert_eq!(response.status_code(), 418);
//! ```

mod cookie;
pub(crate) mod logging;
mod session;
mod timing;

pub use cookie::CookieFilter;
pub use logging::{LogDetail, RequestLoggingFilter, ResponseLoggingFilter};
pub use session::SessionFilter;
pub use timing::{TimingFilter, RESPONSE_TIME_MILLIS};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::expect::ResponseSpecification;
use crate::response::Response;
use crate::spec::RequestSpec;
use crate::transport::Transport;
use crate::Result;

/// An interceptor with explicit control over the rest of the chain.
pub trait Filter: Send + Sync {
    /// Handle the request. Call `ctx.next` to continue, or return a response
    /// directly to short-circuit.
    fn filter(
        &self,
        request: &mut RequestSpec,
        response: &ResponseSpecification,
        ctx: &mut FilterContext<'_>,
    ) -> Result<Response>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl fmt::Debug for dyn Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Filter").field(&self.name()).finish()
    }
}

/// Create a filter from a closure.
pub fn filter_fn<F>(f: F) -> FnFilter<F>
where
    F: Fn(&mut RequestSpec, &ResponseSpecification, &mut FilterContext<'_>) -> Result<Response>
        + Send
        + Sync,
{
    FnFilter(f)
}

/// Filter backed by a closure.
pub struct FnFilter<F>(F);

impl<F> Filter for FnFilter<F>
where
    F: Fn(&mut RequestSpec, &ResponseSpecification, &mut FilterContext<'_>) -> Result<Response>
        + Send
        + Sync,
{
    fn filter(
        &self,
        request: &mut RequestSpec,
        response: &ResponseSpecification,
        ctx: &mut FilterContext<'_>,
    ) -> Result<Response> {
        (self.0)(request, response, ctx)
    }

    fn name(&self) -> &str {
        "filter_fn"
    }
}

/// Continuation handed to each filter.
///
/// Only valid for the duration of the filter call that received it.
pub struct FilterContext<'a> {
    filters: &'a [Arc<dyn Filter>],
    position: usize,
    transport: &'a dyn Transport,
    values: &'a mut HashMap<String, Value>,
}

impl<'a> FilterContext<'a> {
    /// Run the remaining filters and then the transport.
    pub fn next(
        &mut self,
        request: &mut RequestSpec,
        response: &ResponseSpecification,
    ) -> Result<Response> {
        let filters = self.filters;
        match filters.get(self.position) {
            Some(filter) => {
                tracing::trace!(
                    position = self.position,
                    filter = filter.name(),
                    "Invoking filter"
                );
                let mut ctx = FilterContext {
                    filters,
                    position: self.position + 1,
                    transport: self.transport,
                    values: &mut *self.values,
                };
                filter.filter(request, response, &mut ctx)
            }
            None => {
                tracing::debug!(
                    method = %request.method_or_default(),
                    path = request.get_path().unwrap_or_default(),
                    "Dispatching request to transport"
                );
                self.transport.execute(request, response)
            }
        }
    }

    /// Whether any filters remain before the transport.
    pub fn has_next_filter(&self) -> bool {
        self.position < self.filters.len()
    }

    /// Store a value shared with later filters. It also ends up as a property
    /// on the final response.
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Read a value stored by an earlier filter.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The transport, for filters that need to make auxiliary calls.
    pub fn transport(&self) -> &dyn Transport {
        self.transport
    }
}

/// An ordered list of filters ending in a transport call.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn Filter>>,
}

impl FilterChain {
    /// Create a chain from filters in execution order.
    pub fn new(filters: Vec<Arc<dyn Filter>>) -> Self {
        Self { filters }
    }

    /// Append a filter.
    pub fn with_filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Append a shared filter.
    pub fn with_shared(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if the chain has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run the chain. Errors from any filter or the transport propagate as is.
    pub fn execute(
        &self,
        request: &mut RequestSpec,
        response: &ResponseSpecification,
        transport: &dyn Transport,
    ) -> Result<Response> {
        tracing::debug!(filters = self.filters.len(), "Executing filter chain");

        let mut values = HashMap::new();
        let mut result = {
            let mut ctx = FilterContext {
                filters: &self.filters,
                position: 0,
                transport,
                values: &mut values,
            };
            ctx.next(request, response)?
        };
        for (name, value) in values {
            result.set_property(name, value);
        }
        Ok(result)
    }
}
