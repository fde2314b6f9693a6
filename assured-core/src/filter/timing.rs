//! Response timing.

use std::time::Instant;

use super::{Filter, FilterContext};
use crate::expect::ResponseSpecification;
use crate::response::Response;
use crate::spec::RequestSpec;
use crate::Result;

/// Context key holding the elapsed time in milliseconds.
pub const RESPONSE_TIME_MILLIS: &str = "RESPONSE_TIME_MILLIS";

/// Measures how long the rest of the chain takes.
///
/// Register it first to include the time spent in other filters. The
/// elapsed time is stored under [`RESPONSE_TIME_MILLIS`] and, unless the
/// transport already measured it, as the response time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingFilter;

impl TimingFilter {
    /// Create a new timing filter.
    pub fn new() -> Self {
        Self
    }
}

impl Filter for TimingFilter {
    fn filter(
        &self,
        request: &mut RequestSpec,
        response: &ResponseSpecification,
        ctx: &mut FilterContext<'_>,
    ) -> Result<Response> {
        let start = Instant::now();
        let mut result = ctx.next(request, response)?;
        let elapsed = start.elapsed();

        ctx.set_value(RESPONSE_TIME_MILLIS, elapsed.as_millis() as u64);
        if result.time().is_none() {
            result.set_time(elapsed);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "timing"
    }
}
