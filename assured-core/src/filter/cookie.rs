//! Cookie capture and replay.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use super::{Filter, FilterContext};
use crate::expect::ResponseSpecification;
use crate::response::Response;
use crate::spec::RequestSpec;
use crate::Result;

/// Keeps every cookie the server sets and sends them with later requests.
///
/// Cookies already present on a request are left alone.
#[derive(Debug, Default)]
pub struct CookieFilter {
    cookies: Mutex<BTreeMap<String, String>>,
}

impl CookieFilter {
    /// Create an empty cookie filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cookies captured so far.
    pub fn cookies(&self) -> BTreeMap<String, String> {
        self.cookies.lock().clone()
    }
}

impl Filter for CookieFilter {
    fn filter(
        &self,
        request: &mut RequestSpec,
        response: &ResponseSpecification,
        ctx: &mut FilterContext<'_>,
    ) -> Result<Response> {
        for (name, value) in self.cookies.lock().iter() {
            if !request.get_cookies().contains(name) {
                request.add_cookie(name.clone(), value.clone());
            }
        }

        let result = ctx.next(request, response)?;
        self.cookies.lock().extend(result.cookies());
        Ok(result)
    }

    fn name(&self) -> &str {
        "cookie"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterChain;
    use crate::transport::transport_fn;
    use std::sync::Arc;

    #[test]
    fn test_cookies_are_replayed_unless_already_set() {
        let filter = Arc::new(CookieFilter::new());
        let chain = FilterChain::default().with_shared(filter.clone());
        let transport = transport_fn(|request| {
            let cookies: Vec<String> = request
                .get_cookies()
                .iter()
                .map(|(n, v)| format!("{}={}", n, v))
                .collect();
            Ok(Response::with_status(200)
                .with_header("Set-Cookie", "a=1")
                .with_header("Set-Cookie", "b=2; HttpOnly")
                .with_body(cookies.join(";")))
        });

        chain
            .execute(&mut RequestSpec::new(), &ResponseSpecification::new(), &transport)
            .unwrap();
        assert_eq!(filter.cookies().len(), 2);

        let mut request = RequestSpec::new().cookie("a", "mine");
        let response = chain
            .execute(&mut request, &ResponseSpecification::new(), &transport)
            .unwrap();
        assert_eq!(response.text().unwrap(), "a=mine;b=2");
    }
}
