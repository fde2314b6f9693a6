//! Session id capture and replay.

use parking_lot::Mutex;

use super::{Filter, FilterContext};
use crate::expect::ResponseSpecification;
use crate::response::Response;
use crate::spec::RequestSpec;
use crate::Result;

/// Remembers the session id returned by the server and sends it with every
/// later request that goes through the same filter instance.
///
/// The cookie name comes from the request's session config.
#[derive(Debug, Default)]
pub struct SessionFilter {
    session_id: Mutex<Option<String>>,
}

impl SessionFilter {
    /// Create a filter with no stored session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The captured session id.
    pub fn session_id(&self) -> Option<String> {
        self.session_id.lock().clone()
    }

    /// Check if a session id has been captured.
    pub fn has_stored_session_id(&self) -> bool {
        self.session_id.lock().is_some()
    }
}

impl Filter for SessionFilter {
    fn filter(
        &self,
        request: &mut RequestSpec,
        response: &ResponseSpecification,
        ctx: &mut FilterContext<'_>,
    ) -> Result<Response> {
        let name = request.get_config().session().name().to_string();

        if !request.get_cookies().contains(&name)
            && let Some(id) = self.session_id()
        {
            tracing::trace!(cookie = %name, "Replaying session id");
            request.set_session_id(id);
        }

        let result = ctx.next(request, response)?;

        if let Some(id) = result.cookie(&name) {
            *self.session_id.lock() = Some(id);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "session"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLayer, SessionConfig};
    use crate::filter::FilterChain;
    use crate::transport::transport_fn;
    use std::sync::Arc;

    #[test]
    fn test_session_id_is_captured_and_replayed() {
        let session = Arc::new(SessionFilter::new());
        let chain = FilterChain::default().with_shared(session.clone());
        let transport = transport_fn(|request| {
            match request.get_cookies().first("JSESSIONID") {
                Some(id) => Ok(Response::with_status(200).with_body(id.clone())),
                None => Ok(Response::with_status(200)
                    .with_header("Set-Cookie", "JSESSIONID=s-1; Path=/")),
            }
        });

        let first = chain
            .execute(&mut RequestSpec::new(), &ResponseSpecification::new(), &transport)
            .unwrap();
        assert!(first.bytes().is_empty());
        assert_eq!(session.session_id().as_deref(), Some("s-1"));

        let second = chain
            .execute(&mut RequestSpec::new(), &ResponseSpecification::new(), &transport)
            .unwrap();
        assert_eq!(second.text().unwrap(), "s-1");
    }

    #[test]
    fn test_configured_session_cookie_name() {
        let session = Arc::new(SessionFilter::new());
        let chain = FilterChain::default().with_shared(session.clone());
        let transport =
            transport_fn(|_| Ok(Response::with_status(200).with_header("Set-Cookie", "SID=x")));

        let mut request = RequestSpec::new().config(
            ConfigLayer::new().with_session(SessionConfig::new().session_id_name("SID")),
        );
        chain
            .execute(&mut request, &ResponseSpecification::new(), &transport)
            .unwrap();
        assert_eq!(session.session_id().as_deref(), Some("x"));
    }

    #[test]
    fn test_explicit_session_cookie_wins() {
        let session = SessionFilter::new();
        *session.session_id.lock() = Some("stored".to_string());
        let chain = FilterChain::default().with_filter(session);
        let transport = transport_fn(|request| {
            let id = request.get_cookies().get("JSESSIONID");
            assert_eq!(id, vec!["explicit"]);
            Ok(Response::with_status(200))
        });

        let mut request = RequestSpec::new().session_id("explicit");
        chain
            .execute(&mut request, &ResponseSpecification::new(), &transport)
            .unwrap();
    }
}
