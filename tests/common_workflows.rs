//! Integration tests for common Assured workflows.
//!
//! These go through the public facade with an in-process transport, so no
//! network is needed. Tests touching the static defaults hold `SERIAL`.

use std::sync::Arc;

use assured::config::{ConfigLayer, DecoderConfig, HeaderConfig, LogConfig, ParamConfig};
use assured::prelude::*;
use assured::{merge_specs, FilterChain, ParameterMultiMap, RootPathState};
use parking_lot::Mutex;
use serde_json::json;

static SERIAL: Mutex<()> = parking_lot::const_mutex(());

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Echoes the interesting parts of the request back as JSON.
fn echo_transport() -> Arc<dyn Transport> {
    Arc::new(transport_fn(|request| {
        let headers: Vec<String> = request
            .get_headers()
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        Response::with_status(200).with_json(&json!({
            "method": request.method_or_default().as_str(),
            "url": request.resolve_uri()?.as_str(),
            "headers": headers,
            "x": request.get_headers().get("X"),
        }))
    }))
}

fn executor(defaults: RequestSpec) -> RequestExecutor {
    RequestExecutor::new(defaults, echo_transport())
}

// =============================================================================
// Parameter Policies
// =============================================================================

#[test]
fn test_merge_policy_keeps_every_value_in_order() {
    let spec = RequestSpec::new()
        .query_param("tag", "v1")
        .query_param("tag", "v2")
        .header("Accept-Language", "en")
        .header("Accept-Language", "fr");

    assert_eq!(spec.get_query_params().get("tag"), vec!["v1", "v2"]);
    assert_eq!(spec.get_headers().get("accept-language"), vec!["en", "fr"]);
}

#[test]
fn test_replace_policy_keeps_last_value() {
    let mut spec = RequestSpec::new().config(
        ConfigLayer::new()
            .with_params(ParamConfig::new().replace_all_parameters())
            .with_headers(HeaderConfig::new().overwrite_headers_with_name(["X-Mode"])),
    );
    spec.add_query_param("tag", "v1");
    spec.add_query_param("tag", "v2");
    spec.add_form_param("name", "a");
    spec.add_form_param("name", "b");
    spec.add_header("X-Mode", "fast");
    spec.add_header("x-mode", "safe");

    assert_eq!(spec.get_query_params().get("tag"), vec!["v2"]);
    assert_eq!(spec.get_form_params().get("name"), vec!["b"]);
    assert_eq!(spec.get_headers().get("X-Mode"), vec!["safe"]);
}

#[test]
fn test_multimap_merge_strategy_per_name() {
    let mut base = ParameterMultiMap::exact();
    base.add("a", "1".to_string(), UpdateStrategy::Merge);
    base.add("b", "1".to_string(), UpdateStrategy::Merge);
    let mut overlay = ParameterMultiMap::exact();
    overlay.add("a", "2".to_string(), UpdateStrategy::Merge);
    overlay.add("b", "2".to_string(), UpdateStrategy::Merge);

    let merged = base.merge(&overlay, |name| {
        if name == "b" {
            UpdateStrategy::Replace
        } else {
            UpdateStrategy::Merge
        }
    });
    assert_eq!(merged.get("a"), vec!["1", "2"]);
    assert_eq!(merged.get("b"), vec!["2"]);
}

// =============================================================================
// Spec Merging
// =============================================================================

#[test]
fn test_merge_preserves_untouched_config_entries() {
    let base = RequestSpec::new()
        .config(ConfigLayer::new().with_decoder(DecoderConfig::new().no_content_decoders()));
    let overlay = RequestSpec::new()
        .config(ConfigLayer::new().with_log(LogConfig::new().blacklist_headers(["Authorization"])));

    let merged = merge_specs(&base, &overlay);
    assert!(!merged.get_config().decoder().decodes_gzip());
    assert!(merged.get_config().log().is_blacklisted("authorization"));
}

#[test]
fn test_precedence_merges_header_across_layers() {
    let executor = executor(RequestSpec::new().header("X", "1"));
    let attached = RequestSpec::new().header("X", "2");

    let response = RequestSender::new(executor)
        .spec(&attached)
        .header("X", "3")
        .get("/")
        .unwrap();
    response.then().body("x", equal_to(json!(["1", "2", "3"])));
}

#[test]
fn test_precedence_replaces_header_across_layers() {
    let defaults = RequestSpec::new()
        .config(ConfigLayer::new().with_headers(HeaderConfig::new().overwrite_headers_with_name(["X"])))
        .header("X", "1");
    let attached = RequestSpec::new().header("X", "2");

    let response = RequestSender::new(executor(defaults))
        .spec(&attached)
        .header("X", "3")
        .get("/")
        .unwrap();
    response.then().body("x", equal_to(json!(["3"])));
}

#[test]
fn test_default_replace_policy_applies_to_repeated_inline_values() {
    let defaults = RequestSpec::new().config(
        ConfigLayer::new()
            .with_params(ParamConfig::new().replace_all_parameters())
            .with_headers(HeaderConfig::new().overwrite_headers_with_name(["X"])),
    );

    RequestSender::new(executor(defaults))
        .query_param("page", "1")
        .query_param("page", "2")
        .header("X", "3")
        .header("X", "4")
        .get("/items")
        .unwrap()
        .then()
        .body("url", equal_to("http://localhost:8080/items?page=2"))
        .body("x", equal_to(json!(["4"])));
}

// =============================================================================
// Filter Chain
// =============================================================================

#[test]
fn test_short_circuit_skips_later_filters_and_transport() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let record = |label: &'static str| {
        let calls = Arc::clone(&calls);
        filter_fn(move |request, response, ctx| {
            calls.lock().push(label);
            ctx.next(request, response)
        })
    };
    let transport_calls = Arc::clone(&calls);
    let transport = transport_fn(move |_| {
        transport_calls.lock().push("transport");
        Ok(Response::with_status(200))
    });

    let synthetic_calls = Arc::clone(&calls);
    let chain = FilterChain::default()
        .with_filter(record("first"))
        .with_filter(filter_fn(move |_, _, _| {
            synthetic_calls.lock().push("second");
            Ok(Response::with_status(202).with_header("X-Synthetic", "yes"))
        }))
        .with_filter(record("third"));

    let mut request = RequestSpec::new();
    let response = chain
        .execute(&mut request, &ResponseSpecification::new(), &transport)
        .unwrap();

    assert_eq!(response.status_code(), 202);
    assert_eq!(response.header("x-synthetic"), Some("yes"));
    assert_eq!(*calls.lock(), vec!["first", "second"]);
}

#[test]
fn test_filter_mutation_reaches_transport_without_leaking() {
    let attached = RequestSpec::new().filter(filter_fn(|request, response, ctx| {
        request.add_header("X", "from-filter");
        ctx.next(request, response)
    }));
    let executor = executor(RequestSpec::new());

    for _ in 0..2 {
        RequestSender::new(executor.clone())
            .spec(&attached)
            .get("/")
            .unwrap()
            .then()
            .body("x", equal_to(json!(["from-filter"])));
    }
    assert!(attached.get_headers().is_empty());
}

#[test]
fn test_timing_filter_records_property() {
    let response = RequestSender::new(executor(RequestSpec::new()))
        .filter(TimingFilter::new())
        .get("/")
        .unwrap();
    assert!(response.property(assured::filter::RESPONSE_TIME_MILLIS).is_some());
    assert!(response.time().is_some());
}

#[test]
fn test_logging_filters_pass_the_response_through() {
    init_tracing();
    let defaults = RequestSpec::new()
        .config(ConfigLayer::new().with_log(LogConfig::new().blacklist_headers(["Authorization"])));

    let response = RequestSender::new(executor(defaults))
        .filter(RequestLoggingFilter::new())
        .filter(ResponseLoggingFilter::with_detail(LogDetail::Status).errors_only())
        .header("Authorization", "Bearer secret-token")
        .get("/logged")
        .unwrap();

    response
        .then()
        .status_code(200)
        .body("headers", contains("Authorization=Bearer secret-token"));
}

// =============================================================================
// Root Paths
// =============================================================================

#[test]
fn test_root_path_round_trip() {
    let mut root = RootPathState::new();
    root.set_root("store.%s", &path_args!["book"]).unwrap();
    root.append_root("%s.%s", &path_args!["author", "size()"]).unwrap();
    assert_eq!(root.resolve_body_path("", &[]).unwrap(), "store.book.author.size()");
}

#[test]
fn test_detach_root() {
    let mut root = RootPathState::with_path("store.book");
    root.detach_root("book").unwrap();
    assert_eq!(root.path(), "store");

    let mut root = RootPathState::with_path("store.book");
    let message = root.detach_root("another").unwrap_err().to_string();
    assert!(message.contains("another"));
    assert!(message.contains("store.book"));
}

#[test]
fn test_expectations_scope_body_paths_by_root() {
    let transport = transport_fn(|_| {
        Response::with_status(200).with_json(&json!({
            "store": {"book": [{"author": "Herbert"}, {"author": "Le Guin"}]}
        }))
    });
    let executor = RequestExecutor::new(RequestSpec::new(), Arc::new(transport));

    let expectations = ResponseSpecification::new()
        .status_code(200)
        .root("store.book")
        .body("size()", has_size(2))
        .body("[1].author", equal_to("Le Guin"));
    RequestSender::new(executor.clone())
        .expect(expectations)
        .get("/books")
        .unwrap();

    let failing = ResponseSpecification::new()
        .status_code(201)
        .body("store.book[0].author", equal_to("Asimov"));
    let err = RequestSender::new(executor)
        .expect(failing)
        .get("/books")
        .unwrap_err();
    assert_eq!(err.failures().len(), 2);
}

// =============================================================================
// Static Defaults
// =============================================================================

#[test]
fn test_static_defaults_until_reset() {
    let _guard = SERIAL.lock();
    assured::set_transport(echo_transport());
    assured::update_defaults(|spec| spec.base_uri("http://defaults.test").header("X", "d"));

    given()
        .when()
        .get("/ping")
        .unwrap()
        .then()
        .body("url", equal_to("http://defaults.test/ping"))
        .body("x", equal_to(json!(["d"])));

    assured::reset();
    given()
        .get("/ping")
        .unwrap()
        .then()
        .body("url", equal_to("http://localhost:8080/ping"))
        .body("x", has_size(0));
    assured::clear_transport();
}

#[test]
fn test_failed_request_leaves_defaults_untouched() {
    let _guard = SERIAL.lock();
    assured::set_transport(echo_transport());
    assured::set_default_spec(RequestSpec::new().header("X", "kept"));

    let err = given()
        .get_with("/users/{id}", ["1", "2"])
        .unwrap_err();
    assert!(err.is_configuration_error());
    assert_eq!(assured::default_spec().get_headers().get("X"), vec!["kept"]);

    assured::reset();
    assured::clear_transport();
}
