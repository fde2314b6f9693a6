//! Combining request specifications.

use crate::config::{ConfigLayer, UpdateStrategy};
use crate::spec::RequestSpec;

fn pick<T: Clone>(base: &Option<T>, overlay: &Option<T>) -> Option<T> {
    overlay.clone().or_else(|| base.clone())
}

/// Merge `overlay` on top of `base` into a new specification.
///
/// Scalars are taken from the overlay when set. Parameter maps merge with
/// the policies of the merged config, so a REPLACE configured on either side
/// applies to the combination. Filters concatenate with the base's first.
/// Neither input is modified.
pub fn merge_specs(base: &RequestSpec, overlay: &RequestSpec) -> RequestSpec {
    let config = ConfigLayer::merge(&base.config, &overlay.config);
    let params = config.params().clone();
    let headers = config.headers().clone();

    let mut filters = base.filters.clone();
    filters.extend(overlay.filters.iter().cloned());

    RequestSpec {
        method: pick(&base.method, &overlay.method),
        base_uri: pick(&base.base_uri, &overlay.base_uri),
        port: pick(&base.port, &overlay.port),
        base_path: pick(&base.base_path, &overlay.base_path),
        path: pick(&base.path, &overlay.path),
        query_params: base
            .query_params
            .merge(&overlay.query_params, |_| params.query_strategy()),
        form_params: base
            .form_params
            .merge(&overlay.form_params, |_| params.form_strategy()),
        request_params: base
            .request_params
            .merge(&overlay.request_params, |_| params.request_strategy()),
        path_params: base
            .path_params
            .merge(&overlay.path_params, |_| UpdateStrategy::Replace),
        unnamed_path_params: if overlay.unnamed_path_params.is_empty() {
            base.unnamed_path_params.clone()
        } else {
            overlay.unnamed_path_params.clone()
        },
        headers: base
            .headers
            .merge(&overlay.headers, |name| headers.strategy_for(name)),
        cookies: base
            .cookies
            .merge(&overlay.cookies, |_| UpdateStrategy::Merge),
        multiparts: base
            .multiparts
            .merge(&overlay.multiparts, |_| UpdateStrategy::Merge),
        body: pick(&base.body, &overlay.body),
        auth: pick(&base.auth, &overlay.auth),
        config,
        filters,
        root_path: if overlay.root_path.is_empty() {
            base.root_path.clone()
        } else {
            overlay.root_path.clone()
        },
    }
}
