//! Path parameter substitution and URL resolution.

use std::collections::BTreeSet;

use http::Method;
use url::Url;

use super::RequestSpec;
use crate::config::UpdateStrategy;
use crate::params::ParameterMultiMap;
use crate::{AssuredError, Result};

/// Base URI used when none is configured.
pub const DEFAULT_BASE_URI: &str = "http://localhost:8080";

/// `{name}` tokens in a path, in order of appearance, duplicates included.
pub(crate) fn placeholders(path: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                found.push(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    found
}

fn is_absolute(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl RequestSpec {
    /// Check that path parameters line up with the placeholders in the path.
    ///
    /// Partial specs are never checked; this only runs on the merged spec
    /// right before dispatch.
    pub fn validate_path_params(&self) -> Result<()> {
        let path = self.path.as_deref().unwrap_or_default();
        let tokens = placeholders(path);
        let named: Vec<String> = self
            .path_params
            .names()
            .into_iter()
            .map(str::to_string)
            .collect();

        if !named.is_empty() && !self.unnamed_path_params.is_empty() {
            return Err(AssuredError::MixedPathParams {
                named,
                positional: self.unnamed_path_params.len(),
            });
        }

        if !self.unnamed_path_params.is_empty() {
            if tokens.len() != self.unnamed_path_params.len() {
                return Err(AssuredError::PathParamCount {
                    expected: tokens.len(),
                    actual: self.unnamed_path_params.len(),
                    path: path.to_string(),
                });
            }
            return Ok(());
        }

        let distinct: BTreeSet<&str> = tokens.iter().copied().collect();
        let undefined: Vec<String> = tokens
            .iter()
            .filter(|token| !self.path_params.contains(token))
            .map(|token| token.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if !undefined.is_empty() {
            return Err(AssuredError::UndefinedPathParams(undefined));
        }

        let redundant: Vec<String> = named
            .into_iter()
            .filter(|name| !distinct.contains(name.as_str()))
            .collect();
        if !redundant.is_empty() {
            return Err(AssuredError::RedundantPathParams(redundant));
        }
        Ok(())
    }

    /// The path with every placeholder substituted and percent-encoded.
    pub fn resolved_path(&self) -> Result<String> {
        self.validate_path_params()?;
        let path = self.path.as_deref().unwrap_or_default();
        let mut positional = self.unnamed_path_params.iter();
        let mut resolved = String::with_capacity(path.len());
        let mut rest = path;

        while let Some(start) = rest.find('{') {
            let Some(end) = rest[start..].find('}') else {
                break;
            };
            let name = &rest[start + 1..start + end];
            let value = match positional.next() {
                Some(value) => Some(value),
                None => self.path_params.first(name),
            };
            resolved.push_str(&rest[..start]);
            match value {
                Some(value) => resolved.push_str(&urlencoding::encode(value)),
                None => resolved.push_str(&rest[start..=start + end]),
            }
            rest = &rest[start + end + 1..];
        }
        resolved.push_str(rest);
        Ok(resolved)
    }

    /// Whether request parameters travel in the query string.
    ///
    /// They do for methods without a body, and whenever the body is already
    /// taken by an explicit payload or multipart parts.
    pub fn request_params_in_query(&self) -> bool {
        let bodyless = matches!(
            self.method.as_ref(),
            None | Some(&Method::GET) | Some(&Method::HEAD) | Some(&Method::DELETE)
                | Some(&Method::OPTIONS)
        );
        bodyless || self.body.is_some() || !self.multiparts.is_empty()
    }

    fn with_request_params(&self, target: &ParameterMultiMap, strategy: UpdateStrategy) -> ParameterMultiMap {
        let mut combined = target.clone();
        for (name, value) in self.request_params.iter() {
            combined.add(name, value.clone(), strategy);
        }
        combined
    }

    /// Query parameters including request parameters routed to the query.
    pub fn effective_query_params(&self) -> ParameterMultiMap {
        if self.request_params_in_query() {
            self.with_request_params(&self.query_params, self.config.params().request_strategy())
        } else {
            self.query_params.clone()
        }
    }

    /// Form parameters including request parameters routed to the body.
    pub fn effective_form_params(&self) -> ParameterMultiMap {
        if self.request_params_in_query() {
            self.form_params.clone()
        } else {
            self.with_request_params(&self.form_params, self.config.params().request_strategy())
        }
    }

    /// The full request URL.
    ///
    /// An absolute `http(s)://` path overrides the base URI. Otherwise base
    /// URI, base path and path are joined with single slashes and the port
    /// override applied.
    pub fn resolve_uri(&self) -> Result<Url> {
        let path = self.resolved_path()?;

        let mut url = if is_absolute(&path) {
            Url::parse(&path)?
        } else {
            let base = self
                .base_uri
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URI)
                .trim_end_matches('/');
            let mut joined = base.to_string();
            for segment in [self.base_path.as_deref().unwrap_or_default(), path.as_str()] {
                let segment = segment.trim_matches('/');
                if !segment.is_empty() {
                    joined.push('/');
                    joined.push_str(segment);
                }
            }
            if path.ends_with('/') && path.len() > 1 {
                joined.push('/');
            }
            let mut url = Url::parse(&joined)?;
            if let Some(port) = self.port {
                url.set_port(Some(port))
                    .map_err(|_| AssuredError::InvalidUrl(joined.clone()))?;
            }
            url
        };

        let query = self.effective_query_params();
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query.iter() {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}
