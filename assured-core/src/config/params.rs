//! Parameter and header update strategies.

use std::collections::BTreeMap;

use super::Config;

/// How a repeated same-name value combines with earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateStrategy {
    /// Values with the same name accumulate.
    #[default]
    Merge,
    /// The latest value supersedes every earlier one.
    Replace,
}

/// Update strategies for query, form and request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamConfig {
    query: UpdateStrategy,
    form: UpdateStrategy,
    request: UpdateStrategy,
    user_configured: bool,
}

impl ParamConfig {
    /// Create a config where every parameter kind merges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge all parameter kinds.
    pub fn merge_all_parameters(self) -> Self {
        Self::with_all(UpdateStrategy::Merge)
    }

    /// Replace all parameter kinds.
    pub fn replace_all_parameters(self) -> Self {
        Self::with_all(UpdateStrategy::Replace)
    }

    fn with_all(strategy: UpdateStrategy) -> Self {
        Self {
            query: strategy,
            form: strategy,
            request: strategy,
            user_configured: true,
        }
    }

    /// Set the strategy for query parameters.
    pub fn query_params_update_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.query = strategy;
        self.user_configured = true;
        self
    }

    /// Set the strategy for form parameters.
    pub fn form_params_update_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.form = strategy;
        self.user_configured = true;
        self
    }

    /// Set the strategy for request parameters, which become query or form
    /// parameters depending on the request.
    pub fn request_params_update_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.request = strategy;
        self.user_configured = true;
        self
    }

    /// Strategy for query parameters.
    pub fn query_strategy(&self) -> UpdateStrategy {
        self.query
    }

    /// Strategy for form parameters.
    pub fn form_strategy(&self) -> UpdateStrategy {
        self.form
    }

    /// Strategy for request parameters.
    pub fn request_strategy(&self) -> UpdateStrategy {
        self.request
    }
}

impl Config for ParamConfig {
    fn is_user_configured(&self) -> bool {
        self.user_configured
    }
}

/// Which headers overwrite earlier values instead of accumulating.
///
/// Names are compared case-insensitively. `Content-Type` and `Accept`
/// overwrite by default; every other header merges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderConfig {
    overwrite: BTreeMap<String, bool>,
    user_configured: bool,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        let overwrite = ["content-type", "accept"]
            .into_iter()
            .map(|name| (name.to_string(), true))
            .collect();
        Self {
            overwrite,
            user_configured: false,
        }
    }
}

impl HeaderConfig {
    /// Create the default header config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the given headers when they're set more than once.
    pub fn overwrite_headers_with_name<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.overwrite.insert(name.as_ref().to_ascii_lowercase(), true);
        }
        self.user_configured = true;
        self
    }

    /// Merge the given headers when they're set more than once.
    pub fn merge_headers_with_name<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.overwrite.insert(name.as_ref().to_ascii_lowercase(), false);
        }
        self.user_configured = true;
        self
    }

    /// Check whether the header should be overwritten.
    pub fn should_overwrite(&self, name: &str) -> bool {
        self.overwrite
            .get(&name.to_ascii_lowercase())
            .copied()
            .unwrap_or(false)
    }

    /// Strategy to apply for a header name.
    pub fn strategy_for(&self, name: &str) -> UpdateStrategy {
        if self.should_overwrite(name) {
            UpdateStrategy::Replace
        } else {
            UpdateStrategy::Merge
        }
    }
}

impl Config for HeaderConfig {
    fn is_user_configured(&self) -> bool {
        self.user_configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_config_defaults_to_merge() {
        let config = ParamConfig::new();
        assert_eq!(config.query_strategy(), UpdateStrategy::Merge);
        assert_eq!(config.form_strategy(), UpdateStrategy::Merge);
        assert_eq!(config.request_strategy(), UpdateStrategy::Merge);
        assert!(!config.is_user_configured());
    }

    #[test]
    fn test_param_config_setters_mark_user_configured() {
        let config = ParamConfig::new().query_params_update_strategy(UpdateStrategy::Replace);
        assert_eq!(config.query_strategy(), UpdateStrategy::Replace);
        assert_eq!(config.form_strategy(), UpdateStrategy::Merge);
        assert!(config.is_user_configured());

        let config = ParamConfig::new().replace_all_parameters();
        assert_eq!(config.request_strategy(), UpdateStrategy::Replace);
    }

    #[test]
    fn test_header_config_overwrites_content_type_by_default() {
        let config = HeaderConfig::new();
        assert!(config.should_overwrite("Content-Type"));
        assert!(config.should_overwrite("ACCEPT"));
        assert!(!config.should_overwrite("X-Trace"));
        assert!(!config.is_user_configured());
    }

    #[test]
    fn test_header_config_custom_names() {
        let config = HeaderConfig::new()
            .overwrite_headers_with_name(["X-Token"])
            .merge_headers_with_name(["accept"]);
        assert_eq!(config.strategy_for("x-token"), UpdateStrategy::Replace);
        assert_eq!(config.strategy_for("Accept"), UpdateStrategy::Merge);
        assert!(config.is_user_configured());
    }
}
