//! Ordered multi-value parameter storage.

use crate::config::UpdateStrategy;

/// How parameter names are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMatching {
    /// Names must match exactly (query, form, path params, cookies).
    #[default]
    Exact,
    /// Names match ignoring ASCII case (headers).
    CaseInsensitive,
}

impl NameMatching {
    fn matches(self, a: &str, b: &str) -> bool {
        match self {
            NameMatching::Exact => a == b,
            NameMatching::CaseInsensitive => a.eq_ignore_ascii_case(b),
        }
    }
}

/// Ordered list of `(name, value)` pairs.
///
/// Insertion order is kept both across names and within one name, so
/// repeated headers and query params go out in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMultiMap<V = String> {
    entries: Vec<(String, V)>,
    matching: NameMatching,
}

impl<V: Clone> Default for ParameterMultiMap<V> {
    fn default() -> Self {
        Self::new(NameMatching::Exact)
    }
}

impl<V: Clone> ParameterMultiMap<V> {
    /// Create an empty map.
    pub fn new(matching: NameMatching) -> Self {
        Self {
            entries: Vec::new(),
            matching,
        }
    }

    /// Create an empty map with exact name matching.
    pub fn exact() -> Self {
        Self::new(NameMatching::Exact)
    }

    /// Create an empty map with case-insensitive name matching.
    pub fn case_insensitive() -> Self {
        Self::new(NameMatching::CaseInsensitive)
    }

    /// Name matching rule.
    pub fn matching(&self) -> NameMatching {
        self.matching
    }

    /// Add a value. Under [`UpdateStrategy::Replace`] every earlier value with
    /// the same name is dropped first.
    pub fn add(&mut self, name: impl Into<String>, value: V, strategy: UpdateStrategy) {
        let name = name.into();
        if strategy == UpdateStrategy::Replace {
            self.remove(&name);
        }
        self.entries.push((name, value));
    }

    /// Add several values for one name. Under [`UpdateStrategy::Replace`] the
    /// new values together supersede the old ones.
    pub fn add_all<I>(&mut self, name: impl Into<String>, values: I, strategy: UpdateStrategy)
    where
        I: IntoIterator<Item = V>,
    {
        let name = name.into();
        if strategy == UpdateStrategy::Replace {
            self.remove(&name);
        }
        self.entries
            .extend(values.into_iter().map(|value| (name.clone(), value)));
    }

    /// All values for a name, in insertion order.
    pub fn get(&self, name: &str) -> Vec<&V> {
        self.entries
            .iter()
            .filter(|(n, _)| self.matching.matches(n, name))
            .map(|(_, v)| v)
            .collect()
    }

    /// First value for a name.
    pub fn first(&self, name: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(n, _)| self.matching.matches(n, name))
            .map(|(_, v)| v)
    }

    /// Check if any value exists for a name.
    pub fn contains(&self, name: &str) -> bool {
        self.first(name).is_some()
    }

    /// Remove every value for a name, returning how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        let matching = self.matching;
        self.entries.retain(|(n, _)| !matching.matches(n, name));
        before - self.entries.len()
    }

    /// Distinct names in first-seen order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.entries {
            if !names.iter().any(|seen| self.matching.matches(seen, name)) {
                names.push(name);
            }
        }
        names
    }

    /// Iterate over every pair.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Combine with an overlay into a new map.
    ///
    /// Base entries come first, then overlay entries. A name whose strategy
    /// is [`UpdateStrategy::Replace`] and which the overlay defines is taken
    /// from the overlay alone.
    pub fn merge<F>(&self, overlay: &Self, strategy_for: F) -> Self
    where
        F: Fn(&str) -> UpdateStrategy,
    {
        let mut entries: Vec<(String, V)> = self
            .entries
            .iter()
            .filter(|(name, _)| {
                !(strategy_for(name) == UpdateStrategy::Replace && overlay.contains(name))
            })
            .cloned()
            .collect();
        entries.extend(overlay.entries.iter().cloned());
        Self {
            entries,
            matching: self.matching,
        }
    }
}

impl<V: Clone> FromIterator<(String, V)> for ParameterMultiMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            matching: NameMatching::Exact,
        }
    }
}
