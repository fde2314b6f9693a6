//! Matchers for JSON bodies.
//!
//! Paths are dotted property names with optional `[index]` suffixes
//! (negative indices count from the end) and an optional trailing `size()`,
//! e.g. `store.book[0].author` or `store.book.size()`. An empty path is the
//! whole document.

use serde_json::Value;

use super::PathMatcher;
use crate::response::Response;

fn split_indices(segment: &str) -> Option<(&str, Vec<i64>)> {
    let (name, mut rest) = match segment.find('[') {
        Some(start) => (&segment[..start], &segment[start..]),
        None => return Some((segment, Vec::new())),
    };
    let mut indices = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let end = inner.find(']')?;
        indices.push(inner[..end].trim().parse().ok()?);
        rest = &inner[end + 1..];
    }
    Some((name, indices))
}

fn index<'a>(value: &'a Value, i: i64) -> Option<&'a Value> {
    let items = value.as_array()?;
    let position = if i < 0 {
        items.len().checked_sub(i.unsigned_abs() as usize)?
    } else {
        i as usize
    };
    items.get(position)
}

fn size(value: &Value) -> Option<usize> {
    match value {
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        Value::String(text) => Some(text.chars().count()),
        _ => None,
    }
}

/// Look up a path in a JSON document.
pub fn lookup(document: &Value, path: &str) -> Option<Value> {
    let mut current = document;
    let segments: Vec<&str> = if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    };

    for (i, segment) in segments.iter().enumerate() {
        if *segment == "size()" && i + 1 == segments.len() {
            return size(current).map(Value::from);
        }
        let (name, indices) = split_indices(segment)?;
        if !name.is_empty() {
            current = current.get(name)?;
        }
        for n in indices {
            current = index(current, n)?;
        }
    }
    Some(current.clone())
}

fn document(response: &Response) -> Result<Value, String> {
    response
        .json::<Value>()
        .map_err(|e| format!("response body is not JSON ({})", e))
}

#[derive(Debug, Clone, PartialEq)]
enum Expectation {
    Equals(Value),
    Present,
    Absent,
    Size(usize),
    Contains(Value),
}

/// A matcher for one value in a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonMatcher {
    expectation: Expectation,
}

impl PathMatcher for JsonMatcher {
    fn matches(&self, response: &Response, path: &str) -> Result<(), String> {
        let document = document(response)?;
        let found = lookup(&document, path);

        match (&self.expectation, found) {
            (Expectation::Absent, None) => Ok(()),
            (Expectation::Absent, Some(actual)) => {
                Err(format!("expected no value but found {}", actual))
            }
            (_, None) => Err("no value at path".to_string()),
            (Expectation::Present, Some(_)) => Ok(()),
            (Expectation::Equals(expected), Some(actual)) => {
                if numbers_equal(expected, &actual) || *expected == actual {
                    Ok(())
                } else {
                    Err(format!("expected {} but was {}", expected, actual))
                }
            }
            (Expectation::Size(expected), Some(actual)) => match measured_size(path, &actual) {
                Some(n) if n == *expected => Ok(()),
                Some(n) => Err(format!("expected size {} but was {}", expected, n)),
                None => Err(format!("{} has no size", actual)),
            },
            (Expectation::Contains(expected), Some(actual)) => {
                let contained = match (&actual, expected) {
                    (Value::Array(items), _) => items.contains(expected),
                    (Value::String(text), Value::String(part)) => text.contains(part.as_str()),
                    _ => false,
                };
                if contained {
                    Ok(())
                } else {
                    Err(format!("expected {} to contain {}", actual, expected))
                }
            }
        }
    }
}

// A trailing `size()` has already been evaluated by `lookup`.
fn measured_size(path: &str, actual: &Value) -> Option<usize> {
    if path == "size()" || path.ends_with(".size()") {
        actual.as_u64().map(|n| n as usize)
    } else {
        size(actual)
    }
}

fn numbers_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => a.is_number() && b.is_number() && x == y,
        _ => false,
    }
}

/// The value equals `expected`. Numbers compare by value, so `2` matches `2.0`.
pub fn equal_to(expected: impl Into<Value>) -> JsonMatcher {
    JsonMatcher {
        expectation: Expectation::Equals(expected.into()),
    }
}

/// Some value exists at the path, `null` included.
pub fn present() -> JsonMatcher {
    JsonMatcher {
        expectation: Expectation::Present,
    }
}

/// No value exists at the path.
pub fn absent() -> JsonMatcher {
    JsonMatcher {
        expectation: Expectation::Absent,
    }
}

/// The array, object or string has `expected` elements. On a path ending in
/// `size()` the computed count is compared instead.
pub fn has_size(expected: usize) -> JsonMatcher {
    JsonMatcher {
        expectation: Expectation::Size(expected),
    }
}

/// The array contains `expected`, or the string contains it as a substring.
pub fn contains(expected: impl Into<Value>) -> JsonMatcher {
    JsonMatcher {
        expectation: Expectation::Contains(expected.into()),
    }
}
