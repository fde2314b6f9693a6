//! Root path scoping for body expectations.
//!
//! A root path is a dotted prefix that later body paths are attached to.
//! Templates may contain `%s` and `%d` specifiers; arguments that don't fit
//! into the template are kept and consumed by the next body expectation.

use std::fmt;

use crate::{AssuredError, Result};

/// A positional argument for a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathArg {
    /// Formatted by `%s`.
    Text(String),
    /// Formatted by `%s` or `%d`.
    Integer(i64),
}

impl fmt::Display for PathArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathArg::Text(text) => f.write_str(text),
            PathArg::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for PathArg {
    fn from(value: &str) -> Self {
        PathArg::Text(value.to_string())
    }
}

impl From<String> for PathArg {
    fn from(value: String) -> Self {
        PathArg::Text(value)
    }
}

macro_rules! integer_path_arg {
    ($($ty:ty),*) => {
        $(impl From<$ty> for PathArg {
            fn from(value: $ty) -> Self {
                PathArg::Integer(i64::from(value))
            }
        })*
    };
}

integer_path_arg!(i8, i16, i32, i64, u8, u16, u32);

/// Build a `Vec<PathArg>` from mixed values.
///
/// ```
/// use assured_core::{path_args, PathArg};
///
/// let args = path_args!["book", 2];
/// assert_eq!(args, vec![PathArg::from("book"), PathArg::Integer(2)]);
/// ```
#[macro_export]
macro_rules! path_args {
    () => { ::std::vec::Vec::<$crate::PathArg>::new() };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::PathArg::from($arg)),+]
    };
}

/// Join two path fragments with a single dot.
pub(crate) fn join_path(base: &str, relative: &str) -> String {
    if base.is_empty() {
        return relative.strip_prefix('.').unwrap_or(relative).to_string();
    }
    if relative.is_empty() {
        return base.to_string();
    }
    match (base.ends_with('.'), relative.starts_with('.')) {
        (true, true) => format!("{}{}", base, &relative[1..]),
        (true, false) | (false, true) => format!("{}{}", base, relative),
        (false, false) => format!("{}.{}", base, relative),
    }
}

/// Result of filling a template with as many arguments as it takes.
struct Interpolated {
    text: String,
    unfilled: usize,
    leftover: Vec<PathArg>,
}

/// Fill `%s`/`%d` specifiers left to right. `%%` is a literal percent sign and
/// any other `%x` is copied through untouched.
fn interpolate(template: &str, args: &[PathArg]) -> Result<Interpolated> {
    let mut text = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut unfilled = 0;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            text.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                text.push('%');
            }
            Some(spec @ ('s' | 'd')) => {
                chars.next();
                match args.next() {
                    Some(PathArg::Text(arg)) if spec == 'd' => {
                        return Err(AssuredError::InvalidPathArgument {
                            argument: arg.clone(),
                            specifier: spec,
                        });
                    }
                    Some(arg) => text.push_str(&arg.to_string()),
                    None => {
                        unfilled += 1;
                        text.push('%');
                        text.push(spec);
                    }
                }
            }
            _ => text.push('%'),
        }
    }

    Ok(Interpolated {
        text,
        unfilled,
        leftover: args.cloned().collect(),
    })
}

/// Current root path plus arguments waiting for the next body expectation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootPathState {
    path: String,
    pending_args: Vec<PathArg>,
}

impl RootPathState {
    /// Create an empty root path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a root path from a literal, without interpolation.
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            pending_args: Vec::new(),
        }
    }

    /// The current root path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Check if no root path is set.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Whether arguments are waiting to be consumed by the next body expectation.
    pub fn is_primed(&self) -> bool {
        !self.pending_args.is_empty()
    }

    /// Arguments waiting for the next body expectation.
    pub fn pending_args(&self) -> &[PathArg] {
        &self.pending_args
    }

    /// Replace the root path.
    pub fn set_root(&mut self, template: &str, args: &[PathArg]) -> Result<()> {
        let filled = interpolate(template, args)?;
        self.path = filled.text;
        self.pending_args = filled.leftover;
        Ok(())
    }

    /// Append to the root path. Fails when there is no root path.
    pub fn append_root(&mut self, template: &str, args: &[PathArg]) -> Result<()> {
        if self.path.is_empty() {
            return Err(AssuredError::EmptyRootPath {
                operation: "append",
            });
        }
        let filled = interpolate(template, args)?;
        self.path = join_path(&self.path, &filled.text);
        self.pending_args = filled.leftover;
        Ok(())
    }

    /// Remove a trailing segment. `"book"` and `".book"` both detach from
    /// `"store.book"`, leaving `"store"`.
    pub fn detach_root(&mut self, suffix: &str) -> Result<()> {
        if self.path.is_empty() {
            return Err(AssuredError::EmptyRootPath {
                operation: "detach",
            });
        }
        let segment = suffix.strip_prefix('.').unwrap_or(suffix);
        let mismatch = || AssuredError::DetachMismatch {
            suffix: suffix.to_string(),
            root: self.path.clone(),
        };

        let remaining = self.path.strip_suffix(segment).ok_or_else(mismatch)?;
        if segment.is_empty() || !(remaining.is_empty() || remaining.ends_with('.')) {
            return Err(mismatch());
        }
        self.path = remaining.trim_end_matches('.').to_string();
        Ok(())
    }

    /// Copy of the current state that takes over the pending arguments.
    ///
    /// Used to bind a body expectation to the root path in effect when it
    /// was declared; the pending arguments are consumed here.
    pub fn take_for_body(&mut self) -> RootPathState {
        RootPathState {
            path: self.path.clone(),
            pending_args: std::mem::take(&mut self.pending_args),
        }
    }

    /// This state, or `root`'s path with this state's pending arguments when
    /// no root path was set.
    pub(crate) fn seeded_with(&self, root: &RootPathState) -> RootPathState {
        if self.path.is_empty() {
            RootPathState {
                path: root.path.clone(),
                pending_args: self.pending_args.clone(),
            }
        } else {
            self.clone()
        }
    }

    /// Clear the root path and any pending arguments.
    pub fn reset(&mut self) {
        self.path.clear();
        self.pending_args.clear();
    }

    /// Resolve a body path against the root path.
    ///
    /// Pending arguments are consumed first, then `args`. Once arguments are
    /// involved every specifier must be filled and every argument used.
    pub fn resolve_body_path(&mut self, relative: &str, args: &[PathArg]) -> Result<String> {
        let joined = join_path(&self.path, relative);

        if self.pending_args.is_empty() && args.is_empty() {
            return Ok(joined);
        }
        if joined.is_empty() {
            return Err(AssuredError::ArgumentsWithoutPath);
        }

        let mut all_args = std::mem::take(&mut self.pending_args);
        all_args.extend_from_slice(args);

        let filled = interpolate(&joined, &all_args)?;
        if filled.unfilled > 0 {
            return Err(AssuredError::MissingPathArguments {
                path: filled.text,
                missing: filled.unfilled,
            });
        }
        if !filled.leftover.is_empty() {
            return Err(AssuredError::UnusedPathArguments {
                path: filled.text,
                unused: filled.leftover.len(),
            });
        }
        Ok(filled.text)
    }
}
