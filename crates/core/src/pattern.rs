// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command patterns: ordered argument matchers used to key registrations.
//!
//! A pattern is a sequence of [`Matcher`]s:
//! - `Literal` consumes one argument and must equal it exactly
//! - `ProgramName` consumes one argument and compares only its final path segment
//! - `AnyCount` consumes a bounded run of arguments (at most one per pattern)
//!
//! Equality is structural: a pattern containing wildcards never equals a
//! purely literal pattern, even when both render to the same text.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Invocation, PatternError};

/// Wildcard matching a contiguous run of arguments.
///
/// Both bounds are inclusive; an unset `max` is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Any {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Any {
    pub const fn new() -> Self {
        Self { min: None, max: None }
    }

    pub const fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    pub const fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    fn accepts(&self, count: usize) -> bool {
        self.min.map_or(true, |min| count >= min) && self.max.map_or(true, |max| count <= max)
    }

    fn validate(&self) -> Result<(), PatternError> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Err(PatternError::InvalidBounds { min, max }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<usize>| b.map_or_else(|| "None".to_string(), |v| v.to_string());
        write!(f, "Any(min={}, max={})", bound(self.min), bound(self.max))
    }
}

/// One element of a [`CommandPattern`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Matcher {
    Literal(String),
    AnyCount(Any),
    ProgramName(String),
}

impl Matcher {
    pub fn literal(token: impl AsRef<OsStr>) -> Self {
        Self::Literal(token.as_ref().to_string_lossy().into_owned())
    }

    pub fn any() -> Self {
        Self::AnyCount(Any::new())
    }

    pub fn program(name: impl Into<String>) -> Self {
        Self::ProgramName(name.into())
    }

    /// Number of arguments this matcher must consume at minimum.
    fn min_width(&self) -> usize {
        match self {
            Matcher::AnyCount(any) => any.min.unwrap_or(0),
            Matcher::Literal(_) | Matcher::ProgramName(_) => 1,
        }
    }

    /// Whether a single-argument matcher accepts `arg`.
    fn accepts_one(&self, arg: &str) -> bool {
        match self {
            Matcher::Literal(token) => token == arg,
            Matcher::ProgramName(name) => is_program(arg, name),
            Matcher::AnyCount(_) => false,
        }
    }
}

/// Final path component, splitting on both `/` and `\`.
fn program_name(arg: &str) -> &str {
    arg.rsplit(['/', '\\']).next().unwrap_or(arg)
}

#[cfg(not(windows))]
fn is_program(arg: &str, name: &str) -> bool {
    program_name(arg) == name
}

/// Also accepts `name` plus any `PATHEXT` suffix, case-insensitively.
#[cfg(windows)]
fn is_program(arg: &str, name: &str) -> bool {
    let found = program_name(arg);
    if found == name {
        return true;
    }
    let exts = std::env::var("PATHEXT").unwrap_or_default();
    exts.split(';')
        .filter(|ext| !ext.is_empty())
        .any(|ext| found.eq_ignore_ascii_case(&format!("{name}{ext}")))
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Literal(token) => f.write_str(token),
            Matcher::AnyCount(any) => write!(f, "{any}"),
            Matcher::ProgramName(name) => write!(f, "Program({name})"),
        }
    }
}

impl From<&str> for Matcher {
    fn from(token: &str) -> Self {
        Self::Literal(token.to_string())
    }
}

impl From<String> for Matcher {
    fn from(token: String) -> Self {
        Self::Literal(token)
    }
}

impl From<&String> for Matcher {
    fn from(token: &String) -> Self {
        Self::Literal(token.clone())
    }
}

impl From<&Path> for Matcher {
    fn from(path: &Path) -> Self {
        Self::literal(path)
    }
}

impl From<PathBuf> for Matcher {
    fn from(path: PathBuf) -> Self {
        Self::literal(path)
    }
}

impl From<Any> for Matcher {
    fn from(any: Any) -> Self {
        Self::AnyCount(any)
    }
}

/// Ordered matcher sequence describing which invocations a definition serves.
///
/// Construction never fails; [`CommandPattern::validate`] reports patterns
/// that can never be well-formed, and registration calls it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandPattern {
    matchers: Vec<Matcher>,
}

impl CommandPattern {
    pub fn new<I, M>(matchers: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Matcher>,
    {
        Self { matchers: matchers.into_iter().map(Into::into).collect() }
    }

    /// Purely literal pattern for exactly the tokens of `invocation`.
    pub fn literal(invocation: &Invocation) -> Self {
        Self::new(invocation.iter().map(String::as_str))
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    pub fn is_literal(&self) -> bool {
        self.matchers.iter().all(|m| matches!(m, Matcher::Literal(_)))
    }

    pub fn validate(&self) -> Result<(), PatternError> {
        if self.matchers.is_empty() {
            return Err(PatternError::Empty);
        }
        let mut wildcards = 0;
        for (i, matcher) in self.matchers.iter().enumerate() {
            match matcher {
                Matcher::AnyCount(any) => {
                    any.validate()?;
                    wildcards += 1;
                }
                Matcher::ProgramName(_) if i > 0 => {
                    return Err(PatternError::MisplacedProgram { pattern: self.to_string() });
                }
                Matcher::ProgramName(_) | Matcher::Literal(_) => {}
            }
        }
        if wildcards > 1 {
            return Err(PatternError::MultipleWildcards { pattern: self.to_string() });
        }
        Ok(())
    }

    /// Whether `invocation` satisfies this pattern.
    ///
    /// Single-argument matchers are checked positionally around the (at most
    /// one) wildcard, which absorbs whatever remains in between. A pattern
    /// with more than one wildcard matches nothing.
    pub fn matches(&self, invocation: &Invocation) -> bool {
        let args = invocation.tokens();
        let mut wildcard = None;
        for (i, matcher) in self.matchers.iter().enumerate() {
            if let Matcher::AnyCount(any) = matcher {
                if wildcard.is_some() {
                    return false;
                }
                wildcard = Some((i, *any));
            }
        }

        let Some((pos, any)) = wildcard else {
            return args.len() == self.matchers.len()
                && self.matchers.iter().zip(args).all(|(m, a)| m.accepts_one(a));
        };

        let before = &self.matchers[..pos];
        let after = &self.matchers[pos + 1..];
        let fixed: usize = before.iter().chain(after).map(Matcher::min_width).sum();
        let Some(absorbed) = args.len().checked_sub(fixed) else {
            return false;
        };
        if !any.accepts(absorbed) {
            return false;
        }

        let tail = &args[pos + absorbed..];
        before.iter().zip(&args[..pos]).all(|(m, a)| m.accepts_one(a))
            && after.iter().zip(tail).all(|(m, a)| m.accepts_one(a))
    }
}

impl fmt::Display for CommandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, matcher) in self.matchers.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{matcher}")?;
        }
        Ok(())
    }
}

impl From<&str> for CommandPattern {
    fn from(line: &str) -> Self {
        Self::new(line.split(' '))
    }
}

impl From<String> for CommandPattern {
    fn from(line: String) -> Self {
        Self::from(line.as_str())
    }
}

impl From<&Invocation> for CommandPattern {
    fn from(invocation: &Invocation) -> Self {
        Self::literal(invocation)
    }
}

impl From<Invocation> for CommandPattern {
    fn from(invocation: Invocation) -> Self {
        Self::literal(&invocation)
    }
}

impl From<Matcher> for CommandPattern {
    fn from(matcher: Matcher) -> Self {
        Self { matchers: vec![matcher] }
    }
}

impl From<&CommandPattern> for CommandPattern {
    fn from(pattern: &CommandPattern) -> Self {
        pattern.clone()
    }
}

impl<M: Into<Matcher>> From<Vec<M>> for CommandPattern {
    fn from(matchers: Vec<M>) -> Self {
        Self::new(matchers)
    }
}

impl<M: Into<Matcher> + Clone> From<&[M]> for CommandPattern {
    fn from(matchers: &[M]) -> Self {
        Self::new(matchers.iter().cloned())
    }
}

impl<M: Into<Matcher>, const N: usize> From<[M; N]> for CommandPattern {
    fn from(matchers: [M; N]) -> Self {
        Self::new(matchers)
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
