// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The literal argument sequence a caller used to launch a process.

use std::ffi::OsStr;
use std::fmt;

/// Literal tokens of one launch attempt, exactly as the caller typed them.
///
/// Path-like arguments are normalised to strings on the way in, so an
/// invocation built from `PathBuf`s compares equal to one built from the
/// same text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Invocation(Vec<String>);

impl Invocation {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Self(args.into_iter().map(|a| a.as_ref().to_string_lossy().into_owned()).collect())
    }

    /// Split a command line on single spaces, the way shell-style launches
    /// are compared against registered patterns.
    pub fn from_line(line: &str) -> Self {
        Self(line.split(' ').map(str::to_string).collect())
    }

    /// The first token (argv\[0\]).
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn push(&mut self, arg: impl AsRef<OsStr>) {
        self.0.push(arg.as_ref().to_string_lossy().into_owned());
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

impl From<&str> for Invocation {
    fn from(line: &str) -> Self {
        Self::from_line(line)
    }
}

impl From<String> for Invocation {
    fn from(line: String) -> Self {
        Self::from_line(&line)
    }
}

impl<S: AsRef<OsStr>> From<Vec<S>> for Invocation {
    fn from(args: Vec<S>) -> Self {
        Self::new(args)
    }
}

impl<S: AsRef<OsStr>> From<&[S]> for Invocation {
    fn from(args: &[S]) -> Self {
        Self::new(args)
    }
}

impl<S: AsRef<OsStr>, const N: usize> From<[S; N]> for Invocation {
    fn from(args: [S; N]) -> Self {
        Self::new(args)
    }
}

impl<'a> IntoIterator for &'a Invocation {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl PartialEq<[&str]> for Invocation {
    fn eq(&self, other: &[&str]) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for Invocation {
    fn eq(&self, other: &[&str; N]) -> bool {
        self == &other[..]
    }
}

#[cfg(test)]
#[path = "invocation_tests.rs"]
mod tests;
