// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream content: what a definition declares and what a handle reports.

use std::borrow::Cow;
use std::fmt;

/// Platform line separator used to join line-list content.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Declared content of a simulated output stream.
///
/// `Lines` is joined with [`LINE_SEPARATOR`] and gains a trailing separator
/// when non-empty; `Text` and `Bytes` are used verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Bytes(Vec<u8>),
    Lines(Vec<Vec<u8>>),
}

impl Content {
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self::Lines(lines.into_iter().map(|l| l.as_ref().to_vec()).collect())
    }

    /// Render to raw bytes.
    pub fn render(&self) -> Vec<u8> {
        match self {
            Content::Text(text) => text.as_bytes().to_vec(),
            Content::Bytes(bytes) => bytes.clone(),
            Content::Lines(lines) => {
                let mut out = lines.join(LINE_SEPARATOR.as_bytes());
                if !out.is_empty() {
                    out.extend_from_slice(LINE_SEPARATOR.as_bytes());
                }
                out
            }
        }
    }

    /// Render for a handle, applying universal-newline translation when asked.
    pub fn render_for(&self, universal_newlines: bool) -> Vec<u8> {
        let raw = self.render();
        if universal_newlines {
            normalize_newlines(&raw)
        } else {
            raw
        }
    }
}

/// Replace every `\r\n` with `\n`.
pub fn normalize_newlines(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut iter = data.iter().peekable();
    while let Some(&b) = iter.next() {
        if b == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(b);
    }
    out
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&[u8]> for Content {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Content {
    fn from(bytes: &[u8; N]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<String>> for Content {
    fn from(lines: Vec<String>) -> Self {
        Self::lines(lines)
    }
}

impl From<Vec<&str>> for Content {
    fn from(lines: Vec<&str>) -> Self {
        Self::lines(lines)
    }
}

impl From<&[&str]> for Content {
    fn from(lines: &[&str]) -> Self {
        Self::lines(lines)
    }
}

impl<const N: usize> From<[&str; N]> for Content {
    fn from(lines: [&str; N]) -> Self {
        Self::lines(lines)
    }
}

/// Accumulated stream output as observed on a handle.
///
/// Text mode handles report `Text` (decoded lossily); binary handles report
/// `Bytes`. Comparisons against `&str` and byte slices work for either form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamData {
    Bytes(Vec<u8>),
    Text(String),
}

impl StreamData {
    pub fn from_buffer(buffer: &[u8], text: bool) -> Self {
        if text {
            Self::Text(String::from_utf8_lossy(buffer).into_owned())
        } else {
            Self::Bytes(buffer.to_vec())
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            StreamData::Bytes(bytes) => bytes,
            StreamData::Text(text) => text.as_bytes(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            StreamData::Bytes(bytes) => bytes,
            StreamData::Text(text) => text.into_bytes(),
        }
    }

    /// The text, if this stream was produced in text mode.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamData::Text(text) => Some(text),
            StreamData::Bytes(_) => None,
        }
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, StreamData::Text(_))
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Lines without their terminators (`\n` or `\r\n`).
    pub fn lines(&self) -> Vec<String> {
        self.to_string_lossy().lines().map(str::to_string).collect()
    }
}

impl fmt::Display for StreamData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl PartialEq<str> for StreamData {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for StreamData {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<String> for StreamData {
    fn eq(&self, other: &String) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<[u8]> for StreamData {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&[u8]> for StreamData {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for StreamData {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.as_bytes() == &other[..]
    }
}

impl PartialEq<Vec<u8>> for StreamData {
    fn eq(&self, other: &Vec<u8>) -> bool {
        self.as_bytes() == other.as_slice()
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
