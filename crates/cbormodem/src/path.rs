//! Textual position tracking and wildcard pattern matching.
//!
//! As the parser descends through maps and arrays it maintains a dotted
//! path: map keys are spliced in (`config.limits`), array entry appends
//! `[]`, and the numeric index lives in a separate vector. Registered
//! patterns are matched against the path so sinks can react only to items of
//! interest. A `*` in a pattern swallows one path segment, up to the next
//! `.`; a trailing `*` swallows the remainder. Because only the first match
//! wins, more specific patterns must be registered before less specific
//! ones (`x.*.*` ahead of `x.*`).

use alloc::{string::String, vec::Vec};

use crate::error::ParseError;

/// Per-layer path buffer, registered patterns, and match state. All storage
/// is sized at construction and never grows.
#[derive(Debug)]
pub(crate) struct PathTracker {
    buf: Vec<u8>,
    cap: usize,
    patterns: Vec<String>,
    matched: Option<usize>,
    match_len: usize,
    wild: Vec<usize>,
    wild_cap: usize,
}

impl PathTracker {
    pub fn new(cap: usize, wild_cap: usize, patterns: &[&str]) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
            cap,
            patterns: patterns.iter().map(|p| String::from(*p)).collect(),
            matched: None,
            match_len: 0,
            wild: Vec::with_capacity(wild_cap),
            wild_cap,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn matched(&self) -> Option<usize> {
        self.matched
    }

    pub fn match_len(&self) -> usize {
        self.match_len
    }

    pub fn wildcards(&self) -> &[usize] {
        &self.wild
    }

    pub fn append(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        if self.buf.len() + bytes.len() > self.cap {
            return Err(ParseError::StackOverflow);
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Truncate on pop: drops a stale match and immediately re-evaluates.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
        self.invalidate(len);
        self.check();
    }

    /// Truncate ahead of an overwrite (a later map key replacing its
    /// sibling). The stale match is dropped but re-evaluation waits until
    /// the new key is in place.
    pub fn rewind(&mut self, len: usize) {
        self.buf.truncate(len);
        self.invalidate(len);
    }

    fn invalidate(&mut self, len: usize) {
        if self.matched.is_some() && self.match_len > len {
            self.matched = None;
            self.match_len = 0;
            self.wild.clear();
        }
    }

    /// Scan the pattern list against the current path. A no-op while a match
    /// is active; the first hit wins and records where each wildcard landed.
    pub fn check(&mut self) {
        if self.matched.is_some() {
            return;
        }
        for n in 0..self.patterns.len() {
            if Self::matches(
                &self.buf,
                self.patterns[n].as_bytes(),
                &mut self.wild,
                self.wild_cap,
            ) {
                self.matched = Some(n);
                self.match_len = self.buf.len();
                return;
            }
        }
        self.wild.clear();
    }

    fn matches(path: &[u8], pattern: &[u8], wild: &mut Vec<usize>, wild_cap: usize) -> bool {
        wild.clear();
        let mut p = 0;
        let mut q = 0;
        while p < path.len() && q < pattern.len() {
            if pattern[q] != b'*' {
                if path[p] != pattern[q] {
                    break;
                }
                p += 1;
                q += 1;
                continue;
            }
            // Wildcard offsets past capacity are silently dropped.
            if wild.len() < wild_cap {
                wild.push(p);
            }
            q += 1;
            // A `*` with something after it eats to the next `.`; a trailing
            // `*` eats the rest of the path.
            while p < path.len() && (path[p] != b'.' || q == pattern.len()) {
                p += 1;
            }
        }
        p == path.len() && q == pattern.len()
    }
}
