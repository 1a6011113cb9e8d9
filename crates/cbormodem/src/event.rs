//! Events emitted by the streaming CBOR parser and the [`Scope`] view handed
//! to the sink alongside each one.
//!
//! `ParseEvent` enumerates parser outputs: lifecycle notices, scalar values,
//! chunked string delivery, and container boundaries. String and byte-string
//! content arrives as a `...Start` event, zero or more `...Chunk` events, and
//! exactly one `...End` event carrying the final chunk.

/// An event generated by the streaming CBOR parser.
///
/// Scalar variants carry the decoded value. Chunk variants borrow the
/// parser's scratch buffer and are only valid for the duration of the
/// callback. Text chunks are raw bytes: a chunk boundary may fall inside a
/// multi-byte UTF-8 sequence, so no validation is applied to fragments.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParseEvent<'a> {
    /// The parser came to life with a freshly installed sink.
    Constructed,
    /// The parser (or the current sink) is going away.
    Destructed,
    /// The parse failed; fired once before `parse` returns an error.
    Failed,
    /// An unsigned integer (major type 0).
    Uint(u64),
    /// A negative integer (major type 1), already mapped to `-1 - n`.
    Int(i64),
    /// A half-precision float, surfaced as its raw 16 bits.
    Float16(u16),
    /// A single-precision float.
    Float32(f32),
    /// A double-precision float.
    Float64(f64),
    /// `true` or `false`.
    Boolean(bool),
    /// `null`.
    Null,
    /// `undefined`.
    Undefined,
    /// Any other simple value, surfaced unchanged.
    Simple(u8),
    /// A text string begins.
    StrStart,
    /// An intermediate text-string chunk; more bytes follow.
    StrChunk(&'a [u8]),
    /// The final text-string chunk (possibly empty).
    StrEnd(&'a [u8]),
    /// A byte string begins.
    BlobStart,
    /// An intermediate byte-string chunk; more bytes follow.
    BlobChunk(&'a [u8]),
    /// The final byte-string chunk (possibly empty).
    BlobEnd(&'a [u8]),
    /// An array begins.
    ArrayStart,
    /// The matching end of an array.
    ArrayEnd,
    /// A map begins.
    ObjectStart,
    /// The matching end of a map.
    ObjectEnd,
    /// A tagged item begins; carries the tag number, uninterpreted.
    TagStart(u64),
    /// The tagged item's body is complete.
    TagEnd(u64),
}

/// Read-only view of the parser's position, handed to the sink with every
/// event.
///
/// This is how a sink learns *where* an event happened: the dotted path
/// through enclosing maps and arrays, which registered pattern (if any)
/// currently matches it, and the index vector for enclosing arrays.
#[derive(Debug)]
pub struct Scope<'a> {
    pub(crate) path: &'a [u8],
    pub(crate) matched: Option<usize>,
    pub(crate) match_len: usize,
    pub(crate) wild: &'a [usize],
    pub(crate) indices: &'a [u64],
    pub(crate) depth: usize,
}

impl<'a> Scope<'a> {
    /// The current path, e.g. `b"config.features[]"`.
    ///
    /// Map keys are spliced in verbatim, so the path is only guaranteed to be
    /// UTF-8 when every key seen so far was.
    #[must_use]
    pub fn path(&self) -> &'a [u8] {
        self.path
    }

    /// The current path as `&str`, when it is valid UTF-8.
    #[must_use]
    pub fn path_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.path).ok()
    }

    /// Index of the first registered pattern matching the current path, if
    /// any. Earlier patterns win; the match persists until a pop truncates
    /// the path below the point where it was established.
    #[must_use]
    pub fn matched(&self) -> Option<usize> {
        self.matched
    }

    /// Length the path had when the active match was established.
    #[must_use]
    pub fn match_len(&self) -> usize {
        self.match_len
    }

    /// Byte offsets into [`path`](Self::path) where each `*` of the matched
    /// pattern started matching.
    #[must_use]
    pub fn wildcards(&self) -> &'a [usize] {
        self.wild
    }

    /// The path segment the `i`-th wildcard matched, up to the next `.` or
    /// the end of the path.
    #[must_use]
    pub fn wildcard(&self, i: usize) -> Option<&'a [u8]> {
        let start = *self.wild.get(i)?;
        let seg = self.path.get(start..)?;
        let end = seg.iter().position(|&b| b == b'.').unwrap_or(seg.len());
        Some(&seg[..end])
    }

    /// Zero-based element indices for every enclosing array, outermost first.
    #[must_use]
    pub fn indices(&self) -> &'a [u64] {
        self.indices
    }

    /// Element index within the innermost enclosing array.
    #[must_use]
    pub fn index(&self) -> Option<u64> {
        self.indices.last().copied()
    }

    /// Current nesting depth; zero at the top level.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}
