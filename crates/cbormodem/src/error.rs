//! Parse outcomes and the fatal error taxonomy.

use thiserror::Error;

/// Fatal parse failures.
///
/// Every error is terminal for the current parse: the parser fires a
/// [`ParseEvent::Failed`](crate::ParseEvent::Failed) into the sink and the
/// context should be discarded. The `Display` impl provides the stable
/// human-readable description for each code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Syntactically invalid CBOR: a reserved sub-mask, an indefinite marker
    /// where none is allowed, a break without an indefinite parent, a
    /// mixed-type fragment inside an indefinite string, or a one-byte simple
    /// value that re-encodes an implicit one (RFC 8949 §3.3).
    #[error("bad CBOR coding")]
    BadCoding,
    /// The event sink aborted the parse by returning [`Reject`](crate::Reject).
    #[error("parser callback errored")]
    RejectedCallback,
    /// A fixed-capacity structure (frame stack, path buffer, index vector or
    /// layer stack) would have had to grow.
    #[error("overflow")]
    StackOverflow,
}

/// Successful outcome of [`parse`](crate::StreamingParser::parse).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// One or more complete top-level items were consumed and the parser is
    /// back at depth zero, ready for the next item.
    Idle,
    /// The input ended mid-item; feed more bytes to resume. Any split of the
    /// byte stream produces identical events.
    Continue,
}
