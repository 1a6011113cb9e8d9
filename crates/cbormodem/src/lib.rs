//! Incremental push parser for RFC 8949 CBOR.
//!
//! Feed arbitrary byte chunks into a [`StreamingParser`] and receive
//! [`ParseEvent`]s through an [`EventSink`] as data items and structural
//! boundaries are recognized. The parser tracks a dotted textual path
//! through nested maps and arrays and matches it against registered
//! wildcard patterns, so a sink can react only to the items it cares about
//! without doing its own tree bookkeeping.
//!
//! No bytes are buffered beyond one string chunk, nothing allocates after
//! construction, and any split of the input produces identical events.

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod cbor;
mod error;
mod event;
mod item;
mod options;
mod parser;
mod path;
mod sink;

pub use error::{ParseError, Status};
pub use event::{ParseEvent, Scope};
pub use options::ParserOptions;
pub use parser::StreamingParser;
pub use sink::{EventSink, Reject};
