//! The callback seam between the parser and its consumer.

use crate::event::{ParseEvent, Scope};

/// Universal abort signal: returning `Err(Reject)` from a sink stops the
/// parse, which then fails with
/// [`ParseError::RejectedCallback`](crate::ParseError::RejectedCallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reject;

/// Receiver for parse events.
///
/// The sink is invoked synchronously from within
/// [`parse`](crate::StreamingParser::parse); it must not feed the same parser
/// re-entrantly (the borrow checker enforces this). Any `FnMut` closure with
/// the matching signature is a sink.
pub trait EventSink {
    /// Handle one event at the position described by `scope`.
    fn on_event(&mut self, scope: &Scope<'_>, event: ParseEvent<'_>) -> Result<(), Reject>;
}

impl<F> EventSink for F
where
    F: FnMut(&Scope<'_>, ParseEvent<'_>) -> Result<(), Reject>,
{
    fn on_event(&mut self, scope: &Scope<'_>, event: ParseEvent<'_>) -> Result<(), Reject> {
        self(scope, event)
    }
}
