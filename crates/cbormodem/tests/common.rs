#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use cbormodem::{
    EventSink, ParseError, ParseEvent, ParserOptions, Reject, Scope, Status, StreamingParser,
};

/// Owned mirror of `ParseEvent`, so recorded streams can outlive the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Ev {
    Constructed,
    Destructed,
    Failed,
    Uint(u64),
    Int(i64),
    Float16(u16),
    Float32(f32),
    Float64(f64),
    Boolean(bool),
    Null,
    Undefined,
    Simple(u8),
    StrStart,
    StrChunk(Vec<u8>),
    StrEnd(Vec<u8>),
    BlobStart,
    BlobChunk(Vec<u8>),
    BlobEnd(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    ObjectStart,
    ObjectEnd,
    TagStart(u64),
    TagEnd(u64),
}

pub fn own(event: ParseEvent<'_>) -> Ev {
    match event {
        ParseEvent::Constructed => Ev::Constructed,
        ParseEvent::Destructed => Ev::Destructed,
        ParseEvent::Failed => Ev::Failed,
        ParseEvent::Uint(n) => Ev::Uint(n),
        ParseEvent::Int(n) => Ev::Int(n),
        ParseEvent::Float16(bits) => Ev::Float16(bits),
        ParseEvent::Float32(f) => Ev::Float32(f),
        ParseEvent::Float64(f) => Ev::Float64(f),
        ParseEvent::Boolean(b) => Ev::Boolean(b),
        ParseEvent::Null => Ev::Null,
        ParseEvent::Undefined => Ev::Undefined,
        ParseEvent::Simple(v) => Ev::Simple(v),
        ParseEvent::StrStart => Ev::StrStart,
        ParseEvent::StrChunk(b) => Ev::StrChunk(b.to_vec()),
        ParseEvent::StrEnd(b) => Ev::StrEnd(b.to_vec()),
        ParseEvent::BlobStart => Ev::BlobStart,
        ParseEvent::BlobChunk(b) => Ev::BlobChunk(b.to_vec()),
        ParseEvent::BlobEnd(b) => Ev::BlobEnd(b.to_vec()),
        ParseEvent::ArrayStart => Ev::ArrayStart,
        ParseEvent::ArrayEnd => Ev::ArrayEnd,
        ParseEvent::ObjectStart => Ev::ObjectStart,
        ParseEvent::ObjectEnd => Ev::ObjectEnd,
        ParseEvent::TagStart(t) => Ev::TagStart(t),
        ParseEvent::TagEnd(t) => Ev::TagEnd(t),
    }
}

/// One recorded callback: the event plus the scope as it looked at the time.
#[derive(Debug, Clone, PartialEq)]
pub struct Rec {
    pub event: Ev,
    pub path: Vec<u8>,
    pub matched: Option<usize>,
    pub wild: Vec<usize>,
    pub depth: usize,
    pub indices: Vec<u64>,
}

pub type Tape = Rc<RefCell<Vec<Rec>>>;

/// Sink that records every event; optionally rejects the `n`-th one.
pub struct Recorder {
    tape: Tape,
    reject_at: Option<usize>,
    seen: usize,
}

impl Recorder {
    pub fn new(tape: Tape) -> Self {
        Self {
            tape,
            reject_at: None,
            seen: 0,
        }
    }

    pub fn rejecting(tape: Tape, reject_at: usize) -> Self {
        Self {
            tape,
            reject_at: Some(reject_at),
            seen: 0,
        }
    }
}

impl EventSink for Recorder {
    fn on_event(&mut self, scope: &Scope<'_>, event: ParseEvent<'_>) -> Result<(), Reject> {
        self.tape.borrow_mut().push(Rec {
            event: own(event),
            path: scope.path().to_vec(),
            matched: scope.matched(),
            wild: scope.wildcards().to_vec(),
            depth: scope.depth(),
            indices: scope.indices().to_vec(),
        });
        let n = self.seen;
        self.seen += 1;
        if self.reject_at == Some(n) {
            return Err(Reject);
        }
        Ok(())
    }
}

/// Parse `doc` in one shot and return the full tape plus the final outcome.
pub fn record_with(
    options: ParserOptions,
    patterns: &[&str],
    doc: &[u8],
) -> (Vec<Rec>, Result<Status, ParseError>) {
    let tape = Tape::default();
    let result = {
        let mut parser = StreamingParser::new(options, patterns, Recorder::new(tape.clone()));
        parser.parse(doc)
    };
    let recs = tape.borrow().clone();
    (recs, result)
}

pub fn record(patterns: &[&str], doc: &[u8]) -> (Vec<Rec>, Result<Status, ParseError>) {
    record_with(ParserOptions::default(), patterns, doc)
}

/// Parse `doc` split into chunks derived from `splits`, feeding the stream
/// one piece at a time, and return the full tape.
pub fn record_chunks(patterns: &[&str], doc: &[u8], splits: &[usize]) -> Vec<Rec> {
    let tape = Tape::default();
    {
        let mut parser =
            StreamingParser::new(ParserOptions::default(), patterns, Recorder::new(tape.clone()));
        let mut at = 0;
        for &s in splits {
            if at >= doc.len() {
                break;
            }
            let size = 1 + s % (doc.len() - at);
            if parser.parse(&doc[at..at + size]).is_err() {
                break;
            }
            at += size;
        }
        if at < doc.len() {
            let _ = parser.parse(&doc[at..]);
        }
    }
    let recs = tape.borrow().clone();
    recs
}

/// Strip lifecycle notices, leaving only data and boundary events.
pub fn payload(recs: &[Rec]) -> Vec<Ev> {
    recs.iter()
        .filter(|r| !matches!(r.event, Ev::Constructed | Ev::Destructed | Ev::Failed))
        .map(|r| r.event.clone())
        .collect()
}

/// First recorded callback carrying exactly this event.
pub fn find<'a>(recs: &'a [Rec], event: &Ev) -> &'a Rec {
    recs.iter()
        .find(|r| &r.event == event)
        .unwrap_or_else(|| panic!("event {event:?} not recorded"))
}
