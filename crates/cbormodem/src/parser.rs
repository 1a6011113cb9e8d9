//! The streaming CBOR parser implementation.
//!
//! This module provides [`StreamingParser`], a push parser for RFC 8949
//! CBOR: feed it byte chunks of any size and it drives a per-frame state
//! machine, delivering events into an [`EventSink`] as complete items and
//! structural boundaries are recognized. Nesting is handled with an explicit
//! bounded frame stack rather than recursion, so memory stays fixed and the
//! parse can suspend and resume at any byte boundary.
//!
//! # Examples
//!
//! ```rust
//! use cbormodem::{ParseEvent, ParserOptions, Reject, Scope, StreamingParser};
//!
//! let mut total = 0u64;
//! let mut parser = StreamingParser::new(
//!     ParserOptions::default(),
//!     &[],
//!     |_: &Scope<'_>, event: ParseEvent<'_>| -> Result<(), Reject> {
//!         if let ParseEvent::Uint(n) = event {
//!             total += n;
//!         }
//!         Ok(())
//!     },
//! );
//! // [1, 2, 3]
//! parser.parse(&[0x83, 0x01, 0x02, 0x03]).unwrap();
//! drop(parser);
//! assert_eq!(total, 6);
//! ```

use alloc::vec::Vec;

use log::trace;

use crate::{
    cbor::{self, Major},
    error::{ParseError, Status},
    event::{ParseEvent, Scope},
    item::{Item, Pending},
    options::ParserOptions,
    path::PathTracker,
    sink::{EventSink, Reject},
};

/// What the current frame is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubState {
    /// The next byte is an item head.
    Opcode,
    /// Accumulating a multi-byte big-endian head argument.
    Collect,
    /// Accumulating the one-byte extension of a simple value.
    SimpleExt,
    /// Routing string content into the scratch buffer.
    Collate,
    /// Inside an indefinite string: only same-type fragments or break.
    OnlySame,
}

/// Event to fire when the frame that pushed a child gets popped back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PopEvent {
    None,
    ArrayEnd,
    ObjectEnd,
    TagEnd,
    StrEnd,
    BlobEnd,
}

/// One level of the nesting stack.
#[derive(Debug, Clone, Copy)]
struct Frame {
    state: SubState,
    major: Major,
    /// Set on container frames with no length prefix; closed by break only.
    indefinite: bool,
    /// Items left for containers (keys plus values for maps), bytes left for
    /// strings and head collection.
    remaining: u64,
    /// Children completed so far; even means a map expects a key next.
    ordinal: u64,
    /// The last string flush below this frame was an intermediate chunk.
    intermediate: bool,
    /// The next key flush replaces the previous sibling key.
    fresh_key: bool,
    /// Path length to restore when this frame is popped back to.
    path_mark: usize,
    /// Path length where keys of the enclosing map splice in.
    key_mark: usize,
    pop_event: PopEvent,
    tag: u64,
}

impl Frame {
    fn root() -> Self {
        Self {
            state: SubState::Opcode,
            major: Major::Uint,
            indefinite: false,
            remaining: 0,
            ordinal: 0,
            intermediate: false,
            fresh_key: false,
            path_mark: 0,
            key_mark: 0,
            pop_event: PopEvent::None,
            tag: 0,
        }
    }
}

/// One entry of the layer stack: a sink plus the pattern list and path it
/// matches against. The root layer is installed at construction; nested
/// layers let a tag body or sub-document be handled by a different sink.
struct ParseLayer<S> {
    sink: S,
    tracker: PathTracker,
}

/// The streaming CBOR parser.
///
/// `StreamingParser` consumes raw CBOR bytes in arbitrary chunks via
/// [`parse`](Self::parse) and pushes [`ParseEvent`]s into its sink, together
/// with a [`Scope`] describing the current position and any pattern match.
/// All buffers are sized by [`ParserOptions`] at construction; nothing is
/// allocated afterwards.
///
/// The context is single-owner and not re-entrant: a sink cannot feed bytes
/// back into the parser that is calling it.
///
/// # Examples
///
/// ```rust
/// use cbormodem::{
///     EventSink, ParseEvent, ParserOptions, Reject, Scope, Status, StreamingParser,
/// };
///
/// struct Sum(u64);
///
/// impl EventSink for Sum {
///     fn on_event(&mut self, _: &Scope<'_>, event: ParseEvent<'_>) -> Result<(), Reject> {
///         if let ParseEvent::Uint(n) = event {
///             self.0 += n;
///         }
///         Ok(())
///     }
/// }
///
/// let mut parser = StreamingParser::new(ParserOptions::default(), &[], Sum(0));
/// let status = parser.parse(&[0x82, 0x18, 0x2a, 0x01]).unwrap(); // [42, 1]
/// assert_eq!(status, Status::Idle);
/// ```
pub struct StreamingParser<S: EventSink> {
    opts: ParserOptions,
    /// Frame stack; the first entry is the depth-zero root frame.
    st: Vec<Frame>,
    /// Layer stack; the first entry is the root sink and pattern list.
    pst: Vec<ParseLayer<S>>,
    /// Element index per open array, outermost first.
    idx: Vec<u64>,
    /// String content collates here and is flushed in bounded chunks.
    scratch: Vec<u8>,
    item: Item,
}

impl<S: EventSink> StreamingParser<S> {
    /// Creates a parser with the given capacities, registered path patterns,
    /// and event sink. Fires [`ParseEvent::Constructed`] into the sink.
    ///
    /// Pattern order matters: the first matching pattern wins, so register
    /// `x.*.*` ahead of `x.*` when both could apply.
    pub fn new(options: ParserOptions, patterns: &[&str], sink: S) -> Self {
        let opts = ParserOptions {
            max_depth: options.max_depth.max(2),
            string_chunk: options.string_chunk.max(1),
            max_layers: options.max_layers.max(1),
            ..options
        };
        let mut st = Vec::with_capacity(opts.max_depth);
        st.push(Frame::root());
        let mut pst = Vec::with_capacity(opts.max_layers);
        pst.push(ParseLayer {
            sink,
            tracker: PathTracker::new(opts.max_path, opts.max_wildcards, patterns),
        });
        let mut parser = Self {
            opts,
            st,
            pst,
            idx: Vec::with_capacity(opts.max_index_depth),
            scratch: Vec::with_capacity(opts.string_chunk),
            item: Item::default(),
        };
        let _ = parser.emit(ParseEvent::Constructed);
        parser
    }

    /// Consumes `input`, firing events as items complete.
    ///
    /// Returns [`Status::Idle`] when the bytes so far form one or more
    /// complete top-level items, [`Status::Continue`] when more input is
    /// needed. Errors are fatal: a [`ParseEvent::Failed`] is fired and the
    /// context should be discarded.
    pub fn parse(&mut self, input: &[u8]) -> Result<Status, ParseError> {
        match self.run(input) {
            Ok(status) => Ok(status),
            Err(err) => {
                let _ = self.emit(ParseEvent::Failed);
                Err(err)
            }
        }
    }

    /// Replaces the current layer's sink, firing [`ParseEvent::Destructed`]
    /// on the old one and [`ParseEvent::Constructed`] on the new one.
    /// Returns the old sink.
    pub fn change_sink(&mut self, sink: S) -> S {
        let _ = self.emit(ParseEvent::Destructed);
        let layer = self.pst.last_mut().expect("layer stack never empty");
        let old = core::mem::replace(&mut layer.sink, sink);
        let _ = self.emit(ParseEvent::Constructed);
        old
    }

    /// Pushes a new layer (sink plus pattern list) that receives all events
    /// until [`pop_layer`](Self::pop_layer). The new layer starts with an
    /// empty path of its own; the suspended layer's state is untouched.
    pub fn push_layer(&mut self, sink: S, patterns: &[&str]) -> Result<(), ParseError> {
        if self.pst.len() == self.opts.max_layers {
            return Err(ParseError::StackOverflow);
        }
        self.pst.push(ParseLayer {
            sink,
            tracker: PathTracker::new(self.opts.max_path, self.opts.max_wildcards, patterns),
        });
        let _ = self.emit(ParseEvent::Constructed);
        Ok(())
    }

    /// Pops the innermost layer pushed with [`push_layer`](Self::push_layer)
    /// and returns its sink after firing [`ParseEvent::Destructed`] into it.
    /// The root layer cannot be popped.
    pub fn pop_layer(&mut self) -> Option<S> {
        if self.pst.len() == 1 {
            return None;
        }
        let _ = self.emit(ParseEvent::Destructed);
        self.pst.pop().map(|layer| layer.sink)
    }

    /// The current position, as sinks see it during a callback.
    #[must_use]
    pub fn scope(&self) -> Scope<'_> {
        let layer = self.pst.last().expect("layer stack never empty");
        Scope {
            path: layer.tracker.bytes(),
            matched: layer.tracker.matched(),
            match_len: layer.tracker.match_len(),
            wild: layer.tracker.wildcards(),
            indices: &self.idx,
            depth: self.st.len() - 1,
        }
    }

    fn run(&mut self, input: &[u8]) -> Result<Status, ParseError> {
        for &byte in input {
            match self.top().state {
                SubState::Opcode => self.on_opcode(byte)?,
                SubState::Collect => self.on_collect(byte)?,
                SubState::SimpleExt => self.on_simple_ext(byte)?,
                SubState::Collate => self.on_collate(byte)?,
                SubState::OnlySame => self.on_fragment(byte)?,
            }
        }
        if self.st.len() == 1 && self.st[0].state == SubState::Opcode {
            Ok(Status::Idle)
        } else {
            Ok(Status::Continue)
        }
    }

    // ------------------------------------------------------------------
    // Byte dispatch
    // ------------------------------------------------------------------

    fn on_opcode(&mut self, byte: u8) -> Result<(), ParseError> {
        let major = Major::of(byte);
        let sm = byte & cbor::SUBMASK;
        self.top_mut().major = major;
        trace!("opc {}|{} depth {}", major as u8, sm, self.depth());

        match major {
            Major::Uint => {
                self.item.pending = Pending::Uint;
                if sm < cbor::SM_LEN1 {
                    self.item.raw = u64::from(sm);
                    return self.issue();
                }
                self.begin_collect(sm)
            }
            Major::Nint => {
                self.item.pending = Pending::Int;
                if sm < cbor::SM_LEN1 {
                    self.item.raw = u64::from(sm);
                    return self.issue();
                }
                self.begin_collect(sm)
            }
            Major::Bstr | Major::Tstr => self.on_string_head(major, sm),
            Major::Array => self.on_array_head(sm),
            Major::Map => self.on_map_head(sm),
            Major::Tag => {
                if sm < cbor::SM_LEN1 {
                    self.item.raw = u64::from(sm);
                    return self.enter_tag();
                }
                self.begin_collect(sm)
            }
            Major::Simple => self.on_simple_head(sm),
        }
    }

    /// The head of a byte or text string. The length is either inline, a
    /// multi-byte argument, or the indefinite marker announcing same-type
    /// fragments until break.
    fn on_string_head(&mut self, major: Major, sm: u8) -> Result<(), ParseError> {
        self.scratch.clear();
        // a chunk of a longer string is still in flight; no fresh start
        let continuing = self.parent().is_some_and(|p| p.intermediate);
        if !continuing {
            self.emit(if major == Major::Bstr {
                ParseEvent::BlobStart
            } else {
                ParseEvent::StrStart
            })?;
        }

        if sm == 0 {
            self.emit(if major == Major::Bstr {
                ParseEvent::BlobEnd(&[])
            } else {
                ParseEvent::StrEnd(&[])
            })?;
            return self.completed(false);
        }
        if sm < cbor::SM_LEN1 {
            let top = self.top_mut();
            top.indefinite = false;
            top.remaining = u64::from(sm);
            top.state = SubState::Collate;
            top.fresh_key = true;
            return Ok(());
        }
        if sm < cbor::SM_RESERVED {
            return self.begin_collect(sm);
        }
        if sm != cbor::SM_INDEFINITE {
            return Err(ParseError::BadCoding);
        }

        let mark = self.path_len();
        let top = self.top_mut();
        top.indefinite = true;
        top.path_mark = mark;
        let pop = if major == Major::Bstr {
            PopEvent::BlobEnd
        } else {
            PopEvent::StrEnd
        };
        self.push_frame(None, pop, SubState::OnlySame)
    }

    fn on_array_head(&mut self, sm: u8) -> Result<(), ParseError> {
        self.scratch.clear();
        let mark = self.path_len();
        self.top_mut().path_mark = mark;
        self.append_path(b"[]")?;
        if self.idx.len() == self.opts.max_index_depth {
            return Err(ParseError::StackOverflow);
        }
        self.idx.push(0);
        self.emit(ParseEvent::ArrayStart)?;

        if sm == 0 {
            return self.finish_empty_array();
        }
        if sm < cbor::SM_LEN1 {
            let top = self.top_mut();
            top.indefinite = false;
            top.remaining = u64::from(sm);
            return self.push_frame(None, PopEvent::ArrayEnd, SubState::Opcode);
        }
        if sm < cbor::SM_RESERVED {
            return self.begin_collect(sm);
        }
        if sm != cbor::SM_INDEFINITE {
            return Err(ParseError::BadCoding);
        }
        self.top_mut().indefinite = true;
        self.push_frame(None, PopEvent::ArrayEnd, SubState::Opcode)
    }

    fn on_map_head(&mut self, sm: u8) -> Result<(), ParseError> {
        self.scratch.clear();
        let mark = self.path_len();
        self.top_mut().path_mark = mark;
        self.emit(ParseEvent::ObjectStart)?;

        if sm == 0 {
            return self.finish_empty_map();
        }
        if sm < cbor::SM_LEN1 {
            let top = self.top_mut();
            top.indefinite = false;
            top.remaining = u64::from(sm) * 2;
            return self.push_frame(None, PopEvent::ObjectEnd, SubState::Opcode);
        }
        if sm < cbor::SM_RESERVED {
            return self.begin_collect(sm);
        }
        if sm != cbor::SM_INDEFINITE {
            return Err(ParseError::BadCoding);
        }
        self.top_mut().indefinite = true;
        self.push_frame(None, PopEvent::ObjectEnd, SubState::Opcode)
    }

    fn on_simple_head(&mut self, sm: u8) -> Result<(), ParseError> {
        match sm {
            cbor::SIMPLE_FALSE => {
                self.emit(ParseEvent::Boolean(false))?;
                self.completed(false)
            }
            cbor::SIMPLE_TRUE => {
                self.emit(ParseEvent::Boolean(true))?;
                self.completed(false)
            }
            cbor::SIMPLE_NULL => {
                self.emit(ParseEvent::Null)?;
                self.completed(false)
            }
            cbor::SIMPLE_UNDEFINED => {
                self.emit(ParseEvent::Undefined)?;
                self.completed(false)
            }
            cbor::SIMPLE_EXT8 => {
                self.top_mut().state = SubState::SimpleExt;
                Ok(())
            }
            cbor::SIMPLE_FLOAT16 => {
                self.begin_collect_wide(Pending::Float16, 2);
                Ok(())
            }
            cbor::SIMPLE_FLOAT32 => {
                self.begin_collect_wide(Pending::Float32, 4);
                Ok(())
            }
            cbor::SIMPLE_FLOAT64 => {
                self.begin_collect_wide(Pending::Float64, 8);
                Ok(())
            }
            cbor::SIMPLE_BREAK => {
                if !self.parent().is_some_and(|p| p.indefinite) {
                    return Err(ParseError::BadCoding);
                }
                self.completed(true)
            }
            other => {
                self.emit(ParseEvent::Simple(other))?;
                self.completed(false)
            }
        }
    }

    /// One-byte simple-value extension. RFC 8949 §3.3 forbids re-encoding
    /// the values an immediate head could carry.
    fn on_simple_ext(&mut self, byte: u8) -> Result<(), ParseError> {
        if byte <= cbor::SM_INDEFINITE {
            return Err(ParseError::BadCoding);
        }
        self.emit(ParseEvent::Simple(byte))?;
        self.completed(false)
    }

    /// One more byte of a multi-byte head argument; on the last byte the
    /// collected value becomes a scalar, a length, or a tag number.
    fn on_collect(&mut self, byte: u8) -> Result<(), ParseError> {
        self.item.absorb(byte);
        let top = self.top_mut();
        top.remaining -= 1;
        if top.remaining != 0 {
            return Ok(());
        }

        self.scratch.clear();
        let n = self.item.raw;
        match self.top().major {
            Major::Bstr | Major::Tstr => {
                if n == 0 {
                    if self.parent_is_indet_string() {
                        // an empty fragment contributes nothing
                        self.top_mut().state = SubState::OnlySame;
                        return Ok(());
                    }
                    self.emit(if self.top().major == Major::Bstr {
                        ParseEvent::BlobEnd(&[])
                    } else {
                        ParseEvent::StrEnd(&[])
                    })?;
                    return self.completed(false);
                }
                let top = self.top_mut();
                top.remaining = n;
                top.state = SubState::Collate;
                top.fresh_key = true;
                Ok(())
            }
            Major::Array => {
                if n == 0 {
                    return self.finish_empty_array();
                }
                self.top_mut().remaining = n;
                self.push_frame(None, PopEvent::ArrayEnd, SubState::Opcode)
            }
            Major::Map => {
                if n == 0 {
                    return self.finish_empty_map();
                }
                self.top_mut().remaining = n.saturating_mul(2);
                self.push_frame(None, PopEvent::ObjectEnd, SubState::Opcode)
            }
            Major::Tag => self.enter_tag(),
            _ => self.issue(),
        }
    }

    /// String content byte. The scratch buffer spills when full or when the
    /// byte budget for this piece runs out.
    fn on_collate(&mut self, byte: u8) -> Result<(), ParseError> {
        self.scratch.push(byte);
        let top = self.top_mut();
        top.remaining -= 1;
        if self.scratch.len() < self.opts.string_chunk && self.top().remaining > 0 {
            return Ok(());
        }
        self.flush_chunk()
    }

    /// Inside an indefinite string, only break or a definite fragment of the
    /// same major type is legal.
    fn on_fragment(&mut self, byte: u8) -> Result<(), ParseError> {
        if byte == cbor::BREAK {
            if !self.parent().is_some_and(|p| p.indefinite) {
                return Err(ParseError::BadCoding);
            }
            return self.completed(true);
        }

        let major = Major::of(byte);
        if self.parent().map(|p| p.major) != Some(major) {
            return Err(ParseError::BadCoding);
        }
        let sm = byte & cbor::SUBMASK;
        if sm == cbor::SM_INDEFINITE {
            return Err(ParseError::BadCoding);
        }
        self.top_mut().major = major;
        if sm < cbor::SM_LEN1 {
            if sm == 0 {
                return Ok(());
            }
            let top = self.top_mut();
            top.indefinite = false;
            top.remaining = u64::from(sm);
            top.state = SubState::Collate;
            return Ok(());
        }
        if sm >= cbor::SM_RESERVED {
            return Err(ParseError::BadCoding);
        }
        self.begin_collect(sm)
    }

    // ------------------------------------------------------------------
    // Shared transitions
    // ------------------------------------------------------------------

    fn begin_collect(&mut self, sm: u8) -> Result<(), ParseError> {
        if sm >= cbor::SM_RESERVED {
            return Err(ParseError::BadCoding);
        }
        self.item.raw = 0;
        let top = self.top_mut();
        top.state = SubState::Collect;
        top.remaining = 1 << (sm - cbor::SM_LEN1);
        Ok(())
    }

    fn begin_collect_wide(&mut self, pending: Pending, bytes: u64) {
        self.item.pending = pending;
        self.item.raw = 0;
        let top = self.top_mut();
        top.state = SubState::Collect;
        top.remaining = bytes;
    }

    /// Emit the assembled scalar and bubble completion.
    fn issue(&mut self) -> Result<(), ParseError> {
        let event = self.item.to_event();
        self.emit(event)?;
        self.completed(false)
    }

    /// A tag number is known; open the single-item enclosure for its body.
    fn enter_tag(&mut self) -> Result<(), ParseError> {
        let tag = self.item.raw;
        let mark = self.path_len();
        let top = self.top_mut();
        top.tag = tag;
        top.path_mark = mark;
        self.push_frame(Some(ParseEvent::TagStart(tag)), PopEvent::TagEnd, SubState::Opcode)
    }

    /// Spill the scratch buffer to the sink: a chunk if more bytes or
    /// fragments may follow, otherwise the string's end.
    fn flush_chunk(&mut self) -> Result<(), ParseError> {
        self.splice_key()?;

        let more_here = self.top().remaining > 0;
        let body = more_here || self.parent_is_indet_string();
        let blob = self.top().major == Major::Bstr;

        let chunk = core::mem::take(&mut self.scratch);
        let event = match (blob, body) {
            (false, true) => ParseEvent::StrChunk(&chunk),
            (false, false) => ParseEvent::StrEnd(&chunk),
            (true, true) => ParseEvent::BlobChunk(&chunk),
            (true, false) => ParseEvent::BlobEnd(&chunk),
        };
        let delivered = self.emit(event);
        self.scratch = chunk;
        delivered?;
        self.scratch.clear();

        let d = self.st.len();
        if d >= 2 {
            self.st[d - 2].intermediate = body;
        }
        if body {
            if !more_here {
                // fragment finished; the enclosing indefinite string decides
                // what comes next
                self.top_mut().state = SubState::OnlySame;
            }
            Ok(())
        } else {
            self.completed(false)
        }
    }

    /// When the flushed string is an even-ordinal child of a map, splice it
    /// into the path. A later key first truncates back to where keys of this
    /// map begin, replacing its sibling.
    fn splice_key(&mut self) -> Result<(), ParseError> {
        let d = self.st.len();
        if d < 2 {
            return Ok(());
        }
        let key_slot = {
            let parent = &self.st[d - 2];
            parent.major == Major::Map && parent.ordinal % 2 == 0
        };
        if !key_slot {
            return Ok(());
        }
        let key_mark = self.st[d - 1].key_mark;
        if self.st[d - 1].fresh_key {
            let layer = self.pst.last_mut().expect("layer stack never empty");
            layer.tracker.rewind(key_mark);
            if key_mark > 0 {
                layer.tracker.append(b".")?;
            }
        }
        let layer = self.pst.last_mut().expect("layer stack never empty");
        layer.tracker.append(&self.scratch)?;
        layer.tracker.check();
        self.st[d - 1].fresh_key = false;
        Ok(())
    }

    fn finish_empty_array(&mut self) -> Result<(), ParseError> {
        self.emit(ParseEvent::ArrayEnd)?;
        let mark = self.top().path_mark;
        self.truncate_path(mark);
        self.idx.pop();
        self.completed(false)
    }

    fn finish_empty_map(&mut self) -> Result<(), ParseError> {
        self.emit(ParseEvent::ObjectEnd)?;
        let mark = self.top().path_mark;
        self.truncate_path(mark);
        self.completed(false)
    }

    // ------------------------------------------------------------------
    // Frame stack
    // ------------------------------------------------------------------

    fn push_frame(
        &mut self,
        start: Option<ParseEvent<'_>>,
        pop_event: PopEvent,
        state: SubState,
    ) -> Result<(), ParseError> {
        if self.st.len() == self.opts.max_depth {
            return Err(ParseError::StackOverflow);
        }
        if let Some(event) = start {
            self.emit(event)?;
        }
        trace!("push from depth {}", self.depth());
        let key_mark = self.path_len();
        let (major, path_mark, tag) = {
            let top = self.top_mut();
            top.pop_event = pop_event;
            (top.major, top.path_mark, top.tag)
        };
        self.st.push(Frame {
            state,
            major,
            indefinite: false,
            remaining: 0,
            ordinal: 0,
            intermediate: false,
            fresh_key: false,
            path_mark,
            key_mark,
            pop_event: PopEvent::None,
            tag,
        });
        Ok(())
    }

    fn pop_frame(&mut self) -> Result<(), ParseError> {
        debug_assert!(self.st.len() > 1);
        self.st.pop();
        let top = *self.st.last().expect("frame stack never empty");
        trace!("pop to depth {}", self.depth());
        if top.pop_event == PopEvent::ArrayEnd {
            debug_assert!(!self.idx.is_empty());
            self.idx.pop();
        }
        if matches!(top.pop_event, PopEvent::StrEnd | PopEvent::BlobEnd) {
            // the string this frame was accumulating is over
            self.top_mut().intermediate = false;
        }
        self.truncate_path(top.path_mark);
        let event = match top.pop_event {
            PopEvent::None => return Ok(()),
            PopEvent::ArrayEnd => ParseEvent::ArrayEnd,
            PopEvent::ObjectEnd => ParseEvent::ObjectEnd,
            PopEvent::TagEnd => ParseEvent::TagEnd(top.tag),
            PopEvent::StrEnd => ParseEvent::StrEnd(&[]),
            PopEvent::BlobEnd => ParseEvent::BlobEnd(&[]),
        };
        self.emit(event)
    }

    /// An item finished at the current depth: ascend, crediting each
    /// ancestor, closing every determinate parent whose budget reaches zero.
    /// An indefinite parent only closes when the completion came from its
    /// break.
    fn completed(&mut self, mut from_break: bool) -> Result<(), ParseError> {
        let mut il = self.idx.len();
        self.top_mut().state = SubState::Opcode;

        while self.st.len() > 1 {
            let d = self.st.len();
            let (parent_major, parent_indefinite) = {
                let parent = &mut self.st[d - 2];
                parent.ordinal += 1;
                (parent.major, parent.indefinite)
            };
            if parent_major == Major::Array {
                debug_assert!(il > 0);
                il -= 1;
                self.idx[il] += 1;
            }
            if !from_break && parent_indefinite {
                trace!("completion stops at indefinite parent");
                break;
            }
            if !parent_indefinite {
                let parent = &mut self.st[d - 2];
                if parent.remaining > 0 {
                    parent.remaining -= 1;
                    if parent.remaining > 0 {
                        break;
                    }
                }
            }
            self.st[d - 2].state = SubState::Opcode;
            self.pop_frame()?;
            from_break = false;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn top(&self) -> &Frame {
        self.st.last().expect("frame stack never empty")
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.st.last_mut().expect("frame stack never empty")
    }

    fn parent(&self) -> Option<&Frame> {
        self.st.len().checked_sub(2).map(|i| &self.st[i])
    }

    fn parent_is_indet_string(&self) -> bool {
        self.parent()
            .is_some_and(|p| p.indefinite && matches!(p.major, Major::Bstr | Major::Tstr))
    }

    fn depth(&self) -> usize {
        self.st.len() - 1
    }

    fn path_len(&self) -> usize {
        self.pst
            .last()
            .expect("layer stack never empty")
            .tracker
            .len()
    }

    fn append_path(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        let tracker = &mut self.pst.last_mut().expect("layer stack never empty").tracker;
        tracker.append(bytes)?;
        tracker.check();
        Ok(())
    }

    fn truncate_path(&mut self, len: usize) {
        self.pst
            .last_mut()
            .expect("layer stack never empty")
            .tracker
            .truncate(len);
    }

    fn emit(&mut self, event: ParseEvent<'_>) -> Result<(), ParseError> {
        let depth = self.st.len() - 1;
        let indices = self.idx.as_slice();
        let layer = self.pst.last_mut().expect("layer stack never empty");
        let scope = Scope {
            path: layer.tracker.bytes(),
            matched: layer.tracker.matched(),
            match_len: layer.tracker.match_len(),
            wild: layer.tracker.wildcards(),
            indices,
            depth,
        };
        match layer.sink.on_event(&scope, event) {
            Ok(()) => Ok(()),
            Err(Reject) => Err(ParseError::RejectedCallback),
        }
    }
}

impl<S: EventSink> Drop for StreamingParser<S> {
    fn drop(&mut self) {
        let _ = self.emit(ParseEvent::Destructed);
    }
}
