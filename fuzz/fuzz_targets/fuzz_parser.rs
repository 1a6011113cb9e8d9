#![no_main]

use arbitrary::Arbitrary;
use cbormodem::{ParseEvent, ParserOptions, Reject, Scope, StreamingParser};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    data: Vec<u8>,
    splits: Vec<u8>,
    patterns_sel: u8,
}

const PATTERN_SETS: &[&[&str]] = &[&[], &["a.b", "a.*"], &["*.id", "*"], &["x.*.*", "x.*"]];

fuzz_target!(|input: Input| {
    let patterns = PATTERN_SETS[input.patterns_sel as usize % PATTERN_SETS.len()];
    let mut events = 0u64;
    let mut parser = StreamingParser::new(
        ParserOptions {
            max_depth: 8,
            max_path: 64,
            string_chunk: 16,
            ..Default::default()
        },
        patterns,
        |scope: &Scope<'_>, event: ParseEvent<'_>| -> Result<(), Reject> {
            // exercise the accessors; none of them may panic
            let _ = scope.path();
            let _ = scope.wildcard(0);
            let _ = scope.index();
            if let ParseEvent::StrChunk(b) | ParseEvent::BlobChunk(b) = event {
                assert!(b.len() <= 16);
            }
            events += 1;
            Ok(())
        },
    );

    let mut at = 0;
    let mut split_idx = 0;
    while at < input.data.len() {
        let step = 1 + usize::from(*input.splits.get(split_idx).unwrap_or(&0)) % 32;
        split_idx = split_idx.wrapping_add(1);
        let end = (at + step).min(input.data.len());
        if parser.parse(&input.data[at..end]).is_err() {
            // errors are fatal; a failed context is discarded, never resumed
            break;
        }
        at = end;
    }

    drop(parser);
    let _ = events;
});
