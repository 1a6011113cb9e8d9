//! Extract a couple of fields from a CBOR document by path pattern, without
//! building a tree.
//!
//! Run with: `cargo run --example pick_fields`

use cbormodem::{ParseEvent, ParserOptions, Reject, Scope, StreamingParser};

/// {"device": {"id": 7, "name": "kitchen"}, "readings": [20, 21, 19]}
fn document() -> Vec<u8> {
    let mut doc = vec![0xa2];
    doc.push(0x66);
    doc.extend_from_slice(b"device");
    doc.push(0xa2);
    doc.push(0x62);
    doc.extend_from_slice(b"id");
    doc.push(0x07);
    doc.push(0x64);
    doc.extend_from_slice(b"name");
    doc.push(0x67);
    doc.extend_from_slice(b"kitchen");
    doc.push(0x68);
    doc.extend_from_slice(b"readings");
    doc.extend_from_slice(&[0x83, 0x14, 0x15, 0x13]);
    doc
}

fn main() {
    let patterns = ["device.id", "readings[]"];
    let mut parser = StreamingParser::new(
        ParserOptions::default(),
        &patterns,
        move |scope: &Scope<'_>, event: ParseEvent<'_>| -> Result<(), Reject> {
            if let ParseEvent::Uint(n) = event {
                match scope.matched() {
                    Some(0) => println!("device id: {n}"),
                    Some(1) => println!("reading #{}: {n}", scope.index().unwrap_or(0)),
                    _ => {}
                }
            }
            Ok(())
        },
    );

    // feed in small pieces to show that chunking does not matter
    for piece in document().chunks(5) {
        parser.parse(piece).expect("well-formed document");
    }
}
