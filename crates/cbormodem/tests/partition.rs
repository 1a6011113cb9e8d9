//! Property: feeding a document in arbitrary chunk sizes must produce the
//! exact event stream the whole buffer produces, and every start event must
//! pair with one end event at the same depth, in LIFO order.

mod common;

use common::{payload, record, record_chunks, Ev, Rec};
use quickcheck::QuickCheck;

struct Doc {
    patterns: &'static [&'static str],
    bytes: Vec<u8>,
}

fn corpus() -> Vec<Doc> {
    let mut docs = Vec::new();

    docs.push(Doc {
        patterns: &[],
        bytes: vec![0x80],
    });
    docs.push(Doc {
        patterns: &[],
        bytes: vec![0x17],
    });
    // {"a": {"b": 42}, "c": 43}
    docs.push(Doc {
        patterns: &["a.b", "a.*"],
        bytes: vec![
            0xa2, 0x61, b'a', 0xa1, 0x61, b'b', 0x18, 0x2a, 0x61, b'c', 0x18, 0x2b,
        ],
    });
    // (_ "hello", "    ")
    {
        let mut bytes = vec![0x7f, 0x65];
        bytes.extend_from_slice(b"hello");
        bytes.push(0x64);
        bytes.extend_from_slice(b"    ");
        bytes.push(0xff);
        docs.push(Doc {
            patterns: &[],
            bytes,
        });
    }
    // 0("2024-01-01T00:00:00Z")
    {
        let mut bytes = vec![0xc0, 0x74];
        bytes.extend_from_slice(b"2024-01-01T00:00:00Z");
        docs.push(Doc {
            patterns: &[],
            bytes,
        });
    }
    // {"cfg": {"limits": [1, 2, 3], "names": ["ab", "cd"]}, "on": true}
    {
        let mut bytes = vec![0xa2];
        bytes.push(0x63);
        bytes.extend_from_slice(b"cfg");
        bytes.push(0xa2);
        bytes.push(0x66);
        bytes.extend_from_slice(b"limits");
        bytes.extend_from_slice(&[0x83, 0x01, 0x02, 0x03]);
        bytes.push(0x65);
        bytes.extend_from_slice(b"names");
        bytes.extend_from_slice(&[0x82, 0x62, b'a', b'b', 0x62, b'c', b'd']);
        bytes.push(0x62);
        bytes.extend_from_slice(b"on");
        bytes.push(0xf5);
        docs.push(Doc {
            patterns: &["cfg.limits", "cfg.*"],
            bytes,
        });
    }
    // [false, true, null, undefined, 1.0f16, 100000.0f32, 1.5f64]
    docs.push(Doc {
        patterns: &[],
        bytes: vec![
            0x87, 0xf4, 0xf5, 0xf6, 0xf7, 0xf9, 0x3c, 0x00, 0xfa, 0x47, 0xc3, 0x50, 0x00, 0xfb,
            0x3f, 0xf8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ],
    });
    // a 300-byte string crosses the scratch boundary
    {
        let mut bytes = vec![0x79, 0x01, 0x2c];
        bytes.extend_from_slice(&[b'x'; 300]);
        docs.push(Doc {
            patterns: &[],
            bytes,
        });
    }
    // {_ "a": [_ 1, 2], "b": null}
    docs.push(Doc {
        patterns: &["a"],
        bytes: vec![
            0xbf, 0x61, b'a', 0x9f, 0x01, 0x02, 0xff, 0x61, b'b', 0xf6, 0xff,
        ],
    });

    docs
}

#[test]
fn partition_identity_quickcheck() {
    fn prop(sel: u8, splits: Vec<usize>) -> bool {
        let docs = corpus();
        let doc = &docs[sel as usize % docs.len()];
        let (whole, _) = record(doc.patterns, &doc.bytes);
        let split = record_chunks(doc.patterns, &doc.bytes, &splits);
        whole == split
    }

    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(u8, Vec<usize>) -> bool);
}

fn start_of(ev: &Ev) -> Option<u8> {
    match ev {
        Ev::ArrayStart => Some(0),
        Ev::ObjectStart => Some(1),
        Ev::TagStart(_) => Some(2),
        Ev::StrStart => Some(3),
        Ev::BlobStart => Some(4),
        _ => None,
    }
}

fn end_of(ev: &Ev) -> Option<u8> {
    match ev {
        Ev::ArrayEnd => Some(0),
        Ev::ObjectEnd => Some(1),
        Ev::TagEnd(_) => Some(2),
        Ev::StrEnd(_) => Some(3),
        Ev::BlobEnd(_) => Some(4),
        _ => None,
    }
}

fn assert_balanced(recs: &[Rec]) {
    let mut open: Vec<(u8, usize)> = Vec::new();
    for rec in recs {
        if matches!(
            rec.event,
            Ev::Constructed | Ev::Destructed | Ev::Failed | Ev::StrChunk(_) | Ev::BlobChunk(_)
        ) {
            continue;
        }
        if let Some(kind) = start_of(&rec.event) {
            open.push((kind, rec.depth));
        } else if let Some(kind) = end_of(&rec.event) {
            let (opened, depth) = open.pop().expect("end without start");
            assert_eq!(opened, kind, "mismatched start/end kinds");
            assert_eq!(depth, rec.depth, "start and end at different depths");
        }
    }
    assert!(open.is_empty(), "unclosed items: {open:?}");
}

#[test]
fn starts_and_ends_pair_in_lifo_order() {
    for doc in corpus() {
        let (recs, status) = record(doc.patterns, &doc.bytes);
        assert!(status.is_ok(), "corpus doc failed to parse");
        assert_balanced(&recs);
        let last = payload(&recs);
        assert!(!last.is_empty());
    }
}
