//! Grant payload vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use peergrant_core::protocol::payload::{decode_grants, encode_grants};

use vector_loader::TestVector;

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn grant_vectors() {
    let files = [
        "grants_single.json",
        "grants_single_b64.json",
        "grants_ordered.json",
        "grants_large_ids.json",
        "grants_empty_map.json",
        "grants_empty_path.json",
        "grants_three_ids.json",
        "grants_non_integer_id.json",
        "grants_key_not_array.json",
        "grants_payload_not_map.json",
        "grants_negative_id.json",
        "grants_id_too_large.json",
        "grants_mask_not_integer.json",
        "grants_mask_undefined_bits.json",
        "grants_mask_too_large.json",
        "grants_duplicate_path.json",
        "grants_truncated.json",
    ];

    for f in files {
        let v = load(f);
        let raw = v.payload.decode();
        let res = decode_grants(&raw);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.response_code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let grants = res.expect("expected ok grants");
        let ex = v.expect.expect("missing expect block");
        assert_eq!(grants.len(), ex.len(), "vector={}", v.description);
        for (g, e) in grants.iter().zip(&ex) {
            assert_eq!(g.path().to_string(), e.path, "vector={}", v.description);
            assert_eq!(g.access().bits(), e.access, "vector={}", v.description);
        }
    }
}

#[test]
fn reencoding_preserves_order_and_masks() {
    for f in ["grants_single.json", "grants_ordered.json", "grants_large_ids.json"] {
        let v = load(f);
        let raw = v.payload.decode();
        let grants = decode_grants(&raw).unwrap();

        let again = decode_grants(&encode_grants(&grants).unwrap()).unwrap();
        assert_eq!(grants, again, "vector={}", v.description);
    }
}

#[test]
fn encoder_emits_minimal_cbor() {
    let v = load("grants_ordered.json");
    let raw = v.payload.decode();
    let grants = decode_grants(&raw).unwrap();
    assert_eq!(encode_grants(&grants).unwrap(), raw);
}
