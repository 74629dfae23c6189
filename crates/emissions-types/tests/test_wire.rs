use emissions_types::{Nonce, Nonces, ReputerRequestNonce, ReputerRequestNonces, WireMessage};
use proptest::prelude::*;

fn arbitrary_optional_nonce() -> impl Strategy<Value = Option<Nonce>> {
    prop::option::of(any::<i64>().prop_map(Nonce::new))
}

fn arbitrary_request_nonce() -> impl Strategy<Value = ReputerRequestNonce> {
    (arbitrary_optional_nonce(), arbitrary_optional_nonce()).prop_map(|(reputer, worker)| {
        ReputerRequestNonce {
            reputer_nonce: reputer,
            worker_nonce: worker,
        }
    })
}

proptest! {
    /// Property: decoding what we encoded gives back the same message, including unset fields
    #[test]
    fn prop_request_nonces_survive_encoding(nonces in prop::collection::vec(arbitrary_request_nonce(), 0..16)) {
        let msg = ReputerRequestNonces { nonces };
        let decoded = ReputerRequestNonces::from_wire_bytes(&msg.to_wire_bytes()).unwrap();
        prop_assert_eq!(decoded, msg);
    }

    /// Property: arbitrary bytes never panic the decoder
    #[test]
    fn prop_decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = ReputerRequestNonces::from_wire_bytes(&bytes);
        let _ = Nonces::from_wire_bytes(&bytes);
    }
}

#[test]
fn test_nonces_concatenation_appends() {
    // Protobuf repeated fields concatenate when two encodings are joined.
    let first = Nonces {
        nonces: vec![Nonce::new(1), Nonce::new(2)],
    };
    let second = Nonces {
        nonces: vec![Nonce::new(3)],
    };
    let mut bytes = first.to_wire_bytes();
    bytes.extend(second.to_wire_bytes());

    let merged = Nonces::from_wire_bytes(&bytes).unwrap();
    assert_eq!(
        merged.nonces,
        vec![Nonce::new(1), Nonce::new(2), Nonce::new(3)]
    );
}

#[test]
fn test_zero_nonce_inside_list_is_preserved() {
    // An element with a default height still occupies a slot in the list.
    let msg = Nonces {
        nonces: vec![Nonce::new(0), Nonce::new(9)],
    };
    let bytes = msg.to_wire_bytes();
    assert_eq!(bytes, vec![0x0A, 0x00, 0x0A, 0x02, 0x08, 0x09]);
    assert_eq!(Nonces::from_wire_bytes(&bytes).unwrap(), msg);
}

#[test]
fn test_json_field_names() {
    let msg = ReputerRequestNonce {
        reputer_nonce: Some(Nonce::new(12)),
        worker_nonce: None,
    };
    let json = serde_json::to_value(msg).unwrap();
    assert_eq!(json["reputer_nonce"]["block_height"], 12);
    assert!(json["worker_nonce"].is_null());
}
