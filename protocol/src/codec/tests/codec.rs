use std::collections::HashMap;

use super::*;
use crate::codec::{CodecError, ProtocolCser};
use crate::cser::{binary, CserError};
use crate::fixed_codec::FixedCodec;
use crate::types::event::{empty_payload_hash, EventId, EventLocator};
use crate::types::llr::{SignedBlockVotes, SignedEpochVote, VoteError};
use crate::types::misbehaviour::{BlockVoteDoublesign, WrongBlockVote};

fn payload_cases() -> HashMap<&'static str, EventPayload> {
    let mut cases = HashMap::new();
    cases.insert("empty_v0", empty_event(0));
    cases.insert("empty_v1", empty_event(1));
    cases.insert("txs_v0", legacy_txs_event());
    cases.insert("txs_only", fake_event(7, 0, 0, false));
    cases.insert("votes_only", fake_event(0, 0, 4, true));
    cases.insert("full", fake_event(6, 2, 3, true));
    cases
}

// A version-0 payload: transactions counted and serialized inline instead of
// traveling as one opaque blob.
fn legacy_txs_event() -> EventPayload {
    let r = &mut rand::rngs::StdRng::seed_from_u64(3);
    let mut payload = empty_event(0);
    payload.txs = vec![mock_legacy_tx(r), mock_legacy_tx(r), mock_legacy_tx(r)];
    payload.build()
}

#[test]
fn test_event_payload_round_trip() {
    for (name, original) in payload_cases() {
        let buf = original.encode().unwrap();
        let decoded = EventPayload::decode(&buf).unwrap();
        assert_eq!(original, decoded, "{}", name);

        // decoding is pure and re-encoding is byte-identical
        assert_eq!(decoded, EventPayload::decode(&buf).unwrap(), "{}", name);
        assert_eq!(buf, decoded.encode().unwrap(), "{}", name);
    }
}

#[test]
fn test_event_header_round_trip() {
    for (name, original) in payload_cases() {
        let buf = original.event.encode().unwrap();
        let decoded = Event::decode(&buf).unwrap();
        assert_eq!(original.event, decoded, "{}", name);
        assert_eq!(buf, decoded.encode().unwrap(), "{}", name);
        assert_eq!(original.event.id().unwrap(), decoded.id().unwrap(), "{}", name);
    }
}

// The empty version-1 event is the minimal wire blob: a version marker in
// the bit region, zeroed words, no payload hash.
#[test]
fn test_empty_event_v1_is_minimal() {
    let payload = empty_event(1);
    assert!(!payload.event.any_payload());
    assert_eq!(empty_payload_hash(1), payload.event.payload_hash);

    let buf = payload.event.encode().unwrap();
    // 13 byte-region bytes, 39 bits packed into 5 bytes, 1 suffix byte
    assert_eq!(19, buf.len());

    let decoded = Event::decode(&buf).unwrap();
    assert_eq!(payload.event, decoded);
    assert_eq!(buf, decoded.encode().unwrap());
}

#[test]
fn test_truncation_rejected() {
    for (name, original) in [
        ("empty_v0", empty_event(0)),
        ("small", fake_event(2, 0, 2, true)),
    ] {
        let buf = original.encode().unwrap();
        for k in 0..buf.len() {
            assert!(
                EventPayload::decode(&buf[..k]).is_err(),
                "{}: prefix of {} bytes must not decode",
                name,
                k
            );
        }
    }
}

#[test]
fn test_trailing_byte_rejected() {
    let buf = fake_event(1, 0, 0, false).encode().unwrap();
    let mut extended = buf.to_vec();
    extended.push(0x00);
    assert!(EventPayload::decode(&extended).is_err());
}

#[test]
fn test_legacy_tx_round_trip() {
    // gas 0x100 is the smallest legacy gas limit that can travel
    let tx = Transaction::Legacy {
        nonce:     1,
        gas_price: Balance::from(1u64),
        gas:       0x100,
        to:        Some(Address::from([0u8; 20])),
        value:     Balance::default(),
        data:      Bytes::new(),
        v:         Balance::from(27u64),
        r:         Balance::from(1u64),
        s:         Balance::from(1u64),
    };
    let buf = tx.encode().unwrap();
    let decoded = Transaction::decode(&buf).unwrap();
    assert_eq!(tx, decoded);
    assert_eq!(buf, decoded.encode().unwrap());
}

#[test]
fn test_dynamic_fee_tx_round_trip() {
    let tx = Transaction::DynamicFee {
        chain_id:    Balance::from(1u64),
        nonce:       7,
        gas_tip_cap: Balance::from(2u64),
        gas_fee_cap: Balance::from(100u64),
        gas:         21_000,
        to:          Some(Address::from([0x11; 20])),
        value:       Balance::from(5u64),
        data:        Bytes::from(vec![0xCA, 0xFE]),
        access_list: vec![AccessTuple {
            address:      Address::from([0x22; 20]),
            storage_keys: vec![Hash::digest(b"slot")],
        }],
        v:           Balance::from(1u64),
        r:           Balance::from(3u64),
        s:           Balance::from(4u64),
    };

    // typed transactions open with the six-zero-bit marker
    let mut w = crate::cser::Writer::new();
    tx.marshal_cser(&mut w).unwrap();
    assert_eq!(0, w.bits.as_bytes()[0] & 0x3F);

    let buf = tx.encode().unwrap();
    let decoded = Transaction::decode(&buf).unwrap();
    assert_eq!(tx, decoded);
    assert_eq!(buf, decoded.encode().unwrap());
}

#[test]
fn test_access_list_tx_round_trip() {
    let r = &mut rand::rngs::StdRng::seed_from_u64(7);
    for _ in 0..8 {
        let tx = mock_access_list_tx(r);
        let buf = tx.encode().unwrap();
        assert_eq!(tx, Transaction::decode(&buf).unwrap());
    }
}

#[test]
fn test_legacy_gas_too_low_rejected() {
    let mut tx = mock_legacy_tx(&mut rand::rngs::StdRng::seed_from_u64(1));
    if let Transaction::Legacy { ref mut gas, .. } = tx {
        *gas = 0xFF;
    }
    assert_eq!(Err(CodecError::LegacyGasTooLow), tx.encode());
}

#[test]
fn test_unknown_tx_type_rejected() {
    // a well-formed body with type byte 3
    let buf = binary::marshal::<CodecError, _>(|w| {
        w.bits.write(6, 0);
        w.write_u8(3);
        w.write_u64(1);
        w.write_u64(300);
        w.write_big_uint(&Balance::from(1u64))?;
        w.write_big_uint(&Balance::from(1u64))?;
        w.write_bool(false);
        w.write_slice_bytes(&[])?;
        w.write_big_uint(&Balance::from(27u64))?;
        w.write_fixed_bytes(&[0u8; 64]);
        Ok(())
    })
    .unwrap();
    assert_eq!(Err(CodecError::UnknownTxType(3)), Transaction::decode(&buf));
}

#[test]
fn test_too_low_epoch() {
    let mut payload = empty_event(0);
    payload.event.epoch = 100;
    assert_eq!(Err(CodecError::TooLowEpoch), payload.event.encode());
}

#[test]
fn test_unknown_version_rejected() {
    let mut payload = empty_event(1);
    payload.event.version = 2;
    let payload = payload.build();
    let buf = payload.event.encode().unwrap();
    assert_eq!(Err(CodecError::UnknownVersion(2)), Event::decode(&buf));
}

#[test]
fn test_explicit_version_zero_rejected() {
    // version 0 is implied by the absent marker, spelling it out is not
    // canonical
    let buf = binary::marshal::<CodecError, _>(|w| {
        w.bits.write(2, 0);
        w.write_u8(0);
        Ok(())
    })
    .unwrap();
    assert_eq!(
        Err(CodecError::Cser(CserError::NonCanonicalEncoding)),
        Event::decode(&buf)
    );
}

#[test]
fn test_parent_lamport_underflow_rejected() {
    // hand-rolled version-1 header whose single parent claims a lamport
    // diff larger than the event's own lamport
    let buf = binary::marshal::<CodecError, _>(|w| {
        w.bits.write(2, 0);
        w.write_u8(1);
        w.write_u16(0); // net fork id
        w.write_u32(1); // epoch
        w.write_u32(5); // lamport
        w.write_u32(0); // creator
        w.write_u32(0); // seq
        w.write_u32(0); // frame
        w.write_u64(0); // creation time
        w.write_i64(0);
        w.write_u64(0);
        w.write_u64(0);
        w.write_u64(0);
        w.write_u32(1); // one parent
        w.write_u32(10); // diff 10 > lamport 5
        w.write_fixed_bytes(&[0xEE; 24]);
        w.write_bool(false);
        for _ in 0..4 {
            w.write_bool(false);
        }
        w.write_slice_bytes(&[])?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        Err(CodecError::Cser(CserError::MalformedEncoding)),
        Event::decode(&buf)
    );
}

#[test]
fn test_parent_older_than_child_rejected_on_encode() {
    let mut payload = empty_event(1);
    payload.event.lamport = 3;
    payload.event.parents = vec![EventId::from_parts(0, 10, [0xAB; 24])];
    assert_eq!(Err(CodecError::MalformedEvent), payload.event.encode());
}

#[test]
fn test_parent_suffix_reconstruction() {
    let mut parent = Event::default();
    parent.version = 1;
    parent.epoch = 9;
    parent.lamport = 40;
    let parent_id = parent.id().unwrap();

    let mut child = empty_event(1);
    child.event.epoch = 9;
    child.event.lamport = 41;
    child.event.parents = vec![parent_id];

    let buf = child.event.encode().unwrap();
    let decoded = Event::decode(&buf).unwrap();
    assert_eq!(vec![parent_id], decoded.parents);
    assert_eq!(parent_id.lookup_key(), decoded.parents[0].lookup_key());
}

#[test]
fn test_flag_content_mismatch_rejected_on_encode() {
    let mut payload = empty_event(1);
    payload.event.any_txs = true;
    assert_eq!(Err(CodecError::MalformedEvent), payload.encode());
}

#[test]
fn test_explicit_empty_payload_hash_rejected() {
    // a header claiming txs but committing to the empty payload hash
    let mut payload = empty_event(1);
    payload.event.any_txs = true;
    payload.event.payload_hash = empty_payload_hash(1);
    let buf = payload.event.encode().unwrap();
    assert_eq!(
        Err(CodecError::Cser(CserError::NonCanonicalEncoding)),
        Event::decode(&buf)
    );
}

#[test]
fn test_zero_block_votes_rejected() {
    // start of zero never appears under a set flag
    let mut payload = fake_event(0, 0, 2, false);
    payload.block_votes.start = 0;
    let payload = payload.build();
    let buf = payload.encode().unwrap();
    assert_eq!(
        Err(CodecError::Cser(CserError::NonCanonicalEncoding)),
        EventPayload::decode(&buf)
    );
}

#[test]
fn test_payload_hash_formula() {
    let payload = fake_event(4, 1, 2, true);
    let left = payload.txs_and_mps_hash();
    let right = Hash::merge(&payload.epoch_vote.hash(), &payload.block_votes.hash());
    assert_eq!(Hash::merge(&left, &right), payload.calc_payload_hash());
    assert_eq!(payload.calc_payload_hash(), payload.event.payload_hash);
}

#[test]
fn test_signed_block_votes_pack() {
    let (priv_key, pub_key) = gen_keypair(0x42);
    let payload = sign_payload(fake_event(5, 1, 3, true), &priv_key);
    let check = verifier(pub_key);

    let pack = SignedBlockVotes::from_payload(&payload).unwrap();
    assert_eq!(pack.calc_payload_hash(), payload.event.payload_hash);
    assert_eq!(payload.block_votes, pack.verify(&check).unwrap());

    // corrupting a sibling digest breaks the reconstructed root
    let mut corrupted = pack.clone();
    corrupted.epoch_vote_hash = Hash::digest(b"corrupted");
    assert_eq!(Err(VoteError::HashMismatch), corrupted.verify(&check));

    // a flipped signature still matches the hashes but not the key
    let mut forged = pack.clone();
    let mut sig = forged.signed.sig.as_bytes().to_vec();
    sig[3] ^= 0xFF;
    forged.signed.sig = Signature::from_bytes(Bytes::from(sig)).unwrap();
    assert_eq!(Err(VoteError::BadSignature), forged.verify(&check));

    // rlp form survives storage
    let stored = pack.encode_fixed().unwrap();
    assert_eq!(pack, SignedBlockVotes::decode_fixed(stored).unwrap());
}

#[test]
fn test_signed_epoch_vote_pack() {
    let (priv_key, pub_key) = gen_keypair(0x42);
    let payload = sign_payload(fake_event(2, 0, 2, true), &priv_key);
    let check = verifier(pub_key);

    let pack = SignedEpochVote::from_payload(&payload).unwrap();
    assert_eq!(pack.calc_payload_hash(), payload.event.payload_hash);
    assert_eq!(payload.epoch_vote, pack.verify(&check).unwrap());

    let mut corrupted = pack.clone();
    corrupted.block_votes_hash = Hash::digest(b"corrupted");
    assert_eq!(Err(VoteError::HashMismatch), corrupted.verify(&check));
}

#[test]
fn test_empty_pack_rejected() {
    let (priv_key, pub_key) = gen_keypair(0x42);
    let payload = sign_payload(fake_event(1, 0, 0, false), &priv_key);
    let pack = SignedBlockVotes::from_payload(&payload).unwrap();
    assert_eq!(
        Err(VoteError::Codec(CodecError::Cser(
            CserError::NonCanonicalEncoding
        ))),
        pack.verify(verifier(pub_key))
    );
}

// Two packs from the same creator voting differently for one block are an
// equivocation proof; agreeing packs are not.
#[test]
fn test_block_vote_doublesign_detection() {
    let (priv_key, pub_key) = gen_keypair(0x42);

    let base = fake_event(0, 0, 3, false);
    let block = base.block_votes.start + 1;

    let mut conflicting = base.clone();
    conflicting.block_votes.votes[1] = Hash::digest(b"other fork");
    let conflicting = conflicting.build();

    let pack_a =
        SignedBlockVotes::from_payload(&sign_payload(base.clone(), &priv_key)).unwrap();
    let pack_b =
        SignedBlockVotes::from_payload(&sign_payload(conflicting, &priv_key)).unwrap();

    let proof = BlockVoteDoublesign {
        block,
        pair: [pack_a.clone(), pack_b],
    };
    assert_ne!(proof.get_vote(0), proof.get_vote(1));
    proof.validate(verifier(pub_key.clone())).unwrap();

    // identical votes prove nothing
    let agreeing = BlockVoteDoublesign {
        block,
        pair: [pack_a.clone(), pack_a],
    };
    assert!(agreeing.validate(verifier(pub_key)).is_err());
}

#[test]
fn test_wrong_block_vote_requires_distinct_creators() {
    let (priv_key, pub_key) = gen_keypair(0x42);
    let base = fake_event(0, 0, 3, false);
    let block = base.block_votes.start;

    let mut accomplice = base.clone();
    accomplice.event.creator = base.event.creator.wrapping_add(1);
    let accomplice = accomplice.build();

    let pack_a = SignedBlockVotes::from_payload(&sign_payload(base, &priv_key)).unwrap();
    let pack_b =
        SignedBlockVotes::from_payload(&sign_payload(accomplice, &priv_key)).unwrap();

    let proof = WrongBlockVote {
        block,
        pals: [pack_a.clone(), pack_b],
        wrong_epoch: false,
    };
    proof.validate(verifier(pub_key.clone())).unwrap();

    // the culprit alone cannot incriminate itself twice
    let solo = WrongBlockVote {
        block,
        pals: [pack_a.clone(), pack_a],
        wrong_epoch: false,
    };
    assert!(solo.validate(verifier(pub_key)).is_err());
}

#[test]
fn test_misbehaviour_rlp_round_trip() {
    let (priv_key, _) = gen_keypair(0x42);
    let payload = sign_payload(fake_event(0, 0, 2, true), &priv_key);
    let bv_pack = SignedBlockVotes::from_payload(&payload).unwrap();
    let ev_pack = SignedEpochVote::from_payload(&payload).unwrap();

    let proofs = vec![
        MisbehaviourProof::EventsDoublesign(EventsDoublesign {
            pair: [SignedEventLocator::default(), SignedEventLocator::default()],
        }),
        MisbehaviourProof::BlockVoteDoublesign(BlockVoteDoublesign {
            block: bv_pack.val.start,
            pair:  [bv_pack.clone(), bv_pack.clone()],
        }),
        MisbehaviourProof::WrongBlockVote(WrongBlockVote {
            block:       bv_pack.val.start,
            pals:        [bv_pack.clone(), bv_pack],
            wrong_epoch: true,
        }),
        MisbehaviourProof::EpochVoteDoublesign(crate::types::misbehaviour::EpochVoteDoublesign {
            pair: [ev_pack.clone(), ev_pack.clone()],
        }),
        MisbehaviourProof::WrongEpochVote(crate::types::misbehaviour::WrongEpochVote {
            pals: [ev_pack.clone(), ev_pack],
        }),
    ];
    for proof in &proofs {
        let stored = proof.encode_fixed().unwrap();
        assert_eq!(*proof, MisbehaviourProof::decode_fixed(stored).unwrap());
    }

    // unknown discriminators never decode
    let mut s = rlp::RlpStream::new();
    s.begin_list(2);
    s.append(&200u8);
    s.append(&Vec::<u8>::new());
    assert!(rlp::decode::<MisbehaviourProof>(&s.out()).is_err());
}

#[test]
fn test_payload_with_misbehaviour_proofs_round_trip() {
    let payload = fake_event(0, 3, 0, false);
    let buf = payload.encode().unwrap();
    let decoded = EventPayload::decode(&buf).unwrap();
    assert_eq!(payload, decoded);
}

#[test]
fn test_locator_rlp_and_hash_to_sign() {
    let payload = fake_event(1, 0, 1, false);
    let locator = payload.event.locator().unwrap();

    let stored = locator.encode_fixed().unwrap();
    let restored = EventLocator::decode_fixed(stored).unwrap();
    assert_eq!(locator, restored);
    assert_eq!(locator.hash_to_sign(), restored.hash_to_sign());
}
