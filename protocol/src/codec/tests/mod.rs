mod codec;

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::event::{Event, EventPayload, GasPowerLeft, SignedEventLocator};
use crate::types::llr::EpochVote;
use crate::types::misbehaviour::{EventsDoublesign, MisbehaviourProof};
use crate::types::primitive::{Address, Hash, Signature};
use crate::types::transaction::{AccessTuple, Transaction};
use crate::types::Balance;

// #####################
// Mock Primitive
// #####################

fn rand_hash(r: &mut StdRng) -> Hash {
    let mut bytes = [0u8; 32];
    r.fill(&mut bytes[..]);
    Hash::from(bytes)
}

fn rand_address(r: &mut StdRng) -> Address {
    let mut bytes = [0u8; 20];
    r.fill(&mut bytes[..]);
    Address::from(bytes)
}

fn rand_bytes(r: &mut StdRng, size: usize) -> Bytes {
    let mut bytes = vec![0u8; size];
    r.fill(&mut bytes[..]);
    Bytes::from(bytes)
}

fn rand_data(r: &mut StdRng) -> Bytes {
    let size = r.gen_range(0..300);
    rand_bytes(r, size)
}

fn rand_balance(r: &mut StdRng) -> Balance {
    let len = r.gen_range(0..8);
    let mut bytes = vec![0u8; len];
    r.fill(&mut bytes[..]);
    Balance::from_bytes_be(&bytes)
}

// #####################
// Mock Transaction
// #####################

fn mock_access_list(r: &mut StdRng, max_addrs: usize, max_keys: usize) -> Vec<AccessTuple> {
    (0..r.gen_range(0..max_addrs))
        .map(|_| AccessTuple {
            address:      rand_address(r),
            storage_keys: (0..r.gen_range(0..max_keys)).map(|_| rand_hash(r)).collect(),
        })
        .collect()
}

fn mock_legacy_tx(r: &mut StdRng) -> Transaction {
    Transaction::Legacy {
        nonce:     r.gen(),
        gas_price: rand_balance(r),
        gas:       257 + u64::from(r.gen::<u32>()),
        to:        None,
        value:     rand_balance(r),
        data:      rand_data(r),
        v:         Balance::from(u64::from(r.gen::<u32>())),
        r:         Balance::from_bytes_be(rand_hash(r).as_ref()),
        s:         Balance::from_bytes_be(rand_hash(r).as_ref()),
    }
}

fn mock_access_list_tx(r: &mut StdRng) -> Transaction {
    Transaction::AccessList {
        chain_id:    rand_balance(r),
        nonce:       r.gen(),
        gas_price:   rand_balance(r),
        gas:         r.gen(),
        to:          Some(rand_address(r)),
        value:       rand_balance(r),
        data:        rand_data(r),
        access_list: mock_access_list(r, 10, 10),
        v:           Balance::from(u64::from(r.gen::<u32>())),
        r:           Balance::from_bytes_be(rand_hash(r).as_ref()),
        s:           Balance::from_bytes_be(rand_hash(r).as_ref()),
    }
}

fn mock_dynamic_fee_tx(r: &mut StdRng) -> Transaction {
    Transaction::DynamicFee {
        chain_id:    rand_balance(r),
        nonce:       r.gen(),
        gas_tip_cap: rand_balance(r),
        gas_fee_cap: rand_balance(r),
        gas:         r.gen(),
        to:          Some(rand_address(r)),
        value:       rand_balance(r),
        data:        rand_data(r),
        access_list: mock_access_list(r, 10, 10),
        v:           Balance::from(u64::from(r.gen::<u32>())),
        r:           Balance::from_bytes_be(rand_hash(r).as_ref()),
        s:           Balance::from_bytes_be(rand_hash(r).as_ref()),
    }
}

// #####################
// Mock Event
// #####################

/// A minimal valid payload of the given version.
fn empty_event(version: u8) -> EventPayload {
    let mut payload = EventPayload::default();
    payload.event.version = version;
    if version == 0 {
        // version 0 requires epoch >= 256
        payload.event.epoch = 256;
    }
    payload.build()
}

/// A populated payload with a configurable number of transactions,
/// misbehaviour proofs and votes.
fn fake_event(txs_num: usize, mps_num: usize, bvs_num: usize, ers: bool) -> EventPayload {
    let r = &mut StdRng::seed_from_u64(0);
    let mut payload = EventPayload::default();
    payload.event.version = 1;
    payload.event.net_fork_id = r.gen();
    payload.event.lamport = 1000;
    payload.event.seq = r.gen::<u32>() >> 8;
    payload.event.creator = r.gen();
    payload.event.frame = r.gen::<u32>() >> 16;
    payload.event.creation_time = r.gen();
    payload.event.median_time = r.gen();
    payload.event.gas_power_used = r.gen();
    payload.event.gas_power_left = GasPowerLeft {
        gas: [r.gen(), r.gen()],
    };
    payload.event.extra = rand_bytes(r, 1);

    for i in 0..txs_num {
        let tx = match i % 3 {
            0 => mock_legacy_tx(r),
            1 => mock_access_list_tx(r),
            _ => mock_dynamic_fee_tx(r),
        };
        payload.txs.push(tx);
    }

    for _ in 0..mps_num {
        payload
            .misbehaviour_proofs
            .push(MisbehaviourProof::EventsDoublesign(EventsDoublesign {
                pair: [SignedEventLocator::default(), SignedEventLocator::default()],
            }));
    }

    if bvs_num > 0 {
        payload.block_votes.start = 1 + r.gen_range(0..1000);
        payload.block_votes.epoch = 1 + r.gen_range(0..1000);
        for _ in 0..bvs_num {
            payload.block_votes.votes.push(rand_hash(r));
        }
    }

    if ers {
        payload.epoch_vote = EpochVote {
            epoch: 1 + r.gen_range(0..1000),
            vote:  rand_hash(r),
        };
    }

    let mut parent = Event::default();
    parent.version = 1;
    parent.lamport = payload.event.lamport - 500;
    parent.epoch = payload.event.epoch;
    payload.event.parents = vec![parent.id().unwrap()];

    payload.build()
}

/// Signs the payload's locator hash with a real secp256k1 key.
fn sign_payload(mut payload: EventPayload, key: &common_crypto::Secp256k1PrivateKey) -> EventPayload {
    let digest = payload
        .event
        .locator()
        .unwrap()
        .hash_to_sign()
        .into_fixed_bytes();
    let compact = common_crypto::sign_digest(key, &digest).unwrap();
    let mut sig = [0u8; 65];
    sig[..64].copy_from_slice(&compact);
    payload.sig = Signature::from(sig);
    payload
}

fn gen_keypair(seed: u8) -> (
    common_crypto::Secp256k1PrivateKey,
    common_crypto::Secp256k1PublicKey,
) {
    use common_crypto::ToPublicKey;

    let mut bytes = [seed; 32];
    bytes[0] = 1;
    let priv_key = common_crypto::Secp256k1PrivateKey::try_from(bytes.as_ref()).unwrap();
    let pub_key = priv_key.pub_key();
    (priv_key, pub_key)
}

/// A signature checker bound to one public key.
fn verifier(
    pub_key: common_crypto::Secp256k1PublicKey,
) -> impl Fn(&Hash, &Signature) -> bool {
    move |digest: &Hash, sig: &Signature| {
        common_crypto::verify_digest(&pub_key, &digest.into_fixed_bytes(), sig.compact())
    }
}
