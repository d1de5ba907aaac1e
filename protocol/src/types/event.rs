use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use lazy_static::lazy_static;

use crate::codec::{CodecError, ProtocolCser};
use crate::types::llr::{BlockVotes, EpochVote};
use crate::types::misbehaviour::MisbehaviourProof;
use crate::types::primitive::{Hash, Signature, SIGNATURE_LEN};
use crate::types::transaction::Transaction;
use crate::types::{Epoch, EventSeq, Frame, Lamport, Timestamp, ValidatorId};

/// Index of the short-window gas bucket.
pub const SHORT_TERM_GAS: usize = 0;
/// Index of the long-window gas bucket.
pub const LONG_TERM_GAS: usize = 1;
/// Number of gas buckets.
pub const GAS_POWER_CONFIGS: usize = 2;

/// Remaining emission allowance of a validator, one token bucket per window.
/// Arithmetic on the buckets is the caller's responsibility; the type only
/// reports its bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GasPowerLeft {
    pub gas: [u64; GAS_POWER_CONFIGS],
}

impl GasPowerLeft {
    /// The effective allowance: no more than the most constrained bucket.
    pub fn min(&self) -> u64 {
        let mut min = self.gas[0];
        for gas in self.gas {
            if min > gas {
                min = gas;
            }
        }
        min
    }

    pub fn max(&self) -> u64 {
        let mut max = self.gas[0];
        for gas in self.gas {
            if max < gas {
                max = gas;
            }
        }
        max
    }
}

impl fmt::Display for GasPowerLeft {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{short={}, long={}}}",
            self.gas[SHORT_TERM_GAS], self.gas[LONG_TERM_GAS]
        )
    }
}

/// Prefix of an event id recoverable from (epoch, lamport).
pub const EVENT_ID_PREFIX_LEN: usize = 8;
/// The id suffix carried on the wire for parent references.
pub const EVENT_ID_SUFFIX_LEN: usize = 24;

/// A 32-byte event id: big-endian epoch and lamport, then 24 bytes taken
/// from the event's base hash. Parents travel as the suffix only; the
/// decoder restores the prefix from its own coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId([u8; 32]);

impl EventId {
    pub fn from_parts(epoch: Epoch, lamport: Lamport, suffix: [u8; EVENT_ID_SUFFIX_LEN]) -> Self {
        let mut id = [0u8; 32];
        BigEndian::write_u32(&mut id[0..4], epoch);
        BigEndian::write_u32(&mut id[4..8], lamport);
        id[EVENT_ID_PREFIX_LEN..].copy_from_slice(&suffix);
        EventId(id)
    }

    pub fn epoch(&self) -> Epoch {
        BigEndian::read_u32(&self.0[0..4])
    }

    pub fn lamport(&self) -> Lamport {
        BigEndian::read_u32(&self.0[4..8])
    }

    pub fn suffix(&self) -> [u8; EVENT_ID_SUFFIX_LEN] {
        let mut suffix = [0u8; EVENT_ID_SUFFIX_LEN];
        suffix.copy_from_slice(&self.0[EVENT_ID_PREFIX_LEN..]);
        suffix
    }

    /// The `(epoch, lamport, suffix)` triple events are looked up by.
    pub fn lookup_key(&self) -> (Epoch, Lamport, [u8; EVENT_ID_SUFFIX_LEN]) {
        (self.epoch(), self.lamport(), self.suffix())
    }

    pub fn as_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.0)
    }
}

impl From<[u8; 32]> for EventId {
    fn from(bytes: [u8; 32]) -> Self {
        EventId(bytes)
    }
}

impl AsRef<[u8]> for EventId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// An event header. The four `any_*` flags mirror which payload parts are
/// present; `payload_hash` commits to the whole body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Event {
    pub version:         u8,
    pub net_fork_id:     u16,
    pub epoch:           Epoch,
    pub seq:             EventSeq,
    pub frame:           Frame,
    pub creator:         ValidatorId,
    pub lamport:         Lamport,
    pub creation_time:   Timestamp,
    pub median_time:     Timestamp,
    pub gas_power_used:  u64,
    pub gas_power_left:  GasPowerLeft,
    pub parents:         Vec<EventId>,
    pub prev_epoch_hash: Option<Hash>,

    pub any_txs:                 bool,
    pub any_misbehaviour_proofs: bool,
    pub any_epoch_vote:          bool,
    pub any_block_votes:         bool,

    pub payload_hash: Hash,
    pub extra:        Bytes,
}

impl Event {
    pub fn any_payload(&self) -> bool {
        self.any_txs || self.any_misbehaviour_proofs || self.any_epoch_vote || self.any_block_votes
    }

    /// Hash of the serialized header.
    pub fn base_hash(&self) -> Result<Hash, CodecError> {
        Ok(Hash::digest(self.encode()?))
    }

    pub fn id(&self) -> Result<EventId, CodecError> {
        let base = self.base_hash()?;
        let mut suffix = [0u8; EVENT_ID_SUFFIX_LEN];
        suffix.copy_from_slice(&base.as_ref()[EVENT_ID_PREFIX_LEN..]);
        Ok(EventId::from_parts(self.epoch, self.lamport, suffix))
    }

    pub fn locator(&self) -> Result<EventLocator, CodecError> {
        Ok(EventLocator {
            base_hash:    self.base_hash()?,
            net_fork_id:  self.net_fork_id,
            epoch:        self.epoch,
            seq:          self.seq,
            lamport:      self.lamport,
            creator:      self.creator,
            payload_hash: self.payload_hash,
        })
    }
}

/// The condensed header a validator actually signs. Vote packs carry it so
/// light verifiers never need the full event body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventLocator {
    pub base_hash:    Hash,
    pub net_fork_id:  u16,
    pub epoch:        Epoch,
    pub seq:          EventSeq,
    pub lamport:      Lamport,
    pub creator:      ValidatorId,
    pub payload_hash: Hash,
}

impl EventLocator {
    /// The digest the event signature is checked against.
    pub fn hash_to_sign(&self) -> Hash {
        let mut buf = Vec::with_capacity(2 * 32 + 2 + 4 * 4);
        buf.extend_from_slice(self.base_hash.as_ref());
        let mut word = [0u8; 4];
        BigEndian::write_u16(&mut word[..2], self.net_fork_id);
        buf.extend_from_slice(&word[..2]);
        BigEndian::write_u32(&mut word, self.epoch);
        buf.extend_from_slice(&word);
        BigEndian::write_u32(&mut word, self.seq);
        buf.extend_from_slice(&word);
        BigEndian::write_u32(&mut word, self.lamport);
        buf.extend_from_slice(&word);
        BigEndian::write_u32(&mut word, self.creator);
        buf.extend_from_slice(&word);
        buf.extend_from_slice(self.payload_hash.as_ref());
        Hash::digest(buf)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SignedEventLocator {
    pub locator: EventLocator,
    pub sig:     Signature,
}

impl SignedEventLocator {
    /// Approximate wire size, for bandwidth accounting.
    pub fn size(&self) -> u64 {
        (SIGNATURE_LEN + 3 * 32 + 4 * 4) as u64
    }
}

/// An event header together with its signature and the four body parts.
///
/// The epoch vote and the block votes keep value semantics with emptiness
/// predicates instead of `Option`: the payload hash tree digests absent
/// parts too, so their zero forms must stay hashable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventPayload {
    pub event:               Event,
    pub sig:                 Signature,
    pub txs:                 Vec<Transaction>,
    pub misbehaviour_proofs: Vec<MisbehaviourProof>,
    pub epoch_vote:          EpochVote,
    pub block_votes:         BlockVotes,
}

impl EventPayload {
    /// Recomputes the content flags and the payload hash from the body
    /// parts, returning a payload whose header cannot disagree with it.
    pub fn build(mut self) -> Self {
        self.event.any_txs = !self.txs.is_empty();
        self.event.any_misbehaviour_proofs = !self.misbehaviour_proofs.is_empty();
        self.event.any_epoch_vote = !self.epoch_vote.is_empty();
        self.event.any_block_votes = !self.block_votes.is_empty();
        self.event.payload_hash = if self.event.any_payload() {
            self.calc_payload_hash()
        } else {
            empty_payload_hash(self.event.version)
        };
        self
    }

    /// The digest the header commits to. Version 0 payloads carried
    /// transactions only; from version 1 on it is the two-level tree
    /// `H( H(txs, mps), H(epoch_vote, block_votes) )`.
    pub fn calc_payload_hash(&self) -> Hash {
        if self.event.version == 0 {
            return calc_txs_hash(&self.txs);
        }
        let left = self.txs_and_mps_hash();
        let right = Hash::merge(&self.epoch_vote.hash(), &self.block_votes.hash());
        Hash::merge(&left, &right)
    }

    /// Left branch of the payload hash tree, carried by vote packs as a
    /// sibling digest.
    pub fn txs_and_mps_hash(&self) -> Hash {
        Hash::merge(
            &calc_txs_hash(&self.txs),
            &calc_mps_hash(&self.misbehaviour_proofs),
        )
    }
}

fn calc_list_hash(item_hashes: impl Iterator<Item = Hash>, count: u32) -> Hash {
    let mut buf = Vec::with_capacity(4 + count as usize * 32);
    let mut count_be = [0u8; 4];
    BigEndian::write_u32(&mut count_be, count);
    buf.extend_from_slice(&count_be);
    for h in item_hashes {
        buf.extend_from_slice(h.as_ref());
    }
    Hash::digest(buf)
}

/// Canonical hash of the ordered transaction list.
pub fn calc_txs_hash(txs: &[Transaction]) -> Hash {
    calc_list_hash(txs.iter().map(Transaction::hash), txs.len() as u32)
}

/// Canonical hash of the misbehaviour-proof list.
pub fn calc_mps_hash(mps: &[MisbehaviourProof]) -> Hash {
    calc_list_hash(
        mps.iter().map(|mp| Hash::digest(rlp::encode(mp))),
        mps.len() as u32,
    )
}

/// The constant a header's payload hash takes when every flag is unset. It
/// must never appear on the wire together with a set flag.
pub fn empty_payload_hash(version: u8) -> Hash {
    lazy_static! {
        static ref EMPTY_V0: Hash = calc_txs_hash(&[]);
        static ref EMPTY_V1: Hash = {
            let mut empty = EventPayload::default();
            empty.event.version = 1;
            empty.calc_payload_hash()
        };
    }
    if version == 0 {
        // legacy payloads carried transactions only
        *EMPTY_V0
    } else {
        *EMPTY_V1
    }
}
