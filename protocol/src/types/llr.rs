use std::error::Error;

use byteorder::{BigEndian, ByteOrder};
use derive_more::{Display, From};
use log::debug;

use crate::codec::CodecError;
use crate::cser::CserError;
use crate::types::event::{EventPayload, SignedEventLocator};
use crate::types::primitive::{Hash, Signature};
use crate::types::{BlockIndex, Epoch};
use crate::{ProtocolError, ProtocolErrorKind};

// Validators piggyback finality votes inside the events they emit. The types
// here slice a vote part out of a full event and keep just enough sibling
// digests to re-derive the payload hash the event signature commits to, so a
// pack is verifiable without the transactions it traveled with.

/// A batch of votes for consecutive blocks `start, start+1, ...`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockVotes {
    pub start: BlockIndex,
    pub epoch: Epoch,
    pub votes: Vec<Hash>,
}

impl BlockVotes {
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Index of the last block this batch votes for.
    pub fn last_block(&self) -> BlockIndex {
        if self.votes.is_empty() {
            return self.start.saturating_sub(1);
        }
        self.start + self.votes.len() as u64 - 1
    }

    pub fn hash(&self) -> Hash {
        let mut buf = Vec::with_capacity(16 + 32 * self.votes.len());
        let mut word8 = [0u8; 8];
        BigEndian::write_u64(&mut word8, self.start);
        buf.extend_from_slice(&word8);
        let mut word4 = [0u8; 4];
        BigEndian::write_u32(&mut word4, self.epoch);
        buf.extend_from_slice(&word4);
        // the length pins the batch against extension
        BigEndian::write_u32(&mut word4, self.votes.len() as u32);
        buf.extend_from_slice(&word4);
        for vote in &self.votes {
            buf.extend_from_slice(vote.as_ref());
        }
        Hash::digest(buf)
    }
}

/// A vote to seal an epoch. Epoch zero means the part is absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EpochVote {
    pub epoch: Epoch,
    pub vote:  Hash,
}

impl EpochVote {
    pub fn is_empty(&self) -> bool {
        self.epoch == 0
    }

    pub fn hash(&self) -> Hash {
        let mut buf = Vec::with_capacity(4 + 32);
        let mut word = [0u8; 4];
        BigEndian::write_u32(&mut word, self.epoch);
        buf.extend_from_slice(&word);
        buf.extend_from_slice(self.vote.as_ref());
        Hash::digest(buf)
    }
}

#[derive(Debug, Display, From, PartialEq)]
pub enum VoteError {
    #[display(fmt = "vote pack codec: {}", _0)]
    Codec(CodecError),

    #[display(fmt = "signature does not verify against the event locator")]
    #[from(ignore)]
    BadSignature,

    #[display(fmt = "reconstructed payload hash differs from the signed one")]
    #[from(ignore)]
    HashMismatch,
}

impl Error for VoteError {}

impl From<CserError> for VoteError {
    fn from(err: CserError) -> Self {
        VoteError::Codec(CodecError::Cser(err))
    }
}

impl From<VoteError> for ProtocolError {
    fn from(err: VoteError) -> ProtocolError {
        ProtocolError::new(ProtocolErrorKind::Llr, Box::new(err))
    }
}

/// Block votes extracted from an event, verifiable on their own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignedBlockVotes {
    pub signed:           SignedEventLocator,
    pub txs_and_mps_hash: Hash,
    pub epoch_vote_hash:  Hash,
    pub val:              BlockVotes,
}

impl SignedBlockVotes {
    /// Slices the block votes out of a full event, computing the sibling
    /// digests of the parts left behind.
    pub fn from_payload(e: &EventPayload) -> Result<Self, CodecError> {
        Ok(SignedBlockVotes {
            signed:           SignedEventLocator {
                locator: e.event.locator()?,
                sig:     e.sig,
            },
            txs_and_mps_hash: e.txs_and_mps_hash(),
            epoch_vote_hash:  e.epoch_vote.hash(),
            val:              e.block_votes.clone(),
        })
    }

    /// Rebuilds the payload hash from the carried votes plus the sibling
    /// digests. Pair order is fixed by the hash tree.
    pub fn calc_payload_hash(&self) -> Hash {
        let votes_sub_hash = Hash::merge(&self.epoch_vote_hash, &self.val.hash());
        Hash::merge(&self.txs_and_mps_hash, &votes_sub_hash)
    }

    /// Yields the votes iff the pack is structurally sound, the rebuilt
    /// payload hash matches the signed one and the signature verifies.
    pub fn verify<F>(&self, check_sig: F) -> Result<BlockVotes, VoteError>
    where
        F: Fn(&Hash, &Signature) -> bool,
    {
        if self.val.is_empty() || self.val.start == 0 || self.val.epoch == 0 {
            return Err(CserError::NonCanonicalEncoding.into());
        }
        if self.calc_payload_hash() != self.signed.locator.payload_hash {
            debug!(
                "block votes pack of creator {} rejected: payload hash mismatch",
                self.signed.locator.creator
            );
            return Err(VoteError::HashMismatch);
        }
        if !check_sig(&self.signed.locator.hash_to_sign(), &self.signed.sig) {
            debug!(
                "block votes pack of creator {} rejected: bad signature",
                self.signed.locator.creator
            );
            return Err(VoteError::BadSignature);
        }
        Ok(self.val.clone())
    }

    /// Approximate wire size, for bandwidth accounting.
    pub fn size(&self) -> u64 {
        self.signed.size() + self.val.votes.len() as u64 * 32 + 32 * 2 + 8 + 4
    }
}

/// An epoch vote extracted from an event, verifiable on its own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignedEpochVote {
    pub signed:           SignedEventLocator,
    pub txs_and_mps_hash: Hash,
    pub block_votes_hash: Hash,
    pub val:              EpochVote,
}

impl SignedEpochVote {
    pub fn from_payload(e: &EventPayload) -> Result<Self, CodecError> {
        Ok(SignedEpochVote {
            signed:           SignedEventLocator {
                locator: e.event.locator()?,
                sig:     e.sig,
            },
            txs_and_mps_hash: e.txs_and_mps_hash(),
            block_votes_hash: e.block_votes.hash(),
            val:              e.epoch_vote,
        })
    }

    pub fn calc_payload_hash(&self) -> Hash {
        let votes_sub_hash = Hash::merge(&self.val.hash(), &self.block_votes_hash);
        Hash::merge(&self.txs_and_mps_hash, &votes_sub_hash)
    }

    pub fn verify<F>(&self, check_sig: F) -> Result<EpochVote, VoteError>
    where
        F: Fn(&Hash, &Signature) -> bool,
    {
        if self.val.is_empty() {
            return Err(CserError::NonCanonicalEncoding.into());
        }
        if self.calc_payload_hash() != self.signed.locator.payload_hash {
            debug!(
                "epoch vote pack of creator {} rejected: payload hash mismatch",
                self.signed.locator.creator
            );
            return Err(VoteError::HashMismatch);
        }
        if !check_sig(&self.signed.locator.hash_to_sign(), &self.signed.sig) {
            debug!(
                "epoch vote pack of creator {} rejected: bad signature",
                self.signed.locator.creator
            );
            return Err(VoteError::BadSignature);
        }
        Ok(self.val)
    }

    pub fn size(&self) -> u64 {
        self.signed.size() + 32 + 32 * 2 + 4 + 4
    }
}
