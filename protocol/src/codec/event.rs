use bytes::Bytes;

use crate::codec::{
    transaction, CodecError, ProtocolCser, MAX_SERIALIZATION_VERSION, PROTOCOL_MAX_MSG_SIZE,
};
use crate::cser::{CserError, Reader, Writer};
use crate::types::event::{
    empty_payload_hash, Event, EventId, EventPayload, GasPowerLeft, EVENT_ID_SUFFIX_LEN,
};
use crate::types::llr::{BlockVotes, EpochVote};
use crate::types::misbehaviour::MisbehaviourProof;
use crate::types::primitive::{Hash, Signature, HASH_LEN, SIGNATURE_LEN};
use crate::types::transaction::Transaction;

// Event header and body codecs. The header field order is the wire contract;
// see the marshal path for the authoritative sequence. Parents and the
// median time travel as differences against the event's own coordinates.

const MAX_PARENTS: u32 = (PROTOCOL_MAX_MSG_SIZE / 24) as u32;
const MAX_BLOCK_VOTES: u32 = (PROTOCOL_MAX_MSG_SIZE / 32) as u32;
// a serialized transaction is never smaller than its 64-byte signature words
const MAX_TXS_COUNT: u64 = (PROTOCOL_MAX_MSG_SIZE / 64) as u64;

impl ProtocolCser for Event {
    fn marshal_cser(&self, w: &mut Writer) -> Result<(), CodecError> {
        if self.version > 0 {
            // zero marker bits distinguish a version byte from the epoch
            // word of a version-0 header
            w.bits.write(2, 0);
            w.write_u8(self.version);
        } else if self.epoch < 256 {
            return Err(CodecError::TooLowEpoch);
        }

        if self.version > 0 {
            w.write_u16(self.net_fork_id);
        }
        w.write_u32(self.epoch);
        w.write_u32(self.lamport);
        w.write_u32(self.creator);
        w.write_u32(self.seq);
        w.write_u32(self.frame);
        w.write_u64(self.creation_time);
        let median_time_diff = (self.creation_time as i64).wrapping_sub(self.median_time as i64);
        w.write_i64(median_time_diff);

        w.write_u64(self.gas_power_used);
        w.write_u64(self.gas_power_left.gas[0]);
        w.write_u64(self.gas_power_left.gas[1]);

        w.write_u32(self.parents.len() as u32);
        for p in &self.parents {
            if self.lamport < p.lamport() {
                // a child is never older than its parent
                return Err(CodecError::MalformedEvent);
            }
            w.write_u32(self.lamport - p.lamport());
            w.write_fixed_bytes(&p.suffix());
        }

        w.write_bool(self.prev_epoch_hash.is_some());
        if let Some(h) = &self.prev_epoch_hash {
            w.write_fixed_bytes(h.as_ref());
        }

        w.write_bool(self.any_txs);
        if self.version > 0 {
            w.write_bool(self.any_misbehaviour_proofs);
            w.write_bool(self.any_epoch_vote);
            w.write_bool(self.any_block_votes);
        }

        if self.any_payload() {
            w.write_fixed_bytes(self.payload_hash.as_ref());
        }

        w.write_slice_bytes(&self.extra)?;
        Ok(())
    }

    fn unmarshal_cser(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let mut version = 0u8;
        if r.bits.view(2)? == 0 {
            r.bits.read(2)?;
            version = r.read_u8()?;
            if version == 0 {
                // version 0 is implied by the absent marker
                return Err(CserError::NonCanonicalEncoding.into());
            }
        }
        if version > MAX_SERIALIZATION_VERSION {
            return Err(CodecError::UnknownVersion(version));
        }

        let net_fork_id = if version > 0 { r.read_u16()? } else { 0 };
        let epoch = r.read_u32()?;
        let lamport = r.read_u32()?;
        let creator = r.read_u32()?;
        let seq = r.read_u32()?;
        let frame = r.read_u32()?;
        let creation_time = r.read_u64()?;
        let median_time_diff = r.read_i64()?;

        let gas_power_used = r.read_u64()?;
        let gas_power_left = GasPowerLeft {
            gas: [r.read_u64()?, r.read_u64()?],
        };

        let parents_num = r.read_u32()?;
        if parents_num > MAX_PARENTS {
            return Err(CserError::TooLargeAlloc.into());
        }
        let mut parents = Vec::with_capacity(parents_num as usize);
        for _ in 0..parents_num {
            let lamport_diff = r.read_u32()?;
            let parent_lamport = lamport
                .checked_sub(lamport_diff)
                .ok_or(CserError::MalformedEncoding)?;
            let mut suffix = [0u8; EVENT_ID_SUFFIX_LEN];
            r.read_fixed_bytes(&mut suffix)?;
            parents.push(EventId::from_parts(epoch, parent_lamport, suffix));
        }

        let prev_epoch_hash = if r.read_bool()? {
            let mut h = [0u8; HASH_LEN];
            r.read_fixed_bytes(&mut h)?;
            Some(Hash::from(h))
        } else {
            None
        };

        let any_txs = r.read_bool()?;
        let any_misbehaviour_proofs = version > 0 && r.read_bool()?;
        let any_epoch_vote = version > 0 && r.read_bool()?;
        let any_block_votes = version > 0 && r.read_bool()?;

        let any_payload = any_txs || any_misbehaviour_proofs || any_epoch_vote || any_block_votes;
        let payload_hash = if any_payload {
            let mut h = [0u8; HASH_LEN];
            r.read_fixed_bytes(&mut h)?;
            let h = Hash::from(h);
            if h == empty_payload_hash(version) {
                // the empty hash is implied when no flag is set, never spelled
                return Err(CserError::NonCanonicalEncoding.into());
            }
            h
        } else {
            empty_payload_hash(version)
        };

        let extra = Bytes::from(r.read_slice_bytes(PROTOCOL_MAX_MSG_SIZE)?);

        if version == 0 && epoch < 256 {
            return Err(CodecError::TooLowEpoch);
        }

        Ok(Event {
            version,
            net_fork_id,
            epoch,
            seq,
            frame,
            creator,
            lamport,
            creation_time,
            median_time: (creation_time as i64).wrapping_sub(median_time_diff) as u64,
            gas_power_used,
            gas_power_left,
            parents,
            prev_epoch_hash,
            any_txs,
            any_misbehaviour_proofs,
            any_epoch_vote,
            any_block_votes,
            payload_hash,
            extra,
        })
    }
}

impl ProtocolCser for BlockVotes {
    fn marshal_cser(&self, w: &mut Writer) -> Result<(), CodecError> {
        w.write_u64(self.start);
        w.write_u32(self.epoch);
        w.write_u32(self.votes.len() as u32);
        for vote in &self.votes {
            w.write_fixed_bytes(vote.as_ref());
        }
        Ok(())
    }

    fn unmarshal_cser(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let start = r.read_u64()?;
        let epoch = r.read_u32()?;
        let num = r.read_u32()?;
        if num > MAX_BLOCK_VOTES {
            return Err(CserError::TooLargeAlloc.into());
        }
        let mut votes = Vec::with_capacity(num as usize);
        for _ in 0..num {
            let mut vote = [0u8; HASH_LEN];
            r.read_fixed_bytes(&mut vote)?;
            votes.push(Hash::from(vote));
        }
        Ok(BlockVotes { start, epoch, votes })
    }
}

impl ProtocolCser for EpochVote {
    fn marshal_cser(&self, w: &mut Writer) -> Result<(), CodecError> {
        w.write_u32(self.epoch);
        w.write_fixed_bytes(self.vote.as_ref());
        Ok(())
    }

    fn unmarshal_cser(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let epoch = r.read_u32()?;
        let mut vote = [0u8; HASH_LEN];
        r.read_fixed_bytes(&mut vote)?;
        Ok(EpochVote {
            epoch,
            vote: Hash::from(vote),
        })
    }
}

impl ProtocolCser for EventPayload {
    fn marshal_cser(&self, w: &mut Writer) -> Result<(), CodecError> {
        // the flags must agree with the body before anything is written
        if self.event.any_txs != !self.txs.is_empty()
            || self.event.any_misbehaviour_proofs != !self.misbehaviour_proofs.is_empty()
            || self.event.any_epoch_vote != !self.epoch_vote.is_empty()
            || self.event.any_block_votes != !self.block_votes.is_empty()
        {
            return Err(CodecError::MalformedEvent);
        }

        self.event.marshal_cser(w)?;
        w.write_fixed_bytes(self.sig.as_ref());

        if self.event.any_txs {
            if self.event.version == 0 {
                w.write_u56(self.txs.len() as u64)?;
                for tx in &self.txs {
                    transaction::marshal_tx(w, tx)?;
                }
            } else {
                let blob = rlp::encode_list::<Transaction, _>(&self.txs);
                w.write_slice_bytes(&blob)?;
            }
        }
        if self.event.any_misbehaviour_proofs {
            let blob = rlp::encode_list::<MisbehaviourProof, _>(&self.misbehaviour_proofs);
            w.write_slice_bytes(&blob)?;
        }
        if self.event.any_epoch_vote {
            self.epoch_vote.marshal_cser(w)?;
        }
        if self.event.any_block_votes {
            self.block_votes.marshal_cser(w)?;
        }
        Ok(())
    }

    fn unmarshal_cser(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        let event = Event::unmarshal_cser(r)?;

        let mut sig = [0u8; SIGNATURE_LEN];
        r.read_fixed_bytes(&mut sig)?;
        let sig = Signature::from(sig);

        let mut txs: Vec<Transaction> = Vec::new();
        if event.any_txs {
            if event.version == 0 {
                let size = r.read_u56()?;
                if size > MAX_TXS_COUNT {
                    return Err(CserError::TooLargeAlloc.into());
                }
                for _ in 0..size {
                    txs.push(transaction::unmarshal_tx(r)?);
                }
            } else {
                let blob = r.read_slice_bytes(PROTOCOL_MAX_MSG_SIZE)?;
                txs = rlp::Rlp::new(&blob).as_list()?;
            }
        }

        let mut misbehaviour_proofs = Vec::new();
        if event.any_misbehaviour_proofs {
            let blob = r.read_slice_bytes(PROTOCOL_MAX_MSG_SIZE)?;
            misbehaviour_proofs = rlp::Rlp::new(&blob).as_list()?;
        }

        let mut epoch_vote = EpochVote::default();
        if event.any_epoch_vote {
            epoch_vote = EpochVote::unmarshal_cser(r)?;
            if epoch_vote.epoch == 0 {
                return Err(CserError::NonCanonicalEncoding.into());
            }
        }

        let mut block_votes = BlockVotes::default();
        if event.any_block_votes {
            block_votes = BlockVotes::unmarshal_cser(r)?;
            if block_votes.votes.is_empty() || block_votes.start == 0 || block_votes.epoch == 0 {
                return Err(CserError::NonCanonicalEncoding.into());
            }
        }

        // a set flag with an empty part (or the reverse) is impossible for
        // any conforming encoder
        if event.any_txs != !txs.is_empty()
            || event.any_misbehaviour_proofs != !misbehaviour_proofs.is_empty()
        {
            return Err(CserError::MalformedEncoding.into());
        }

        Ok(EventPayload {
            event,
            sig,
            txs,
            misbehaviour_proofs,
            epoch_vote,
            block_votes,
        })
    }
}
