use crate::types::event::{EventLocator, SignedEventLocator};
use crate::types::llr::{BlockVotes, EpochVote, SignedBlockVotes, SignedEpochVote};

impl rlp::Encodable for EventLocator {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(7)
            .append(&self.base_hash)
            .append(&self.net_fork_id)
            .append(&self.epoch)
            .append(&self.seq)
            .append(&self.lamport)
            .append(&self.creator)
            .append(&self.payload_hash);
    }
}

impl rlp::Decodable for EventLocator {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 7 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        Ok(EventLocator {
            base_hash:    r.val_at(0)?,
            net_fork_id:  r.val_at(1)?,
            epoch:        r.val_at(2)?,
            seq:          r.val_at(3)?,
            lamport:      r.val_at(4)?,
            creator:      r.val_at(5)?,
            payload_hash: r.val_at(6)?,
        })
    }
}

impl rlp::Encodable for SignedEventLocator {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(2).append(&self.locator).append(&self.sig);
    }
}

impl rlp::Decodable for SignedEventLocator {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 2 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        Ok(SignedEventLocator {
            locator: r.val_at(0)?,
            sig:     r.val_at(1)?,
        })
    }
}

impl rlp::Encodable for BlockVotes {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(3)
            .append(&self.start)
            .append(&self.epoch)
            .append_list(&self.votes);
    }
}

impl rlp::Decodable for BlockVotes {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 3 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        Ok(BlockVotes {
            start: r.val_at(0)?,
            epoch: r.val_at(1)?,
            votes: r.list_at(2)?,
        })
    }
}

impl rlp::Encodable for EpochVote {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(2).append(&self.epoch).append(&self.vote);
    }
}

impl rlp::Decodable for EpochVote {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 2 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        Ok(EpochVote {
            epoch: r.val_at(0)?,
            vote:  r.val_at(1)?,
        })
    }
}

impl rlp::Encodable for SignedBlockVotes {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(4)
            .append(&self.signed)
            .append(&self.txs_and_mps_hash)
            .append(&self.epoch_vote_hash)
            .append(&self.val);
    }
}

impl rlp::Decodable for SignedBlockVotes {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 4 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        Ok(SignedBlockVotes {
            signed:           r.val_at(0)?,
            txs_and_mps_hash: r.val_at(1)?,
            epoch_vote_hash:  r.val_at(2)?,
            val:              r.val_at(3)?,
        })
    }
}

impl rlp::Encodable for SignedEpochVote {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(4)
            .append(&self.signed)
            .append(&self.txs_and_mps_hash)
            .append(&self.block_votes_hash)
            .append(&self.val);
    }
}

impl rlp::Decodable for SignedEpochVote {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 4 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        Ok(SignedEpochVote {
            signed:           r.val_at(0)?,
            txs_and_mps_hash: r.val_at(1)?,
            block_votes_hash: r.val_at(2)?,
            val:              r.val_at(3)?,
        })
    }
}

impl_default_fixed_codec_for!(llr, [BlockVotes, EpochVote, SignedBlockVotes, SignedEpochVote]);
impl_default_fixed_codec_for!(event, [EventLocator, SignedEventLocator]);
