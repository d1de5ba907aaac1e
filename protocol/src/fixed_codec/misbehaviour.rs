use bytes::Bytes;

use crate::fixed_codec::{FixedCodec, FixedCodecError};
use crate::types::misbehaviour::{
    BlockVoteDoublesign, EpochVoteDoublesign, EventsDoublesign, MisbehaviourProof,
    WrongBlockVote, WrongEpochVote,
};
use crate::ProtocolResult;

// The proof container travels as [tag, body]. The tag is the variant index,
// so a decoded proof holds exactly one kind of evidence by construction.

const EVENTS_DOUBLESIGN_TAG: u8 = 0;
const BLOCK_VOTE_DOUBLESIGN_TAG: u8 = 1;
const WRONG_BLOCK_VOTE_TAG: u8 = 2;
const EPOCH_VOTE_DOUBLESIGN_TAG: u8 = 3;
const WRONG_EPOCH_VOTE_TAG: u8 = 4;

impl rlp::Encodable for EventsDoublesign {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(2).append(&self.pair[0]).append(&self.pair[1]);
    }
}

impl rlp::Decodable for EventsDoublesign {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 2 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        Ok(EventsDoublesign {
            pair: [r.val_at(0)?, r.val_at(1)?],
        })
    }
}

impl rlp::Encodable for BlockVoteDoublesign {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(3)
            .append(&self.block)
            .append(&self.pair[0])
            .append(&self.pair[1]);
    }
}

impl rlp::Decodable for BlockVoteDoublesign {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 3 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        Ok(BlockVoteDoublesign {
            block: r.val_at(0)?,
            pair:  [r.val_at(1)?, r.val_at(2)?],
        })
    }
}

impl rlp::Encodable for WrongBlockVote {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(4)
            .append(&self.block)
            .append(&self.pals[0])
            .append(&self.pals[1])
            .append(&self.wrong_epoch);
    }
}

impl rlp::Decodable for WrongBlockVote {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 4 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        Ok(WrongBlockVote {
            block:       r.val_at(0)?,
            pals:        [r.val_at(1)?, r.val_at(2)?],
            wrong_epoch: r.val_at(3)?,
        })
    }
}

impl rlp::Encodable for EpochVoteDoublesign {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(2).append(&self.pair[0]).append(&self.pair[1]);
    }
}

impl rlp::Decodable for EpochVoteDoublesign {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 2 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        Ok(EpochVoteDoublesign {
            pair: [r.val_at(0)?, r.val_at(1)?],
        })
    }
}

impl rlp::Encodable for WrongEpochVote {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(2).append(&self.pals[0]).append(&self.pals[1]);
    }
}

impl rlp::Decodable for WrongEpochVote {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 2 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        Ok(WrongEpochVote {
            pals: [r.val_at(0)?, r.val_at(1)?],
        })
    }
}

impl rlp::Encodable for MisbehaviourProof {
    fn rlp_append(&self, s: &mut rlp::RlpStream) {
        s.begin_list(2);
        match self {
            MisbehaviourProof::EventsDoublesign(p) => {
                s.append(&EVENTS_DOUBLESIGN_TAG).append(p);
            }
            MisbehaviourProof::BlockVoteDoublesign(p) => {
                s.append(&BLOCK_VOTE_DOUBLESIGN_TAG).append(p);
            }
            MisbehaviourProof::WrongBlockVote(p) => {
                s.append(&WRONG_BLOCK_VOTE_TAG).append(p);
            }
            MisbehaviourProof::EpochVoteDoublesign(p) => {
                s.append(&EPOCH_VOTE_DOUBLESIGN_TAG).append(p);
            }
            MisbehaviourProof::WrongEpochVote(p) => {
                s.append(&WRONG_EPOCH_VOTE_TAG).append(p);
            }
        }
    }
}

impl rlp::Decodable for MisbehaviourProof {
    fn decode(r: &rlp::Rlp) -> Result<Self, rlp::DecoderError> {
        if !r.is_list() || r.item_count()? != 2 {
            return Err(rlp::DecoderError::RlpIncorrectListLen);
        }

        let tag: u8 = r.val_at(0)?;
        match tag {
            EVENTS_DOUBLESIGN_TAG => Ok(MisbehaviourProof::EventsDoublesign(r.val_at(1)?)),
            BLOCK_VOTE_DOUBLESIGN_TAG => Ok(MisbehaviourProof::BlockVoteDoublesign(r.val_at(1)?)),
            WRONG_BLOCK_VOTE_TAG => Ok(MisbehaviourProof::WrongBlockVote(r.val_at(1)?)),
            EPOCH_VOTE_DOUBLESIGN_TAG => Ok(MisbehaviourProof::EpochVoteDoublesign(r.val_at(1)?)),
            WRONG_EPOCH_VOTE_TAG => Ok(MisbehaviourProof::WrongEpochVote(r.val_at(1)?)),
            _ => Err(rlp::DecoderError::Custom("unknown misbehaviour proof variant")),
        }
    }
}

impl_default_fixed_codec_for!(misbehaviour, [MisbehaviourProof]);

impl FixedCodec for Vec<MisbehaviourProof> {
    fn encode_fixed(&self) -> ProtocolResult<Bytes> {
        Ok(Bytes::from(
            rlp::encode_list::<MisbehaviourProof, _>(self).to_vec(),
        ))
    }

    fn decode_fixed(bytes: Bytes) -> ProtocolResult<Self> {
        Ok(rlp::Rlp::new(&bytes)
            .as_list()
            .map_err(FixedCodecError::Decoder)?)
    }
}
