use log::debug;

use crate::codec::CodecError;
use crate::types::event::SignedEventLocator;
use crate::types::llr::{SignedBlockVotes, SignedEpochVote, VoteError};
use crate::types::primitive::{Hash, Signature};
use crate::types::BlockIndex;

// A validator is only punished on cryptographic evidence: either two of its
// own signed messages contradicting each other, or its vote contradicting
// finalized history. For the latter a single wrong vote could be an honest
// hardware fault, so the proof must carry identical wrong votes from at
// least MIN_ACCOMPLICES_FOR_PROOF distinct validators.

/// Minimum number of validators signing the same wrong vote before it counts
/// as coordinated misbehaviour.
pub const MIN_ACCOMPLICES_FOR_PROOF: usize = 2;

/// Two events by one creator at the same (epoch, seq).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventsDoublesign {
    pub pair: [SignedEventLocator; 2],
}

impl EventsDoublesign {
    /// The pair proves a fork iff both locators verify, agree on
    /// (creator, epoch, seq) and still differ in content.
    pub fn validate<F>(&self, check_sig: F) -> Result<(), VoteError>
    where
        F: Fn(&Hash, &Signature) -> bool,
    {
        for signed in &self.pair {
            if !check_sig(&signed.locator.hash_to_sign(), &signed.sig) {
                return Err(VoteError::BadSignature);
            }
        }
        let (a, b) = (&self.pair[0].locator, &self.pair[1].locator);
        if a.creator != b.creator || a.epoch != b.epoch || a.seq != b.seq {
            return Err(CodecError::MalformedEvent.into());
        }
        if a == b {
            debug!("events doublesign proof rejected: locators are identical");
            return Err(CodecError::MalformedEvent.into());
        }
        Ok(())
    }
}

/// Two contradictory votes by one creator for the same block index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockVoteDoublesign {
    pub block: BlockIndex,
    pub pair:  [SignedBlockVotes; 2],
}

impl BlockVoteDoublesign {
    /// The vote of pack `i` for the disputed block, if the batch covers it.
    pub fn get_vote(&self, i: usize) -> Option<Hash> {
        let pack = self.pair.get(i)?;
        let offset = self.block.checked_sub(pack.val.start)?;
        pack.val.votes.get(offset as usize).copied()
    }

    pub fn validate<F>(&self, check_sig: F) -> Result<(), VoteError>
    where
        F: Fn(&Hash, &Signature) -> bool,
    {
        for pack in &self.pair {
            pack.verify(&check_sig)?;
        }
        if self.pair[0].signed.locator.creator != self.pair[1].signed.locator.creator {
            return Err(CodecError::MalformedEvent.into());
        }
        let a = self.get_vote(0).ok_or(VoteError::Codec(CodecError::MalformedEvent))?;
        let b = self.get_vote(1).ok_or(VoteError::Codec(CodecError::MalformedEvent))?;
        if a == b {
            debug!("block vote doublesign proof rejected: votes agree");
            return Err(CodecError::MalformedEvent.into());
        }
        Ok(())
    }
}

/// A vote contradicting the finalized chain, co-signed by accomplices.
/// Whether the vote is actually wrong is judged against chain state by the
/// caller; this type only establishes that the votes agree and are authentic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrongBlockVote {
    pub block:       BlockIndex,
    pub pals:        [SignedBlockVotes; MIN_ACCOMPLICES_FOR_PROOF],
    pub wrong_epoch: bool,
}

impl WrongBlockVote {
    pub fn get_vote(&self, i: usize) -> Option<Hash> {
        let pack = self.pals.get(i)?;
        let offset = self.block.checked_sub(pack.val.start)?;
        pack.val.votes.get(offset as usize).copied()
    }

    pub fn validate<F>(&self, check_sig: F) -> Result<(), VoteError>
    where
        F: Fn(&Hash, &Signature) -> bool,
    {
        for pack in &self.pals {
            pack.verify(&check_sig)?;
        }
        if self.pals[0].signed.locator.creator == self.pals[1].signed.locator.creator {
            return Err(CodecError::MalformedEvent.into());
        }
        let a = self.get_vote(0).ok_or(VoteError::Codec(CodecError::MalformedEvent))?;
        let b = self.get_vote(1).ok_or(VoteError::Codec(CodecError::MalformedEvent))?;
        if a != b {
            debug!("wrong block vote proof rejected: accomplice votes differ");
            return Err(CodecError::MalformedEvent.into());
        }
        Ok(())
    }
}

/// Two contradictory epoch seals by one creator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpochVoteDoublesign {
    pub pair: [SignedEpochVote; 2],
}

impl EpochVoteDoublesign {
    pub fn validate<F>(&self, check_sig: F) -> Result<(), VoteError>
    where
        F: Fn(&Hash, &Signature) -> bool,
    {
        for pack in &self.pair {
            pack.verify(&check_sig)?;
        }
        let (a, b) = (&self.pair[0], &self.pair[1]);
        if a.signed.locator.creator != b.signed.locator.creator
            || a.val.epoch != b.val.epoch
        {
            return Err(CodecError::MalformedEvent.into());
        }
        if a.val.vote == b.val.vote {
            debug!("epoch vote doublesign proof rejected: votes agree");
            return Err(CodecError::MalformedEvent.into());
        }
        Ok(())
    }
}

/// An epoch seal contradicting finalized history, co-signed by accomplices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrongEpochVote {
    pub pals: [SignedEpochVote; MIN_ACCOMPLICES_FOR_PROOF],
}

impl WrongEpochVote {
    pub fn validate<F>(&self, check_sig: F) -> Result<(), VoteError>
    where
        F: Fn(&Hash, &Signature) -> bool,
    {
        for pack in &self.pals {
            pack.verify(&check_sig)?;
        }
        let (a, b) = (&self.pals[0], &self.pals[1]);
        if a.signed.locator.creator == b.signed.locator.creator {
            return Err(CodecError::MalformedEvent.into());
        }
        if a.val.epoch != b.val.epoch || a.val.vote != b.val.vote {
            debug!("wrong epoch vote proof rejected: accomplice votes differ");
            return Err(CodecError::MalformedEvent.into());
        }
        Ok(())
    }
}

/// Exactly one kind of evidence. The rlp discriminator is the variant index
/// in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MisbehaviourProof {
    EventsDoublesign(EventsDoublesign),
    BlockVoteDoublesign(BlockVoteDoublesign),
    WrongBlockVote(WrongBlockVote),
    EpochVoteDoublesign(EpochVoteDoublesign),
    WrongEpochVote(WrongEpochVote),
}

impl MisbehaviourProof {
    pub fn validate<F>(&self, check_sig: F) -> Result<(), VoteError>
    where
        F: Fn(&Hash, &Signature) -> bool,
    {
        match self {
            MisbehaviourProof::EventsDoublesign(p) => p.validate(check_sig),
            MisbehaviourProof::BlockVoteDoublesign(p) => p.validate(check_sig),
            MisbehaviourProof::WrongBlockVote(p) => p.validate(check_sig),
            MisbehaviourProof::EpochVoteDoublesign(p) => p.validate(check_sig),
            MisbehaviourProof::WrongEpochVote(p) => p.validate(check_sig),
        }
    }
}
