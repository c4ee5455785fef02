use crate::safe_api::SafeTransaction;
use alloy::{
    primitives::{Address, U256, hex},
    sol,
    sol_types::SolInterface,
};
use serde::Serialize;
use std::fmt;
use tracing::debug;
use NounsDAOLogic::NounsDAOLogicCalls;

sol!(
    #[allow(missing_docs)]
    interface NounsDAOLogic {
        function castVote(uint256 proposalId, uint8 support) external;
        function castVoteWithReason(uint256 proposalId, uint8 support, string reason) external;
        function castRefundableVote(uint256 proposalId, uint8 support) external;
        function castRefundableVote(uint256 proposalId, uint8 support, uint32 clientId) external;
        function castRefundableVoteWithReason(uint256 proposalId, uint8 support, string reason) external;
        function castRefundableVoteWithReason(uint256 proposalId, uint8 support, string reason, uint32 clientId) external;
        function queue(uint256 proposalId) external;
        function execute(uint256 proposalId) external;
        function cancel(uint256 proposalId) external;
    }
);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum VoteSupport {
    Against,
    For,
    Abstain,
}

impl VoteSupport {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteSupport::Against => "Against",
            VoteSupport::For => "For",
            VoteSupport::Abstain => "Abstain",
        }
    }
}

impl TryFrom<u8> for VoteSupport {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VoteSupport::Against),
            1 => Ok(VoteSupport::For),
            2 => Ok(VoteSupport::Abstain),
            other => Err(other),
        }
    }
}

impl From<VoteSupport> for u8 {
    fn from(support: VoteSupport) -> Self {
        match support {
            VoteSupport::Against => 0,
            VoteSupport::For => 1,
            VoteSupport::Abstain => 2,
        }
    }
}

impl fmt::Display for VoteSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vote sitting in a multisig queue, not yet executed on-chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QueuedVote {
    pub proposal_id: U256,
    pub support: VoteSupport,
}

/// Decodes vote-casting call data. Returns `None` for anything that is not a
/// vote on a known signature.
pub fn decode_vote_calldata(data: &[u8]) -> Option<QueuedVote> {
    let call = match NounsDAOLogicCalls::abi_decode(data) {
        Ok(call) => call,
        Err(e) => {
            debug!(error = %e, "Call data does not match a known DAO function");
            return None;
        }
    };

    let (proposal_id, support) = match call {
        NounsDAOLogicCalls::castVote(c) => (c.proposalId, c.support),
        NounsDAOLogicCalls::castVoteWithReason(c) => (c.proposalId, c.support),
        NounsDAOLogicCalls::castRefundableVote_0(c) => (c.proposalId, c.support),
        NounsDAOLogicCalls::castRefundableVote_1(c) => (c.proposalId, c.support),
        NounsDAOLogicCalls::castRefundableVoteWithReason_0(c) => (c.proposalId, c.support),
        NounsDAOLogicCalls::castRefundableVoteWithReason_1(c) => (c.proposalId, c.support),
        NounsDAOLogicCalls::queue(_)
        | NounsDAOLogicCalls::execute(_)
        | NounsDAOLogicCalls::cancel(_) => {
            debug!("Call data is a DAO call but not a vote");
            return None;
        }
    };

    match VoteSupport::try_from(support) {
        Ok(support) => Some(QueuedVote {
            proposal_id,
            support,
        }),
        Err(raw) => {
            debug!(proposal_id = %proposal_id, support = raw, "Ignoring vote with unknown support value");
            None
        }
    }
}

/// Extracts the votes queued in `pending_transactions` against the DAO at
/// `target`, in input order.
pub fn reconcile(pending_transactions: &[SafeTransaction], target: Address) -> Vec<QueuedVote> {
    let target = target.to_string();

    pending_transactions
        .iter()
        .filter(|tx| tx.to.eq_ignore_ascii_case(&target))
        .filter_map(|tx| {
            let data = tx.data.as_deref().filter(|d| !d.is_empty())?;
            let bytes = match hex::decode(data) {
                Ok(bytes) => bytes,
                Err(e) => {
                    debug!(safe_tx_hash = %tx.safe_tx_hash, error = %e, "Pending transaction data is not hex");
                    return None;
                }
            };
            decode_vote_calldata(&bytes)
        })
        .collect()
}
