//! Display state derivation for Nouns DAO proposals.
//!
//! The subgraph only records the last on-chain status transition, so a
//! proposal that is `ACTIVE` on-chain may already be defeated, succeeded or in
//! its objection period at the current block. [`classify`] recomputes the
//! state from the current block number and timestamp.

use crate::proposal::{Proposal, ProposalState};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Timelock grace period for DAO v3+ proposals not on timelock v1.
pub const GRACE_PERIOD_V3: u64 = 21 * SECONDS_PER_DAY;
/// Timelock grace period for earlier proposals and timelock v1.
pub const GRACE_PERIOD_LEGACY: u64 = 14 * SECONDS_PER_DAY;

/// Inputs shared by the voting period rules.
#[derive(Clone, Copy, Debug)]
pub struct RuleInput<'a> {
    pub block_number: u64,
    pub proposal: &'a Proposal,
    pub is_dao_gte_v3: bool,
}

pub type VotingPeriodRule = fn(&RuleInput<'_>) -> Option<ProposalState>;

/// Rules applied, in order, to proposals recorded as pending or active. The
/// first rule returning a state wins; when none fires the proposal is active.
pub const VOTING_PERIOD_RULES: [(&str, VotingPeriodRule); 4] = [
    ("updatable", updatable),
    ("pending", pending),
    ("objection_period", objection_period),
    ("vote_outcome", vote_outcome),
];

pub fn updatable(input: &RuleInput<'_>) -> Option<ProposalState> {
    let update_period_end = input.proposal.update_period_end_block.filter(|b| *b > 0)?;
    (input.is_dao_gte_v3 && input.block_number <= update_period_end)
        .then_some(ProposalState::Updatable)
}

pub fn pending(input: &RuleInput<'_>) -> Option<ProposalState> {
    (input.block_number <= input.proposal.start_block).then_some(ProposalState::Pending)
}

pub fn objection_period(input: &RuleInput<'_>) -> Option<ProposalState> {
    let proposal = input.proposal;
    (input.is_dao_gte_v3
        && input.block_number > proposal.end_block
        && proposal.objection_period_end_block > 0
        && input.block_number <= proposal.objection_period_end_block)
        .then_some(ProposalState::ObjectionPeriod)
}

/// Voting is over but the on-chain status has not moved yet.
pub fn vote_outcome(input: &RuleInput<'_>) -> Option<ProposalState> {
    let proposal = input.proposal;
    if input.block_number <= proposal.end_block
        || input.block_number <= proposal.objection_period_end_block
    {
        return None;
    }

    if proposal.for_votes <= proposal.against_votes || proposal.for_votes < proposal.quorum_votes {
        return Some(ProposalState::Defeated);
    }

    // A proposal with an execution ETA has been queued on-chain; leave it active
    // until the subgraph catches up.
    proposal
        .execution_eta
        .is_none()
        .then_some(ProposalState::Succeeded)
}

pub fn grace_period(is_dao_gte_v3: bool, on_timelock_v1: bool) -> u64 {
    if is_dao_gte_v3 && !on_timelock_v1 {
        GRACE_PERIOD_V3
    } else {
        GRACE_PERIOD_LEGACY
    }
}

/// Computes the display state of `proposal` at the given block and block
/// timestamp (seconds). Never fails: missing context yields
/// [`ProposalState::Undetermined`].
pub fn classify(
    block_number: Option<u64>,
    block_timestamp: Option<u64>,
    proposal: &Proposal,
    is_dao_gte_v3: bool,
    on_timelock_v1: bool,
) -> ProposalState {
    match proposal.status {
        ProposalState::Pending | ProposalState::Active => {
            let Some(block_number) = block_number else {
                return ProposalState::Undetermined;
            };
            let input = RuleInput {
                block_number,
                proposal,
                is_dao_gte_v3,
            };
            VOTING_PERIOD_RULES
                .iter()
                .find_map(|(_, rule)| rule(&input))
                .unwrap_or(ProposalState::Active)
        }
        ProposalState::Queued => {
            let (Some(now), Some(eta)) = (block_timestamp, proposal.execution_eta) else {
                return ProposalState::Undetermined;
            };
            let expires_at = eta.saturating_add(grace_period(is_dao_gte_v3, on_timelock_v1));
            if now >= expires_at {
                ProposalState::Expired
            } else {
                ProposalState::Queued
            }
        }
        status => status,
    }
}
