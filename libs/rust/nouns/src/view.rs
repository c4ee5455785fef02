//! View models for the multisig voting page.

use crate::{
    chain::ChainContext,
    proposal::{Proposal, ProposalState},
    proposal_state::classify,
    queued_votes::{QueuedVote, VoteSupport},
    subgraph::models::ProposalEntity,
};
use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::warn;

const TITLE_DISPLAY_LIMIT: usize = 20;
const TITLE_TRUNCATED_LENGTH: usize = 17;

/// A proposal with its display state at the current chain context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartialProposal {
    pub id: String,
    pub title: String,
    pub status: ProposalState,
    pub start_block: u64,
    pub end_block: u64,
    pub update_period_end_block: Option<u64>,
    pub for_count: U256,
    pub against_count: U256,
    pub abstain_count: U256,
    pub quorum_votes: U256,
    pub eta: Option<DateTime<Utc>>,
}

pub fn parse_partial_proposal(
    proposal: &Proposal,
    context: &ChainContext,
    is_dao_gte_v3: bool,
) -> PartialProposal {
    PartialProposal {
        id: proposal.id.clone(),
        title: proposal.title.clone(),
        status: classify(
            context.block_number,
            context.block_timestamp,
            proposal,
            is_dao_gte_v3,
            proposal.on_timelock_v1,
        ),
        start_block: proposal.start_block,
        end_block: proposal.end_block,
        update_period_end_block: proposal.update_period_end_block,
        for_count: proposal.for_votes,
        against_count: proposal.against_votes,
        abstain_count: proposal.abstain_votes,
        quorum_votes: proposal.quorum_votes,
        eta: proposal
            .execution_eta
            .and_then(|eta| i64::try_from(eta).ok())
            .and_then(|eta| DateTime::from_timestamp(eta, 0)),
    }
}

/// Parses and classifies subgraph proposals. Entities that cannot be parsed
/// are skipped.
pub fn parse_partial_proposals(
    entities: &[ProposalEntity],
    context: &ChainContext,
    is_dao_gte_v3: bool,
) -> Vec<PartialProposal> {
    entities
        .iter()
        .filter_map(|entity| match Proposal::try_from(entity) {
            Ok(proposal) => Some(parse_partial_proposal(&proposal, context, is_dao_gte_v3)),
            Err(e) => {
                warn!(proposal_id = %entity.id, error = %e, "Skipping malformed proposal");
                None
            }
        })
        .collect()
}

/// Proposals open for voting, ordered by id.
pub fn active_proposals(proposals: &[PartialProposal]) -> Vec<PartialProposal> {
    let mut active: Vec<PartialProposal> = proposals
        .iter()
        .filter(|p| p.status == ProposalState::Active)
        .cloned()
        .collect();
    active.sort_by(|a, b| compare_ids(&a.id, &b.id));
    active
}

// Numeric ids compare numerically; anything else falls back to string order.
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// One votable proposal and the multisig vote already queued for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VoteCard {
    pub prop_id: String,
    pub title: String,
    pub status: ProposalState,
    pub queued_vote: Option<QueuedVote>,
}

impl VoteCard {
    pub fn title_display(&self) -> String {
        proposal_title_display(&self.prop_id, &self.title)
    }
}

/// Joins active proposals with queued votes by proposal id. When several
/// votes are queued for one proposal the first one wins.
pub fn build_vote_cards(active: &[PartialProposal], queued: &[QueuedVote]) -> Vec<VoteCard> {
    active
        .iter()
        .map(|proposal| {
            let queued_vote = proposal
                .id
                .parse::<U256>()
                .ok()
                .and_then(|id| queued.iter().find(|vote| vote.proposal_id == id))
                .copied();

            VoteCard {
                prop_id: proposal.id.clone(),
                title: proposal.title.clone(),
                status: proposal.status,
                queued_vote,
            }
        })
        .collect()
}

pub fn vote_support_label(support: u8) -> &'static str {
    VoteSupport::try_from(support)
        .map(|s| s.as_str())
        .unwrap_or("Invalid")
}

pub fn queued_vote_label(queued_vote: Option<&QueuedVote>) -> String {
    queued_vote
        .map(|vote| format!("Queued {}", vote.support))
        .unwrap_or_default()
}

/// Voting receipt of the multisig on a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub has_voted: bool,
    pub support: u8,
    pub votes: u64,
}

pub fn receipt_label(receipt: &Receipt) -> String {
    if !receipt.has_voted {
        return String::new();
    }
    format!(
        "Voted {} with {} Nouns",
        vote_support_label(receipt.support),
        receipt.votes
    )
}

/// Label of the vote button: a cast vote beats a queued one.
pub fn vote_button_label(receipt: Option<&Receipt>, queued_vote: Option<&QueuedVote>) -> String {
    match (receipt.filter(|r| r.has_voted), queued_vote) {
        (Some(receipt), _) => receipt_label(receipt),
        (None, Some(_)) => queued_vote_label(queued_vote),
        (None, None) => "Queue Vote".to_string(),
    }
}

/// `601: Nouns x Public Go...`
pub fn proposal_title_display(prop_id: &str, title: &str) -> String {
    if title.chars().count() > TITLE_DISPLAY_LIMIT {
        let truncated: String = title.chars().take(TITLE_TRUNCATED_LENGTH).collect();
        format!("{prop_id}: {truncated}...")
    } else {
        format!("{prop_id}: {title}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subgraph::models::AccountRef;

    fn entity(id: &str, status: ProposalState, start: &str, end: &str) -> ProposalEntity {
        ProposalEntity {
            id: id.to_string(),
            title: Some(format!("Proposal {id}")),
            status,
            for_votes: "50".to_string(),
            against_votes: "10".to_string(),
            abstain_votes: "0".to_string(),
            quorum_votes: "20".to_string(),
            execution_eta: None,
            start_block: start.to_string(),
            end_block: end.to_string(),
            update_period_end_block: None,
            objection_period_end_block: Some("0".to_string()),
            on_timelock_v1: None,
            signers: vec![AccountRef {
                id: "0xsigner".to_string(),
            }],
        }
    }

    fn context(block_number: u64) -> ChainContext {
        ChainContext {
            block_number: Some(block_number),
            block_timestamp: Some(1_717_000_000),
        }
    }

    #[test]
    fn test_classifies_and_skips_malformed_entities() {
        let entities = vec![
            entity("1", ProposalState::Active, "100", "200"),
            entity("2", ProposalState::Active, "100", "not a block"),
            entity("3", ProposalState::Executed, "10", "20"),
        ];

        let proposals = parse_partial_proposals(&entities, &context(250), true);

        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].status, ProposalState::Succeeded);
        assert_eq!(proposals[1].status, ProposalState::Executed);
    }

    #[test]
    fn test_missing_block_number_is_undetermined() {
        let entities = vec![entity("1", ProposalState::Active, "100", "200")];
        let context = ChainContext::default();

        let proposals = parse_partial_proposals(&entities, &context, true);

        assert_eq!(proposals[0].status, ProposalState::Undetermined);
    }

    #[test]
    fn test_execution_eta_becomes_a_date() {
        let mut queued = entity("4", ProposalState::Queued, "100", "200");
        queued.execution_eta = Some("1717000000".to_string());

        let proposals = parse_partial_proposals(&[queued], &context(300), true);

        assert_eq!(proposals[0].eta.unwrap().timestamp(), 1_717_000_000);
        assert_eq!(proposals[0].status, ProposalState::Queued);
    }

    #[test]
    fn test_active_proposals_sorted_numerically() {
        let entities = vec![
            entity("100", ProposalState::Active, "100", "1000"),
            entity("99", ProposalState::Active, "100", "1000"),
            entity("101", ProposalState::Pending, "1000", "2000"),
            entity("98", ProposalState::Defeated, "10", "20"),
        ];
        let proposals = parse_partial_proposals(&entities, &context(500), true);

        let ids: Vec<String> = active_proposals(&proposals)
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(ids, vec!["99", "100"]);
    }

    #[test]
    fn test_vote_cards_join_queued_votes() {
        let entities = vec![
            entity("7", ProposalState::Active, "100", "1000"),
            entity("8", ProposalState::Active, "100", "1000"),
        ];
        let active = active_proposals(&parse_partial_proposals(&entities, &context(500), true));
        let queued = vec![
            QueuedVote {
                proposal_id: U256::from(8),
                support: VoteSupport::Abstain,
            },
            QueuedVote {
                proposal_id: U256::from(8),
                support: VoteSupport::For,
            },
            QueuedVote {
                proposal_id: U256::from(42),
                support: VoteSupport::For,
            },
        ];

        let cards = build_vote_cards(&active, &queued);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].queued_vote, None);
        assert_eq!(cards[1].queued_vote.unwrap().support, VoteSupport::Abstain);
        assert_eq!(cards[1].title_display(), "8: Proposal 8");
    }

    #[test]
    fn test_vote_labels() {
        assert_eq!(vote_support_label(0), "Against");
        assert_eq!(vote_support_label(1), "For");
        assert_eq!(vote_support_label(2), "Abstain");
        assert_eq!(vote_support_label(3), "Invalid");

        let queued = QueuedVote {
            proposal_id: U256::from(1),
            support: VoteSupport::For,
        };
        assert_eq!(queued_vote_label(Some(&queued)), "Queued For");
        assert_eq!(queued_vote_label(None), "");
    }

    #[test]
    fn test_receipt_and_button_labels() {
        let voted = Receipt {
            has_voted: true,
            support: 0,
            votes: 12,
        };
        let not_voted = Receipt {
            has_voted: false,
            support: 0,
            votes: 0,
        };
        let queued = QueuedVote {
            proposal_id: U256::from(1),
            support: VoteSupport::Abstain,
        };

        assert_eq!(receipt_label(&voted), "Voted Against with 12 Nouns");
        assert_eq!(receipt_label(&not_voted), "");
        assert_eq!(
            vote_button_label(Some(&voted), Some(&queued)),
            "Voted Against with 12 Nouns"
        );
        assert_eq!(vote_button_label(Some(&not_voted), Some(&queued)), "Queued Abstain");
        assert_eq!(vote_button_label(None, None), "Queue Vote");
    }

    #[test]
    fn test_long_titles_are_truncated() {
        assert_eq!(proposal_title_display("12", "Short title"), "12: Short title");
        assert_eq!(
            proposal_title_display("12", "Exactly twenty chars"),
            "12: Exactly twenty chars"
        );
        assert_eq!(
            proposal_title_display("601", "Nouns x Public Goods Round 3"),
            "601: Nouns x Public Go..."
        );
    }
}
