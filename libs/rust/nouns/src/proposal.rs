use crate::subgraph::models::ProposalEntity;
use alloy::primitives::U256;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Lifecycle state of a Nouns DAO proposal, both as recorded by the subgraph
/// and as derived for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalState {
    Pending,
    Active,
    Cancelled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
    Vetoed,
    ObjectionPeriod,
    Updatable,
    #[serde(other)]
    Undetermined,
}

impl ProposalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalState::Pending => "Pending",
            ProposalState::Active => "Active",
            ProposalState::Cancelled => "Cancelled",
            ProposalState::Defeated => "Defeated",
            ProposalState::Succeeded => "Succeeded",
            ProposalState::Queued => "Queued",
            ProposalState::Expired => "Expired",
            ProposalState::Executed => "Executed",
            ProposalState::Vetoed => "Vetoed",
            ProposalState::ObjectionPeriod => "Objection Period",
            ProposalState::Updatable => "Updatable",
            ProposalState::Undetermined => "Undetermined",
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposal parsed from one subgraph entity. Immutable; the display state
/// is derived from it with [`crate::proposal_state::classify`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    pub id: String,
    pub title: String,
    pub status: ProposalState,
    pub start_block: u64,
    pub end_block: u64,
    pub update_period_end_block: Option<u64>,
    pub objection_period_end_block: u64,
    pub for_votes: U256,
    pub against_votes: U256,
    pub abstain_votes: U256,
    pub quorum_votes: U256,
    pub execution_eta: Option<u64>,
    pub on_timelock_v1: bool,
    pub signers: Vec<String>,
}

impl TryFrom<&ProposalEntity> for Proposal {
    type Error = anyhow::Error;

    fn try_from(entity: &ProposalEntity) -> Result<Self> {
        let start_block = parse_block(&entity.start_block).context("Invalid startBlock")?;
        let end_block = parse_block(&entity.end_block).context("Invalid endBlock")?;
        if end_block < start_block {
            bail!("endBlock {end_block} precedes startBlock {start_block}");
        }

        Ok(Self {
            id: entity.id.clone(),
            title: entity
                .title
                .clone()
                .unwrap_or_else(|| "Untitled".to_string()),
            status: entity.status,
            start_block,
            end_block,
            update_period_end_block: parse_optional_block(
                &entity.id,
                "updatePeriodEndBlock",
                entity.update_period_end_block.as_deref(),
            ),
            objection_period_end_block: parse_optional_block(
                &entity.id,
                "objectionPeriodEndBlock",
                entity.objection_period_end_block.as_deref(),
            )
            .unwrap_or(0),
            for_votes: parse_votes(&entity.for_votes).context("Invalid forVotes")?,
            against_votes: parse_votes(&entity.against_votes).context("Invalid againstVotes")?,
            abstain_votes: parse_votes(&entity.abstain_votes).context("Invalid abstainVotes")?,
            quorum_votes: parse_votes(&entity.quorum_votes).context("Invalid quorumVotes")?,
            execution_eta: parse_optional_block(
                &entity.id,
                "executionETA",
                entity.execution_eta.as_deref(),
            ),
            on_timelock_v1: entity.on_timelock_v1.unwrap_or(false),
            signers: entity.signers.iter().map(|s| s.id.clone()).collect(),
        })
    }
}

fn parse_block(value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("'{value}' is not a block number"))
}

fn parse_votes(value: &str) -> Result<U256> {
    U256::from_str_radix(value.trim(), 10).with_context(|| format!("'{value}' is not a vote count"))
}

// Optional integer fields degrade to absent when malformed.
fn parse_optional_block(proposal_id: &str, field: &str, value: Option<&str>) -> Option<u64> {
    let value = value?;
    match value.trim().parse::<u64>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(
                proposal_id = %proposal_id,
                field = field,
                value = value,
                error = %e,
                "Ignoring malformed optional proposal field"
            );
            None
        }
    }
}
