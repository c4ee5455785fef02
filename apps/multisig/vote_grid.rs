use alloy::primitives::Address;
use anyhow::{Context, Result};
use nouns::{
    chain::ChainContextSource,
    queued_votes::{QueuedVote, reconcile},
    safe_api::SafeApi,
    subgraph::SubgraphApi,
    view::{VoteCard, active_proposals, build_vote_cards, parse_partial_proposals, queued_vote_label},
};
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, instrument, warn};

/// Builds the multisig vote grid: active proposals joined with the votes
/// already queued in the Safe.
pub struct VoteGridPoller {
    chain: Box<dyn ChainContextSource>,
    subgraph: SubgraphApi,
    safe: SafeApi,
    safe_address: Option<Address>,
    dao_proxy_address: Address,
    proposals_to_fetch: usize,
    is_dao_gte_v3: bool,
}

impl VoteGridPoller {
    pub fn new(
        chain: Box<dyn ChainContextSource>,
        subgraph: SubgraphApi,
        safe: SafeApi,
        safe_address: Option<Address>,
        dao_proxy_address: Address,
        proposals_to_fetch: usize,
        is_dao_gte_v3: bool,
    ) -> Self {
        Self {
            chain,
            subgraph,
            safe,
            safe_address,
            dao_proxy_address,
            proposals_to_fetch,
            is_dao_gte_v3,
        }
    }

    #[instrument(name = "poll_vote_grid", skip(self))]
    pub async fn poll(&self) -> Result<Vec<VoteCard>> {
        let context = self
            .chain
            .current_context()
            .await
            .context("Failed to read chain context")?;

        let entities = self
            .subgraph
            .fetch_proposals(self.proposals_to_fetch)
            .await
            .context("Failed to fetch proposals")?;

        let proposals = parse_partial_proposals(&entities, &context, self.is_dao_gte_v3);
        let active = active_proposals(&proposals);
        let queued = self.queued_votes().await;

        Ok(build_vote_cards(&active, &queued))
    }

    // A Safe service outage only hides queued votes, the proposals still show.
    async fn queued_votes(&self) -> Vec<QueuedVote> {
        let Some(safe_address) = self.safe_address else {
            return vec![];
        };

        match self.safe.fetch_pending_transactions(safe_address).await {
            Ok(pending) => reconcile(&pending, self.dao_proxy_address),
            Err(e) => {
                warn!(safe = %safe_address, error = ?e, "Failed to fetch pending Safe transactions");
                vec![]
            }
        }
    }
}

#[instrument(name = "run_periodic_vote_grid_update", skip_all)]
pub async fn run_periodic_vote_grid_update(poller: VoteGridPoller, every: Duration) -> Result<()> {
    info!(interval_secs = every.as_secs(), "Starting periodic vote grid update");
    let mut interval = time::interval(every);
    // A slow poll delays the next one instead of stacking ticks.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match poller.poll().await {
            Ok(cards) => log_vote_cards(&cards),
            Err(e) => error!(error = ?e, "Vote grid update failed"),
        }
    }
}

fn log_vote_cards(cards: &[VoteCard]) {
    for card in cards {
        info!(
            proposal_id = %card.prop_id,
            title = %card.title_display(),
            status = %card.status,
            queued_vote = %queued_vote_label(card.queued_vote.as_ref()),
            "Active proposal"
        );
    }

    let queued = cards.iter().filter(|c| c.queued_vote.is_some()).count();
    info!(active = cards.len(), queued = queued, "Vote grid updated");
}
