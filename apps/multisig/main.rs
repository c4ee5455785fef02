use anyhow::{Context, Result};
use dotenv::dotenv;
use nouns::{chain::RpcChainContext, safe_api::SafeApi, subgraph::SubgraphApi};
use std::time::Duration;
use tracing::{error, info};
use utils::tracing::{run_with_tracing, setup_tracing};
use vote_grid::{VoteGridPoller, run_periodic_vote_grid_update};

mod config;
mod vote_grid;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    setup_tracing();
    info!("Application starting up");

    config::load().context("Failed to load multisig config")?;
    let config = config::get_config()?;

    let chain = RpcChainContext::new(&config.ethereum_node_url)?;
    let poller = VoteGridPoller::new(
        Box::new(chain),
        SubgraphApi::new_with_endpoint(config.subgraph_url.clone()),
        SafeApi::new_with_endpoint(config.safe_transaction_service_url.clone()),
        config.safe_address()?,
        config.dao_proxy_address()?,
        config.proposals_to_fetch,
        config.is_dao_gte_v3,
    );
    let every = Duration::from_secs(config.poll_interval_secs);

    let vote_grid_handle = tokio::spawn(run_with_tracing(move || {
        run_periodic_vote_grid_update(poller, every)
    }));

    info!("All tasks started, application running indefinitely");

    tokio::select! {
        result = vote_grid_handle => {
            error!("Vote grid task completed unexpectedly: {:?}", result);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully");
        }
    }

    info!("Application shutting down");
    Ok(())
}
