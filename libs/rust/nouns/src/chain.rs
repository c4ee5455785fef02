use alloy::{
    eips::BlockNumberOrTag,
    providers::{DynProvider, Provider, ProviderBuilder},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use utils::errors::{BLOCK_NUMBER_FETCH_FAILED, INVALID_ETHEREUM_NODE_URL};

/// Current chain position used to classify proposals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChainContext {
    pub block_number: Option<u64>,
    /// Timestamp of `block_number`, in seconds.
    pub block_timestamp: Option<u64>,
}

#[async_trait]
pub trait ChainContextSource: Send + Sync {
    async fn current_context(&self) -> Result<ChainContext>;
}

/// Reads the chain context from an Ethereum JSON-RPC node.
pub struct RpcChainContext {
    provider: DynProvider,
}

impl RpcChainContext {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let url = rpc_url.parse().context(INVALID_ETHEREUM_NODE_URL)?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self { provider })
    }
}

#[async_trait]
impl ChainContextSource for RpcChainContext {
    #[instrument(name = "current_context", skip(self))]
    async fn current_context(&self) -> Result<ChainContext> {
        let block_number = self
            .provider
            .get_block_number()
            .await
            .context(BLOCK_NUMBER_FETCH_FAILED)?;

        let block_timestamp = match self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block_number))
            .await
        {
            Ok(Some(block)) => Some(block.header.timestamp),
            Ok(None) => {
                warn!(block_number = block_number, "Block not found, timestamp unavailable");
                None
            }
            Err(e) => {
                warn!(block_number = block_number, error = %e, "Failed to fetch block timestamp");
                None
            }
        };

        debug!(block_number = block_number, block_timestamp = ?block_timestamp, "Read chain context");

        Ok(ChainContext {
            block_number: Some(block_number),
            block_timestamp,
        })
    }
}
