pub mod auction;
pub mod chain;
pub mod format;
pub mod proposal;
pub mod proposal_state;
pub mod queued_votes;
pub mod safe_api;
pub mod subgraph;
pub mod view;

/// Nouns DAO proxy on Ethereum mainnet.
pub const NOUNS_DAO_PROXY_ADDRESS: &str = "0x6f3E6272A167e8AcCb32072d08E0957F9c79223d";
