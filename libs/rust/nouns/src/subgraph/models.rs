use crate::proposal::ProposalState;
use serde::Deserialize;

/// GraphQL envelope returned by the Nouns subgraph.
#[derive(Deserialize, Debug)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GraphqlError {
    pub message: String,
}

/// Reference to an account entity (`{ id }`).
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountRef {
    pub id: String,
}

/// Proposal as returned by the subgraph. Integers are decimal strings.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProposalEntity {
    pub id: String,
    pub title: Option<String>,
    pub status: ProposalState,
    pub for_votes: String,
    pub against_votes: String,
    pub abstain_votes: String,
    pub quorum_votes: String,
    #[serde(rename = "executionETA")]
    pub execution_eta: Option<String>,
    pub start_block: String,
    pub end_block: String,
    pub update_period_end_block: Option<String>,
    pub objection_period_end_block: Option<String>,
    pub on_timelock_v1: Option<bool>,
    #[serde(default)]
    pub signers: Vec<AccountRef>,
}

#[derive(Deserialize, Debug)]
pub struct ProposalsData {
    pub proposals: Vec<ProposalEntity>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NounSeed {
    pub background: String,
    pub body: String,
    pub accessory: String,
    pub head: String,
    pub glasses: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NounEntity {
    pub id: String,
    pub seed: Option<NounSeed>,
    pub owner: Option<AccountRef>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BidEntity {
    pub id: String,
    pub amount: String,
    pub block_number: String,
    pub block_timestamp: String,
    pub tx_index: String,
    pub bidder: AccountRef,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AuctionEntity {
    pub id: String,
    pub amount: String,
    pub settled: bool,
    pub bidder: Option<AccountRef>,
    pub start_time: String,
    pub end_time: String,
    pub noun: Option<NounEntity>,
    #[serde(default)]
    pub bids: Vec<BidEntity>,
}

#[derive(Deserialize, Debug)]
pub struct AuctionData {
    pub auction: Option<AuctionEntity>,
}

#[derive(Deserialize, Debug)]
pub struct AuctionsData {
    pub auctions: Vec<AuctionEntity>,
}

#[derive(Deserialize, Debug)]
pub struct NounData {
    pub noun: Option<NounEntity>,
}

#[derive(Deserialize, Debug)]
pub struct IdEntity {
    pub id: String,
}

#[derive(Deserialize, Debug)]
pub struct AuctionIdsData {
    pub auctions: Vec<IdEntity>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountEntity {
    pub id: String,
    pub token_balance_raw: String,
}

#[derive(Deserialize, Debug)]
pub struct AccountData {
    pub account: Option<AccountEntity>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuctionAmount {
    pub id: String,
    pub amount: String,
}

#[derive(Deserialize, Debug)]
pub struct AuctionAmountsData {
    pub auctions: Vec<AuctionAmount>,
}
