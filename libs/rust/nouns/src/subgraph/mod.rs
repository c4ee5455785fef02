use crate::auction::is_nounder_noun;
use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use utils::errors::{SUBGRAPH_DECODE_FAILED, SUBGRAPH_REQUEST_FAILED};

pub mod models;
use models::*;

pub const NOUNS_SUBGRAPH_URL: &str =
    "https://api.goldsky.com/api/public/project_cldf2o9pqagp43svvbk5u3kmo/subgraphs/nouns/prod/gn";

const AUCTION_FIELDS: &str = r#"
    id
    amount
    settled
    bidder { id }
    startTime
    endTime
    noun {
        id
        seed { background body accessory head glasses }
        owner { id }
    }
    bids(orderBy: amount, orderDirection: desc) {
        id
        amount
        blockNumber
        blockTimestamp
        txIndex
        bidder { id }
    }
"#;

const NOUN_FIELDS: &str = r#"
    id
    seed { background body accessory head glasses }
    owner { id }
"#;

/// Client for the Nouns subgraph.
pub struct SubgraphApi {
    client: ClientWithMiddleware,
    endpoint: String,
}

impl SubgraphApi {
    pub fn new() -> Self {
        Self::new_with_endpoint(NOUNS_SUBGRAPH_URL.to_string())
    }

    pub fn new_with_endpoint(endpoint: String) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self { client, endpoint }
    }

    /// Fetch the most recently created proposals.
    #[instrument(name = "fetch_proposals", skip(self))]
    pub async fn fetch_proposals(&self, first: usize) -> Result<Vec<ProposalEntity>> {
        let query = format!(
            r#"
            {{
                proposals(first: {first}, orderBy: createdBlock, orderDirection: desc) {{
                    id
                    title
                    status
                    forVotes
                    againstVotes
                    abstainVotes
                    quorumVotes
                    executionETA
                    startBlock
                    endBlock
                    updatePeriodEndBlock
                    objectionPeriodEndBlock
                    onTimelockV1
                    signers {{
                        id
                    }}
                }}
            }}"#
        );

        let data: Option<ProposalsData> = self.fetch_graphql(&query).await?;
        let proposals = data.map(|d| d.proposals).unwrap_or_default();
        info!(count = proposals.len(), "Fetched proposals");
        Ok(proposals)
    }

    #[instrument(name = "fetch_latest_noun_id", skip(self))]
    pub async fn fetch_latest_noun_id(&self) -> Result<Option<u64>> {
        let query = r#"
            {
                auctions(orderBy: startTime, orderDirection: desc, first: 1) { id }
            }"#;

        let data: Option<AuctionIdsData> = self.fetch_graphql(query).await?;
        data.and_then(|d| d.auctions.into_iter().next())
            .map(|auction| {
                auction
                    .id
                    .parse::<u64>()
                    .with_context(|| format!("Invalid auction id '{}'", auction.id))
            })
            .transpose()
    }

    #[instrument(name = "fetch_latest_auction", skip(self))]
    pub async fn fetch_latest_auction(&self) -> Result<Option<AuctionEntity>> {
        let query = format!(
            r#"
            {{
                auctions(orderBy: startTime, orderDirection: desc, first: 1) {{
                    {AUCTION_FIELDS}
                }}
            }}"#
        );

        let data: Option<AuctionsData> = self.fetch_graphql(&query).await?;
        Ok(data.and_then(|d| d.auctions.into_iter().next()))
    }

    /// Fetch the auction for noun `id`. Nounder nouns are minted to the
    /// founders instead of being auctioned; they are reported as settled
    /// zero-amount auctions sharing the timing of the next noun's auction.
    #[instrument(name = "fetch_auction", skip(self))]
    pub async fn fetch_auction(&self, id: u64) -> Result<Option<AuctionEntity>> {
        if !is_nounder_noun(id) {
            return self.fetch_auction_by_id(id).await;
        }

        let Some(next_auction) = self.fetch_auction_by_id(id + 1).await? else {
            debug!(noun_id = id, "No auction follows nounder noun yet");
            return Ok(None);
        };
        let noun = self.fetch_noun(id).await?;

        Ok(noun.map(|noun| AuctionEntity {
            id: noun.id.clone(),
            amount: "0".to_string(),
            settled: true,
            bidder: None,
            start_time: next_auction.start_time,
            end_time: next_auction.end_time,
            noun: Some(noun),
            bids: vec![],
        }))
    }

    async fn fetch_auction_by_id(&self, id: u64) -> Result<Option<AuctionEntity>> {
        let query = format!(
            r#"
            {{
                auction(id: {id}) {{
                    {AUCTION_FIELDS}
                }}
            }}"#
        );

        let data: Option<AuctionData> = self.fetch_graphql(&query).await?;
        Ok(data.and_then(|d| d.auction))
    }

    #[instrument(name = "fetch_noun", skip(self))]
    pub async fn fetch_noun(&self, id: u64) -> Result<Option<NounEntity>> {
        let query = format!(
            r#"
            {{
                noun(id: {id}) {{
                    {NOUN_FIELDS}
                }}
            }}"#
        );

        let data: Option<NounData> = self.fetch_graphql(&query).await?;
        Ok(data.and_then(|d| d.noun))
    }

    /// Fetch the noun balance of `address`; unknown accounts hold zero.
    #[instrument(name = "fetch_account", skip(self))]
    pub async fn fetch_account(&self, address: &str) -> Result<AccountEntity> {
        let address = address.to_lowercase();
        let query = format!(
            r#"
            {{
                account(id: "{address}") {{
                    id
                    tokenBalanceRaw
                }}
            }}"#
        );

        let data: Option<AccountData> = self.fetch_graphql(&query).await?;
        Ok(data.and_then(|d| d.account).unwrap_or(AccountEntity {
            id: address,
            token_balance_raw: "0".to_string(),
        }))
    }

    /// Fetch settled auction amounts, newest first, skipping the live auction.
    #[instrument(name = "fetch_auction_amounts", skip(self))]
    pub async fn fetch_auction_amounts(&self) -> Result<Vec<AuctionAmount>> {
        let query = r#"
            {
                auctions(orderBy: startTime, orderDirection: desc, first: 1000, skip: 1) {
                    id
                    amount
                }
            }"#;

        let data: Option<AuctionAmountsData> = self.fetch_graphql(query).await?;
        Ok(data.map(|d| d.auctions).unwrap_or_default())
    }

    /// Execute a GraphQL query
    async fn fetch_graphql<T>(&self, query: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "query": query }))
            .header("User-Agent", "pronouns/1.0")
            .send()
            .await
            .context(SUBGRAPH_REQUEST_FAILED)?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error {}: {}",
                response.status(),
                response.text().await?
            ));
        }

        let result: GraphqlResponse<T> = response.json().await.context(SUBGRAPH_DECODE_FAILED)?;

        if let Some(errors) = result.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(anyhow!("Subgraph returned errors: {}", messages.join("; ")));
        }

        Ok(result.data)
    }
}

impl Default for SubgraphApi {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::ProposalState;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_fetch_proposals() {
        let mut server = Server::new_async().await;
        let api = SubgraphApi::new_with_endpoint(server.url());

        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::Regex("proposals\\(first: 100".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"
                {
                    "data": {
                        "proposals": [
                            {
                                "id": "601",
                                "title": "Nouns x Public Goods",
                                "status": "ACTIVE",
                                "forVotes": "120",
                                "againstVotes": "12",
                                "abstainVotes": "3",
                                "quorumVotes": "70",
                                "executionETA": null,
                                "startBlock": "20000000",
                                "endBlock": "20028800",
                                "updatePeriodEndBlock": "19985600",
                                "objectionPeriodEndBlock": "0",
                                "onTimelockV1": null,
                                "signers": []
                            },
                            {
                                "id": "600",
                                "title": null,
                                "status": "QUEUED",
                                "forVotes": "200",
                                "againstVotes": "0",
                                "abstainVotes": "0",
                                "quorumVotes": "70",
                                "executionETA": "1717000000",
                                "startBlock": "19900000",
                                "endBlock": "19928800",
                                "updatePeriodEndBlock": null,
                                "objectionPeriodEndBlock": null,
                                "onTimelockV1": true,
                                "signers": [{ "id": "0xabc" }]
                            }
                        ]
                    }
                }
            "#,
            )
            .create_async()
            .await;

        let proposals = api.fetch_proposals(100).await.unwrap();

        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].id, "601");
        assert_eq!(proposals[0].status, ProposalState::Active);
        assert_eq!(proposals[1].title, None);
        assert_eq!(proposals[1].execution_eta.as_deref(), Some("1717000000"));
        assert_eq!(proposals[1].on_timelock_v1, Some(true));
        assert_eq!(proposals[1].signers[0].id, "0xabc");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_graphql_errors_are_surfaced() {
        let mut server = Server::new_async().await;
        let api = SubgraphApi::new_with_endpoint(server.url());

        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "errors": [{ "message": "indexing_error" }] }"#)
            .create_async()
            .await;

        let result = api.fetch_proposals(100).await;

        assert!(result.unwrap_err().to_string().contains("indexing_error"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_latest_noun_id() {
        let mut server = Server::new_async().await;
        let api = SubgraphApi::new_with_endpoint(server.url());

        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "data": { "auctions": [{ "id": "1123" }] } }"#)
            .create_async()
            .await;

        assert_eq!(api.fetch_latest_noun_id().await.unwrap(), Some(1123));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_nounder_auction_uses_next_auction_times() {
        let mut server = Server::new_async().await;
        let api = SubgraphApi::new_with_endpoint(server.url());

        let auction_mock = server
            .mock("POST", "/")
            .match_body(Matcher::Regex("auction\\(id: 1121\\)".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"
                {
                    "data": {
                        "auction": {
                            "id": "1121",
                            "amount": "15000000000000000000",
                            "settled": true,
                            "bidder": { "id": "0xbidder" },
                            "startTime": "1717000000",
                            "endTime": "1717086400",
                            "noun": null,
                            "bids": []
                        }
                    }
                }
            "#,
            )
            .create_async()
            .await;

        let noun_mock = server
            .mock("POST", "/")
            .match_body(Matcher::Regex("noun\\(id: 1120\\)".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"
                {
                    "data": {
                        "noun": {
                            "id": "1120",
                            "seed": { "background": "1", "body": "2", "accessory": "3", "head": "4", "glasses": "5" },
                            "owner": { "id": "0xnounders" }
                        }
                    }
                }
            "#,
            )
            .create_async()
            .await;

        let auction = api.fetch_auction(1120).await.unwrap().unwrap();

        assert_eq!(auction.id, "1120");
        assert!(auction.settled);
        assert_eq!(auction.amount, "0");
        assert_eq!(auction.end_time, "1717086400");
        assert_eq!(auction.noun.unwrap().seed.unwrap().head, "4");

        auction_mock.assert_async().await;
        noun_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_account_defaults_to_zero_balance() {
        let mut server = Server::new_async().await;
        let api = SubgraphApi::new_with_endpoint(server.url());

        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "data": { "account": null } }"#)
            .create_async()
            .await;

        let account = api.fetch_account("0xABC").await.unwrap();

        assert_eq!(account.id, "0xabc");
        assert_eq!(account.token_balance_raw, "0");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_auction_amounts_feeds_trailing_average() {
        let mut server = Server::new_async().await;
        let api = SubgraphApi::new_with_endpoint(server.url());

        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::Regex("first: 1000, skip: 1".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"
                {
                    "data": {
                        "auctions": [
                            { "id": "1122", "amount": "30000000000000000000" },
                            { "id": "1121", "amount": "15000000000000000000" }
                        ]
                    }
                }
            "#,
            )
            .create_async()
            .await;

        let amounts = api.fetch_auction_amounts().await.unwrap();

        assert_eq!(amounts.len(), 2);
        assert_eq!(crate::auction::trailing_average(&amounts, Some(1123)), "22.50");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_errors_are_surfaced() {
        let mut server = Server::new_async().await;
        let api = SubgraphApi::new_with_endpoint(server.url());

        let mock = server
            .mock("POST", "/")
            .with_status(400)
            .with_body("bad query")
            .create_async()
            .await;

        let result = api.fetch_auction_amounts().await;

        assert!(result.unwrap_err().to_string().contains("bad query"));
        mock.assert_async().await;
    }
}
