use alloy::primitives::Address;
use anyhow::{Context, Result};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use tracing::{debug, info, instrument};
use utils::errors::{SAFE_DECODE_FAILED, SAFE_REQUEST_FAILED};

pub const SAFE_TRANSACTION_SERVICE_URL: &str = "https://safe-transaction-mainnet.safe.global/api";

// Safety break for `next` link pagination.
const MAX_PAGES: usize = 20;

#[derive(Deserialize, Debug)]
pub struct SafeInfo {
    pub address: String,
    #[serde(deserialize_with = "deserialize_u64")]
    pub nonce: u64,
    #[serde(default)]
    pub threshold: Option<u64>,
}

/// A multisig transaction as listed by the Safe transaction service.
#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SafeTransaction {
    pub to: String,
    pub data: Option<String>,
    #[serde(deserialize_with = "deserialize_u64")]
    pub nonce: u64,
    pub safe_tx_hash: String,
    #[serde(default)]
    pub is_executed: bool,
}

#[derive(Deserialize, Debug)]
pub struct SafeTransactionsPage {
    pub next: Option<String>,
    pub results: Vec<SafeTransaction>,
}

// The service returns nonces as numbers on older deployments and strings on newer ones.
fn deserialize_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Client for the Safe transaction service.
pub struct SafeApi {
    client: ClientWithMiddleware,
    endpoint: String,
}

impl SafeApi {
    pub fn new() -> Self {
        Self::new_with_endpoint(SAFE_TRANSACTION_SERVICE_URL.to_string())
    }

    pub fn new_with_endpoint(endpoint: String) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    #[instrument(name = "fetch_safe_nonce", skip(self))]
    pub async fn fetch_safe_nonce(&self, safe: Address) -> Result<u64> {
        let url = format!("{}/v1/safes/{safe}/", self.endpoint);
        let info: SafeInfo = self.get_json(&url).await?;
        debug!(safe = %safe, nonce = info.nonce, "Fetched Safe nonce");
        Ok(info.nonce)
    }

    /// Fetch unexecuted transactions that can still be executed, i.e. whose
    /// nonce has not been used yet.
    #[instrument(name = "fetch_pending_transactions", skip(self))]
    pub async fn fetch_pending_transactions(&self, safe: Address) -> Result<Vec<SafeTransaction>> {
        let nonce = self.fetch_safe_nonce(safe).await?;

        let mut pending = Vec::new();
        let mut next = Some(format!(
            "{}/v1/safes/{safe}/multisig-transactions/?executed=false&nonce__gte={nonce}",
            self.endpoint
        ));
        let mut pages = 0;

        while let Some(url) = next {
            if pages == MAX_PAGES {
                info!(safe = %safe, pages = pages, "Stopping pending transaction pagination");
                break;
            }
            let page: SafeTransactionsPage = self.get_json(&url).await?;
            pending.extend(page.results.into_iter().filter(|tx| !tx.is_executed));
            next = page.next;
            pages += 1;
        }

        info!(safe = %safe, pending = pending.len(), "Fetched pending Safe transactions");
        Ok(pending)
    }

    async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .context(SAFE_REQUEST_FAILED)?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "HTTP error {}: {}",
                response.status(),
                response.text().await?
            ));
        }

        response.json().await.context(SAFE_DECODE_FAILED)
    }
}

impl Default for SafeApi {
    fn default() -> Self {
        Self::new()
    }
}
