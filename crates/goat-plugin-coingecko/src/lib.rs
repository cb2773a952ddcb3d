//! CoinGecko market data plugin: trending coins, spot prices, and coin
//! search. Chain-agnostic; none of the tools touch the wallet.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use goat_core::{
    define_tool, Chain, DiscoveryError, ExecutionError, Field, Plugin, Schema, ToolDescriptor,
    Wallet,
};

const PUBLIC_API_URL: &str = "https://api.coingecko.com/api/v3";
const PRO_API_URL: &str = "https://pro-api.coingecko.com/api/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    pub api_key: String,
    /// Pro keys use a different host and auth header.
    pub pro: bool,
}

// ── API client ─────────────────────────────────────────────────────

struct CoinGeckoApi {
    client: reqwest::Client,
    base_url: &'static str,
    api_key: String,
    pro: bool,
}

impl CoinGeckoApi {
    fn new(config: &CoinGeckoConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: if config.pro { PRO_API_URL } else { PUBLIC_API_URL },
            api_key: config.api_key.clone(),
            pro: config.pro,
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ExecutionError> {
        let url = format!("{}{path}", self.base_url);
        let header = if self.pro {
            "x-cg-pro-api-key"
        } else {
            "x-cg-demo-api-key"
        };

        debug!(%url, "CoinGecko request");

        let resp = self
            .client
            .get(&url)
            .header(header, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| ExecutionError::new(format!("CoinGecko unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(ExecutionError::new(format!(
                "CoinGecko returned HTTP {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| ExecutionError::new(format!("invalid CoinGecko response: {e}")))
    }
}

// ── Plugin ─────────────────────────────────────────────────────────

/// Market data tools backed by the CoinGecko REST API.
pub struct CoinGeckoPlugin {
    api: Arc<CoinGeckoApi>,
}

impl CoinGeckoPlugin {
    pub fn new(config: CoinGeckoConfig) -> Self {
        Self {
            api: Arc::new(CoinGeckoApi::new(&config)),
        }
    }
}

#[async_trait]
impl Plugin for CoinGeckoPlugin {
    fn name(&self) -> &str {
        "coingecko"
    }

    // Market data is the same on every chain.
    fn supports_chain(&self, _chain: &Chain) -> bool {
        true
    }

    fn supports_smart_wallets(&self) -> bool {
        true
    }

    async fn tools(&self, _wallet: &Wallet) -> Result<Vec<ToolDescriptor>, DiscoveryError> {
        let mut tools = Vec::new();

        let api = self.api.clone();
        tools.push(define_tool(
            "get_trending_coins",
            "Get the coins currently trending on CoinGecko",
            Schema::new().field(
                Field::integer("limit")
                    .minimum(1)
                    .maximum(50)
                    .default_value(json!(10))
                    .describe("Maximum number of trending coins to return"),
            ),
            move |args| {
                let api = api.clone();
                async move {
                    let limit = args["limit"].as_u64().unwrap_or(10) as usize;
                    let data = api.get("/search/trending", &[]).await?;
                    let coins: Vec<Value> = data["coins"]
                        .as_array()
                        .map(|c| c.iter().take(limit).cloned().collect())
                        .unwrap_or_default();
                    Ok(json!({ "coins": coins }))
                }
            },
        ));

        let api = self.api.clone();
        tools.push(define_tool(
            "get_coin_price",
            "Get the current price of a coin by its CoinGecko id",
            Schema::new()
                .field(
                    Field::string("coin_id")
                        .describe("The CoinGecko coin id, e.g. 'bitcoin'")
                        .required(),
                )
                .field(
                    Field::string("vs_currency")
                        .default_value(json!("usd"))
                        .describe("The currency to quote the price in"),
                )
                .field(
                    Field::boolean("include_market_cap")
                        .default_value(json!(false))
                        .describe("Include the market cap in the response"),
                )
                .field(
                    Field::boolean("include_24h_change")
                        .default_value(json!(false))
                        .describe("Include the 24 hour price change in the response"),
                ),
            move |args| {
                let api = api.clone();
                async move {
                    let coin_id = args["coin_id"].as_str().unwrap_or_default().to_string();
                    let vs = args["vs_currency"].as_str().unwrap_or("usd").to_string();
                    let market_cap = args["include_market_cap"].as_bool().unwrap_or(false);
                    let change = args["include_24h_change"].as_bool().unwrap_or(false);

                    api.get(
                        "/simple/price",
                        &[
                            ("ids", coin_id),
                            ("vs_currencies", vs),
                            ("include_market_cap", market_cap.to_string()),
                            ("include_24hr_change", change.to_string()),
                        ],
                    )
                    .await
                }
            },
        ));

        let api = self.api.clone();
        tools.push(define_tool(
            "search_coins",
            "Search for coins on CoinGecko by name or symbol",
            Schema::new()
                .field(
                    Field::string("query")
                        .describe("The search query")
                        .required(),
                )
                .field(
                    Field::boolean("exact_match")
                        .default_value(json!(false))
                        .describe("Only return coins whose name or symbol matches exactly"),
                ),
            move |args| {
                let api = api.clone();
                async move {
                    let query = args["query"].as_str().unwrap_or_default().to_string();
                    let exact = args["exact_match"].as_bool().unwrap_or(false);

                    let data = api.get("/search", &[("query", query.clone())]).await?;
                    if !exact {
                        return Ok(data);
                    }

                    let needle = query.to_lowercase();
                    let coins: Vec<Value> = data["coins"]
                        .as_array()
                        .map(|c| {
                            c.iter()
                                .filter(|coin| {
                                    let name = coin["name"].as_str().unwrap_or_default();
                                    let symbol = coin["symbol"].as_str().unwrap_or_default();
                                    name.to_lowercase() == needle
                                        || symbol.to_lowercase() == needle
                                })
                                .cloned()
                                .collect()
                        })
                        .unwrap_or_default();
                    Ok(json!({ "coins": coins }))
                }
            },
        ));

        Ok(tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goat_core::{Balance, Signature, WalletClient, WalletError};

    struct NoopWallet;

    #[async_trait]
    impl WalletClient for NoopWallet {
        fn get_address(&self) -> String {
            "noop".to_string()
        }

        fn get_chain(&self) -> Chain {
            Chain::evm(1)
        }

        async fn sign_message(&self, _message: &str) -> Result<Signature, WalletError> {
            Err(WalletError::Signing("noop".to_string()))
        }

        async fn balance_of(&self, _address: &str) -> Result<Balance, WalletError> {
            Err(WalletError::Network("noop".to_string()))
        }
    }

    fn plugin() -> CoinGeckoPlugin {
        CoinGeckoPlugin::new(CoinGeckoConfig {
            api_key: "test-key".to_string(),
            pro: false,
        })
    }

    #[test]
    fn supports_every_chain() {
        let p = plugin();
        assert!(p.supports_chain(&Chain::evm(1)));
        assert!(p.supports_chain(&Chain::solana()));
    }

    #[tokio::test]
    async fn exposes_the_three_market_data_tools() {
        let wallet = Wallet::Other(Arc::new(NoopWallet));
        let tools = plugin().tools(&wallet).await.unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec!["get_trending_coins", "get_coin_price", "search_coins"]
        );
    }

    #[tokio::test]
    async fn trending_limit_defaults_and_bounds_are_enforced() {
        let wallet = Wallet::Other(Arc::new(NoopWallet));
        let tools = plugin().tools(&wallet).await.unwrap();
        let trending = &tools[0];

        let schema = trending.parameters().to_json_schema();
        assert_eq!(schema["properties"]["limit"]["default"], json!(10));

        // Out-of-range limit is rejected before any network call.
        let err = trending.execute(json!({"limit": 500})).await.unwrap_err();
        assert!(matches!(err, goat_core::InvocationError::Validation(_)));
    }

    #[tokio::test]
    async fn price_requires_a_coin_id() {
        let wallet = Wallet::Other(Arc::new(NoopWallet));
        let tools = plugin().tools(&wallet).await.unwrap();
        let price = &tools[1];

        let err = price.execute(json!({})).await.unwrap_err();
        match err {
            goat_core::InvocationError::Validation(e) => assert_eq!(e.field, "coin_id"),
            goat_core::InvocationError::Execution(_) => panic!("expected validation error"),
        }
    }
}
