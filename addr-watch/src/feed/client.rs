use super::types::{AddressHistory, TxFeed};
use super::TxSource;
use crate::config::FeedConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// HTTP client for the blockchain.info style data provider.
pub struct FeedClient {
    base_url: String,
    history_limit: u32,
    client: Client,
}

impl FeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                let msg = format!("Failed to build HTTP client: {}", e);
                error!("{}", msg);
                msg
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            history_limit: config.history_limit,
            client,
        })
    }

    /// Current memory pool snapshot. Never fails: any error yields `TxFeed::failed()`.
    pub async fn fetch_unconfirmed(&self) -> TxFeed {
        let url = format!("{}/unconfirmed-transactions", self.base_url);
        let query = [("format", "json".to_string())];

        match self.get_json(&url, &query).await {
            Ok(value) => TxFeed::from_value(value).unwrap_or_else(|e| {
                warn!("Discarding unconfirmed transaction feed: {}", e);
                TxFeed::failed()
            }),
            Err(e) => {
                warn!("Failed to retrieve unconfirmed transactions: {}", e);
                TxFeed::failed()
            }
        }
    }

    /// First page of the address history, at most `history_limit` records.
    /// Further pages are not requested.
    pub async fn fetch_history(&self, address: &str) -> Option<AddressHistory> {
        let url = format!("{}/rawaddr/{}", self.base_url, address);
        let query = [("limit", self.history_limit.to_string())];

        let value = match self.get_json(&url, &query).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to retrieve history for {}: {}", address, e);
                return None;
            }
        };

        let history = AddressHistory::from_value(address, value).ok()?;
        if history.n_tx > history.txs.len() as u64 {
            info!(
                "History for {} holds {} transactions, only {} fetched",
                address,
                history.n_tx,
                history.txs.len()
            );
        }

        Some(history)
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, String> {
        debug!("GET {}", url);

        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Failed to send request to {}: {}", url, e);
                error!("{}", msg);
                msg
            })?
            .error_for_status()
            .map_err(|e| {
                let msg = format!("Request to {} failed: {}", url, e);
                error!("{}", msg);
                msg
            })?;

        resp.json::<Value>().await.map_err(|e| {
            let msg = format!("Failed to parse response from {}: {}", url, e);
            error!("{}", msg);
            msg
        })
    }
}

#[async_trait]
impl TxSource for FeedClient {
    async fn unconfirmed(&self) -> TxFeed {
        self.fetch_unconfirmed().await
    }

    async fn history(&self, address: &str) -> Option<AddressHistory> {
        self.fetch_history(address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher;
    use crate::test_util::serve;
    use axum::Router;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Json;
    use serde_json::json;
    use std::collections::HashMap;

    fn config_for(base_url: &str) -> FeedConfig {
        FeedConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            history_limit: 500,
        }
    }

    #[tokio::test]
    async fn test_fetch_unconfirmed() {
        let router = Router::new().route(
            "/unconfirmed-transactions",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("format").map(String::as_str) != Some("json") {
                    return Err(StatusCode::BAD_REQUEST);
                }

                Ok(Json(json!({
                    "txs": [{
                        "inputs": [{"prev_out": {"addr": "A"}}],
                        "out": [{"addr": "B"}]
                    }]
                })))
            }),
        );
        let base_url = serve(router).await;

        let client = FeedClient::new(&config_for(&base_url)).unwrap();
        let feed = client.fetch_unconfirmed().await;
        assert!(!feed.is_failed());
        assert_eq!(feed.records().len(), 1);

        assert!(matcher::sent_from(feed.records(), "A"));
        assert!(!matcher::received_by(feed.records(), "A"));
        assert!(matcher::received_by(feed.records(), "B"));
    }

    #[tokio::test]
    async fn test_fetch_unconfirmed_error_status() {
        let router = Router::new().route(
            "/unconfirmed-transactions",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base_url = serve(router).await;

        let client = FeedClient::new(&config_for(&base_url)).unwrap();
        let feed = client.fetch_unconfirmed().await;
        assert!(feed.is_failed());
        assert!(feed.records().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_unconfirmed_malformed_body() {
        let router = Router::new()
            .route("/unconfirmed-transactions", get(|| async { "<html>not json</html>" }));
        let base_url = serve(router).await;

        let client = FeedClient::new(&config_for(&base_url)).unwrap();
        assert!(client.fetch_unconfirmed().await.is_failed());

        let router = Router::new().route(
            "/unconfirmed-transactions",
            get(|| async { Json(json!({"unexpected": true})) }),
        );
        let base_url = serve(router).await;

        let client = FeedClient::new(&config_for(&base_url)).unwrap();
        assert!(client.fetch_unconfirmed().await.is_failed());
    }

    #[tokio::test]
    async fn test_transport_failure() {
        // Nothing listens on port 1
        let client = FeedClient::new(&config_for("http://127.0.0.1:1")).unwrap();

        let feed = client.fetch_unconfirmed().await;
        assert!(feed.is_failed());
        assert!(!matcher::sent_from(feed.records(), "A"));
        assert!(!matcher::received_by(feed.records(), "A"));

        assert!(client.fetch_history("A").await.is_none());
        assert!(matcher::history(&client, "A").await.is_empty());
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let router = Router::new().route(
            "/unconfirmed-transactions",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"txs": []}))
            }),
        );
        let base_url = serve(router).await;

        let mut config = config_for(&base_url);
        config.timeout_secs = 1;
        let client = FeedClient::new(&config).unwrap();
        assert!(client.fetch_unconfirmed().await.is_failed());
    }

    #[tokio::test]
    async fn test_fetch_history() {
        let router = Router::new().route(
            "/rawaddr/{address}",
            get(
                |Path(address): Path<String>, Query(params): Query<HashMap<String, String>>| async move {
                    if params.get("limit").map(String::as_str) != Some("500") {
                        return Err(StatusCode::BAD_REQUEST);
                    }

                    Ok(Json(json!({
                        "address": address,
                        "n_tx": 2000,
                        "txs": [
                            {"inputs": [{"prev_out": {"addr": "X"}}], "out": [{"addr": address, "value": 1200}]},
                            {"inputs": [], "out": [{"addr": "Y", "value": 1}]}
                        ]
                    })))
                },
            ),
        );
        let base_url = serve(router).await;

        // Trailing slash is trimmed before paths are appended
        let client = FeedClient::new(&config_for(&format!("{}/", base_url))).unwrap();

        let history = client.fetch_history("A").await.unwrap();
        assert_eq!(history.address, "A");
        assert_eq!(history.n_tx, 2000);
        assert_eq!(history.txs.len(), 2);

        let summaries = matcher::history(&client, "A").await;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].from, "X");
        assert_eq!(summaries[0].to, "A");
        assert_eq!(summaries[0].amount, 1200);
    }
}
