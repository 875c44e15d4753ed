use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::PayNowConfig;
use crate::error::{SyncError, SyncResult};
use crate::models::order::PayNowOrder;

/// One page of completed orders, in ascending id order, starting after
/// the `after` cursor.
#[async_trait]
pub trait OrderPageSource: Send + Sync {
    async fn fetch_page(&self, after: Option<&str>, limit: u32) -> SyncResult<Vec<PayNowOrder>>;
}

#[derive(Clone)]
pub struct PayNowService {
    client: Client,
    api_key: String,
    orders_url: String,
}

impl PayNowService {
    pub fn new(config: &PayNowConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            orders_url: format!("{}/stores/{}/orders", config.base_url, config.store_id),
        }
    }

    pub fn orders_url(&self) -> &str {
        &self.orders_url
    }
}

#[async_trait]
impl OrderPageSource for PayNowService {
    async fn fetch_page(&self, after: Option<&str>, limit: u32) -> SyncResult<Vec<PayNowOrder>> {
        let mut query: Vec<(&str, String)> = vec![
            ("status", "completed".to_string()),
            ("limit", limit.to_string()),
            ("asc", "true".to_string()),
        ];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }

        tracing::debug!(url = %self.orders_url, after = ?after, limit, "Requesting PayNow orders page");

        let response = self
            .client
            .get(&self.orders_url)
            .header("Authorization", format!("APIKey {}", self.api_key))
            .header("Content-Type", "application/json")
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(SyncError::ApiStatus { status, body });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|_| SyncError::UnexpectedResponse(text.clone()))?;
        parse_orders_page(body)
    }
}

/// Decode a list response. Anything other than a JSON array is a contract
/// violation; an element that does not match the order shape is reported
/// against its id when one is present.
pub fn parse_orders_page(body: Value) -> SyncResult<Vec<PayNowOrder>> {
    let items = match body {
        Value::Array(items) => items,
        other => return Err(SyncError::UnexpectedResponse(other.to_string())),
    };

    items
        .into_iter()
        .map(|item| {
            let id = item
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("<unknown>")
                .to_string();
            serde_json::from_value::<PayNowOrder>(item)
                .map_err(|e| SyncError::invalid_order(id, e.to_string()))
        })
        .collect()
}
