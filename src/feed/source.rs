//! REST side of the price feed.

use crate::errors::{AppError, Result};
use crate::feed::protocol::{LATEST_TRADE_QUERY, extract_latest_trade};
use crate::models::PriceUpdate;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

/// Anything that can answer "what is the price right now".
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn latest(&self) -> Result<PriceUpdate>;
}

#[derive(Debug, Deserialize)]
struct PriceBody {
    price: Option<f64>,
    timestamp: Option<f64>,
    error: Option<String>,
}

/// `GET <url>` returning `{price, timestamp}`, i.e. the gateway's own `/api/price`.
#[derive(Debug, Clone)]
pub struct PriceEndpoint {
    client: reqwest::Client,
    url: Url,
}

impl PriceEndpoint {
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            url: Url::parse(url)?,
        })
    }
}

#[async_trait]
impl PriceSource for PriceEndpoint {
    async fn latest(&self) -> Result<PriceUpdate> {
        let resp = self.client.get(self.url.clone()).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<PriceBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or(body);
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: PriceBody = serde_json::from_str(&body)
            .map_err(|e| AppError::MalformedPayload(format!("price body: {e}")))?;
        let price = parsed
            .price
            .ok_or_else(|| AppError::MalformedPayload("missing price".into()))?;
        let timestamp = parsed
            .timestamp
            .ok_or_else(|| AppError::MalformedPayload("missing timestamp".into()))?;
        PriceUpdate::new(price, timestamp as i64)
            .ok_or_else(|| AppError::MalformedPayload(format!("invalid price {price}")))
    }
}

/// Latest trade straight from the Bitquery GraphQL HTTP API.
#[derive(Debug, Clone)]
pub struct BitqueryHttp {
    client: reqwest::Client,
    url: Url,
    token: String,
}

impl BitqueryHttp {
    pub fn new(url: &str, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            url: Url::parse(url)?,
            token: token.into(),
        })
    }
}

#[async_trait]
impl PriceSource for BitqueryHttp {
    async fn latest(&self) -> Result<PriceUpdate> {
        let resp = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "query": LATEST_TRADE_QUERY }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %message, "[HTTP] bitquery request failed");
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| AppError::MalformedPayload(format!("bitquery body: {e}")))?;
        body.get("data")
            .and_then(extract_latest_trade)
            .ok_or_else(|| AppError::MalformedPayload("no price data found in response".into()))
    }
}
