//! PageSpeed Insights v5 adapter

use crate::providers::speed::{
    Opportunity, SpeedInsightsProvider, Strategy, StrategyAnalysis, StrategyMetrics,
};
use crate::{CheckError, CheckResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const PROVIDER_NAME: &str = "PageSpeed Insights";

/// Lighthouse runs are slow; this is independent of the crawl timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Speed provider backed by the public PageSpeed Insights JSON API
#[derive(Debug, Clone)]
pub struct PageSpeedInsightsClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl PageSpeedInsightsClient {
    /// Creates a client for the given API endpoint
    ///
    /// # Returns
    ///
    /// * `Ok(PageSpeedInsightsClient)` - Ready to use
    /// * `Err(reqwest::Error)` - The HTTP client could not be built
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn provider_error(message: impl Into<String>) -> CheckError {
        CheckError::Provider {
            provider: PROVIDER_NAME.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl SpeedInsightsProvider for PageSpeedInsightsClient {
    async fn analyze(&self, url: &str, strategy: Strategy) -> CheckResult<StrategyAnalysis> {
        let mut query = vec![
            ("url", url),
            ("strategy", strategy.as_str()),
            ("category", "performance"),
        ];
        if let Some(key) = &self.api_key {
            query.push(("key", key.as_str()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| Self::provider_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::provider_error(format!(
                "API answered {} for {} ({})",
                status.as_u16(),
                url,
                strategy
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Self::provider_error(e.to_string()))?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| Self::provider_error(format!("invalid JSON: {}", e)))?;

        tracing::debug!("PageSpeed {} analysis received for {}", strategy, url);
        parse_lighthouse(&body)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

/// Extracts the performance score, metrics and opportunities of a response
pub fn parse_lighthouse(body: &Value) -> CheckResult<StrategyAnalysis> {
    let lighthouse = body
        .get("lighthouseResult")
        .ok_or_else(|| PageSpeedInsightsClient::provider_error("response has no lighthouseResult"))?;

    let performance_score = lighthouse
        .pointer("/categories/performance/score")
        .and_then(Value::as_f64)
        .map(|score| round_to(score * 100.0, 1))
        .unwrap_or(0.0);

    let empty = Value::Null;
    let audits = lighthouse.get("audits").unwrap_or(&empty);
    let metric = |key: &str| {
        audits
            .get(key)
            .and_then(|audit| audit.get("numericValue"))
            .and_then(Value::as_f64)
            .map(|v| round_to(v, 2))
    };

    let metrics = StrategyMetrics {
        performance_score,
        lcp: metric("largest-contentful-paint"),
        inp: metric("interaction-to-next-paint"),
        cls: metric("cumulative-layout-shift"),
        ttfb: metric("server-response-time"),
        fcp: metric("first-contentful-paint"),
        speed_index: metric("speed-index"),
    };

    let mut opportunities: Vec<Opportunity> = audits
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(id, audit)| {
                    let details = audit.get("details")?;
                    if details.get("type")?.as_str()? != "opportunity" {
                        return None;
                    }
                    let savings_ms = details.get("overallSavingsMs")?.as_f64()?;
                    if savings_ms <= 0.0 {
                        return None;
                    }
                    Some(Opportunity {
                        id: id.clone(),
                        title: audit
                            .get("title")
                            .and_then(Value::as_str)
                            .unwrap_or(id.as_str())
                            .to_string(),
                        description: audit
                            .get("description")
                            .and_then(Value::as_str)
                            .unwrap_or("")
                            .to_string(),
                        savings_ms,
                        score: audit.get("score").and_then(Value::as_f64),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    opportunities.sort_by(|a, b| b.savings_ms.total_cmp(&a.savings_ms));

    Ok(StrategyAnalysis {
        metrics,
        opportunities,
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
