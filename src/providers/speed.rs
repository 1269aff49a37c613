//! Speed-insights capability
//!
//! The auditor never talks to a performance service directly. It is handed
//! an optional [`SpeedInsightsProvider`] and asks it for one analysis per
//! [`Strategy`].

use crate::CheckResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device profile an analysis is run for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Performance score and Core Web Vitals for one strategy
///
/// Timings are in milliseconds; `cls` is unitless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyMetrics {
    /// 0-100
    pub performance_score: f64,
    pub lcp: Option<f64>,
    pub inp: Option<f64>,
    pub cls: Option<f64>,
    pub ttfb: Option<f64>,
    pub fcp: Option<f64>,
    pub speed_index: Option<f64>,
}

/// A suggested optimization with its estimated savings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub savings_ms: f64,
    pub score: Option<f64>,
}

/// What a provider returns for one strategy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyAnalysis {
    pub metrics: StrategyMetrics,
    /// Sorted by savings, largest first
    pub opportunities: Vec<Opportunity>,
}

/// Combined mobile and desktop results for the seed URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedReport {
    pub url: String,
    pub mobile: StrategyMetrics,
    pub desktop: StrategyMetrics,
    /// Mobile opportunities
    pub opportunities: Vec<Opportunity>,
}

/// A service able to measure page performance
#[async_trait]
pub trait SpeedInsightsProvider: Send + Sync {
    /// Analyze one URL for one strategy
    async fn analyze(&self, url: &str, strategy: Strategy) -> CheckResult<StrategyAnalysis>;

    /// Human-readable name for logs
    fn name(&self) -> &str;
}

/// Runs the mobile and desktop analyses concurrently
///
/// Either strategy failing fails the whole check.
pub async fn run_speed_check(
    provider: &dyn SpeedInsightsProvider,
    url: &str,
) -> CheckResult<SpeedReport> {
    tracing::info!("Requesting speed insights from {} for {}", provider.name(), url);
    let (mobile, desktop) = tokio::join!(
        provider.analyze(url, Strategy::Mobile),
        provider.analyze(url, Strategy::Desktop),
    );
    let mobile = mobile?;
    let desktop = desktop?;

    tracing::info!(
        "Speed insights: mobile={:.0}, desktop={:.0}",
        mobile.metrics.performance_score,
        desktop.metrics.performance_score
    );
    Ok(SpeedReport {
        url: url.to_string(),
        mobile: mobile.metrics,
        desktop: desktop.metrics,
        opportunities: mobile.opportunities,
    })
}
