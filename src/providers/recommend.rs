//! Recommendation capability and its rule-based fallback

use crate::report::{AuditResult, Severity};
use crate::scoring::Category;
use crate::CheckResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Most affected URLs listed on the critical-errors recommendation
const MAX_AFFECTED_URLS: usize = 5;

/// Urgency of a recommendation, P1 being the most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    P3,
}

/// Expected effect of following a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// One actionable recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    /// A category name, or `general`
    pub category: String,
    pub priority: Priority,
    pub estimated_impact: Impact,
    pub implementation_steps: Vec<String>,
    pub affected_urls: Vec<String>,
}

/// A source of recommendations for a finished audit
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Produces recommendations from the scored audit
    async fn recommend(&self, audit: &AuditResult) -> CheckResult<Vec<Recommendation>>;

    /// Human-readable name for logs
    fn name(&self) -> &str;
}

/// Deterministic recommendations derived from scores and issues
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedRecommender;

impl RuleBasedRecommender {
    pub fn recommendations(&self, audit: &AuditResult) -> Vec<Recommendation> {
        let mut recs = Vec::new();
        let scores = &audit.category_scores;

        let errors: Vec<_> = audit
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .collect();
        if !errors.is_empty() {
            recs.push(Recommendation {
                title: "Fix Critical Errors".to_string(),
                description: format!(
                    "There are {} critical errors that need immediate attention.",
                    errors.len()
                ),
                category: "general".to_string(),
                priority: Priority::P1,
                estimated_impact: Impact::High,
                implementation_steps: steps(&[
                    "Review the issues list for all error-severity items",
                    "Prioritise broken links and missing SSL",
                    "Fix each issue and re-audit",
                ]),
                affected_urls: errors
                    .iter()
                    .take(MAX_AFFECTED_URLS)
                    .map(|i| i.affected_url.clone())
                    .collect(),
            });
        }

        if scores.performance < 70.0 {
            recs.push(category_rec(
                "Improve Page Performance",
                "Performance score is below 70. Focus on Core Web Vitals.",
                Category::Performance,
                Priority::P1,
                Impact::High,
                &[
                    "Optimise and compress images",
                    "Minify CSS and JavaScript",
                    "Enable browser caching",
                    "Consider a CDN",
                ],
            ));
        }

        if scores.security < 80.0 {
            recs.push(category_rec(
                "Strengthen Security",
                "Security score needs improvement.",
                Category::Security,
                Priority::P2,
                Impact::Medium,
                &[
                    "Ensure valid SSL certificate",
                    "Add missing security headers",
                    "Fix mixed content issues",
                ],
            ));
        }

        if scores.content_quality < 80.0 {
            recs.push(category_rec(
                "Improve Content Quality",
                "Content quality issues detected.",
                Category::ContentQuality,
                Priority::P2,
                Impact::Medium,
                &[
                    "Fix duplicate titles and descriptions",
                    "Expand thin content pages",
                    "Add missing meta tags and alt text",
                ],
            ));
        }

        if recs.is_empty() {
            recs.push(Recommendation {
                title: "Maintain Current Standards".to_string(),
                description: "The site is in good technical health. Continue monitoring."
                    .to_string(),
                category: "general".to_string(),
                priority: Priority::P3,
                estimated_impact: Impact::Low,
                implementation_steps: steps(&[
                    "Schedule regular monthly audits",
                    "Monitor Core Web Vitals",
                    "Keep content fresh and updated",
                ]),
                affected_urls: Vec::new(),
            });
        }

        recs
    }
}

#[async_trait]
impl RecommendationProvider for RuleBasedRecommender {
    async fn recommend(&self, audit: &AuditResult) -> CheckResult<Vec<Recommendation>> {
        Ok(self.recommendations(audit))
    }

    fn name(&self) -> &str {
        "rule-based"
    }
}

/// Asks the provider for recommendations, falling back to the rules when it
/// fails or has nothing to say
pub async fn generate_recommendations(
    provider: Option<&dyn RecommendationProvider>,
    audit: &AuditResult,
) -> Vec<Recommendation> {
    let Some(provider) = provider else {
        return RuleBasedRecommender.recommendations(audit);
    };

    match provider.recommend(audit).await {
        Ok(recs) if !recs.is_empty() => {
            tracing::info!("{} produced {} recommendation(s)", provider.name(), recs.len());
            recs
        }
        Ok(_) => {
            tracing::warn!("{} returned no recommendations, using rules", provider.name());
            RuleBasedRecommender.recommendations(audit)
        }
        Err(e) => {
            tracing::warn!("Recommendation provider failed: {}", e);
            RuleBasedRecommender.recommendations(audit)
        }
    }
}

fn steps(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn category_rec(
    title: &str,
    description: &str,
    category: Category,
    priority: Priority,
    impact: Impact,
    implementation_steps: &[&str],
) -> Recommendation {
    Recommendation {
        title: title.to_string(),
        description: description.to_string(),
        category: category.as_str().to_string(),
        priority,
        estimated_impact: impact,
        implementation_steps: steps(implementation_steps),
        affected_urls: Vec::new(),
    }
}
