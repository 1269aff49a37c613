//! Auditor façade
//!
//! [`Auditor::run`] composes one complete audit: the crawl runs alongside
//! the seed-URL checks (speed, security, mobile), then the link, redirect
//! and content stages fan out over the crawled pages, and finally scores,
//! issues and recommendations are folded into one [`AuditResult`].
//!
//! Only a failed seed fetch aborts the audit. Every optional check ends up
//! as a [`CheckOutcome`], so the caller always gets a result.

use crate::checks::{analyze_content, audit_links, check_mobile, inspect_security, trace_redirects};
use crate::config::{validate, Config, CrawlTarget};
use crate::context::AuditContext;
use crate::crawler::run_crawl;
use crate::providers::{
    generate_recommendations, run_speed_check, PageSpeedInsightsClient, RecommendationProvider,
    SpeedInsightsProvider,
};
use crate::report::{
    compile_issues, compile_passed_checks, AuditFindings, AuditResult, CheckOutcome, CrawlSummary,
};
use crate::scoring::score_audit;
use crate::{AuditError, CheckError, CheckResult};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Runs audits with one configuration and a fixed set of providers
pub struct Auditor {
    config: Config,
    speed_provider: Option<Arc<dyn SpeedInsightsProvider>>,
    recommendation_provider: Option<Arc<dyn RecommendationProvider>>,
}

impl Auditor {
    /// Creates an auditor without any external providers
    ///
    /// # Returns
    ///
    /// * `Ok(Auditor)` - The configuration is valid
    /// * `Err(AuditError::Config)` - Validation failed
    pub fn new(config: Config) -> Result<Self, AuditError> {
        validate(&config)?;
        Ok(Self {
            config,
            speed_provider: None,
            recommendation_provider: None,
        })
    }

    /// Creates an auditor wired to PageSpeed Insights when speed checks are on
    pub fn from_config(config: Config) -> Result<Self, AuditError> {
        let speed_enabled = config.checks.speed;
        let endpoint = config.speed.endpoint.clone();
        let api_key = config.speed.api_key.clone();

        let auditor = Self::new(config)?;
        if !speed_enabled {
            return Ok(auditor);
        }

        let client = PageSpeedInsightsClient::new(&endpoint, api_key)?;
        Ok(auditor.with_speed_provider(Arc::new(client)))
    }

    pub fn with_speed_provider(mut self, provider: Arc<dyn SpeedInsightsProvider>) -> Self {
        self.speed_provider = Some(provider);
        self
    }

    pub fn with_recommendation_provider(
        mut self,
        provider: Arc<dyn RecommendationProvider>,
    ) -> Self {
        self.recommendation_provider = Some(provider);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Audits one domain or URL
    ///
    /// # Arguments
    ///
    /// * `domain` - `example.com` or a full seed URL
    ///
    /// # Returns
    ///
    /// * `Ok(AuditResult)` - Complete, possibly partial if the deadline hit
    /// * `Err(AuditError::SeedFetch)` - The seed URL could not be fetched
    /// * `Err(AuditError)` - The domain was not a usable URL or a client
    ///   could not be built
    pub async fn run(&self, domain: &str) -> Result<AuditResult, AuditError> {
        let started = Instant::now();
        let target = CrawlTarget::new(domain, &self.config.crawler)?;
        let ctx = AuditContext::new(target, &self.config)?;
        let seed_url = ctx.target().start_url().to_string();

        tracing::info!("Auditing {}", ctx.target().domain());

        let checks = &self.config.checks;
        let speed_provider = self
            .speed_provider
            .as_deref()
            .filter(|_| checks.speed);
        if checks.speed && speed_provider.is_none() {
            tracing::debug!("No speed provider configured, skipping speed check");
        }

        let (crawl, speed_data, security_data, mobile_data) = tokio::join!(
            run_crawl(&ctx),
            optional_check(&ctx, "speed", speed_provider.is_some(), async {
                match speed_provider {
                    Some(provider) => run_speed_check(provider, &seed_url).await,
                    None => Err(CheckError::Provider {
                        provider: "speed".to_string(),
                        message: "not configured".to_string(),
                    }),
                }
            }),
            optional_check(&ctx, "security", checks.security, inspect_security(&ctx)),
            optional_check(&ctx, "mobile", checks.mobile, check_mobile(&ctx)),
        );

        let crawl = match crawl {
            Ok(crawl) => crawl,
            Err(e) => {
                tracing::error!("Audit of {} aborted: {}", seed_url, e);
                return Err(e);
            }
        };

        let (broken_links, redirect_chains) = tokio::join!(
            audit_links(&ctx, &crawl.pages),
            trace_redirects(&ctx, &crawl.pages),
        );
        let content_issues = analyze_content(&crawl.pages);

        let findings = AuditFindings {
            pages: crawl.pages,
            robots: crawl.robots,
            sitemap: crawl.sitemap,
            broken_links,
            redirect_chains,
            content_issues,
            speed_data,
            security_data,
            mobile_data,
        };

        let scorecard = score_audit(&findings);
        let issues = compile_issues(&findings, &seed_url);
        let passed_checks = compile_passed_checks(&findings);

        let elapsed_seconds = started.elapsed().as_secs_f64();
        let crawl_summary = CrawlSummary::from_pages(
            &findings.pages,
            crawl.max_depth_reached,
            crawl.elapsed_seconds,
            ctx.deadline_hit(),
        );

        let mut result = AuditResult {
            domain: ctx.target().domain().to_string(),
            url: seed_url,
            timestamp: Utc::now(),
            category_scores: scorecard.categories,
            overall_score: scorecard.overall,
            grade: scorecard.grade,
            issues,
            passed_checks,
            crawl_summary,
            findings,
            recommendations: Vec::new(),
            elapsed_seconds,
        };

        result.recommendations =
            generate_recommendations(self.recommendation_provider.as_deref(), &result).await;

        tracing::info!(
            "Audit of {} complete: {:.1} ({}) with {} issue(s) in {:.1}s",
            result.domain,
            result.overall_score,
            result.grade,
            result.issues.len(),
            result.elapsed_seconds
        );
        Ok(result)
    }
}

/// Runs an optional check under the audit deadline
async fn optional_check<T, F>(
    ctx: &AuditContext,
    name: &str,
    enabled: bool,
    check: F,
) -> CheckOutcome<T>
where
    F: Future<Output = CheckResult<T>>,
{
    if !enabled {
        return CheckOutcome::Skipped;
    }

    let result = ctx.within_deadline(check).await.unwrap_or_else(|| {
        Err(CheckError::Deadline {
            stage: name.to_string(),
        })
    });
    CheckOutcome::from_result(name, result)
}
