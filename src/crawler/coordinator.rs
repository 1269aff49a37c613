//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator walks the phases `Init → RobotsFetched → SitemapResolved →
//! Crawling → Done`. Crawling is a level-synchronized breadth-first
//! expansion: every URL of one depth is fetched concurrently under the
//! shared limiter, and the next level is only built once the whole batch has
//! finished. URLs are claimed in the visited index before they are fetched,
//! so no URL is fetched twice and no more than `max_pages` are fetched.

use crate::context::AuditContext;
use crate::crawler::fetcher::fetch_page;
use crate::crawler::page::PageRecord;
use crate::crawler::state::CrawlPhase;
use crate::robots::{fetch_robots, RobotsPolicy};
use crate::sitemap::{discover_sitemaps, SitemapReport};
use crate::url::{normalize_url, Claim, VisitedIndex};
use crate::AuditError;
use std::time::{Duration, Instant};

/// Longest robots.txt crawl-delay honoured between levels (seconds)
const MAX_CRAWL_DELAY_SECS: f64 = 10.0;

/// Everything the crawl stage produces
#[derive(Debug, Clone)]
pub struct CrawlOutput {
    /// Fetched pages in breadth-first order
    pub pages: Vec<PageRecord>,
    pub robots: RobotsPolicy,
    pub sitemap: SitemapReport,
    /// Deepest level that was fetched
    pub max_depth_reached: usize,
    /// Wall-clock duration of the crawl stage (seconds)
    pub elapsed_seconds: f64,
    /// True if the audit deadline stopped the crawl early
    pub deadline_hit: bool,
}

/// Runs a complete crawl for the context's target
///
/// # Returns
///
/// * `Ok(CrawlOutput)` - Crawl finished (possibly cut short by the deadline)
/// * `Err(AuditError::SeedFetch)` - The seed URL could not be fetched
pub async fn run_crawl(ctx: &AuditContext) -> Result<CrawlOutput, AuditError> {
    Coordinator::new(ctx).run().await
}

/// Main crawler coordinator structure
pub struct Coordinator<'a> {
    ctx: &'a AuditContext,
    phase: CrawlPhase,
    visited: VisitedIndex,
}

impl<'a> Coordinator<'a> {
    /// Creates a coordinator bound to one audit context
    pub fn new(ctx: &'a AuditContext) -> Self {
        Self {
            ctx,
            phase: CrawlPhase::Init,
            visited: VisitedIndex::new(ctx.target().max_pages()),
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    fn advance(&mut self, to: CrawlPhase) -> Result<(), AuditError> {
        if !self.phase.can_transition_to(to) {
            return Err(AuditError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        tracing::debug!("Crawl phase {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }

    /// Runs the crawl to completion
    pub async fn run(mut self) -> Result<CrawlOutput, AuditError> {
        let started = Instant::now();
        let ctx = self.ctx;
        let target = ctx.target();
        let origin = target.origin();

        tracing::info!(
            "Starting crawl of {} (max {} pages, depth {}, concurrency {})",
            target.start_url(),
            target.max_pages(),
            target.max_depth(),
            target.concurrency()
        );

        let robots = ctx
            .within_deadline(fetch_robots(ctx.client(), &origin, ctx.robots_token()))
            .await
            .unwrap_or_else(RobotsPolicy::missing);
        self.advance(CrawlPhase::RobotsFetched)?;

        let sitemap = ctx
            .within_deadline(discover_sitemaps(ctx.client(), &origin, &robots.sitemap_urls))
            .await
            .unwrap_or_default();
        self.advance(CrawlPhase::SitemapResolved)?;

        self.advance(CrawlPhase::Crawling)?;
        let (pages, max_depth_reached) = self.crawl_levels(&robots).await?;
        self.advance(CrawlPhase::Done)?;

        let elapsed_seconds = started.elapsed().as_secs_f64();
        tracing::info!(
            "Crawl complete: {} page(s) in {:.1}s",
            pages.len(),
            elapsed_seconds
        );

        Ok(CrawlOutput {
            pages,
            robots,
            sitemap,
            max_depth_reached,
            elapsed_seconds,
            deadline_hit: ctx.deadline_hit(),
        })
    }

    /// Fetches the frontier level by level
    ///
    /// The seed URL is always fetched, even if robots.txt disallows it.
    async fn crawl_levels(&self, robots: &RobotsPolicy) -> Result<(Vec<PageRecord>, usize), AuditError> {
        let target = self.ctx.target();
        let seed = target.start_url().to_string();
        self.visited.try_claim(&normalize_url(&seed)?);

        let crawl_delay = robots
            .crawl_delay
            .map(|secs| Duration::from_secs_f64(secs.min(MAX_CRAWL_DELAY_SECS)));

        let mut pages: Vec<PageRecord> = Vec::new();
        let mut frontier = vec![seed.clone()];
        let mut depth = 0;

        loop {
            let client = self.ctx.client();
            let site = target.site();
            let tasks = frontier
                .iter()
                .map(|url| fetch_page(client, url, depth, site));
            let (fetched, cut_short) = self.ctx.run_bounded(tasks).await;

            if depth == 0 {
                check_seed(&seed, fetched.first())?;
            }

            tracing::info!(
                "Depth {}: fetched {} of {} page(s), {} visited",
                depth,
                fetched.len(),
                frontier.len(),
                self.visited.len()
            );

            let level_start = pages.len();
            pages.extend(fetched);

            if cut_short || depth >= target.max_depth() || self.visited.is_full() {
                break;
            }

            frontier = self.next_frontier(&pages[level_start..], robots);
            if frontier.is_empty() || self.ctx.deadline_passed() {
                break;
            }

            if let Some(delay) = crawl_delay {
                tracing::debug!("Honouring crawl-delay of {:?}", delay);
                tokio::time::sleep(delay).await;
            }
            depth += 1;
        }

        Ok((pages, depth))
    }

    /// Claims the next level's URLs from one level's internal links
    ///
    /// Links already visited, disallowed by robots.txt or beyond capacity are
    /// pruned here, before any fetch is scheduled.
    fn next_frontier(&self, level: &[PageRecord], robots: &RobotsPolicy) -> Vec<String> {
        let mut next = Vec::new();

        for link in level.iter().flat_map(|page| page.internal_links.iter()) {
            let key = match normalize_url(&link.url) {
                Ok(key) => key,
                Err(e) => {
                    tracing::debug!("Failed to normalize URL {}: {}", link.url, e);
                    continue;
                }
            };

            if self.visited.contains(&key) {
                continue;
            }

            if !robots.is_allowed(&link.url) {
                tracing::debug!("URL {} disallowed by robots.txt", link.url);
                continue;
            }

            match self.visited.try_claim(&key) {
                Claim::Claimed => next.push(link.url.clone()),
                Claim::AlreadyVisited => {}
                Claim::CapacityReached => {
                    tracing::info!("Reached max pages ({})", self.visited.capacity());
                    break;
                }
            }
        }

        next
    }
}

/// The seed page must have produced a response
fn check_seed(seed: &str, page: Option<&PageRecord>) -> Result<(), AuditError> {
    match page {
        Some(page) if page.status_code != 0 => Ok(()),
        Some(page) => {
            let err = AuditError::SeedFetch {
                url: seed.to_string(),
                message: page.error.clone().unwrap_or_else(|| "no response".to_string()),
            };
            tracing::error!("{}", err);
            Err(err)
        }
        None => Err(AuditError::SeedFetch {
            url: seed.to_string(),
            message: "audit deadline reached before the seed URL was fetched".to_string(),
        }),
    }
}
