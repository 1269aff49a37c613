//! Audit-scoped context
//!
//! One [`AuditContext`] lives for exactly one audit. It owns the HTTP
//! clients, the shared concurrency limiter and the optional deadline, and is
//! passed by reference through every stage.

use crate::config::{Config, CrawlTarget};
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Maximum redirects the following client will chase
const MAX_FOLLOWED_REDIRECTS: usize = 10;

/// Shared state of one audit invocation
#[derive(Debug)]
pub struct AuditContext {
    target: CrawlTarget,
    user_agent: String,
    robots_token: String,
    client: Client,
    no_redirect_client: Client,
    request_timeout: Duration,
    limiter: Arc<Semaphore>,
    deadline: Option<Instant>,
    deadline_hit: AtomicBool,
}

impl AuditContext {
    /// Builds the context for one audit
    ///
    /// # Returns
    ///
    /// * `Ok(AuditContext)` - Ready to run
    /// * `Err(reqwest::Error)` - An HTTP client could not be built
    pub fn new(target: CrawlTarget, config: &Config) -> Result<Self, reqwest::Error> {
        let user_agent = config.user_agent.header_value();
        let request_timeout = Duration::from_secs(config.crawler.request_timeout_secs);

        let client = build_http_client(&user_agent, request_timeout, true)?;
        let no_redirect_client = build_http_client(&user_agent, request_timeout, false)?;

        let deadline = config
            .crawler
            .audit_deadline_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        Ok(Self {
            limiter: Arc::new(Semaphore::new(target.concurrency())),
            target,
            user_agent,
            robots_token: config.user_agent.robots_token().to_string(),
            client,
            no_redirect_client,
            request_timeout,
            deadline,
            deadline_hit: AtomicBool::new(false),
        })
    }

    pub fn target(&self) -> &CrawlTarget {
        &self.target
    }

    /// Full User-Agent header value
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Agent token robots.txt groups are matched against
    pub fn robots_token(&self) -> &str {
        &self.robots_token
    }

    /// Client that follows up to ten redirects
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Client that never follows redirects
    pub fn no_redirect_client(&self) -> &Client {
        &self.no_redirect_client
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once the deadline has passed
    pub fn deadline_passed(&self) -> bool {
        let passed = self.deadline.map(|d| Instant::now() >= d).unwrap_or(false);
        if passed {
            self.mark_deadline_hit();
        }
        passed
    }

    pub fn mark_deadline_hit(&self) {
        self.deadline_hit.store(true, Ordering::Relaxed);
    }

    /// True if any stage was cut short by the deadline
    pub fn deadline_hit(&self) -> bool {
        self.deadline_hit.load(Ordering::Relaxed)
    }

    /// Runs one task, giving up when the audit deadline passes
    pub async fn within_deadline<F: Future>(&self, task: F) -> Option<F::Output> {
        match self.deadline {
            Some(at) => match tokio::time::timeout_at(at, task).await {
                Ok(output) => Some(output),
                Err(_) => {
                    self.mark_deadline_hit();
                    None
                }
            },
            None => Some(task.await),
        }
    }

    /// Runs tasks concurrently under the shared limiter until all finish or
    /// the audit deadline passes
    ///
    /// Results come back in task order. Tasks still in flight at the deadline
    /// are dropped and only the finished ones are returned.
    ///
    /// # Returns
    ///
    /// The finished results and whether the deadline cut the batch short
    pub async fn run_bounded<I, F, T>(&self, tasks: I) -> (Vec<T>, bool)
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = T>,
    {
        let mut in_flight: FuturesUnordered<_> = tasks
            .into_iter()
            .enumerate()
            .map(|(index, task)| {
                let limiter = Arc::clone(&self.limiter);
                async move {
                    // The limiter is never closed, so acquire only fails if it is
                    let _permit = limiter.acquire_owned().await.ok();
                    (index, task.await)
                }
            })
            .collect();

        let mut finished = Vec::with_capacity(in_flight.len());
        let mut cut_short = false;

        loop {
            let next = match self.deadline {
                Some(at) => match tokio::time::timeout_at(at, in_flight.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        cut_short = true;
                        break;
                    }
                },
                None => in_flight.next().await,
            };

            match next {
                Some(result) => finished.push(result),
                None => break,
            }
        }

        if cut_short {
            tracing::warn!(
                "Audit deadline reached with {} request(s) still in flight",
                in_flight.len()
            );
            self.mark_deadline_hit();
        }

        finished.sort_by_key(|(index, _)| *index);
        (finished.into_iter().map(|(_, result)| result).collect(), cut_short)
    }
}

/// Builds an HTTP client with the audit's user agent
///
/// # Arguments
///
/// * `user_agent` - Full User-Agent header value
/// * `timeout` - Per-request timeout
/// * `follow_redirects` - Follow up to ten redirects, or none at all
pub fn build_http_client(
    user_agent: &str,
    timeout: Duration,
    follow_redirects: bool,
) -> Result<Client, reqwest::Error> {
    let policy = if follow_redirects {
        Policy::limited(MAX_FOLLOWED_REDIRECTS)
    } else {
        Policy::none()
    };

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(policy)
        .gzip(true)
        .brotli(true)
        .build()
}
