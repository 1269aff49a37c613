/// Crawl phase definitions
///
/// A crawl moves strictly forward through these phases; the orchestrator
/// refuses any other transition.
use std::fmt;

/// Represents the current phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Nothing fetched yet
    Init,

    /// robots.txt fetched (or found missing)
    RobotsFetched,

    /// Sitemaps resolved
    SitemapResolved,

    /// Frontier expansion in progress
    Crawling,

    /// Crawl finished
    Done,
}

impl CrawlPhase {
    /// The only phase that may follow this one
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::RobotsFetched),
            Self::RobotsFetched => Some(Self::SitemapResolved),
            Self::SitemapResolved => Some(Self::Crawling),
            Self::Crawling => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Returns true if moving to `to` is allowed
    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    /// Returns true once the crawl has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::RobotsFetched => "robots_fetched",
            Self::SitemapResolved => "sitemap_resolved",
            Self::Crawling => "crawling",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
