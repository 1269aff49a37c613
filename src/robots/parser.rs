//! Robots.txt parser implementation
//!
//! Directive lists are extracted by hand for reporting; allow/deny decisions
//! are delegated to the robotstxt crate's matcher against the raw content.

use robotstxt::DefaultMatcher;
use serde::{Deserialize, Serialize};

/// Parsed robots.txt data for one site and one crawler agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotsPolicy {
    /// Whether robots.txt was served with HTTP 200
    pub exists: bool,

    /// Disallow paths from groups that apply to us
    pub disallowed_paths: Vec<String>,

    /// Allow paths from groups that apply to us
    pub allowed_paths: Vec<String>,

    /// Sitemap URLs advertised anywhere in the file
    pub sitemap_urls: Vec<String>,

    /// Crawl-delay in seconds from a group that applies to us
    pub crawl_delay: Option<f64>,

    /// Agent token the rules were evaluated for
    #[serde(skip)]
    agent: String,

    /// Raw robots.txt content
    #[serde(skip)]
    content: String,

    /// Rules appeared before the first user-agent line
    #[serde(skip)]
    leading_rules: bool,
}

impl RobotsPolicy {
    /// Policy used when robots.txt is absent or unreachable: everything allowed
    pub fn missing() -> Self {
        Self::default()
    }

    /// Parses robots.txt content for the given agent token
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `agent` - Product token of our crawler (e.g. "SEOAuditBot")
    ///
    /// # Returns
    ///
    /// A policy with `exists` set; rules under `*` and under our own agent apply,
    /// as do rules that precede every user-agent line
    pub fn parse(content: &str, agent: &str) -> Self {
        let mut policy = Self {
            exists: true,
            agent: agent.to_string(),
            content: content.to_string(),
            ..Self::default()
        };

        let agent = agent.to_lowercase();
        let mut group_agents: Vec<String> = Vec::new();
        let mut in_rules = false;
        let mut seen_agent = false;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            let applies = !seen_agent
                || group_agents
                    .iter()
                    .any(|ua| ua == "*" || *ua == agent);

            match key.as_str() {
                "user-agent" => {
                    // A user-agent line after rules starts a new group
                    if in_rules {
                        group_agents.clear();
                        in_rules = false;
                    }
                    group_agents.push(value.to_lowercase());
                    seen_agent = true;
                }
                "disallow" => {
                    in_rules = true;
                    policy.leading_rules |= !seen_agent;
                    if applies && !value.is_empty() {
                        policy.disallowed_paths.push(value.to_string());
                    }
                }
                "allow" => {
                    in_rules = true;
                    policy.leading_rules |= !seen_agent;
                    if applies && !value.is_empty() {
                        policy.allowed_paths.push(value.to_string());
                    }
                }
                "crawl-delay" => {
                    in_rules = true;
                    if applies {
                        if let Ok(delay) = value.parse::<f64>() {
                            if delay.is_finite() && delay >= 0.0 {
                                policy.crawl_delay = Some(delay);
                            }
                        }
                    }
                }
                "sitemap" => {
                    if !value.is_empty() && !policy.sitemap_urls.iter().any(|s| s == value) {
                        policy.sitemap_urls.push(value.to_string());
                    }
                }
                _ => {}
            }
        }

        policy
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Checks if an absolute URL may be crawled by our agent
    ///
    /// A missing or empty robots.txt allows everything.
    pub fn is_allowed(&self, url: &str) -> bool {
        if !self.exists || self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        if self.leading_rules {
            // The matcher drops rules outside a group, so open one for everyone
            let content = format!("User-agent: *\n{}", self.content);
            return matcher.one_agent_allowed_by_robots(&content, &self.agent, url);
        }
        matcher.one_agent_allowed_by_robots(&self.content, &self.agent, url)
    }
}
