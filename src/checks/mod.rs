//! Technical checks run over the crawl output and the seed URL

pub mod content;
pub mod links;
pub mod mobile;
pub mod redirects;
pub mod security;

pub use content::{analyze_content, issues_of, ContentIssue, ContentIssueKind};
pub use links::{audit_links, check_link, BrokenLinkRecord};
pub use mobile::{analyze_mobile_html, check_mobile, MobileReport};
pub use redirects::{trace_redirect, trace_redirects, RedirectChain, RedirectHop, MAX_REDIRECT_HOPS};
pub use security::{
    find_mixed_content, inspect_security, inspect_security_at, HeaderStatus, MixedContent,
    SecurityEndpoints, SecurityReport, SECURITY_HEADERS,
};
