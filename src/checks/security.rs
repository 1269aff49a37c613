//! Security inspection of the audited site
//!
//! Four independent probes, each allowed to fail on its own:
//! - TLS handshake with certificate issuer and expiry
//! - Plain HTTP redirecting to HTTPS
//! - Standard security response headers
//! - Sub-resources loaded over plain HTTP from the HTTPS page

use crate::context::AuditContext;
use crate::{AuditError, CheckResult};
use chrono::{DateTime, Utc};
use reqwest::header::LOCATION;
use reqwest::{Client, ClientBuilder};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Security headers inspected, as (report label, header name)
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("HSTS", "strict-transport-security"),
    ("X-Frame-Options", "x-frame-options"),
    ("CSP", "content-security-policy"),
    ("X-Content-Type-Options", "x-content-type-options"),
    ("Referrer-Policy", "referrer-policy"),
    ("Permissions-Policy", "permissions-policy"),
];

/// Redirect statuses that count as enforcing HTTPS
const ENFORCING_REDIRECTS: &[u16] = &[301, 302, 307, 308];

/// Where each probe is sent
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityEndpoints {
    /// Host and port for the TLS handshake
    pub tls_host: String,
    pub tls_port: u16,
    /// Plain HTTP URL expected to redirect to HTTPS
    pub http_url: String,
    /// HTTPS URL whose headers and body are inspected
    pub https_url: String,
}

impl SecurityEndpoints {
    /// Standard endpoints for a domain
    pub fn for_domain(domain: &str) -> Self {
        Self {
            tls_host: domain.to_string(),
            tls_port: 443,
            http_url: format!("http://{}", domain),
            https_url: format!("https://{}", domain),
        }
    }
}

/// Presence and value of one security header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderStatus {
    pub present: bool,
    pub value: Option<String>,
}

/// A sub-resource loaded over plain HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixedContent {
    pub tag: String,
    pub url: String,
}

/// Result of the security inspection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub ssl_valid: bool,
    pub ssl_expiry: Option<DateTime<Utc>>,
    pub ssl_issuer: Option<String>,
    pub https_enforced: bool,
    pub security_headers: BTreeMap<String, HeaderStatus>,
    pub mixed_content: Vec<MixedContent>,
    pub issues: Vec<String>,
}

impl SecurityReport {
    /// True if the header with the given report label was present
    pub fn has_header(&self, label: &str) -> bool {
        self.security_headers
            .get(label)
            .map(|h| h.present)
            .unwrap_or(false)
    }
}

/// Runs all security probes for the audited domain
pub async fn inspect_security(ctx: &AuditContext) -> CheckResult<SecurityReport> {
    let endpoints = SecurityEndpoints::for_domain(ctx.target().domain());
    inspect_security_at(ctx, &endpoints).await
}

/// Runs all security probes against explicit endpoints
///
/// The certificate is only judged by the TLS probe. Headers and mixed
/// content are read even when the certificate does not verify.
///
/// # Returns
///
/// * `Ok(SecurityReport)` - Probe failures are recorded inside the report
/// * `Err(CheckError)` - One of the inspecting clients could not be built
pub async fn inspect_security_at(
    ctx: &AuditContext,
    endpoints: &SecurityEndpoints,
) -> CheckResult<SecurityReport> {
    let tls_client = tls_probe_builder(ctx.user_agent(), ctx.request_timeout())
        .build()
        .map_err(AuditError::from)?;
    let page_client = Client::builder()
        .user_agent(ctx.user_agent())
        .timeout(ctx.request_timeout())
        .danger_accept_invalid_certs(true)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(AuditError::from)?;

    let mut report = SecurityReport::default();

    let (tls, enforced, page) = tokio::join!(
        probe_tls(&tls_client, &endpoints.tls_host, endpoints.tls_port),
        probe_https_redirect(ctx.no_redirect_client(), &endpoints.http_url),
        fetch_https_page(&page_client, &endpoints.https_url),
    );

    match tls {
        Ok(cert) => {
            report.ssl_valid = true;
            report.ssl_expiry = cert.expiry;
            report.ssl_issuer = cert.issuer;
        }
        Err(e) => {
            tracing::warn!("{}", e);
            report.issues.push(format!("SSL check failed: {}", e));
        }
    }

    match enforced {
        Ok(true) => report.https_enforced = true,
        Ok(false) => report.issues.push("HTTP does not redirect to HTTPS".to_string()),
        Err(e) => report.issues.push(format!("HTTP redirect check failed: {}", e)),
    }

    match page {
        Ok((headers, body)) => {
            for (label, name) in SECURITY_HEADERS {
                let value = headers.get(*name).cloned();
                if value.is_none() {
                    report.issues.push(format!("Missing security header: {}", label));
                }
                report.security_headers.insert(
                    label.to_string(),
                    HeaderStatus {
                        present: value.is_some(),
                        value,
                    },
                );
            }
            report.mixed_content = find_mixed_content(&body);
        }
        Err(e) => {
            report.issues.push(format!("Security headers check failed: {}", e));
            for (label, _) in SECURITY_HEADERS {
                report.security_headers.insert(
                    label.to_string(),
                    HeaderStatus {
                        present: false,
                        value: None,
                    },
                );
            }
        }
    }

    tracing::info!(
        "Security: ssl_valid={}, https_enforced={}, {} issue(s)",
        report.ssl_valid,
        report.https_enforced,
        report.issues.len()
    );
    Ok(report)
}

/// Certificate details from a successful handshake
#[derive(Debug, Default)]
struct CertificateInfo {
    expiry: Option<DateTime<Utc>>,
    issuer: Option<String>,
}

/// Client for the TLS probe
///
/// The connect timeout covers TCP and the handshake and is shorter than the
/// overall timeout, so a request that times out after connecting is never
/// mistaken for a failed handshake.
fn tls_probe_builder(user_agent: &str, timeout: Duration) -> ClientBuilder {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(timeout)
        .timeout(timeout * 2)
        .tls_info(true)
        .redirect(reqwest::redirect::Policy::none())
}

/// Completes a verified TLS handshake and reads the peer certificate
///
/// Only connection errors count as a failed handshake. Once connected the
/// chain has been verified, so a later failure yields a valid certificate
/// without details.
async fn probe_tls(client: &Client, host: &str, port: u16) -> Result<CertificateInfo, AuditError> {
    let url = format!("https://{}:{}/", host, port);
    let response = match client.head(&url).send().await {
        Ok(response) => response,
        Err(e) if e.is_connect() => {
            return Err(AuditError::TlsHandshake {
                host: host.to_string(),
                message: e.to_string(),
            })
        }
        Err(e) => {
            tracing::debug!("TLS to {} verified, request failed afterwards: {}", host, e);
            return Ok(CertificateInfo::default());
        }
    };

    let der = response
        .extensions()
        .get::<reqwest::tls::TlsInfo>()
        .and_then(|info| info.peer_certificate());

    Ok(der.map(parse_certificate).unwrap_or_default())
}

/// Extracts expiry and issuer organization from a DER certificate
fn parse_certificate(der: &[u8]) -> CertificateInfo {
    match x509_parser::parse_x509_certificate(der) {
        Ok((_, cert)) => CertificateInfo {
            expiry: DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0),
            issuer: cert
                .issuer()
                .iter_organization()
                .next()
                .and_then(|o| o.as_str().ok())
                .map(str::to_string),
        },
        Err(e) => {
            tracing::debug!("Could not parse peer certificate: {}", e);
            CertificateInfo::default()
        }
    }
}

/// True if plain HTTP answers with a redirect to an https:// location
async fn probe_https_redirect(client: &Client, http_url: &str) -> Result<bool, AuditError> {
    let response = client
        .get(http_url)
        .send()
        .await
        .map_err(|e| AuditError::from_request(http_url, &e))?;

    let status = response.status().as_u16();
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    Ok(ENFORCING_REDIRECTS.contains(&status) && location.starts_with("https://"))
}

/// Fetches the HTTPS page, returning lowercase header names and the body
async fn fetch_https_page(
    client: &Client,
    https_url: &str,
) -> Result<(BTreeMap<String, String>, String), AuditError> {
    let response = client
        .get(https_url)
        .send()
        .await
        .map_err(|e| AuditError::from_request(https_url, &e))?;

    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    let body = response
        .text()
        .await
        .map_err(|e| AuditError::from_request(https_url, &e))?;
    Ok((headers, body))
}

/// Finds `<img|script src>` and `<link href>` values that start with http://
pub fn find_mixed_content(html: &str) -> Vec<MixedContent> {
    let document = Html::parse_document(html);
    let mut found = Vec::new();

    for (css, tag, attr) in [
        ("img[src]", "img", "src"),
        ("script[src]", "script", "src"),
        ("link[href]", "link", "href"),
    ] {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(url) = element.value().attr(attr) {
                let url = url.trim();
                if url.to_ascii_lowercase().starts_with("http://") {
                    found.push(MixedContent {
                        tag: tag.to_string(),
                        url: url.to_string(),
                    });
                }
            }
        }
    }

    found
}
