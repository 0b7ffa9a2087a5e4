//! RscPipeline: Response-Similarity-Comparison validation for wildcard-hit candidates

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use reqwest::redirect::Policy;
use std::sync::OnceLock;
use tracing::debug;

use crate::config::RscConfig;
use crate::error::{EnumError, Result};
use crate::normalize::normalize_body;
use crate::resolver_pool::ResolverPool;
use crate::types::{Apex, Candidate, ResolvedName, WildcardState};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; Baiduspider/2.0; +http://www.baidu.com/search/spider.html)";
const HTTP_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_ATTEMPTS: u32 = 3;

fn domain_pattern(apex: &str) -> Regex {
    let escaped = regex::escape(apex);
    Regex::new(&format!(r"(?i)([a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+{escaped}")).unwrap()
}

/// Build the shared HTTP client used by both baseline fetches and per-candidate
/// RSC checks, honoring an optional SOCKS5 proxy.
pub fn build_client(proxy: &Option<String>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::limited(10))
        .timeout(HTTP_TIMEOUT);
    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| EnumError::configuration(e.to_string()))?;
        builder = builder.proxy(proxy);
    }
    builder.build().map_err(|e| EnumError::configuration(e.to_string()))
}

/// Fetch `url`'s body with retry-on-timeout (up to `MAX_ATTEMPTS`, exponential
/// backoff).
pub async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<String> {
    let mut last_err = None;
    for attempt in 0..MAX_ATTEMPTS {
        match client.get(url).send().await {
            Ok(resp) => {
                return resp
                    .text()
                    .await
                    .map_err(|e| EnumError::http_fetch(e.to_string()));
            }
            Err(e) if e.is_timeout() => {
                debug!("timeout fetching {url} (attempt {attempt})");
                last_err = Some(e);
                tokio::time::sleep(Duration::from_millis(200 * 2u64.pow(attempt))).await;
            }
            Err(e) => return Err(EnumError::http_fetch(e.to_string())),
        }
    }
    Err(EnumError::http_fetch(
        last_err.map(|e| e.to_string()).unwrap_or_else(|| "exhausted retries".to_string()),
    ))
}

/// The crude length-based similarity upper bound used throughout: two bodies
/// of equal length are forced to ratio 1.0 even though the formula already
/// implies it, matching the original's explicit special case.
pub fn quick_ratio(len_a: usize, len_b: usize) -> f64 {
    if len_a == len_b {
        return 1.0;
    }
    if len_a + len_b == 0 {
        return 1.0;
    }
    let ratio = 2.0 * (len_a.min(len_b) as f64) / ((len_a + len_b) as f64);
    (ratio * 1000.0).round() / 1000.0
}

pub struct RscResult {
    pub admitted: Option<ResolvedName>,
    pub discovered: Vec<Candidate>,
}

/// Validate one wildcard-hit candidate against the cached baseline. Fetches
/// the body, follows redirects (handled by the client's redirect policy, with
/// the final URL inspected for cross-apex/self-apex redirect filtering),
/// harvests embedded subdomains, and scores similarity against the baseline
/// appropriate to the candidate's level.
pub async fn validate(
    client: &reqwest::Client,
    apex: &Apex,
    candidate: &Candidate,
    resolved: &ResolvedName,
    wildcard: &WildcardState,
    rsc: &RscConfig,
) -> RscResult {
    let url = format!("http://{}/", resolved.fqdn);
    let mut discovered = Vec::new();

    let response = match client.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            debug!("rsc fetch failed for {}: {e}", resolved.fqdn);
            return RscResult { admitted: None, discovered };
        }
    };

    let final_url = response.url().clone();
    if let Some(host) = final_url.host_str() {
        discovered.extend(redirect_discovery(host, apex, candidate));
    }

    let body = match response.text().await {
        Ok(b) => b,
        Err(_) => return RscResult { admitted: None, discovered },
    };
    let normalized = normalize_body(&body);

    if rsc
        .response_filter
        .iter()
        .any(|needle| !needle.is_empty() && normalized.contains(needle.as_str()))
    {
        return RscResult { admitted: None, discovered };
    }

    discovered.extend(harvest_embedded_domains(&normalized, apex, candidate));

    let (baseline, baseline_len) = wildcard.baseline_for(candidate);
    let _ = baseline;
    let ratio = quick_ratio(normalized.chars().count(), baseline_len);

    let admitted = if ratio <= rsc.ratio_threshold {
        Some(ResolvedName::new(resolved.fqdn.clone(), wildcard.wildcard_ips.clone()))
    } else {
        None
    };

    RscResult { admitted, discovered }
}

fn redirect_discovery(host: &str, apex: &Apex, candidate: &Candidate) -> Vec<Candidate> {
    let host = host.trim_end_matches('.').to_lowercase();
    let apex_str = apex.as_str();
    let candidate_fqdn = candidate.fqdn(apex);

    if host == apex_str || host == format!("www.{apex_str}") || host == candidate_fqdn {
        return Vec::new();
    }
    if let Some(label) = host.strip_suffix(&format!(".{apex_str}")) {
        return vec![Candidate::label(label.to_string())];
    }
    Vec::new()
}

fn harvest_embedded_domains(body: &str, apex: &Apex, candidate: &Candidate) -> Vec<Candidate> {
    static PATTERNS: OnceLock<std::sync::Mutex<std::collections::HashMap<String, Regex>>> = OnceLock::new();
    let cache = PATTERNS.get_or_init(|| std::sync::Mutex::new(std::collections::HashMap::new()));

    let pattern = {
        let mut guard = cache.lock().unwrap();
        guard
            .entry(apex.as_str().to_string())
            .or_insert_with(|| domain_pattern(apex.as_str()))
            .clone()
    };

    let candidate_fqdn = candidate.fqdn(apex);
    let mut found = Vec::new();
    for m in pattern.find_iter(body) {
        let name = m.as_str().trim_end_matches('.').to_lowercase();
        if name == candidate_fqdn || name == apex.as_str() {
            continue;
        }
        if let Some(label) = name.strip_suffix(&format!(".{}", apex.as_str())) {
            found.push(Candidate::label(label.to_string()));
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_ratio_is_one_for_equal_lengths() {
        assert_eq!(quick_ratio(100, 100), 1.0);
    }

    #[test]
    fn quick_ratio_matches_formula_for_distinct_lengths() {
        assert_eq!(quick_ratio(50, 150), 0.5);
    }

    #[test]
    fn redirect_to_apex_itself_is_not_discovered() {
        let apex = Apex::new("example.com");
        let candidate = Candidate::label("foo");
        assert!(redirect_discovery("example.com", &apex, &candidate).is_empty());
        assert!(redirect_discovery("www.example.com", &apex, &candidate).is_empty());
    }

    #[test]
    fn redirect_to_sibling_is_discovered_once() {
        let apex = Apex::new("example.com");
        let candidate = Candidate::label("foo");
        let discovered = redirect_discovery("bar.example.com", &apex, &candidate);
        assert_eq!(discovered, vec![Candidate::label("bar")]);
    }

    #[test]
    fn harvest_embedded_domains_finds_suffix_matches() {
        let apex = Apex::new("example.com");
        let candidate = Candidate::label("foo");
        let body = "see also shop.example.com and unrelated.org";
        let found = harvest_embedded_domains(body, &apex, &candidate);
        assert_eq!(found, vec![Candidate::label("shop")]);
    }
}
