//! WildcardOracle: detects wildcard zones and caches RSC baselines

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, warn};

use crate::config::RscConfig;
use crate::error::Result;
use crate::normalize;
use crate::resolver_pool::ResolverPool;
use crate::types::{Apex, WildcardState};

fn random_label() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// Run the wildcard-detection sequence described in the component design:
/// query every healthy resolver for a synthesized non-existent name, compare
/// answers, then (if RSC is enabled and the zone is wildcarded) fetch the two
/// baseline HTML bodies.
pub async fn detect(pool: &ResolverPool, apex: &Apex, rsc: &RscConfig, http: &reqwest::Client) -> WildcardState {
    let sentinel_label = random_label();
    let sentinel_fqdn = format!("{sentinel_label}.{apex}");

    let mut answers = Vec::new();
    for resolver in pool.all() {
        let result = resolver
            .lookup_ips(&sentinel_fqdn, hickory_resolver::proto::rr::RecordType::A)
            .await
            .ok()
            .filter(|ips| !ips.is_empty());
        answers.push(result);
    }

    let mut state = WildcardState::default();

    let non_empty: Vec<&Vec<std::net::IpAddr>> = answers.iter().filter_map(|a| a.as_ref()).collect();
    if non_empty.is_empty() {
        return state;
    }

    let mut distinct_answers: Vec<Vec<std::net::IpAddr>> = Vec::new();
    for answer in &non_empty {
        let mut sorted = (*answer).clone();
        sorted.sort();
        if !distinct_answers.contains(&sorted) {
            distinct_answers.push(sorted);
        }
    }

    state.is_wildcard = true;
    if distinct_answers.len() > 1 {
        state.random_resolve = true;
        warn!("{apex} resolvers disagree on sentinel name; falling back to RSC only");
        state.wildcard_ips = distinct_answers.into_iter().next().unwrap_or_default();
    } else {
        state.wildcard_ips = distinct_answers.into_iter().next().unwrap_or_default();
    }

    info!(
        "{apex} looks wildcarded: sentinel resolves to {:?} (random_resolve={})",
        state.wildcard_ips, state.random_resolve
    );

    if !rsc.skip {
        match fetch_baselines(http, apex, &sentinel_label).await {
            Ok((html2, html3)) => {
                state.baseline_len_2 = html2.chars().count();
                state.baseline_len_3 = html3.chars().count();
                state.baseline_html_2 = html2;
                state.baseline_html_3 = html3;
                state.rsc_available = true;
            }
            Err(e) => {
                warn!("wildcard baseline unavailable for {apex}: {e}; RSC disabled for this run");
                state.rsc_available = false;
            }
        }
    }

    state
}

async fn fetch_baselines(
    http: &reqwest::Client,
    apex: &Apex,
    sentinel_label: &str,
) -> Result<(String, String)> {
    let url2 = format!("http://{sentinel_label}.{apex}/");
    let url3 = format!("http://{sentinel_label}.{sentinel_label}.{apex}/");

    let body2 = crate::rsc::fetch_body(http, &url2).await?;
    let body3 = crate::rsc::fetch_body(http, &url3).await?;

    Ok((normalize::normalize_body(&body2), normalize::normalize_body(&body3)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_label_is_lowercase_alphanumeric() {
        let label = random_label();
        assert_eq!(label.len(), 16);
        assert!(label.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
