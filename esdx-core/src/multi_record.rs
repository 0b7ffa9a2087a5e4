//! Multi-record mining: SOA/AAAA/TXT/MX token harvesting as an explicit
//! work-list with a visited-set and a depth cap, rather than unbounded
//! recursion.

use std::collections::HashSet;

use regex::Regex;
use tracing::debug;

use crate::dns_probe::probe_multi;
use crate::resolver_pool::ResolverPool;
use crate::types::{Apex, Candidate};

fn name_pattern() -> Regex {
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)*$").unwrap()
}

/// Starting from `seed` candidates, mine SOA/AAAA/TXT/MX for each not-yet-visited
/// fqdn, keep any extracted token that is a syntactically valid DNS name and a
/// suffix match under `apex`, and feed new tokens back into the work-list until
/// either nothing new is found or `max_depth` rounds have run.
pub async fn mine(
    pool: &ResolverPool,
    apex: &Apex,
    seed: Vec<Candidate>,
    max_depth: u32,
) -> Vec<Candidate> {
    let pattern = name_pattern();
    let mut visited: HashSet<String> = HashSet::new();
    let mut discovered: Vec<Candidate> = Vec::new();
    let mut frontier: Vec<Candidate> = seed;

    for depth in 0..max_depth {
        if frontier.is_empty() {
            break;
        }
        let mut next_frontier = Vec::new();

        for candidate in frontier {
            let fqdn = candidate.fqdn(apex);
            if !visited.insert(fqdn.clone()) {
                continue;
            }

            let mined = probe_multi(pool, &fqdn).await;
            let mut tokens = Vec::new();
            tokens.extend(mined.soa_mname);
            tokens.extend(mined.soa_rname);
            tokens.extend(mined.txt);
            tokens.extend(mined.mx);

            for token in tokens {
                let token = token.trim_end_matches('.').to_lowercase();
                if !pattern.is_match(&token) {
                    continue;
                }
                if !has_queried_name_suffix(&token, &fqdn) {
                    continue;
                }
                let Some(label) = relative_label(&token, apex) else {
                    continue;
                };
                let next = Candidate::label(label);
                let next_fqdn = next.fqdn(apex);
                if visited.contains(&next_fqdn) {
                    continue;
                }
                discovered.push(next.clone());
                next_frontier.push(next);
            }
        }

        debug!("multi-record mining depth {depth}: {} new candidates", next_frontier.len());
        frontier = next_frontier;
    }

    discovered
}

/// A mined token is only relevant if it is the queried name itself or a
/// subdomain of it - not merely anything under the apex. An SOA/TXT/MX record
/// on one candidate can legitimately name something entirely unrelated that
/// still happens to live under the apex, and that must not be admitted here.
fn has_queried_name_suffix(token: &str, fqdn: &str) -> bool {
    token == fqdn || token.ends_with(&format!(".{fqdn}"))
}

fn relative_label(token: &str, apex: &Apex) -> Option<String> {
    let apex_str = apex.as_str();
    if token == apex_str {
        return None;
    }
    token.strip_suffix(&format!(".{apex_str}")).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_label_strips_apex_suffix() {
        let apex = Apex::new("example.com");
        assert_eq!(relative_label("foo.example.com", &apex), Some("foo".to_string()));
        assert_eq!(relative_label("example.com", &apex), None);
        assert_eq!(relative_label("other.org", &apex), None);
    }

    #[test]
    fn name_pattern_rejects_non_dns_tokens() {
        let pattern = name_pattern();
        assert!(pattern.is_match("foo.example.com"));
        assert!(!pattern.is_match("not a domain!"));
        assert!(!pattern.is_match(""));
    }

    #[test]
    fn queried_name_suffix_requires_the_specific_subdomain() {
        assert!(has_queried_name_suffix("mail.host.example.com", "host.example.com"));
        assert!(has_queried_name_suffix("host.example.com", "host.example.com"));
        // A sibling that merely shares the apex must not pass.
        assert!(!has_queried_name_suffix("other.example.com", "host.example.com"));
    }
}
