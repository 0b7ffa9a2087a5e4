//! Centralized unit tests for core data types

use std::net::IpAddr;

use crate::types::{Apex, Candidate, ResolvedName};

#[test]
fn apex_strips_trailing_dot_and_lowercases() {
    let apex = Apex::new("Example.COM.");
    assert_eq!(apex.as_str(), "example.com");
}

#[test]
fn candidate_apex_sentinel_maps_to_apex_itself() {
    let apex = Apex::new("example.com");
    let candidate = Candidate::apex();
    assert_eq!(candidate.fqdn(&apex), "example.com");
}

#[test]
fn candidate_label_maps_to_subdomain() {
    let apex = Apex::new("example.com");
    let candidate = Candidate::label("www");
    assert_eq!(candidate.fqdn(&apex), "www.example.com");
}

#[test]
fn resolved_name_sorts_and_dedups_ips() {
    let ips: Vec<IpAddr> = vec![
        "1.1.1.1".parse().unwrap(),
        "1.1.1.1".parse().unwrap(),
        "1.0.0.1".parse().unwrap(),
    ];
    let resolved = ResolvedName::new("example.com", ips);
    assert_eq!(
        resolved.ips,
        vec!["1.0.0.1".parse::<IpAddr>().unwrap(), "1.1.1.1".parse().unwrap()]
    );
}

#[test]
fn resolved_name_wildcard_hit_requires_full_subset() {
    let wildcard_ips = vec!["1.2.3.4".parse().unwrap()];
    let subset = ResolvedName::new("a.example.com", vec!["1.2.3.4".parse().unwrap()]);
    let not_subset = ResolvedName::new("b.example.com", vec!["5.6.7.8".parse().unwrap()]);
    assert!(subset.is_wildcard_hit(&wildcard_ips));
    assert!(!not_subset.is_wildcard_hit(&wildcard_ips));
}
