//! Small validation helpers

use std::sync::OnceLock;

use regex::Regex;

fn domain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?i)([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}$").unwrap()
    })
}

pub fn is_valid_domain(name: &str) -> bool {
    domain_pattern().is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plausible_domains() {
        assert!(is_valid_domain("example.com"));
        assert!(is_valid_domain("sub.example.co.uk"));
    }

    #[test]
    fn rejects_malformed_domains() {
        assert!(!is_valid_domain("not a domain"));
        assert!(!is_valid_domain(""));
    }
}
