//! HTML body normalization shared by the wildcard baseline and RSC pipeline

use regex::Regex;
use std::sync::OnceLock;

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn script_element_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)<script([^>]*)>.*?</script\s*>").unwrap())
}

/// Strip all whitespace, then remove `<script>` elements that lack an `src=`
/// attribute (their contents included). The `regex` crate has no lookahead, so
/// the attribute check is done on the captured opening tag after matching.
/// Idempotent.
pub fn normalize_body(body: &str) -> String {
    let without_scripts = script_element_pattern().replace_all(body, |caps: &regex::Captures| {
        let attrs = caps.get(1).map_or("", |m| m.as_str()).to_lowercase();
        if attrs.contains("src") {
            caps.get(0).unwrap().as_str().to_string()
        } else {
            String::new()
        }
    });
    whitespace_pattern().replace_all(&without_scripts, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_all_whitespace() {
        assert_eq!(normalize_body("a  b\n\tc"), "abc");
    }

    #[test]
    fn removes_inline_script_without_src() {
        let body = "<html><script>alert(1)</script><body>hi</body></html>";
        let normalized = normalize_body(body);
        assert!(!normalized.contains("alert"));
        assert!(normalized.contains("hi"));
    }

    #[test]
    fn keeps_script_with_src_attribute() {
        let body = r#"<script src="a.js">window.x=1;</script>hi"#;
        let normalized = normalize_body(body);
        assert!(normalized.contains("window.x=1"));
    }

    #[test]
    fn is_idempotent() {
        let body = "<script>x()</script>  hello   world  ";
        let once = normalize_body(body);
        let twice = normalize_body(&once);
        assert_eq!(once, twice);
    }
}
