//! Rendering of admitted results into the `.esd` line format

use crate::types::ResolvedName;

/// Render `results` as column-aligned `fqdn<pad>ip1,ip2,...` lines, the fqdn
/// column padded to the longest fqdn plus two spaces.
pub fn render_esd(results: &[ResolvedName]) -> String {
    let width = results.iter().map(|r| r.fqdn.len()).max().unwrap_or(0) + 2;
    let mut out = String::new();
    for result in results {
        let ips = result
            .ips
            .iter()
            .map(|ip| ip.to_string())
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&format!("{:<width$}{}\n", result.fqdn, ips, width = width));
    }
    out
}

/// Render `results` as a JSON array of `{fqdn, ips}` objects.
pub fn render_json(results: &[ResolvedName]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResolvedName;

    #[test]
    fn render_esd_pads_to_longest_fqdn() {
        let results = vec![
            ResolvedName::new("a.example.com", vec!["1.2.3.4".parse().unwrap()]),
            ResolvedName::new("ab.example.com", vec!["1.2.3.5".parse().unwrap()]),
        ];
        let rendered = render_esd(&results);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("a.example.com"));
        assert!(lines[0].contains("1.2.3.4"));
    }

    #[test]
    fn render_esd_handles_empty_set() {
        assert_eq!(render_esd(&[]), "");
    }
}
