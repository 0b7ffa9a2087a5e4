//! Integration tests across dictionary expansion, normalization, scheduling,
//! and output rendering - the parts of the pipeline that don't require a live
//! network to exercise end to end.

use esdx_core::types::{Apex, Candidate, ResolvedName};

#[cfg(test)]
mod tests {
    use super::*;
    use esdx_core::{dictionary, normalize, output, rsc, scheduler};

    #[test]
    fn dictionary_expansion_then_sharding_reconstructs_full_set() {
        let lines: Vec<String> = (0..10).map(|i| format!("host{i}")).collect();
        let expanded = dictionary::expand(&lines);

        let mut reconstructed = Vec::new();
        for k in 1..=3 {
            reconstructed.extend(dictionary::shard(expanded.clone(), k, 3).unwrap());
        }
        assert_eq!(reconstructed.len(), expanded.len());
        for candidate in &expanded {
            assert!(reconstructed.contains(candidate));
        }
    }

    #[test]
    fn dictionary_placeholder_expansion_is_cartesian() {
        let lines = vec!["{letter}{number}".to_string()];
        let expanded = dictionary::expand(&lines);
        // 27 letters (including '-', which collapses away when paired with
        // a digit it will never equal the empty label) times 10 digits, plus
        // the apex sentinel; dedup may reduce this slightly but it must stay
        // within the cartesian bound.
        assert!(expanded.len() <= 27 * 10 + 1);
        assert!(expanded.iter().any(|c| c.0 == "a0"));
        assert!(expanded.iter().any(|c| c.0 == "@"));
    }

    #[test]
    fn candidate_apex_sentinel_is_unique() {
        let apex = Apex::new("example.com");
        let lines = vec!["www".to_string(), "mail".to_string()];
        let expanded = dictionary::expand(&lines);
        let apex_hits: Vec<&Candidate> = expanded.iter().filter(|c| c.is_apex()).collect();
        assert_eq!(apex_hits.len(), 1);
        assert_eq!(apex_hits[0].fqdn(&apex), "example.com");
    }

    #[tokio::test]
    async fn scheduler_respects_window_and_completion_order_is_unconstrained() {
        let items: Vec<u32> = (0..40).collect();
        let results = scheduler::run(items, 5, "test", |i| async move {
            tokio::time::sleep(std::time::Duration::from_millis((40 - i) as u64 % 3)).await;
            i
        })
        .await;
        let mut sorted = results.clone();
        sorted.sort();
        assert_eq!(sorted, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn wildcard_zone_with_identical_bodies_rejects_everything() {
        // Simulates end-to-end scenario 2 from the design: a wildcard baseline
        // body "X" and a candidate body "X" must score ratio 1.0 and be rejected,
        // while a distinct body must be admitted.
        let baseline_len = normalize::normalize_body("X").chars().count();
        let rejected_ratio = rsc::quick_ratio(normalize::normalize_body("X").chars().count(), baseline_len);
        let admitted_ratio = rsc::quick_ratio(
            normalize::normalize_body("Y shop content Y").chars().count(),
            baseline_len,
        );
        assert_eq!(rejected_ratio, 1.0);
        assert!(admitted_ratio <= 0.8);
    }

    #[test]
    fn output_rendering_round_trips_fqdn_and_ips() {
        let results = vec![
            ResolvedName::new("www.example.com", vec!["93.184.216.34".parse().unwrap()]),
            ResolvedName::new("mail.example.com", vec![]),
        ];
        let rendered = output::render_esd(&results);
        assert!(rendered.contains("www.example.com"));
        assert!(rendered.contains("93.184.216.34"));
        assert!(rendered.contains("mail.example.com"));

        let json = output::render_json(&results).unwrap();
        assert!(json.contains("\"fqdn\""));
    }

    #[test]
    fn normalize_body_is_idempotent_across_script_and_whitespace() {
        let body = "  <script>track()</script>\n<p>hello   world</p>  ";
        let once = normalize::normalize_body(body);
        let twice = normalize::normalize_body(&once);
        assert_eq!(once, twice);
        assert!(!once.contains("track"));
        assert!(once.contains("helloworld"));
    }
}
