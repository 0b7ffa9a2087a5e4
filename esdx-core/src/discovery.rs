//! DiscoveryFeedback: drains names harvested from redirects/bodies to a fixpoint

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::config::RscConfig;
use crate::resolution_pipeline;
use crate::resolver_pool::ResolverPool;
use crate::rsc;
use crate::scheduler;
use crate::types::{Apex, Candidate, ResolvedName, WildcardState};

/// Run RscPipeline over `initial` candidates, then keep draining newly
/// discovered names (deduped against a visited set so each name is processed
/// at most once) until the queue is empty.
pub async fn run(
    http: Arc<reqwest::Client>,
    apex: Arc<Apex>,
    initial: Vec<(Candidate, ResolvedName)>,
    wildcard: Arc<WildcardState>,
    rsc_config: Arc<RscConfig>,
    pool: Arc<ResolverPool>,
    http_window: usize,
) -> Vec<ResolvedName> {
    let mut admitted = Vec::new();
    let mut processed: HashSet<String> = HashSet::new();
    let mut queue = initial;

    loop {
        let mut batch = Vec::new();
        for (candidate, resolved) in queue.drain(..) {
            if !processed.insert(candidate.fqdn(&apex)) {
                continue;
            }
            batch.push((candidate, resolved));
        }
        if batch.is_empty() {
            break;
        }

        let http = Arc::clone(&http);
        let apex_clone = Arc::clone(&apex);
        let wildcard_clone = Arc::clone(&wildcard);
        let rsc_clone = Arc::clone(&rsc_config);

        let results = scheduler::run(batch, http_window, "rsc", move |(candidate, resolved)| {
            let http = Arc::clone(&http);
            let apex = Arc::clone(&apex_clone);
            let wildcard = Arc::clone(&wildcard_clone);
            let rsc_config = Arc::clone(&rsc_clone);
            async move {
                rsc::validate(&http, &apex, &candidate, &resolved, &wildcard, &rsc_config).await
            }
        })
        .await;

        let mut next_round = Vec::new();
        for result in results {
            if let Some(resolved) = result.admitted {
                admitted.push(resolved);
            }
            for discovered in result.discovered {
                let fqdn = discovered.fqdn(&apex);
                if processed.contains(&fqdn) {
                    continue;
                }
                // Newly discovered names are not yet resolved; probe them first.
                next_round.push(discovered);
            }
        }

        if next_round.is_empty() {
            break;
        }

        let (direct, wildcard_hits) = resolve_new_candidates(&pool, &apex, next_round, &wildcard).await;
        admitted.extend(direct);
        info!("discovery feedback resolved {} new candidates", wildcard_hits.len());
        queue = wildcard_hits;
    }

    admitted
}

/// Resolve newly discovered names through the same direct-vs-wildcard split as
/// the main ResolutionPipeline: names that resolve cleanly are admitted
/// straight away, wildcard-hit names are queued for another RSC round. In a
/// random-resolve zone direct resolution cannot be trusted at all, so every
/// resolved name - whatever ResolutionPipeline classifies it as - is instead
/// routed back through RSC.
async fn resolve_new_candidates(
    pool: &Arc<ResolverPool>,
    apex: &Arc<Apex>,
    candidates: Vec<Candidate>,
    wildcard: &Arc<WildcardState>,
) -> (Vec<ResolvedName>, Vec<(Candidate, ResolvedName)>) {
    let outcomes = resolution_pipeline::run(
        Arc::clone(pool),
        Arc::clone(apex),
        candidates,
        Arc::clone(wildcard),
        candidates_window(),
    )
    .await;

    let mut direct = Vec::new();
    let mut wildcard_hits = Vec::new();
    for outcome in outcomes {
        match outcome {
            resolution_pipeline::Outcome::Admit(resolved) if wildcard.random_resolve => {
                let label = resolved
                    .fqdn
                    .strip_suffix(&format!(".{}", apex.as_str()))
                    .unwrap_or(&resolved.fqdn)
                    .to_string();
                wildcard_hits.push((Candidate::label(label), resolved));
            }
            resolution_pipeline::Outcome::Admit(resolved) => direct.push(resolved),
            resolution_pipeline::Outcome::WildcardHit(candidate, resolved) => wildcard_hits.push((candidate, resolved)),
            resolution_pipeline::Outcome::Absent => {}
        }
    }
    (direct, wildcard_hits)
}

fn candidates_window() -> usize {
    crate::config::DEFAULT_DNS_WINDOW
}
