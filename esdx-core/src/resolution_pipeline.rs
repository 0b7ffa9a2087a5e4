//! ResolutionPipeline: direct DNS resolution, wildcard filtering

use std::sync::Arc;

use crate::resolver_pool::ResolverPool;
use crate::scheduler;
use crate::types::{Apex, Candidate, ResolvedName, WildcardState};

/// Outcome of driving a single candidate through direct resolution.
pub enum Outcome {
    Admit(ResolvedName),
    WildcardHit(Candidate, ResolvedName),
    Absent,
}

/// Resolve every candidate under `apex` with window `dns_window`. Candidates
/// whose ip-set is empty are discarded; non-wildcard hits are admitted
/// directly; wildcard hits are forwarded to the caller for RSC handling.
pub async fn run(
    pool: Arc<ResolverPool>,
    apex: Arc<Apex>,
    candidates: Vec<Candidate>,
    wildcard: Arc<WildcardState>,
    dns_window: usize,
) -> Vec<Outcome> {
    scheduler::run(candidates, dns_window, "resolution", move |candidate| {
        let pool = Arc::clone(&pool);
        let apex = Arc::clone(&apex);
        let wildcard = Arc::clone(&wildcard);
        async move {
            let fqdn = candidate.fqdn(&apex);
            match pool.query_a(&fqdn).await {
                Ok(Some(ips)) if !ips.is_empty() => {
                    let resolved = ResolvedName::new(fqdn, ips);
                    if wildcard.is_wildcard && resolved.is_wildcard_hit(&wildcard.wildcard_ips) {
                        Outcome::WildcardHit(candidate, resolved)
                    } else {
                        Outcome::Admit(resolved)
                    }
                }
                _ => Outcome::Absent,
            }
        }
    })
    .await
}
