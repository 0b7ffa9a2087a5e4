//! Engine: orchestrates the full enumeration sequence for one apex

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::candidate_sources;
use crate::config::EnumOptions;
use crate::discovery;
use crate::error::Result;
use crate::heartbeat::Heartbeat;
use crate::resolution_pipeline::{self, Outcome};
use crate::resolver_pool::ResolverPool;
use crate::rsc;
use crate::types::{Apex, ResolvedName};
use crate::wildcard;

/// Final result of a single apex's enumeration.
pub struct ApexResult {
    pub apex: Apex,
    pub admitted: Vec<ResolvedName>,
    pub dns_query_errors: u64,
}

/// Drive the five-step sequence: health-check resolvers, detect wildcard
/// state, run direct resolution, run RSC + discovery feedback for wildcard
/// hits, and emit the final admit set.
pub async fn run(apex_name: &str, dictionary_path: &Path, options: &EnumOptions) -> Result<ApexResult> {
    let apex = Arc::new(Apex::new(apex_name));
    info!("starting enumeration for {apex}");

    let pool = Arc::new(ResolverPool::build(&options.resolver).await?);
    info!("{} of {} configured resolvers are healthy", pool.len(), options.resolver.resolvers.len());

    let http = Arc::new(rsc::build_client(&options.rsc.proxy)?);

    let wildcard_state = Arc::new(wildcard::detect(&pool, &apex, &options.rsc, &http).await);

    let candidates = candidate_sources::collect(&pool, &apex, dictionary_path, options).await?;
    info!("{} candidates collected for {apex}", candidates.len());

    let (heartbeat, heartbeat_handle) = Heartbeat::spawn(apex.as_str().to_string());

    // Keyed by fqdn per AdmitSet's definition: a name discovered twice (e.g.
    // admitted directly, then re-surfaced via an unrelated candidate's
    // redirect/body during RSC) must still produce one output line.
    let mut admitted: HashMap<String, ResolvedName> = HashMap::new();
    let mut wildcard_hits = Vec::new();

    if !wildcard_state.random_resolve {
        let outcomes = resolution_pipeline::run(
            Arc::clone(&pool),
            Arc::clone(&apex),
            candidates,
            Arc::clone(&wildcard_state),
            options.performance.dns_window,
        )
        .await;

        for outcome in outcomes {
            match outcome {
                Outcome::Admit(resolved) => admit(&mut admitted, &heartbeat, resolved),
                Outcome::WildcardHit(candidate, resolved) => wildcard_hits.push((candidate, resolved)),
                Outcome::Absent => {}
            }
        }
    } else {
        // Random-resolve zones cannot be trusted via direct resolution; every
        // candidate is treated as a wildcard-hit suspect for RSC.
        let outcomes = resolution_pipeline::run(
            Arc::clone(&pool),
            Arc::clone(&apex),
            candidates,
            Arc::clone(&wildcard_state),
            options.performance.dns_window,
        )
        .await;
        for outcome in outcomes {
            if let Outcome::Admit(resolved) | Outcome::WildcardHit(_, resolved) = outcome {
                wildcard_hits.push((crate::types::Candidate::label(strip_apex(&resolved.fqdn, &apex)), resolved));
            }
        }
    }

    if wildcard_state.is_wildcard && wildcard_state.rsc_available && !wildcard_hits.is_empty() {
        let rsc_admitted = discovery::run(
            Arc::clone(&http),
            Arc::clone(&apex),
            wildcard_hits,
            Arc::clone(&wildcard_state),
            Arc::new(options.rsc.clone()),
            Arc::clone(&pool),
            options.performance.http_window,
        )
        .await;
        for resolved in rsc_admitted {
            admit(&mut admitted, &heartbeat, resolved);
        }
    }

    drop(heartbeat);
    let _ = heartbeat_handle.await;

    let dns_query_errors = pool.dns_query_errors.load(std::sync::atomic::Ordering::Relaxed);
    info!("{apex} complete: {} admitted, {dns_query_errors} dns query errors", admitted.len());

    Ok(ApexResult {
        apex: (*apex).clone(),
        admitted: admitted.into_values().collect(),
        dns_query_errors,
    })
}

/// Insert `resolved` keyed on fqdn, notifying the heartbeat only the first
/// time a given fqdn is admitted.
fn admit(admitted: &mut HashMap<String, ResolvedName>, heartbeat: &Heartbeat, resolved: ResolvedName) {
    if !admitted.contains_key(&resolved.fqdn) {
        heartbeat.notify(resolved.clone());
        admitted.insert(resolved.fqdn.clone(), resolved);
    }
}

fn strip_apex(fqdn: &str, apex: &Apex) -> String {
    fqdn.strip_suffix(&format!(".{}", apex.as_str()))
        .unwrap_or(fqdn)
        .to_string()
}
