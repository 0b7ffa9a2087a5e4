//! Aggregates candidate names from every configured source

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::config::EnumOptions;
use crate::dictionary;
use crate::error::Result;
use crate::multi_record;
use crate::resolver_pool::ResolverPool;
use crate::types::{Apex, Candidate};
use crate::{cert_mining, zone_transfer};

/// Build the full candidate set for `apex`: dictionary expansion (optionally
/// sharded), zone transfer, certificate SAN mining, and - if enabled - the
/// multi-record mining pass.
pub async fn collect(
    pool: &ResolverPool,
    apex: &Apex,
    dictionary_path: &Path,
    options: &EnumOptions,
) -> Result<Vec<Candidate>> {
    let lines = dictionary::read_lines(dictionary_path)?;
    let mut dict_candidates = dictionary::expand(&lines);
    if let Some((k, n)) = options.split {
        dict_candidates = dictionary::shard(dict_candidates, k, n)?;
    }
    info!("dictionary expansion produced {} candidates", dict_candidates.len());

    let axfr_candidates = zone_transfer::enumerate(pool, apex).await;
    info!("zone transfer produced {} candidates", axfr_candidates.len());

    let san_candidates = cert_mining::mine(pool, apex).await;
    info!("certificate SAN mining produced {} candidates", san_candidates.len());

    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for candidate in dict_candidates
        .into_iter()
        .chain(axfr_candidates)
        .chain(san_candidates)
    {
        if seen.insert(candidate.0.clone()) {
            merged.push(candidate);
        }
    }

    if options.multi_resolve {
        let mined = multi_record::mine(pool, apex, merged.clone(), options.multi_record_depth).await;
        info!("multi-record mining produced {} additional candidates", mined.len());
        for candidate in mined {
            if seen.insert(candidate.0.clone()) {
                merged.push(candidate);
            }
        }
    }

    Ok(merged)
}
