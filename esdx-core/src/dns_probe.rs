//! DnsProbe: single-query resolution across the record types the engine cares about

use std::net::IpAddr;

use hickory_resolver::proto::rr::rdata::SOA;
use hickory_resolver::proto::rr::{RData, RecordType as HickoryRecordType};

use crate::error::Result;
use crate::resolver_pool::ResolverPool;

/// Records extracted from a multi-record mining probe (SOA/AAAA/TXT/MX), see
/// `multi_record::mine`.
#[derive(Debug, Clone, Default)]
pub struct MinedRecords {
    pub soa_mname: Option<String>,
    pub soa_rname: Option<String>,
    pub aaaa: Vec<IpAddr>,
    pub txt: Vec<String>,
    pub mx: Vec<String>,
}

/// Resolve `A` records for `fqdn` through the pool, applying the retry/absence
/// classification in `ResolverPool::query`.
pub async fn probe_a(pool: &ResolverPool, fqdn: &str) -> Result<Option<Vec<IpAddr>>> {
    pool.query_a(fqdn).await
}

/// Resolve SOA/AAAA/TXT/MX for `fqdn`, tolerating individual record-type failures.
pub async fn probe_multi(pool: &ResolverPool, fqdn: &str) -> MinedRecords {
    let mut out = MinedRecords::default();

    if let Some((mname, rname)) = lookup_soa(pool, fqdn).await {
        out.soa_mname = Some(mname);
        out.soa_rname = Some(rname);
    }
    if let Ok(Some(ips)) = pool.query(fqdn, HickoryRecordType::AAAA).await {
        out.aaaa = ips;
    }
    out.txt = lookup_txt(pool, fqdn).await;
    out.mx = lookup_mx(pool, fqdn).await;
    out
}

async fn lookup_soa(pool: &ResolverPool, fqdn: &str) -> Option<(String, String)> {
    let resolver = pool.all().first()?;
    let lookup = resolver_lookup(resolver, fqdn, HickoryRecordType::SOA).await.ok()?;
    for record in lookup {
        if let RData::SOA(soa) = record {
            return Some(soa_names(&soa));
        }
    }
    None
}

async fn lookup_txt(pool: &ResolverPool, fqdn: &str) -> Vec<String> {
    let Some(resolver) = pool.all().first() else {
        return Vec::new();
    };
    let Ok(records) = resolver_lookup(resolver, fqdn, HickoryRecordType::TXT).await else {
        return Vec::new();
    };
    records
        .into_iter()
        .filter_map(|r| match r {
            RData::TXT(txt) => Some(
                txt.iter()
                    .map(|b| String::from_utf8_lossy(b).to_string())
                    .collect::<Vec<_>>()
                    .join(""),
            ),
            _ => None,
        })
        .collect()
}

async fn lookup_mx(pool: &ResolverPool, fqdn: &str) -> Vec<String> {
    let Some(resolver) = pool.all().first() else {
        return Vec::new();
    };
    let Ok(records) = resolver_lookup(resolver, fqdn, HickoryRecordType::MX).await else {
        return Vec::new();
    };
    records
        .into_iter()
        .filter_map(|r| match r {
            RData::MX(mx) => Some(mx.exchange().to_utf8()),
            _ => None,
        })
        .collect()
}

fn soa_names(soa: &SOA) -> (String, String) {
    (soa.mname().to_utf8(), soa.rname().to_utf8())
}

/// Thin wrapper issuing a raw lookup for record types `ResolverPool::query`
/// doesn't decode into IP sets.
async fn resolver_lookup(
    resolver: &crate::resolver_pool::Resolver,
    fqdn: &str,
    rtype: HickoryRecordType,
) -> Result<Vec<RData>> {
    crate::resolver_pool::raw_lookup(resolver, fqdn, rtype).await
}
