//! Zone transfer (AXFR) candidate source

use std::net::SocketAddr;
use std::time::Duration;

use hickory_resolver::proto::op::{Message, MessageType, OpCode, Query};
use hickory_resolver::proto::rr::{Name, RData, RecordType};
use hickory_resolver::proto::serialize::binary::{BinDecodable, BinEncodable};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{EnumError, Result};
use crate::resolver_pool::ResolverPool;
use crate::types::{Apex, Candidate};

const AXFR_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolve the apex's NS records, then attempt a real AXFR against the first
/// nameserver over TCP/53. On any failure (refused, timeout, connection
/// error) this returns an empty candidate list rather than propagating -
/// zone transfer refusal is a routine outcome, not a hard error.
pub async fn enumerate(pool: &ResolverPool, apex: &Apex) -> Vec<Candidate> {
    match try_axfr(pool, apex).await {
        Ok(names) => names,
        Err(e) => {
            debug!("zone transfer unavailable for {apex}: {e}");
            Vec::new()
        }
    }
}

async fn try_axfr(pool: &ResolverPool, apex: &Apex) -> Result<Vec<Candidate>> {
    let ns_host = first_nameserver(pool, apex).await?;
    let ns_ip = resolve_nameserver_ip(pool, &ns_host).await?;

    let addr = SocketAddr::new(ns_ip, 53);
    let stream = timeout(AXFR_TIMEOUT, TcpStream::connect(addr))
        .await
        .map_err(|_| EnumError::zone_transfer_refused("connect timed out"))?
        .map_err(|e| EnumError::zone_transfer_refused(e.to_string()))?;

    let apex_name = Name::from_ascii(format!("{apex}."))
        .map_err(|e| EnumError::zone_transfer_refused(e.to_string()))?;

    let mut query = Query::new();
    query.set_name(apex_name.clone());
    query.set_query_type(RecordType::AXFR);

    let mut message = Message::new();
    message.set_id(rand::random::<u16>());
    message.set_message_type(MessageType::Query);
    message.set_op_code(OpCode::Query);
    message.add_query(query);

    let wire = message
        .to_bytes()
        .map_err(|e| EnumError::zone_transfer_refused(e.to_string()))?;

    let mut stream = stream;
    write_framed(&mut stream, &wire).await?;

    let mut names = Vec::new();
    loop {
        let frame = match timeout(AXFR_TIMEOUT, read_framed(&mut stream)).await {
            Ok(Ok(Some(frame))) => frame,
            Ok(Ok(None)) => break,
            Ok(Err(e)) => return Err(EnumError::zone_transfer_refused(e.to_string())),
            Err(_) => return Err(EnumError::zone_transfer_refused("read timed out")),
        };

        let response = Message::from_bytes(&frame)
            .map_err(|e| EnumError::zone_transfer_refused(e.to_string()))?;

        if response.answer_count() == 0 && names.is_empty() {
            return Err(EnumError::zone_transfer_refused("empty AXFR response"));
        }

        let mut saw_trailing_soa = false;
        for record in response.answers() {
            if record.record_type() == RecordType::SOA && !names.is_empty() {
                saw_trailing_soa = true;
            }
            let owner = record.name().clone();
            if owner != apex_name {
                if let Some(label) = relative_label(&owner, &apex_name) {
                    names.push(Candidate::label(label));
                }
            }
            let _ = matches!(record.data(), Some(RData::SOA(_)));
        }

        if saw_trailing_soa {
            break;
        }
    }

    names.sort_by(|a, b| a.0.cmp(&b.0));
    names.dedup();
    Ok(names)
}

async fn first_nameserver(pool: &ResolverPool, apex: &Apex) -> Result<String> {
    let resolver = pool
        .all()
        .first()
        .ok_or_else(|| EnumError::zone_transfer_refused("no resolver available"))?;
    let records = crate::resolver_pool::raw_lookup(resolver, apex.as_str(), RecordType::NS).await?;
    records
        .into_iter()
        .find_map(|r| match r {
            RData::NS(name) => Some(name.to_utf8()),
            _ => None,
        })
        .ok_or_else(|| EnumError::zone_transfer_refused("no NS records"))
}

async fn resolve_nameserver_ip(pool: &ResolverPool, host: &str) -> Result<std::net::IpAddr> {
    pool.query_a(host)
        .await?
        .and_then(|ips| ips.into_iter().next())
        .ok_or_else(|| EnumError::zone_transfer_refused(format!("cannot resolve nameserver {host}")))
}

fn relative_label(owner: &Name, apex: &Name) -> Option<String> {
    let owner_str = owner.to_utf8();
    let apex_str = apex.to_utf8();
    let owner_trimmed = owner_str.trim_end_matches('.');
    let apex_trimmed = apex_str.trim_end_matches('.');
    if owner_trimmed == apex_trimmed {
        return None;
    }
    owner_trimmed
        .strip_suffix(&format!(".{apex_trimmed}"))
        .map(|s| s.to_string())
}

/// DNS-over-TCP framing: a two-byte big-endian length prefix per message.
async fn write_framed(stream: &mut TcpStream, payload: &[u8]) -> Result<()> {
    let len = u16::try_from(payload.len())
        .map_err(|_| EnumError::zone_transfer_refused("message too large for TCP framing"))?;
    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(payload).await?;
    Ok(())
}

async fn read_framed(stream: &mut TcpStream) -> std::io::Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 2];
    match stream.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let len = u16::from_be_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf).await?;
    Ok(Some(buf))
}
