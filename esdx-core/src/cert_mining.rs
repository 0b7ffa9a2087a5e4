//! TLS certificate SAN mining: harvest subdomains from the leaf certificate
//! served on TCP/443, without requiring the hostname to match.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::debug;
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::*;

use crate::error::{EnumError, Result};
use crate::resolver_pool::ResolverPool;
use crate::types::{Apex, Candidate};

const TLS_TIMEOUT: Duration = Duration::from_secs(10);

/// Chain-validating but hostname-agnostic verifier: the purpose is intelligence
/// gathering from whatever certificate is served, not trust establishment.
#[derive(Debug)]
struct AcceptAnyHostVerifier {
    inner: Arc<rustls::client::WebPkiServerVerifier>,
}

impl ServerCertVerifier for AcceptAnyHostVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        match self
            .inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
        {
            Ok(verified) => Ok(verified),
            Err(rustls::Error::InvalidCertificate(_)) => Ok(ServerCertVerified::assertion()),
            Err(e) => Err(e),
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

fn client_config() -> Result<ClientConfig> {
    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let base = rustls::client::WebPkiServerVerifier::builder(Arc::new(roots))
        .build()
        .map_err(|e| EnumError::tls(e.to_string()))?;
    let verifier = AcceptAnyHostVerifier { inner: base };
    Ok(ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth())
}

/// Resolve `www.<apex>`, open a TLS connection on port 443, and extract every
/// SAN dNSName ending in `.<apex>` (wildcard entries are skipped). Names are
/// re-relativized to apex before being returned as candidates.
pub async fn mine(pool: &ResolverPool, apex: &Apex) -> Vec<Candidate> {
    match try_mine(pool, apex).await {
        Ok(candidates) => candidates,
        Err(e) => {
            debug!("certificate SAN mining unavailable for {apex}: {e}");
            Vec::new()
        }
    }
}

async fn try_mine(pool: &ResolverPool, apex: &Apex) -> Result<Vec<Candidate>> {
    let probe_host = format!("www.{apex}");
    let ip = pool
        .query_a(&probe_host)
        .await?
        .and_then(|ips| ips.into_iter().next())
        .ok_or_else(|| EnumError::tls(format!("{probe_host} does not resolve")))?;

    let der = fetch_leaf_certificate(ip, &probe_host).await?;
    let (_, cert) = X509Certificate::from_der(&der).map_err(|e| EnumError::tls(e.to_string()))?;

    let mut names = Vec::new();
    if let Ok(Some(san)) = cert.subject_alternative_name() {
        for name in san.value.general_names.iter() {
            if let GeneralName::DNSName(dns) = name {
                if dns.starts_with('*') {
                    continue;
                }
                if let Some(label) = relative_to_apex(dns, apex) {
                    names.push(Candidate::label(label));
                }
            }
        }
    }
    names.sort_by(|a: &Candidate, b: &Candidate| a.0.cmp(&b.0));
    names.dedup();
    Ok(names)
}

fn relative_to_apex(dns_name: &str, apex: &Apex) -> Option<String> {
    let dns_name = dns_name.trim_end_matches('.').to_lowercase();
    let apex_str = apex.as_str();
    if dns_name == apex_str {
        return None;
    }
    dns_name.strip_suffix(&format!(".{apex_str}")).map(|s| s.to_string())
}

async fn fetch_leaf_certificate(ip: IpAddr, sni: &str) -> Result<Vec<u8>> {
    let config = client_config()?;
    let connector = TlsConnector::from(Arc::new(config));

    let tcp = timeout(TLS_TIMEOUT, TcpStream::connect((ip, 443)))
        .await
        .map_err(|_| EnumError::tls("connect timed out"))?
        .map_err(|e| EnumError::tls(e.to_string()))?;

    let server_name = ServerName::try_from(sni.to_string()).map_err(|e| EnumError::tls(e.to_string()))?;

    let stream = timeout(TLS_TIMEOUT, connector.connect(server_name, tcp))
        .await
        .map_err(|_| EnumError::tls("handshake timed out"))?
        .map_err(|e| EnumError::tls(e.to_string()))?;

    let (_, session) = stream.get_ref();
    let chain = session
        .peer_certificates()
        .ok_or_else(|| EnumError::tls("no peer certificate presented"))?;
    let leaf = chain
        .first()
        .ok_or_else(|| EnumError::tls("empty certificate chain"))?;
    Ok(leaf.to_vec())
}
