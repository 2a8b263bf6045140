//! DNS resolution for the SMTP server name.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};

use crate::error::{Error, Result};

/// Asynchronous name resolution.
pub trait Resolver: Send + Sync {
    /// Resolves `host` to a socket address on `port`.
    fn lookup(&self, host: &str, port: u16) -> impl Future<Output = Result<SocketAddr>> + Send;
}

/// Resolver backed by the system resolver through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    async fn lookup(&self, host: &str, port: u16) -> Result<SocketAddr> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| Error::dns(host, e.to_string()))?
            .collect();

        // IPv4 first, like the address family the session was written for.
        addrs
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| Error::dns(host, "no addresses"))
    }
}

/// Resolves the server endpoint for a session.
///
/// A literal IP address is already resolved and returns at once without
/// asking `resolver`; both paths hand the caller the same kind of result.
///
/// # Errors
///
/// Returns [`Error::Dns`] if the name is empty or the lookup fails.
pub async fn resolve_endpoint<R: Resolver>(resolver: &R, host: &str, port: u16) -> Result<SocketAddr> {
    if host.is_empty() {
        return Err(Error::dns(host, "empty hostname"));
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        tracing::debug!(host, "SMTP server already resolved");
        return Ok(SocketAddr::new(ip, port));
    }

    tracing::debug!(host, "SMTP DNS lookup");
    let addr = resolver.lookup(host, port).await?;
    tracing::debug!(host, %addr, "SMTP DNS lookup finished");
    Ok(addr)
}
