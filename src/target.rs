use crate::error::{Result, ScanError};
use std::fmt;
use std::net::IpAddr;

/// Host as given by the user plus the address actually scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub host: String,
    pub ip: IpAddr,
}

impl ScanTarget {
    pub fn new(host: impl Into<String>, ip: IpAddr) -> Self {
        Self { host: host.into(), ip }
    }

    /// Resolve `host` to an address. Literal IPs are taken as-is; names go
    /// through the system resolver and the first IPv4 answer wins, falling back
    /// to the first IPv6 one.
    pub async fn resolve(host: &str) -> Result<Self> {
        let host = host.trim();
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(Self::new(host, ip));
        }
        if host.is_empty() {
            return Err(ScanError::Unresolvable {
                host: host.to_string(),
                source: None,
            });
        }

        let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| ScanError::Unresolvable {
                host: host.to_string(),
                source: Some(e),
            })?
            .map(|sa| sa.ip())
            .collect();

        let ip = addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| ScanError::Unresolvable {
                host: host.to_string(),
                source: None,
            })?;
        log::debug!("resolved {host} to {ip}");
        Ok(Self::new(host, ip))
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.host, self.ip)
        }
    }
}
