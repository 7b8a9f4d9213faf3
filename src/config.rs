use crate::error::{Result, ScanError};
use crate::ports::PortRange;
use crate::target::ScanTarget;
use std::time::Duration;

pub const DEFAULT_PORTS: &str = "1-1000";
pub const DEFAULT_TIMEOUT_SECS: f64 = 1.0;
pub const DEFAULT_CONCURRENCY: usize = 100;
/// Upper bound on simultaneous probes; each one holds a socket.
pub const MAX_CONCURRENCY: usize = 5_000;

/// Validated input to the scan coordinator. Only constructible through
/// [`ScanConfig::new`], so a malformed configuration never reaches probing.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    target: ScanTarget,
    ports: PortRange,
    timeout: Duration,
    max_concurrency: usize,
}

impl ScanConfig {
    pub fn new(
        target: ScanTarget,
        ports: PortRange,
        timeout_secs: f64,
        max_concurrency: usize,
    ) -> Result<Self> {
        let timeout = timeout_from_secs(timeout_secs)?;
        if !(1..=MAX_CONCURRENCY).contains(&max_concurrency) {
            return Err(ScanError::InvalidConcurrency);
        }
        Ok(Self {
            target,
            ports,
            timeout,
            max_concurrency,
        })
    }

    pub fn target(&self) -> &ScanTarget {
        &self.target
    }

    pub fn ports(&self) -> PortRange {
        self.ports
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }
}

/// Converts a user-supplied number of seconds into a strictly positive duration.
pub fn timeout_from_secs(secs: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(d) if !d.is_zero() => Ok(d),
        _ => Err(ScanError::InvalidTimeout(secs)),
    }
}
