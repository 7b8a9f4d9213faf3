use crate::config::ScanConfig;
use crate::probe::{Prober, TcpProber};
use crate::types::{PortResult, PortState, ScanResults};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Receives one event per discovered open port while the scan is running.
pub type DiscoverySender = mpsc::UnboundedSender<PortResult>;

/// Scan every port of `config` with the TCP prober.
///
/// - Limits concurrent connect attempts using a `Semaphore`.
/// - Each probe bounds its connect and banner exchange by the configured timeout.
/// - Only open ports are kept; closed ones are counted and dropped.
pub async fn scan(config: &ScanConfig) -> ScanResults {
    scan_with(Arc::new(TcpProber), config, CancellationToken::new(), None).await
}

/// Variant that accepts a `CancellationToken` and a discovery channel.
pub async fn scan_with_cancel(
    config: &ScanConfig,
    cancel: CancellationToken,
    discoveries: Option<DiscoverySender>,
) -> ScanResults {
    scan_with(Arc::new(TcpProber), config, cancel, discoveries).await
}

/// Open ports found so far plus the evaluation counter. Owned by one scan and
/// shared with its probe tasks.
#[derive(Clone, Debug, Default)]
pub struct ResultCollector {
    scanned_done: Arc<AtomicU64>,
    open_ports: Arc<Mutex<Vec<PortResult>>>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scanned_done(&self) -> u64 {
        self.scanned_done.load(Ordering::Relaxed)
    }

    async fn record(&self, result: PortResult) -> Option<PortResult> {
        self.scanned_done.fetch_add(1, Ordering::Relaxed);
        match result.state {
            PortState::Open => {
                self.open_ports.lock().await.push(result.clone());
                Some(result)
            }
            PortState::Closed => None,
        }
    }

    fn count_lost(&self) {
        self.scanned_done.fetch_add(1, Ordering::Relaxed);
    }

    async fn take(&self) -> Vec<PortResult> {
        std::mem::take(&mut *self.open_ports.lock().await)
    }
}

/// Scan driver generic over the prober.
///
/// Exactly one probe is spawned per port unless `cancel` fires, in which case
/// admission stops and the probes already in flight are awaited.
pub async fn scan_with<P: Prober>(
    prober: Arc<P>,
    config: &ScanConfig,
    cancel: CancellationToken,
    discoveries: Option<DiscoverySender>,
) -> ScanResults {
    let ports = config.ports();
    let timeout = config.timeout();
    let total = ports.len() as u64;
    let collector = ResultCollector::new();
    let sem = Arc::new(Semaphore::new(config.max_concurrency()));
    let mut set = JoinSet::new();

    log::info!(
        "scanning {} ports {} with concurrency {} and timeout {:?}",
        config.target(),
        ports,
        config.max_concurrency(),
        timeout
    );

    for port in ports.iter() {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = sem.clone().acquire_owned() => permit.ok(),
        };
        let Some(permit) = permit else {
            log::debug!("admission stopped before port {port}");
            break;
        };

        let prober = prober.clone();
        let target = config.target().clone();
        let collector = collector.clone();
        let discoveries = discoveries.clone();

        set.spawn(async move {
            let _permit = permit; // keep permit until the probe completes
            let result = prober.probe(&target, port, timeout).await;
            if let Some(open) = collector.record(result).await {
                if let Some(tx) = &discoveries {
                    // Receiver gone just means nobody is rendering.
                    let _ = tx.send(open);
                }
            }
        });
    }

    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            log::warn!("probe task failed: {e}");
            collector.count_lost();
        }
    }

    let results = ScanResults {
        scanned_total: total,
        scanned_done: collector.scanned_done(),
        cancelled: cancel.is_cancelled() && collector.scanned_done() < total,
        open_ports: collector.take().await,
    };
    log::info!(
        "scan of {} finished: {}/{} ports evaluated, {} open",
        config.target(),
        results.scanned_done,
        results.scanned_total,
        results.open_count()
    );
    results
}
