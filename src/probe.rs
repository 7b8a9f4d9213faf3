use crate::services::{self, Greeting};
use crate::target::ScanTarget;
use crate::types::PortResult;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;

/// Maximum banner length in characters before it gets cut and suffixed.
pub const BANNER_MAX_CHARS: usize = 50;
const BANNER_ELLIPSIS: &str = "...";
const BANNER_BUF_LEN: usize = 1024;

/// Something that can evaluate a single port. The coordinator is generic over
/// this so it can be driven without touching the network.
pub trait Prober: Send + Sync + 'static {
    /// Probe `port` on `target`. Must never fail: unreachable or refused ports
    /// come back as [`PortResult::closed`].
    fn probe(
        &self,
        target: &ScanTarget,
        port: u16,
        timeout: Duration,
    ) -> impl Future<Output = PortResult> + Send;
}

/// Real TCP connect prober with a single banner-grab round.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

impl Prober for TcpProber {
    async fn probe(&self, target: &ScanTarget, port: u16, timeout: Duration) -> PortResult {
        let addr = SocketAddr::new(target.ip, port);
        let mut stream = match time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                log::trace!("{addr}: closed ({e})");
                return PortResult::closed(port);
            }
            Err(_) => {
                log::trace!("{addr}: connect timed out");
                return PortResult::closed(port);
            }
        };

        let service = services::classify(port);
        let payload = probe_payload(services::greeting(port), &target.host);
        let banner = grab_banner(&mut stream, &payload, timeout).await;
        PortResult::open(port, service, banner)
    }
}

/// Bytes to send before reading, based on how the service expects to be greeted.
pub fn probe_payload(greeting: Greeting, host: &str) -> Vec<u8> {
    match greeting {
        Greeting::ServerFirst => Vec::new(),
        Greeting::Http => format!("GET / HTTP/1.1\r\nHost: {host}\r\n\r\n").into_bytes(),
        Greeting::Nudge => b"\r\n".to_vec(),
    }
}

/// Send `payload` (if any) and do one bounded read. The whole exchange shares
/// one deadline; any failure yields an empty banner.
async fn grab_banner(stream: &mut TcpStream, payload: &[u8], timeout: Duration) -> String {
    let mut buf = vec![0u8; BANNER_BUF_LEN];
    let exchange = async {
        if !payload.is_empty() {
            stream.write_all(payload).await?;
        }
        stream.read(&mut buf).await
    };
    match time::timeout(timeout, exchange).await {
        Ok(Ok(n)) if n > 0 => format_banner(&buf[..n]),
        _ => String::new(),
    }
}

/// Decode raw banner bytes: invalid UTF-8 is dropped, surrounding whitespace
/// trimmed, and the text cut to [`BANNER_MAX_CHARS`] characters.
pub fn format_banner(raw: &[u8]) -> String {
    let decoded: String = raw.utf8_chunks().map(|chunk| chunk.valid()).collect();
    let text = decoded.trim();
    match text.char_indices().nth(BANNER_MAX_CHARS) {
        Some((cut, _)) => format!("{}{BANNER_ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}
