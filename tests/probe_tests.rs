use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use portprobe::probe::{Prober, TcpProber};
use portprobe::services::UNKNOWN_SERVICE;
use portprobe::target::ScanTarget;
use portprobe::types::PortState;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn localhost() -> ScanTarget {
    ScanTarget::new("127.0.0.1", IpAddr::V4(Ipv4Addr::LOCALHOST))
}

async fn listener() -> (TcpListener, u16) {
    let l = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = l.local_addr().unwrap().port();
    (l, port)
}

#[tokio::test]
async fn server_banner_is_captured() {
    let (l, port) = listener().await;
    tokio::spawn(async move {
        let (mut s, _) = l.accept().await.unwrap();
        s.write_all(b"SSH-2.0-TestServer_1.0\r\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let res = TcpProber.probe(&localhost(), port, Duration::from_secs(1)).await;
    assert_eq!(res.state, PortState::Open);
    assert_eq!(res.port, port);
    assert_eq!(res.service, UNKNOWN_SERVICE);
    assert_eq!(res.banner, "SSH-2.0-TestServer_1.0");
}

#[tokio::test]
async fn unmapped_port_gets_line_terminator_nudge() {
    let (l, port) = listener().await;
    tokio::spawn(async move {
        let (mut s, _) = l.accept().await.unwrap();
        let mut buf = [0u8; 64];
        let n = s.read(&mut buf).await.unwrap();
        let reply = format!("got {:?}", String::from_utf8_lossy(&buf[..n]));
        s.write_all(reply.as_bytes()).await.unwrap();
    });

    let res = TcpProber.probe(&localhost(), port, Duration::from_secs(1)).await;
    assert!(res.is_open());
    assert_eq!(res.banner, r#"got "\r\n""#);
}

#[tokio::test]
async fn closed_port_reports_closed() {
    let (l, port) = listener().await;
    drop(l);

    let res = TcpProber.probe(&localhost(), port, Duration::from_millis(500)).await;
    assert_eq!(res.state, PortState::Closed);
    assert!(res.banner.is_empty());
}

#[tokio::test]
async fn silent_service_yields_empty_banner_within_timeout() {
    let (l, port) = listener().await;
    tokio::spawn(async move {
        let (_s, _) = l.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let timeout = Duration::from_millis(300);
    let start = Instant::now();
    let res = TcpProber.probe(&localhost(), port, timeout).await;
    let elapsed = start.elapsed();

    assert!(res.is_open());
    assert!(res.banner.is_empty());
    assert!(elapsed < timeout + Duration::from_millis(500), "took {elapsed:?}");
}

#[tokio::test]
async fn unresponsive_address_returns_within_timeout() {
    // TEST-NET-1 is never routed; the connect either fails fast or times out.
    let target = ScanTarget::new("192.0.2.1", IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)));
    let timeout = Duration::from_millis(300);
    let start = Instant::now();
    let res = TcpProber.probe(&target, 81, timeout).await;
    let elapsed = start.elapsed();

    assert!(!res.is_open());
    assert!(elapsed < timeout + Duration::from_millis(500), "took {elapsed:?}");
}
