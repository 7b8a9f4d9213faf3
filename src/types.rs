use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Open,
    Closed,
}

/// Result of probing one port. Serialises as `{port, service, banner}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PortResult {
    pub port: u16,
    // Reports only ever carry open ports, so the state is implied there.
    #[serde(skip, default = "open_state")]
    pub state: PortState,
    pub service: String,
    pub banner: String,
}

fn open_state() -> PortState {
    PortState::Open
}

impl PortResult {
    pub fn open(port: u16, service: impl Into<String>, banner: impl Into<String>) -> Self {
        Self {
            port,
            state: PortState::Open,
            service: service.into(),
            banner: banner.into(),
        }
    }

    pub fn closed(port: u16) -> Self {
        Self {
            port,
            state: PortState::Closed,
            service: String::new(),
            banner: String::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

/// Heuristic security observation about one open port.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub port: u16,
    pub description: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Port {}: {}", self.port, self.description)
    }
}

/// Open ports and progress counters returned by the scan coordinator.
#[derive(Debug, Clone, Default)]
pub struct ScanResults {
    pub scanned_total: u64,
    pub scanned_done: u64,
    pub cancelled: bool,
    pub open_ports: Vec<PortResult>,
}

impl ScanResults {
    pub fn open_count(&self) -> usize {
        self.open_ports.len()
    }
}
