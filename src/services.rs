//! Static well-known port table used for service naming and for choosing the
//! banner probe payload.

/// Service name returned for ports missing from the table.
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// How a service expects to be greeted before it says anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    /// Service announces itself on connect; send nothing.
    ServerFirst,
    /// Service speaks HTTP; send a minimal request.
    Http,
    /// Send a bare line terminator.
    Nudge,
}

#[derive(Debug, Clone, Copy)]
struct ServiceEntry {
    port: u16,
    name: &'static str,
    greeting: Greeting,
}

const fn entry(port: u16, name: &'static str, greeting: Greeting) -> ServiceEntry {
    ServiceEntry { port, name, greeting }
}

// Sorted by port for binary search.
const SERVICES: &[ServiceEntry] = &[
    entry(21, "FTP", Greeting::ServerFirst),
    entry(22, "SSH", Greeting::ServerFirst),
    entry(23, "Telnet", Greeting::Nudge),
    entry(25, "SMTP", Greeting::Nudge),
    entry(53, "DNS", Greeting::Nudge),
    entry(80, "HTTP", Greeting::Http),
    entry(110, "POP3", Greeting::Nudge),
    entry(143, "IMAP", Greeting::Nudge),
    entry(443, "HTTPS", Greeting::Nudge),
    entry(993, "IMAPS", Greeting::Nudge),
    entry(995, "POP3S", Greeting::Nudge),
    entry(1433, "MSSQL", Greeting::Nudge),
    entry(3306, "MySQL", Greeting::Nudge),
    entry(3389, "RDP", Greeting::Nudge),
    entry(5000, "Flask/Docker", Greeting::Nudge),
    entry(5432, "PostgreSQL", Greeting::Nudge),
    entry(6379, "Redis", Greeting::Nudge),
    entry(8080, "HTTP-Alt", Greeting::Http),
    entry(9200, "Elasticsearch", Greeting::Nudge),
    entry(11211, "Memcached", Greeting::Nudge),
    entry(27017, "MongoDB", Greeting::Nudge),
];

fn lookup(port: u16) -> Option<&'static ServiceEntry> {
    SERVICES
        .binary_search_by_key(&port, |e| e.port)
        .ok()
        .map(|i| &SERVICES[i])
}

/// Best-guess service name for `port`, or [`UNKNOWN_SERVICE`].
pub fn classify(port: u16) -> &'static str {
    lookup(port).map_or(UNKNOWN_SERVICE, |e| e.name)
}

/// Probe payload style for `port`. Unmapped ports get a [`Greeting::Nudge`].
pub fn greeting(port: u16) -> Greeting {
    lookup(port).map_or(Greeting::Nudge, |e| e.greeting)
}
