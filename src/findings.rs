//! Heuristic findings derived from which ports are open.

use crate::types::{Finding, PortResult};

#[derive(Debug, Clone, Copy)]
enum RuleMatch {
    /// Port number plus a substring the classified service must contain.
    PortService(u16, &'static str),
    Port(u16),
    AnyOf(&'static [u16]),
}

impl RuleMatch {
    fn matches(self, result: &PortResult) -> bool {
        match self {
            RuleMatch::PortService(port, service) => {
                result.port == port && result.service.contains(service)
            }
            RuleMatch::Port(port) => result.port == port,
            RuleMatch::AnyOf(ports) => ports.contains(&result.port),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FindingRule {
    matcher: RuleMatch,
    description: &'static str,
}

pub const DATABASE_PORTS: &[u16] = &[1433, 3306, 5432];

const RULES: &[FindingRule] = &[
    FindingRule {
        matcher: RuleMatch::PortService(21, "FTP"),
        description: "FTP may allow anonymous access",
    },
    FindingRule {
        matcher: RuleMatch::PortService(23, "Telnet"),
        description: "Telnet sends data in plaintext",
    },
    FindingRule {
        matcher: RuleMatch::Port(3389),
        description: "RDP exposed - potential brute force target",
    },
    FindingRule {
        matcher: RuleMatch::AnyOf(DATABASE_PORTS),
        description: "Database directly exposed to network",
    },
];

/// Evaluate every rule against every open port. Output follows input order;
/// a port matching several rules yields one finding per rule.
pub fn aggregate(open_ports: &[PortResult]) -> Vec<Finding> {
    open_ports
        .iter()
        .filter(|r| r.is_open())
        .flat_map(|r| {
            RULES
                .iter()
                .filter(|rule| rule.matcher.matches(r))
                .map(|rule| Finding {
                    port: r.port,
                    description: rule.description.to_string(),
                })
        })
        .collect()
}
