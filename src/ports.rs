use crate::error::{Result, ScanError};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Inclusive range of TCP ports (1..=65535) with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Result<Self> {
        if start == 0 {
            return Err(ScanError::InvalidPort(start.to_string()));
        }
        if start > end {
            return Err(ScanError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(port: u16) -> Result<Self> {
        Self::new(port, port)
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Number of ports covered, always at least 1.
    pub fn len(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self { start: 1, end: 1000 }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Parses `"N"` or `"N-M"`. Surrounding whitespace is ignored.
impl FromStr for PortRange {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((a, b)) = s.split_once('-') {
            let start = parse_port_str(a.trim())?;
            let end = parse_port_str(b.trim())?;
            return Self::new(start, end);
        }
        Self::single(parse_port_str(s)?)
    }
}

fn parse_port_str(s: &str) -> Result<u16> {
    let val: u32 = s
        .parse::<u32>()
        .map_err(|_| ScanError::InvalidPort(s.to_string()))?;
    if val == 0 || val > 65535 {
        return Err(ScanError::InvalidPort(s.to_string()));
    }
    Ok(val as u16)
}
