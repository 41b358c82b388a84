//! Session-level SDP lines (v=, o=, s=, i=, c=, b=, t=, a=group)

use std::fmt;

/// `v=0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLine {
    pub version: u32,
}

impl VersionLine {
    pub fn parse(value: &str) -> Option<Self> {
        let version = value.parse().ok()?;
        Some(Self { version })
    }
}

impl fmt::Display for VersionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v={}", self.version)
    }
}

/// `o=<username> <sess-id> <sess-version> <nettype> <addrtype> <address>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginLine {
    pub username: String,
    /// Kept as text: some stacks emit ids wider than 64 bits
    pub session_id: String,
    pub session_version: u64,
    pub net_type: String,
    pub addr_type: String,
    pub address: String,
}

impl OriginLine {
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() != 6 {
            return None;
        }

        if parts[1].is_empty() || !parts[1].bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(Self {
            username: parts[0].to_string(),
            session_id: parts[1].to_string(),
            session_version: parts[2].parse().ok()?,
            net_type: parts[3].to_string(),
            addr_type: parts[4].to_string(),
            address: parts[5].to_string(),
        })
    }
}

impl fmt::Display for OriginLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "o={} {} {} {} {} {}",
            self.username,
            self.session_id,
            self.session_version,
            self.net_type,
            self.addr_type,
            self.address
        )
    }
}

/// `s=<session name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionNameLine {
    pub name: String,
}

impl SessionNameLine {
    pub fn parse(value: &str) -> Option<Self> {
        Some(Self {
            name: value.to_string(),
        })
    }
}

impl fmt::Display for SessionNameLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s={}", self.name)
    }
}

/// `i=<session information>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInformationLine {
    pub info: String,
}

impl SessionInformationLine {
    pub fn parse(value: &str) -> Option<Self> {
        Some(Self {
            info: value.to_string(),
        })
    }
}

impl fmt::Display for SessionInformationLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i={}", self.info)
    }
}

/// `c=<nettype> <addrtype> <connection-address>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionLine {
    pub net_type: String,
    pub addr_type: String,
    pub address: String,
}

impl ConnectionLine {
    pub fn new(net_type: &str, addr_type: &str, address: &str) -> Self {
        Self {
            net_type: net_type.to_string(),
            addr_type: addr_type.to_string(),
            address: address.to_string(),
        }
    }

    /// `IN IP4 0.0.0.0`
    pub fn ipv4_any() -> Self {
        Self::new("IN", "IP4", "0.0.0.0")
    }

    pub fn is_ipv6(&self) -> bool {
        self.addr_type.eq_ignore_ascii_case("IP6")
    }

    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() != 3 {
            return None;
        }

        Some(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for ConnectionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c={} {} {}", self.net_type, self.addr_type, self.address)
    }
}

/// Bandwidth modifier of a `b=` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BandwidthType {
    /// Conference total
    Ct,
    /// Application specific, kbps
    As,
    /// Transport independent, bps
    Tias,
}

impl BandwidthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BandwidthType::Ct => "CT",
            BandwidthType::As => "AS",
            BandwidthType::Tias => "TIAS",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "CT" => Some(BandwidthType::Ct),
            "AS" => Some(BandwidthType::As),
            "TIAS" => Some(BandwidthType::Tias),
            _ => None,
        }
    }
}

/// `b=<bwtype>:<bandwidth>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandwidthLine {
    pub bandwidth_type: BandwidthType,
    pub bandwidth: u32,
}

impl BandwidthLine {
    pub fn new(bandwidth_type: BandwidthType, bandwidth: u32) -> Self {
        Self {
            bandwidth_type,
            bandwidth,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let (kind, amount) = value.split_once(':')?;
        Some(Self {
            bandwidth_type: BandwidthType::from_string(kind)?,
            bandwidth: amount.parse().ok()?,
        })
    }
}

impl fmt::Display for BandwidthLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b={}:{}", self.bandwidth_type.as_str(), self.bandwidth)
    }
}

/// `t=<start-time> <stop-time>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingLine {
    pub start_time: u64,
    pub stop_time: u64,
}

impl TimingLine {
    pub fn parse(value: &str) -> Option<Self> {
        let (start, stop) = value.split_once(' ')?;
        Some(Self {
            start_time: start.parse().ok()?,
            stop_time: stop.parse().ok()?,
        })
    }
}

impl fmt::Display for TimingLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={} {}", self.start_time, self.stop_time)
    }
}

/// `a=group:BUNDLE <mid> <mid> ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleGroupLine {
    pub mids: Vec<String>,
}

impl BundleGroupLine {
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.strip_prefix("group:BUNDLE")?;
        if !rest.is_empty() && !rest.starts_with(' ') {
            return None;
        }

        Some(Self {
            mids: rest.split_whitespace().map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for BundleGroupLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=group:BUNDLE")?;
        for mid in &self.mids {
            write!(f, " {}", mid)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_line() {
        let origin = OriginLine::parse("- 9071898453171296627 2 IN IP4 127.0.0.1").unwrap();
        assert_eq!(origin.username, "-");
        assert_eq!(origin.session_id, "9071898453171296627");
        assert_eq!(origin.session_version, 2);
        assert_eq!(
            origin.to_string(),
            "o=- 9071898453171296627 2 IN IP4 127.0.0.1"
        );
    }

    #[test]
    fn test_origin_rejects_non_numeric_version() {
        assert!(OriginLine::parse("- 123 abc IN IP4 127.0.0.1").is_none());
        assert!(OriginLine::parse("- 12x 1 IN IP4 127.0.0.1").is_none());
        assert!(OriginLine::parse("- 123 1 IN IP4").is_none());
    }

    #[test]
    fn test_bandwidth_line() {
        let bw = BandwidthLine::parse("TIAS:1000000").unwrap();
        assert_eq!(bw.bandwidth_type, BandwidthType::Tias);
        assert_eq!(bw.bandwidth, 1_000_000);
        assert_eq!(bw.to_string(), "b=TIAS:1000000");

        assert!(BandwidthLine::parse("AS:fast").is_none());
        assert!(BandwidthLine::parse("X-FOO:12").is_none());
    }

    #[test]
    fn test_timing_and_version() {
        assert_eq!(TimingLine::parse("0 0").unwrap().to_string(), "t=0 0");
        assert!(TimingLine::parse("0").is_none());
        assert_eq!(VersionLine::parse("0").unwrap().version, 0);
        assert!(VersionLine::parse("zero").is_none());
    }

    #[test]
    fn test_bundle_group() {
        let group = BundleGroupLine::parse("group:BUNDLE 0 1 2").unwrap();
        assert_eq!(group.mids, vec!["0", "1", "2"]);
        assert_eq!(group.to_string(), "a=group:BUNDLE 0 1 2");

        assert!(BundleGroupLine::parse("group:LS 0 1").is_none());
        assert!(BundleGroupLine::parse("group:BUNDLEX 0").is_none());
    }

    #[test]
    fn test_connection_ipv6() {
        let c = ConnectionLine::parse("IN IP6 ::1").unwrap();
        assert!(c.is_ipv6());
        assert_eq!(ConnectionLine::ipv4_any().to_string(), "c=IN IP4 0.0.0.0");
    }
}
