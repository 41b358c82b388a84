//! Media-level SDP lines (m=, direction, mid, extmap, rid, simulcast, SCTP)

use std::fmt;

/// `m=<media> <port>[/<count>] <proto> <fmt> ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLine {
    pub media_type: String,
    pub port: u16,
    /// Number of consecutive ports when given as `<port>/<count>`
    pub port_count: Option<u16>,
    pub protocol: String,
    pub formats: Vec<String>,
}

impl MediaLine {
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() < 3 {
            return None;
        }

        let (port, port_count) = match parts[1].split_once('/') {
            Some((port, count)) => (port.parse().ok()?, Some(count.parse().ok()?)),
            None => (parts[1].parse().ok()?, None),
        };

        Some(Self {
            media_type: parts[0].to_string(),
            port,
            port_count,
            protocol: parts[2].to_string(),
            formats: parts[3..].iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl fmt::Display for MediaLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m={} {}", self.media_type, self.port)?;
        if let Some(count) = self.port_count {
            write!(f, "/{}", count)?;
        }
        write!(f, " {}", self.protocol)?;
        for format in &self.formats {
            write!(f, " {}", format)?;
        }
        Ok(())
    }
}

/// Media direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDirection {
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

impl MediaDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaDirection::SendRecv => "sendrecv",
            MediaDirection::SendOnly => "sendonly",
            MediaDirection::RecvOnly => "recvonly",
            MediaDirection::Inactive => "inactive",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "sendrecv" => Some(MediaDirection::SendRecv),
            "sendonly" => Some(MediaDirection::SendOnly),
            "recvonly" => Some(MediaDirection::RecvOnly),
            "inactive" => Some(MediaDirection::Inactive),
            _ => None,
        }
    }
}

/// `a=sendrecv`, `a=sendonly`, `a=recvonly` or `a=inactive`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionLine {
    pub direction: MediaDirection,
}

impl DirectionLine {
    pub fn parse(value: &str) -> Option<Self> {
        Some(Self {
            direction: MediaDirection::from_string(value)?,
        })
    }
}

impl fmt::Display for DirectionLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a={}", self.direction.as_str())
    }
}

/// `a=mid:<identification-tag>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidLine {
    pub mid: String,
}

impl MidLine {
    pub fn parse(value: &str) -> Option<Self> {
        let mid = value.strip_prefix("mid:")?;
        if mid.is_empty() || mid.contains(' ') {
            return None;
        }
        Some(Self {
            mid: mid.to_string(),
        })
    }
}

impl fmt::Display for MidLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=mid:{}", self.mid)
    }
}

/// `a=content:<value>`, e.g. `slides`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    pub content: String,
}

impl ContentLine {
    pub fn parse(value: &str) -> Option<Self> {
        let content = value.strip_prefix("content:")?;
        if content.is_empty() {
            return None;
        }
        Some(Self {
            content: content.to_string(),
        })
    }
}

impl fmt::Display for ContentLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=content:{}", self.content)
    }
}

/// `a=extmap:<id>[/<direction>] <uri> [<attributes>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtMapLine {
    pub id: u16,
    pub direction: Option<MediaDirection>,
    pub uri: String,
    pub attributes: Option<String>,
}

impl ExtMapLine {
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.strip_prefix("extmap:")?;
        let (id_part, rest) = rest.split_once(' ')?;

        let (id, direction) = match id_part.split_once('/') {
            Some((id, direction)) => (id, Some(MediaDirection::from_string(direction)?)),
            None => (id_part, None),
        };

        let (uri, attributes) = match rest.split_once(' ') {
            Some((uri, attributes)) => (uri, Some(attributes.to_string())),
            None => (rest, None),
        };
        if uri.is_empty() {
            return None;
        }

        Some(Self {
            id: id.parse().ok()?,
            direction,
            uri: uri.to_string(),
            attributes,
        })
    }
}

impl fmt::Display for ExtMapLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=extmap:{}", self.id)?;
        if let Some(direction) = self.direction {
            write!(f, "/{}", direction.as_str())?;
        }
        write!(f, " {}", self.uri)?;
        if let Some(ref attributes) = self.attributes {
            write!(f, " {}", attributes)?;
        }
        Ok(())
    }
}

/// Direction of a RID or simulcast stream set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RidDirection {
    Send,
    Recv,
}

impl RidDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RidDirection::Send => "send",
            RidDirection::Recv => "recv",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "send" => Some(RidDirection::Send),
            "recv" => Some(RidDirection::Recv),
            _ => None,
        }
    }
}

/// `a=rid:<id> <direction> [<restrictions>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RidLine {
    pub id: String,
    pub direction: RidDirection,
    pub restrictions: Option<String>,
}

impl RidLine {
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.strip_prefix("rid:")?;
        let (id, rest) = rest.split_once(' ')?;
        let (direction, restrictions) = match rest.split_once(' ') {
            Some((direction, restrictions)) => (direction, Some(restrictions.to_string())),
            None => (rest, None),
        };
        if id.is_empty() {
            return None;
        }

        Some(Self {
            id: id.to_string(),
            direction: RidDirection::from_string(direction)?,
            restrictions,
        })
    }
}

impl fmt::Display for RidLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=rid:{} {}", self.id, self.direction.as_str())?;
        if let Some(ref restrictions) = self.restrictions {
            write!(f, " {}", restrictions)?;
        }
        Ok(())
    }
}

/// One RID inside a simulcast stream list; `~` marks it paused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulcastStream {
    pub rid: String,
    pub paused: bool,
}

/// The streams offered in one direction. Each entry is a list of alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulcastSet {
    pub direction: RidDirection,
    pub streams: Vec<Vec<SimulcastStream>>,
}

/// `a=simulcast:send 1;2;3 recv 4`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulcastLine {
    pub sets: Vec<SimulcastSet>,
}

impl SimulcastLine {
    pub fn parse(value: &str) -> Option<Self> {
        let tokens: Vec<&str> = value.strip_prefix("simulcast:")?.split_whitespace().collect();
        if tokens.is_empty() || tokens.len() % 2 != 0 {
            return None;
        }

        let mut sets = Vec::new();
        for pair in tokens.chunks(2) {
            let direction = RidDirection::from_string(pair[0])?;
            let mut streams = Vec::new();
            for stream in pair[1].split(';') {
                let mut alternatives = Vec::new();
                for alternative in stream.split(',') {
                    let (rid, paused) = match alternative.strip_prefix('~') {
                        Some(rid) => (rid, true),
                        None => (alternative, false),
                    };
                    if rid.is_empty() {
                        return None;
                    }
                    alternatives.push(SimulcastStream {
                        rid: rid.to_string(),
                        paused,
                    });
                }
                streams.push(alternatives);
            }
            sets.push(SimulcastSet { direction, streams });
        }

        Some(Self { sets })
    }
}

impl fmt::Display for SimulcastLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sets: Vec<String> = self
            .sets
            .iter()
            .map(|set| {
                let streams: Vec<String> = set
                    .streams
                    .iter()
                    .map(|alternatives| {
                        alternatives
                            .iter()
                            .map(|s| {
                                if s.paused {
                                    format!("~{}", s.rid)
                                } else {
                                    s.rid.clone()
                                }
                            })
                            .collect::<Vec<_>>()
                            .join(",")
                    })
                    .collect();
                format!("{} {}", set.direction.as_str(), streams.join(";"))
            })
            .collect();
        write!(f, "a=simulcast:{}", sets.join(" "))
    }
}

/// `a=rtcp-mux`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcpMuxLine;

impl RtcpMuxLine {
    pub fn parse(value: &str) -> Option<Self> {
        (value == "rtcp-mux").then_some(RtcpMuxLine)
    }
}

impl fmt::Display for RtcpMuxLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=rtcp-mux")
    }
}

/// `a=sctp-port:<port>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SctpPortLine {
    pub port: u16,
}

impl SctpPortLine {
    pub fn parse(value: &str) -> Option<Self> {
        Some(Self {
            port: value.strip_prefix("sctp-port:")?.parse().ok()?,
        })
    }
}

impl fmt::Display for SctpPortLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=sctp-port:{}", self.port)
    }
}

/// `a=max-message-size:<bytes>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxMessageSizeLine {
    pub size: u64,
}

impl MaxMessageSizeLine {
    pub fn parse(value: &str) -> Option<Self> {
        Some(Self {
            size: value.strip_prefix("max-message-size:")?.parse().ok()?,
        })
    }
}

impl fmt::Display for MaxMessageSizeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=max-message-size:{}", self.size)
    }
}
