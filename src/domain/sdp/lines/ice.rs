//! ICE and DTLS attribute lines

use std::fmt;

/// `a=ice-ufrag:<ufrag>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceUfragLine {
    pub ufrag: String,
}

impl IceUfragLine {
    pub fn parse(value: &str) -> Option<Self> {
        let ufrag = value.strip_prefix("ice-ufrag:")?;
        if ufrag.is_empty() {
            return None;
        }
        Some(Self {
            ufrag: ufrag.to_string(),
        })
    }
}

impl fmt::Display for IceUfragLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=ice-ufrag:{}", self.ufrag)
    }
}

/// `a=ice-pwd:<password>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcePwdLine {
    pub pwd: String,
}

impl IcePwdLine {
    pub fn parse(value: &str) -> Option<Self> {
        let pwd = value.strip_prefix("ice-pwd:")?;
        if pwd.is_empty() {
            return None;
        }
        Some(Self {
            pwd: pwd.to_string(),
        })
    }
}

impl fmt::Display for IcePwdLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=ice-pwd:{}", self.pwd)
    }
}

/// `a=ice-options:<tag> <tag> ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceOptionsLine {
    pub options: Vec<String>,
}

impl IceOptionsLine {
    pub fn parse(value: &str) -> Option<Self> {
        let options: Vec<String> = value
            .strip_prefix("ice-options:")?
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if options.is_empty() {
            return None;
        }
        Some(Self { options })
    }
}

impl fmt::Display for IceOptionsLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=ice-options:{}", self.options.join(" "))
    }
}

/// `a=candidate:<foundation> <component> <transport> <priority> <address> <port> typ <type> ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLine {
    pub foundation: String,
    /// Component ID (1 = RTP, 2 = RTCP)
    pub component: u16,
    pub transport: String,
    pub priority: u32,
    pub address: String,
    pub port: u16,
    pub candidate_type: String,
    pub related_address: Option<String>,
    pub related_port: Option<u16>,
    /// Trailing `name value` pairs such as `generation 0`
    pub extensions: Vec<(String, String)>,
}

impl CandidateLine {
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.strip_prefix("candidate:")?;
        let parts: Vec<&str> = rest.split_whitespace().collect();

        if parts.len() < 8 || parts[6] != "typ" {
            return None;
        }

        let mut candidate = Self {
            foundation: parts[0].to_string(),
            component: parts[1].parse().ok()?,
            transport: parts[2].to_string(),
            priority: parts[3].parse().ok()?,
            address: parts[4].to_string(),
            port: parts[5].parse().ok()?,
            candidate_type: parts[7].to_string(),
            related_address: None,
            related_port: None,
            extensions: Vec::new(),
        };

        let trailing = &parts[8..];
        if trailing.len() % 2 != 0 {
            return None;
        }

        for pair in trailing.chunks(2) {
            match pair[0] {
                "raddr" => candidate.related_address = Some(pair[1].to_string()),
                "rport" => candidate.related_port = Some(pair[1].parse().ok()?),
                name => candidate
                    .extensions
                    .push((name.to_string(), pair[1].to_string())),
            }
        }

        Some(candidate)
    }
}

impl fmt::Display for CandidateLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a=candidate:{} {} {} {} {} {} typ {}",
            self.foundation,
            self.component,
            self.transport,
            self.priority,
            self.address,
            self.port,
            self.candidate_type
        )?;
        if let Some(ref raddr) = self.related_address {
            write!(f, " raddr {}", raddr)?;
        }
        if let Some(rport) = self.related_port {
            write!(f, " rport {}", rport)?;
        }
        for (name, value) in &self.extensions {
            write!(f, " {} {}", name, value)?;
        }
        Ok(())
    }
}

/// `a=fingerprint:<hash-function> <fingerprint>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintLine {
    pub algorithm: String,
    pub value: String,
}

impl FingerprintLine {
    pub fn parse(value: &str) -> Option<Self> {
        let (algorithm, fingerprint) = value.strip_prefix("fingerprint:")?.split_once(' ')?;
        if algorithm.is_empty() || fingerprint.is_empty() || fingerprint.contains(' ') {
            return None;
        }
        Some(Self {
            algorithm: algorithm.to_string(),
            value: fingerprint.to_string(),
        })
    }
}

impl fmt::Display for FingerprintLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=fingerprint:{} {}", self.algorithm, self.value)
    }
}

/// DTLS setup role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupRole {
    Active,
    Passive,
    Actpass,
    Holdconn,
}

impl SetupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetupRole::Active => "active",
            SetupRole::Passive => "passive",
            SetupRole::Actpass => "actpass",
            SetupRole::Holdconn => "holdconn",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SetupRole::Active),
            "passive" => Some(SetupRole::Passive),
            "actpass" => Some(SetupRole::Actpass),
            "holdconn" => Some(SetupRole::Holdconn),
            _ => None,
        }
    }
}

/// `a=setup:<role>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupLine {
    pub role: SetupRole,
}

impl SetupLine {
    pub fn parse(value: &str) -> Option<Self> {
        let role = SetupRole::from_string(value.strip_prefix("setup:")?)?;
        Some(Self { role })
    }
}

impl fmt::Display for SetupLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=setup:{}", self.role.as_str())
    }
}
