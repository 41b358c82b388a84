//! RTP codec attribute lines (rtpmap, fmtp, rtcp-fb)

use std::fmt;

/// `a=rtpmap:<payload type> <encoding name>/<clock rate>[/<encoding parameters>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpMapLine {
    pub payload_type: u8,
    pub encoding_name: String,
    pub clock_rate: u32,
    pub encoding_params: Option<u32>,
}

impl RtpMapLine {
    pub fn parse(value: &str) -> Option<Self> {
        let (pt, encoding) = value.strip_prefix("rtpmap:")?.split_once(' ')?;
        let mut parts = encoding.split('/');

        let encoding_name = parts.next().filter(|n| !n.is_empty())?;
        let clock_rate = parts.next()?.parse().ok()?;
        let encoding_params = match parts.next() {
            Some(params) => Some(params.parse().ok()?),
            None => None,
        };
        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            payload_type: pt.parse().ok()?,
            encoding_name: encoding_name.to_string(),
            clock_rate,
            encoding_params,
        })
    }
}

impl fmt::Display for RtpMapLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a=rtpmap:{} {}/{}",
            self.payload_type, self.encoding_name, self.clock_rate
        )?;
        if let Some(params) = self.encoding_params {
            write!(f, "/{}", params)?;
        }
        Ok(())
    }
}

/// Ordered `key[=value]` parameters of an fmtp line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatParameters(Vec<(String, Option<String>)>);

impl FormatParameters {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn parse(value: &str) -> Self {
        let params = value
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| match p.split_once('=') {
                Some((key, value)) => (key.to_string(), Some(value.to_string())),
                None => (p.to_string(), None),
            })
            .collect();
        Self(params)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Replaces the value of `key` in place, or appends it
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = Some(value.into());
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    /// Appends every parameter of `other`, overwriting duplicate keys
    pub fn merge(&mut self, other: FormatParameters) {
        for (key, value) in other.0 {
            match self.0.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => self.0.push((key, value)),
            }
        }
    }

    /// The first parameter, which for valueless formats (RED, DTMF) is the whole payload
    pub fn first(&self) -> Option<(&str, Option<&str>)> {
        self.0.first().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

impl fmt::Display for FormatParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .0
            .iter()
            .map(|(key, value)| match value {
                Some(value) => format!("{}={}", key, value),
                None => key.clone(),
            })
            .collect();
        write!(f, "{}", params.join(";"))
    }
}

/// `a=fmtp:<payload type> <format specific parameters>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FmtpLine {
    pub payload_type: u8,
    pub params: FormatParameters,
}

impl FmtpLine {
    pub fn parse(value: &str) -> Option<Self> {
        let (pt, params) = value.strip_prefix("fmtp:")?.split_once(' ')?;
        let params = FormatParameters::parse(params);
        if params.is_empty() {
            return None;
        }

        Some(Self {
            payload_type: pt.parse().ok()?,
            params,
        })
    }
}

impl fmt::Display for FmtpLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=fmtp:{} {}", self.payload_type, self.params)
    }
}

/// `a=rtcp-fb:<payload type> <feedback> [<parameter>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcpFbLine {
    pub payload_type: u8,
    pub feedback: String,
}

impl RtcpFbLine {
    pub fn parse(value: &str) -> Option<Self> {
        let (pt, feedback) = value.strip_prefix("rtcp-fb:")?.split_once(' ')?;
        if feedback.trim().is_empty() {
            return None;
        }

        Some(Self {
            payload_type: pt.parse().ok()?,
            feedback: feedback.trim().to_string(),
        })
    }
}

impl fmt::Display for RtcpFbLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a=rtcp-fb:{} {}", self.payload_type, self.feedback)
    }
}
