//! Typed SDP lines
//!
//! Every distinguishable line is parsed into its own immutable value type.
//! Each type parses from the text after `<tag>=` and its `Display`
//! implementation writes the whole line back (without the terminator).
//! Anything the grammar does not recognise is kept verbatim as an
//! [`UnknownLine`].

pub mod ice;
pub mod media;
pub mod rtp;
pub mod session;

use std::fmt;

pub use ice::{
    CandidateLine, FingerprintLine, IceOptionsLine, IcePwdLine, IceUfragLine, SetupLine,
    SetupRole,
};
pub use media::{
    ContentLine, DirectionLine, ExtMapLine, MaxMessageSizeLine, MediaDirection, MediaLine,
    MidLine, RidDirection, RidLine, RtcpMuxLine, SctpPortLine, SimulcastLine, SimulcastSet,
    SimulcastStream,
};
pub use rtp::{FmtpLine, FormatParameters, RtcpFbLine, RtpMapLine};
pub use session::{
    BandwidthLine, BandwidthType, BundleGroupLine, ConnectionLine, OriginLine,
    SessionInformationLine, SessionNameLine, TimingLine, VersionLine,
};

/// A line the grammar could not type; the original text is preserved byte-for-byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLine {
    pub raw: String,
}

impl UnknownLine {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The attribute name for `a=` lines, e.g. `msid-semantic`
    pub fn attribute_name(&self) -> Option<&str> {
        let attribute = self.raw.strip_prefix("a=")?;
        Some(attribute.split(':').next().unwrap_or(attribute))
    }
}

impl fmt::Display for UnknownLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One parsed SDP line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Version(VersionLine),
    Origin(OriginLine),
    SessionName(SessionNameLine),
    SessionInformation(SessionInformationLine),
    Connection(ConnectionLine),
    Bandwidth(BandwidthLine),
    Timing(TimingLine),
    Media(MediaLine),
    IceUfrag(IceUfragLine),
    IcePwd(IcePwdLine),
    IceOptions(IceOptionsLine),
    Candidate(CandidateLine),
    Fingerprint(FingerprintLine),
    Setup(SetupLine),
    Mid(MidLine),
    Direction(DirectionLine),
    ExtMap(ExtMapLine),
    RtpMap(RtpMapLine),
    Fmtp(FmtpLine),
    RtcpFb(RtcpFbLine),
    RtcpMux(RtcpMuxLine),
    SctpPort(SctpPortLine),
    MaxMessageSize(MaxMessageSizeLine),
    Simulcast(SimulcastLine),
    Rid(RidLine),
    BundleGroup(BundleGroupLine),
    Content(ContentLine),
    Unknown(UnknownLine),
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Version(l) => fmt::Display::fmt(l, f),
            Line::Origin(l) => fmt::Display::fmt(l, f),
            Line::SessionName(l) => fmt::Display::fmt(l, f),
            Line::SessionInformation(l) => fmt::Display::fmt(l, f),
            Line::Connection(l) => fmt::Display::fmt(l, f),
            Line::Bandwidth(l) => fmt::Display::fmt(l, f),
            Line::Timing(l) => fmt::Display::fmt(l, f),
            Line::Media(l) => fmt::Display::fmt(l, f),
            Line::IceUfrag(l) => fmt::Display::fmt(l, f),
            Line::IcePwd(l) => fmt::Display::fmt(l, f),
            Line::IceOptions(l) => fmt::Display::fmt(l, f),
            Line::Candidate(l) => fmt::Display::fmt(l, f),
            Line::Fingerprint(l) => fmt::Display::fmt(l, f),
            Line::Setup(l) => fmt::Display::fmt(l, f),
            Line::Mid(l) => fmt::Display::fmt(l, f),
            Line::Direction(l) => fmt::Display::fmt(l, f),
            Line::ExtMap(l) => fmt::Display::fmt(l, f),
            Line::RtpMap(l) => fmt::Display::fmt(l, f),
            Line::Fmtp(l) => fmt::Display::fmt(l, f),
            Line::RtcpFb(l) => fmt::Display::fmt(l, f),
            Line::RtcpMux(l) => fmt::Display::fmt(l, f),
            Line::SctpPort(l) => fmt::Display::fmt(l, f),
            Line::MaxMessageSize(l) => fmt::Display::fmt(l, f),
            Line::Simulcast(l) => fmt::Display::fmt(l, f),
            Line::Rid(l) => fmt::Display::fmt(l, f),
            Line::BundleGroup(l) => fmt::Display::fmt(l, f),
            Line::Content(l) => fmt::Display::fmt(l, f),
            Line::Unknown(l) => fmt::Display::fmt(l, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sdp::grammar::DEFAULT_GRAMMAR;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// One value per variant, covering optional fields and list edge cases
    fn every_line() -> Vec<Line> {
        vec![
            Line::Version(VersionLine { version: 0 }),
            Line::Origin(OriginLine {
                username: "-".to_string(),
                session_id: "184467440737095516150".to_string(),
                session_version: 2,
                net_type: "IN".to_string(),
                addr_type: "IP6".to_string(),
                address: "::1".to_string(),
            }),
            Line::SessionName(SessionNameLine {
                name: "weekly sync".to_string(),
            }),
            Line::SessionInformation(SessionInformationLine {
                info: "screen share".to_string(),
            }),
            Line::Connection(ConnectionLine::ipv4_any()),
            Line::Bandwidth(BandwidthLine::new(BandwidthType::Tias, 2_000_000)),
            Line::Bandwidth(BandwidthLine::new(BandwidthType::As, 64)),
            Line::Timing(TimingLine {
                start_time: 0,
                stop_time: 0,
            }),
            Line::Media(MediaLine {
                media_type: "video".to_string(),
                port: 9,
                port_count: None,
                protocol: "UDP/TLS/RTP/SAVPF".to_string(),
                formats: strings(&["96", "97"]),
            }),
            Line::Media(MediaLine {
                media_type: "audio".to_string(),
                port: 49170,
                port_count: Some(2),
                protocol: "RTP/AVP".to_string(),
                formats: strings(&["0"]),
            }),
            Line::IceUfrag(IceUfragLine {
                ufrag: "Kb1+".to_string(),
            }),
            Line::IcePwd(IcePwdLine {
                pwd: "2/1muCWoOi3uLifh0NuRHlmk".to_string(),
            }),
            Line::IceOptions(IceOptionsLine {
                options: strings(&["trickle", "renomination"]),
            }),
            Line::Candidate(CandidateLine {
                foundation: "842163049".to_string(),
                component: 1,
                transport: "udp".to_string(),
                priority: 1677729535,
                address: "203.0.113.7".to_string(),
                port: 61842,
                candidate_type: "srflx".to_string(),
                related_address: Some("192.168.1.20".to_string()),
                related_port: Some(61842),
                extensions: vec![("generation".to_string(), "0".to_string())],
            }),
            Line::Candidate(CandidateLine {
                foundation: "1".to_string(),
                component: 2,
                transport: "tcp".to_string(),
                priority: 1,
                address: "10.0.0.1".to_string(),
                port: 9,
                candidate_type: "host".to_string(),
                related_address: None,
                related_port: None,
                extensions: vec![("tcptype".to_string(), "active".to_string())],
            }),
            Line::Fingerprint(FingerprintLine {
                algorithm: "sha-256".to_string(),
                value: "7B:8B:F0:65".to_string(),
            }),
            Line::Setup(SetupLine {
                role: SetupRole::Holdconn,
            }),
            Line::Mid(MidLine {
                mid: "audio0".to_string(),
            }),
            Line::Direction(DirectionLine {
                direction: MediaDirection::Inactive,
            }),
            Line::ExtMap(ExtMapLine {
                id: 1,
                direction: None,
                uri: "urn:ietf:params:rtp-hdrext:ssrc-audio-level".to_string(),
                attributes: None,
            }),
            Line::ExtMap(ExtMapLine {
                id: 14,
                direction: Some(MediaDirection::SendOnly),
                uri: "urn:ietf:params:rtp-hdrext:encrypt".to_string(),
                attributes: Some("vad on".to_string()),
            }),
            Line::RtpMap(RtpMapLine {
                payload_type: 111,
                encoding_name: "opus".to_string(),
                clock_rate: 48000,
                encoding_params: Some(2),
            }),
            Line::RtpMap(RtpMapLine {
                payload_type: 96,
                encoding_name: "VP8".to_string(),
                clock_rate: 90000,
                encoding_params: None,
            }),
            Line::Fmtp(FmtpLine {
                payload_type: 63,
                params: FormatParameters::parse("111/111;usedtx"),
            }),
            Line::Fmtp(FmtpLine {
                payload_type: 102,
                params: FormatParameters::parse("packetization-mode=1;profile-level-id=42e01f"),
            }),
            Line::RtcpFb(RtcpFbLine {
                payload_type: 96,
                feedback: "nack pli".to_string(),
            }),
            Line::RtcpMux(RtcpMuxLine),
            Line::SctpPort(SctpPortLine { port: 5000 }),
            Line::MaxMessageSize(MaxMessageSizeLine { size: 262144 }),
            Line::Simulcast(SimulcastLine {
                sets: vec![
                    SimulcastSet {
                        direction: RidDirection::Send,
                        streams: vec![
                            vec![SimulcastStream {
                                rid: "hi".to_string(),
                                paused: false,
                            }],
                            vec![
                                SimulcastStream {
                                    rid: "lo".to_string(),
                                    paused: true,
                                },
                                SimulcastStream {
                                    rid: "mid".to_string(),
                                    paused: false,
                                },
                            ],
                        ],
                    },
                    SimulcastSet {
                        direction: RidDirection::Recv,
                        streams: vec![vec![SimulcastStream {
                            rid: "r0".to_string(),
                            paused: false,
                        }]],
                    },
                ],
            }),
            Line::Rid(RidLine {
                id: "hi".to_string(),
                direction: RidDirection::Send,
                restrictions: None,
            }),
            Line::Rid(RidLine {
                id: "lo".to_string(),
                direction: RidDirection::Recv,
                restrictions: Some("max-width=640;max-height=360".to_string()),
            }),
            Line::BundleGroup(BundleGroupLine {
                mids: strings(&["0", "1"]),
            }),
            Line::BundleGroup(BundleGroupLine { mids: Vec::new() }),
            Line::Content(ContentLine {
                content: "slides".to_string(),
            }),
            Line::Unknown(UnknownLine::new("a=msid-semantic: WMS *")),
        ]
    }

    #[test]
    fn test_every_line_round_trips() {
        for line in every_line() {
            let text = line.to_string();
            assert_eq!(
                DEFAULT_GRAMMAR.parse_raw_line(&text).as_ref(),
                Some(&line),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_unknown_line_attribute_name() {
        let line = UnknownLine::new("a=msid-semantic: WMS *");
        assert_eq!(line.attribute_name(), Some("msid-semantic"));
        assert_eq!(UnknownLine::new("x=custom").attribute_name(), None);
    }
}
