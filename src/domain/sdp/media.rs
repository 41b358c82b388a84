//! Media-level part of a session description
//!
//! A media block starts at its `m=` line and accumulates every following
//! line until the next `m=` line. RTP blocks (audio/video) keep codecs keyed
//! by payload type; application blocks keep their SCTP parameters.

use super::lines::*;
use crate::domain::shared::error::SdpError;
use std::collections::{HashMap, HashSet};

/// Media type of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Audio,
    Video,
    Application,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
            MediaType::Application => "application",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "audio" => Some(MediaType::Audio),
            "video" => Some(MediaType::Video),
            "application" => Some(MediaType::Application),
            _ => None,
        }
    }

    pub fn is_rtp(&self) -> bool {
        matches!(self, MediaType::Audio | MediaType::Video)
    }
}

/// ICE parameters of one media block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IceInfo {
    pub ufrag: Option<String>,
    pub pwd: Option<String>,
    pub options: Vec<String>,
    /// Insertion order is kept; duplicates are not filtered
    pub candidates: Vec<CandidateLine>,
}

/// Everything known about one payload type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecInfo {
    pub payload_type: u8,
    pub name: Option<String>,
    pub clock_rate: Option<u32>,
    pub encoding_params: Option<u32>,
    pub fmtp: FormatParameters,
    pub feedback: Vec<String>,
}

impl CodecInfo {
    pub fn new(payload_type: u8) -> Self {
        Self {
            payload_type,
            name: None,
            clock_rate: None,
            encoding_params: None,
            fmtp: FormatParameters::new(),
            feedback: Vec::new(),
        }
    }

    /// Case-insensitive match on the encoding name
    pub fn is_named(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .map(|n| n.eq_ignore_ascii_case(name))
            .unwrap_or(false)
    }

    /// Payload type of the codec this one protects or retransmits.
    ///
    /// RTX refers to it through `apt=<pt>`; RED lists it as `<pt>/<pt>`.
    pub fn primary_payload_type(&self) -> Option<u8> {
        if let Some(apt) = self.fmtp.get("apt") {
            return apt.parse().ok();
        }
        if self.is_named("red") {
            let (first, _) = self.fmtp.first()?;
            return first.split('/').next()?.parse().ok();
        }
        None
    }

    fn to_lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();

        if let (Some(name), Some(clock_rate)) = (&self.name, self.clock_rate) {
            lines.push(Line::RtpMap(RtpMapLine {
                payload_type: self.payload_type,
                encoding_name: name.clone(),
                clock_rate,
                encoding_params: self.encoding_params,
            }));
        }
        for feedback in &self.feedback {
            lines.push(Line::RtcpFb(RtcpFbLine {
                payload_type: self.payload_type,
                feedback: feedback.clone(),
            }));
        }
        if !self.fmtp.is_empty() {
            lines.push(Line::Fmtp(FmtpLine {
                payload_type: self.payload_type,
                params: self.fmtp.clone(),
            }));
        }

        lines
    }
}

/// Codec table of an audio or video block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtpMedia {
    /// Payload types in `m=` line order
    pub payload_types: Vec<u8>,
    pub codecs: HashMap<u8, CodecInfo>,
}

impl RtpMedia {
    /// Repeated payload types keep their first position only
    pub fn new(mut payload_types: Vec<u8>) -> Self {
        let mut seen = HashSet::new();
        payload_types.retain(|pt| seen.insert(*pt));

        let codecs = payload_types
            .iter()
            .map(|pt| (*pt, CodecInfo::new(*pt)))
            .collect();
        Self {
            payload_types,
            codecs,
        }
    }

    /// Codecs in payload type list order
    pub fn codecs(&self) -> impl Iterator<Item = &CodecInfo> {
        self.payload_types
            .iter()
            .filter_map(move |pt| self.codecs.get(pt))
    }

    pub fn codec(&self, payload_type: u8) -> Option<&CodecInfo> {
        self.codecs.get(&payload_type)
    }

    pub fn codecs_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CodecInfo> {
        self.codecs().filter(move |c| c.is_named(name))
    }

    pub fn codecs_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut CodecInfo> {
        self.codecs.values_mut().filter(move |c| c.is_named(name))
    }

    pub fn has_codec(&self, name: &str) -> bool {
        self.codecs_named(name).next().is_some()
    }

    /// Remove a payload type together with every codec that refers back to it.
    ///
    /// Returns the removed payload types in removal order.
    pub fn remove_payload_type(&mut self, payload_type: u8) -> Vec<u8> {
        let mut removed = Vec::new();
        let mut queue = vec![payload_type];

        while let Some(pt) = queue.pop() {
            if removed.contains(&pt) {
                continue;
            }
            let was_listed = self.payload_types.contains(&pt);
            self.payload_types.retain(|p| *p != pt);
            if self.codecs.remove(&pt).is_none() && !was_listed {
                continue;
            }
            removed.push(pt);

            queue.extend(
                self.codecs
                    .values()
                    .filter(|c| c.primary_payload_type() == Some(pt))
                    .map(|c| c.payload_type),
            );
        }

        removed
    }

    fn to_lines(&self) -> Vec<Line> {
        self.codecs().flat_map(CodecInfo::to_lines).collect()
    }
}

/// Parameters of a data channel block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationMedia {
    pub formats: Vec<String>,
    pub sctp_port: Option<u16>,
    pub max_message_size: Option<u64>,
}

/// Type-specific content of a media block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Rtp(RtpMedia),
    Application(ApplicationMedia),
}

/// One `m=` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescription {
    pub media_type: MediaType,
    pub port: u16,
    pub port_count: Option<u16>,
    pub protocol: String,
    pub connection: Option<ConnectionLine>,
    pub bandwidth: Option<BandwidthLine>,
    pub ice: IceInfo,
    pub fingerprint: Option<FingerprintLine>,
    pub setup: Option<SetupRole>,
    pub mid: Option<String>,
    pub rtcp_mux: bool,
    pub content: Option<String>,
    pub extmaps: Vec<ExtMapLine>,
    pub rids: Vec<RidLine>,
    pub simulcast: Option<SimulcastLine>,
    pub direction: Option<MediaDirection>,
    pub kind: MediaKind,
    /// Lines without a dedicated field, in arrival order
    pub other_lines: Vec<Line>,
}

impl MediaDescription {
    /// Open a block from its `m=` line
    pub fn new(line: MediaLine) -> Result<Self, SdpError> {
        let media_type = MediaType::from_string(&line.media_type)
            .ok_or_else(|| SdpError::UnsupportedMediaType(line.media_type.clone()))?;

        let kind = if media_type.is_rtp() {
            let payload_types = line
                .formats
                .iter()
                .map(|f| {
                    f.parse::<u8>()
                        .map_err(|_| SdpError::InvalidPayloadType(f.clone()))
                })
                .collect::<Result<Vec<u8>, SdpError>>()?;
            MediaKind::Rtp(RtpMedia::new(payload_types))
        } else {
            MediaKind::Application(ApplicationMedia {
                formats: line.formats,
                ..Default::default()
            })
        };

        Ok(Self {
            media_type,
            port: line.port,
            port_count: line.port_count,
            protocol: line.protocol,
            connection: None,
            bandwidth: None,
            ice: IceInfo::default(),
            fingerprint: None,
            setup: None,
            mid: None,
            rtcp_mux: false,
            content: None,
            extmaps: Vec::new(),
            rids: Vec::new(),
            simulcast: None,
            direction: None,
            kind,
            other_lines: Vec::new(),
        })
    }

    pub fn rtp(&self) -> Option<&RtpMedia> {
        match &self.kind {
            MediaKind::Rtp(rtp) => Some(rtp),
            MediaKind::Application(_) => None,
        }
    }

    pub fn rtp_mut(&mut self) -> Option<&mut RtpMedia> {
        match &mut self.kind {
            MediaKind::Rtp(rtp) => Some(rtp),
            MediaKind::Application(_) => None,
        }
    }

    pub fn application(&self) -> Option<&ApplicationMedia> {
        match &self.kind {
            MediaKind::Application(app) => Some(app),
            MediaKind::Rtp(_) => None,
        }
    }

    /// Fold one line into this block
    pub fn add_line(&mut self, line: Line) -> Result<(), SdpError> {
        match line {
            Line::Media(_) => return Err(SdpError::UnexpectedMediaLine),
            Line::Connection(l) if self.connection.is_none() => self.connection = Some(l),
            Line::Bandwidth(l) if self.bandwidth.is_none() => self.bandwidth = Some(l),
            Line::IceUfrag(l) if self.ice.ufrag.is_none() => self.ice.ufrag = Some(l.ufrag),
            Line::IcePwd(l) if self.ice.pwd.is_none() => self.ice.pwd = Some(l.pwd),
            Line::IceOptions(l) if self.ice.options.is_empty() => self.ice.options = l.options,
            Line::Candidate(l) => self.ice.candidates.push(l),
            Line::Fingerprint(l) if self.fingerprint.is_none() => self.fingerprint = Some(l),
            Line::Setup(l) if self.setup.is_none() => self.setup = Some(l.role),
            Line::Mid(l) if self.mid.is_none() => self.mid = Some(l.mid),
            Line::RtcpMux(_) if !self.rtcp_mux => self.rtcp_mux = true,
            Line::Content(l) if self.content.is_none() => self.content = Some(l.content),
            Line::ExtMap(l) => self.extmaps.push(l),
            Line::Rid(l) => self.rids.push(l),
            Line::Simulcast(l) if self.simulcast.is_none() => self.simulcast = Some(l),
            Line::Direction(l) if self.direction.is_none() => self.direction = Some(l.direction),
            Line::RtpMap(l) => self.add_rtpmap(l),
            Line::Fmtp(l) => self.add_fmtp(l),
            Line::RtcpFb(l) => self.add_rtcp_fb(l),
            Line::SctpPort(l) => self.add_sctp_port(l),
            Line::MaxMessageSize(l) => self.add_max_message_size(l),
            other => self.other_lines.push(other),
        }
        Ok(())
    }

    fn add_rtpmap(&mut self, line: RtpMapLine) {
        let codec = match &mut self.kind {
            MediaKind::Rtp(rtp) => rtp.codecs.get_mut(&line.payload_type),
            MediaKind::Application(_) => None,
        };
        match codec {
            Some(codec) if codec.name.is_none() => {
                codec.name = Some(line.encoding_name);
                codec.clock_rate = Some(line.clock_rate);
                codec.encoding_params = line.encoding_params;
            }
            _ => self.other_lines.push(Line::RtpMap(line)),
        }
    }

    fn add_fmtp(&mut self, line: FmtpLine) {
        let codec = match &mut self.kind {
            MediaKind::Rtp(rtp) => rtp.codecs.get_mut(&line.payload_type),
            MediaKind::Application(_) => None,
        };
        match codec {
            Some(codec) if codec.fmtp.is_empty() => codec.fmtp = line.params,
            _ => self.other_lines.push(Line::Fmtp(line)),
        }
    }

    fn add_rtcp_fb(&mut self, line: RtcpFbLine) {
        let codec = match &mut self.kind {
            MediaKind::Rtp(rtp) => rtp.codecs.get_mut(&line.payload_type),
            MediaKind::Application(_) => None,
        };
        match codec {
            Some(codec) => codec.feedback.push(line.feedback),
            None => self.other_lines.push(Line::RtcpFb(line)),
        }
    }

    fn add_sctp_port(&mut self, line: SctpPortLine) {
        match &mut self.kind {
            MediaKind::Application(app) if app.sctp_port.is_none() => {
                app.sctp_port = Some(line.port)
            }
            _ => self.other_lines.push(Line::SctpPort(line)),
        }
    }

    fn add_max_message_size(&mut self, line: MaxMessageSizeLine) {
        match &mut self.kind {
            MediaKind::Application(app) if app.max_message_size.is_none() => {
                app.max_message_size = Some(line.size)
            }
            _ => self.other_lines.push(Line::MaxMessageSize(line)),
        }
    }

    /// The `m=` line as it currently stands
    pub fn media_line(&self) -> MediaLine {
        let formats = match &self.kind {
            MediaKind::Rtp(rtp) => rtp.payload_types.iter().map(|pt| pt.to_string()).collect(),
            MediaKind::Application(app) => app.formats.clone(),
        };
        MediaLine {
            media_type: self.media_type.as_str().to_string(),
            port: self.port,
            port_count: self.port_count,
            protocol: self.protocol.clone(),
            formats,
        }
    }

    /// Lines in canonical output order
    pub fn to_lines(&self) -> Vec<Line> {
        let mut lines = vec![Line::Media(self.media_line())];

        if let Some(ref l) = self.connection {
            lines.push(Line::Connection(l.clone()));
        }
        if let Some(ref l) = self.bandwidth {
            lines.push(Line::Bandwidth(l.clone()));
        }
        if let Some(ref ufrag) = self.ice.ufrag {
            lines.push(Line::IceUfrag(IceUfragLine {
                ufrag: ufrag.clone(),
            }));
        }
        if let Some(ref pwd) = self.ice.pwd {
            lines.push(Line::IcePwd(IcePwdLine { pwd: pwd.clone() }));
        }
        if !self.ice.options.is_empty() {
            lines.push(Line::IceOptions(IceOptionsLine {
                options: self.ice.options.clone(),
            }));
        }
        lines.extend(self.ice.candidates.iter().cloned().map(Line::Candidate));
        if let Some(ref l) = self.fingerprint {
            lines.push(Line::Fingerprint(l.clone()));
        }
        if let Some(role) = self.setup {
            lines.push(Line::Setup(SetupLine { role }));
        }
        if let Some(ref mid) = self.mid {
            lines.push(Line::Mid(MidLine { mid: mid.clone() }));
        }
        if self.rtcp_mux {
            lines.push(Line::RtcpMux(RtcpMuxLine));
        }
        if let Some(ref content) = self.content {
            lines.push(Line::Content(ContentLine {
                content: content.clone(),
            }));
        }
        lines.extend(self.extmaps.iter().cloned().map(Line::ExtMap));
        lines.extend(self.rids.iter().cloned().map(Line::Rid));
        if let Some(ref l) = self.simulcast {
            lines.push(Line::Simulcast(l.clone()));
        }
        if let Some(direction) = self.direction {
            lines.push(Line::Direction(DirectionLine { direction }));
        }

        match &self.kind {
            MediaKind::Rtp(rtp) => lines.extend(rtp.to_lines()),
            MediaKind::Application(app) => {
                if let Some(port) = app.sctp_port {
                    lines.push(Line::SctpPort(SctpPortLine { port }));
                }
                if let Some(size) = app.max_message_size {
                    lines.push(Line::MaxMessageSize(MaxMessageSizeLine { size }));
                }
            }
        }

        lines.extend(self.other_lines.iter().cloned());
        lines
    }
}
