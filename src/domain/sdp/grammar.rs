//! Line grammar
//!
//! Maps a one-character line tag to an ordered list of candidate parsers.
//! Parsers are tried in registration order and the first match wins.

use super::lines::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Parses the text after `<tag>=` into a typed line
pub type LineParser = fn(&str) -> Option<Line>;

/// Grammar shared by every parse that does not bring its own
pub static DEFAULT_GRAMMAR: Lazy<Grammar> = Lazy::new(Grammar::webrtc);

/// Registry of line parsers keyed by line tag
#[derive(Clone, Default)]
pub struct Grammar {
    parsers: HashMap<char, Vec<LineParser>>,
}

impl Grammar {
    /// Empty grammar; every line falls through to [`UnknownLine`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grammar for the line types produced by WebRTC endpoints
    pub fn webrtc() -> Self {
        let mut grammar = Self::new();

        grammar.register('v', |v| VersionLine::parse(v).map(Line::Version));
        grammar.register('o', |v| OriginLine::parse(v).map(Line::Origin));
        grammar.register('s', |v| SessionNameLine::parse(v).map(Line::SessionName));
        grammar.register('i', |v| {
            SessionInformationLine::parse(v).map(Line::SessionInformation)
        });
        grammar.register('c', |v| ConnectionLine::parse(v).map(Line::Connection));
        grammar.register('b', |v| BandwidthLine::parse(v).map(Line::Bandwidth));
        grammar.register('t', |v| TimingLine::parse(v).map(Line::Timing));
        grammar.register('m', |v| MediaLine::parse(v).map(Line::Media));

        grammar.register('a', |v| IceUfragLine::parse(v).map(Line::IceUfrag));
        grammar.register('a', |v| IcePwdLine::parse(v).map(Line::IcePwd));
        grammar.register('a', |v| IceOptionsLine::parse(v).map(Line::IceOptions));
        grammar.register('a', |v| CandidateLine::parse(v).map(Line::Candidate));
        grammar.register('a', |v| FingerprintLine::parse(v).map(Line::Fingerprint));
        grammar.register('a', |v| SetupLine::parse(v).map(Line::Setup));
        grammar.register('a', |v| MidLine::parse(v).map(Line::Mid));
        grammar.register('a', |v| DirectionLine::parse(v).map(Line::Direction));
        grammar.register('a', |v| ExtMapLine::parse(v).map(Line::ExtMap));
        grammar.register('a', |v| RtpMapLine::parse(v).map(Line::RtpMap));
        grammar.register('a', |v| FmtpLine::parse(v).map(Line::Fmtp));
        grammar.register('a', |v| RtcpFbLine::parse(v).map(Line::RtcpFb));
        grammar.register('a', |v| RtcpMuxLine::parse(v).map(Line::RtcpMux));
        grammar.register('a', |v| SctpPortLine::parse(v).map(Line::SctpPort));
        grammar.register('a', |v| {
            MaxMessageSizeLine::parse(v).map(Line::MaxMessageSize)
        });
        grammar.register('a', |v| SimulcastLine::parse(v).map(Line::Simulcast));
        grammar.register('a', |v| RidLine::parse(v).map(Line::Rid));
        grammar.register('a', |v| BundleGroupLine::parse(v).map(Line::BundleGroup));
        grammar.register('a', |v| ContentLine::parse(v).map(Line::Content));

        grammar
    }

    /// Append a parser for `tag`; it is tried after those already registered
    pub fn register(&mut self, tag: char, parser: LineParser) {
        self.parsers.entry(tag).or_default().push(parser);
    }

    /// Run the parsers registered for `tag` against `value`
    pub fn parse_line(&self, tag: char, value: &str) -> Option<Line> {
        self.parsers
            .get(&tag)?
            .iter()
            .find_map(|parser| parser(value))
    }

    /// Parse a whole raw line, keeping it verbatim when no parser matches.
    ///
    /// Returns `None` for lines shorter than three characters.
    pub fn parse_raw_line(&self, raw: &str) -> Option<Line> {
        if raw.len() < 3 {
            return None;
        }

        let mut chars = raw.chars();
        let tag = chars.next()?;
        if chars.next() != Some('=') {
            return Some(Line::Unknown(UnknownLine::new(raw)));
        }

        let value = &raw[tag.len_utf8() + 1..];
        Some(
            self.parse_line(tag, value)
                .unwrap_or_else(|| Line::Unknown(UnknownLine::new(raw))),
        )
    }
}
