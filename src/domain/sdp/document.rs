//! Session description document and the parse/serialize pipeline

use super::grammar::{Grammar, DEFAULT_GRAMMAR};
use super::lines::Line;
use super::media::{MediaDescription, MediaType};
use super::session::SessionDescription;
use crate::domain::shared::error::SdpError;
use std::fmt;
use std::str::FromStr;

/// One session part and its ordered media blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub session: SessionDescription,
    /// Order is significant; candidates address blocks by index
    pub media: Vec<MediaDescription>,
}

impl Document {
    /// Parse SDP text with the default grammar
    pub fn parse(text: &str) -> Result<Self, SdpError> {
        Self::parse_with_grammar(text, &DEFAULT_GRAMMAR)
    }

    /// Parse SDP text, routing every line through `grammar`.
    ///
    /// `\r\n`, `\r` and `\n` are all accepted as terminators and lines
    /// shorter than three characters are dropped.
    pub fn parse_with_grammar(text: &str, grammar: &Grammar) -> Result<Self, SdpError> {
        let mut builder = DocumentBuilder::new();
        for raw in text.split(['\r', '\n']) {
            if let Some(line) = grammar.parse_raw_line(raw) {
                builder.add_line(line)?;
            }
        }
        builder.build()
    }

    /// All lines in canonical output order
    pub fn to_lines(&self) -> Vec<Line> {
        let mut lines = self.session.to_lines();
        for media in &self.media {
            lines.extend(media.to_lines());
        }
        lines
    }

    /// Serialize with CRLF after every line
    pub fn to_sdp_string(&self) -> String {
        self.to_string()
    }

    pub fn media_of_type(&self, media_type: MediaType) -> impl Iterator<Item = &MediaDescription> {
        self.media.iter().filter(move |m| m.media_type == media_type)
    }

    pub fn media_of_type_mut(
        &mut self,
        media_type: MediaType,
    ) -> impl Iterator<Item = &mut MediaDescription> {
        self.media
            .iter_mut()
            .filter(move |m| m.media_type == media_type)
    }

    /// Audio and video blocks
    pub fn rtp_media(&self) -> impl Iterator<Item = &MediaDescription> {
        self.media.iter().filter(|m| m.media_type.is_rtp())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.to_lines() {
            write!(f, "{}\r\n", line)?;
        }
        Ok(())
    }
}

impl FromStr for Document {
    type Err = SdpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Folds an ordered line sequence into a [`Document`].
///
/// Lines go to the session part until the first `m=` line; every `m=` line
/// opens a new media block that receives the lines after it.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    session: SessionDescription,
    media: Vec<MediaDescription>,
    lines_seen: usize,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, line: Line) -> Result<(), SdpError> {
        self.lines_seen += 1;

        match line {
            Line::Media(media_line) => {
                self.media.push(MediaDescription::new(media_line)?);
                return Ok(());
            }
            // an m= line always opens a block, so one we cannot read is fatal
            Line::Unknown(ref unknown) if unknown.raw.starts_with("m=") => {
                return Err(SdpError::InvalidMediaLine(unknown.raw.clone()));
            }
            _ => {}
        }

        match self.media.last_mut() {
            Some(media) => media.add_line(line),
            None => self.session.add_line(line),
        }
    }

    pub fn build(self) -> Result<Document, SdpError> {
        if self.lines_seen == 0 {
            return Err(SdpError::Empty);
        }
        Ok(Document {
            session: self.session,
            media: self.media,
        })
    }
}
