//! Individual SDP rewrite passes
//!
//! Each pass edits the document in place and is independent of the others.

use crate::domain::sdp::lines::{BandwidthLine, BandwidthType, ConnectionLine, Line, UnknownLine};
use crate::domain::sdp::{Document, MediaType};
use serde::{Deserialize, Serialize};

const PERIODIC_KEYFRAMES: &str = "periodic-keyframes";
const SLIDES: &str = "slides";
const H264: &str = "H264";
const RTX: &str = "rtx";

/// Per media type bandwidth caps in bits per second
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandwidthLimits {
    pub audio: Option<u32>,
    pub video: Option<u32>,
}

impl BandwidthLimits {
    pub fn for_media(&self, media_type: MediaType) -> Option<u32> {
        match media_type {
            MediaType::Audio => self.audio,
            MediaType::Video => self.video,
            MediaType::Application => None,
        }
    }
}

/// Rewrite every IPv6 connection line to `IN IP4 0.0.0.0`
pub fn convert_c_line_to_ipv4(doc: &mut Document) {
    let session = doc.session.connection.iter_mut();
    let media = doc.media.iter_mut().filter_map(|m| m.connection.as_mut());

    for connection in session.chain(media) {
        if connection.is_ipv6() {
            *connection = ConnectionLine::ipv4_any();
        }
    }
}

/// Add a `b=TIAS` line to every block whose media type has a limit
pub fn set_bandwidth_limits(doc: &mut Document, limits: &BandwidthLimits) {
    for media in doc.media.iter_mut() {
        if let Some(limit) = limits.for_media(media.media_type) {
            media.bandwidth = Some(BandwidthLine::new(BandwidthType::Tias, limit));
        }
    }
}

/// Ask video encoders for a keyframe every `interval` seconds
pub fn set_periodic_keyframes(doc: &mut Document, interval: u32) {
    for media in doc.media_of_type_mut(MediaType::Video) {
        media.other_lines.retain(|line| {
            !matches!(line, Line::Unknown(u) if u.attribute_name() == Some(PERIODIC_KEYFRAMES))
        });
        media.other_lines.push(Line::Unknown(UnknownLine::new(format!(
            "a={}:{}",
            PERIODIC_KEYFRAMES, interval
        ))));
    }
}

/// Mark discard-port blocks as rejected
pub fn convert_port_9_to_0(doc: &mut Document) {
    for media in doc.media.iter_mut().filter(|m| m.port == 9) {
        media.port = 0;
    }
}

/// Tag the second of exactly two video blocks as slides.
///
/// Returns whether the document was changed.
pub fn add_content_slides(doc: &mut Document) -> bool {
    if doc.media_of_type(MediaType::Video).count() != 2 {
        return false;
    }
    match doc.media_of_type_mut(MediaType::Video).nth(1) {
        Some(slides) => {
            slides.content = Some(SLIDES.to_string());
            true
        }
        None => false,
    }
}

/// Drop every RTP header extension mapping
pub fn disable_extmap(doc: &mut Document) {
    for media in doc.media.iter_mut() {
        media.extmaps.clear();
    }
}

/// Set `max-fs` on every H264 entry of every video block
pub fn set_h264_max_fs(doc: &mut Document, max_fs: u32) {
    set_h264_param(doc, "max-fs", max_fs);
}

/// Set the encoder start bitrate hint on every H264 entry of every video block
pub fn set_start_bitrate(doc: &mut Document, bitrate: u32) {
    set_h264_param(doc, "x-google-start-bitrate", bitrate);
}

fn set_h264_param(doc: &mut Document, key: &str, value: u32) {
    for media in doc.media_of_type_mut(MediaType::Video) {
        if let Some(rtp) = media.rtp_mut() {
            for codec in rtp.codecs_named_mut(H264) {
                codec.fmtp.set(key, value.to_string());
            }
        }
    }
}

/// Remove retransmission codecs that point at a primary codec.
///
/// Returns the removed payload types.
pub fn disable_rtx(doc: &mut Document) -> Vec<u8> {
    let mut removed = Vec::new();

    for media in doc.media.iter_mut() {
        let Some(rtp) = media.rtp_mut() else {
            continue;
        };
        let rtx: Vec<u8> = rtp
            .codecs_named(RTX)
            .filter(|c| c.primary_payload_type().is_some())
            .map(|c| c.payload_type)
            .collect();
        for pt in rtx {
            removed.extend(rtp.remove_payload_type(pt));
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_video_doc() -> Document {
        Document::parse(
            "v=0\r\n\
o=- 1 1 IN IP6 ::1\r\n\
s=-\r\n\
c=IN IP6 ::1\r\n\
t=0 0\r\n\
m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
c=IN IP6 2001:db8::1\r\n\
a=extmap:1 urn:ietf:params:rtp-hdrext:ssrc-audio-level\r\n\
a=rtpmap:111 opus/48000/2\r\n\
m=video 9 UDP/TLS/RTP/SAVPF 96 97 102 103\r\n\
c=IN IP4 10.0.0.1\r\n\
a=rtpmap:96 VP8/90000\r\n\
a=rtpmap:97 rtx/90000\r\n\
a=fmtp:97 apt=96\r\n\
a=rtpmap:102 H264/90000\r\n\
a=fmtp:102 level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42e01f\r\n\
a=rtpmap:103 rtx/90000\r\n\
a=fmtp:103 apt=102\r\n\
m=video 5000 UDP/TLS/RTP/SAVPF 96\r\n\
a=rtpmap:96 VP8/90000\r\n",
        )
        .unwrap()
    }

    #[test]
    fn test_convert_c_line_to_ipv4() {
        let mut doc = two_video_doc();
        convert_c_line_to_ipv4(&mut doc);

        assert_eq!(doc.session.connection, Some(ConnectionLine::ipv4_any()));
        assert_eq!(doc.media[0].connection, Some(ConnectionLine::ipv4_any()));
        assert_eq!(doc.media[1].connection.as_ref().unwrap().address, "10.0.0.1");
        assert!(doc.media[2].connection.is_none());
    }

    #[test]
    fn test_bandwidth_limits() {
        let mut doc = two_video_doc();
        let limits = BandwidthLimits {
            audio: Some(64000),
            video: None,
        };
        set_bandwidth_limits(&mut doc, &limits);

        assert_eq!(
            doc.media[0].bandwidth.as_ref().unwrap().to_string(),
            "b=TIAS:64000"
        );
        assert!(doc.media[1].bandwidth.is_none());
    }

    #[test]
    fn test_periodic_keyframes_replaces_previous() {
        let mut doc = two_video_doc();
        set_periodic_keyframes(&mut doc, 20);
        set_periodic_keyframes(&mut doc, 10);

        let sdp = doc.to_sdp_string();
        assert_eq!(sdp.matches("a=periodic-keyframes:10\r\n").count(), 2);
        assert!(!sdp.contains("periodic-keyframes:20"));
        assert!(doc.media[0].other_lines.is_empty());
    }

    #[test]
    fn test_port_9_to_0() {
        let mut doc = two_video_doc();
        convert_port_9_to_0(&mut doc);
        let ports: Vec<u16> = doc.media.iter().map(|m| m.port).collect();
        assert_eq!(ports, vec![0, 0, 5000]);
    }

    #[test]
    fn test_content_slides_needs_two_video_blocks() {
        let mut doc = two_video_doc();
        assert!(add_content_slides(&mut doc));
        assert!(doc.media[1].content.is_none());
        assert_eq!(doc.media[2].content.as_deref(), Some("slides"));

        doc.media.pop();
        let before = doc.clone();
        assert!(!add_content_slides(&mut doc));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_disable_extmap() {
        let mut doc = two_video_doc();
        disable_extmap(&mut doc);
        assert!(doc.media.iter().all(|m| m.extmaps.is_empty()));
    }

    #[test]
    fn test_h264_params() {
        let mut doc = two_video_doc();
        set_h264_max_fs(&mut doc, 3600);
        set_start_bitrate(&mut doc, 1000);
        set_h264_max_fs(&mut doc, 8160);

        let h264 = doc.media[1].rtp().unwrap().codec(102).unwrap();
        assert_eq!(h264.fmtp.get("max-fs"), Some("8160"));
        assert_eq!(h264.fmtp.get("x-google-start-bitrate"), Some("1000"));
        assert_eq!(h264.fmtp.len(), 5);

        let vp8 = doc.media[1].rtp().unwrap().codec(96).unwrap();
        assert!(vp8.fmtp.is_empty());
    }

    #[test]
    fn test_disable_rtx() {
        let mut doc = two_video_doc();
        let mut removed = disable_rtx(&mut doc);
        removed.sort_unstable();

        assert_eq!(removed, vec![97, 103]);
        let rtp = doc.media[1].rtp().unwrap();
        assert_eq!(rtp.payload_types, vec![96, 102]);
        assert!(!doc.to_sdp_string().contains("rtx"));
    }
}
