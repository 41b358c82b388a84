//! SDP sanity checks applied before a description is handed on

use crate::domain::sdp::{Document, MediaType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Accept audio/video blocks whose port is 0
    pub allow_port_0: bool,
    /// Require at least one H264 entry in every video block
    pub require_h264: bool,
}

/// Why an SDP was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSdpReason {
    #[error("SDP is empty")]
    Empty,

    #[error("SDP could not be parsed: {0}")]
    Unparsable(String),

    #[error("iceCandidate missing from SDP for mline {0}")]
    MissingCandidates(usize),

    #[error("Found invalid port number 0 for mline {0}")]
    ZeroPort(usize),

    #[error("ice ufrag and password not found for mline {0}")]
    MissingIceCredentials(usize),

    #[error("H264 codec is missing from SDP for mline {0}")]
    MissingH264(usize),
}

/// Check `sdp` and return the first problem found, or `None` when it is usable.
///
/// Only audio and video blocks are inspected; the index in the reason is
/// the block's position among all media blocks.
pub fn is_invalid(options: &ValidationOptions, sdp: &str) -> Option<InvalidSdpReason> {
    if sdp.is_empty() {
        return Some(InvalidSdpReason::Empty);
    }

    let doc = match Document::parse(sdp) {
        Ok(doc) => doc,
        Err(e) => return Some(InvalidSdpReason::Unparsable(e.to_string())),
    };

    for (index, media) in doc.media.iter().enumerate() {
        if !media.media_type.is_rtp() {
            continue;
        }
        if media.ice.candidates.is_empty() {
            return Some(InvalidSdpReason::MissingCandidates(index));
        }
        if media.port == 0 && !options.allow_port_0 {
            return Some(InvalidSdpReason::ZeroPort(index));
        }
        if media.ice.ufrag.is_none() || media.ice.pwd.is_none() {
            return Some(InvalidSdpReason::MissingIceCredentials(index));
        }
        if options.require_h264 && media.media_type == MediaType::Video {
            let has_h264 = media.rtp().map(|rtp| rtp.has_codec("H264")).unwrap_or(false);
            if !has_h264 {
                return Some(InvalidSdpReason::MissingH264(index));
            }
        }
    }

    None
}
