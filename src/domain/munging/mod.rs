//! SDP munging
//!
//! Local offers and answers and remote descriptions are rewritten by two
//! separate pipelines. Each pipeline parses once, applies the enabled
//! passes in a fixed order and serializes once.

pub mod transforms;

pub use transforms::BandwidthLimits;

use crate::domain::sdp::Document;
use crate::domain::shared::error::SdpError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which rewrite passes are enabled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MungingOptions {
    pub convert_c_line_to_ipv4: bool,
    pub bandwidth_limits: Option<BandwidthLimits>,
    /// Keyframe interval in seconds
    pub periodic_keyframes: Option<u32>,
    pub convert_port_9_to_0: bool,
    pub add_content_slides: bool,
    pub disable_extmap: bool,
    pub h264_max_fs: Option<u32>,
    pub disable_rtx: bool,
    /// Encoder start bitrate in kbps
    pub start_bitrate: Option<u32>,
}

/// Passes applied to SDP produced by the local connection
pub fn apply_local(doc: &mut Document, options: &MungingOptions) {
    if let Some(interval) = options.periodic_keyframes {
        transforms::set_periodic_keyframes(doc, interval);
    }
    if options.disable_extmap {
        transforms::disable_extmap(doc);
    }
    if options.disable_rtx {
        let removed = transforms::disable_rtx(doc);
        debug!("Removed RTX payload types {:?}", removed);
    }
    if options.convert_port_9_to_0 {
        transforms::convert_port_9_to_0(doc);
    }
    if options.add_content_slides && transforms::add_content_slides(doc) {
        debug!("Tagged second video block as slides");
    }
}

/// Passes applied to SDP received from the remote peer
pub fn apply_remote(doc: &mut Document, options: &MungingOptions) {
    if options.convert_c_line_to_ipv4 {
        transforms::convert_c_line_to_ipv4(doc);
    }
    if let Some(ref limits) = options.bandwidth_limits {
        transforms::set_bandwidth_limits(doc, limits);
    }
    if let Some(max_fs) = options.h264_max_fs {
        transforms::set_h264_max_fs(doc, max_fs);
    }
    if let Some(bitrate) = options.start_bitrate {
        transforms::set_start_bitrate(doc, bitrate);
    }
}

/// Parse, rewrite and serialize a local offer or answer
pub fn munge_local_sdp(options: &MungingOptions, sdp: &str) -> Result<String, SdpError> {
    let mut doc = Document::parse(sdp)?;
    apply_local(&mut doc, options);
    Ok(doc.to_sdp_string())
}

/// Parse, rewrite and serialize a remote offer or answer
pub fn munge_remote_sdp(options: &MungingOptions, sdp: &str) -> Result<String, SdpError> {
    let mut doc = Document::parse(sdp)?;
    apply_remote(&mut doc, options);
    Ok(doc.to_sdp_string())
}
