//! Domain errors

use thiserror::Error;

/// Errors raised while folding SDP lines into a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SdpError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Invalid media line: {0}")]
    InvalidMediaLine(String),

    #[error("Unexpected media line")]
    UnexpectedMediaLine,

    #[error("Invalid payload type: {0}")]
    InvalidPayloadType(String),

    #[error("No SDP lines found")]
    Empty,
}

/// Errors surfaced by the negotiation layer
#[derive(Error, Debug, Clone)]
pub enum RoapError {
    #[error("SDP error: {0}")]
    Sdp(#[from] SdpError),

    #[error("Invalid SDP: {0}")]
    InvalidSdp(String),

    #[error("Local operation failed: {0}")]
    LocalOperation(String),

    #[error("Negotiation failed: {0}")]
    NegotiationFailed(String),

    #[error("Message decode error: {0}")]
    MessageDecode(String),

    #[error("Negotiation session closed")]
    SessionClosed,
}
