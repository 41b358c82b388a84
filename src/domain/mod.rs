//! Domain layer - Core negotiation and SDP logic
//!
//! This layer contains:
//! - SDP: line grammar, typed lines and the document model
//! - Munging: configurable rewrite passes over a document
//! - Validation: sanity checks on a serialized description
//! - ROAP: protocol messages, the negotiation state machine and the
//!   connection port it drives
//! - Shared kernel: errors, events and identifiers

pub mod munging;
pub mod roap;
pub mod sdp;
pub mod shared;
pub mod validation;

// Re-export commonly used types
pub use shared::{RoapError, Result, SdpError};
