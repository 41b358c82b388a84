//! ROAP - offer/answer negotiation over SDP
//!
//! This crate negotiates a media session between two peers with the ROAP
//! offer/answer protocol and provides the SDP document model the
//! negotiation rewrites on the way in and out.
//!
//! Layout follows a layered design:
//! - `domain`: SDP grammar and document, munging, validation, ROAP
//!   messages and state machine
//! - `application`: async session driver and registry
//! - `config`: typed, layered configuration

pub mod application;
pub mod config;
pub mod domain;

// Re-export commonly used types
pub use application::{NegotiationStatus, Roap, SessionRegistry};
pub use config::{Config, ConfigError};
pub use domain::munging::{munge_local_sdp, munge_remote_sdp, MungingOptions};
pub use domain::roap::{
    ErrorType, MediaConnection, MessageType, RoapMessage, RoapState, RESERVED_TIE_BREAKER,
};
pub use domain::sdp::Document;
pub use domain::shared::error::{RoapError, SdpError};
pub use domain::shared::events::{NegotiationEvent, RoapEvent};
pub use domain::shared::result::Result;
pub use domain::validation::{is_invalid, InvalidSdpReason, ValidationOptions};
