//! Shared kernel - Common types used across the SDP and ROAP contexts

pub mod error;
pub mod events;
pub mod result;
pub mod value_objects;

pub use error::{RoapError, SdpError};
pub use events::{EventMetadata, NegotiationEvent, RoapEvent};
pub use result::Result;
pub use value_objects::SessionId;
