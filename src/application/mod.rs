//! Application layer - Negotiation sessions
//!
//! This layer runs the domain state machine against a live connection:
//! - Session driver: serialises inputs and executes transition effects
//! - Event fan-out to the surrounding application
//! - Diagnostic registry of live sessions
//! - Metrics

pub mod events;
pub mod metrics;
pub mod negotiation;
pub mod registry;

pub use events::EventBroadcaster;
pub use negotiation::Roap;
pub use registry::{NegotiationStatus, SessionEntry, SessionRegistry};
