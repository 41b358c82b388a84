//! ROAP offer/answer negotiation

pub mod connection;
pub mod message;
pub mod state_machine;

pub use connection::MediaConnection;
pub use message::{ErrorType, MessageType, RoapMessage, RESERVED_TIE_BREAKER};
pub use state_machine::{
    NegotiationContext, NegotiationOptions, RoapAction, RoapInput, RoapState, RoapStateMachine,
};
