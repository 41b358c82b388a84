//! Negotiation events published to the surrounding application

use crate::domain::roap::message::RoapMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub event_type: String,
}

impl EventMetadata {
    pub fn new(event_type: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            event_type,
        }
    }
}

/// What happened during a negotiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NegotiationEvent {
    /// A new offer/answer round has begun
    Started,
    /// The round completed and both sides are in steady state
    Done,
    /// The session entered a failed state
    Failed { reason: String },
    /// A ROAP message must be delivered to the remote peer
    MessageToSend(RoapMessage),
}

impl NegotiationEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            NegotiationEvent::Started => "negotiation.started",
            NegotiationEvent::Done => "negotiation.done",
            NegotiationEvent::Failed { .. } => "negotiation.failed",
            NegotiationEvent::MessageToSend(_) => "negotiation.message_to_send",
        }
    }
}

/// A negotiation event stamped with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoapEvent {
    pub metadata: EventMetadata,
    pub event: NegotiationEvent,
}

impl RoapEvent {
    pub fn new(event: NegotiationEvent) -> Self {
        Self {
            metadata: EventMetadata::new(event.event_type().to_string()),
            event,
        }
    }

    /// The outbound message, if this is a message-to-send event
    pub fn message(&self) -> Option<&RoapMessage> {
        match &self.event {
            NegotiationEvent::MessageToSend(message) => Some(message),
            _ => None,
        }
    }
}
