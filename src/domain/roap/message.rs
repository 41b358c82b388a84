//! ROAP protocol messages

use crate::domain::shared::error::RoapError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tie-breaker value this implementation sends with every OFFER.
///
/// A side using it always answers glare with `DOUBLECONFLICT`.
pub const RESERVED_TIE_BREAKER: u32 = 0xFFFF_FFFE;

/// ROAP message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Offer,
    OfferResponse,
    Answer,
    Ok,
    OfferRequest,
    Error,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Offer => "OFFER",
            MessageType::OfferResponse => "OFFER_RESPONSE",
            MessageType::Answer => "ANSWER",
            MessageType::Ok => "OK",
            MessageType::OfferRequest => "OFFER_REQUEST",
            MessageType::Error => "ERROR",
        }
    }

    /// Whether messages of this type must carry SDP
    pub fn requires_sdp(&self) -> bool {
        matches!(
            self,
            MessageType::Offer | MessageType::OfferResponse | MessageType::Answer
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error kind carried by an ERROR message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    #[serde(rename = "DOUBLECONFLICT")]
    DoubleConflict,
    Conflict,
    InvalidState,
    OutOfOrder,
    Refused,
    Retry,
    Timeout,
    Failed,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::DoubleConflict => "DOUBLECONFLICT",
            ErrorType::Conflict => "CONFLICT",
            ErrorType::InvalidState => "INVALID_STATE",
            ErrorType::OutOfOrder => "OUT_OF_ORDER",
            ErrorType::Refused => "REFUSED",
            ErrorType::Retry => "RETRY",
            ErrorType::Timeout => "TIMEOUT",
            ErrorType::Failed => "FAILED",
        }
    }

    /// Errors after which the offer is re-created automatically
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorType::DoubleConflict
                | ErrorType::InvalidState
                | ErrorType::OutOfOrder
                | ErrorType::Retry
        )
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ROAP message as exchanged with the remote peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoapMessage {
    pub seq: u32,
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_breaker: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorType>,
    /// Suggested delay in seconds before retrying
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_cause: Option<String>,
}

impl RoapMessage {
    fn new(seq: u32, message_type: MessageType) -> Self {
        Self {
            seq,
            message_type,
            sdp: None,
            tie_breaker: None,
            error_type: None,
            retry_after: None,
            error_cause: None,
        }
    }

    pub fn offer(seq: u32, sdp: impl Into<String>, tie_breaker: u32) -> Self {
        Self {
            sdp: Some(sdp.into()),
            tie_breaker: Some(tie_breaker),
            ..Self::new(seq, MessageType::Offer)
        }
    }

    pub fn offer_response(seq: u32, sdp: impl Into<String>) -> Self {
        Self {
            sdp: Some(sdp.into()),
            ..Self::new(seq, MessageType::OfferResponse)
        }
    }

    pub fn answer(seq: u32, sdp: impl Into<String>) -> Self {
        Self {
            sdp: Some(sdp.into()),
            ..Self::new(seq, MessageType::Answer)
        }
    }

    pub fn ok(seq: u32) -> Self {
        Self::new(seq, MessageType::Ok)
    }

    pub fn offer_request(seq: u32) -> Self {
        Self::new(seq, MessageType::OfferRequest)
    }

    pub fn error(seq: u32, error_type: ErrorType) -> Self {
        Self {
            error_type: Some(error_type),
            ..Self::new(seq, MessageType::Error)
        }
    }

    pub fn with_retry_after(mut self, retry_after: u32) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    pub fn with_error_cause(mut self, cause: impl Into<String>) -> Self {
        self.error_cause = Some(cause.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.message_type == MessageType::Error
    }

    pub fn to_json(&self) -> Result<String, RoapError> {
        serde_json::to_string(self).map_err(|e| RoapError::MessageDecode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, RoapError> {
        serde_json::from_str(json).map_err(|e| RoapError::MessageDecode(e.to_string()))
    }
}

impl fmt::Display for RoapMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} seq={}", self.message_type, self.seq)?;
        if let Some(error_type) = self.error_type {
            write!(f, " errorType={}", error_type)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_wire_format() {
        let offer = RoapMessage::offer(1, "v=0\r\n", RESERVED_TIE_BREAKER);
        let json: serde_json::Value = serde_json::from_str(&offer.to_json().unwrap()).unwrap();

        assert_eq!(json["seq"], 1);
        assert_eq!(json["messageType"], "OFFER");
        assert_eq!(json["sdp"], "v=0\r\n");
        assert_eq!(json["tieBreaker"], 4294967294u32);
        assert!(json.get("errorType").is_none());
    }

    #[test]
    fn test_error_wire_format() {
        let error = RoapMessage::error(3, ErrorType::DoubleConflict)
            .with_retry_after(4)
            .with_error_cause("glare");
        let json = error.to_json().unwrap();

        assert!(json.contains("\"messageType\":\"ERROR\""));
        assert!(json.contains("\"errorType\":\"DOUBLECONFLICT\""));
        assert!(json.contains("\"retryAfter\":4"));
        assert!(json.contains("\"errorCause\":\"glare\""));
    }

    #[test]
    fn test_decode_from_peer() {
        let message = RoapMessage::from_json(
            r#"{"seq":7,"messageType":"ERROR","errorType":"OUT_OF_ORDER"}"#,
        )
        .unwrap();
        assert_eq!(message.seq, 7);
        assert!(message.is_error());
        assert_eq!(message.error_type, Some(ErrorType::OutOfOrder));
        assert_eq!(message.sdp, None);

        let message =
            RoapMessage::from_json(r#"{"seq":2,"messageType":"OFFER_REQUEST"}"#).unwrap();
        assert_eq!(message.message_type, MessageType::OfferRequest);
    }

    #[test]
    fn test_decode_failure() {
        let result = RoapMessage::from_json(r#"{"seq":1,"messageType":"HELLO"}"#);
        assert!(matches!(result, Err(RoapError::MessageDecode(_))));
    }

    #[test]
    fn test_retryable_errors() {
        let retryable: Vec<ErrorType> = [
            ErrorType::DoubleConflict,
            ErrorType::Conflict,
            ErrorType::InvalidState,
            ErrorType::OutOfOrder,
            ErrorType::Refused,
            ErrorType::Retry,
            ErrorType::Timeout,
            ErrorType::Failed,
        ]
        .into_iter()
        .filter(ErrorType::is_retryable)
        .collect();

        assert_eq!(
            retryable,
            vec![
                ErrorType::DoubleConflict,
                ErrorType::InvalidState,
                ErrorType::OutOfOrder,
                ErrorType::Retry
            ]
        );
    }

    #[test]
    fn test_type_names() {
        assert!(MessageType::Answer.requires_sdp());
        assert!(!MessageType::Ok.requires_sdp());
        assert_eq!(ErrorType::DoubleConflict.to_string(), "DOUBLECONFLICT");
    }

    #[test]
    fn test_display_matches_wire_names() {
        for message_type in [
            MessageType::Offer,
            MessageType::OfferResponse,
            MessageType::Answer,
            MessageType::Ok,
            MessageType::OfferRequest,
            MessageType::Error,
        ] {
            assert_eq!(
                serde_json::to_string(&message_type).unwrap(),
                format!("\"{}\"", message_type)
            );
        }
        for error_type in [
            ErrorType::DoubleConflict,
            ErrorType::Conflict,
            ErrorType::InvalidState,
            ErrorType::OutOfOrder,
            ErrorType::Refused,
            ErrorType::Retry,
            ErrorType::Timeout,
            ErrorType::Failed,
        ] {
            let json = format!("\"{}\"", error_type);
            assert_eq!(serde_json::to_string(&error_type).unwrap(), json);
            assert_eq!(serde_json::from_str::<ErrorType>(&json).unwrap(), error_type);
        }
    }
}
