//! Domain result type

use super::error::RoapError;

/// Standard result type for negotiation operations
pub type Result<T> = std::result::Result<T, RoapError>;
