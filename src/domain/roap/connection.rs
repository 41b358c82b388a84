//! Port to the media connection that owns the real offer/answer machinery

use async_trait::async_trait;

/// The peer connection a negotiation drives.
///
/// Implementations return raw SDP; munging and validation happen on the
/// negotiation side.
#[async_trait]
pub trait MediaConnection: Send + Sync {
    /// Create a local offer
    async fn create_local_offer(&self) -> anyhow::Result<String>;

    /// Apply a remote offer and return the generated local answer
    async fn accept_remote_offer(&self, sdp: String) -> anyhow::Result<String>;

    /// Apply a remote answer to the outstanding local offer
    async fn accept_remote_answer(&self, sdp: String) -> anyhow::Result<()>;
}
