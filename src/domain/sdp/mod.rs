//! SDP grammar and document model
//!
//! Raw text is split into lines, each line is typed by the [`Grammar`], and
//! the typed lines are folded into a [`Document`]. Serialization walks the
//! document back out in canonical order.

pub mod document;
pub mod grammar;
pub mod lines;
pub mod media;
pub mod session;

pub use document::{Document, DocumentBuilder};
pub use grammar::{Grammar, LineParser, DEFAULT_GRAMMAR};
pub use lines::{Line, UnknownLine};
pub use media::{
    ApplicationMedia, CodecInfo, IceInfo, MediaDescription, MediaKind, MediaType, RtpMedia,
};
pub use session::SessionDescription;
