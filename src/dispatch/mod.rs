//! Client-side dispatch to the analysis service.
//!
//! Three independent operations share one contract: validate the input
//! locally, POST it to a fixed endpoint, and accept the reply only if the
//! expected field is present.

/// HTTP client issuing the analysis requests.
pub mod client;
/// Fixed endpoint table and default origin.
pub mod endpoint;
/// Validation and dispatch failures.
pub mod error;
/// Uploadable media files and local type checks.
pub mod media;
/// Request and response bodies.
pub mod payload;
/// Loading indicators, session wrapper and result rendering.
pub mod view;

pub use client::Dispatcher;
pub use endpoint::{DEFAULT_BASE_URL, Endpoint};
pub use error::{DispatchError, FailureKind, ValidationError};
pub use media::{MediaFile, MediaKind};
pub use payload::{SentimentScores, TextAnalysis};
pub use view::{Phase, Session};
