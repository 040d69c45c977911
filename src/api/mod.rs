//! Packet REST API: error taxonomy, responses, and the event-query seam.

pub mod client;

use crate::core::types::Event;
use async_trait::async_trait;
use thiserror::Error;

/// HTTP status of a successful read.
pub const STATUS_OK: u16 = 200;
/// HTTP status of a successful device creation.
pub const STATUS_CREATED: u16 = 201;
/// HTTP status of a successful device deletion.
pub const STATUS_NO_CONTENT: u16 = 204;

/// Failure talking to the Packet API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response could be obtained (DNS, refused, reset, timeout).
    #[error("An error occured while attempting to connect to Packet: {0}")]
    Transport(String),

    /// A well-formed response with an unexpected status.
    #[error("Packet returned HTTP {status}")]
    Remote { status: u16 },

    /// A successful response without the fields we need.
    #[error("malformed response from Packet: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Transport(_) | Self::Malformed(_) => 1,
            Self::Remote { status } => i32::from(*status),
        }
    }
}

/// Status and (possibly empty) JSON body of a completed call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn is(&self, status: u16) -> bool {
        self.status == status
    }
}

/// Source of device lifecycle events.
#[async_trait]
pub trait EventSource {
    /// Fetch the device's events, newest first.
    ///
    /// Any status other than 200 is `ApiError::Remote`.
    async fn device_events(&self, device_id: &str) -> Result<Vec<Event>, ApiError>;
}
