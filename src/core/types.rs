//! Wire and CLI types for the Packet device API.
//!
//! Request bodies derive Serialize, response envelopes derive Deserialize.
//! Only the fields this tool reads are modeled on the response side.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Device request
// ============================================================================

/// Billing cycle for every device we create.
pub const BILLING_CYCLE: &str = "hourly";

/// Operating system slug that makes Packet chain-load our iPXE script.
pub const OPERATING_SYSTEM: &str = "custom_ipxe";

/// Hardware class of the bare-metal server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ServerType {
    #[serde(rename = "baremetal_0")]
    #[value(name = "0")]
    Type0,
    #[serde(rename = "baremetal_1")]
    #[value(name = "1")]
    Type1,
    #[serde(rename = "baremetal_2")]
    #[value(name = "2")]
    Type2,
}

impl ServerType {
    /// Packet plan slug.
    pub fn plan(self) -> &'static str {
        match self {
            Self::Type0 => "baremetal_0",
            Self::Type1 => "baremetal_1",
            Self::Type2 => "baremetal_2",
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.plan())
    }
}

/// Packet datacenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Facility {
    #[serde(rename = "nrt1")]
    Nrt,
    #[serde(rename = "sjc1")]
    Sjc,
    #[serde(rename = "ewr1")]
    Ewr,
    #[serde(rename = "ams1")]
    Ams,
}

impl Facility {
    /// Packet facility code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Nrt => "nrt1",
            Self::Sjc => "sjc1",
            Self::Ewr => "ewr1",
            Self::Ams => "ams1",
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Body of `POST /projects/{project}/devices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRequest {
    pub hostname: String,
    pub plan: ServerType,
    pub billing_cycle: String,
    pub facility: Facility,
    pub operating_system: String,
    pub ipxe_script_url: String,

    /// Cloud-config document, omitted when no userdata was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userdata: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// The fields we read from a created device.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCreated {
    pub id: String,
}

/// A provider-reported lifecycle event for a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub state: String,
    pub body: String,
}

/// Envelope of `GET /devices/{id}/events`, newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct EventList {
    pub events: Vec<Event>,
}

// ============================================================================
// Output selection
// ============================================================================

/// How `status` reports progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Verbosity {
    /// One line per state change
    #[default]
    Normal,
    /// Print only the device IPv4 address once it is ready
    IpOnly,
    /// Print nothing; exit 0 once the device is ready
    Silent,
}

/// What `deploy` and `destroy` print after the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportMode {
    /// Human-readable HTTP status
    Status,
    /// The new device UUID (deploy only)
    Uuid,
    /// The full response body, pretty-printed
    Json,
}
