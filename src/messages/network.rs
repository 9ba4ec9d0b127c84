//! Network messages - communication between App and Network layers

use crate::error::GatewayError;
use crate::models::{BlogRecord, FormState};

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Read the whole collection
    FetchList { id: u64 },
    /// Create a record from the submitted form
    Create { id: u64, form: FormState },
    /// Replace record `record_id` with the submitted form
    Update {
        id: u64,
        record_id: String,
        form: FormState,
    },
    /// Remove record `record_id`
    Delete { id: u64, record_id: String },
    /// Cancel a pending call
    Cancel(u64),
    /// Cancel everything in flight and stop the network actor
    Shutdown,
}

impl NetworkCommand {
    pub fn is_fetch(&self) -> bool {
        matches!(self, NetworkCommand::FetchList { .. })
    }
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// Collection fetched
    Listed {
        id: u64,
        records: Vec<BlogRecord>,
        time_ms: u64,
    },
    /// Create or update accepted
    Saved {
        id: u64,
        record: Option<BlogRecord>,
    },
    /// Delete accepted
    Deleted { id: u64 },
    /// Any call failed
    Failed { id: u64, error: GatewayError },
    /// Call was cancelled before completing
    Cancelled { id: u64 },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Listed { id, .. } => *id,
            NetworkResponse::Saved { id, .. } => *id,
            NetworkResponse::Deleted { id } => *id,
            NetworkResponse::Failed { id, .. } => *id,
            NetworkResponse::Cancelled { id } => *id,
        }
    }
}
