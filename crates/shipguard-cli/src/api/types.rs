//! API request/response types

use serde::{Deserialize, Serialize};

/// Session parameters returned by the initiate endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct InitiateResponse {
    pub order_count: i64,
    pub batch_size: i64,
    pub wait_time: u64,
    pub date_from: String,
    pub date_to: String,
}

/// One process-batch request
#[derive(Debug, Clone, Serialize)]
pub struct ProcessBatchRequest {
    pub date_from: String,
    pub date_to: String,
    pub batch_size: i64,
    pub offset: i64,
    pub reconcile: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessBatchResponse {
    pub processed: usize,
}

/// Outcome of one recovery round
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    /// Orders were processed this round.
    Processed(usize),
    /// The server reported the range exhausted.
    Exhausted,
}

/// Server error envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub status: u16,
}
