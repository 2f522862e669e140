//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::TimerSnapshot;

/// Every clock on the board plus the preset selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardResponse {
    pub timers: Vec<TimerSnapshot>,
    pub presets: Vec<u64>,
    pub active_preset: Option<u64>,
}

/// Request body for retargeting a clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTimeRequest {
    /// New full duration; negative values are rejected
    pub seconds: i64,
}

/// Body returned when a control is rejected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create an error response
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

/// Service status with every clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timers: Vec<TimerSnapshot>,
    pub active_preset: Option<u64>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
