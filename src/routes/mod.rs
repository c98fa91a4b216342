/**
 * Routes Module
 * API route handlers
 */
use serde::{Deserialize, Serialize};

pub mod extract;
pub mod health;
pub mod houses;
pub mod selections;
pub mod upload;
pub mod users;

/// Error body shared by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
