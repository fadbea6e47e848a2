//! Save acknowledgement.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Acknowledgement of a completed save.
///
/// The backend returns no required body, so the receipt only records
/// the status code and when the write completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveReceipt {
    /// HTTP status code of the save response.
    pub status: u16,
    /// When the save completed.
    pub completed_at: Timestamp,
}

impl SaveReceipt {
    /// Creates a receipt completed now.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            completed_at: Timestamp::now(),
        }
    }

    /// Whether the status code indicates success.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
