//! Fine model.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FineStatus {
    Unpaid,
    Paid,
}

impl FineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FineStatus::Unpaid => "UNPAID",
            FineStatus::Paid => "PAID",
        }
    }
}

/// A monetary penalty record, either inspector-issued or derived from an
/// unpaid ticket via convert-to-fine.
///
/// `ticket_id` links back to the originating ticket when there is one;
/// cancelling that ticket cascades a delete over its fines.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Fine {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub ticket_id: Option<Uuid>,
    pub vehicle_number: String,
    pub entry_time: Option<DateTime>,
    pub exit_time: Option<DateTime>,
    pub duration_text: Option<String>,
    pub actual_arrival: Option<DateTime>,
    pub fine_duration: Option<String>,
    pub fine_date: DateTime,
    pub reason: String,
    pub location: String,
    /// Amount in rupees.
    pub fine_amount: i64,
    pub status: FineStatus,
    pub paid_at: Option<DateTime>,
    pub payment_id: Option<String>,
    pub created_at: DateTime,
}
