//! Parking ticket model.

use chrono::Utc;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal disposition of a ticket. A ticket is `Active` until exactly one
/// of the terminal states is reached.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Active,
    Paid,
    Cancelled,
    ConvertedToFine,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Active => "ACTIVE",
            TicketStatus::Paid => "PAID",
            TicketStatus::Cancelled => "CANCELLED",
            TicketStatus::ConvertedToFine => "CONVERTED_TO_FINE",
        }
    }
}

/// A time-boxed parking authorization for one vehicle in one zone.
///
/// `end_time` is the source of truth for remaining time; the countdown the
/// apps display is derived from it on every read. The cancel window is
/// likewise recomputed from `created_at` at the moment of use.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ParkingTicket {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Short human-readable code printed on the ticket (e.g. `PK-4X7B2N`).
    pub ticket_no: String,
    pub vehicle_number: String,
    /// Zone display string, `"<code> - <location>"`.
    pub zone: String,
    pub start_time: DateTime,
    pub end_time: DateTime,
    /// Original free-text duration, retained for display.
    pub duration_text: String,
    /// Total fee in rupees across creation and all extensions.
    pub parking_fee: i64,
    /// Hourly rate snapshot used for fee and extension math.
    pub parking_rate: i64,
    pub status: TicketStatus,
    /// Number of extensions applied so far.
    pub extensions: u32,
    pub fine_id: Option<Uuid>,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub paid_at: Option<DateTime>,
    pub cancelled_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl ParkingTicket {
    /// Seconds until `end_time`, floored at zero. Derived, never stored.
    pub fn time_remaining(&self) -> i64 {
        (self.end_time.to_chrono() - Utc::now()).num_seconds().max(0)
    }

    /// Whether cancellation is still permitted: the ticket is active and
    /// fewer than `window_minutes` have elapsed since creation.
    pub fn can_cancel(&self, window_minutes: i64) -> bool {
        self.status == TicketStatus::Active
            && (Utc::now() - self.created_at.to_chrono()).num_minutes() < window_minutes
    }
}
