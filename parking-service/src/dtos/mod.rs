//! Request and response DTOs for the REST surface.

use chrono::SecondsFormat;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Fine, ParkingTicket, ParkingZone, PaymentReceipt, ReceiptKind};
use crate::services::gateway::CardDetails;

fn rfc3339(dt: DateTime) -> String {
    dt.to_chrono().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn rfc3339_opt(dt: Option<DateTime>) -> Option<String> {
    dt.map(rfc3339)
}

// --- tickets ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, message = "vehicle number is required"))]
    pub vehicle_number: String,
    #[validate(length(min = 1, message = "parking zone is required"))]
    pub zone: String,
    #[validate(length(min = 1, message = "duration is required"))]
    pub duration_text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExtendTicketRequest {
    #[validate(length(min = 1, message = "duration is required"))]
    pub duration_text: String,
}

#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    pub vehicle: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: Uuid,
    pub ticket_no: String,
    pub vehicle_number: String,
    pub zone: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_text: String,
    pub parking_fee: i64,
    pub parking_rate: i64,
    pub status: String,
    pub extensions: u32,
    /// Seconds until expiry, derived from `end_time` on every read.
    pub time_remaining: i64,
    /// Whether cancellation is still inside the window, derived on read.
    pub can_cancel: bool,
    pub fine_id: Option<Uuid>,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub paid_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub created_at: String,
}

impl TicketResponse {
    pub fn from_ticket(t: ParkingTicket, cancel_window_minutes: i64) -> Self {
        let time_remaining = t.time_remaining();
        let can_cancel = t.can_cancel(cancel_window_minutes);
        Self {
            id: t.id,
            ticket_no: t.ticket_no,
            vehicle_number: t.vehicle_number,
            zone: t.zone,
            start_time: rfc3339(t.start_time),
            end_time: rfc3339(t.end_time),
            duration_text: t.duration_text,
            parking_fee: t.parking_fee,
            parking_rate: t.parking_rate,
            status: t.status.as_str().to_string(),
            extensions: t.extensions,
            time_remaining,
            can_cancel,
            fine_id: t.fine_id,
            payment_id: t.payment_id,
            payment_method: t.payment_method,
            paid_at: rfc3339_opt(t.paid_at),
            cancelled_at: rfc3339_opt(t.cancelled_at),
            created_at: rfc3339(t.created_at),
        }
    }
}

// --- payments ---

#[derive(Debug, Deserialize, Validate)]
pub struct CardPayload {
    #[validate(length(min = 12, max = 19, message = "card number must be 12-19 digits"))]
    pub number: String,
    #[validate(length(min = 1, message = "card holder is required"))]
    pub holder: String,
    #[validate(range(min = 1, max = 12, message = "expiry month must be 1-12"))]
    pub expiry_month: u8,
    #[validate(range(min = 2024, message = "card is expired"))]
    pub expiry_year: u16,
    #[validate(length(min = 3, max = 4, message = "cvv must be 3-4 digits"))]
    pub cvv: String,
}

impl From<CardPayload> for CardDetails {
    fn from(c: CardPayload) -> Self {
        CardDetails {
            number: c.number,
            holder: c.holder,
            expiry_month: c.expiry_month,
            expiry_year: c.expiry_year,
            cvv: c.cvv,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PayRequest {
    #[validate(nested)]
    pub card: CardPayload,
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub id: Uuid,
    pub kind: ReceiptKind,
    pub ticket_id: Option<Uuid>,
    pub fine_id: Option<Uuid>,
    pub vehicle_number: String,
    pub amount: i64,
    pub payment_method: String,
    pub payment_id: String,
    pub transaction_date: String,
}

impl From<PaymentReceipt> for ReceiptResponse {
    fn from(r: PaymentReceipt) -> Self {
        Self {
            id: r.id,
            kind: r.kind,
            ticket_id: r.ticket_id,
            fine_id: r.fine_id,
            vehicle_number: r.vehicle_number,
            amount: r.amount,
            payment_method: r.payment_method,
            payment_id: r.payment_id,
            transaction_date: rfc3339(r.transaction_date),
        }
    }
}

// --- fines ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFineRequest {
    #[validate(length(min = 1, message = "vehicle number is required"))]
    pub vehicle_number: String,
    #[validate(length(min = 1, message = "reason is required"))]
    pub reason: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    #[validate(range(min = 1, message = "fine amount must be positive"))]
    pub fine_amount: i64,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub duration_text: Option<String>,
    pub actual_arrival: Option<String>,
    pub fine_duration: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VehicleQuery {
    pub vehicle: String,
}

#[derive(Debug, Serialize)]
pub struct FineResponse {
    pub id: Uuid,
    pub ticket_id: Option<Uuid>,
    pub vehicle_number: String,
    pub entry_time: Option<String>,
    pub exit_time: Option<String>,
    pub duration_text: Option<String>,
    pub actual_arrival: Option<String>,
    pub fine_duration: Option<String>,
    pub fine_date: String,
    pub reason: String,
    pub location: String,
    pub fine_amount: i64,
    pub status: String,
    pub paid_at: Option<String>,
    pub payment_id: Option<String>,
    pub created_at: String,
}

impl From<Fine> for FineResponse {
    fn from(f: Fine) -> Self {
        Self {
            id: f.id,
            ticket_id: f.ticket_id,
            vehicle_number: f.vehicle_number,
            entry_time: rfc3339_opt(f.entry_time),
            exit_time: rfc3339_opt(f.exit_time),
            duration_text: f.duration_text,
            actual_arrival: rfc3339_opt(f.actual_arrival),
            fine_duration: f.fine_duration,
            fine_date: rfc3339(f.fine_date),
            reason: f.reason,
            location: f.location,
            fine_amount: f.fine_amount,
            status: f.status.as_str().to_string(),
            paid_at: rfc3339_opt(f.paid_at),
            payment_id: f.payment_id,
            created_at: rfc3339(f.created_at),
        }
    }
}

// --- zones ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateZoneRequest {
    #[validate(length(min = 1, message = "zone code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    #[validate(length(min = 1, message = "parking rate is required"))]
    pub parking_rate: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateZoneRequest {
    #[validate(length(min = 1, message = "zone code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    #[validate(length(min = 1, message = "parking rate is required"))]
    pub parking_rate: String,
}

#[derive(Debug, Serialize)]
pub struct ZoneResponse {
    pub id: Uuid,
    pub code: String,
    pub location: String,
    /// Display string used on tickets.
    pub display_name: String,
    pub parking_rate: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ParkingZone> for ZoneResponse {
    fn from(z: ParkingZone) -> Self {
        let display_name = z.display_name();
        Self {
            id: z.id,
            code: z.code,
            location: z.location,
            display_name,
            parking_rate: z.parking_rate,
            created_at: rfc3339(z.created_at),
            updated_at: rfc3339(z.updated_at),
        }
    }
}

// --- plates ---

#[derive(Debug, Deserialize, Validate)]
pub struct RecognizePlateRequest {
    #[validate(length(min = 1, message = "image is required"))]
    pub image_base64: String,
}

#[derive(Debug, Serialize)]
pub struct RecognizePlateResponse {
    /// Normalized vehicle number ready for ticket/fine lookups.
    pub vehicle_number: String,
    pub confidence: f64,
    pub raw_text: String,
}
