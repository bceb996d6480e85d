//! Payment receipt model.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptKind {
    Parking,
    Fine,
}

/// Immutable record of a successful ticket or fine payment. Written once at
/// the moment the payment succeeds, never mutated or deleted.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentReceipt {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub kind: ReceiptKind,
    pub ticket_id: Option<Uuid>,
    pub fine_id: Option<Uuid>,
    pub vehicle_number: String,
    /// Amount in rupees.
    pub amount: i64,
    pub payment_method: String,
    /// Opaque id reported by the payment gateway, stored verbatim.
    pub payment_id: String,
    pub transaction_date: DateTime,
}
