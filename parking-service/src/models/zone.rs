//! Parking zone model.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named parking area with an associated hourly rate.
///
/// `parking_rate` is the rate as entered by council staff (e.g.
/// `"Rs. 150 per hour"`); the numeric rate is extracted from it when a
/// ticket is priced.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ParkingZone {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Zone code shown on signage (e.g. `Z-01`).
    pub code: String,
    pub location: String,
    pub parking_rate: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl ParkingZone {
    /// Display string used on tickets: `"<code> - <location>"`.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.code, self.location)
    }
}
