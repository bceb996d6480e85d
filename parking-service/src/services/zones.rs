//! Zone rate resolution.
//!
//! Tickets carry the zone as a display string, `"<code> - <location>"`.
//! Resolution tries the location first, then the code, then falls back to
//! the configured default rate. The matched zone's rate field is free text
//! entered by council staff; the first integer in it is the hourly rate,
//! and a rate field with no digits also falls back to the default.

use service_core::error::AppError;

use crate::services::pricing::parse_rate_text;
use crate::services::repository::ParkingRepository;

#[derive(Clone)]
pub struct ZoneRateResolver {
    repository: ParkingRepository,
    default_rate: i64,
}

impl ZoneRateResolver {
    pub fn new(repository: ParkingRepository, default_rate: i64) -> Self {
        Self {
            repository,
            default_rate,
        }
    }

    /// Hourly rate for a zone display string.
    pub async fn resolve(&self, zone_display: &str) -> Result<i64, AppError> {
        let (code, location) = match zone_display.split_once(" - ") {
            Some((code, location)) => (Some(code.trim()), location.trim()),
            None => (None, zone_display.trim()),
        };

        if let Some(zone) = self.repository.find_zone_by_location(location).await? {
            return Ok(self.rate_of(&zone.parking_rate, &zone.location));
        }

        if let Some(code) = code {
            if let Some(zone) = self.repository.find_zone_by_code(code).await? {
                return Ok(self.rate_of(&zone.parking_rate, &zone.location));
            }
        }

        tracing::warn!(
            zone = %zone_display,
            default_rate = self.default_rate,
            "Zone not found, using default rate"
        );
        Ok(self.default_rate)
    }

    fn rate_of(&self, rate_text: &str, location: &str) -> i64 {
        match parse_rate_text(rate_text) {
            Some(rate) => rate,
            None => {
                tracing::warn!(
                    location = %location,
                    rate_text = %rate_text,
                    default_rate = self.default_rate,
                    "Zone rate field has no digits, using default rate"
                );
                self.default_rate
            }
        }
    }
}
