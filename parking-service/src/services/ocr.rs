//! OCR plate-reader client.
//!
//! The inspector and owner apps photograph a number plate; the remote OCR
//! endpoint returns recognized text plus a confidence score. This service
//! applies no image logic of its own; it only normalizes the recognized
//! text into a vehicle number.

use anyhow::{anyhow, Result};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::OcrConfig;

#[derive(Clone)]
pub struct PlateReaderClient {
    client: Client,
    config: OcrConfig,
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    image: &'a str,
}

/// Raw OCR output: recognized text and a confidence in `[0, 1]`.
#[derive(Debug, Deserialize)]
pub struct PlateReading {
    pub text: String,
    pub confidence: f64,
}

impl PlateReaderClient {
    pub fn new(config: OcrConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.api_key.expose_secret().is_empty()
    }

    /// Recognize a number plate from a base64-encoded image.
    pub async fn recognize(&self, image_base64: &str) -> Result<PlateReading> {
        if !self.is_configured() {
            return Err(anyhow!("OCR credentials not configured"));
        }

        let url = format!("{}/recognize", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&RecognizeRequest {
                image: image_base64,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let reading: PlateReading = serde_json::from_str(&body)?;
            tracing::info!(
                text = %reading.text,
                confidence = reading.confidence,
                "Plate recognized"
            );
            Ok(reading)
        } else {
            tracing::error!(status = %status, body = %body, "OCR request failed");
            Err(anyhow!("OCR error ({}): {}", status, body))
        }
    }
}

/// Canonical vehicle-number form: trimmed, upper-case, internal runs of
/// whitespace collapsed to a single space (`" wp abc-1234 "` →
/// `"WP ABC-1234"`).
pub fn normalize_vehicle_number(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
