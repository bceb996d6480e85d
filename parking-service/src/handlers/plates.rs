//! Plate recognition endpoint (OCR proxy).

use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{RecognizePlateRequest, RecognizePlateResponse},
    services::ocr::normalize_vehicle_number,
    AppState,
};

/// Recognize a number plate from a photo and return the normalized vehicle
/// number, ready for the fine/ticket lookups that follow a scan.
pub async fn recognize_plate(
    State(state): State<AppState>,
    Json(payload): Json<RecognizePlateRequest>,
) -> Result<Json<RecognizePlateResponse>, AppError> {
    payload.validate()?;

    let reading = state
        .plate_reader
        .recognize(&payload.image_base64)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Plate recognition failed");
            AppError::BadGateway(e.to_string())
        })?;

    Ok(Json(RecognizePlateResponse {
        vehicle_number: normalize_vehicle_number(&reading.text),
        confidence: reading.confidence,
        raw_text: reading.text,
    }))
}
