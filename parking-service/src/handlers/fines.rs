//! Fine endpoints: inspector-issued violations, outstanding lookup, payment.

use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime as ChronoDateTime, Utc};
use mongodb::bson::DateTime;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{CreateFineRequest, FineResponse, PayRequest, ReceiptResponse, VehicleQuery},
    models::FineStatus,
    services::{gateway::CardDetails, NewFine},
    AppState,
};

fn parse_timestamp(field: &str, value: Option<String>) -> Result<Option<DateTime>, AppError> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let parsed = ChronoDateTime::parse_from_rfc3339(&raw).map_err(|_| {
                AppError::BadRequest(anyhow!("{} is not a valid RFC 3339 timestamp", field))
            })?;
            Ok(Some(DateTime::from_chrono(parsed.with_timezone(&Utc))))
        }
    }
}

/// Record a violation (inspector app).
pub async fn create_fine(
    State(state): State<AppState>,
    Json(payload): Json<CreateFineRequest>,
) -> Result<(StatusCode, Json<FineResponse>), AppError> {
    payload.validate()?;

    let fine = state
        .fines
        .create(NewFine {
            vehicle_number: payload.vehicle_number,
            reason: payload.reason,
            location: payload.location,
            fine_amount: payload.fine_amount,
            entry_time: parse_timestamp("entry_time", payload.entry_time)?,
            exit_time: parse_timestamp("exit_time", payload.exit_time)?,
            duration_text: payload.duration_text,
            actual_arrival: parse_timestamp("actual_arrival", payload.actual_arrival)?,
            fine_duration: payload.fine_duration,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(FineResponse::from(fine))))
}

pub async fn list_fines(
    State(state): State<AppState>,
    Query(query): Query<VehicleQuery>,
) -> Result<Json<Vec<FineResponse>>, AppError> {
    let fines = state.fines.list_by_vehicle(&query.vehicle).await?;
    Ok(Json(fines.into_iter().map(FineResponse::from).collect()))
}

/// The vehicle's most recent unpaid fine, 404 when everything is settled.
pub async fn get_outstanding_fine(
    State(state): State<AppState>,
    Query(query): Query<VehicleQuery>,
) -> Result<Json<FineResponse>, AppError> {
    let fine = state
        .fines
        .outstanding(&query.vehicle)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("No outstanding fine for this vehicle")))?;

    Ok(Json(FineResponse::from(fine)))
}

/// Charge the card through the gateway, then settle the fine with the
/// returned payment id.
pub async fn pay_fine(
    State(state): State<AppState>,
    Path(fine_id): Path<Uuid>,
    Json(payload): Json<PayRequest>,
) -> Result<Json<ReceiptResponse>, AppError> {
    payload.validate()?;

    let fine = state.fines.get(fine_id).await?;
    if fine.status == FineStatus::Paid {
        return Err(AppError::Conflict(anyhow!("Fine is already paid")));
    }

    let card: CardDetails = payload.card.into();
    let description = format!("Fine for vehicle {}", fine.vehicle_number);
    let outcome = state
        .gateway
        .charge(fine.fine_amount, &description, &card)
        .await
        .map_err(|e| {
            tracing::error!(fine_id = %fine_id, error = %e, "Card charge failed");
            AppError::BadGateway(e.to_string())
        })?;

    let receipt = state.fines.pay(fine_id, &outcome.payment_id, "card").await?;

    Ok(Json(ReceiptResponse::from(receipt)))
}
