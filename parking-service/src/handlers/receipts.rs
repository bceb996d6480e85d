//! Receipt endpoints (owner payment history).

use axum::{
    extract::{Query, State},
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{ReceiptResponse, VehicleQuery},
    services::ocr::normalize_vehicle_number,
    AppState,
};

pub async fn list_receipts(
    State(state): State<AppState>,
    Query(query): Query<VehicleQuery>,
) -> Result<Json<Vec<ReceiptResponse>>, AppError> {
    let vehicle = normalize_vehicle_number(&query.vehicle);
    let receipts = state.repository.list_receipts_by_vehicle(&vehicle).await?;
    Ok(Json(
        receipts.into_iter().map(ReceiptResponse::from).collect(),
    ))
}
