//! Zone administration endpoints (council console).

use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mongodb::bson::DateTime;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{CreateZoneRequest, UpdateZoneRequest, ZoneResponse},
    models::ParkingZone,
    AppState,
};

pub async fn create_zone(
    State(state): State<AppState>,
    Json(payload): Json<CreateZoneRequest>,
) -> Result<(StatusCode, Json<ZoneResponse>), AppError> {
    payload.validate()?;

    if state
        .repository
        .find_zone_by_code(&payload.code)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow!(
            "Zone {} already exists",
            payload.code
        )));
    }

    let now = DateTime::now();
    let zone = ParkingZone {
        id: Uuid::new_v4(),
        code: payload.code,
        location: payload.location,
        parking_rate: payload.parking_rate,
        created_at: now,
        updated_at: now,
    };

    tracing::info!(zone = %zone.display_name(), rate = %zone.parking_rate, "Zone created");

    state.repository.create_zone(zone.clone()).await?;
    Ok((StatusCode::CREATED, Json(ZoneResponse::from(zone))))
}

pub async fn list_zones(
    State(state): State<AppState>,
) -> Result<Json<Vec<ZoneResponse>>, AppError> {
    let zones = state.repository.list_zones().await?;
    Ok(Json(zones.into_iter().map(ZoneResponse::from).collect()))
}

pub async fn update_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
    Json(payload): Json<UpdateZoneRequest>,
) -> Result<Json<ZoneResponse>, AppError> {
    payload.validate()?;

    let updated = state
        .repository
        .update_zone(
            zone_id,
            &payload.code,
            &payload.location,
            &payload.parking_rate,
        )
        .await?;
    if !updated {
        return Err(AppError::NotFound(anyhow!("Zone not found")));
    }

    let zone = state
        .repository
        .get_zone(zone_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Zone not found")))?;

    Ok(Json(ZoneResponse::from(zone)))
}

pub async fn delete_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state.repository.delete_zone(zone_id).await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow!("Zone not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
