//! Ticket endpoints: purchase, lookup, extend, cancel, pay, convert.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        CreateTicketRequest, ExtendTicketRequest, FineResponse, PayRequest, ReceiptResponse,
        TicketQuery, TicketResponse,
    },
    models::TicketStatus,
    services::gateway::CardDetails,
    AppState,
};

/// Purchase a ticket (owner app, after the plate scan found no outstanding
/// fine).
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), AppError> {
    payload.validate()?;

    let ticket = state
        .tickets
        .create(&payload.vehicle_number, &payload.zone, &payload.duration_text)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TicketResponse::from_ticket(
            ticket,
            state.config.parking.cancel_window_minutes,
        )),
    ))
}

/// Read one ticket with the derived countdown fields.
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = state.tickets.get(ticket_id).await?;
    Ok(Json(TicketResponse::from_ticket(
        ticket,
        state.config.parking.cancel_window_minutes,
    )))
}

/// List a vehicle's tickets, optionally only the active ones.
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(query): Query<TicketQuery>,
) -> Result<Json<Vec<TicketResponse>>, AppError> {
    let tickets = state
        .tickets
        .list_by_vehicle(&query.vehicle, query.active)
        .await?;

    let window = state.config.parking.cancel_window_minutes;
    Ok(Json(
        tickets
            .into_iter()
            .map(|t| TicketResponse::from_ticket(t, window))
            .collect(),
    ))
}

pub async fn extend_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<ExtendTicketRequest>,
) -> Result<Json<TicketResponse>, AppError> {
    payload.validate()?;

    let ticket = state
        .tickets
        .extend(ticket_id, &payload.duration_text)
        .await?;

    Ok(Json(TicketResponse::from_ticket(
        ticket,
        state.config.parking.cancel_window_minutes,
    )))
}

pub async fn cancel_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = state.tickets.cancel(ticket_id).await?;
    Ok(Json(TicketResponse::from_ticket(
        ticket,
        state.config.parking.cancel_window_minutes,
    )))
}

/// Charge the card through the gateway, then settle the ticket with the
/// returned payment id.
pub async fn pay_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<PayRequest>,
) -> Result<Json<ReceiptResponse>, AppError> {
    payload.validate()?;

    // Check the disposition before touching the card: an already-settled
    // ticket must never reach the gateway.
    let ticket = state.tickets.get(ticket_id).await?;
    if ticket.status != TicketStatus::Active {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Ticket is {}, nothing to pay",
            ticket.status.as_str()
        )));
    }

    let card: CardDetails = payload.card.into();
    let description = format!("Parking fee for ticket {}", ticket.ticket_no);
    let outcome = state
        .gateway
        .charge(ticket.parking_fee, &description, &card)
        .await
        .map_err(|e| {
            tracing::error!(ticket_id = %ticket_id, error = %e, "Card charge failed");
            AppError::BadGateway(e.to_string())
        })?;

    let receipt = state
        .tickets
        .pay(ticket_id, &outcome.payment_id, "card")
        .await?;

    Ok(Json(ReceiptResponse::from(receipt)))
}

/// Pay-later: convert the active ticket into a fine.
pub async fn convert_ticket_to_fine(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
) -> Result<(StatusCode, Json<FineResponse>), AppError> {
    let fine = state.tickets.convert_to_fine(ticket_id).await?;
    Ok((StatusCode::CREATED, Json(FineResponse::from(fine))))
}
