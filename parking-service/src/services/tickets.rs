//! Ticket lifecycle manager.
//!
//! State machine: `ACTIVE` → `PAID` | `CANCELLED` | `CONVERTED_TO_FINE`,
//! all terminal. Transitions are conditional updates against the store, so
//! a ticket that already reached a terminal state matches nothing and the
//! caller gets a conflict instead of a double transition.

use anyhow::anyhow;
use chrono::Duration;
use mongodb::bson::DateTime;
use rand::Rng;
use service_core::error::AppError;
use uuid::Uuid;

use crate::config::ParkingConfig;
use crate::models::{Fine, FineStatus, ParkingTicket, PaymentReceipt, ReceiptKind, TicketStatus};
use crate::services::ocr::normalize_vehicle_number;
use crate::services::pricing::{fee_for, parse_duration};
use crate::services::repository::ParkingRepository;
use crate::services::zones::ZoneRateResolver;
use crate::services::metrics;

/// Reason recorded on fines generated by the pay-later conversion.
pub const PAY_LATER_REASON: &str = "Pay Later - Unpaid Parking Fee";

/// Attempts for the extend compare-and-swap and the cancel cascade.
const WRITE_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct TicketService {
    repository: ParkingRepository,
    zones: ZoneRateResolver,
    rules: ParkingConfig,
}

impl TicketService {
    pub fn new(repository: ParkingRepository, zones: ZoneRateResolver, rules: ParkingConfig) -> Self {
        Self {
            repository,
            zones,
            rules,
        }
    }

    pub fn cancel_window_minutes(&self) -> i64 {
        self.rules.cancel_window_minutes
    }

    /// Issue a ticket: resolve the zone rate, price the duration, and
    /// persist an active ticket ending `parse_duration(text)` minutes from
    /// now. Vehicles with an outstanding fine must settle it first.
    pub async fn create(
        &self,
        vehicle_number: &str,
        zone: &str,
        duration_text: &str,
    ) -> Result<ParkingTicket, AppError> {
        let vehicle_number = normalize_vehicle_number(vehicle_number);

        if let Some(fine) = self.repository.outstanding_fine(&vehicle_number).await? {
            tracing::info!(
                vehicle = %vehicle_number,
                fine_id = %fine.id,
                fine_amount = fine.fine_amount,
                "Ticket purchase blocked by outstanding fine"
            );
            return Err(AppError::RuleViolation(anyhow!(
                "Vehicle has an outstanding fine of Rs. {}",
                fine.fine_amount
            )));
        }

        let rate = self.zones.resolve(zone).await?;
        let minutes = parse_duration(duration_text);
        let fee = fee_for(duration_text, rate);

        let now = DateTime::now();
        let end = DateTime::from_chrono(now.to_chrono() + Duration::minutes(minutes));

        let ticket = ParkingTicket {
            id: Uuid::new_v4(),
            ticket_no: generate_ticket_no(),
            vehicle_number: vehicle_number.clone(),
            zone: zone.to_string(),
            start_time: now,
            end_time: end,
            duration_text: duration_text.to_string(),
            parking_fee: fee,
            parking_rate: rate,
            status: TicketStatus::Active,
            extensions: 0,
            fine_id: None,
            payment_id: None,
            payment_method: None,
            paid_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };

        tracing::info!(
            ticket_id = %ticket.id,
            ticket_no = %ticket.ticket_no,
            vehicle = %vehicle_number,
            zone = %zone,
            rate = rate,
            fee = fee,
            minutes = minutes,
            "Issuing parking ticket"
        );

        self.repository.create_ticket(ticket.clone()).await?;
        metrics::record_ticket_issued(zone, fee);

        Ok(ticket)
    }

    pub async fn get(&self, id: Uuid) -> Result<ParkingTicket, AppError> {
        self.repository
            .get_ticket(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Ticket not found")))
    }

    pub async fn list_by_vehicle(
        &self,
        vehicle_number: &str,
        active_only: bool,
    ) -> Result<Vec<ParkingTicket>, AppError> {
        let vehicle_number = normalize_vehicle_number(vehicle_number);
        Ok(self
            .repository
            .list_tickets_by_vehicle(&vehicle_number, active_only)
            .await?)
    }

    /// Extend an active ticket by an additional duration. The fee delta is
    /// priced at the ticket's stored rate snapshot (resolved fresh only when
    /// no snapshot survived), and the write is a compare-and-swap on the
    /// current `end_time` so concurrent extends cannot lose a delta.
    pub async fn extend(
        &self,
        id: Uuid,
        duration_text: &str,
    ) -> Result<ParkingTicket, AppError> {
        for _ in 0..WRITE_ATTEMPTS {
            let ticket = self.get(id).await?;

            if ticket.status != TicketStatus::Active {
                return Err(AppError::Conflict(anyhow!(
                    "Ticket is {}, only active tickets can be extended",
                    ticket.status.as_str()
                )));
            }
            if ticket.extensions >= self.rules.max_extensions {
                return Err(AppError::RuleViolation(anyhow!(
                    "Ticket already extended {} times, no further extensions allowed",
                    ticket.extensions
                )));
            }

            let rate = if ticket.parking_rate > 0 {
                ticket.parking_rate
            } else {
                self.zones.resolve(&ticket.zone).await?
            };

            let added_minutes = parse_duration(duration_text);
            let added_fee = fee_for(duration_text, rate);
            let new_end = DateTime::from_chrono(
                ticket.end_time.to_chrono() + Duration::minutes(added_minutes),
            );
            let new_fee = ticket.parking_fee + added_fee;

            let applied = self
                .repository
                .extend_ticket(id, ticket.end_time, new_end, new_fee)
                .await?;

            if applied {
                tracing::info!(
                    ticket_id = %id,
                    added_minutes = added_minutes,
                    added_fee = added_fee,
                    total_fee = new_fee,
                    "Ticket extended"
                );
                return self.get(id).await;
            }

            tracing::warn!(ticket_id = %id, "Concurrent ticket update, retrying extend");
        }

        Err(AppError::Conflict(anyhow!(
            "Ticket was modified concurrently, please retry"
        )))
    }

    /// Cancel a ticket. The cancel window is recomputed here from
    /// `created_at`; a stale client flag is never trusted. The fine cascade
    /// runs before the ticket mutation so a cancelled ticket can never leave
    /// orphaned fines behind.
    pub async fn cancel(&self, id: Uuid) -> Result<ParkingTicket, AppError> {
        let ticket = self.get(id).await?;

        if ticket.status != TicketStatus::Active {
            return Err(AppError::Conflict(anyhow!(
                "Ticket is {}, only active tickets can be cancelled",
                ticket.status.as_str()
            )));
        }
        if !ticket.can_cancel(self.rules.cancel_window_minutes) {
            return Err(AppError::RuleViolation(anyhow!(
                "Cancellation is only allowed within {} minutes of purchase",
                self.rules.cancel_window_minutes
            )));
        }

        self.cascade_delete_fines(id).await?;

        let cancelled = self.repository.mark_ticket_cancelled(id).await?;
        if !cancelled {
            return Err(AppError::Conflict(anyhow!(
                "Ticket was modified concurrently, please retry"
            )));
        }

        tracing::info!(ticket_id = %id, ticket_no = %ticket.ticket_no, "Ticket cancelled");
        self.get(id).await
    }

    /// Mark an active ticket paid with the gateway's opaque payment id and
    /// write the immutable receipt. Paying a ticket twice is a conflict and
    /// never produces a second receipt.
    pub async fn pay(
        &self,
        id: Uuid,
        payment_id: &str,
        payment_method: &str,
    ) -> Result<PaymentReceipt, AppError> {
        let ticket = self.get(id).await?;

        if ticket.status == TicketStatus::Paid {
            return Err(AppError::Conflict(anyhow!("Ticket is already paid")));
        }
        if ticket.status != TicketStatus::Active {
            return Err(AppError::Conflict(anyhow!(
                "Ticket is {}, only active tickets can be paid",
                ticket.status.as_str()
            )));
        }

        let paid = self
            .repository
            .mark_ticket_paid(id, payment_id, payment_method)
            .await?;
        if !paid {
            return Err(AppError::Conflict(anyhow!("Ticket is already settled")));
        }

        let receipt = PaymentReceipt {
            id: Uuid::new_v4(),
            kind: ReceiptKind::Parking,
            ticket_id: Some(ticket.id),
            fine_id: None,
            vehicle_number: ticket.vehicle_number.clone(),
            amount: ticket.parking_fee,
            payment_method: payment_method.to_string(),
            payment_id: payment_id.to_string(),
            transaction_date: DateTime::now(),
        };
        self.repository.create_receipt(receipt.clone()).await?;
        metrics::record_payment("parking", receipt.amount);

        tracing::info!(
            ticket_id = %id,
            payment_id = %payment_id,
            amount = receipt.amount,
            "Ticket paid"
        );

        Ok(receipt)
    }

    /// Pay-later: spawn a fine carrying the ticket's vehicle, times,
    /// duration, and fee, then retire the ticket.
    pub async fn convert_to_fine(&self, id: Uuid) -> Result<Fine, AppError> {
        let ticket = self.get(id).await?;

        if ticket.status != TicketStatus::Active {
            return Err(AppError::Conflict(anyhow!(
                "Ticket is {}, only active tickets can be converted",
                ticket.status.as_str()
            )));
        }

        let now = DateTime::now();
        let fine = Fine {
            id: Uuid::new_v4(),
            ticket_id: Some(ticket.id),
            vehicle_number: ticket.vehicle_number.clone(),
            entry_time: Some(ticket.start_time),
            exit_time: Some(ticket.end_time),
            duration_text: Some(ticket.duration_text.clone()),
            actual_arrival: None,
            fine_duration: None,
            fine_date: now,
            reason: PAY_LATER_REASON.to_string(),
            location: ticket.zone.clone(),
            fine_amount: ticket.parking_fee,
            status: FineStatus::Unpaid,
            paid_at: None,
            payment_id: None,
            created_at: now,
        };

        self.repository.create_fine(fine.clone()).await?;

        let converted = self
            .repository
            .mark_ticket_converted(id, fine.id)
            .await?;
        if !converted {
            // The ticket reached a terminal state while the fine was being
            // written; remove the fine again rather than leave an orphan.
            if let Err(e) = self.repository.delete_fine(fine.id).await {
                tracing::error!(
                    ticket_id = %id,
                    fine_id = %fine.id,
                    error = %e,
                    "Failed to clean up fine after lost conversion race"
                );
            }
            return Err(AppError::Conflict(anyhow!(
                "Ticket was modified concurrently, please retry"
            )));
        }

        tracing::info!(
            ticket_id = %id,
            fine_id = %fine.id,
            fine_amount = fine.fine_amount,
            "Ticket converted to fine"
        );

        Ok(fine)
    }

    /// Cancellation must leave zero fines referencing the ticket. Store
    /// failures are retried with logging before the error is surfaced.
    async fn cascade_delete_fines(&self, ticket_id: Uuid) -> Result<(), AppError> {
        let mut last_err = None;
        for attempt in 1..=WRITE_ATTEMPTS {
            match self.repository.delete_fines_for_ticket(ticket_id).await {
                Ok(deleted) => {
                    if deleted > 0 {
                        tracing::info!(
                            ticket_id = %ticket_id,
                            deleted = deleted,
                            "Cascade-deleted fines for cancelled ticket"
                        );
                    }
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        ticket_id = %ticket_id,
                        attempt = attempt,
                        error = %e,
                        "Fine cascade delete failed, retrying"
                    );
                    last_err = Some(e);
                }
            }
        }
        Err(AppError::DatabaseError(
            last_err.unwrap_or_else(|| anyhow!("fine cascade delete failed")),
        ))
    }
}

/// Short human-readable ticket code, e.g. `PK-4X7B2N`.
fn generate_ticket_no() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    let code: String = (0..6)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("PK-{}", code)
}
