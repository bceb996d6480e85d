//! Fine lifecycle manager.
//!
//! Fines are created by inspectors (standalone violations) or by the
//! ticket pay-later conversion, and mutate only on payment. One fine is
//! paid at a time; there is no batch pay.

use anyhow::anyhow;
use mongodb::bson::DateTime;
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{Fine, FineStatus, PaymentReceipt, ReceiptKind};
use crate::services::metrics;
use crate::services::ocr::normalize_vehicle_number;
use crate::services::repository::ParkingRepository;

pub struct NewFine {
    pub vehicle_number: String,
    pub reason: String,
    pub location: String,
    pub fine_amount: i64,
    pub entry_time: Option<DateTime>,
    pub exit_time: Option<DateTime>,
    pub duration_text: Option<String>,
    pub actual_arrival: Option<DateTime>,
    pub fine_duration: Option<String>,
}

#[derive(Clone)]
pub struct FineService {
    repository: ParkingRepository,
}

impl FineService {
    pub fn new(repository: ParkingRepository) -> Self {
        Self { repository }
    }

    /// Record an inspector-issued violation.
    pub async fn create(&self, new_fine: NewFine) -> Result<Fine, AppError> {
        let now = DateTime::now();
        let fine = Fine {
            id: Uuid::new_v4(),
            ticket_id: None,
            vehicle_number: normalize_vehicle_number(&new_fine.vehicle_number),
            entry_time: new_fine.entry_time,
            exit_time: new_fine.exit_time,
            duration_text: new_fine.duration_text,
            actual_arrival: new_fine.actual_arrival,
            fine_duration: new_fine.fine_duration,
            fine_date: now,
            reason: new_fine.reason,
            location: new_fine.location,
            fine_amount: new_fine.fine_amount,
            status: FineStatus::Unpaid,
            paid_at: None,
            payment_id: None,
            created_at: now,
        };

        tracing::info!(
            fine_id = %fine.id,
            vehicle = %fine.vehicle_number,
            amount = fine.fine_amount,
            reason = %fine.reason,
            "Issuing fine"
        );

        self.repository.create_fine(fine.clone()).await?;
        Ok(fine)
    }

    pub async fn get(&self, id: Uuid) -> Result<Fine, AppError> {
        self.repository
            .get_fine(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Fine not found")))
    }

    pub async fn list_by_vehicle(&self, vehicle_number: &str) -> Result<Vec<Fine>, AppError> {
        let vehicle_number = normalize_vehicle_number(vehicle_number);
        Ok(self.repository.list_fines_by_vehicle(&vehicle_number).await?)
    }

    /// The most recently created unpaid fine for a vehicle, or none when
    /// everything is settled.
    pub async fn outstanding(&self, vehicle_number: &str) -> Result<Option<Fine>, AppError> {
        let vehicle_number = normalize_vehicle_number(vehicle_number);
        Ok(self.repository.outstanding_fine(&vehicle_number).await?)
    }

    /// Mark a fine paid with the gateway's opaque payment id and write the
    /// immutable receipt. Paying twice is a conflict, never a second
    /// receipt.
    pub async fn pay(
        &self,
        id: Uuid,
        payment_id: &str,
        payment_method: &str,
    ) -> Result<PaymentReceipt, AppError> {
        let fine = self.get(id).await?;

        if fine.status == FineStatus::Paid {
            return Err(AppError::Conflict(anyhow!("Fine is already paid")));
        }

        let paid = self.repository.mark_fine_paid(id, payment_id).await?;
        if !paid {
            return Err(AppError::Conflict(anyhow!("Fine is already settled")));
        }

        let receipt = PaymentReceipt {
            id: Uuid::new_v4(),
            kind: ReceiptKind::Fine,
            ticket_id: fine.ticket_id,
            fine_id: Some(fine.id),
            vehicle_number: fine.vehicle_number.clone(),
            amount: fine.fine_amount,
            payment_method: payment_method.to_string(),
            payment_id: payment_id.to_string(),
            transaction_date: DateTime::now(),
        };
        self.repository.create_receipt(receipt.clone()).await?;
        metrics::record_payment("fine", receipt.amount);

        tracing::info!(
            fine_id = %id,
            payment_id = %payment_id,
            amount = receipt.amount,
            "Fine paid"
        );

        Ok(receipt)
    }
}
