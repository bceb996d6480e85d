//! MongoDB access for tickets, fines, receipts, and zones.
//!
//! All state lives in the store; every operation re-reads or writes through
//! these collections. Lifecycle transitions use conditional updates (status
//! guards, end-time compare-and-swap) so a stale caller cannot clobber a
//! concurrent transition.

use anyhow::Result;
use futures::TryStreamExt;
use mongodb::options::{FindOneOptions, FindOptions, IndexOptions};
use mongodb::{bson::doc, bson::DateTime, Collection, Database, IndexModel};
use uuid::Uuid;

use crate::models::{Fine, FineStatus, ParkingTicket, ParkingZone, PaymentReceipt, TicketStatus};

#[derive(Clone)]
pub struct ParkingRepository {
    tickets: Collection<ParkingTicket>,
    fines: Collection<Fine>,
    receipts: Collection<PaymentReceipt>,
    zones: Collection<ParkingZone>,
}

impl ParkingRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            tickets: db.collection("tickets"),
            fines: db.collection("fines"),
            receipts: db.collection("receipts"),
            zones: db.collection("zones"),
        }
    }

    /// Initialize indexes backing the vehicle-scoped queries.
    pub async fn init_indexes(&self) -> Result<()> {
        let vehicle_ticket_index = IndexModel::builder()
            .keys(doc! { "vehicle_number": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("vehicle_status_ticket_idx".to_string())
                    .build(),
            )
            .build();

        self.tickets
            .create_indexes([vehicle_ticket_index], None)
            .await?;

        let vehicle_fine_index = IndexModel::builder()
            .keys(doc! { "vehicle_number": 1, "status": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("vehicle_status_fine_idx".to_string())
                    .build(),
            )
            .build();

        let ticket_fine_index = IndexModel::builder()
            .keys(doc! { "ticket_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("ticket_fine_idx".to_string())
                    .build(),
            )
            .build();

        self.fines
            .create_indexes([vehicle_fine_index, ticket_fine_index], None)
            .await?;

        let zone_location_index = IndexModel::builder()
            .keys(doc! { "location": 1 })
            .options(
                IndexOptions::builder()
                    .name("zone_location_idx".to_string())
                    .build(),
            )
            .build();

        let zone_code_index = IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(
                IndexOptions::builder()
                    .name("zone_code_idx".to_string())
                    .build(),
            )
            .build();

        self.zones
            .create_indexes([zone_location_index, zone_code_index], None)
            .await?;

        tracing::info!("Parking service indexes initialized");
        Ok(())
    }

    // --- tickets ---

    pub async fn create_ticket(&self, ticket: ParkingTicket) -> Result<()> {
        self.tickets.insert_one(ticket, None).await?;
        Ok(())
    }

    pub async fn get_ticket(&self, id: Uuid) -> Result<Option<ParkingTicket>> {
        let ticket = self
            .tickets
            .find_one(doc! { "_id": id.to_string() }, None)
            .await?;
        Ok(ticket)
    }

    pub async fn list_tickets_by_vehicle(
        &self,
        vehicle_number: &str,
        active_only: bool,
    ) -> Result<Vec<ParkingTicket>> {
        let mut filter = doc! { "vehicle_number": vehicle_number };
        if active_only {
            filter.insert("status", TicketStatus::Active.as_str());
        }

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self.tickets.find(filter, Some(options)).await?;
        let tickets: Vec<ParkingTicket> = cursor.try_collect().await?;
        Ok(tickets)
    }

    /// Apply an extension only if the ticket is still active and its
    /// `end_time` has not moved since the caller read it. Returns whether a
    /// document matched.
    pub async fn extend_ticket(
        &self,
        id: Uuid,
        expected_end: DateTime,
        new_end: DateTime,
        new_fee: i64,
    ) -> Result<bool> {
        let filter = doc! {
            "_id": id.to_string(),
            "status": TicketStatus::Active.as_str(),
            "end_time": expected_end,
        };
        let update = doc! {
            "$set": {
                "end_time": new_end,
                "parking_fee": new_fee,
                "updated_at": DateTime::now(),
            },
            "$inc": { "extensions": 1 },
        };
        let result = self.tickets.update_one(filter, update, None).await?;
        Ok(result.matched_count == 1)
    }

    /// Flip an active ticket to `PAID`. Returns whether a document matched;
    /// an already-terminal ticket matches nothing.
    pub async fn mark_ticket_paid(
        &self,
        id: Uuid,
        payment_id: &str,
        payment_method: &str,
    ) -> Result<bool> {
        let now = DateTime::now();
        let filter = doc! {
            "_id": id.to_string(),
            "status": TicketStatus::Active.as_str(),
        };
        let update = doc! {
            "$set": {
                "status": TicketStatus::Paid.as_str(),
                "payment_id": payment_id,
                "payment_method": payment_method,
                "paid_at": now,
                "updated_at": now,
            }
        };
        let result = self.tickets.update_one(filter, update, None).await?;
        Ok(result.matched_count == 1)
    }

    pub async fn mark_ticket_cancelled(&self, id: Uuid) -> Result<bool> {
        let now = DateTime::now();
        let filter = doc! {
            "_id": id.to_string(),
            "status": TicketStatus::Active.as_str(),
        };
        let update = doc! {
            "$set": {
                "status": TicketStatus::Cancelled.as_str(),
                "cancelled_at": now,
                "updated_at": now,
            }
        };
        let result = self.tickets.update_one(filter, update, None).await?;
        Ok(result.matched_count == 1)
    }

    pub async fn mark_ticket_converted(&self, id: Uuid, fine_id: Uuid) -> Result<bool> {
        let filter = doc! {
            "_id": id.to_string(),
            "status": TicketStatus::Active.as_str(),
        };
        let update = doc! {
            "$set": {
                "status": TicketStatus::ConvertedToFine.as_str(),
                "fine_id": fine_id.to_string(),
                "updated_at": DateTime::now(),
            }
        };
        let result = self.tickets.update_one(filter, update, None).await?;
        Ok(result.matched_count == 1)
    }

    // --- fines ---

    pub async fn create_fine(&self, fine: Fine) -> Result<()> {
        self.fines.insert_one(fine, None).await?;
        Ok(())
    }

    pub async fn get_fine(&self, id: Uuid) -> Result<Option<Fine>> {
        let fine = self
            .fines
            .find_one(doc! { "_id": id.to_string() }, None)
            .await?;
        Ok(fine)
    }

    pub async fn list_fines_by_vehicle(&self, vehicle_number: &str) -> Result<Vec<Fine>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self
            .fines
            .find(doc! { "vehicle_number": vehicle_number }, Some(options))
            .await?;
        let fines: Vec<Fine> = cursor.try_collect().await?;
        Ok(fines)
    }

    /// Most recently created unpaid fine for a vehicle, if any.
    pub async fn outstanding_fine(&self, vehicle_number: &str) -> Result<Option<Fine>> {
        let filter = doc! {
            "vehicle_number": vehicle_number,
            "status": FineStatus::Unpaid.as_str(),
        };
        let options = FindOneOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let fine = self.fines.find_one(filter, Some(options)).await?;
        Ok(fine)
    }

    /// Flip an unpaid fine to `PAID`. Returns whether a document matched.
    pub async fn mark_fine_paid(
        &self,
        id: Uuid,
        payment_id: &str,
    ) -> Result<bool> {
        let filter = doc! {
            "_id": id.to_string(),
            "status": FineStatus::Unpaid.as_str(),
        };
        let update = doc! {
            "$set": {
                "status": FineStatus::Paid.as_str(),
                "payment_id": payment_id,
                "paid_at": DateTime::now(),
            }
        };
        let result = self.fines.update_one(filter, update, None).await?;
        Ok(result.matched_count == 1)
    }

    pub async fn delete_fine(&self, id: Uuid) -> Result<bool> {
        let result = self
            .fines
            .delete_one(doc! { "_id": id.to_string() }, None)
            .await?;
        Ok(result.deleted_count == 1)
    }

    /// Delete every fine referencing a ticket, paid and unpaid alike.
    /// Returns the number removed.
    pub async fn delete_fines_for_ticket(&self, ticket_id: Uuid) -> Result<u64> {
        let result = self
            .fines
            .delete_many(doc! { "ticket_id": ticket_id.to_string() }, None)
            .await?;
        Ok(result.deleted_count)
    }

    // --- receipts ---

    pub async fn create_receipt(&self, receipt: PaymentReceipt) -> Result<()> {
        self.receipts.insert_one(receipt, None).await?;
        Ok(())
    }

    pub async fn list_receipts_by_vehicle(
        &self,
        vehicle_number: &str,
    ) -> Result<Vec<PaymentReceipt>> {
        let options = FindOptions::builder()
            .sort(doc! { "transaction_date": -1 })
            .build();
        let cursor = self
            .receipts
            .find(doc! { "vehicle_number": vehicle_number }, Some(options))
            .await?;
        let receipts: Vec<PaymentReceipt> = cursor.try_collect().await?;
        Ok(receipts)
    }

    // --- zones ---

    pub async fn create_zone(&self, zone: ParkingZone) -> Result<()> {
        self.zones.insert_one(zone, None).await?;
        Ok(())
    }

    pub async fn get_zone(&self, id: Uuid) -> Result<Option<ParkingZone>> {
        let zone = self
            .zones
            .find_one(doc! { "_id": id.to_string() }, None)
            .await?;
        Ok(zone)
    }

    pub async fn list_zones(&self) -> Result<Vec<ParkingZone>> {
        let options = FindOptions::builder().sort(doc! { "code": 1 }).build();
        let cursor = self.zones.find(doc! {}, Some(options)).await?;
        let zones: Vec<ParkingZone> = cursor.try_collect().await?;
        Ok(zones)
    }

    pub async fn find_zone_by_location(&self, location: &str) -> Result<Option<ParkingZone>> {
        let zone = self
            .zones
            .find_one(doc! { "location": location }, None)
            .await?;
        Ok(zone)
    }

    pub async fn find_zone_by_code(&self, code: &str) -> Result<Option<ParkingZone>> {
        let zone = self.zones.find_one(doc! { "code": code }, None).await?;
        Ok(zone)
    }

    pub async fn update_zone(
        &self,
        id: Uuid,
        code: &str,
        location: &str,
        parking_rate: &str,
    ) -> Result<bool> {
        let update = doc! {
            "$set": {
                "code": code,
                "location": location,
                "parking_rate": parking_rate,
                "updated_at": DateTime::now(),
            }
        };
        let result = self
            .zones
            .update_one(doc! { "_id": id.to_string() }, update, None)
            .await?;
        Ok(result.matched_count == 1)
    }

    pub async fn delete_zone(&self, id: Uuid) -> Result<bool> {
        let result = self
            .zones
            .delete_one(doc! { "_id": id.to_string() }, None)
            .await?;
        Ok(result.deleted_count == 1)
    }
}
