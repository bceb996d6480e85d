#![allow(dead_code)]

use mongodb::bson::DateTime;
use parking_service::config::{
    Config, DatabaseConfig, GatewayConfig, OcrConfig, ParkingConfig, ServerConfig,
};
use parking_service::models::{Fine, FineStatus};
use secrecy::Secret;
use uuid::Uuid;

pub const TEST_VEHICLE: &str = "WP ABC-1234";

/// Per-test knobs; defaults match production except for the throwaway
/// database and unreachable collaborator endpoints.
#[derive(Default)]
pub struct TestSettings {
    pub gateway_url: Option<String>,
    pub ocr_url: Option<String>,
    pub cancel_window_minutes: Option<i64>,
    pub max_extensions: Option<u32>,
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: mongodb::Database,
    pub db_name: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestSettings::default()).await
    }

    pub async fn spawn_with(settings: TestSettings) -> Self {
        let db_name = format!("parking_test_{}", Uuid::new_v4());

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            database: DatabaseConfig {
                url: Secret::new(
                    std::env::var("TEST_MONGODB_URI")
                        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
                ),
                db_name: db_name.clone(),
            },
            gateway: GatewayConfig {
                api_base_url: settings
                    .gateway_url
                    .unwrap_or_else(|| "http://127.0.0.1:1/v1".to_string()),
                merchant_id: "test-merchant".to_string(),
                api_key: Secret::new("test-gateway-key".to_string()),
            },
            ocr: OcrConfig {
                api_base_url: settings
                    .ocr_url
                    .unwrap_or_else(|| "http://127.0.0.1:1/v1".to_string()),
                api_key: Secret::new("test-ocr-key".to_string()),
            },
            parking: ParkingConfig {
                default_rate: 100,
                cancel_window_minutes: settings.cancel_window_minutes.unwrap_or(10),
                max_extensions: settings.max_extensions.unwrap_or(10),
            },
            service_name: "parking-service-test".to_string(),
        };

        let app = parking_service::Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);
        let db = app.db().clone();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();

        // Wait for the server to accept connections.
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
            client,
        }
    }

    /// Create a zone through the API and return its display name.
    pub async fn seed_zone(&self, code: &str, location: &str, rate_text: &str) -> String {
        let response = self
            .client
            .post(format!("{}/zones", self.address))
            .json(&serde_json::json!({
                "code": code,
                "location": location,
                "parking_rate": rate_text,
            }))
            .send()
            .await
            .expect("Failed to create zone");
        assert_eq!(response.status().as_u16(), 201, "zone creation failed");
        format!("{} - {}", code, location)
    }

    /// Create a ticket through the API and return the response body.
    pub async fn create_ticket(
        &self,
        vehicle: &str,
        zone: &str,
        duration: &str,
    ) -> serde_json::Value {
        let response = self
            .client
            .post(format!("{}/tickets", self.address))
            .json(&serde_json::json!({
                "vehicle_number": vehicle,
                "zone": zone,
                "duration_text": duration,
            }))
            .send()
            .await
            .expect("Failed to create ticket");
        assert_eq!(response.status().as_u16(), 201, "ticket creation failed");
        response.json().await.expect("Invalid ticket response")
    }

    /// Insert a fine directly into the store, bypassing the API, so tests
    /// can control `created_at` ordering and ticket back-references.
    pub async fn insert_fine(
        &self,
        vehicle: &str,
        amount: i64,
        status: FineStatus,
        created_secs_ago: i64,
        ticket_id: Option<Uuid>,
    ) -> Uuid {
        let created =
            DateTime::from_millis(DateTime::now().timestamp_millis() - created_secs_ago * 1000);
        let fine = Fine {
            id: Uuid::new_v4(),
            ticket_id,
            vehicle_number: vehicle.to_string(),
            entry_time: None,
            exit_time: None,
            duration_text: None,
            actual_arrival: None,
            fine_duration: None,
            fine_date: created,
            reason: "Overstayed parking".to_string(),
            location: "Z-01 - Main Street".to_string(),
            fine_amount: amount,
            status,
            paid_at: None,
            payment_id: None,
            created_at: created,
        };
        let id = fine.id;
        self.db
            .collection::<Fine>("fines")
            .insert_one(fine, None)
            .await
            .expect("Failed to insert fine");
        id
    }

    /// Cleanup test database after test completes.
    pub async fn cleanup(&self) {
        self.db
            .drop(None)
            .await
            .expect("Failed to drop test database");
    }
}
