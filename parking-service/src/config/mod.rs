use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub gateway: GatewayConfig,
    pub ocr: OcrConfig,
    pub parking: ParkingConfig,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub db_name: String,
}

/// Card-payment gateway credentials.
#[derive(Deserialize, Clone, Debug)]
pub struct GatewayConfig {
    pub api_base_url: String,
    pub merchant_id: String,
    pub api_key: Secret<String>,
}

/// OCR plate-reader endpoint.
#[derive(Deserialize, Clone, Debug)]
pub struct OcrConfig {
    pub api_base_url: String,
    pub api_key: Secret<String>,
}

/// Domain knobs for the ticket lifecycle.
#[derive(Deserialize, Clone, Debug)]
pub struct ParkingConfig {
    /// Hourly rate applied when a zone cannot be resolved.
    pub default_rate: i64,
    /// Minutes after creation during which a ticket may be cancelled.
    pub cancel_window_minutes: i64,
    /// Maximum number of extensions per ticket.
    pub max_extensions: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("PARKING_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PARKING_SERVICE_PORT")
            .unwrap_or_else(|_| "3004".to_string())
            .parse()?;

        let db_url = env::var("PARKING_DATABASE_URL").expect("PARKING_DATABASE_URL must be set");
        let db_name =
            env::var("PARKING_DATABASE_NAME").unwrap_or_else(|_| "parking_db".to_string());

        let gateway_base =
            env::var("GATEWAY_API_BASE_URL").unwrap_or_else(|_| "https://gateway.invalid/v1".to_string());
        let gateway_merchant = env::var("GATEWAY_MERCHANT_ID").unwrap_or_default();
        let gateway_key = env::var("GATEWAY_API_KEY").unwrap_or_default();

        let ocr_base =
            env::var("OCR_API_BASE_URL").unwrap_or_else(|_| "https://ocr.invalid/v1".to_string());
        let ocr_key = env::var("OCR_API_KEY").unwrap_or_default();

        let default_rate = env::var("PARKING_DEFAULT_RATE")
            .unwrap_or_else(|_| "100".to_string())
            .parse()?;
        let cancel_window_minutes = env::var("PARKING_CANCEL_WINDOW_MINUTES")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;
        let max_extensions = env::var("PARKING_MAX_EXTENSIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                db_name,
            },
            gateway: GatewayConfig {
                api_base_url: gateway_base,
                merchant_id: gateway_merchant,
                api_key: Secret::new(gateway_key),
            },
            ocr: OcrConfig {
                api_base_url: ocr_base,
                api_key: Secret::new(ocr_key),
            },
            parking: ParkingConfig {
                default_rate,
                cancel_window_minutes,
                max_extensions,
            },
            service_name: "parking-service".to_string(),
        })
    }
}
