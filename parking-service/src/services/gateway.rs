//! Card-payment gateway client.
//!
//! Posts a charge (amount, description, card details) and returns the
//! gateway's opaque payment id, which the lifecycle managers store
//! verbatim. A declined charge is an error, not a payment id.

use anyhow::{anyhow, Result};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;

#[derive(Clone)]
pub struct CardGatewayClient {
    client: Client,
    config: GatewayConfig,
}

/// Card details as entered in the payment sheet. Never logged in full.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub holder: String,
    pub expiry_month: u8,
    pub expiry_year: u16,
    pub cvv: String,
}

impl CardDetails {
    /// Last four digits, for logs and receipts.
    pub fn last4(&self) -> &str {
        let digits = self.number.trim();
        let split = digits.len().saturating_sub(4);
        &digits[split..]
    }
}

#[derive(Debug, Serialize)]
struct ChargeRequest<'a> {
    merchant_id: &'a str,
    /// Amount in rupees.
    amount: i64,
    currency: &'a str,
    description: &'a str,
    card: ChargeCard<'a>,
}

#[derive(Debug, Serialize)]
struct ChargeCard<'a> {
    number: &'a str,
    holder: &'a str,
    expiry_month: u8,
    expiry_year: u16,
    cvv: &'a str,
}

/// Successful charge: the opaque payment id plus the gateway's status word.
#[derive(Debug, Deserialize)]
pub struct ChargeOutcome {
    pub payment_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorDetail {
    code: String,
    description: String,
}

impl CardGatewayClient {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Whether gateway credentials are set.
    pub fn is_configured(&self) -> bool {
        !self.config.merchant_id.is_empty() && !self.config.api_key.expose_secret().is_empty()
    }

    /// Charge a card. Returns the opaque payment id on approval.
    pub async fn charge(
        &self,
        amount: i64,
        description: &str,
        card: &CardDetails,
    ) -> Result<ChargeOutcome> {
        if !self.is_configured() {
            return Err(anyhow!("Payment gateway credentials not configured"));
        }

        let request = ChargeRequest {
            merchant_id: &self.config.merchant_id,
            amount,
            currency: "LKR",
            description,
            card: ChargeCard {
                number: &card.number,
                holder: &card.holder,
                expiry_month: card.expiry_month,
                expiry_year: card.expiry_year,
                cvv: &card.cvv,
            },
        };

        let url = format!("{}/charges", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, card_last4 = card.last4(), "Gateway charge response");

        if status.is_success() {
            let outcome: ChargeOutcome = serde_json::from_str(&body)?;
            if !outcome.status.eq_ignore_ascii_case("approved") {
                tracing::warn!(
                    payment_id = %outcome.payment_id,
                    status = %outcome.status,
                    "Charge not approved"
                );
                return Err(anyhow!("Payment was declined ({})", outcome.status));
            }
            tracing::info!(
                payment_id = %outcome.payment_id,
                amount = amount,
                "Charge approved"
            );
            Ok(outcome)
        } else {
            let error: GatewayErrorBody =
                serde_json::from_str(&body).unwrap_or_else(|_| GatewayErrorBody {
                    error: GatewayErrorDetail {
                        code: "UNKNOWN".to_string(),
                        description: body.clone(),
                    },
                });
            tracing::error!(
                code = %error.error.code,
                description = %error.error.description,
                "Gateway charge failed"
            );
            Err(anyhow!(
                "Gateway error: {} - {}",
                error.error.code,
                error.error.description
            ))
        }
    }
}
