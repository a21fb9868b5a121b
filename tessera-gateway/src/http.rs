//! HTTP client for the card processor.
//!
//! The processor exposes two JSON endpoints, `payments/cards/charge` and
//! `payments/cards/post3ds`, both answering with the same envelope:
//! `{ "Model": { "TransactionId", "AcsUrl", "PaReq" }, "Success", "Message" }`.
//! Transaction ids are numeric on the wire and opaque strings in the domain.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tessera_core::gateway::{
    ChargeOutcome, ChargeRequest, ConfirmOutcome, GatewayClient, GatewayError,
};
use uuid::Uuid;

/// Processor connection settings, loaded from the `gateway` config section.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Basic-auth username (terminal public id).
    pub public_id: String,
    /// Basic-auth password.
    pub api_secret: String,
    /// Bound on each round-trip so a hung processor cannot hold the request
    /// slot past its lifetime.
    pub timeout_seconds: u64,
}

pub struct CardGatewayClient {
    config: GatewayConfig,
    http_client: reqwest::Client,
}

impl CardGatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Envelope, GatewayError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.public_id, Some(&self.config.api_secret))
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gateway answered {} on {}: {}", status, path, error_text);
            return Err(GatewayError::Unavailable(format!(
                "gateway answered {}",
                status
            )));
        }

        response
            .json::<Envelope>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl GatewayClient for CardGatewayClient {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeOutcome, GatewayError> {
        let body = ChargeBody::from(request);
        let envelope = self.post("payments/cards/charge", &body).await?;
        Ok(charge_outcome(envelope))
    }

    async fn confirm_3d_secure(
        &self,
        transaction_id: &str,
        challenge_code: &str,
    ) -> Result<ConfirmOutcome, GatewayError> {
        let body = ConfirmBody {
            transaction_id: transaction_id.to_string(),
            pa_res: challenge_code.to_string(),
        };
        let envelope = self.post("payments/cards/post3ds", &body).await?;
        Ok(confirm_outcome(envelope))
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChargeBody {
    #[serde(rename = "Amount")]
    amount: i64,
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "InvoiceId")]
    invoice_id: Uuid,
    #[serde(rename = "payerUuid")]
    payer_uuid: Uuid,
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "CardCryptogramPacket")]
    card_cryptogram_packet: String,
    #[serde(rename = "IpAddress")]
    ip_address: String,
    #[serde(rename = "Description")]
    description: String,
}

impl From<ChargeRequest> for ChargeBody {
    fn from(request: ChargeRequest) -> Self {
        Self {
            amount: request.amount,
            currency: request.currency,
            invoice_id: request.invoice_uuid,
            payer_uuid: request.payer_uuid,
            email: request
                .email
                .map(|masked| masked.into_inner())
                .unwrap_or_default(),
            card_cryptogram_packet: request.card_cryptogram.into_inner(),
            ip_address: request.ip_address,
            description: request.description,
        }
    }
}

#[derive(Debug, Serialize)]
struct ConfirmBody {
    #[serde(rename = "TransactionId")]
    transaction_id: String,
    #[serde(rename = "PaRes")]
    pa_res: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Model")]
    model: Option<Model>,
    // Absent while a 3-D Secure challenge is pending.
    #[serde(rename = "Success", default)]
    success: bool,
    #[serde(rename = "Message")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Model {
    #[serde(rename = "TransactionId")]
    transaction_id: Option<i64>,
    #[serde(rename = "AcsUrl")]
    acs_url: Option<String>,
    #[serde(rename = "PaReq")]
    pa_req: Option<String>,
}

fn charge_outcome(envelope: Envelope) -> ChargeOutcome {
    let model = envelope.model;
    ChargeOutcome {
        transaction_id: model
            .as_ref()
            .and_then(|m| m.transaction_id)
            .map(|id| id.to_string()),
        success: envelope.success,
        error_message: envelope.message,
        acs_url: model.as_ref().and_then(|m| m.acs_url.clone()),
        pa_req: model.and_then(|m| m.pa_req),
    }
}

fn confirm_outcome(envelope: Envelope) -> ConfirmOutcome {
    ConfirmOutcome {
        transaction_id: envelope
            .model
            .and_then(|m| m.transaction_id)
            .map(|id| id.to_string()),
        success: envelope.success,
        error_message: envelope.message,
    }
}
