use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tessera_core::invoice::Invoice;
use tessera_core::payment::Payment;
use tessera_flow::{Confirm3dSecure, InitiatePayment, PaymentOutcome, ThreeDSecureChallenge};
use tessera_shared::pii::Masked;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/payments", post(initiate_payment))
        .route("/v1/payments/3ds/finish", post(finish_3ds))
        .route("/v1/payments/{transaction_id}", get(get_payment))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct InitiatePaymentRequest {
    pub invoice_uuid: Uuid,
    pub payer_uuid: Uuid,
    pub email: Option<Masked<String>>,
    pub card_cryptogram: Masked<String>,
    pub ip_address: String,
    pub success_url: String,
    pub reject_url: String,
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub uuid: Uuid,
    pub value: i64,
    pub currency: String,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            uuid: invoice.uuid,
            value: invoice.value,
            currency: invoice.currency,
            status: invoice.status.as_str().to_string(),
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

/// Either the refreshed invoice (charge settled in one round-trip) or the
/// 3-D Secure challenge descriptor the payer must complete first.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum InitiatePaymentResponse {
    Challenge(ThreeDSecureChallenge),
    Invoice(InvoiceResponse),
}

/// Redirect targets carried through the confirmation callback's query
/// string, exactly as embedded in the challenge's TermUrl.
#[derive(Debug, Deserialize)]
pub struct FinishRedirects {
    #[serde(rename = "successUrl")]
    pub success_url: String,
    #[serde(rename = "rejectUrl")]
    pub reject_url: String,
}

/// Form body the ACS posts back after the payer completes the challenge.
#[derive(Debug, Deserialize)]
pub struct ChallengeResultForm {
    #[serde(rename = "MD")]
    pub md: String,
    #[serde(rename = "PaRes")]
    pub pa_res: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub uuid: Uuid,
    pub invoice_uuid: Uuid,
    pub transaction_id: Option<String>,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub payer_uuid: Uuid,
    pub error_message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            uuid: payment.uuid,
            invoice_uuid: payment.invoice_uuid,
            transaction_id: payment.transaction_id,
            status: payment.status.as_str().to_string(),
            amount: payment.amount,
            currency: payment.currency,
            payer_uuid: payment.payer_uuid,
            error_message: payment.error_message,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn initiate_payment(
    State(state): State<AppState>,
    Json(req): Json<InitiatePaymentRequest>,
) -> Result<Json<InitiatePaymentResponse>, AppError> {
    let outcome = state
        .flow
        .initiate_payment(InitiatePayment {
            invoice_uuid: req.invoice_uuid,
            payer_uuid: req.payer_uuid,
            email: req.email,
            card_cryptogram: req.card_cryptogram,
            ip_address: req.ip_address,
            success_url: req.success_url,
            reject_url: req.reject_url,
        })
        .await?;

    let response = match outcome {
        PaymentOutcome::Settled(invoice) => InitiatePaymentResponse::Invoice(invoice.into()),
        PaymentOutcome::ChallengeRequired(challenge) => {
            InitiatePaymentResponse::Challenge(challenge)
        }
    };
    Ok(Json(response))
}

pub async fn finish_3ds(
    State(state): State<AppState>,
    Query(redirects): Query<FinishRedirects>,
    Form(form): Form<ChallengeResultForm>,
) -> Result<Redirect, AppError> {
    let target = state
        .flow
        .confirm_3d_secure(Confirm3dSecure {
            transaction_id: form.md,
            challenge_code: form.pa_res,
            success_url: redirects.success_url,
            reject_url: redirects.reject_url,
        })
        .await?;

    // 303 turns the ACS's POST into a browser GET at the target.
    Ok(Redirect::to(&target))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<PaymentResponse>, AppError> {
    let payment = state.flow.get_payment(&transaction_id).await?;
    Ok(Json(payment.into()))
}
