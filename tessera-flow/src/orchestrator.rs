use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tessera_core::gateway::{ChargeRequest, GatewayClient};
use tessera_core::invoice::{Invoice, InvoiceRepository, InvoiceStatus};
use tessera_core::lock::ChargeLock;
use tessera_core::payment::{NewPayment, Payment, PaymentRepository, PaymentStatus};
use tessera_core::signing::{InvoiceClaims, PaymentClaims, Signer};
use tessera_shared::models::events::{
    ChallengeIssuedEvent, ChallengeResolvedEvent, ChargeSettledEvent,
};
use tessera_shared::pii::Masked;

use crate::error::PaymentError;
use crate::lifecycle;
use crate::telemetry::PaymentTelemetry;

/// Processor-facing line item description for invoice charges.
const CHARGE_DESCRIPTION: &str = "Invoice payment";

/// TTL on the per-invoice charge lock: long enough to cover one gateway
/// round-trip, short enough that a crashed holder frees the invoice quickly.
const CHARGE_LOCK_TTL_SECONDS: u64 = 30;

/// Instruction to charge an invoice. Amount and currency are deliberately
/// absent: the flow reads them from the persisted invoice and nowhere else.
#[derive(Debug, Clone)]
pub struct InitiatePayment {
    pub invoice_uuid: Uuid,
    pub payer_uuid: Uuid,
    pub email: Option<Masked<String>>,
    pub card_cryptogram: Masked<String>,
    pub ip_address: String,
    pub success_url: String,
    pub reject_url: String,
}

/// Resolution of a pending challenge, as posted back through the
/// confirmation callback.
#[derive(Debug, Clone)]
pub struct Confirm3dSecure {
    pub transaction_id: String,
    pub challenge_code: String,
    pub success_url: String,
    pub reject_url: String,
}

/// Redirect descriptor for a pending 3-D Secure challenge, serialized with
/// the field names the ACS form post protocol expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreeDSecureChallenge {
    /// Merchant data the ACS echoes back: the gateway transaction id.
    #[serde(rename = "MD")]
    pub md: String,
    #[serde(rename = "PaReq")]
    pub pa_req: Option<String>,
    /// Where the ACS posts the challenge result.
    #[serde(rename = "TermUrl")]
    pub term_url: String,
    /// Where the payer must be sent to complete the challenge.
    #[serde(rename = "acsUrl")]
    pub acs_url: String,
}

/// What `initiate_payment` hands back: either the refreshed invoice (the
/// charge settled in one round-trip) or a challenge the payer must complete
/// at the issuer's ACS before the invoice can settle.
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    Settled(Invoice),
    ChallengeRequired(ThreeDSecureChallenge),
}

/// Confirmation callback URL handed to the ACS: configured base plus the
/// caller's redirect targets.
fn build_term_url(base: &str, success_url: &str, reject_url: &str) -> String {
    format!(
        "{}?successUrl={}&rejectUrl={}",
        base, success_url, reject_url
    )
}

/// Drives the payment lifecycle: charge attempts, 3-D Secure challenges and
/// their resolution. All collaborators are injected; the flow itself holds
/// no state beyond configuration.
pub struct PaymentFlow {
    invoices: Arc<dyn InvoiceRepository>,
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn GatewayClient>,
    signer: Arc<dyn Signer>,
    lock: Arc<dyn ChargeLock>,
    telemetry: Arc<dyn PaymentTelemetry>,
    /// Base URL the ACS posts challenge results back to.
    finish_3ds_url: String,
}

impl PaymentFlow {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn GatewayClient>,
        signer: Arc<dyn Signer>,
        lock: Arc<dyn ChargeLock>,
        telemetry: Arc<dyn PaymentTelemetry>,
        finish_3ds_url: String,
    ) -> Self {
        Self {
            invoices,
            payments,
            gateway,
            signer,
            lock,
            telemetry,
            finish_3ds_url,
        }
    }

    /// Charge an invoice. Settles immediately when the issuer does not demand
    /// a challenge; otherwise records an in-flight attempt and returns the
    /// challenge descriptor for the payer to complete.
    pub async fn initiate_payment(
        &self,
        request: InitiatePayment,
    ) -> Result<PaymentOutcome, PaymentError> {
        let invoice_uuid = request.invoice_uuid;

        // Serialize attempts per invoice: two concurrent requests must not
        // both observe an open invoice and double-charge it.
        let acquired = self
            .lock
            .acquire(invoice_uuid, CHARGE_LOCK_TTL_SECONDS)
            .await
            .map_err(PaymentError::internal)?;
        if !acquired {
            return Err(PaymentError::ChargeInProgress(invoice_uuid));
        }

        let result = self.charge_under_lock(request).await;

        // The TTL bounds a leaked lock if this release fails.
        let _ = self.lock.release(invoice_uuid).await;

        result
    }

    async fn charge_under_lock(
        &self,
        request: InitiatePayment,
    ) -> Result<PaymentOutcome, PaymentError> {
        // 1. Load the invoice.
        let invoice = self
            .invoices
            .get_by_uuid(request.invoice_uuid)
            .await
            .map_err(PaymentError::internal)?
            .ok_or(PaymentError::InvoiceNotFound(request.invoice_uuid))?;

        // 2. Reject tampered terms before anything else, regardless of status.
        self.verify_invoice(&invoice)?;

        // 3. Terminal-state guards: no charge once an invoice is closed.
        lifecycle::charge_guard(&invoice)?;

        // 4. Charge with the invoice's recorded terms, never the caller's.
        let outcome = self
            .gateway
            .charge(ChargeRequest {
                amount: invoice.value,
                currency: invoice.currency.clone(),
                invoice_uuid: invoice.uuid,
                payer_uuid: request.payer_uuid,
                email: request.email.clone(),
                card_cryptogram: request.card_cryptogram.clone(),
                ip_address: request.ip_address.clone(),
                description: CHARGE_DESCRIPTION.to_string(),
            })
            .await
            .map_err(PaymentError::internal)?;

        // 5. A present acsUrl means the charge is in-flight behind a 3-D
        //    Secure challenge: record an INIT attempt, park the invoice in
        //    WAITING and hand the payer over to the ACS.
        if let Some(acs_url) = outcome.acs_url.clone() {
            let transaction_id = outcome.transaction_id.clone().ok_or_else(|| {
                PaymentError::Internal {
                    cause: "gateway issued a 3-D Secure challenge without a transaction id"
                        .to_string(),
                }
            })?;

            let claims = PaymentClaims {
                amount: invoice.value,
                currency: invoice.currency.clone(),
                payer_uuid: request.payer_uuid,
                transaction_id: Some(transaction_id.clone()),
                invoice_uuid: invoice.uuid,
            };
            let signature = self.signer.sign_payment(&claims).map_err(PaymentError::internal)?;

            let payment = self
                .payments
                .create(NewPayment {
                    invoice_uuid: invoice.uuid,
                    transaction_id: Some(transaction_id.clone()),
                    status: PaymentStatus::Init,
                    amount: invoice.value,
                    currency: invoice.currency.clone(),
                    payer_uuid: request.payer_uuid,
                    error_message: outcome.error_message.clone(),
                    signature,
                })
                .await
                .map_err(PaymentError::internal)?;

            self.invoices
                .update_status(invoice.uuid, InvoiceStatus::Waiting)
                .await
                .map_err(PaymentError::internal)?;

            let _ = self
                .telemetry
                .log_challenge_issued(ChallengeIssuedEvent {
                    invoice_uuid: invoice.uuid,
                    payment_uuid: payment.uuid,
                    transaction_id: transaction_id.clone(),
                    acs_url: acs_url.clone(),
                    timestamp: Utc::now().timestamp(),
                })
                .await;

            return Ok(PaymentOutcome::ChallengeRequired(ThreeDSecureChallenge {
                md: transaction_id,
                pa_req: outcome.pa_req.clone(),
                term_url: build_term_url(
                    &self.finish_3ds_url,
                    &request.success_url,
                    &request.reject_url,
                ),
                acs_url,
            }));
        }

        // 6. No challenge: the gateway verdict is final. Record the attempt
        //    and move the invoice in the same transaction.
        let (payment_status, invoice_status) = lifecycle::settled_statuses(outcome.success);

        let claims = PaymentClaims {
            amount: invoice.value,
            currency: invoice.currency.clone(),
            payer_uuid: request.payer_uuid,
            transaction_id: outcome.transaction_id.clone(),
            invoice_uuid: invoice.uuid,
        };
        let signature = self.signer.sign_payment(&claims).map_err(PaymentError::internal)?;

        let payment = self
            .payments
            .create_settled(
                NewPayment {
                    invoice_uuid: invoice.uuid,
                    transaction_id: outcome.transaction_id.clone(),
                    status: payment_status,
                    amount: invoice.value,
                    currency: invoice.currency.clone(),
                    payer_uuid: request.payer_uuid,
                    error_message: outcome.error_message.clone(),
                    signature,
                },
                invoice_status,
            )
            .await
            .map_err(PaymentError::internal)?;

        let _ = self
            .telemetry
            .log_charge_settled(ChargeSettledEvent {
                invoice_uuid: invoice.uuid,
                payment_uuid: payment.uuid,
                transaction_id: payment.transaction_id.clone(),
                amount: payment.amount,
                currency: payment.currency.clone(),
                success: outcome.success,
                timestamp: Utc::now().timestamp(),
            })
            .await;

        // 7. Hand back the refreshed invoice so the caller sees the verdict.
        let refreshed = self
            .invoices
            .get_by_uuid(invoice.uuid)
            .await
            .map_err(PaymentError::internal)?
            .ok_or(PaymentError::InvoiceNotFound(invoice.uuid))?;

        Ok(PaymentOutcome::Settled(refreshed))
    }

    /// Resolve a pending 3-D Secure challenge with the code the ACS posted
    /// back, and return the URL the caller should redirect the payer to.
    pub async fn confirm_3d_secure(
        &self,
        request: Confirm3dSecure,
    ) -> Result<String, PaymentError> {
        // 1. Resolve the pending attempt together with its invoice.
        let (payment, invoice) = self
            .payments
            .get_by_transaction_id(&request.transaction_id)
            .await
            .map_err(PaymentError::internal)?
            .ok_or_else(|| PaymentError::TransactionNotFound(request.transaction_id.clone()))?;

        // 2. A payment without its invoice is a consistency fault and must
        //    surface as such, not as a blind gateway call.
        let invoice = invoice.ok_or(PaymentError::InvoiceNotFound(payment.invoice_uuid))?;

        // 3.–4. Same integrity and terminal-state guards as the charge path;
        //    a second confirmation of an already-paid invoice stops here.
        self.verify_invoice(&invoice)?;
        lifecycle::charge_guard(&invoice)?;

        // 5. Ask the processor to resolve the challenge.
        let outcome = self
            .gateway
            .confirm_3d_secure(&request.transaction_id, &request.challenge_code)
            .await
            .map_err(PaymentError::internal)?;

        // 6. Apply the payment and invoice verdicts as one unit.
        let (payment_status, invoice_status) = lifecycle::settled_statuses(outcome.success);
        let settled = self
            .payments
            .settle(payment.uuid, payment_status, invoice.uuid, invoice_status)
            .await
            .map_err(PaymentError::internal)?;

        let _ = self
            .telemetry
            .log_challenge_resolved(ChallengeResolvedEvent {
                invoice_uuid: invoice.uuid,
                payment_uuid: settled.uuid,
                transaction_id: request.transaction_id.clone(),
                success: outcome.success,
                timestamp: Utc::now().timestamp(),
            })
            .await;

        // 7. Redirect target for the payer. Errors never become redirects.
        if outcome.success {
            Ok(request.success_url)
        } else {
            Ok(request.reject_url)
        }
    }

    /// Read-only lookup by gateway transaction id. The record's own signature
    /// is re-checked before it leaves the flow: a payment whose stored terms
    /// no longer match its token must not be trusted by any caller.
    pub async fn get_payment(&self, transaction_id: &str) -> Result<Payment, PaymentError> {
        let (payment, _invoice) = self
            .payments
            .get_by_transaction_id(transaction_id)
            .await
            .map_err(PaymentError::internal)?
            .ok_or_else(|| PaymentError::TransactionNotFound(transaction_id.to_string()))?;

        match self.signer.decode_payment(&payment.signature) {
            Some(claims) if claims == PaymentClaims::from_payment(&payment) => Ok(payment),
            _ => Err(PaymentError::IntegrityViolation(payment.uuid)),
        }
    }

    /// Signature check plus binding: the token must verify AND describe this
    /// exact invoice, so a valid token lifted from another invoice fails too.
    fn verify_invoice(&self, invoice: &Invoice) -> Result<(), PaymentError> {
        match self.signer.decode_invoice(&invoice.signature) {
            Some(claims) if claims == InvoiceClaims::from_invoice(invoice) => Ok(()),
            _ => Err(PaymentError::IntegrityViolation(invoice.uuid)),
        }
    }
}
