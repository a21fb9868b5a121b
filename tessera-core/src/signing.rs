use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::invoice::Invoice;
use crate::payment::Payment;

/// The fixed field set an invoice signature covers. `deny_unknown_fields`
/// keeps verification from accepting a token with extra or missing claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InvoiceClaims {
    pub value: i64,
    pub currency: String,
    pub uuid: Uuid,
}

impl InvoiceClaims {
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            value: invoice.value,
            currency: invoice.currency.clone(),
            uuid: invoice.uuid,
        }
    }
}

/// The fixed field set a payment signature covers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PaymentClaims {
    pub amount: i64,
    pub currency: String,
    pub payer_uuid: Uuid,
    pub transaction_id: Option<String>,
    pub invoice_uuid: Uuid,
}

impl PaymentClaims {
    pub fn from_payment(payment: &Payment) -> Self {
        Self {
            amount: payment.amount,
            currency: payment.currency.clone(),
            payer_uuid: payment.payer_uuid,
            transaction_id: payment.transaction_id.clone(),
            invoice_uuid: payment.invoice_uuid,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("failed to encode claims: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Produces and checks the integrity tokens stored on invoices and payments.
///
/// Decoding returns `None` for anything that does not carry a valid signature
/// over the expected claim set: wrong key, mangled token, unexpected fields.
/// Callers treat "can't verify" as "reject", never as an exception path.
pub trait Signer: Send + Sync {
    fn sign_invoice(&self, claims: &InvoiceClaims) -> Result<String, SigningError>;

    fn sign_payment(&self, claims: &PaymentClaims) -> Result<String, SigningError>;

    fn decode_invoice(&self, token: &str) -> Option<InvoiceClaims>;

    fn decode_payment(&self, token: &str) -> Option<PaymentClaims>;

    fn verify_invoice(&self, token: &str) -> bool {
        self.decode_invoice(token).is_some()
    }

    fn verify_payment(&self, token: &str) -> bool {
        self.decode_payment(token).is_some()
    }
}

/// HMAC-signed JWT implementation of [`Signer`], sharing one secret with the
/// invoice-issuing flow.
pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
}

impl JwtSigner {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Integrity tokens carry no expiry claim; only the signature matters.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            header: Header::new(Algorithm::HS256),
            validation,
        }
    }
}

impl Signer for JwtSigner {
    fn sign_invoice(&self, claims: &InvoiceClaims) -> Result<String, SigningError> {
        Ok(jsonwebtoken::encode(&self.header, claims, &self.encoding_key)?)
    }

    fn sign_payment(&self, claims: &PaymentClaims) -> Result<String, SigningError> {
        Ok(jsonwebtoken::encode(&self.header, claims, &self.encoding_key)?)
    }

    fn decode_invoice(&self, token: &str) -> Option<InvoiceClaims> {
        match jsonwebtoken::decode::<InvoiceClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("Invoice token rejected: {}", e);
                None
            }
        }
    }

    fn decode_payment(&self, token: &str) -> Option<PaymentClaims> {
        match jsonwebtoken::decode::<PaymentClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("Payment token rejected: {}", e);
                None
            }
        }
    }
}
