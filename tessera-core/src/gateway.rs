use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tessera_shared::pii::Masked;
use uuid::Uuid;

/// Charge instruction for the processor. Amount and currency are always taken
/// from the persisted invoice, never from the inbound request.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: i64,
    pub currency: String,
    pub invoice_uuid: Uuid,
    pub payer_uuid: Uuid,
    pub email: Option<Masked<String>>,
    pub card_cryptogram: Masked<String>,
    pub ip_address: String,
    pub description: String,
}

/// Gateway verdict for a charge attempt. A present `acs_url` means the issuer
/// demands a 3-D Secure challenge; `success` is not yet meaningful in that
/// case: the charge is in-flight, not settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeOutcome {
    pub transaction_id: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
    pub acs_url: Option<String>,
    pub pa_req: Option<String>,
}

impl ChargeOutcome {
    pub fn requires_challenge(&self) -> bool {
        self.acs_url.is_some()
    }
}

/// Gateway verdict for a 3-D Secure confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmOutcome {
    pub transaction_id: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
}

/// A declined charge is NOT a gateway error; it comes back as an Ok outcome
/// with `success = false`. These variants cover the cases where the real
/// outcome is unknown, which callers must never record as a failed payment.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Timeout, connection failure, or a non-2xx answer. The charge may or
    /// may not have gone through on the processor side.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),

    /// A 2xx answer whose body this client cannot interpret.
    #[error("payment gateway returned an invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Initiate a charge. One network round-trip, no internal retry.
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeOutcome, GatewayError>;

    /// Resolve a pending 3-D Secure challenge with the code the ACS posted back.
    async fn confirm_3d_secure(
        &self,
        transaction_id: &str,
        challenge_code: &str,
    ) -> Result<ConfirmOutcome, GatewayError>;
}
