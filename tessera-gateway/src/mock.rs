//! Scriptable stand-in for the card processor.
//!
//! Supports scripted outcomes, error injection, and call tracking so flows can
//! assert that the processor was (or was not) reached.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tessera_core::gateway::{
    ChargeOutcome, ChargeRequest, ConfirmOutcome, GatewayClient, GatewayError,
};

#[derive(Default)]
pub struct MockGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Outcomes returned by `charge`, front first.
    charge_script: VecDeque<ChargeOutcome>,

    /// Outcomes returned by `confirm_3d_secure`, front first.
    confirm_script: VecDeque<ConfirmOutcome>,

    /// Error returned on the next call to either method (consumed once).
    next_error: Option<GatewayError>,

    /// Recorded calls for assertions.
    call_log: Vec<GatewayCall>,
}

/// Recorded gateway call for assertions.
#[derive(Debug, Clone)]
pub struct GatewayCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next `charge` call.
    pub fn script_charge(&self, outcome: ChargeOutcome) {
        self.inner.lock().unwrap().charge_script.push_back(outcome);
    }

    /// Queue the outcome of the next `confirm_3d_secure` call.
    pub fn script_confirm(&self, outcome: ConfirmOutcome) {
        self.inner.lock().unwrap().confirm_script.push_back(outcome);
    }

    /// Fail the next call to either method with the given error.
    pub fn fail_next(&self, error: GatewayError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .any(|c| c.method == method)
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(GatewayCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self) -> Result<(), GatewayError> {
        if let Some(error) = self.inner.lock().unwrap().next_error.take() {
            return Err(error);
        }
        Ok(())
    }

    // ========================================================================
    // Outcome Builders
    // ========================================================================

    /// A charge the processor settled immediately.
    pub fn approved(transaction_id: &str) -> ChargeOutcome {
        ChargeOutcome {
            transaction_id: Some(transaction_id.to_string()),
            success: true,
            error_message: None,
            acs_url: None,
            pa_req: None,
        }
    }

    /// A charge the processor declined.
    pub fn declined(transaction_id: &str, message: &str) -> ChargeOutcome {
        ChargeOutcome {
            transaction_id: Some(transaction_id.to_string()),
            success: false,
            error_message: Some(message.to_string()),
            acs_url: None,
            pa_req: None,
        }
    }

    /// A charge held pending a 3-D Secure challenge.
    pub fn challenge(transaction_id: &str, acs_url: &str, pa_req: &str) -> ChargeOutcome {
        ChargeOutcome {
            transaction_id: Some(transaction_id.to_string()),
            success: false,
            error_message: None,
            acs_url: Some(acs_url.to_string()),
            pa_req: Some(pa_req.to_string()),
        }
    }

    pub fn confirm_result(transaction_id: &str, success: bool) -> ConfirmOutcome {
        ConfirmOutcome {
            transaction_id: Some(transaction_id.to_string()),
            success,
            error_message: None,
        }
    }
}

impl Clone for MockGateway {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl GatewayClient for MockGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeOutcome, GatewayError> {
        self.record_call(
            "charge",
            vec![
                request.invoice_uuid.to_string(),
                request.amount.to_string(),
                request.currency.clone(),
            ],
        );
        self.check_error()?;

        let mut state = self.inner.lock().unwrap();
        Ok(state.charge_script.pop_front().unwrap_or_else(|| {
            MockGateway::approved(&format!("mock-tx-{}", uuid::Uuid::new_v4().simple()))
        }))
    }

    async fn confirm_3d_secure(
        &self,
        transaction_id: &str,
        challenge_code: &str,
    ) -> Result<ConfirmOutcome, GatewayError> {
        self.record_call(
            "confirm_3d_secure",
            vec![transaction_id.to_string(), challenge_code.to_string()],
        );
        self.check_error()?;

        let mut state = self.inner.lock().unwrap();
        Ok(state
            .confirm_script
            .pop_front()
            .unwrap_or_else(|| MockGateway::confirm_result(transaction_id, true)))
    }
}
