use uuid::Uuid;

/// Errors surfaced by the payment flow. Variants are deliberately coarse:
/// callers map them onto transport responses, so each one carries exactly
/// what the caller needs to answer correctly.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Integrity check failed for {0}")]
    IntegrityViolation(Uuid),

    #[error("Invoice {0} is cancelled and no longer accepts payments")]
    InvoiceCancelled(Uuid),

    #[error("Invoice {0} is already paid")]
    InvoiceAlreadyPaid(Uuid),

    #[error("Another charge attempt on invoice {0} is in progress")]
    ChargeInProgress(Uuid),

    /// Infrastructure or gateway fault. The cause is kept for diagnostics
    /// and must not be shown to the payer.
    #[error("Payment processing failed: {cause}")]
    Internal { cause: String },
}

impl PaymentError {
    pub fn internal<E: std::fmt::Display>(cause: E) -> Self {
        Self::Internal {
            cause: cause.to_string(),
        }
    }
}
