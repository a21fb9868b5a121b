//! Pure lifecycle rules shared by the charge and confirmation paths.

use tessera_core::invoice::{Invoice, InvoiceStatus};
use tessera_core::payment::PaymentStatus;

use crate::error::PaymentError;

/// Rejects invoices that reached a terminal state. PAID and CANCELLED
/// invoices never accept another attempt; PENDING, WAITING and FAILED
/// invoices do, which is what makes a failed attempt retryable.
pub fn charge_guard(invoice: &Invoice) -> Result<(), PaymentError> {
    match invoice.status {
        InvoiceStatus::Cancelled => Err(PaymentError::InvoiceCancelled(invoice.uuid)),
        InvoiceStatus::Paid => Err(PaymentError::InvoiceAlreadyPaid(invoice.uuid)),
        _ => Ok(()),
    }
}

/// Maps a processor verdict onto the payment/invoice status pair that is
/// persisted as one unit.
pub fn settled_statuses(success: bool) -> (PaymentStatus, InvoiceStatus) {
    if success {
        (PaymentStatus::Success, InvoiceStatus::Paid)
    } else {
        (PaymentStatus::Failed, InvoiceStatus::Failed)
    }
}
