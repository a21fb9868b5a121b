pub mod gateway;
pub mod invoice;
pub mod lock;
pub mod payment;
pub mod signing;

pub use gateway::{ChargeOutcome, ChargeRequest, ConfirmOutcome, GatewayClient, GatewayError};
pub use invoice::{Invoice, InvoiceRepository, InvoiceStatus};
pub use lock::ChargeLock;
pub use payment::{NewPayment, Payment, PaymentRepository, PaymentStatus};
pub use signing::{InvoiceClaims, JwtSigner, PaymentClaims, Signer};
