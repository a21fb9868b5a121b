pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod telemetry;

pub use error::PaymentError;
pub use orchestrator::{
    Confirm3dSecure, InitiatePayment, PaymentFlow, PaymentOutcome, ThreeDSecureChallenge,
};
pub use telemetry::{PaymentTelemetry, TracingTelemetry};
