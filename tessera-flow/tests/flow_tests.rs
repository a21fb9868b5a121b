//! End-to-end flow tests over in-memory stores and a scripted mock gateway.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use tessera_core::gateway::{ChargeOutcome, GatewayError};
use tessera_core::invoice::{Invoice, InvoiceRepository, InvoiceStatus};
use tessera_core::lock::ChargeLock;
use tessera_core::payment::{NewPayment, PaymentRepository, PaymentStatus};
use tessera_core::signing::{InvoiceClaims, JwtSigner, PaymentClaims, Signer};
use tessera_flow::{
    Confirm3dSecure, InitiatePayment, PaymentError, PaymentFlow, PaymentOutcome, TracingTelemetry,
};
use tessera_gateway::MockGateway;
use tessera_shared::pii::Masked;
use tessera_store::memory::{InMemoryChargeLock, InMemoryInvoiceStore, InMemoryPaymentStore};

const SECRET: &str = "flow-test-secret";
const FINISH_URL: &str = "https://pay.example.com/v1/payments/3ds/finish";
const SUCCESS_URL: &str = "https://shop.example.com/ok";
const REJECT_URL: &str = "https://shop.example.com/fail";

struct TestRig {
    flow: PaymentFlow,
    invoices: InMemoryInvoiceStore,
    payments: InMemoryPaymentStore,
    gateway: MockGateway,
    lock: InMemoryChargeLock,
    signer: Arc<JwtSigner>,
}

fn setup() -> TestRig {
    let invoices = InMemoryInvoiceStore::new();
    let payments = InMemoryPaymentStore::new(invoices.clone());
    let gateway = MockGateway::new();
    let lock = InMemoryChargeLock::new();
    let signer = Arc::new(JwtSigner::new(SECRET));

    let flow = PaymentFlow::new(
        Arc::new(invoices.clone()),
        Arc::new(payments.clone()),
        Arc::new(gateway.clone()),
        signer.clone(),
        Arc::new(lock.clone()),
        Arc::new(TracingTelemetry),
        FINISH_URL.to_string(),
    );

    TestRig {
        flow,
        invoices,
        payments,
        gateway,
        lock,
        signer,
    }
}

async fn seed_invoice(rig: &TestRig, value: i64, status: InvoiceStatus) -> Invoice {
    let uuid = Uuid::new_v4();
    let claims = InvoiceClaims {
        value,
        currency: "USD".to_string(),
        uuid,
    };
    let invoice = Invoice {
        uuid,
        value,
        currency: "USD".to_string(),
        status,
        signature: rig.signer.sign_invoice(&claims).unwrap(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    rig.invoices.insert(invoice.clone()).await;
    invoice
}

fn initiate_request(invoice_uuid: Uuid) -> InitiatePayment {
    InitiatePayment {
        invoice_uuid,
        payer_uuid: Uuid::new_v4(),
        email: Some(Masked("payer@example.com".to_string())),
        card_cryptogram: Masked("crypto-packet".to_string()),
        ip_address: "203.0.113.7".to_string(),
        success_url: SUCCESS_URL.to_string(),
        reject_url: REJECT_URL.to_string(),
    }
}

fn confirm_request(transaction_id: &str, code: &str) -> Confirm3dSecure {
    Confirm3dSecure {
        transaction_id: transaction_id.to_string(),
        challenge_code: code.to_string(),
        success_url: SUCCESS_URL.to_string(),
        reject_url: REJECT_URL.to_string(),
    }
}

async fn invoice_status(rig: &TestRig, uuid: Uuid) -> InvoiceStatus {
    rig.invoices
        .get_by_uuid(uuid)
        .await
        .unwrap()
        .unwrap()
        .status
}

// ===== Immediate settlement =====

#[tokio::test]
async fn test_immediate_success_settles_invoice() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway.script_charge(MockGateway::approved("tx-1"));

    let outcome = rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();

    let settled = match outcome {
        PaymentOutcome::Settled(invoice) => invoice,
        other => panic!("Expected a settled invoice, got {:?}", other),
    };
    assert_eq!(settled.uuid, invoice.uuid);
    assert_eq!(settled.status, InvoiceStatus::Paid);

    let (payment, _) = rig
        .payments
        .get_by_transaction_id("tx-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Success);
    assert_eq!(payment.amount, 1500);
    assert_eq!(payment.invoice_uuid, invoice.uuid);
    assert_eq!(rig.payments.count().await, 1);
}

#[tokio::test]
async fn test_charge_amount_comes_from_invoice() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 2500, InvoiceStatus::Pending).await;
    rig.gateway.script_charge(MockGateway::approved("tx-amount"));

    rig.flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();

    // The mock records (invoice_uuid, amount, currency) for each charge.
    let calls = rig.gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args[0], invoice.uuid.to_string());
    assert_eq!(calls[0].args[1], "2500");
    assert_eq!(calls[0].args[2], "USD");
}

#[tokio::test]
async fn test_declined_charge_records_failed_attempt() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway
        .script_charge(MockGateway::declined("tx-3", "Insufficient funds"));

    let outcome = rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();

    let settled = match outcome {
        PaymentOutcome::Settled(invoice) => invoice,
        other => panic!("Expected a settled invoice, got {:?}", other),
    };
    assert_eq!(settled.status, InvoiceStatus::Failed);

    let (payment, _) = rig
        .payments
        .get_by_transaction_id("tx-3")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);
    assert_eq!(payment.error_message.as_deref(), Some("Insufficient funds"));
}

#[tokio::test]
async fn test_failed_invoice_can_be_retried() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway
        .script_charge(MockGateway::declined("tx-4", "Do not honor"));
    rig.gateway.script_charge(MockGateway::approved("tx-5"));

    rig.flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();
    assert_eq!(invoice_status(&rig, invoice.uuid).await, InvoiceStatus::Failed);

    let outcome = rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();

    match outcome {
        PaymentOutcome::Settled(refreshed) => {
            assert_eq!(refreshed.status, InvoiceStatus::Paid)
        }
        other => panic!("Expected a settled invoice, got {:?}", other),
    }
    // One failed attempt, one successful retry.
    assert_eq!(rig.payments.count().await, 2);
}

// ===== 3-D Secure challenge =====

#[tokio::test]
async fn test_challenge_parks_invoice_in_waiting() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway.script_charge(MockGateway::challenge(
        "tx-2",
        "https://acs.example.com/auth",
        "eJxVUdtugkAQ",
    ));

    let outcome = rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();

    let challenge = match outcome {
        PaymentOutcome::ChallengeRequired(challenge) => challenge,
        other => panic!("Expected a challenge, got {:?}", other),
    };
    assert_eq!(challenge.md, "tx-2");
    assert_eq!(challenge.acs_url, "https://acs.example.com/auth");
    assert_eq!(challenge.pa_req.as_deref(), Some("eJxVUdtugkAQ"));
    assert_eq!(
        challenge.term_url,
        format!(
            "{}?successUrl={}&rejectUrl={}",
            FINISH_URL, SUCCESS_URL, REJECT_URL
        )
    );

    assert_eq!(invoice_status(&rig, invoice.uuid).await, InvoiceStatus::Waiting);
    let (payment, _) = rig
        .payments
        .get_by_transaction_id("tx-2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Init);
}

#[tokio::test]
async fn test_confirm_success_pays_invoice_and_redirects() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway.script_charge(MockGateway::challenge(
        "tx-2",
        "https://acs.example.com/auth",
        "eJxVUdtugkAQ",
    ));
    rig.flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();

    rig.gateway
        .script_confirm(MockGateway::confirm_result("tx-2", true));
    let redirect = rig
        .flow
        .confirm_3d_secure(confirm_request("tx-2", "ok"))
        .await
        .unwrap();

    assert_eq!(redirect, SUCCESS_URL);
    assert_eq!(invoice_status(&rig, invoice.uuid).await, InvoiceStatus::Paid);
    let (payment, _) = rig
        .payments
        .get_by_transaction_id("tx-2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Success);
}

#[tokio::test]
async fn test_confirm_failure_redirects_to_reject_url() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway.script_charge(MockGateway::challenge(
        "tx-6",
        "https://acs.example.com/auth",
        "pa-req",
    ));
    rig.flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();

    rig.gateway
        .script_confirm(MockGateway::confirm_result("tx-6", false));
    let redirect = rig
        .flow
        .confirm_3d_secure(confirm_request("tx-6", "bad-code"))
        .await
        .unwrap();

    assert_eq!(redirect, REJECT_URL);
    assert_eq!(invoice_status(&rig, invoice.uuid).await, InvoiceStatus::Failed);
    let (payment, _) = rig
        .payments
        .get_by_transaction_id("tx-6")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);
}

#[tokio::test]
async fn test_second_confirmation_rejected_after_settlement() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway.script_charge(MockGateway::challenge(
        "tx-2",
        "https://acs.example.com/auth",
        "pa-req",
    ));
    rig.flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();
    rig.gateway
        .script_confirm(MockGateway::confirm_result("tx-2", true));
    rig.flow
        .confirm_3d_secure(confirm_request("tx-2", "ok"))
        .await
        .unwrap();

    // Replaying the callback must not double-settle the invoice.
    let result = rig
        .flow
        .confirm_3d_secure(confirm_request("tx-2", "ok"))
        .await;

    match result {
        Err(PaymentError::InvoiceAlreadyPaid(uuid)) => assert_eq!(uuid, invoice.uuid),
        other => panic!("Expected InvoiceAlreadyPaid, got {:?}", other),
    }
    assert_eq!(rig.gateway.call_count("confirm_3d_secure"), 1);
}

#[tokio::test]
async fn test_challenge_without_transaction_id_is_internal() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway.script_charge(ChargeOutcome {
        transaction_id: None,
        success: false,
        error_message: None,
        acs_url: Some("https://acs.example.com/auth".to_string()),
        pa_req: None,
    });

    let result = rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await;

    match result {
        Err(PaymentError::Internal { .. }) => {}
        other => panic!("Expected Internal, got {:?}", other),
    }
    // Nothing was recorded for the unusable gateway answer.
    assert_eq!(rig.payments.count().await, 0);
    assert_eq!(invoice_status(&rig, invoice.uuid).await, InvoiceStatus::Pending);
}

// ===== Guards =====

#[tokio::test]
async fn test_unknown_invoice_is_rejected() {
    let rig = setup();
    let missing = Uuid::new_v4();

    let result = rig.flow.initiate_payment(initiate_request(missing)).await;

    match result {
        Err(PaymentError::InvoiceNotFound(uuid)) => assert_eq!(uuid, missing),
        other => panic!("Expected InvoiceNotFound, got {:?}", other),
    }
    assert!(!rig.gateway.was_called("charge"));
}

#[tokio::test]
async fn test_cancelled_invoice_never_reaches_gateway() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Cancelled).await;

    let result = rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await;

    match result {
        Err(PaymentError::InvoiceCancelled(uuid)) => assert_eq!(uuid, invoice.uuid),
        other => panic!("Expected InvoiceCancelled, got {:?}", other),
    }
    assert!(!rig.gateway.was_called("charge"));
    assert_eq!(rig.payments.count().await, 0);
}

#[tokio::test]
async fn test_paid_invoice_never_reaches_gateway() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Paid).await;

    let result = rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await;

    match result {
        Err(PaymentError::InvoiceAlreadyPaid(uuid)) => assert_eq!(uuid, invoice.uuid),
        other => panic!("Expected InvoiceAlreadyPaid, got {:?}", other),
    }
    assert!(!rig.gateway.was_called("charge"));
}

#[tokio::test]
async fn test_tampered_invoice_is_rejected() {
    let rig = setup();
    // Signature covers 1500, but the stored value was bumped afterwards.
    let mut invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    invoice.value = 99_000;
    rig.invoices.insert(invoice.clone()).await;

    let result = rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await;

    match result {
        Err(PaymentError::IntegrityViolation(uuid)) => assert_eq!(uuid, invoice.uuid),
        other => panic!("Expected IntegrityViolation, got {:?}", other),
    }
    assert!(!rig.gateway.was_called("charge"));
}

#[tokio::test]
async fn test_foreign_signature_is_rejected() {
    let rig = setup();
    let mut invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;

    // Token signed with a different secret over the same claims.
    let other = JwtSigner::new("unrelated-secret");
    invoice.signature = other
        .sign_invoice(&InvoiceClaims::from_invoice(&invoice))
        .unwrap();
    rig.invoices.insert(invoice.clone()).await;

    let result = rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await;

    match result {
        Err(PaymentError::IntegrityViolation(_)) => {}
        other => panic!("Expected IntegrityViolation, got {:?}", other),
    }
    assert!(!rig.gateway.was_called("charge"));
}

#[tokio::test]
async fn test_confirm_unknown_transaction_rejected() {
    let rig = setup();

    let result = rig
        .flow
        .confirm_3d_secure(confirm_request("tx-unknown", "ok"))
        .await;

    match result {
        Err(PaymentError::TransactionNotFound(id)) => assert_eq!(id, "tx-unknown"),
        other => panic!("Expected TransactionNotFound, got {:?}", other),
    }
    assert!(!rig.gateway.was_called("confirm_3d_secure"));
}

#[tokio::test]
async fn test_confirm_payment_without_invoice_rejected() {
    let rig = setup();

    // An attempt recorded against an invoice that no longer exists. The
    // consistency fault must surface before the gateway is asked anything.
    let ghost_invoice = Uuid::new_v4();
    let claims = PaymentClaims {
        amount: 1500,
        currency: "USD".to_string(),
        payer_uuid: Uuid::new_v4(),
        transaction_id: Some("tx-13".to_string()),
        invoice_uuid: ghost_invoice,
    };
    rig.payments
        .create(NewPayment {
            invoice_uuid: ghost_invoice,
            transaction_id: Some("tx-13".to_string()),
            status: PaymentStatus::Init,
            amount: 1500,
            currency: "USD".to_string(),
            payer_uuid: claims.payer_uuid,
            error_message: None,
            signature: rig.signer.sign_payment(&claims).unwrap(),
        })
        .await
        .unwrap();

    let result = rig
        .flow
        .confirm_3d_secure(confirm_request("tx-13", "ok"))
        .await;

    match result {
        Err(PaymentError::InvoiceNotFound(uuid)) => assert_eq!(uuid, ghost_invoice),
        other => panic!("Expected InvoiceNotFound, got {:?}", other),
    }
    assert!(!rig.gateway.was_called("confirm_3d_secure"));
}

#[tokio::test]
async fn test_confirm_rejected_after_invoice_cancelled() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway.script_charge(MockGateway::challenge(
        "tx-4",
        "https://acs.example.com/auth",
        "pa-req",
    ));
    rig.flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();

    // The merchant voids the invoice while the challenge is pending; the
    // stale ACS callback must not settle it.
    rig.invoices
        .update_status(invoice.uuid, InvoiceStatus::Cancelled)
        .await
        .unwrap();

    let result = rig
        .flow
        .confirm_3d_secure(confirm_request("tx-4", "ok"))
        .await;

    match result {
        Err(PaymentError::InvoiceCancelled(uuid)) => assert_eq!(uuid, invoice.uuid),
        other => panic!("Expected InvoiceCancelled, got {:?}", other),
    }
    assert!(!rig.gateway.was_called("confirm_3d_secure"));
}

#[tokio::test]
async fn test_confirm_rejects_invoice_tampered_while_waiting() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway.script_charge(MockGateway::challenge(
        "tx-3",
        "https://acs.example.com/auth",
        "pa-req",
    ));
    rig.flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();

    // The invoice terms change while the challenge is pending; the stored
    // signature still covers 1500.
    let mut tampered = rig
        .invoices
        .get_by_uuid(invoice.uuid)
        .await
        .unwrap()
        .unwrap();
    tampered.value = 99_000;
    rig.invoices.insert(tampered).await;

    let result = rig
        .flow
        .confirm_3d_secure(confirm_request("tx-3", "ok"))
        .await;

    match result {
        Err(PaymentError::IntegrityViolation(uuid)) => assert_eq!(uuid, invoice.uuid),
        other => panic!("Expected IntegrityViolation, got {:?}", other),
    }
    assert!(!rig.gateway.was_called("confirm_3d_secure"));
}

// ===== Failure containment =====

#[tokio::test]
async fn test_gateway_outage_leaves_no_trace() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway
        .fail_next(GatewayError::Unavailable("connect timeout".to_string()));

    let result = rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await;

    // The real outcome is unknown, so nothing may be guessed into the store.
    match result {
        Err(PaymentError::Internal { cause }) => {
            assert!(cause.contains("unavailable"), "unexpected cause: {}", cause)
        }
        other => panic!("Expected Internal, got {:?}", other),
    }
    assert_eq!(rig.payments.count().await, 0);
    assert_eq!(invoice_status(&rig, invoice.uuid).await, InvoiceStatus::Pending);

    // The lock was released on the error path; a retry goes through.
    rig.gateway.script_charge(MockGateway::approved("tx-9"));
    let outcome = rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();
    match outcome {
        PaymentOutcome::Settled(refreshed) => assert_eq!(refreshed.status, InvoiceStatus::Paid),
        other => panic!("Expected a settled invoice, got {:?}", other),
    }
}

#[tokio::test]
async fn test_confirm_outage_keeps_challenge_pending() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway.script_charge(MockGateway::challenge(
        "tx-14",
        "https://acs.example.com/auth",
        "pa-req",
    ));
    rig.flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();

    rig.gateway
        .fail_next(GatewayError::Unavailable("connect timeout".to_string()));
    let result = rig
        .flow
        .confirm_3d_secure(confirm_request("tx-14", "ok"))
        .await;

    // The challenge's real outcome is unknown; both records stay pending so
    // the callback can be retried once the processor is reachable.
    match result {
        Err(PaymentError::Internal { cause }) => {
            assert!(cause.contains("unavailable"), "unexpected cause: {}", cause)
        }
        other => panic!("Expected Internal, got {:?}", other),
    }
    let (payment, _) = rig
        .payments
        .get_by_transaction_id("tx-14")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Init);
    assert_eq!(invoice_status(&rig, invoice.uuid).await, InvoiceStatus::Waiting);
}

#[tokio::test]
async fn test_initiate_rejected_while_lock_held() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;

    // Another request already holds this invoice's lock.
    assert!(rig.lock.acquire(invoice.uuid, 30).await.unwrap());

    let result = rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await;

    match result {
        Err(PaymentError::ChargeInProgress(uuid)) => assert_eq!(uuid, invoice.uuid),
        other => panic!("Expected ChargeInProgress, got {:?}", other),
    }
    assert!(!rig.gateway.was_called("charge"));

    rig.lock.release(invoice.uuid).await.unwrap();
    rig.gateway.script_charge(MockGateway::approved("tx-10"));
    assert!(rig
        .flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .is_ok());
}

// ===== Payment lookup =====

#[tokio::test]
async fn test_get_payment_returns_verified_record() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;
    rig.gateway.script_charge(MockGateway::approved("tx-11"));
    rig.flow
        .initiate_payment(initiate_request(invoice.uuid))
        .await
        .unwrap();

    let payment = rig.flow.get_payment("tx-11").await.unwrap();

    assert_eq!(payment.transaction_id.as_deref(), Some("tx-11"));
    assert_eq!(payment.status, PaymentStatus::Success);
    assert_eq!(payment.amount, 1500);
}

#[tokio::test]
async fn test_get_payment_rejects_mismatched_signature() {
    let rig = setup();
    let invoice = seed_invoice(&rig, 1500, InvoiceStatus::Pending).await;

    // A record whose token was signed over different terms.
    let claims = PaymentClaims {
        amount: 100,
        currency: "USD".to_string(),
        payer_uuid: Uuid::new_v4(),
        transaction_id: Some("tx-12".to_string()),
        invoice_uuid: invoice.uuid,
    };
    rig.payments
        .create(NewPayment {
            invoice_uuid: invoice.uuid,
            transaction_id: Some("tx-12".to_string()),
            status: PaymentStatus::Success,
            amount: 1500,
            currency: "USD".to_string(),
            payer_uuid: claims.payer_uuid,
            error_message: None,
            signature: rig.signer.sign_payment(&claims).unwrap(),
        })
        .await
        .unwrap();

    match rig.flow.get_payment("tx-12").await {
        Err(PaymentError::IntegrityViolation(_)) => {}
        other => panic!("Expected IntegrityViolation, got {:?}", other),
    }
}
