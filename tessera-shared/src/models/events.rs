use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ChargeSettledEvent {
    pub invoice_uuid: Uuid,
    pub payment_uuid: Uuid,
    pub transaction_id: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub success: bool,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ChallengeIssuedEvent {
    pub invoice_uuid: Uuid,
    pub payment_uuid: Uuid,
    pub transaction_id: String,
    pub acs_url: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ChallengeResolvedEvent {
    pub invoice_uuid: Uuid,
    pub payment_uuid: Uuid,
    pub transaction_id: String,
    pub success: bool,
    pub timestamp: i64,
}
