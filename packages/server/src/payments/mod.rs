use async_trait::async_trait;

pub mod stripe;

pub use stripe::StripeGateway;

/// Input for creating a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub registration_id: i32,
    pub category_name: String,
    /// Amount to charge, in euro cents. Always positive here; free
    /// registrations never reach the gateway.
    pub price_cents: i32,
    pub success_url: String,
    pub cancel_url: String,
}

/// A created checkout session the client gets redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
}

/// Settlement state of a checkout session, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStatus {
    pub paid: bool,
    /// Registration the session was created for, read back from session
    /// metadata. None when the provider returns no usable correlation.
    pub registration_id: Option<i32>,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// No provider credential is configured on this deployment.
    #[error("payment provider is not configured")]
    NotConfigured,
    /// The provider was reached but refused or failed the request.
    #[error("payment provider request failed: {0}")]
    Provider(String),
    /// The provider answered with something we could not interpret.
    #[error("unexpected payment provider response: {0}")]
    InvalidResponse(String),
}

/// Hosted-checkout payment provider.
///
/// The registration workflow only ever talks to this trait; the concrete
/// provider is injected through `AppState`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    async fn verify_payment(&self, session_id: &str) -> Result<PaymentStatus, PaymentError>;
}
