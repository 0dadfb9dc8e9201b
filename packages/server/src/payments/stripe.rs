use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::PaymentsConfig;

use super::{CheckoutRequest, CheckoutSession, PaymentError, PaymentGateway, PaymentStatus};

/// Stripe Checkout over the plain REST API.
///
/// Sessions are created with a single ad-hoc line item and the registration id
/// in the session metadata, which `verify_payment` reads back to correlate the
/// settled session with our row.
pub struct StripeGateway {
    client: Client,
    secret_key: Option<String>,
    api_base: String,
    currency: String,
}

impl StripeGateway {
    pub fn from_config(cfg: &PaymentsConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            secret_key: cfg.secret_key.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_owned(),
            currency: cfg.currency.clone(),
        })
    }

    fn secret(&self) -> Result<&str, PaymentError> {
        self.secret_key.as_deref().ok_or(PaymentError::NotConfigured)
    }
}

/// Checkout session object, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
    #[serde(default)]
    url: Option<String>,
    /// "paid", "unpaid" or "no_payment_required".
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Form-encoded body for `POST /v1/checkout/sessions`.
fn checkout_form_params(request: &CheckoutRequest, currency: &str) -> Vec<(String, String)> {
    vec![
        ("mode".into(), "payment".into()),
        ("payment_method_types[0]".into(), "card".into()),
        ("line_items[0][price_data][currency]".into(), currency.into()),
        (
            "line_items[0][price_data][product_data][name]".into(),
            request.category_name.clone(),
        ),
        (
            "line_items[0][price_data][product_data][description]".into(),
            "Race registration".into(),
        ),
        (
            "line_items[0][price_data][unit_amount]".into(),
            request.price_cents.to_string(),
        ),
        ("line_items[0][quantity]".into(), "1".into()),
        ("success_url".into(), request.success_url.clone()),
        ("cancel_url".into(), request.cancel_url.clone()),
        (
            "metadata[registration_id]".into(),
            request.registration_id.to_string(),
        ),
    ]
}

fn status_from_session(session: &SessionObject) -> PaymentStatus {
    let paid = session.payment_status.as_deref() == Some("paid");
    let registration_id = session
        .metadata
        .as_ref()
        .and_then(|m| m.get("registration_id"))
        .and_then(|v| v.parse().ok());

    PaymentStatus {
        paid,
        registration_id,
    }
}

async fn provider_error_detail(response: reqwest::Response) -> String {
    match response.json::<ApiError>().await {
        Ok(ApiError { error: Some(body) }) => body
            .message
            .unwrap_or_else(|| "no error message".to_owned()),
        _ => "no error message".to_owned(),
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let secret = self.secret()?;
        let params = checkout_form_params(&request, &self.currency);

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(secret)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = provider_error_detail(response).await;
            return Err(PaymentError::Provider(format!(
                "create session returned {status}: {detail}"
            )));
        }

        let session: SessionObject = response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        let url = session
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| PaymentError::InvalidResponse("session has no redirect url".into()))?;

        Ok(CheckoutSession {
            session_id: session.id,
            url,
        })
    }

    async fn verify_payment(&self, session_id: &str) -> Result<PaymentStatus, PaymentError> {
        let secret = self.secret()?;

        let response = self
            .client
            .get(format!(
                "{}/v1/checkout/sessions/{session_id}",
                self.api_base
            ))
            .bearer_auth(secret)
            .send()
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = provider_error_detail(response).await;
            return Err(PaymentError::Provider(format!(
                "retrieve session returned {status}: {detail}"
            )));
        }

        let session: SessionObject = response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        Ok(status_from_session(&session))
    }
}
