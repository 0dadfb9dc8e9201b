use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::NotifyConfig;

use super::{NotificationEvent, Notifier};

/// Sends organizer notifications through a Formspree form.
///
/// Formspree turns the JSON post into an email to the form's owner, so the
/// site needs no SMTP credentials of its own.
pub struct FormspreeNotifier {
    client: Client,
    form_id: Option<String>,
    endpoint: String,
}

impl FormspreeNotifier {
    pub fn from_config(cfg: &NotifyConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            form_id: cfg.form_id.clone(),
            endpoint: cfg.endpoint.trim_end_matches('/').to_owned(),
        })
    }
}

fn euros(cents: i32) -> String {
    format!("€{:.2}", f64::from(cents) / 100.0)
}

fn event_kind(event: &NotificationEvent) -> &'static str {
    match event {
        NotificationEvent::RegistrationCreated { .. } => "registration_created",
        NotificationEvent::PaymentConfirmed { .. } => "payment_confirmed",
    }
}

/// Form fields for one event. `subject` and `message` drive the email body,
/// the flat fields make the submission searchable in the Formspree inbox.
fn event_payload(event: &NotificationEvent) -> Value {
    match event {
        NotificationEvent::RegistrationCreated {
            full_name,
            email,
            phone,
            category_name,
            edition_title,
            registration_id,
            payment_status,
        } => {
            let message = format!(
                "New race registration received!\n\n\
                 Registration Details:\n\
                 - Name: {full_name}\n\
                 - Email: {email}\n\
                 - Phone: {}\n\
                 - Race: {edition_title}\n\
                 - Category: {category_name}\n\
                 - Registration ID: {registration_id}\n\
                 - Payment Status: {payment_status}\n\n\
                 View all registrations in the admin panel.",
                phone.as_deref().unwrap_or("Not provided"),
            );

            json!({
                "subject": format!("New Race Registration: {full_name}"),
                "message": message,
                "_replyto": email,
                "name": full_name,
                "email": email,
                "phone": phone.as_deref().unwrap_or(""),
                "category": category_name,
                "edition": edition_title,
                "registrationId": registration_id.to_string(),
                "paymentStatus": payment_status,
            })
        }
        NotificationEvent::PaymentConfirmed {
            full_name,
            email,
            category_name,
            edition_title,
            amount_paid_cents,
        } => {
            let message = format!(
                "Payment confirmation received!\n\n\
                 Payment Details:\n\
                 - Name: {full_name}\n\
                 - Email: {email}\n\
                 - Race: {edition_title}\n\
                 - Category: {category_name}\n\
                 - Amount Paid: {}\n\n\
                 The participant will receive their confirmation email shortly.",
                euros(*amount_paid_cents),
            );

            json!({
                "subject": format!("Payment Confirmed: {full_name}"),
                "message": message,
                "_replyto": email,
                "name": full_name,
                "email": email,
                "category": category_name,
                "edition": edition_title,
                "amount": euros(*amount_paid_cents),
            })
        }
    }
}

#[async_trait]
impl Notifier for FormspreeNotifier {
    async fn notify(&self, event: NotificationEvent) -> bool {
        let Some(form_id) = self.form_id.as_deref() else {
            tracing::warn!(
                kind = event_kind(&event),
                "notification skipped: relay form id is not configured"
            );
            return false;
        };

        let url = format!("{}/{form_id}", self.endpoint);
        let payload = event_payload(&event);

        match self.client.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(kind = event_kind(&event), "notification delivered");
                true
            }
            Ok(response) => {
                tracing::warn!(
                    kind = event_kind(&event),
                    status = %response.status(),
                    "notification relay rejected the request"
                );
                false
            }
            Err(e) => {
                tracing::warn!(kind = event_kind(&event), error = %e, "notification delivery failed");
                false
            }
        }
    }
}
