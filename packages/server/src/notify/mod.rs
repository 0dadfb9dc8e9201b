use async_trait::async_trait;

pub mod formspree;

pub use formspree::FormspreeNotifier;

/// Events the site reports to the organizers' inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    RegistrationCreated {
        full_name: String,
        email: String,
        phone: Option<String>,
        category_name: String,
        edition_title: String,
        registration_id: i32,
        payment_status: String,
    },
    PaymentConfirmed {
        full_name: String,
        email: String,
        category_name: String,
        edition_title: String,
        amount_paid_cents: i32,
    },
}

/// Best-effort notification sink.
///
/// `notify` never fails the calling workflow: it returns `false` when delivery
/// was skipped or failed and the details have already been logged.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: NotificationEvent) -> bool;
}
