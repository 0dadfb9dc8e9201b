use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, sea_query::Expr,
};

use crate::entity::{race_category, registration};
use crate::payments::{CheckoutRequest, PaymentError, PaymentGateway};

/// Failure modes of the checkout workflow.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("registration {0} not found")]
    RegistrationNotFound(i32),
    #[error("category {0} not found")]
    CategoryNotFound(i32),
    #[error("category does not match this registration")]
    CategoryMismatch,
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// How a payment attempt for a registration begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStart {
    /// Free category. The registration is completed on the spot and no
    /// checkout session exists.
    Free,
    /// Paid category. The client must follow `url` to the hosted checkout.
    Redirect { session_id: String, url: String },
}

/// Outcome of verifying a checkout session against the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// This call transitioned the registration from pending to completed.
    Confirmed(registration::Model),
    /// The registration was already completed by an earlier verify call.
    AlreadyCompleted(i32),
    /// The provider reports the session as not paid. Nothing changed.
    NotPaid,
    /// Paid, but the session carries no usable registration reference.
    Unmatched,
}

/// Per-edition registration counters for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationStats {
    pub total: u64,
    pub paid: u64,
    pub pending: u64,
}

/// A new entry as accepted from the public registration form.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub edition_id: i32,
    pub category_id: i32,
    pub first_name: String,
    pub surname: String,
    pub full_name: String,
    pub club: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub gender: Option<String>,
    pub tshirt_size: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
}

/// Registration lifecycle: create, start payment, settle payment.
///
/// Status changes go through guarded updates filtered on the current status,
/// so concurrent verify calls for the same session settle the row exactly
/// once no matter how often the success page retries.
pub struct RegistrationService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> RegistrationService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a pending registration.
    pub async fn create(&self, input: NewRegistration) -> Result<registration::Model, DbErr> {
        let model = registration::ActiveModel {
            edition_id: Set(input.edition_id),
            category_id: Set(input.category_id),
            first_name: Set(input.first_name),
            surname: Set(input.surname),
            full_name: Set(input.full_name),
            club: Set(input.club),
            email: Set(input.email),
            phone: Set(input.phone),
            date_of_birth: Set(input.date_of_birth),
            gender: Set(input.gender),
            tshirt_size: Set(input.tshirt_size),
            emergency_contact: Set(input.emergency_contact),
            emergency_phone: Set(input.emergency_phone),
            payment_status: Set(registration::STATUS_PENDING.to_owned()),
            amount_paid_cents: Set(0),
            registered_at: Set(Utc::now()),
            ..Default::default()
        };

        model.insert(self.conn).await
    }

    /// Begin payment for a registration.
    ///
    /// Free categories (no price, or a price of zero) complete immediately
    /// without touching the gateway. Paid categories get a checkout session
    /// whose id is stored on the row for later correlation.
    pub async fn start_payment(
        &self,
        gateway: &dyn PaymentGateway,
        registration_id: i32,
        category_id: i32,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<PaymentStart, CheckoutError> {
        let entry = registration::Entity::find_by_id(registration_id)
            .one(self.conn)
            .await?
            .ok_or(CheckoutError::RegistrationNotFound(registration_id))?;

        if entry.category_id != category_id {
            return Err(CheckoutError::CategoryMismatch);
        }

        let category = race_category::Entity::find_by_id(category_id)
            .one(self.conn)
            .await?
            .ok_or(CheckoutError::CategoryNotFound(category_id))?;

        let price_cents = category.price_cents.unwrap_or(0);
        if price_cents <= 0 {
            self.complete_if_pending(registration_id, 0).await?;
            tracing::info!(registration_id, "free registration completed");
            return Ok(PaymentStart::Free);
        }

        let session = gateway
            .create_checkout_session(CheckoutRequest {
                registration_id,
                category_name: category.name,
                price_cents,
                success_url: success_url.to_owned(),
                cancel_url: cancel_url.to_owned(),
            })
            .await?;

        registration::Entity::update_many()
            .col_expr(
                registration::Column::CheckoutSessionId,
                Expr::value(session.session_id.clone()),
            )
            .filter(registration::Column::Id.eq(registration_id))
            .exec(self.conn)
            .await?;

        tracing::info!(registration_id, session_id = %session.session_id, "checkout session created");

        Ok(PaymentStart::Redirect {
            session_id: session.session_id,
            url: session.url,
        })
    }

    /// Settle a registration from the state of its checkout session.
    ///
    /// Safe to call any number of times for the same session: only the first
    /// call that sees a paid session performs the transition.
    pub async fn confirm_payment(
        &self,
        gateway: &dyn PaymentGateway,
        session_id: &str,
    ) -> Result<ConfirmOutcome, CheckoutError> {
        let status = gateway.verify_payment(session_id).await?;

        if !status.paid {
            return Ok(ConfirmOutcome::NotPaid);
        }

        let Some(registration_id) = status.registration_id else {
            tracing::warn!(session_id, "paid session has no registration reference");
            return Ok(ConfirmOutcome::Unmatched);
        };

        let entry = registration::Entity::find_by_id(registration_id)
            .one(self.conn)
            .await?
            .ok_or(CheckoutError::RegistrationNotFound(registration_id))?;

        let category = race_category::Entity::find_by_id(entry.category_id)
            .one(self.conn)
            .await?
            .ok_or(CheckoutError::CategoryNotFound(entry.category_id))?;

        let amount_cents = category.price_cents.unwrap_or(0);
        if !self.complete_if_pending(registration_id, amount_cents).await? {
            return Ok(ConfirmOutcome::AlreadyCompleted(registration_id));
        }

        tracing::info!(registration_id, session_id, "payment confirmed");

        let confirmed = registration::Entity::find_by_id(registration_id)
            .one(self.conn)
            .await?
            .ok_or(CheckoutError::RegistrationNotFound(registration_id))?;

        Ok(ConfirmOutcome::Confirmed(confirmed))
    }

    /// Guarded pending-to-completed transition. Returns whether this call
    /// performed it.
    async fn complete_if_pending(
        &self,
        registration_id: i32,
        amount_paid_cents: i32,
    ) -> Result<bool, DbErr> {
        let update_result = registration::Entity::update_many()
            .col_expr(
                registration::Column::PaymentStatus,
                Expr::value(registration::STATUS_COMPLETED),
            )
            .col_expr(
                registration::Column::AmountPaidCents,
                Expr::value(amount_paid_cents),
            )
            .filter(registration::Column::Id.eq(registration_id))
            .filter(registration::Column::PaymentStatus.eq(registration::STATUS_PENDING))
            .exec(self.conn)
            .await?;

        Ok(update_result.rows_affected > 0)
    }

    /// Registration counters for one edition.
    pub async fn stats(&self, edition_id: i32) -> Result<RegistrationStats, DbErr> {
        let statuses: Vec<String> = registration::Entity::find()
            .select_only()
            .column(registration::Column::PaymentStatus)
            .filter(registration::Column::EditionId.eq(edition_id))
            .into_tuple()
            .all(self.conn)
            .await?;

        let mut stats = RegistrationStats {
            total: statuses.len() as u64,
            paid: 0,
            pending: 0,
        };

        for status in statuses {
            match status.as_str() {
                registration::STATUS_COMPLETED => stats.paid += 1,
                registration::STATUS_PENDING => stats.pending += 1,
                _ => {}
            }
        }

        Ok(stats)
    }
}

/// Create a RegistrationService with a DatabaseConnection.
pub fn registration_service(db: &DatabaseConnection) -> RegistrationService<'_, DatabaseConnection> {
    RegistrationService::new(db)
}
