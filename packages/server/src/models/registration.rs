use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::registration;
use crate::error::AppError;
use crate::registration::service::RegistrationStats;

use super::shared::{
    validate_email, validate_http_url, validate_optional_text, validate_required_text,
};

const GENDERS: [&str; 3] = ["male", "female", "other"];

/// Public registration form body.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateRegistrationRequest {
    pub edition_id: i32,
    pub category_id: i32,
    pub first_name: String,
    pub surname: String,
    pub club: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    /// ISO 8601 date (YYYY-MM-DD).
    pub date_of_birth: Option<NaiveDate>,
    /// One of: male, female, other.
    pub gender: Option<String>,
    pub tshirt_size: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
}

pub fn validate_create_registration(req: &CreateRegistrationRequest) -> Result<(), AppError> {
    validate_required_text(&req.first_name, "First name")?;
    validate_required_text(&req.surname, "Surname")?;
    validate_email(&req.email)?;
    validate_optional_text(req.club.as_deref(), "Club")?;
    validate_optional_text(req.phone.as_deref(), "Phone")?;
    validate_optional_text(req.tshirt_size.as_deref(), "T-shirt size")?;
    validate_optional_text(req.emergency_contact.as_deref(), "Emergency contact")?;
    validate_optional_text(req.emergency_phone.as_deref(), "Emergency phone")?;
    if let Some(ref gender) = req.gender
        && !GENDERS.contains(&gender.to_ascii_lowercase().as_str())
    {
        return Err(AppError::Validation(
            "Gender must be one of: male, female, other".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateRegistrationResponse {
    /// ID of the new pending registration. Needed to start checkout.
    #[schema(example = 19)]
    pub id: i32,
}

/// Body for starting payment on an existing registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct StartCheckoutRequest {
    pub registration_id: i32,
    pub category_id: i32,
    /// Where the hosted checkout sends the runner after paying.
    pub success_url: String,
    /// Where the hosted checkout sends the runner on cancel.
    pub cancel_url: String,
}

pub fn validate_start_checkout(req: &StartCheckoutRequest) -> Result<(), AppError> {
    validate_http_url(&req.success_url, "success_url")?;
    validate_http_url(&req.cancel_url, "cancel_url")?;
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CheckoutResponse {
    /// True when the category is free and the registration completed
    /// without a checkout session.
    pub free: bool,
    pub session_id: Option<String>,
    /// Hosted checkout URL to redirect the runner to. Unset for free entries.
    pub url: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct VerifyPaymentRequest {
    pub session_id: String,
}

pub fn validate_verify_payment(req: &VerifyPaymentRequest) -> Result<(), AppError> {
    if req.session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id must not be empty".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VerifyPaymentResponse {
    pub paid: bool,
    pub registration_id: Option<i32>,
}

/// Admin view of one registration row.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegistrationResponse {
    pub id: i32,
    pub edition_id: i32,
    pub category_id: i32,
    pub first_name: String,
    pub surname: String,
    pub full_name: String,
    pub club: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub tshirt_size: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub payment_status: String,
    pub amount_paid_cents: i32,
    pub checkout_session_id: Option<String>,
    pub bib_number: Option<i32>,
    pub registered_at: DateTime<Utc>,
}

impl From<registration::Model> for RegistrationResponse {
    fn from(m: registration::Model) -> Self {
        Self {
            id: m.id,
            edition_id: m.edition_id,
            category_id: m.category_id,
            first_name: m.first_name,
            surname: m.surname,
            full_name: m.full_name,
            club: m.club,
            email: m.email,
            phone: m.phone,
            date_of_birth: m.date_of_birth,
            gender: m.gender,
            tshirt_size: m.tshirt_size,
            emergency_contact: m.emergency_contact,
            emergency_phone: m.emergency_phone,
            payment_status: m.payment_status,
            amount_paid_cents: m.amount_paid_cents,
            checkout_session_id: m.checkout_session_id,
            bib_number: m.bib_number,
            registered_at: m.registered_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateBibRequest {
    pub bib_number: i32,
}

pub fn validate_update_bib(req: &UpdateBibRequest) -> Result<(), AppError> {
    if req.bib_number < 1 {
        return Err(AppError::Validation("Bib number must be >= 1".into()));
    }
    Ok(())
}

/// Registration counters for one edition.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub total: u64,
    pub paid: u64,
    pub pending: u64,
}

impl From<RegistrationStats> for StatsResponse {
    fn from(s: RegistrationStats) -> Self {
        Self {
            total: s.total,
            paid: s.paid,
            pending: s.pending,
        }
    }
}
