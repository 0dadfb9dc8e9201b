use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{race_category, race_edition, registration};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::edition::find_edition;
use crate::models::registration::*;
use crate::notify::NotificationEvent;
use crate::registration::service::{
    ConfirmOutcome, NewRegistration, PaymentStart, registration_service,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Registrations",
    operation_id = "createRegistration",
    summary = "Register for a race",
    description = "Creates a pending registration for a published edition with open registration. \
                   The returned ID is passed to the checkout endpoint to start payment.",
    request_body = CreateRegistrationRequest,
    responses(
        (status = 201, description = "Registration created", body = CreateRegistrationResponse),
        (status = 400, description = "Validation error or closed registration (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Edition or category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(edition_id = payload.edition_id, category_id = payload.category_id))]
pub async fn create_registration(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateRegistrationRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_registration(&payload)?;

    let edition = race_edition::Entity::find_by_id(payload.edition_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Edition {} not found", payload.edition_id)))?;

    if edition.status != race_edition::STATUS_PUBLISHED || !edition.registration_open {
        return Err(AppError::Validation(
            "Registration is closed for this edition".into(),
        ));
    }

    let category = race_category::Entity::find_by_id(payload.category_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", payload.category_id)))?;

    if category.edition_id != edition.id {
        return Err(AppError::Validation(
            "Category does not belong to this edition".into(),
        ));
    }

    let first_name = payload.first_name.trim().to_owned();
    let surname = payload.surname.trim().to_owned();
    let full_name = format!("{first_name} {surname}");

    let entry = registration_service(&state.db)
        .create(NewRegistration {
            edition_id: edition.id,
            category_id: category.id,
            first_name,
            surname,
            full_name,
            club: payload.club,
            email: payload.email.trim().to_ascii_lowercase(),
            phone: payload.phone,
            date_of_birth: payload.date_of_birth,
            gender: payload.gender.map(|g| g.to_ascii_lowercase()),
            tshirt_size: payload.tshirt_size,
            emergency_contact: payload.emergency_contact,
            emergency_phone: payload.emergency_phone,
        })
        .await?;

    state
        .notifier
        .notify(NotificationEvent::RegistrationCreated {
            full_name: entry.full_name.clone(),
            email: entry.email.clone(),
            phone: entry.phone.clone(),
            category_name: category.name,
            edition_title: edition.title,
            registration_id: entry.id,
            payment_status: entry.payment_status.clone(),
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(CreateRegistrationResponse { id: entry.id }),
    ))
}

#[utoipa::path(
    post,
    path = "/checkout",
    tag = "Registrations",
    operation_id = "startCheckout",
    summary = "Start payment for a registration",
    description = "Free categories complete the registration immediately. Paid categories return a \
                   hosted checkout URL to redirect the runner to.",
    request_body = StartCheckoutRequest,
    responses(
        (status = 200, description = "Checkout started", body = CheckoutResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Registration or category not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Payment provider rejected the request (PAYMENT_FAILED)", body = ErrorBody),
        (status = 503, description = "Payments are not configured (PAYMENT_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(registration_id = payload.registration_id))]
pub async fn start_checkout(
    State(state): State<AppState>,
    AppJson(payload): AppJson<StartCheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    validate_start_checkout(&payload)?;

    let start = registration_service(&state.db)
        .start_payment(
            state.payments.as_ref(),
            payload.registration_id,
            payload.category_id,
            &payload.success_url,
            &payload.cancel_url,
        )
        .await?;

    let response = match start {
        PaymentStart::Free => CheckoutResponse {
            free: true,
            session_id: None,
            url: None,
        },
        PaymentStart::Redirect { session_id, url } => CheckoutResponse {
            free: false,
            session_id: Some(session_id),
            url: Some(url),
        },
    };

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/verify",
    tag = "Registrations",
    operation_id = "verifyPayment",
    summary = "Verify a checkout session",
    description = "Checks the session with the payment provider and completes the matching \
                   registration when it is paid. Safe to call repeatedly from the success page.",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Verification result", body = VerifyPaymentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Session references an unknown registration (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Payment provider rejected the request (PAYMENT_FAILED)", body = ErrorBody),
        (status = 503, description = "Payments are not configured (PAYMENT_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(session_id = %payload.session_id))]
pub async fn verify_payment(
    State(state): State<AppState>,
    AppJson(payload): AppJson<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    validate_verify_payment(&payload)?;

    let outcome = registration_service(&state.db)
        .confirm_payment(state.payments.as_ref(), payload.session_id.trim())
        .await?;

    let response = match outcome {
        ConfirmOutcome::Confirmed(entry) => {
            notify_payment_confirmed(&state, &entry).await;
            VerifyPaymentResponse {
                paid: true,
                registration_id: Some(entry.id),
            }
        }
        ConfirmOutcome::AlreadyCompleted(registration_id) => VerifyPaymentResponse {
            paid: true,
            registration_id: Some(registration_id),
        },
        ConfirmOutcome::NotPaid => VerifyPaymentResponse {
            paid: false,
            registration_id: None,
        },
        ConfirmOutcome::Unmatched => VerifyPaymentResponse {
            paid: true,
            registration_id: None,
        },
    };

    Ok(Json(response))
}

/// Queue the confirmation email for a registration that just completed.
///
/// Runs only on the call that performed the transition, so retries of the
/// success page never send duplicates.
async fn notify_payment_confirmed(state: &AppState, entry: &registration::Model) {
    let category = match race_category::Entity::find_by_id(entry.category_id)
        .one(&state.db)
        .await
    {
        Ok(Some(category)) => category,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(error = %err, "failed to load category for confirmation notice");
            return;
        }
    };

    let edition = match race_edition::Entity::find_by_id(entry.edition_id)
        .one(&state.db)
        .await
    {
        Ok(Some(edition)) => edition,
        Ok(None) => return,
        Err(err) => {
            tracing::warn!(error = %err, "failed to load edition for confirmation notice");
            return;
        }
    };

    state
        .notifier
        .notify(NotificationEvent::PaymentConfirmed {
            full_name: entry.full_name.clone(),
            email: entry.email.clone(),
            category_name: category.name,
            edition_title: edition.title,
            amount_paid_cents: entry.amount_paid_cents,
        })
        .await;
}

#[utoipa::path(
    get,
    path = "/{id}/registrations",
    tag = "Registrations",
    operation_id = "listRegistrations",
    summary = "List registrations of an edition",
    params(("id" = i32, Path, description = "Edition ID")),
    responses(
        (status = 200, description = "Registrations, newest first", body = [RegistrationResponse]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Edition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(edition_id = id))]
pub async fn list_registrations_for_edition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<RegistrationResponse>>, AppError> {
    auth_user.require_admin()?;
    find_edition(&state.db, id).await?;

    let entries = registration::Entity::find()
        .filter(registration::Column::EditionId.eq(id))
        .order_by_desc(registration::Column::RegisteredAt)
        .order_by_desc(registration::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}/registrations/stats",
    tag = "Registrations",
    operation_id = "registrationStats",
    summary = "Registration counters for an edition",
    params(("id" = i32, Path, description = "Edition ID")),
    responses(
        (status = 200, description = "Counters", body = StatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Edition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(edition_id = id))]
pub async fn registration_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StatsResponse>, AppError> {
    auth_user.require_admin()?;
    find_edition(&state.db, id).await?;

    let stats = registration_service(&state.db).stats(id).await?;

    Ok(Json(stats.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}/bib",
    tag = "Registrations",
    operation_id = "assignBib",
    summary = "Assign a bib number",
    params(("id" = i32, Path, description = "Registration ID")),
    request_body = UpdateBibRequest,
    responses(
        (status = 200, description = "Updated registration", body = RegistrationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Registration not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(registration_id = id))]
pub async fn assign_bib(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateBibRequest>,
) -> Result<Json<RegistrationResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_bib(&payload)?;

    let entry = registration::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Registration {id} not found")))?;

    let mut active: registration::ActiveModel = entry.into();
    active.bib_number = Set(Some(payload.bib_number));
    let model = active.update(&state.db).await?;

    Ok(Json(model.into()))
}
