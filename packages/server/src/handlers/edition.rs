use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{gallery_image, race_category, race_edition, race_result, race_route, registration};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::edition::*;
use crate::state::AppState;

pub(crate) async fn find_edition<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<race_edition::Model, AppError> {
    race_edition::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Edition {id} not found")))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Editions",
    operation_id = "listEditions",
    summary = "List visible editions",
    description = "Returns published and completed editions, newest year first. Draft and archived editions are hidden.",
    responses(
        (status = 200, description = "Editions", body = [EditionResponse]),
    ),
)]
#[instrument(skip(state))]
pub async fn list_published_editions(
    State(state): State<AppState>,
) -> Result<Json<Vec<EditionResponse>>, AppError> {
    let editions = race_edition::Entity::find()
        .filter(race_edition::Column::Status.is_in(race_edition::PUBLIC_STATUSES))
        .order_by_desc(race_edition::Column::Year)
        .all(&state.db)
        .await?;

    Ok(Json(editions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/current",
    tag = "Editions",
    operation_id = "currentEdition",
    summary = "Latest visible edition",
    description = "Returns the visible edition with the highest year, or `null` when none exists yet.",
    responses(
        (status = 200, description = "Current edition, or null", body = EditionResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn current_edition(
    State(state): State<AppState>,
) -> Result<Json<Option<EditionResponse>>, AppError> {
    let edition = race_edition::Entity::find()
        .filter(race_edition::Column::Status.is_in(race_edition::PUBLIC_STATUSES))
        .order_by_desc(race_edition::Column::Year)
        .one(&state.db)
        .await?;

    Ok(Json(edition.map(Into::into)))
}

#[utoipa::path(
    get,
    path = "/all",
    tag = "Editions",
    operation_id = "listAllEditions",
    summary = "List all editions including drafts",
    responses(
        (status = 200, description = "All editions", body = [EditionResponse]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_all_editions(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EditionResponse>>, AppError> {
    auth_user.require_admin()?;

    let editions = race_edition::Entity::find()
        .order_by_desc(race_edition::Column::Year)
        .all(&state.db)
        .await?;

    Ok(Json(editions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Editions",
    operation_id = "getEdition",
    summary = "Get one edition by ID",
    params(("id" = i32, Path, description = "Edition ID")),
    responses(
        (status = 200, description = "Edition", body = EditionResponse),
        (status = 404, description = "Edition not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_edition(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EditionResponse>, AppError> {
    let edition = find_edition(&state.db, id).await?;
    Ok(Json(edition.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Editions",
    operation_id = "createEdition",
    summary = "Create an edition",
    description = "Creates an edition. Status defaults to `draft`, registration to open.",
    request_body = CreateEditionRequest,
    responses(
        (status = 201, description = "Edition created", body = EditionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(year = payload.year))]
pub async fn create_edition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateEditionRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_edition(&payload)?;

    let now = chrono::Utc::now();
    let new_edition = race_edition::ActiveModel {
        year: Set(payload.year),
        title: Set(payload.title.trim().to_owned()),
        date: Set(payload.date),
        description: Set(payload.description),
        location: Set(payload.location),
        status: Set(payload
            .status
            .unwrap_or_else(|| race_edition::STATUS_DRAFT.to_owned())),
        hero_image_url: Set(payload.hero_image_url),
        charity_name: Set(payload.charity_name),
        charity_description: Set(payload.charity_description),
        registration_open: Set(payload.registration_open.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_edition.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(EditionResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Editions",
    operation_id = "updateEdition",
    summary = "Update an edition",
    description = "Partially updates an edition. Omitted fields are left unchanged; nullable fields can be cleared with an explicit `null`.",
    params(("id" = i32, Path, description = "Edition ID")),
    request_body = UpdateEditionRequest,
    responses(
        (status = 200, description = "Updated edition", body = EditionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Edition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_edition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateEditionRequest>,
) -> Result<Json<EditionResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_edition(&payload)?;

    if payload == UpdateEditionRequest::default() {
        let edition = find_edition(&state.db, id).await?;
        return Ok(Json(edition.into()));
    }

    let txn = state.db.begin().await?;
    let edition = find_edition(&txn, id).await?;
    let mut active: race_edition::ActiveModel = edition.into();

    if let Some(year) = payload.year {
        active.year = Set(year);
    }
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_owned());
    }
    if let Some(date) = payload.date {
        active.date = Set(date);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(location) = payload.location {
        active.location = Set(location);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(hero_image_url) = payload.hero_image_url {
        active.hero_image_url = Set(hero_image_url);
    }
    if let Some(charity_name) = payload.charity_name {
        active.charity_name = Set(charity_name);
    }
    if let Some(charity_description) = payload.charity_description {
        active.charity_description = Set(charity_description);
    }
    if let Some(registration_open) = payload.registration_open {
        active.registration_open = Set(registration_open);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Editions",
    operation_id = "deleteEdition",
    summary = "Delete an edition",
    description = "Permanently deletes an edition together with its categories, routes, registrations, results and gallery images.",
    params(("id" = i32, Path, description = "Edition ID")),
    responses(
        (status = 204, description = "Edition deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Edition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_edition(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    find_edition(&txn, id).await?;

    race_result::Entity::delete_many()
        .filter(race_result::Column::EditionId.eq(id))
        .exec(&txn)
        .await?;

    gallery_image::Entity::delete_many()
        .filter(gallery_image::Column::EditionId.eq(id))
        .exec(&txn)
        .await?;

    registration::Entity::delete_many()
        .filter(registration::Column::EditionId.eq(id))
        .exec(&txn)
        .await?;

    race_route::Entity::delete_many()
        .filter(
            race_route::Column::CategoryId.in_subquery(
                SeaQuery::select()
                    .column(race_category::Column::Id)
                    .from(race_category::Entity)
                    .and_where(race_category::Column::EditionId.eq(id))
                    .to_owned(),
            ),
        )
        .exec(&txn)
        .await?;

    race_category::Entity::delete_many()
        .filter(race_category::Column::EditionId.eq(id))
        .exec(&txn)
        .await?;

    race_edition::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
