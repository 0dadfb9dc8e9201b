use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{race_category, race_result, race_route, registration};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::edition::find_edition;
use crate::models::category::*;
use crate::state::AppState;

pub(crate) async fn find_category<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<race_category::Model, AppError> {
    race_category::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))
}

#[utoipa::path(
    get,
    path = "/{id}/categories",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List categories of an edition",
    description = "Returns the edition's categories in display order. Unknown editions yield an empty list.",
    params(("id" = i32, Path, description = "Edition ID")),
    responses(
        (status = 200, description = "Categories", body = [CategoryResponse]),
    ),
)]
#[instrument(skip(state), fields(edition_id = id))]
pub async fn list_categories_for_edition(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = race_category::Entity::find()
        .filter(race_category::Column::EditionId.eq(id))
        .order_by_asc(race_category::Column::SortOrder)
        .order_by_asc(race_category::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Edition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(edition_id = payload.edition_id))]
pub async fn create_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_category(&payload)?;
    find_edition(&state.db, payload.edition_id).await?;

    let new_category = race_category::ActiveModel {
        edition_id: Set(payload.edition_id),
        name: Set(payload.name.trim().to_owned()),
        distance: Set(payload.distance.trim().to_owned()),
        description: Set(payload.description),
        price_cents: Set(payload.price_cents),
        age_group: Set(payload.age_group),
        start_time: Set(payload.start_time),
        max_participants: Set(payload.max_participants),
        sort_order: Set(payload.sort_order.unwrap_or(0)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_category.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Categories",
    operation_id = "updateCategory",
    summary = "Update a category",
    description = "Partially updates a category. Omitted fields are left unchanged; nullable fields can be cleared with an explicit `null`.",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_category(&payload)?;

    if payload == UpdateCategoryRequest::default() {
        let category = find_category(&state.db, id).await?;
        return Ok(Json(category.into()));
    }

    let txn = state.db.begin().await?;
    let category = find_category(&txn, id).await?;
    let mut active: race_category::ActiveModel = category.into();

    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_owned());
    }
    if let Some(distance) = payload.distance {
        active.distance = Set(distance.trim().to_owned());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price_cents) = payload.price_cents {
        active.price_cents = Set(price_cents);
    }
    if let Some(age_group) = payload.age_group {
        active.age_group = Set(age_group);
    }
    if let Some(start_time) = payload.start_time {
        active.start_time = Set(start_time);
    }
    if let Some(max_participants) = payload.max_participants {
        active.max_participants = Set(max_participants);
    }
    if let Some(sort_order) = payload.sort_order {
        active.sort_order = Set(sort_order);
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Categories",
    operation_id = "deleteCategory",
    summary = "Delete a category",
    description = "Deletes a category together with its route and results. Refused while registrations reference it.",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Category still has registrations (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    find_category(&txn, id).await?;

    let registered = registration::Entity::find()
        .filter(registration::Column::CategoryId.eq(id))
        .count(&txn)
        .await?;
    if registered > 0 {
        return Err(AppError::Conflict(format!(
            "Category {id} has {registered} registrations and cannot be deleted"
        )));
    }

    race_route::Entity::delete_many()
        .filter(race_route::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;

    race_result::Entity::delete_many()
        .filter(race_result::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;

    race_category::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/route",
    tag = "Categories",
    operation_id = "getRoute",
    summary = "Get the route of a category",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Route details", body = RouteResponse),
        (status = 404, description = "No route set for this category (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(category_id = id))]
pub async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RouteResponse>, AppError> {
    let route = race_route::Entity::find()
        .filter(race_route::Column::CategoryId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No route set for category {id}")))?;

    Ok(Json(route.into()))
}

#[utoipa::path(
    put,
    path = "/{id}/route",
    tag = "Categories",
    operation_id = "upsertRoute",
    summary = "Create or replace the route of a category",
    description = "Each category holds at most one route. An existing route is replaced in full.",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpsertRouteRequest,
    responses(
        (status = 200, description = "Route stored", body = RouteResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(category_id = id))]
pub async fn upsert_route(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpsertRouteRequest>,
) -> Result<Json<RouteResponse>, AppError> {
    auth_user.require_admin()?;
    validate_upsert_route(&payload)?;

    let txn = state.db.begin().await?;
    find_category(&txn, id).await?;

    let existing = race_route::Entity::find()
        .filter(race_route::Column::CategoryId.eq(id))
        .one(&txn)
        .await?;

    let model = match existing {
        Some(route) => {
            let mut active: race_route::ActiveModel = route.into();
            active.name = Set(payload.name.trim().to_owned());
            active.distance = Set(payload.distance);
            active.gpx_file_url = Set(payload.gpx_file_url);
            active.map_image_url = Set(payload.map_image_url);
            active.elevation_gain = Set(payload.elevation_gain);
            active.description = Set(payload.description);
            active.update(&txn).await?
        }
        None => {
            race_route::ActiveModel {
                category_id: Set(id),
                name: Set(payload.name.trim().to_owned()),
                distance: Set(payload.distance),
                gpx_file_url: Set(payload.gpx_file_url),
                map_image_url: Set(payload.map_image_url),
                elevation_gain: Set(payload.elevation_gain),
                description: Set(payload.description),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;
    Ok(Json(model.into()))
}
