use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{content_page, gallery_image};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::edition::find_edition;
use crate::models::content::*;
use crate::state::AppState;

async fn find_page_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
) -> Result<content_page::Model, AppError> {
    content_page::Entity::find()
        .filter(content_page::Column::Slug.eq(slug))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Page '{slug}' not found")))
}

#[utoipa::path(
    get,
    path = "/pages",
    tag = "Content",
    operation_id = "listPages",
    summary = "List all content pages",
    description = "Returns every page including drafts, for the admin editor.",
    responses(
        (status = 200, description = "Pages", body = [PageResponse]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_pages(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PageResponse>>, AppError> {
    auth_user.require_admin()?;

    let pages = content_page::Entity::find()
        .order_by_asc(content_page::Column::Slug)
        .all(&state.db)
        .await?;

    Ok(Json(pages.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/pages/{slug}",
    tag = "Content",
    operation_id = "getPage",
    summary = "Get a published page by slug",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 200, description = "Page", body = PageResponse),
        (status = 404, description = "No published page under this slug (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(slug = %slug))]
pub async fn get_published_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PageResponse>, AppError> {
    let page = content_page::Entity::find()
        .filter(content_page::Column::Slug.eq(slug.as_str()))
        .filter(content_page::Column::Status.eq(content_page::STATUS_PUBLISHED))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Page '{slug}' not found")))?;

    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/pages",
    tag = "Content",
    operation_id = "createPage",
    summary = "Create a content page",
    description = "Creates a Markdown page under a unique slug. Status defaults to `draft`.",
    request_body = CreatePageRequest,
    responses(
        (status = 201, description = "Page created", body = PageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Slug is already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(slug = %payload.slug))]
pub async fn create_page(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePageRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_page(&payload)?;

    let now = chrono::Utc::now();
    let new_page = content_page::ActiveModel {
        slug: Set(payload.slug.clone()),
        title: Set(payload.title.trim().to_owned()),
        content: Set(payload.content),
        status: Set(payload
            .status
            .unwrap_or_else(|| content_page::STATUS_DRAFT.to_owned())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_page.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(format!("Slug '{}' is already in use", payload.slug))
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(PageResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/pages/{slug}",
    tag = "Content",
    operation_id = "updatePage",
    summary = "Update a content page",
    description = "Partially updates a page. The slug itself can be changed; the new slug must be free.",
    params(("slug" = String, Path, description = "Page slug")),
    request_body = UpdatePageRequest,
    responses(
        (status = 200, description = "Updated page", body = PageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Page not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "New slug is already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(slug = %slug))]
pub async fn update_page(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    AppJson(payload): AppJson<UpdatePageRequest>,
) -> Result<Json<PageResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_page(&payload)?;

    if payload == UpdatePageRequest::default() {
        let page = find_page_by_slug(&state.db, &slug).await?;
        return Ok(Json(page.into()));
    }

    let txn = state.db.begin().await?;
    let page = find_page_by_slug(&txn, &slug).await?;
    let mut active: content_page::ActiveModel = page.into();

    let mut new_slug = slug.clone();
    if let Some(updated) = payload.slug {
        new_slug = updated.clone();
        active.slug = Set(updated);
    }
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_owned());
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(format!("Slug '{new_slug}' is already in use"))
        }
        _ => AppError::from(e),
    })?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/pages/{slug}",
    tag = "Content",
    operation_id = "deletePage",
    summary = "Delete a content page",
    params(("slug" = String, Path, description = "Page slug")),
    responses(
        (status = 204, description = "Page deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Page not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(slug = %slug))]
pub async fn delete_page(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    let page = find_page_by_slug(&state.db, &slug).await?;
    content_page::Entity::delete_by_id(page.id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/gallery",
    tag = "Gallery",
    operation_id = "listGallery",
    summary = "List gallery images of an edition",
    description = "Returns the edition's photos in display order. Unknown editions yield an empty list.",
    params(("id" = i32, Path, description = "Edition ID")),
    responses(
        (status = 200, description = "Gallery images", body = [GalleryImageResponse]),
    ),
)]
#[instrument(skip(state), fields(edition_id = id))]
pub async fn list_gallery_for_edition(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<GalleryImageResponse>>, AppError> {
    let images = gallery_image::Entity::find()
        .filter(gallery_image::Column::EditionId.eq(id))
        .order_by_asc(gallery_image::Column::SortOrder)
        .order_by_asc(gallery_image::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(images.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Gallery",
    operation_id = "addGalleryImage",
    summary = "Add a gallery image",
    request_body = AddGalleryImageRequest,
    responses(
        (status = 201, description = "Image added", body = GalleryImageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Edition not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(edition_id = payload.edition_id))]
pub async fn add_gallery_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<AddGalleryImageRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_add_gallery_image(&payload)?;
    find_edition(&state.db, payload.edition_id).await?;

    let new_image = gallery_image::ActiveModel {
        edition_id: Set(payload.edition_id),
        image_url: Set(payload.image_url),
        caption: Set(payload.caption),
        sort_order: Set(payload.sort_order.unwrap_or(0)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_image.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(GalleryImageResponse::from(model))))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Gallery",
    operation_id = "deleteGalleryImage",
    summary = "Delete a gallery image",
    params(("id" = i32, Path, description = "Gallery image ID")),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_gallery_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    gallery_image::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Gallery image {id} not found")))?;

    gallery_image::Entity::delete_by_id(id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
