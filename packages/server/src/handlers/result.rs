use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{race_result, registration};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::category::find_category;
use crate::handlers::edition::find_edition;
use crate::import::parse_results;
use crate::models::result::*;
use crate::state::AppState;

/// Body limit for results CSV uploads.
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(4 * 1024 * 1024) // 4 MB
}

#[utoipa::path(
    get,
    path = "/{id}/results",
    tag = "Results",
    operation_id = "listResults",
    summary = "List results of an edition",
    description = "Returns finish results ordered by category and position. Unknown editions yield an empty list.",
    params(
        ("id" = i32, Path, description = "Edition ID"),
        ResultListQuery,
    ),
    responses(
        (status = 200, description = "Results", body = [ResultResponse]),
    ),
)]
#[instrument(skip(state), fields(edition_id = id))]
pub async fn list_results_for_edition(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<ResultListQuery>,
) -> Result<Json<Vec<ResultResponse>>, AppError> {
    let mut select = race_result::Entity::find().filter(race_result::Column::EditionId.eq(id));

    if let Some(category_id) = query.category_id {
        select = select.filter(race_result::Column::CategoryId.eq(category_id));
    }

    let results = select
        .order_by_asc(race_result::Column::CategoryId)
        .order_by_asc(race_result::Column::Position)
        .all(&state.db)
        .await?;

    Ok(Json(results.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Results",
    operation_id = "createResult",
    summary = "Record a single result",
    request_body = CreateResultRequest,
    responses(
        (status = 201, description = "Result recorded", body = ResultResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Edition, category or registration not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(edition_id = payload.edition_id))]
pub async fn create_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_result(&payload)?;

    find_edition(&state.db, payload.edition_id).await?;
    let category = find_category(&state.db, payload.category_id).await?;
    if category.edition_id != payload.edition_id {
        return Err(AppError::Validation(
            "Category does not belong to this edition".into(),
        ));
    }

    if let Some(registration_id) = payload.registration_id {
        registration::Entity::find_by_id(registration_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Registration {registration_id} not found"))
            })?;
    }

    let new_result = race_result::ActiveModel {
        edition_id: Set(payload.edition_id),
        category_id: Set(payload.category_id),
        registration_id: Set(payload.registration_id),
        participant_name: Set(payload.participant_name.trim().to_owned()),
        bib_number: Set(payload.bib_number),
        finish_time: Set(payload.finish_time),
        position: Set(payload.position),
        gender: Set(payload.gender.map(|g| g.to_ascii_lowercase())),
        age_category: Set(payload.age_category),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_result.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(ResultResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/bulk",
    tag = "Results",
    operation_id = "bulkCreateResults",
    summary = "Record many results at once",
    description = "Inserts a batch of results for one category in a single transaction. Rows without \
                   an explicit position are placed by their order in the batch.",
    request_body = BulkCreateResultsRequest,
    responses(
        (status = 201, description = "Results recorded", body = BulkCreateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Edition or category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(edition_id = payload.edition_id, rows = payload.results.len()))]
pub async fn bulk_create_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<BulkCreateResultsRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_bulk_results(&payload)?;

    let txn = state.db.begin().await?;
    find_edition(&txn, payload.edition_id).await?;
    let category = find_category(&txn, payload.category_id).await?;
    if category.edition_id != payload.edition_id {
        return Err(AppError::Validation(
            "Category does not belong to this edition".into(),
        ));
    }

    let now = chrono::Utc::now();
    let mut created = 0;

    for (index, row) in payload.results.into_iter().enumerate() {
        let new_result = race_result::ActiveModel {
            edition_id: Set(payload.edition_id),
            category_id: Set(payload.category_id),
            registration_id: Set(None),
            participant_name: Set(row.participant_name.trim().to_owned()),
            bib_number: Set(row.bib_number),
            finish_time: Set(row.finish_time),
            position: Set(row.position.unwrap_or((index + 1) as i32)),
            gender: Set(row.gender.map(|g| g.to_ascii_lowercase())),
            age_category: Set(row.age_category),
            created_at: Set(now),
            ..Default::default()
        };
        new_result.insert(&txn).await?;
        created += 1;
    }

    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(BulkCreateResponse { created })))
}

#[utoipa::path(
    post,
    path = "/{id}/results/upload",
    tag = "Results",
    operation_id = "uploadResults",
    summary = "Upload results from a CSV file",
    description = "Bulk-creates results for one category from a timing CSV. The form carries a \
                   `category_id` field and a `file` field. Header names are matched \
                   case-insensitively; a `name` column is required. The file is rejected as a \
                   whole when any row is invalid. Body limit: 4 MB.",
    params(("id" = i32, Path, description = "Edition ID")),
    request_body(content_type = "multipart/form-data", description = "CSV file plus target category"),
    responses(
        (status = 201, description = "Results uploaded", body = UploadResultsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Edition or category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(edition_id = id))]
pub async fn upload_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    let mut category_id: Option<i32> = None;
    let mut csv_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("category_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read category_id: {e}")))?;
                let parsed = text.trim().parse::<i32>().map_err(|_| {
                    AppError::Validation("category_id must be an integer".into())
                })?;
                category_id = Some(parsed);
            }
            Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                csv_bytes = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let category_id =
        category_id.ok_or_else(|| AppError::Validation("Missing 'category_id' field".into()))?;
    let csv_bytes = csv_bytes.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    let csv_text = String::from_utf8(csv_bytes)
        .map_err(|_| AppError::Validation("File must be UTF-8 encoded text".into()))?;

    let rows = parse_results(&csv_text).map_err(|e| AppError::Validation(e.to_string()))?;

    let txn = state.db.begin().await?;
    find_edition(&txn, id).await?;
    let category = find_category(&txn, category_id).await?;
    if category.edition_id != id {
        return Err(AppError::Validation(
            "Category does not belong to this edition".into(),
        ));
    }

    let now = chrono::Utc::now();
    let mut created = Vec::with_capacity(rows.len());

    for row in rows {
        let new_result = race_result::ActiveModel {
            edition_id: Set(id),
            category_id: Set(category.id),
            registration_id: Set(None),
            participant_name: Set(row.participant_name),
            bib_number: Set(row.bib_number),
            finish_time: Set(row.finish_time),
            position: Set(row.position),
            gender: Set(row.gender),
            age_category: Set(row.age_category),
            created_at: Set(now),
            ..Default::default()
        };
        let model = new_result.insert(&txn).await?;
        created.push(model);
    }

    txn.commit().await?;

    let results: Vec<ResultResponse> = created.into_iter().map(Into::into).collect();

    Ok((
        StatusCode::CREATED,
        Json(UploadResultsResponse {
            created: results.len(),
            results,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Results",
    operation_id = "deleteResult",
    summary = "Delete a result",
    params(("id" = i32, Path, description = "Result ID")),
    responses(
        (status = 204, description = "Result deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Result not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    race_result::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Result {id} not found")))?;

    race_result::Entity::delete_by_id(id).exec(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}
