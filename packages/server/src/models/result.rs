use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::race_result;
use crate::error::AppError;

use super::shared::{validate_optional_text, validate_required_text};

/// Admin body for adding a single result row.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateResultRequest {
    pub edition_id: i32,
    pub category_id: i32,
    /// Matched registration, when the timing data could be linked to an entry.
    pub registration_id: Option<i32>,
    pub participant_name: String,
    pub bib_number: Option<i32>,
    pub finish_time: Option<String>,
    pub position: i32,
    pub gender: Option<String>,
    pub age_category: Option<String>,
}

pub fn validate_create_result(req: &CreateResultRequest) -> Result<(), AppError> {
    validate_required_text(&req.participant_name, "Participant name")?;
    validate_optional_text(req.finish_time.as_deref(), "Finish time")?;
    validate_optional_text(req.age_category.as_deref(), "Age category")?;
    if req.position < 1 {
        return Err(AppError::Validation("Position must be >= 1".into()));
    }
    if let Some(bib) = req.bib_number
        && bib < 1
    {
        return Err(AppError::Validation("Bib number must be >= 1".into()));
    }
    Ok(())
}

/// One pre-parsed row in a bulk import request.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ResultRowInput {
    pub participant_name: String,
    pub bib_number: Option<i32>,
    pub finish_time: Option<String>,
    /// Finish position. Omitted rows get their 1-based order in the array.
    pub position: Option<i32>,
    pub gender: Option<String>,
    pub age_category: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct BulkCreateResultsRequest {
    pub edition_id: i32,
    pub category_id: i32,
    pub results: Vec<ResultRowInput>,
}

pub fn validate_bulk_results(req: &BulkCreateResultsRequest) -> Result<(), AppError> {
    if req.results.is_empty() {
        return Err(AppError::Validation("results must not be empty".into()));
    }
    for (index, row) in req.results.iter().enumerate() {
        if row.participant_name.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "row {}: participant name is empty",
                index + 1
            )));
        }
        if let Some(position) = row.position
            && position < 1
        {
            return Err(AppError::Validation(format!(
                "row {}: position must be >= 1",
                index + 1
            )));
        }
    }
    Ok(())
}

/// Optional filter for listing an edition's results.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ResultListQuery {
    pub category_id: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ResultResponse {
    pub id: i32,
    pub edition_id: i32,
    pub category_id: i32,
    pub registration_id: Option<i32>,
    pub participant_name: String,
    pub bib_number: Option<i32>,
    pub finish_time: Option<String>,
    pub position: i32,
    pub gender: Option<String>,
    pub age_category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<race_result::Model> for ResultResponse {
    fn from(m: race_result::Model) -> Self {
        Self {
            id: m.id,
            edition_id: m.edition_id,
            category_id: m.category_id,
            registration_id: m.registration_id,
            participant_name: m.participant_name,
            bib_number: m.bib_number,
            finish_time: m.finish_time,
            position: m.position,
            gender: m.gender,
            age_category: m.age_category,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BulkCreateResponse {
    pub created: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResultsResponse {
    pub created: usize,
    pub results: Vec<ResultResponse>,
}
