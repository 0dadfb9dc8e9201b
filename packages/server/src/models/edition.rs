use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::race_edition;
use crate::error::AppError;

use super::shared::{double_option, validate_optional_text, validate_required_text};

const EDITION_STATUSES: [&str; 4] = [
    race_edition::STATUS_DRAFT,
    race_edition::STATUS_PUBLISHED,
    race_edition::STATUS_COMPLETED,
    race_edition::STATUS_ARCHIVED,
];

pub fn validate_edition_status(status: &str) -> Result<(), AppError> {
    if !EDITION_STATUSES.contains(&status) {
        return Err(AppError::Validation(
            "Status must be one of: draft, published, completed, archived".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateEditionRequest {
    pub year: i32,
    pub title: String,
    /// Race day as an RFC 3339 timestamp.
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Defaults to `draft` when omitted.
    pub status: Option<String>,
    pub hero_image_url: Option<String>,
    pub charity_name: Option<String>,
    pub charity_description: Option<String>,
    /// Defaults to `true` when omitted.
    pub registration_open: Option<bool>,
}

pub fn validate_create_edition(req: &CreateEditionRequest) -> Result<(), AppError> {
    if !(2000..=2100).contains(&req.year) {
        return Err(AppError::Validation("Year must be 2000-2100".into()));
    }
    validate_required_text(&req.title, "Title")?;
    validate_optional_text(req.location.as_deref(), "Location")?;
    validate_optional_text(req.charity_name.as_deref(), "Charity name")?;
    if let Some(ref status) = req.status {
        validate_edition_status(status)?;
    }
    Ok(())
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateEditionRequest {
    pub year: Option<i32>,
    pub title: Option<String>,
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub hero_image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub charity_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub charity_description: Option<Option<String>>,
    pub registration_open: Option<bool>,
}

pub fn validate_update_edition(req: &UpdateEditionRequest) -> Result<(), AppError> {
    if let Some(year) = req.year
        && !(2000..=2100).contains(&year)
    {
        return Err(AppError::Validation("Year must be 2000-2100".into()));
    }
    if let Some(ref title) = req.title {
        validate_required_text(title, "Title")?;
    }
    if let Some(Some(ref location)) = req.location {
        validate_optional_text(Some(location), "Location")?;
    }
    if let Some(Some(ref charity_name)) = req.charity_name {
        validate_optional_text(Some(charity_name), "Charity name")?;
    }
    if let Some(ref status) = req.status {
        validate_edition_status(status)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EditionResponse {
    pub id: i32,
    pub year: i32,
    pub title: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub hero_image_url: Option<String>,
    pub charity_name: Option<String>,
    pub charity_description: Option<String>,
    pub registration_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<race_edition::Model> for EditionResponse {
    fn from(m: race_edition::Model) -> Self {
        Self {
            id: m.id,
            year: m.year,
            title: m.title,
            date: m.date,
            description: m.description,
            location: m.location,
            status: m.status,
            hero_image_url: m.hero_image_url,
            charity_name: m.charity_name,
            charity_description: m.charity_description,
            registration_open: m.registration_open,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
