use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{race_category, race_route};
use crate::error::AppError;

use super::shared::{double_option, validate_optional_text, validate_required_text};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    pub edition_id: i32,
    pub name: String,
    pub distance: String,
    pub description: Option<String>,
    /// Entry fee in euro cents. Omitted or 0 means free entry.
    pub price_cents: Option<i32>,
    pub age_group: Option<String>,
    pub start_time: Option<String>,
    pub max_participants: Option<i32>,
    pub sort_order: Option<i32>,
}

pub fn validate_create_category(req: &CreateCategoryRequest) -> Result<(), AppError> {
    validate_required_text(&req.name, "Name")?;
    validate_required_text(&req.distance, "Distance")?;
    validate_optional_text(req.age_group.as_deref(), "Age group")?;
    validate_optional_text(req.start_time.as_deref(), "Start time")?;
    if let Some(price) = req.price_cents
        && price < 0
    {
        return Err(AppError::Validation("Price must be >= 0 cents".into()));
    }
    if let Some(max) = req.max_participants
        && max < 1
    {
        return Err(AppError::Validation("Max participants must be >= 1".into()));
    }
    Ok(())
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub distance: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub price_cents: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub age_group: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_participants: Option<Option<i32>>,
    pub sort_order: Option<i32>,
}

pub fn validate_update_category(req: &UpdateCategoryRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_required_text(name, "Name")?;
    }
    if let Some(ref distance) = req.distance {
        validate_required_text(distance, "Distance")?;
    }
    if let Some(Some(price)) = req.price_cents
        && price < 0
    {
        return Err(AppError::Validation("Price must be >= 0 cents".into()));
    }
    if let Some(Some(max)) = req.max_participants
        && max < 1
    {
        return Err(AppError::Validation("Max participants must be >= 1".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub edition_id: i32,
    pub name: String,
    pub distance: String,
    pub description: Option<String>,
    pub price_cents: Option<i32>,
    pub age_group: Option<String>,
    pub start_time: Option<String>,
    pub max_participants: Option<i32>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<race_category::Model> for CategoryResponse {
    fn from(m: race_category::Model) -> Self {
        Self {
            id: m.id,
            edition_id: m.edition_id,
            name: m.name,
            distance: m.distance,
            description: m.description,
            price_cents: m.price_cents,
            age_group: m.age_group,
            start_time: m.start_time,
            max_participants: m.max_participants,
            sort_order: m.sort_order,
            created_at: m.created_at,
        }
    }
}

/// Create-or-replace body for a category's course details.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpsertRouteRequest {
    pub name: String,
    pub distance: Option<String>,
    pub gpx_file_url: Option<String>,
    pub map_image_url: Option<String>,
    pub elevation_gain: Option<i32>,
    pub description: Option<String>,
}

pub fn validate_upsert_route(req: &UpsertRouteRequest) -> Result<(), AppError> {
    validate_required_text(&req.name, "Name")?;
    validate_optional_text(req.distance.as_deref(), "Distance")?;
    if let Some(gain) = req.elevation_gain
        && gain < 0
    {
        return Err(AppError::Validation("Elevation gain must be >= 0".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RouteResponse {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub distance: Option<String>,
    pub gpx_file_url: Option<String>,
    pub map_image_url: Option<String>,
    pub elevation_gain: Option<i32>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<race_route::Model> for RouteResponse {
    fn from(m: race_route::Model) -> Self {
        Self {
            id: m.id,
            category_id: m.category_id,
            name: m.name,
            distance: m.distance,
            gpx_file_url: m.gpx_file_url,
            map_image_url: m.map_image_url,
            elevation_gain: m.elevation_gain,
            description: m.description,
            created_at: m.created_at,
        }
    }
}
