use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{content_page, gallery_image};
use crate::error::AppError;

use super::shared::{
    double_option, validate_http_url, validate_optional_text, validate_required_text,
};

pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    let ok = !slug.is_empty()
        && slug.len() <= 128
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !ok {
        return Err(AppError::Validation(
            "Slug must be lowercase letters, digits and hyphens".into(),
        ));
    }
    Ok(())
}

fn validate_page_status(status: &str) -> Result<(), AppError> {
    if status != content_page::STATUS_DRAFT && status != content_page::STATUS_PUBLISHED {
        return Err(AppError::Validation(
            "Status must be one of: draft, published".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreatePageRequest {
    /// URL slug, e.g. `about-the-race`.
    pub slug: String,
    pub title: String,
    pub content: Option<String>,
    /// Defaults to `draft` when omitted.
    pub status: Option<String>,
}

pub fn validate_create_page(req: &CreatePageRequest) -> Result<(), AppError> {
    validate_slug(&req.slug)?;
    validate_required_text(&req.title, "Title")?;
    if let Some(ref status) = req.status {
        validate_page_status(status)?;
    }
    Ok(())
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdatePageRequest {
    pub slug: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub content: Option<Option<String>>,
    pub status: Option<String>,
}

pub fn validate_update_page(req: &UpdatePageRequest) -> Result<(), AppError> {
    if let Some(ref slug) = req.slug {
        validate_slug(slug)?;
    }
    if let Some(ref title) = req.title {
        validate_required_text(title, "Title")?;
    }
    if let Some(ref status) = req.status {
        validate_page_status(status)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PageResponse {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub content: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<content_page::Model> for PageResponse {
    fn from(m: content_page::Model) -> Self {
        Self {
            id: m.id,
            slug: m.slug,
            title: m.title,
            content: m.content,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AddGalleryImageRequest {
    pub edition_id: i32,
    pub image_url: String,
    pub caption: Option<String>,
    pub sort_order: Option<i32>,
}

pub fn validate_add_gallery_image(req: &AddGalleryImageRequest) -> Result<(), AppError> {
    validate_http_url(&req.image_url, "image_url")?;
    validate_optional_text(req.caption.as_deref(), "Caption")?;
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GalleryImageResponse {
    pub id: i32,
    pub edition_id: i32,
    pub image_url: String,
    pub caption: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<gallery_image::Model> for GalleryImageResponse {
    fn from(m: gallery_image::Model) -> Self {
        Self {
            id: m.id,
            edition_id: m.edition_id,
            image_url: m.image_url,
            caption: m.caption,
            sort_order: m.sort_order,
            created_at: m.created_at,
        }
    }
}
