use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PUBLISHED: &str = "published";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_ARCHIVED: &str = "archived";

/// Edition statuses visible to anonymous visitors.
pub const PUBLIC_STATUSES: [&str; 2] = [STATUS_PUBLISHED, STATUS_COMPLETED];

/// A yearly running of the race.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "race_edition")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub year: i32,
    pub title: String,

    /// Race day, with the start time of the first category.
    pub date: DateTimeUtc,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub location: Option<String>,

    /// One of: draft, published, completed, archived
    #[sea_orm(indexed)]
    pub status: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub hero_image_url: Option<String>,

    pub charity_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub charity_description: Option<String>,

    #[sea_orm(default_value = true)]
    pub registration_open: bool,

    #[sea_orm(has_many)]
    pub categories: HasMany<super::race_category::Entity>,

    #[sea_orm(has_many)]
    pub registrations: HasMany<super::registration::Entity>,

    #[sea_orm(has_many)]
    pub results: HasMany<super::race_result::Entity>,

    #[sea_orm(has_many)]
    pub gallery_images: HasMany<super::gallery_image::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
