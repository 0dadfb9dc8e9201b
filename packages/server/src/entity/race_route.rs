use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Course details for a category: GPX track, map image, elevation.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "race_route")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub category_id: i32,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: HasOne<super::race_category::Entity>,

    pub name: String,
    pub distance: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub gpx_file_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub map_image_url: Option<String>,

    /// Total climb in meters.
    pub elevation_gain: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
