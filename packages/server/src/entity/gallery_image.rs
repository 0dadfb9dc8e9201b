use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gallery_image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub edition_id: i32,
    #[sea_orm(belongs_to, from = "edition_id", to = "id")]
    pub edition: HasOne<super::race_edition::Entity>,

    #[sea_orm(column_type = "Text")]
    pub image_url: String,
    pub caption: Option<String>,

    #[sea_orm(default_value = 0)]
    pub sort_order: i32,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
