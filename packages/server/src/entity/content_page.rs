use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PUBLISHED: &str = "published";

/// Editor-managed page (about, FAQ, sponsors) addressed by slug.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_page")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>, // in Markdown

    /// One of: draft, published
    #[sea_orm(indexed)]
    pub status: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
