use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A distance or age bracket runners sign up for within an edition.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "race_category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub edition_id: i32,
    #[sea_orm(belongs_to, from = "edition_id", to = "id")]
    pub edition: HasOne<super::race_edition::Entity>,

    pub name: String,
    /// Human-readable distance (e.g., "10 km", "5 km").
    pub distance: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Entry fee in euro cents. NULL or 0 means a free category.
    pub price_cents: Option<i32>,

    pub age_group: Option<String>,
    /// Start time on race day (e.g., "09:30").
    pub start_time: Option<String>,
    pub max_participants: Option<i32>,

    #[sea_orm(default_value = 0)]
    pub sort_order: i32,

    #[sea_orm(has_many)]
    pub registrations: HasMany<super::registration::Entity>,

    #[sea_orm(has_many)]
    pub results: HasMany<super::race_result::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
