use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A finisher's row in the published results for one edition.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "race_result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub edition_id: i32,
    #[sea_orm(belongs_to, from = "edition_id", to = "id")]
    pub edition: HasOne<super::race_edition::Entity>,

    #[sea_orm(indexed)]
    pub category_id: i32,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: HasOne<super::race_category::Entity>,

    /// NULL for results imported from timing files without a matched entry.
    #[sea_orm(indexed)]
    pub registration_id: Option<i32>,
    #[sea_orm(belongs_to, from = "registration_id", to = "id")]
    pub registration: BelongsTo<Option<super::registration::Entity>>,

    pub participant_name: String,
    pub bib_number: Option<i32>,

    /// Elapsed time as recorded by timing (e.g., "01:23:45").
    pub finish_time: Option<String>,
    pub position: i32,

    pub gender: Option<String>,
    pub age_category: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
