use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_FAILED: &str = "failed";
pub const STATUS_REFUNDED: &str = "refunded";

/// A participant's entry for one category of one edition.
/// Rows are created before payment and settled by the checkout flow.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registration")]
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

    pub first_name: String,
    pub surname: String,
    pub full_name: String,
    pub club: Option<String>,

    #[sea_orm(indexed)]
    pub email: String,
    pub phone: Option<String>,

    pub date_of_birth: Option<Date>,
    /// One of: male, female, other
    pub gender: Option<String>,
    pub tshirt_size: Option<String>,

    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,

    /// One of: pending, completed, failed, refunded
    #[sea_orm(indexed)]
    pub payment_status: String,
    #[sea_orm(default_value = 0)]
    pub amount_paid_cents: i32,

    /// Hosted checkout session this registration was last sent to.
    #[sea_orm(indexed)]
    pub checkout_session_id: Option<String>,

    pub bib_number: Option<i32>,

    pub registered_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
