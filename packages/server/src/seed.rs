use chrono::TimeZone;
use sea_orm::*;
use tracing::info;

use crate::entity::{race_category, race_edition};

/// Demo categories seeded alongside the demo edition: name, distance,
/// price in cents (None = free), start time, display order.
const DEMO_CATEGORIES: &[(&str, &str, Option<i32>, &str, i32)] = &[
    ("10K Run", "10 km", Some(1500), "09:30", 0),
    ("5K Run", "5 km", Some(1000), "09:45", 1),
    ("Kids Dash", "800 m", None, "11:00", 2),
];

/// Seed a demo edition with categories so a fresh install has something
/// to show. Skipped when any edition already exists.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let existing = race_edition::Entity::find().count(db).await?;
    if existing > 0 {
        return Ok(());
    }

    let race_day = chrono::Utc
        .with_ymd_and_hms(2025, 12, 29, 9, 0, 0)
        .single()
        .expect("valid race date");
    let now = chrono::Utc::now();

    let edition = race_edition::ActiveModel {
        year: Set(2025),
        title: Set("Riverside End of Year Race 2025".to_owned()),
        date: Set(race_day),
        description: Set(Some(
            "Close the year with a run along the river. All proceeds go to charity.".to_owned(),
        )),
        location: Set(Some("Riverside Park".to_owned())),
        status: Set(race_edition::STATUS_PUBLISHED.to_owned()),
        hero_image_url: Set(None),
        charity_name: Set(Some("Local Youth Sports Fund".to_owned())),
        charity_description: Set(Some(
            "Supports sports equipment and coaching for local schools.".to_owned(),
        )),
        registration_open: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for &(name, distance, price_cents, start_time, sort_order) in DEMO_CATEGORIES {
        race_category::ActiveModel {
            edition_id: Set(edition.id),
            name: Set(name.to_owned()),
            distance: Set(distance.to_owned()),
            description: Set(None),
            price_cents: Set(price_cents),
            age_group: Set(None),
            start_time: Set(Some(start_time.to_owned())),
            max_participants: Set(None),
            sort_order: Set(sort_order),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    info!(
        edition_id = edition.id,
        categories = DEMO_CATEGORIES.len(),
        "Seeded demo edition"
    );

    Ok(())
}
