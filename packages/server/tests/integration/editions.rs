use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use crate::common::{TestApp, routes};

mod create {
    use super::*;

    #[tokio::test]
    async fn admin_can_create_an_edition() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::EDITIONS,
                &json!({
                    "year": 2026,
                    "title": "Riverside Race 2026",
                    "date": "2026-06-15T09:00:00Z",
                    "location": "Riverside Park",
                    "charity_name": "Local Youth Sports Fund",
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 201, "create failed: {}", res.text);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["status"], "draft");
        assert_eq!(res.body["registration_open"], true);
    }

    #[tokio::test]
    async fn regular_users_cannot_create_editions() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("runner@example.com", "securepass")
            .await;

        let res = app
            .post_with_token(
                routes::EDITIONS,
                &json!({"year": 2026, "title": "Rogue Race", "date": "2026-06-15T09:00:00Z"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn creating_an_edition_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::EDITIONS,
                &json!({"year": 2026, "title": "Rogue Race", "date": "2026-06-15T09:00:00Z"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::EDITIONS,
                &json!({
                    "year": 2026,
                    "title": "Riverside Race 2026",
                    "date": "2026-06-15T09:00:00Z",
                    "status": "cancelled",
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn public_list_hides_draft_and_archived_editions() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        app.create_edition(&admin, 2024, "completed").await;
        app.create_edition(&admin, 2025, "published").await;
        app.create_edition(&admin, 2026, "draft").await;

        let res = app.get_without_token(routes::EDITIONS).await;

        assert_eq!(res.status, 200);
        let years: Vec<i64> = res
            .body
            .as_array()
            .expect("list response should be an array")
            .iter()
            .map(|e| e["year"].as_i64().unwrap())
            .collect();
        assert_eq!(years, vec![2025, 2024]);
    }

    #[tokio::test]
    async fn admin_list_includes_every_status() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        app.create_edition(&admin, 2025, "published").await;
        app.create_edition(&admin, 2026, "draft").await;

        let res = app.get_with_token(routes::EDITIONS_ALL, &admin).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().map(|a| a.len()), Some(2));
    }

    #[tokio::test]
    async fn admin_list_is_admin_only() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("runner@example.com", "securepass")
            .await;

        let res = app.get_with_token(routes::EDITIONS_ALL, &token).await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn current_edition_is_the_latest_visible_year() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        app.create_edition(&admin, 2024, "completed").await;
        app.create_edition(&admin, 2025, "published").await;
        app.create_edition(&admin, 2027, "draft").await;

        let res = app.get_without_token(routes::EDITION_CURRENT).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["year"], 2025);
    }

    #[tokio::test]
    async fn current_edition_is_null_when_nothing_is_published() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::EDITION_CURRENT).await;

        assert_eq!(res.status, 200);
        assert!(res.body.is_null(), "expected null, got: {}", res.text);
    }

    #[tokio::test]
    async fn unknown_edition_returns_404() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::edition(999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn admin_can_patch_fields_and_clear_nullables() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let create = app
            .post_with_token(
                routes::EDITIONS,
                &json!({
                    "year": 2025,
                    "title": "Riverside Race 2025",
                    "date": "2025-06-15T09:00:00Z",
                    "description": "A race by the river.",
                    "status": "published",
                }),
                &admin,
            )
            .await;
        assert_eq!(create.status, 201);
        let id = create.id();

        let res = app
            .patch_with_token(
                &routes::edition(id),
                &json!({
                    "title": "Riverside Summer Race 2025",
                    "registration_open": false,
                    "description": null,
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "patch failed: {}", res.text);
        assert_eq!(res.body["title"], "Riverside Summer Race 2025");
        assert_eq!(res.body["registration_open"], false);
        assert!(res.body["description"].is_null());
        // untouched fields survive
        assert_eq!(res.body["status"], "published");
    }

    #[tokio::test]
    async fn patching_an_unknown_edition_returns_404() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .patch_with_token(&routes::edition(999), &json!({"title": "Ghost"}), &admin)
            .await;

        assert_eq!(res.status, 404);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn deleting_an_edition_removes_its_children() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let category_id = app
            .create_category(&admin, edition_id, "10K Run", Some(1000))
            .await;
        app.register_runner(edition_id, category_id, "jane@example.com")
            .await;

        let res = app
            .delete_with_token(&routes::edition(edition_id), &admin)
            .await;
        assert_eq!(res.status, 204, "delete failed: {}", res.text);

        let gone = app.get_without_token(&routes::edition(edition_id)).await;
        assert_eq!(gone.status, 404);

        let categories = server::entity::race_category::Entity::find()
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(categories, 0);

        let registrations = server::entity::registration::Entity::find()
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(registrations, 0);
    }

    #[tokio::test]
    async fn deleting_an_unknown_edition_returns_404() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app.delete_with_token(&routes::edition(999), &admin).await;

        assert_eq!(res.status, 404);
    }
}
