use serde_json::json;

use crate::common::{TestApp, routes};

mod pages {
    use super::*;

    #[tokio::test]
    async fn admin_can_create_and_publish_a_page() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let created = app
            .post_with_token(
                routes::PAGES,
                &json!({
                    "slug": "course-map",
                    "title": "Course Map",
                    "content": "Both loops start at the riverside gate.",
                    "status": "published",
                }),
                &admin,
            )
            .await;

        assert_eq!(created.status, 201, "create failed: {}", created.text);
        assert_eq!(created.body["slug"], "course-map");
        assert_eq!(created.body["status"], "published");

        let page = app.get_without_token(&routes::page("course-map")).await;
        assert_eq!(page.status, 200);
        assert_eq!(page.body["title"], "Course Map");
    }

    #[tokio::test]
    async fn pages_default_to_draft() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let created = app
            .post_with_token(
                routes::PAGES,
                &json!({"slug": "faq", "title": "FAQ"}),
                &admin,
            )
            .await;

        assert_eq!(created.status, 201);
        assert_eq!(created.body["status"], "draft");
    }

    #[tokio::test]
    async fn draft_pages_are_not_public() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let created = app
            .post_with_token(
                routes::PAGES,
                &json!({"slug": "faq", "title": "FAQ"}),
                &admin,
            )
            .await;
        assert_eq!(created.status, 201);

        let res = app.get_without_token(&routes::page("faq")).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn slugs_are_unique() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let first = app
            .post_with_token(
                routes::PAGES,
                &json!({"slug": "faq", "title": "FAQ"}),
                &admin,
            )
            .await;
        assert_eq!(first.status, 201);

        let second = app
            .post_with_token(
                routes::PAGES,
                &json!({"slug": "faq", "title": "Another FAQ"}),
                &admin,
            )
            .await;
        assert_eq!(second.status, 409);
        assert_eq!(second.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn malformed_slugs_are_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::PAGES,
                &json!({"slug": "Not A Slug!", "title": "Broken"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn admin_can_update_a_page_and_its_slug() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let created = app
            .post_with_token(
                routes::PAGES,
                &json!({"slug": "rules", "title": "Rules", "content": "Old text"}),
                &admin,
            )
            .await;
        assert_eq!(created.status, 201);

        let updated = app
            .patch_with_token(
                &routes::page("rules"),
                &json!({
                    "slug": "race-rules",
                    "status": "published",
                    "content": "New text",
                }),
                &admin,
            )
            .await;

        assert_eq!(updated.status, 200, "update failed: {}", updated.text);
        assert_eq!(updated.body["slug"], "race-rules");
        assert_eq!(updated.body["content"], "New text");

        // old slug no longer resolves, new one does
        let old = app.get_without_token(&routes::page("rules")).await;
        assert_eq!(old.status, 404);
        let new = app.get_without_token(&routes::page("race-rules")).await;
        assert_eq!(new.status, 200);
    }

    #[tokio::test]
    async fn renaming_onto_an_existing_slug_conflicts() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        for slug in ["faq", "rules"] {
            let res = app
                .post_with_token(
                    routes::PAGES,
                    &json!({"slug": slug, "title": slug}),
                    &admin,
                )
                .await;
            assert_eq!(res.status, 201);
        }

        let res = app
            .patch_with_token(&routes::page("rules"), &json!({"slug": "faq"}), &admin)
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn a_patch_can_clear_the_content() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let created = app
            .post_with_token(
                routes::PAGES,
                &json!({"slug": "faq", "title": "FAQ", "content": "Some text"}),
                &admin,
            )
            .await;
        assert_eq!(created.status, 201);

        let updated = app
            .patch_with_token(&routes::page("faq"), &json!({"content": null}), &admin)
            .await;

        assert_eq!(updated.status, 200);
        assert!(updated.body["content"].is_null());
    }

    #[tokio::test]
    async fn admin_can_delete_a_page() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let created = app
            .post_with_token(
                routes::PAGES,
                &json!({"slug": "faq", "title": "FAQ", "status": "published"}),
                &admin,
            )
            .await;
        assert_eq!(created.status, 201);

        let res = app.delete_with_token(&routes::page("faq"), &admin).await;
        assert_eq!(res.status, 204);

        let gone = app.get_without_token(&routes::page("faq")).await;
        assert_eq!(gone.status, 404);
    }

    #[tokio::test]
    async fn the_page_list_is_admin_only() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("runner@example.com", "securepass")
            .await;

        let res = app.get_with_token(routes::PAGES, &token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn the_page_list_includes_drafts() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        for (slug, status) in [("faq", "draft"), ("rules", "published")] {
            let res = app
                .post_with_token(
                    routes::PAGES,
                    &json!({"slug": slug, "title": slug, "status": status}),
                    &admin,
                )
                .await;
            assert_eq!(res.status, 201);
        }

        let list = app.get_with_token(routes::PAGES, &admin).await;
        assert_eq!(list.status, 200);
        assert_eq!(list.body.as_array().map(|a| a.len()), Some(2));
    }
}

mod gallery {
    use super::*;

    #[tokio::test]
    async fn admin_can_add_images_and_anyone_can_list_them() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;

        for (url, sort_order) in [
            ("https://cdn.example/finish.jpg", 1),
            ("https://cdn.example/start.jpg", 0),
        ] {
            let res = app
                .post_with_token(
                    routes::GALLERY,
                    &json!({
                        "edition_id": edition_id,
                        "image_url": url,
                        "caption": "Race day",
                        "sort_order": sort_order,
                    }),
                    &admin,
                )
                .await;
            assert_eq!(res.status, 201, "add image failed: {}", res.text);
        }

        let list = app
            .get_without_token(&routes::edition_gallery(edition_id))
            .await;
        assert_eq!(list.status, 200);
        let urls: Vec<&str> = list
            .body
            .as_array()
            .expect("array body")
            .iter()
            .map(|i| i["image_url"].as_str().unwrap())
            .collect();
        assert_eq!(
            urls,
            vec!["https://cdn.example/start.jpg", "https://cdn.example/finish.jpg"]
        );
    }

    #[tokio::test]
    async fn images_need_an_existing_edition() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::GALLERY,
                &json!({"edition_id": 4242, "image_url": "https://cdn.example/x.jpg"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn image_urls_must_be_absolute() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;

        let res = app
            .post_with_token(
                routes::GALLERY,
                &json!({"edition_id": edition_id, "image_url": "/finish.jpg"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn adding_images_is_admin_only() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let token = app
            .create_authenticated_user("runner@example.com", "securepass")
            .await;

        let res = app
            .post_with_token(
                routes::GALLERY,
                &json!({"edition_id": edition_id, "image_url": "https://cdn.example/x.jpg"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn admin_can_remove_an_image() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;

        let created = app
            .post_with_token(
                routes::GALLERY,
                &json!({"edition_id": edition_id, "image_url": "https://cdn.example/x.jpg"}),
                &admin,
            )
            .await;
        assert_eq!(created.status, 201);

        let res = app
            .delete_with_token(&routes::gallery_image(created.id()), &admin)
            .await;
        assert_eq!(res.status, 204);

        let list = app
            .get_without_token(&routes::edition_gallery(edition_id))
            .await;
        assert_eq!(list.body.as_array().map(|a| a.len()), Some(0));
    }

    #[tokio::test]
    async fn removing_an_unknown_image_returns_404() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .delete_with_token(&routes::gallery_image(4242), &admin)
            .await;

        assert_eq!(res.status, 404);
    }
}
