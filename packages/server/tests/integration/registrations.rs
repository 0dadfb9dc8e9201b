use sea_orm::EntityTrait;
use serde_json::json;

use server::entity::registration;
use server::notify::NotificationEvent;

use crate::common::{TestApp, routes};

async fn registration_row(app: &TestApp, id: i32) -> registration::Model {
    registration::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .expect("DB query failed")
        .expect("registration not found")
}

mod sign_up_form {
    use super::*;

    #[tokio::test]
    async fn runner_can_register_for_a_published_edition() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let category_id = app
            .create_category(&admin, edition_id, "10K Run", Some(1000))
            .await;

        let res = app
            .post_without_token(
                routes::REGISTRATIONS,
                &json!({
                    "edition_id": edition_id,
                    "category_id": category_id,
                    "first_name": "Jane",
                    "surname": "Runner",
                    "email": "Jane@Example.com",
                    "club": "River Striders",
                    "gender": "Female",
                }),
            )
            .await;

        assert_eq!(res.status, 201, "registration failed: {}", res.text);
        let row = registration_row(&app, res.id()).await;
        assert_eq!(row.payment_status, registration::STATUS_PENDING);
        assert_eq!(row.full_name, "Jane Runner");
        assert_eq!(row.email, "jane@example.com");
        assert_eq!(row.gender.as_deref(), Some("female"));
    }

    #[tokio::test]
    async fn registering_sends_an_organizer_notification() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let category_id = app
            .create_category(&admin, edition_id, "10K Run", Some(1000))
            .await;

        app.register_runner(edition_id, category_id, "jane@example.com")
            .await;

        let events = app.notifier.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            NotificationEvent::RegistrationCreated {
                full_name,
                email,
                category_name,
                ..
            } => {
                assert_eq!(full_name, "Jane Runner");
                assert_eq!(email, "jane@example.com");
                assert_eq!(category_name, "10K Run");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn draft_editions_do_not_accept_registrations() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "draft").await;
        let category_id = app
            .create_category(&admin, edition_id, "10K Run", Some(1000))
            .await;

        let res = app
            .post_without_token(
                routes::REGISTRATIONS,
                &json!({
                    "edition_id": edition_id,
                    "category_id": category_id,
                    "first_name": "Jane",
                    "surname": "Runner",
                    "email": "jane@example.com",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn closed_registration_is_refused() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let category_id = app
            .create_category(&admin, edition_id, "10K Run", Some(1000))
            .await;

        let closed = app
            .patch_with_token(
                &routes::edition(edition_id),
                &json!({"registration_open": false}),
                &admin,
            )
            .await;
        assert_eq!(closed.status, 200);

        let res = app
            .post_without_token(
                routes::REGISTRATIONS,
                &json!({
                    "edition_id": edition_id,
                    "category_id": category_id,
                    "first_name": "Jane",
                    "surname": "Runner",
                    "email": "jane@example.com",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn category_must_belong_to_the_edition() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_a = app.create_edition(&admin, 2024, "published").await;
        let edition_b = app.create_edition(&admin, 2025, "published").await;
        let category_b = app
            .create_category(&admin, edition_b, "10K Run", Some(1000))
            .await;

        let res = app
            .post_without_token(
                routes::REGISTRATIONS,
                &json!({
                    "edition_id": edition_a,
                    "category_id": category_b,
                    "first_name": "Jane",
                    "surname": "Runner",
                    "email": "jane@example.com",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let category_id = app
            .create_category(&admin, edition_id, "10K Run", Some(1000))
            .await;

        let res = app
            .post_without_token(
                routes::REGISTRATIONS,
                &json!({
                    "edition_id": edition_id,
                    "category_id": category_id,
                    "first_name": "Jane",
                    "surname": "Runner",
                    "email": "not-an-email",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
    }
}

mod checkout {
    use super::*;

    #[tokio::test]
    async fn free_categories_complete_without_a_checkout_session() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let category_id = app
            .create_category(&admin, edition_id, "Kids Dash", None)
            .await;
        let reg_id = app
            .register_runner(edition_id, category_id, "jane@example.com")
            .await;

        let res = app
            .post_without_token(
                routes::CHECKOUT,
                &json!({
                    "registration_id": reg_id,
                    "category_id": category_id,
                    "success_url": "https://race.example/thanks",
                    "cancel_url": "https://race.example/cancel",
                }),
            )
            .await;

        assert_eq!(res.status, 200, "checkout failed: {}", res.text);
        assert_eq!(res.body["free"], true);
        assert!(res.body["session_id"].is_null());
        assert!(res.body["url"].is_null());
        assert_eq!(app.gateway.create_calls(), 0);

        let row = registration_row(&app, reg_id).await;
        assert_eq!(row.payment_status, registration::STATUS_COMPLETED);
        assert_eq!(row.amount_paid_cents, 0);
    }

    #[tokio::test]
    async fn paid_categories_redirect_to_the_hosted_checkout() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let category_id = app
            .create_category(&admin, edition_id, "10K Run", Some(1500))
            .await;
        let reg_id = app
            .register_runner(edition_id, category_id, "jane@example.com")
            .await;

        let res = app
            .post_without_token(
                routes::CHECKOUT,
                &json!({
                    "registration_id": reg_id,
                    "category_id": category_id,
                    "success_url": "https://race.example/thanks",
                    "cancel_url": "https://race.example/cancel",
                }),
            )
            .await;

        assert_eq!(res.status, 200, "checkout failed: {}", res.text);
        assert_eq!(res.body["free"], false);
        let session_id = res.body["session_id"].as_str().expect("session id");
        assert!(res.body["url"].as_str().unwrap().contains(session_id));
        assert_eq!(app.gateway.create_calls(), 1);

        // session id is stored for later correlation
        let row = registration_row(&app, reg_id).await;
        assert_eq!(row.payment_status, registration::STATUS_PENDING);
        assert_eq!(row.checkout_session_id.as_deref(), Some(session_id));
    }

    #[tokio::test]
    async fn checkout_rejects_a_mismatched_category() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let category_id = app
            .create_category(&admin, edition_id, "10K Run", Some(1500))
            .await;
        let other_category = app
            .create_category(&admin, edition_id, "5K Run", Some(1000))
            .await;
        let reg_id = app
            .register_runner(edition_id, category_id, "jane@example.com")
            .await;

        let res = app
            .post_without_token(
                routes::CHECKOUT,
                &json!({
                    "registration_id": reg_id,
                    "category_id": other_category,
                    "success_url": "https://race.example/thanks",
                    "cancel_url": "https://race.example/cancel",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn checkout_requires_absolute_urls() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::CHECKOUT,
                &json!({
                    "registration_id": 1,
                    "category_id": 1,
                    "success_url": "/thanks",
                    "cancel_url": "https://race.example/cancel",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
    }
}

mod verify {
    use super::*;

    async fn paid_checkout(app: &TestApp) -> (i32, String) {
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let category_id = app
            .create_category(&admin, edition_id, "10K Run", Some(1500))
            .await;
        let reg_id = app
            .register_runner(edition_id, category_id, "jane@example.com")
            .await;

        let res = app
            .post_without_token(
                routes::CHECKOUT,
                &json!({
                    "registration_id": reg_id,
                    "category_id": category_id,
                    "success_url": "https://race.example/thanks",
                    "cancel_url": "https://race.example/cancel",
                }),
            )
            .await;
        assert_eq!(res.status, 200, "checkout failed: {}", res.text);
        let session_id = res.body["session_id"].as_str().expect("session id").to_string();

        (reg_id, session_id)
    }

    #[tokio::test]
    async fn an_unpaid_session_changes_nothing() {
        let app = TestApp::spawn().await;
        let (reg_id, session_id) = paid_checkout(&app).await;

        let res = app
            .post_without_token(routes::VERIFY, &json!({"session_id": session_id}))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["paid"], false);
        assert!(res.body["registration_id"].is_null());

        let row = registration_row(&app, reg_id).await;
        assert_eq!(row.payment_status, registration::STATUS_PENDING);
    }

    #[tokio::test]
    async fn a_paid_session_completes_the_registration() {
        let app = TestApp::spawn().await;
        let (reg_id, session_id) = paid_checkout(&app).await;

        app.gateway.mark_paid(&session_id);

        let res = app
            .post_without_token(routes::VERIFY, &json!({"session_id": session_id}))
            .await;

        assert_eq!(res.status, 200, "verify failed: {}", res.text);
        assert_eq!(res.body["paid"], true);
        assert_eq!(res.body["registration_id"], reg_id);

        let row = registration_row(&app, reg_id).await;
        assert_eq!(row.payment_status, registration::STATUS_COMPLETED);
        assert_eq!(row.amount_paid_cents, 1500);
    }

    #[tokio::test]
    async fn verifying_twice_sends_one_confirmation() {
        let app = TestApp::spawn().await;
        let (reg_id, session_id) = paid_checkout(&app).await;

        app.gateway.mark_paid(&session_id);

        let first = app
            .post_without_token(routes::VERIFY, &json!({"session_id": session_id.clone()}))
            .await;
        assert_eq!(first.status, 200);
        assert_eq!(first.body["paid"], true);

        let second = app
            .post_without_token(routes::VERIFY, &json!({"session_id": session_id}))
            .await;
        assert_eq!(second.status, 200);
        assert_eq!(second.body["paid"], true);
        assert_eq!(second.body["registration_id"], reg_id);

        let confirmations = app
            .notifier
            .events()
            .iter()
            .filter(|e| matches!(e, NotificationEvent::PaymentConfirmed { .. }))
            .count();
        assert_eq!(confirmations, 1, "retried verify must not resend the confirmation");

        let row = registration_row(&app, reg_id).await;
        assert_eq!(row.payment_status, registration::STATUS_COMPLETED);
    }

    #[tokio::test]
    async fn an_unknown_session_maps_to_a_payment_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::VERIFY, &json!({"session_id": "cs_test_unknown"}))
            .await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "PAYMENT_FAILED");
    }
}

mod admin {
    use super::*;

    #[tokio::test]
    async fn admin_sees_registrations_and_stats() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let free = app
            .create_category(&admin, edition_id, "Kids Dash", None)
            .await;
        let paid = app
            .create_category(&admin, edition_id, "10K Run", Some(1500))
            .await;

        let free_reg = app
            .register_runner(edition_id, free, "kid@example.com")
            .await;
        app.register_runner(edition_id, paid, "jane@example.com")
            .await;

        // complete the free one
        let res = app
            .post_without_token(
                routes::CHECKOUT,
                &json!({
                    "registration_id": free_reg,
                    "category_id": free,
                    "success_url": "https://race.example/thanks",
                    "cancel_url": "https://race.example/cancel",
                }),
            )
            .await;
        assert_eq!(res.status, 200);

        let list = app
            .get_with_token(&routes::edition_registrations(edition_id), &admin)
            .await;
        assert_eq!(list.status, 200);
        assert_eq!(list.body.as_array().map(|a| a.len()), Some(2));

        let stats = app
            .get_with_token(&routes::edition_registration_stats(edition_id), &admin)
            .await;
        assert_eq!(stats.status, 200);
        assert_eq!(stats.body["total"], 2);
        assert_eq!(stats.body["paid"], 1);
        assert_eq!(stats.body["pending"], 1);
    }

    #[tokio::test]
    async fn registration_list_is_admin_only() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let token = app
            .create_authenticated_user("runner@example.com", "securepass")
            .await;

        let res = app
            .get_with_token(&routes::edition_registrations(edition_id), &token)
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn admin_can_assign_a_bib_number() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let edition_id = app.create_edition(&admin, 2025, "published").await;
        let category_id = app
            .create_category(&admin, edition_id, "10K Run", Some(1500))
            .await;
        let reg_id = app
            .register_runner(edition_id, category_id, "jane@example.com")
            .await;

        let res = app
            .patch_with_token(
                &routes::registration_bib(reg_id),
                &json!({"bib_number": 42}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "bib patch failed: {}", res.text);
        assert_eq!(res.body["bib_number"], 42);
    }

    #[tokio::test]
    async fn bib_numbers_must_be_positive() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .patch_with_token(&routes::registration_bib(1), &json!({"bib_number": 0}), &admin)
            .await;

        assert_eq!(res.status, 400);
    }
}
