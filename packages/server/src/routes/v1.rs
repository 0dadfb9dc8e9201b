use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/editions", edition_routes())
        .nest("/categories", category_routes())
        .nest("/registrations", registration_routes())
        .nest("/results", result_routes())
        .nest("/content", content_routes())
        .nest("/gallery", gallery_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn edition_routes() -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::result::upload_results))
        .layer(handlers::result::upload_body_limit());

    OpenApiRouter::new()
        .routes(routes!(
            handlers::edition::list_published_editions,
            handlers::edition::create_edition
        ))
        .routes(routes!(handlers::edition::current_edition))
        .routes(routes!(handlers::edition::list_all_editions))
        .routes(routes!(
            handlers::edition::get_edition,
            handlers::edition::update_edition,
            handlers::edition::delete_edition
        ))
        .routes(routes!(handlers::category::list_categories_for_edition))
        .routes(routes!(handlers::result::list_results_for_edition))
        .routes(routes!(handlers::content::list_gallery_for_edition))
        .routes(routes!(
            handlers::registration::list_registrations_for_edition
        ))
        .routes(routes!(handlers::registration::registration_stats))
        .merge(upload)
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::category::create_category))
        .routes(routes!(
            handlers::category::update_category,
            handlers::category::delete_category
        ))
        .routes(routes!(
            handlers::category::get_route,
            handlers::category::upsert_route
        ))
}

fn registration_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::registration::create_registration))
        .routes(routes!(handlers::registration::start_checkout))
        .routes(routes!(handlers::registration::verify_payment))
        .routes(routes!(handlers::registration::assign_bib))
}

fn result_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::result::create_result))
        .routes(routes!(handlers::result::bulk_create_results))
        .routes(routes!(handlers::result::delete_result))
}

fn content_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::content::list_pages,
            handlers::content::create_page
        ))
        .routes(routes!(
            handlers::content::get_published_page,
            handlers::content::update_page,
            handlers::content::delete_page
        ))
}

fn gallery_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::content::add_gallery_image))
        .routes(routes!(handlers::content::delete_gallery_image))
}
