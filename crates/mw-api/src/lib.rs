//! # mw-api
//!
//! The web routing and orchestration layer for movewiki.

pub mod error;
pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Configures the routes for the wiki.
///
/// # Developer Note
/// Order matters: literal segments (`new`, `rss`, `tagged`, `edit`, vote
/// directions) are registered before the catch-all `{slug}` patterns.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/", web::get().to(handlers::index))
            .route("/preview", web::post().to(handlers::preview))
            // Move index and submission
            .route("/moves", web::get().to(handlers::list_moves))
            .route("/moves", web::post().to(handlers::create_move))
            .route("/moves/new", web::get().to(handlers::new_move_form))
            .route("/moves/rss", web::get().to(handlers::feed))
            .route("/moves/tagged/{tags}", web::get().to(handlers::tagged_moves))
            // Operations on a single move by id
            .route("/moves/{id}/edit", web::get().to(handlers::edit_move_form))
            .route("/moves/{id}/{vote:up|down}", web::get().to(handlers::vote_move))
            .route("/moves/{id}", web::post().to(handlers::edit_move))
            // Listings nested under a move's slug
            .route("/moves/{slug}/listings/new", web::get().to(handlers::new_listing_form))
            .route("/moves/{slug}/listings", web::post().to(handlers::create_listing))
            // Read views
            .route("/moves/{slug}/{id}", web::get().to(handlers::view_definition))
            .route("/moves/{key}", web::get().to(handlers::view_move))
            .route("/listings/{id}", web::get().to(handlers::view_listing))
            .route("/listings/{id}/{vote:up|down}", web::get().to(handlers::vote_listing))
            .default_service(web::route().to(handlers::not_found)),
    );
}
