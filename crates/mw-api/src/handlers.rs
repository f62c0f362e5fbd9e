//! # mw-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core
//! service operations. Each handler performs one operation, then renders a
//! template or redirects.

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;
use mw_core::error::AppError;
use mw_core::models::{ListingDraft, Move, MoveDraft, Vote};
use mw_core::traits::WikiRepo;
use mw_core::{markdown, service, tags, validation};
use mw_ui::{
    EditMoveTemplate, FeedTemplate, ListingTemplate, MoveIndexTemplate, MoveTemplate,
    NewListingTemplate, NewMoveTemplate, PreviewTemplate,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{not_found_page, ApiError};

type HandlerResult = Result<HttpResponse, ApiError>;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub repo: Box<dyn WikiRepo>,
    /// Default moves per index page
    pub page_size: i64,
    /// Moves in the RSS feed
    pub feed_size: i64,
    /// Absolute origin for feed links, no trailing slash
    pub public_url: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewForm {
    #[serde(default)]
    pub definition: String,
    pub condition: Option<String>,
}

fn html<T: Template>(page: T) -> HandlerResult {
    let body = page.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// The path part of a `Referer` that points back at this site. Anything
/// else, including protocol-relative `//host` values, is ignored.
fn local_referer(req: &HttpRequest, public_url: &str) -> Option<String> {
    let referer = req.headers().get(header::REFERER)?.to_str().ok()?;
    let info = req.connection_info();
    let served_at = format!("{}://{}", info.scheme(), info.host());

    let path = [public_url, served_at.as_str()]
        .into_iter()
        .find_map(|origin| referer.strip_prefix(origin))
        .unwrap_or(referer);
    (path.starts_with('/') && !path.starts_with("//")).then(|| path.to_string())
}

/// `GET /`: the wiki starts at the move index.
pub async fn index() -> HttpResponse {
    see_other("/moves")
}

/// `GET /moves`: newest first, paginated.
pub async fn list_moves(data: web::Data<AppState>, query: web::Query<PageQuery>) -> HandlerResult {
    let per_page = service::clamp_page_size(query.per_page, data.page_size);
    let page = service::recent_moves(data.repo.as_ref(), query.page.unwrap_or(1), per_page).await?;

    html(MoveIndexTemplate {
        title: "Moves".to_string(),
        prev_page: page.prev_page(),
        next_page: page.next_page(),
        per_page: page.per_page,
        moves: page.moves,
    })
}

/// `POST /moves`: invalid submissions go back to the form, unsaved.
pub async fn create_move(data: web::Data<AppState>, form: web::Form<MoveDraft>) -> HandlerResult {
    match service::create_move(data.repo.as_ref(), form.into_inner()).await {
        Ok(mv) => Ok(see_other(&mv.url())),
        Err(AppError::Invalid(_)) => Ok(see_other("/moves/new")),
        Err(e) => Err(e.into()),
    }
}

pub async fn new_move_form() -> HandlerResult {
    html(NewMoveTemplate {
        title: "Submit a move".to_string(),
    })
}

/// `GET /moves/rss`
pub async fn feed(data: web::Data<AppState>) -> HandlerResult {
    let page = service::recent_moves(data.repo.as_ref(), 1, data.feed_size).await?;
    let body = FeedTemplate {
        title: "movewiki".to_string(),
        base_url: data.public_url.clone(),
        moves: page.moves,
    }
    .render()?;

    Ok(HttpResponse::Ok()
        .content_type("application/rss+xml; charset=utf-8")
        .body(body))
}

/// `GET /moves/tagged/{tags}`: `+` or `,` separate tags in the path.
pub async fn tagged_moves(data: web::Data<AppState>, path: web::Path<String>) -> HandlerResult {
    let wanted = tags::parse_tag_path(&path.into_inner());
    if wanted.is_empty() {
        return Ok(see_other("/moves"));
    }

    let moves = service::tagged_moves(data.repo.as_ref(), &wanted).await?;
    html(MoveIndexTemplate {
        title: format!("Moves tagged {}", wanted.join(", ")),
        moves,
        prev_page: None,
        next_page: None,
        per_page: service::MAX_PAGE_SIZE,
    })
}

/// `POST /preview`: renders without persisting and shows what would fail.
pub async fn preview(form: web::Form<PreviewForm>) -> HandlerResult {
    let form = form.into_inner();
    let errors = match form.condition.as_deref() {
        Some(condition) => validation::validate_fields(condition, &form.definition),
        None => validation::validate_definition(&form.definition),
    };

    html(PreviewTemplate {
        html: markdown::render(&form.definition),
        stat: validation::extract_stat(&form.definition).unwrap_or_default(),
        errors,
    })
}

pub async fn edit_move_form(data: web::Data<AppState>, path: web::Path<Uuid>) -> HandlerResult {
    let mv = service::get_move(data.repo.as_ref(), path.into_inner()).await?;
    html(EditMoveTemplate {
        title: format!("Edit {}", mv.condition),
        mv,
    })
}

/// `POST /moves/{id}`: merges the submitted fields into the stored move.
pub async fn edit_move(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: web::Form<MoveDraft>,
) -> HandlerResult {
    let id = path.into_inner();
    match service::edit_move(data.repo.as_ref(), id, form.into_inner()).await {
        Ok(mv) => Ok(see_other(&mv.url())),
        Err(AppError::Invalid(_)) => Ok(see_other(&format!("/moves/{id}/edit"))),
        Err(e) => Err(e.into()),
    }
}

/// `GET /moves/{id}/up|down`: returns to wherever the vote was cast from.
pub async fn vote_move(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(Uuid, Vote)>,
) -> HandlerResult {
    let (id, vote) = path.into_inner();
    let mv = service::vote_on_move(data.repo.as_ref(), id, vote).await?;
    log::debug!("{vote} vote on move {id}");

    let back = local_referer(&req, &data.public_url).unwrap_or_else(|| mv.url());
    Ok(see_other(&back))
}

/// `GET /moves/{key}`: a UUID shows that one definition, anything else is
/// treated as a slug and shows every definition under it.
pub async fn view_move(data: web::Data<AppState>, path: web::Path<String>) -> HandlerResult {
    let key = path.into_inner();
    let moves = match key.parse::<Uuid>() {
        Ok(id) => vec![service::get_move(data.repo.as_ref(), id).await?],
        Err(_) => service::moves_for_slug(data.repo.as_ref(), &key).await?,
    };
    render_moves(&data, moves).await
}

/// `GET /moves/{slug}/{id}`: permalink to one definition.
pub async fn view_definition(
    data: web::Data<AppState>,
    path: web::Path<(String, Uuid)>,
) -> HandlerResult {
    let (slug, id) = path.into_inner();
    let mv = service::get_move(data.repo.as_ref(), id).await?;
    if mv.slug != slug {
        // Renamed since the link was made.
        return Ok(HttpResponse::MovedPermanently()
            .insert_header((header::LOCATION, mv.definition_url()))
            .finish());
    }
    render_moves(&data, vec![mv]).await
}

async fn render_moves(data: &AppState, moves: Vec<Move>) -> HandlerResult {
    let Some(first) = moves.first() else {
        return Ok(not_found_page(""));
    };
    let slug = first.slug.clone();
    let title = first.condition.clone();
    let listings = data
        .repo
        .listings_for_slug(&slug)
        .await
        .map_err(AppError::from)?;

    html(MoveTemplate {
        title,
        slug,
        moves,
        listings,
    })
}

pub async fn new_listing_form(data: web::Data<AppState>, path: web::Path<String>) -> HandlerResult {
    let slug = path.into_inner();
    let mut moves = service::moves_for_slug(data.repo.as_ref(), &slug).await?;
    let mv = moves.remove(0);

    html(NewListingTemplate {
        title: format!("New listing for {}", mv.condition),
        mv,
    })
}

/// `POST /moves/{slug}/listings`
pub async fn create_listing(
    data: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Form<ListingDraft>,
) -> HandlerResult {
    let slug = path.into_inner();
    match service::add_listing(data.repo.as_ref(), &slug, form.into_inner()).await {
        Ok(listing) => Ok(see_other(&listing.move_url())),
        Err(AppError::Invalid(_)) => Ok(see_other(&format!("/moves/{slug}/listings/new"))),
        Err(e) => Err(e.into()),
    }
}

pub async fn view_listing(data: web::Data<AppState>, path: web::Path<Uuid>) -> HandlerResult {
    let listing = service::get_listing(data.repo.as_ref(), path.into_inner()).await?;
    html(ListingTemplate {
        title: format!("Listing for {}", listing.move_slug),
        listing,
    })
}

/// `GET /listings/{id}/up|down`: counts the vote and refreshes the owning
/// move's top listing.
pub async fn vote_listing(data: web::Data<AppState>, path: web::Path<(Uuid, Vote)>) -> HandlerResult {
    let (id, vote) = path.into_inner();
    let listing = service::vote_on_listing(data.repo.as_ref(), id, vote).await?;
    log::debug!("{vote} vote on listing {id}");
    Ok(see_other(&listing.move_url()))
}

/// Fallback for unmatched paths.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    not_found_page(req.path())
}
