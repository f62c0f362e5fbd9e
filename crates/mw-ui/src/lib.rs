//! # mw-ui
//!
//! Askama templates for every page movewiki serves. Templates own their data
//! so handlers can build them straight from service results.

use askama::Template;
use chrono::Utc;
use mw_core::models::{Listing, Move};

#[derive(Template)]
#[template(path = "moves/index.html")]
pub struct MoveIndexTemplate {
    pub title: String,
    pub moves: Vec<Move>,
    pub prev_page: Option<i64>,
    pub next_page: Option<i64>,
    pub per_page: i64,
}

/// Every definition sharing one slug, with the listings recorded under it.
#[derive(Template)]
#[template(path = "moves/show.html")]
pub struct MoveTemplate {
    pub title: String,
    pub slug: String,
    pub moves: Vec<Move>,
    pub listings: Vec<Listing>,
}

impl MoveTemplate {
    /// Whether any definition on the page caches `listing` as its top listing.
    pub fn is_top(&self, listing: &Listing) -> bool {
        self.moves.iter().any(|m| m.is_top(listing))
    }
}

#[derive(Template)]
#[template(path = "moves/new.html")]
pub struct NewMoveTemplate {
    pub title: String,
}

#[derive(Template)]
#[template(path = "moves/edit.html")]
pub struct EditMoveTemplate {
    pub title: String,
    pub mv: Move,
}

#[derive(Template)]
#[template(path = "listings/new.html")]
pub struct NewListingTemplate {
    pub title: String,
    pub mv: Move,
}

#[derive(Template)]
#[template(path = "listings/show.html")]
pub struct ListingTemplate {
    pub title: String,
    pub listing: Listing,
}

/// HTML fragment returned by the live preview.
#[derive(Template)]
#[template(path = "preview.html")]
pub struct PreviewTemplate {
    pub html: String,
    pub stat: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub title: String,
    pub condition: String,
}

#[derive(Template)]
#[template(path = "rss.xml")]
pub struct FeedTemplate {
    pub title: String,
    /// Absolute base for item links, without a trailing slash
    pub base_url: String,
    pub moves: Vec<Move>,
}

impl FeedTemplate {
    pub fn build_date(&self) -> String {
        self.moves
            .first()
            .map(|m| m.created_at)
            .unwrap_or_else(Utc::now)
            .to_rfc2822()
    }
}
