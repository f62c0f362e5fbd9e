//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Listing, Move, Vote};

/// Data persistence contract for moves and listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WikiRepo: Send + Sync {
    // Move Operations
    async fn insert_move(&self, mv: &Move) -> anyhow::Result<()>;
    async fn update_move(&self, mv: &Move) -> anyhow::Result<()>;
    async fn get_move(&self, id: Uuid) -> anyhow::Result<Option<Move>>;
    /// Every definition sharing `slug`, most upvoted first.
    async fn find_moves_by_slug(&self, slug: &str) -> anyhow::Result<Vec<Move>>;
    /// Newest first.
    async fn list_moves_paginated(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Move>>;
    /// Moves carrying all of `tags`, newest first.
    async fn list_moves_tagged(&self, tags: &[String], limit: i64) -> anyhow::Result<Vec<Move>>;
    /// Bumps one counter in place and returns the updated row.
    async fn vote_move(&self, id: Uuid, vote: Vote) -> anyhow::Result<Option<Move>>;
    /// Writes the cached top listing onto every move with `slug`. `None`
    /// clears it.
    async fn set_top_listing(&self, slug: &str, listing_id: Option<Uuid>) -> anyhow::Result<()>;

    // Listing Operations
    async fn insert_listing(&self, listing: &Listing) -> anyhow::Result<()>;
    async fn get_listing(&self, id: Uuid) -> anyhow::Result<Option<Listing>>;
    /// Most upvoted first, oldest first on ties.
    async fn listings_for_slug(&self, slug: &str) -> anyhow::Result<Vec<Listing>>;
    async fn top_listing(&self, slug: &str) -> anyhow::Result<Option<Listing>>;
    async fn vote_listing(&self, id: Uuid, vote: Vote) -> anyhow::Result<Option<Listing>>;
    /// Moves every listing filed under `from` to `to`. Returns how many moved.
    async fn relink_listings(&self, from: &str, to: &str) -> anyhow::Result<u64>;
}
