//! # mw-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `mw-core` domain models. Tags are kept as a JSON array column so a
//! move stays a single row, the way a document store would hold it.

use async_trait::async_trait;
use mw_core::models::{Listing, Move, Vote};
use mw_core::traits::WikiRepo;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

const MOVE_COLUMNS: &str =
    "id, condition, definition, slug, stat, tags, created_at, upvotes, downvotes, top_listing";
const LISTING_COLUMNS: &str =
    "id, move_slug, created_at, description, success, partial, failure, stat, upvotes, downvotes";

pub struct SqliteWikiRepo {
    pool: SqlitePool,
}

impl SqliteWikiRepo {
    /// Connects and creates the schema if it is missing.
    ///
    /// An in-memory URL gets a single long-lived connection, otherwise every
    /// pooled connection would see its own empty database.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        let repo = Self { pool };
        repo.run_migrations().await?;
        log::info!("sqlite store ready at {url}");
        Ok(repo)
    }

    async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS moves (
                id          BLOB PRIMARY KEY,
                condition   TEXT NOT NULL,
                definition  TEXT NOT NULL,
                slug        TEXT NOT NULL,
                stat        TEXT NOT NULL DEFAULT '',
                tags        TEXT NOT NULL DEFAULT '[]',
                created_at  TEXT NOT NULL,
                upvotes     INTEGER NOT NULL DEFAULT 0,
                downvotes   INTEGER NOT NULL DEFAULT 0,
                top_listing BLOB
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS listings (
                id          BLOB PRIMARY KEY,
                move_slug   TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                success     TEXT NOT NULL DEFAULT '',
                partial     TEXT NOT NULL DEFAULT '',
                failure     TEXT NOT NULL DEFAULT '',
                stat        TEXT NOT NULL DEFAULT '',
                upvotes     INTEGER NOT NULL DEFAULT 0,
                downvotes   INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_moves_slug ON moves (slug)",
            "CREATE INDEX IF NOT EXISTS idx_moves_created_at ON moves (created_at)",
            "CREATE INDEX IF NOT EXISTS idx_listings_move_slug ON listings (move_slug)",
        ] {
            sqlx::query(index).execute(&self.pool).await?;
        }

        Ok(())
    }
}

fn counter_column(vote: Vote) -> &'static str {
    match vote {
        Vote::Up => "upvotes",
        Vote::Down => "downvotes",
    }
}

fn row_to_move(row: &SqliteRow) -> anyhow::Result<Move> {
    Ok(Move {
        id: row.try_get("id")?,
        condition: row.try_get("condition")?,
        definition: row.try_get("definition")?,
        slug: row.try_get("slug")?,
        stat: row.try_get("stat")?,
        tags: serde_json::from_str(&row.try_get::<String, _>("tags")?)?,
        created_at: row.try_get("created_at")?,
        upvotes: row.try_get("upvotes")?,
        downvotes: row.try_get("downvotes")?,
        top_listing: row.try_get("top_listing")?,
    })
}

fn row_to_listing(row: &SqliteRow) -> anyhow::Result<Listing> {
    Ok(Listing {
        id: row.try_get("id")?,
        move_slug: row.try_get("move_slug")?,
        created_at: row.try_get("created_at")?,
        description: row.try_get("description")?,
        success: row.try_get("success")?,
        partial: row.try_get("partial")?,
        failure: row.try_get("failure")?,
        stat: row.try_get("stat")?,
        upvotes: row.try_get("upvotes")?,
        downvotes: row.try_get("downvotes")?,
    })
}

#[async_trait]
impl WikiRepo for SqliteWikiRepo {
    async fn insert_move(&self, mv: &Move) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "INSERT INTO moves ({MOVE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(mv.id)
        .bind(&mv.condition)
        .bind(&mv.definition)
        .bind(&mv.slug)
        .bind(&mv.stat)
        .bind(serde_json::to_string(&mv.tags)?)
        .bind(mv.created_at)
        .bind(mv.upvotes)
        .bind(mv.downvotes)
        .bind(mv.top_listing)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Rewrites the editable fields. Counters are left alone so an edit
    /// cannot clobber votes cast while the form was open.
    async fn update_move(&self, mv: &Move) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE moves SET condition = ?, definition = ?, slug = ?, stat = ?, tags = ? WHERE id = ?",
        )
        .bind(&mv.condition)
        .bind(&mv.definition)
        .bind(&mv.slug)
        .bind(&mv.stat)
        .bind(serde_json::to_string(&mv.tags)?)
        .bind(mv.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_move(&self, id: Uuid) -> anyhow::Result<Option<Move>> {
        let row = sqlx::query(&format!("SELECT {MOVE_COLUMNS} FROM moves WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_move).transpose()
    }

    async fn find_moves_by_slug(&self, slug: &str) -> anyhow::Result<Vec<Move>> {
        sqlx::query(&format!(
            "SELECT {MOVE_COLUMNS} FROM moves WHERE slug = ? ORDER BY upvotes DESC, created_at ASC"
        ))
        .bind(slug)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(row_to_move)
        .collect()
    }

    async fn list_moves_paginated(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Move>> {
        sqlx::query(&format!(
            "SELECT {MOVE_COLUMNS} FROM moves ORDER BY created_at DESC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(row_to_move)
        .collect()
    }

    async fn list_moves_tagged(&self, tags: &[String], limit: i64) -> anyhow::Result<Vec<Move>> {
        let mut sql = format!("SELECT {MOVE_COLUMNS} FROM moves WHERE 1 = 1");
        for _ in tags {
            sql.push_str(" AND EXISTS (SELECT 1 FROM json_each(moves.tags) WHERE json_each.value = ?)");
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ?");

        let mut query = sqlx::query(&sql);
        for tag in tags {
            query = query.bind(tag);
        }

        query
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(row_to_move)
            .collect()
    }

    async fn vote_move(&self, id: Uuid, vote: Vote) -> anyhow::Result<Option<Move>> {
        let column = counter_column(vote);
        let updated = sqlx::query(&format!("UPDATE moves SET {column} = {column} + 1 WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_move(id).await
    }

    async fn set_top_listing(&self, slug: &str, listing_id: Option<Uuid>) -> anyhow::Result<()> {
        sqlx::query("UPDATE moves SET top_listing = ? WHERE slug = ?")
            .bind(listing_id)
            .bind(slug)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_listing(&self, listing: &Listing) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "INSERT INTO listings ({LISTING_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(listing.id)
        .bind(&listing.move_slug)
        .bind(listing.created_at)
        .bind(&listing.description)
        .bind(&listing.success)
        .bind(&listing.partial)
        .bind(&listing.failure)
        .bind(&listing.stat)
        .bind(listing.upvotes)
        .bind(listing.downvotes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_listing(&self, id: Uuid) -> anyhow::Result<Option<Listing>> {
        let row = sqlx::query(&format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_listing).transpose()
    }

    async fn listings_for_slug(&self, slug: &str) -> anyhow::Result<Vec<Listing>> {
        sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE move_slug = ? ORDER BY upvotes DESC, created_at ASC"
        ))
        .bind(slug)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(row_to_listing)
        .collect()
    }

    async fn top_listing(&self, slug: &str) -> anyhow::Result<Option<Listing>> {
        let row = sqlx::query(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE move_slug = ? ORDER BY upvotes DESC, created_at ASC LIMIT 1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_listing).transpose()
    }

    async fn vote_listing(&self, id: Uuid, vote: Vote) -> anyhow::Result<Option<Listing>> {
        let column = counter_column(vote);
        let updated = sqlx::query(&format!("UPDATE listings SET {column} = {column} + 1 WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_listing(id).await
    }

    async fn relink_listings(&self, from: &str, to: &str) -> anyhow::Result<u64> {
        let updated = sqlx::query("UPDATE listings SET move_slug = ? WHERE move_slug = ?")
            .bind(to)
            .bind(from)
            .execute(&self.pool)
            .await?;
        Ok(updated.rows_affected())
    }
}
