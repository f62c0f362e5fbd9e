//! # Domain Models
//!
//! These structs represent the core entities of movewiki.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::markdown;
use crate::slug::slugify;
use crate::tags::parse_tags;
use crate::validation::extract_stat;

/// A rules entry: "when you <condition>, roll +stat".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub id: Uuid,
    /// The title, e.g. "Hack & Slash"
    pub condition: String,
    /// Raw markdown as submitted
    pub definition: String,
    /// Derived from `condition` on every save
    pub slug: String,
    /// Derived from the "roll +X" clause of `definition` on every save
    pub stat: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub upvotes: i64,
    pub downvotes: i64,
    /// Cached id of the most upvoted listing under this slug
    pub top_listing: Option<Uuid>,
}

impl Move {
    pub fn new(draft: MoveDraft) -> Self {
        let mut mv = Self {
            id: Uuid::now_v7(),
            condition: draft.condition,
            definition: draft.definition,
            slug: String::new(),
            stat: String::new(),
            tags: parse_tags(draft.tags.as_deref().unwrap_or_default().split_whitespace()),
            created_at: Utc::now(),
            upvotes: 0,
            downvotes: 0,
            top_listing: None,
        };
        mv.refresh_derived();
        mv
    }

    /// Recomputes slug and stat. Called before every write.
    pub fn refresh_derived(&mut self) {
        self.slug = slugify(&self.condition);
        self.stat = extract_stat(&self.definition).unwrap_or_default();
    }

    /// Overwrites the fields that were actually submitted. Blank condition or
    /// definition keep the stored text.
    pub fn merge(&mut self, draft: MoveDraft) {
        if !draft.condition.trim().is_empty() {
            self.condition = draft.condition;
        }
        if !draft.definition.trim().is_empty() {
            self.definition = draft.definition;
        }
        // A submitted but empty tags field clears them.
        if let Some(tags) = draft.tags {
            self.tags = parse_tags(tags.split_whitespace());
        }
        self.refresh_derived();
    }

    pub fn url(&self) -> String {
        format!("/moves/{}", self.slug)
    }

    pub fn definition_url(&self) -> String {
        format!("/moves/{}/{}", self.slug, self.id)
    }

    pub fn id_url(&self) -> String {
        format!("/moves/{}", self.id)
    }

    pub fn display_date(&self) -> String {
        self.created_at.format("%d %b %Y").to_string()
    }

    pub fn rfc2822_date(&self) -> String {
        self.created_at.to_rfc2822()
    }

    pub fn definition_html(&self) -> String {
        markdown::render(&self.definition)
    }

    pub fn tags_line(&self) -> String {
        self.tags.join(" ")
    }

    pub fn is_top(&self, listing: &Listing) -> bool {
        self.top_listing == Some(listing.id)
    }
}

/// Fields submitted from the move form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveDraft {
    pub condition: String,
    pub definition: String,
    /// Whitespace separated; `None` when the field was not submitted
    pub tags: Option<String>,
}

/// A play example recorded under a move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    /// Back-reference to the owning move(s)
    pub move_slug: String,
    pub created_at: DateTime<Utc>,
    pub description: String,
    pub success: String,
    pub partial: String,
    pub failure: String,
    /// Copied from the move when the listing was created
    pub stat: String,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl Listing {
    pub fn new(owner: &Move, draft: ListingDraft) -> Self {
        Self {
            id: Uuid::now_v7(),
            move_slug: owner.slug.clone(),
            created_at: Utc::now(),
            description: draft.description,
            success: draft.success,
            partial: draft.partial,
            failure: draft.failure,
            stat: owner.stat.clone(),
            upvotes: 0,
            downvotes: 0,
        }
    }

    pub fn url(&self) -> String {
        format!("/listings/{}", self.id)
    }

    pub fn move_url(&self) -> String {
        format!("/moves/{}", self.move_slug)
    }

    pub fn display_date(&self) -> String {
        self.created_at.format("%d %b %Y").to_string()
    }
}

/// Fields submitted from the listing form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingDraft {
    pub description: String,
    pub success: String,
    pub partial: String,
    pub failure: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

impl FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Vote::Up),
            "down" => Ok(Vote::Down),
            other => Err(format!("unknown vote direction: {other}")),
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Up => f.write_str("up"),
            Vote::Down => f.write_str("down"),
        }
    }
}
