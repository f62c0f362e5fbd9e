//! # Service operations
//!
//! Each function is one logical operation over a [`WikiRepo`]. Handlers call
//! these and only decide how to render the outcome.

use log::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Listing, ListingDraft, Move, MoveDraft, Vote};
use crate::traits::WikiRepo;
use crate::validation::validate_move;

/// Largest page the move index will serve.
pub const MAX_PAGE_SIZE: i64 = 50;

pub fn clamp_page_size(requested: Option<i64>, default: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}

/// One page of the move index, newest first.
#[derive(Debug, Clone)]
pub struct MovePage {
    pub moves: Vec<Move>,
    pub page: i64,
    pub per_page: i64,
    pub has_more: bool,
}

impl MovePage {
    pub fn prev_page(&self) -> Option<i64> {
        (self.page > 1).then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<i64> {
        self.has_more.then(|| self.page.saturating_add(1))
    }
}

/// `page` is 1-based; `per_page` must already be clamped.
pub async fn recent_moves(repo: &dyn WikiRepo, page: i64, per_page: i64) -> Result<MovePage> {
    let page = page.max(1);
    // A page past any representable offset is simply empty.
    let Some(offset) = (page - 1).checked_mul(per_page) else {
        return Ok(MovePage {
            moves: Vec::new(),
            page,
            per_page,
            has_more: false,
        });
    };

    // One extra row tells us whether an older page exists.
    let mut moves = repo.list_moves_paginated(per_page + 1, offset).await?;
    let has_more = moves.len() as i64 > per_page;
    moves.truncate(per_page as usize);

    Ok(MovePage {
        moves,
        page,
        per_page,
        has_more,
    })
}

pub async fn tagged_moves(repo: &dyn WikiRepo, tags: &[String]) -> Result<Vec<Move>> {
    Ok(repo.list_moves_tagged(tags, MAX_PAGE_SIZE).await?)
}

pub async fn create_move(repo: &dyn WikiRepo, draft: MoveDraft) -> Result<Move> {
    let mv = Move::new(draft);
    let errors = validate_move(&mv);
    if !errors.is_empty() {
        debug!("rejected move {:?}: {:?}", mv.condition, errors);
        return Err(AppError::Invalid(errors));
    }

    repo.insert_move(&mv).await?;
    info!("created move {} ({})", mv.id, mv.slug);
    Ok(mv)
}

/// Merges the submitted fields into an existing move and saves it. The slug
/// follows the (possibly renamed) condition.
///
/// On a rename the listings follow the move when it was the last definition
/// under the old slug; otherwise they stay with the definitions left behind.
/// Either way the renamed move's top listing is recomputed for its new slug.
pub async fn edit_move(repo: &dyn WikiRepo, id: Uuid, draft: MoveDraft) -> Result<Move> {
    let mut mv = get_move(repo, id).await?;
    let old_slug = mv.slug.clone();
    mv.merge(draft);

    let errors = validate_move(&mv);
    if !errors.is_empty() {
        return Err(AppError::Invalid(errors));
    }

    repo.update_move(&mv).await?;
    info!("edited move {} ({})", mv.id, mv.slug);

    if mv.slug != old_slug {
        if repo.find_moves_by_slug(&old_slug).await?.is_empty() {
            let moved = repo.relink_listings(&old_slug, &mv.slug).await?;
            info!("moved {moved} listings from {old_slug} to {}", mv.slug);
        }
        mv.top_listing = refresh_top_listing(repo, &mv.slug).await?;
    }
    Ok(mv)
}

pub async fn get_move(repo: &dyn WikiRepo, id: Uuid) -> Result<Move> {
    repo.get_move(id)
        .await?
        .ok_or_else(|| AppError::NotFound("move".into(), id.to_string()))
}

/// All definitions under `slug`; an unknown slug is a not-found.
pub async fn moves_for_slug(repo: &dyn WikiRepo, slug: &str) -> Result<Vec<Move>> {
    let moves = repo.find_moves_by_slug(slug).await?;
    if moves.is_empty() {
        return Err(AppError::NotFound("move".into(), slug.to_string()));
    }
    Ok(moves)
}

pub async fn vote_on_move(repo: &dyn WikiRepo, id: Uuid, vote: Vote) -> Result<Move> {
    repo.vote_move(id, vote)
        .await?
        .ok_or_else(|| AppError::NotFound("move".into(), id.to_string()))
}

pub async fn add_listing(repo: &dyn WikiRepo, slug: &str, draft: ListingDraft) -> Result<Listing> {
    if draft.description.trim().is_empty() {
        return Err(AppError::Invalid(vec!["description must not be blank".into()]));
    }

    let owner = moves_for_slug(repo, slug)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("move".into(), slug.to_string()))?;

    let listing = Listing::new(&owner, draft);
    repo.insert_listing(&listing).await?;
    info!("added listing {} under {}", listing.id, listing.move_slug);

    refresh_top_listing(repo, &listing.move_slug).await?;
    Ok(listing)
}

pub async fn get_listing(repo: &dyn WikiRepo, id: Uuid) -> Result<Listing> {
    repo.get_listing(id)
        .await?
        .ok_or_else(|| AppError::NotFound("listing".into(), id.to_string()))
}

/// Counts the vote, then recomputes the owning move's top listing.
///
/// The two steps are not atomic: a concurrent vote may land between them and
/// the cached reference can lag until the next vote.
pub async fn vote_on_listing(repo: &dyn WikiRepo, id: Uuid, vote: Vote) -> Result<Listing> {
    let listing = repo
        .vote_listing(id, vote)
        .await?
        .ok_or_else(|| AppError::NotFound("listing".into(), id.to_string()))?;

    refresh_top_listing(repo, &listing.move_slug).await?;
    Ok(listing)
}

/// Re-queries the most upvoted listing for `slug` and caches its id on every
/// move under it. A slug without listings has its cache cleared.
pub async fn refresh_top_listing(repo: &dyn WikiRepo, slug: &str) -> Result<Option<Uuid>> {
    let top = repo.top_listing(slug).await?.map(|listing| listing.id);
    repo.set_top_listing(slug, top).await?;
    debug!("top listing for {slug} is now {top:?}");
    Ok(top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockWikiRepo;
    use crate::validation::MISSING_SUCCESS;
    use mockall::predicate::eq;

    const DEFINITION: &str = "When you act under fire, roll +cool. On a 10+, you do it. On a 7-9, you flinch.";

    fn draft(condition: &str, definition: &str) -> MoveDraft {
        MoveDraft {
            condition: condition.into(),
            definition: definition.into(),
            tags: Some("Basic  apocalypse-world".into()),
        }
    }

    fn listing_under(slug: &str, upvotes: i64) -> Listing {
        let owner = Move::new(draft(slug, DEFINITION));
        let mut listing = Listing::new(&owner, ListingDraft {
            description: "Ran through the fire".into(),
            ..Default::default()
        });
        listing.upvotes = upvotes;
        listing
    }

    #[tokio::test]
    async fn create_move_derives_and_persists() {
        let mut repo = MockWikiRepo::new();
        repo.expect_insert_move()
            .withf(|mv| mv.slug == "act-under-fire" && mv.stat == "cool")
            .times(1)
            .returning(|_| Ok(()));

        let mv = create_move(&repo, draft("Act Under Fire", DEFINITION)).await.unwrap();
        assert_eq!(mv.tags, vec!["basic", "apocalypse-world"]);
        assert_eq!(mv.upvotes, 0);
        assert!(mv.top_listing.is_none());
    }

    #[tokio::test]
    async fn invalid_move_is_never_persisted() {
        let mut repo = MockWikiRepo::new();
        repo.expect_insert_move().never();

        let err = create_move(&repo, draft("Act Under Fire", "roll +cool. On a 7-9, you flinch."))
            .await
            .unwrap_err();
        match err {
            AppError::Invalid(errors) => assert!(errors.contains(&MISSING_SUCCESS.to_string())),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn edit_recomputes_slug() {
        let original = Move::new(draft("Act Under Fire", DEFINITION));
        let id = original.id;

        let mut repo = MockWikiRepo::new();
        repo.expect_get_move()
            .with(eq(id))
            .returning(move |_| Ok(Some(original.clone())));
        repo.expect_update_move()
            .withf(|mv| mv.slug == "keep-your-cool" && mv.condition == "Keep your cool")
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_find_moves_by_slug()
            .withf(|slug| slug == "act-under-fire")
            .returning(|_| Ok(vec![]));
        repo.expect_relink_listings()
            .withf(|from, to| from == "act-under-fire" && to == "keep-your-cool")
            .times(1)
            .returning(|_, _| Ok(2));
        repo.expect_top_listing()
            .withf(|slug| slug == "keep-your-cool")
            .returning(|_| Ok(None));
        repo.expect_set_top_listing()
            .withf(|slug, id| slug == "keep-your-cool" && id.is_none())
            .times(1)
            .returning(|_, _| Ok(()));

        let edited = edit_move(&repo, id, MoveDraft {
            condition: "Keep your cool".into(),
            ..Default::default()
        })
        .await
        .unwrap();
        assert_eq!(edited.definition, DEFINITION);
        assert_eq!(edited.tags, vec!["basic", "apocalypse-world"]);
    }

    #[tokio::test]
    async fn rename_leaves_listings_with_remaining_definitions() {
        let renamed = Move::new(draft("Act Under Fire", DEFINITION));
        let sibling = Move::new(draft("Act Under Fire", DEFINITION));
        let id = renamed.id;

        let mut repo = MockWikiRepo::new();
        repo.expect_get_move().returning(move |_| Ok(Some(renamed.clone())));
        repo.expect_update_move().returning(|_| Ok(()));
        repo.expect_find_moves_by_slug()
            .withf(|slug| slug == "act-under-fire")
            .returning(move |_| Ok(vec![sibling.clone()]));
        repo.expect_relink_listings().never();
        repo.expect_top_listing().returning(|_| Ok(None));
        repo.expect_set_top_listing()
            .withf(|slug, id| slug == "keep-your-cool" && id.is_none())
            .times(1)
            .returning(|_, _| Ok(()));

        let edited = edit_move(&repo, id, MoveDraft {
            condition: "Keep your cool".into(),
            ..Default::default()
        })
        .await
        .unwrap();
        assert!(edited.top_listing.is_none());
    }

    #[tokio::test]
    async fn edit_without_rename_keeps_listings_alone() {
        let stored = Move::new(draft("Act Under Fire", DEFINITION));
        let id = stored.id;

        let mut repo = MockWikiRepo::new();
        repo.expect_get_move().returning(move |_| Ok(Some(stored.clone())));
        repo.expect_update_move().times(1).returning(|_| Ok(()));
        repo.expect_relink_listings().never();
        repo.expect_set_top_listing().never();

        edit_move(&repo, id, MoveDraft {
            tags: Some(String::new()),
            ..Default::default()
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn voting_up_updates_top_listing() {
        let voted = listing_under("Act Under Fire", 3);
        let voted_id = voted.id;
        let voted_for_top = voted.clone();

        let mut repo = MockWikiRepo::new();
        repo.expect_vote_listing()
            .with(eq(voted_id), eq(Vote::Up))
            .times(1)
            .returning(move |_, _| Ok(Some(voted.clone())));
        repo.expect_top_listing()
            .withf(|slug| slug == "act-under-fire")
            .times(1)
            .returning(move |_| Ok(Some(voted_for_top.clone())));
        repo.expect_set_top_listing()
            .withf(move |slug, id| slug == "act-under-fire" && *id == Some(voted_id))
            .times(1)
            .returning(|_, _| Ok(()));

        let listing = vote_on_listing(&repo, voted_id, Vote::Up).await.unwrap();
        assert_eq!(listing.upvotes, 3);
    }

    #[tokio::test]
    async fn voting_on_unknown_listing_is_not_found() {
        let mut repo = MockWikiRepo::new();
        repo.expect_vote_listing().returning(|_, _| Ok(None));
        repo.expect_set_top_listing().never();

        let err = vote_on_listing(&repo, Uuid::now_v7(), Vote::Down).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn listing_for_unknown_slug_is_not_found() {
        let mut repo = MockWikiRepo::new();
        repo.expect_find_moves_by_slug().returning(|_| Ok(vec![]));
        repo.expect_insert_listing().never();

        let err = add_listing(&repo, "nope", ListingDraft {
            description: "x".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn recent_moves_detects_older_page() {
        let mut repo = MockWikiRepo::new();
        repo.expect_list_moves_paginated()
            .with(eq(3i64), eq(2i64))
            .returning(|limit, _| {
                Ok((0..limit).map(|i| Move::new(draft(&format!("Move {i}"), DEFINITION))).collect())
            });

        let page = recent_moves(&repo, 2, 2).await.unwrap();
        assert_eq!(page.moves.len(), 2);
        assert_eq!(page.prev_page(), Some(1));
        assert_eq!(page.next_page(), Some(3));
    }

    #[tokio::test]
    async fn huge_page_number_is_empty() {
        let mut repo = MockWikiRepo::new();
        repo.expect_list_moves_paginated().never();

        let page = recent_moves(&repo, i64::MAX, 20).await.unwrap();
        assert!(page.moves.is_empty());
        assert_eq!(page.next_page(), None);
        assert_eq!(page.prev_page(), Some(i64::MAX - 1));
    }

    #[test]
    fn page_size_is_capped() {
        assert_eq!(clamp_page_size(Some(500), 20), MAX_PAGE_SIZE);
        assert_eq!(clamp_page_size(None, 20), 20);
        assert_eq!(clamp_page_size(Some(0), 20), 1);
    }
}
