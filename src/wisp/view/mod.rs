//! # Derived Views
//!
//! Pure functions from store contents to the lists the UI shows. Nothing here
//! mutates state or talks to the gateway, and nothing here fails: an unknown
//! filter key yields an empty list.
//!
//! ## Prompt Pipeline
//!
//! ```text
//! prompts ─▶ base filter ─▶ collection ─▶ search ─▶ tags ─▶ result
//! ```
//!
//! Each stage only narrows. Input order is preserved throughout; the only
//! reordering is [`sort_alphabetically`], which callers opt into.
//!
//! | Key            | Keeps                              |
//! |----------------|------------------------------------|
//! | `all`          | nothing (the home dashboard)       |
//! | `all-prompts`  | not deleted                        |
//! | `your-prompts` | owned, not deleted                 |
//! | `favorites`    | in `user.favorites`, not deleted   |
//! | `saved`        | in `user.bought`, not deleted      |
//! | `deleted`      | deleted and owned                  |
//!
//! ## Membership
//!
//! Whether a prompt is a favorite or saved is always answered from the
//! [`User`] record at query time. [`PromptView`] carries the answer for one
//! render; it is never written back into a [`Prompt`].

use crate::model::{Prompt, User};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub mod collections;
pub mod search;

pub use collections::{filter_collections, CollectionFilter};
pub use search::SearchTerm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Home,
    AllPrompts,
    YourPrompts,
    Favorites,
    Saved,
    Deleted,
}

impl FilterKey {
    pub const ALL: [FilterKey; 6] = [
        FilterKey::Home,
        FilterKey::AllPrompts,
        FilterKey::YourPrompts,
        FilterKey::Favorites,
        FilterKey::Saved,
        FilterKey::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Home => "all",
            FilterKey::AllPrompts => "all-prompts",
            FilterKey::YourPrompts => "your-prompts",
            FilterKey::Favorites => "favorites",
            FilterKey::Saved => "saved",
            FilterKey::Deleted => "deleted",
        }
    }

    pub fn matches(&self, prompt: &Prompt, user: Option<&User>) -> bool {
        match self {
            FilterKey::Home => false,
            FilterKey::AllPrompts => !prompt.deleted,
            FilterKey::YourPrompts => prompt.is_owned_by(user) && !prompt.deleted,
            FilterKey::Favorites => {
                user.is_some_and(|u| u.has_favorite(&prompt.id)) && !prompt.deleted
            }
            FilterKey::Saved => user.is_some_and(|u| u.has_saved(&prompt.id)) && !prompt.deleted,
            FilterKey::Deleted => prompt.deleted && prompt.is_owned_by(user),
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFilter(pub String);

impl fmt::Display for UnknownFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter '{}'", self.0)
    }
}

impl std::error::Error for UnknownFilter {}

impl FromStr for FilterKey {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        FilterKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownFilter(s.to_string()))
    }
}

/// Everything that narrows a prompt list besides the base filter key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub search: String,
    pub tags: Vec<String>,
    pub collection: Option<String>,
}

impl ViewQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection = Some(collection_id.into());
        self
    }
}

/// Runs the full pipeline for `key`.
pub fn filter_prompts<'a>(
    prompts: &'a [Prompt],
    user: Option<&User>,
    key: FilterKey,
    query: &ViewQuery,
) -> Vec<&'a Prompt> {
    let term = SearchTerm::parse(&query.search);
    prompts
        .iter()
        .filter(|p| key.matches(p, user))
        .filter(|p| match query.collection.as_deref() {
            Some(collection_id) => p.in_collection(collection_id),
            None => true,
        })
        .filter(|p| term.matches_prompt(p))
        .filter(|p| p.has_all_tags(&query.tags))
        .collect()
}

/// Like [`filter_prompts`], with the key given as a string. Unknown keys yield nothing.
pub fn filter_prompts_by_key<'a>(
    prompts: &'a [Prompt],
    user: Option<&User>,
    key: &str,
    query: &ViewQuery,
) -> Vec<&'a Prompt> {
    match key.parse::<FilterKey>() {
        Ok(key) => filter_prompts(prompts, user, key, query),
        Err(e) => {
            tracing::debug!(error = %e, "empty view for unrecognized filter");
            Vec::new()
        }
    }
}

/// Case-insensitive title order; titles equal ignoring case fall back to exact order.
pub fn sort_alphabetically(prompts: &mut [&Prompt]) {
    prompts.sort_by_cached_key(|p| (p.title.to_lowercase(), p.title.clone()));
}

/// Prompts the user could add to `collection_id`: owned or saved, not deleted,
/// not already members. Sorted alphabetically.
pub fn available_for_collection<'a>(
    prompts: &'a [Prompt],
    user: Option<&User>,
    collection_id: &str,
) -> Vec<&'a Prompt> {
    let mut available: Vec<&Prompt> = prompts
        .iter()
        .filter(|p| !p.deleted && !p.in_collection(collection_id))
        .filter(|p| p.is_owned_by(user) || user.is_some_and(|u| u.has_saved(&p.id)))
        .collect();
    sort_alphabetically(&mut available);
    available
}

/// Sorted distinct tags across non-deleted prompts.
pub fn distinct_tags(prompts: &[Prompt]) -> Vec<String> {
    prompts
        .iter()
        .filter(|p| !p.deleted)
        .flat_map(|p| p.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// A prompt plus the user-relative flags computed for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptView {
    pub prompt: Prompt,
    pub is_owner: bool,
    pub is_favorite: bool,
    pub is_saved: bool,
}

impl PromptView {
    pub fn project(prompt: &Prompt, user: Option<&User>) -> Self {
        Self {
            prompt: prompt.clone(),
            is_owner: prompt.is_owned_by(user),
            is_favorite: user.is_some_and(|u| u.has_favorite(&prompt.id)),
            is_saved: user.is_some_and(|u| u.has_saved(&prompt.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::{deleted_prompt, prompt, user};

    fn ids(prompts: &[&Prompt]) -> Vec<String> {
        prompts.iter().map(|p| p.id.clone()).collect()
    }

    fn sample() -> (Vec<Prompt>, User) {
        let mut owner = user("u1");
        owner.favorites = vec!["p2".into(), "p4".into()];
        owner.bought = vec!["p3".into()];
        let prompts = vec![
            prompt("p1", "Email Writer", "u1", &["email", "business"]),
            prompt("p2", "Code Review", "u2", &["code"]),
            prompt("p3", "Story Starter", "u2", &["fiction"]),
            deleted_prompt("p4", "Old Favorite", "u1"),
            deleted_prompt("p5", "Someone Else's Trash", "u2"),
        ];
        (prompts, owner)
    }

    #[test]
    fn filter_keys_parse_and_print() {
        for key in FilterKey::ALL {
            assert_eq!(key.as_str().parse::<FilterKey>().unwrap(), key);
        }
        assert!("trash".parse::<FilterKey>().is_err());
    }

    #[test]
    fn base_filters() {
        let (prompts, u) = sample();
        let q = ViewQuery::new();
        let run = |key| ids(&filter_prompts(&prompts, Some(&u), key, &q));

        assert!(run(FilterKey::Home).is_empty());
        assert_eq!(run(FilterKey::AllPrompts), vec!["p1", "p2", "p3"]);
        assert_eq!(run(FilterKey::YourPrompts), vec!["p1"]);
        assert_eq!(run(FilterKey::Favorites), vec!["p2"]);
        assert_eq!(run(FilterKey::Saved), vec!["p3"]);
        assert_eq!(run(FilterKey::Deleted), vec!["p4"]);
    }

    #[test]
    fn unknown_key_yields_empty_list() {
        let (prompts, u) = sample();
        let result = filter_prompts_by_key(&prompts, Some(&u), "trending", &ViewQuery::new());
        assert!(result.is_empty());

        let result = filter_prompts_by_key(&prompts, Some(&u), "all-prompts", &ViewQuery::new());
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn without_user_nothing_is_owned_or_a_member() {
        let (prompts, _) = sample();
        let q = ViewQuery::new();
        assert_eq!(filter_prompts(&prompts, None, FilterKey::AllPrompts, &q).len(), 3);
        assert!(filter_prompts(&prompts, None, FilterKey::YourPrompts, &q).is_empty());
        assert!(filter_prompts(&prompts, None, FilterKey::Favorites, &q).is_empty());
        assert!(filter_prompts(&prompts, None, FilterKey::Deleted, &q).is_empty());
    }

    #[test]
    fn deleted_prompts_never_leak_into_live_views() {
        let (prompts, u) = sample();
        let q = ViewQuery::new().with_search("old");
        for key in [
            FilterKey::AllPrompts,
            FilterKey::YourPrompts,
            FilterKey::Favorites,
            FilterKey::Saved,
        ] {
            assert!(filter_prompts(&prompts, Some(&u), key, &q)
                .iter()
                .all(|p| !p.deleted));
        }
    }

    #[test]
    fn collection_narrowing() {
        let (mut prompts, u) = sample();
        prompts[0].collections = vec!["c1".into()];
        prompts[2].collections = vec!["c1".into(), "c2".into()];

        let q = ViewQuery::new().with_collection("c1");
        let result = filter_prompts(&prompts, Some(&u), FilterKey::AllPrompts, &q);
        assert_eq!(ids(&result), vec!["p1", "p3"]);
    }

    #[test]
    fn hash_search_matches_tags_only() {
        let prompts = vec![
            prompt("a", "Untitled", "u1", &["email"]),
            prompt("b", "email campaign", "u1", &[]),
        ];
        let q = ViewQuery::new().with_search("#email");
        let result = filter_prompts(&prompts, None, FilterKey::AllPrompts, &q);
        assert_eq!(ids(&result), vec!["a"]);

        let q = ViewQuery::new().with_search("email");
        let result = filter_prompts(&prompts, None, FilterKey::AllPrompts, &q);
        assert_eq!(ids(&result), vec!["a", "b"]);
    }

    #[test]
    fn tag_narrowing_requires_every_selected_tag() {
        let prompts = vec![
            prompt("a", "A", "u1", &["email"]),
            prompt("b", "B", "u1", &["email", "urgent", "work"]),
        ];
        let q = ViewQuery::new().with_tags(["email", "urgent"]);
        let result = filter_prompts(&prompts, None, FilterKey::AllPrompts, &q);
        assert_eq!(ids(&result), vec!["b"]);
    }

    #[test]
    fn adding_tags_never_grows_the_result() {
        let prompts = vec![
            prompt("a", "A", "u1", &["email"]),
            prompt("b", "B", "u1", &["email", "urgent"]),
            prompt("c", "C", "u1", &["email", "urgent", "work"]),
            prompt("d", "D", "u1", &["work"]),
        ];
        let tag_sets: [&[&str]; 4] = [
            &[],
            &["email"],
            &["email", "urgent"],
            &["email", "urgent", "work"],
        ];
        let mut previous: Option<Vec<String>> = None;
        for tags in tag_sets {
            let q = ViewQuery::new().with_tags(tags.iter().copied());
            let result = ids(&filter_prompts(&prompts, None, FilterKey::AllPrompts, &q));
            if let Some(prev) = &previous {
                assert!(result.iter().all(|id| prev.contains(id)));
            }
            previous = Some(result);
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let (prompts, u) = sample();
        let q = ViewQuery::new().with_search("e");
        for key in FilterKey::ALL.into_iter().filter(|k| *k != FilterKey::Home) {
            let once: Vec<Prompt> = filter_prompts(&prompts, Some(&u), key, &q)
                .into_iter()
                .cloned()
                .collect();
            let twice = filter_prompts(&once, Some(&u), key, &q);
            assert_eq!(ids(&twice), once.iter().map(|p| p.id.clone()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn filtering_preserves_input_order() {
        let prompts = vec![
            prompt("z", "Zebra", "u1", &[]),
            prompt("a", "Apple", "u1", &[]),
            prompt("m", "Mango", "u1", &[]),
        ];
        let result = filter_prompts(&prompts, None, FilterKey::AllPrompts, &ViewQuery::new());
        assert_eq!(ids(&result), vec!["z", "a", "m"]);
    }

    #[test]
    fn available_for_collection_is_sorted_and_excludes_members() {
        let mut u = user("u1");
        u.bought = vec!["s1".into()];
        let mut member = prompt("m1", "Already In", "u1", &[]);
        member.collections = vec!["c1".into()];
        let prompts = vec![
            prompt("p1", "zeta", "u1", &[]),
            prompt("p2", "Alpha", "u1", &[]),
            member,
            prompt("s1", "beta", "u2", &[]),
            prompt("x1", "Not mine", "u2", &[]),
            deleted_prompt("d1", "Gone", "u1"),
        ];
        let result = available_for_collection(&prompts, Some(&u), "c1");
        assert_eq!(ids(&result), vec!["p2", "s1", "p1"]);
    }

    #[test]
    fn distinct_tags_skips_deleted() {
        let mut gone = prompt("p3", "C", "u1", &["secret"]);
        gone.deleted = true;
        let prompts = vec![
            prompt("p1", "A", "u1", &["work", "email"]),
            prompt("p2", "B", "u1", &["email"]),
            gone,
        ];
        assert_eq!(distinct_tags(&prompts), vec!["email", "work"]);
    }

    #[test]
    fn projection_reads_membership_from_user() {
        let (prompts, u) = sample();
        let view = PromptView::project(&prompts[1], Some(&u));
        assert!(view.is_favorite);
        assert!(!view.is_saved);
        assert!(!view.is_owner);

        let view = PromptView::project(&prompts[0], Some(&u));
        assert!(view.is_owner);
        assert!(!view.is_favorite);
    }
}
