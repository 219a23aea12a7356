use super::search::SearchTerm;
use super::UnknownFilter;
use crate::model::{Collection, User};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionFilter {
    AllCollections,
    YourCollections,
    /// Collections the user collaborates on but does not own.
    Shared,
    Favorites,
    Saved,
    Deleted,
}

impl CollectionFilter {
    pub const ALL: [CollectionFilter; 6] = [
        CollectionFilter::AllCollections,
        CollectionFilter::YourCollections,
        CollectionFilter::Shared,
        CollectionFilter::Favorites,
        CollectionFilter::Saved,
        CollectionFilter::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionFilter::AllCollections => "all-collections",
            CollectionFilter::YourCollections => "your-collections",
            CollectionFilter::Shared => "shared",
            CollectionFilter::Favorites => "favorites",
            CollectionFilter::Saved => "saved",
            CollectionFilter::Deleted => "deleted",
        }
    }

    pub fn matches(&self, collection: &Collection, user: Option<&User>) -> bool {
        let owned = collection.is_owned_by(user);
        match self {
            CollectionFilter::AllCollections => !collection.deleted,
            CollectionFilter::YourCollections => owned && !collection.deleted,
            CollectionFilter::Shared => {
                let collaborates =
                    user.is_some_and(|u| collection.collaborators.iter().any(|c| *c == u.id));
                collaborates && !owned && !collection.deleted
            }
            CollectionFilter::Favorites => {
                user.is_some_and(|u| u.has_favorite(&collection.id)) && !collection.deleted
            }
            CollectionFilter::Saved => {
                user.is_some_and(|u| u.has_saved(&collection.id)) && !collection.deleted
            }
            CollectionFilter::Deleted => collection.deleted && owned,
        }
    }
}

impl fmt::Display for CollectionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CollectionFilter::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownFilter(s.to_string()))
    }
}

/// Base filter then search, order preserved.
pub fn filter_collections<'a>(
    collections: &'a [Collection],
    user: Option<&User>,
    filter: CollectionFilter,
    search: &str,
) -> Vec<&'a Collection> {
    let term = SearchTerm::parse(search);
    collections
        .iter()
        .filter(|c| filter.matches(c, user))
        .filter(|c| term.matches_collection(c))
        .collect()
}
