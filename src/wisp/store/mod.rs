//! # Entity Store
//!
//! The [`EntityStore`] is the canonical in-memory copy of a session: the prompt
//! and collection lists plus the signed-in [`User`]. Every mutation is a
//! synchronous, total operation over the current lists.
//!
//! ## Write Policy
//!
//! Last write wins. There are no version vectors or concurrency tokens; the
//! gateway is the source of truth and whatever it answered last is what the
//! store holds. Unknown ids are ignored rather than reported, callers are
//! expected to have loaded current state first.
//!
//! ## Record Kinds
//!
//! Operations that apply to both prompts and collections are generic over the
//! [`Record`] trait, so the entity kind is carried by the type:
//!
//! ```text
//! store.set_all::<Prompt>(prompts);
//! store.upsert_one(collection);
//! store.mark_deleted::<Prompt>("p1");
//! ```
//!
//! ## Change Notification
//!
//! Every mutation bumps a revision counter published on a
//! [`tokio::sync::watch`] channel. Views call [`EntityStore::subscribe`] and
//! recompute whenever the revision moves.
//!
//! ## Membership
//!
//! Favorites and saves live on the user record only. [`EntityStore::set_membership`]
//! sets presence to the given state, it never flips.

use crate::model::{Collection, Prompt, User};
use std::fmt;
use tokio::sync::watch;

pub mod session;

pub use session::{Generation, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Prompt,
    Collection,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Prompt => f.write_str("prompt"),
            EntityKind::Collection => f.write_str("collection"),
        }
    }
}

/// Which id list on the user record a membership refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipList {
    Favorites,
    Bought,
}

/// A record kind held by the store.
pub trait Record: Clone {
    const KIND: EntityKind;

    fn id(&self) -> &str;
    fn set_deleted(&mut self, deleted: bool);
    fn records(store: &EntityStore) -> &[Self];
    fn records_mut(store: &mut EntityStore) -> &mut Vec<Self>;
}

impl Record for Prompt {
    const KIND: EntityKind = EntityKind::Prompt;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    fn records(store: &EntityStore) -> &[Self] {
        &store.prompts
    }

    fn records_mut(store: &mut EntityStore) -> &mut Vec<Self> {
        &mut store.prompts
    }
}

impl Record for Collection {
    const KIND: EntityKind = EntityKind::Collection;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    fn records(store: &EntityStore) -> &[Self] {
        &store.collections
    }

    fn records_mut(store: &mut EntityStore) -> &mut Vec<Self> {
        &mut store.collections
    }
}

#[derive(Debug)]
pub struct EntityStore {
    prompts: Vec<Prompt>,
    collections: Vec<Collection>,
    user: Option<User>,
    selected: Option<String>,
    revision: watch::Sender<u64>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            prompts: Vec::new(),
            collections: Vec::new(),
            user: None,
            selected: None,
            revision,
        }
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn get<R: Record>(&self, id: &str) -> Option<&R> {
        R::records(self).iter().find(|r| r.id() == id)
    }

    pub fn prompt(&self, id: &str) -> Option<&Prompt> {
        self.get::<Prompt>(id)
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.get::<Collection>(id)
    }

    /// Replaces the full list for a kind.
    pub fn set_all<R: Record>(&mut self, records: Vec<R>) {
        tracing::debug!(kind = %R::KIND, count = records.len(), "replacing records");
        *R::records_mut(self) = records;
        self.bump();
    }

    /// Inserts at the head when the id is unseen, otherwise replaces in place.
    pub fn upsert_one<R: Record>(&mut self, record: R) {
        let list = R::records_mut(self);
        match list.iter().position(|r| r.id() == record.id()) {
            Some(pos) => list[pos] = record,
            None => list.insert(0, record),
        }
        self.bump();
    }

    pub fn mark_deleted<R: Record>(&mut self, id: &str) {
        self.set_deleted::<R>(id, true);
    }

    pub fn mark_restored<R: Record>(&mut self, id: &str) {
        self.set_deleted::<R>(id, false);
    }

    fn set_deleted<R: Record>(&mut self, id: &str, deleted: bool) {
        let Some(record) = R::records_mut(self).iter_mut().find(|r| r.id() == id) else {
            tracing::debug!(kind = %R::KIND, id, "ignoring soft-delete flag for unknown id");
            return;
        };
        record.set_deleted(deleted);
        self.bump();
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
        self.bump();
    }

    /// Sets whether `id` is present in one of the user's membership lists.
    pub fn set_membership(&mut self, list: MembershipList, id: &str, present: bool) {
        let Some(mut user) = self.user.clone() else {
            tracing::debug!(id, "no user in session, membership change ignored");
            return;
        };
        let ids = match list {
            MembershipList::Favorites => &mut user.favorites,
            MembershipList::Bought => &mut user.bought,
        };
        ids.retain(|existing| existing != id);
        if present {
            ids.push(id.to_string());
        }
        self.set_user(Some(user));
    }

    /// Records that `prompt_id` belongs to `collection_id` on both sides.
    pub fn link_prompt(&mut self, collection_id: &str, prompt_id: &str) {
        if let Some(collection) = self.collections.iter_mut().find(|c| c.id == collection_id) {
            if !collection.contains_prompt(prompt_id) {
                collection.prompts.push(prompt_id.to_string());
            }
        }
        if let Some(prompt) = self.prompts.iter_mut().find(|p| p.id == prompt_id) {
            if !prompt.in_collection(collection_id) {
                prompt.collections.push(collection_id.to_string());
            }
        }
        self.bump();
    }

    pub fn unlink_prompt(&mut self, collection_id: &str, prompt_id: &str) {
        if let Some(collection) = self.collections.iter_mut().find(|c| c.id == collection_id) {
            collection.prompts.retain(|p| p != prompt_id);
        }
        if let Some(prompt) = self.prompts.iter_mut().find(|p| p.id == prompt_id) {
            prompt.collections.retain(|c| c != collection_id);
        }
        self.bump();
    }

    pub fn select(&mut self, id: Option<String>) {
        self.selected = id;
        self.bump();
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_prompt(&self) -> Option<&Prompt> {
        self.selected.as_deref().and_then(|id| self.prompt(id))
    }

    /// Drops every record, the user and the selection.
    pub fn clear(&mut self) {
        self.prompts.clear();
        self.collections.clear();
        self.user = None;
        self.selected = None;
        self.bump();
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&mut self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use crate::model::{Prompt, PromptInsert, User, Visibility};
    use chrono::Utc;

    pub fn prompt(id: &str, title: &str, owner: &str, tags: &[&str]) -> Prompt {
        let mut prompt = Prompt::new(
            owner,
            PromptInsert {
                title: title.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                visibility: Visibility::Public,
                ..Default::default()
            },
        );
        prompt.id = id.to_string();
        prompt
    }

    pub fn deleted_prompt(id: &str, title: &str, owner: &str) -> Prompt {
        let mut prompt = prompt(id, title, owner, &[]);
        prompt.deleted = true;
        prompt.updated_at = Utc::now();
        prompt
    }

    pub fn user(id: &str) -> User {
        User::new(id, format!("user-{}", id))
    }
}
