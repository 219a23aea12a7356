use super::Gateway;
use crate::error::{Result, WispError};
use crate::model::{
    Collection, CollectionInsert, CollectionUpdate, FavoriteState, Prompt, PromptInsert,
    PromptUpdate, SaveState, User, Visibility,
};
use crate::view::distinct_tags;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Failure every subsequent call answers with, until cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Answers like a `503`.
    Unavailable,
    Unauthorized,
}

impl InjectedFailure {
    fn to_error(self) -> WispError {
        match self {
            InjectedFailure::Unavailable => WispError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            },
            InjectedFailure::Unauthorized => WispError::Unauthorized,
        }
    }
}

#[derive(Debug, Default)]
struct Backend {
    user: Option<User>,
    prompts: Vec<Prompt>,
    collections: Vec<Collection>,
    failure: Option<InjectedFailure>,
    calls: usize,
}

impl Backend {
    fn user_id(&self) -> Result<String> {
        self.user
            .as_ref()
            .map(|u| u.id.clone())
            .ok_or(WispError::Unauthorized)
    }

    fn user_mut(&mut self) -> Result<&mut User> {
        self.user.as_mut().ok_or(WispError::Unauthorized)
    }

    fn visible_prompts(&self) -> Vec<Prompt> {
        let user = self.user.as_ref();
        self.prompts
            .iter()
            .filter(|p| {
                p.visibility == Visibility::Public
                    || p.is_owned_by(user)
                    || user.is_some_and(|u| u.has_saved(&p.id))
            })
            .cloned()
            .collect()
    }

    fn owned_prompt_mut(&mut self, id: &str) -> Result<&mut Prompt> {
        let owner = self.user_id()?;
        let prompt = self
            .prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| WispError::NotFound(id.to_string()))?;
        if prompt.owner_id != owner {
            return Err(WispError::Unauthorized);
        }
        Ok(prompt)
    }

    fn prompt_exists(&self, id: &str) -> Result<()> {
        if self.prompts.iter().any(|p| p.id == id) {
            Ok(())
        } else {
            Err(WispError::NotFound(id.to_string()))
        }
    }

    fn editable_collection_mut(&mut self, id: &str) -> Result<&mut Collection> {
        let editor = self.user_id()?;
        let collection = self
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| WispError::NotFound(id.to_string()))?;
        if collection.owner_id != editor && !collection.collaborators.contains(&editor) {
            return Err(WispError::Unauthorized);
        }
        Ok(collection)
    }
}

fn toggle_id(ids: &mut Vec<String>, id: &str) -> bool {
    if let Some(pos) = ids.iter().position(|existing| existing == id) {
        ids.remove(pos);
        false
    } else {
        ids.push(id.to_string());
        true
    }
}

/// In-process backend honoring the same contract as the REST API.
///
/// State changes when a call is received; the answer is returned after the
/// next queued delay, if any. Two overlapping calls can therefore answer out
/// of order, as real requests can.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    backend: Mutex<Backend>,
    delays: Mutex<VecDeque<Duration>>,
}

impl InMemoryGateway {
    pub fn new(user: User) -> Self {
        let gateway = Self::default();
        gateway.backend().user = Some(user);
        gateway
    }

    /// No session: every call that needs a user answers unauthorized.
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn with_prompts(self, prompts: Vec<Prompt>) -> Self {
        self.backend().prompts = prompts;
        self
    }

    pub fn with_collections(self, collections: Vec<Collection>) -> Self {
        self.backend().collections = collections;
        self
    }

    pub fn fail_with(&self, failure: Option<InjectedFailure>) {
        self.backend().failure = failure;
    }

    /// Delays the answer of the next call not yet delayed.
    pub fn queue_delay(&self, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(delay);
    }

    /// Number of calls received, failed ones included.
    pub fn calls(&self) -> usize {
        self.backend().calls
    }

    pub fn user(&self) -> Option<User> {
        self.backend().user.clone()
    }

    pub fn prompt(&self, id: &str) -> Option<Prompt> {
        self.backend().prompts.iter().find(|p| p.id == id).cloned()
    }

    fn backend(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn call<T>(&self, op: impl FnOnce(&mut Backend) -> Result<T>) -> Result<T> {
        let delay = self
            .delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let result = {
            let mut backend = self.backend();
            backend.calls += 1;
            match backend.failure {
                Some(failure) => Err(failure.to_error()),
                None => op(&mut *backend),
            }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn current_user(&self) -> Result<User> {
        self.call(|b| b.user.clone().ok_or(WispError::Unauthorized)).await
    }

    async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        self.call(|b| Ok(b.visible_prompts())).await
    }

    async fn create_prompt(&self, insert: &PromptInsert) -> Result<Prompt> {
        self.call(|b| {
            let prompt = Prompt::new(b.user_id()?, insert.clone());
            b.user_mut()?.owned_prompts.push(prompt.id.clone());
            b.prompts.insert(0, prompt.clone());
            Ok(prompt)
        })
        .await
    }

    async fn update_prompt(&self, id: &str, update: &PromptUpdate) -> Result<Prompt> {
        self.call(|b| {
            let prompt = b.owned_prompt_mut(id)?;
            update.apply_to(prompt);
            Ok(prompt.clone())
        })
        .await
    }

    async fn delete_prompt(&self, id: &str) -> Result<()> {
        self.call(|b| {
            b.owned_prompt_mut(id)?.deleted = true;
            Ok(())
        })
        .await
    }

    async fn toggle_favorite(&self, prompt_id: &str) -> Result<FavoriteState> {
        self.call(|b| {
            b.prompt_exists(prompt_id)?;
            let is_favorite = toggle_id(&mut b.user_mut()?.favorites, prompt_id);
            Ok(FavoriteState { is_favorite })
        })
        .await
    }

    async fn toggle_save(&self, prompt_id: &str) -> Result<SaveState> {
        self.call(|b| {
            b.prompt_exists(prompt_id)?;
            let is_saved = toggle_id(&mut b.user_mut()?.bought, prompt_id);
            Ok(SaveState { is_saved })
        })
        .await
    }

    async fn restore_prompt(&self, prompt_id: &str) -> Result<()> {
        self.call(|b| {
            b.owned_prompt_mut(prompt_id)?.deleted = false;
            Ok(())
        })
        .await
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        self.call(|b| {
            let user = b.user.as_ref();
            Ok(b.collections
                .iter()
                .filter(|c| {
                    c.visibility == Visibility::Public
                        || c.is_owned_by(user)
                        || user.is_some_and(|u| {
                            c.collaborators.contains(&u.id) || u.has_saved(&c.id)
                        })
                })
                .cloned()
                .collect())
        })
        .await
    }

    async fn create_collection(&self, insert: &CollectionInsert) -> Result<Collection> {
        self.call(|b| {
            let collection = Collection::new(b.user_id()?, insert.clone());
            b.user_mut()?.owned_collections.push(collection.id.clone());
            b.collections.insert(0, collection.clone());
            Ok(collection)
        })
        .await
    }

    async fn update_collection(&self, id: &str, update: &CollectionUpdate) -> Result<Collection> {
        self.call(|b| {
            let collection = b.editable_collection_mut(id)?;
            update.apply_to(collection);
            let collection = collection.clone();
            if update.prompts.is_some() {
                for prompt in b.prompts.iter_mut() {
                    let member = collection.contains_prompt(&prompt.id);
                    prompt.collections.retain(|c| c != id);
                    if member {
                        prompt.collections.push(id.to_string());
                    }
                }
            }
            Ok(collection)
        })
        .await
    }

    async fn delete_collection(&self, id: &str) -> Result<()> {
        self.call(|b| {
            let owner = b.user_id()?;
            let collection = b
                .collections
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| WispError::NotFound(id.to_string()))?;
            if collection.owner_id != owner {
                return Err(WispError::Unauthorized);
            }
            collection.deleted = true;
            Ok(())
        })
        .await
    }

    async fn list_tags(&self) -> Result<Vec<String>> {
        self.call(|b| Ok(distinct_tags(&b.visible_prompts()))).await
    }
}
