//! # API Facade
//!
//! The API layer is a thin facade over the command layer and the view engine.
//! It is the single entry point for every client operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! - **Dispatches** mutations to `commands/*.rs` and toggles to the coordinator
//! - **Converts failures** into user-facing messages: every mutation returns a
//!   [`CmdResult`], never an error, with the failure logged
//! - **Derives views** from the shared [`Session`] on demand
//!
//! No stdout, stderr or formatting happens here.
//!
//! ## Generic Over Gateway
//!
//! `WispApi<G: Gateway>` is generic over the backend:
//! - Production: `WispApi<HttpGateway>`
//! - Testing: `WispApi<InMemoryGateway>`
//!
//! [`HttpGateway`]: crate::gateway::HttpGateway
//! [`InMemoryGateway`]: crate::gateway::InMemoryGateway

use crate::commands::{self, failure, CmdResult};
use crate::coordinator::{self, Toggle, ViewScope, ViewToken};
use crate::error::{Result, WispError};
use crate::gateway::Gateway;
use crate::model::{
    Collection, CollectionInsert, CollectionUpdate, Prompt, PromptInsert, PromptUpdate, User,
};
use crate::store::Session;
use crate::view::{self, CollectionFilter, FilterKey, PromptView, ViewQuery};
use tokio::sync::watch;

pub struct WispApi<G: Gateway> {
    gateway: G,
    session: Session,
}

fn resolve_id<'a>(ids: impl Iterator<Item = &'a str>, raw: &str, what: &str) -> Result<String> {
    let mut matches = Vec::new();
    for id in ids {
        if id == raw {
            return Ok(id.to_string());
        }
        if id.starts_with(raw) {
            matches.push(id);
        }
    }
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(WispError::NotFound(format!("{} {}", what, raw))),
        _ => Err(WispError::Validation(format!(
            "{} id '{}' is ambiguous ({} matches)",
            what,
            raw,
            matches.len()
        ))),
    }
}

fn settle(action: &str, result: Result<CmdResult>) -> CmdResult {
    result.unwrap_or_else(|e| CmdResult::default().with_message(failure(action, &e)))
}

impl<G: Gateway> WispApi<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            session: Session::new(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Reloads user, prompts and collections.
    pub async fn refresh(&self) -> CmdResult {
        commands::refresh::run(&self.gateway, &self.session).await
    }

    pub async fn create_prompt(&self, insert: PromptInsert) -> CmdResult {
        settle(
            "create prompt",
            commands::create::run(&self.gateway, &self.session, insert).await,
        )
    }

    pub async fn update_prompt(&self, id: &str, update: PromptUpdate) -> CmdResult {
        settle(
            "update prompt",
            commands::update::run(&self.gateway, &self.session, id, update).await,
        )
    }

    pub async fn toggle_favorite(&self, id: &str, token: Option<&ViewToken>) -> CmdResult {
        coordinator::toggle(&self.gateway, &self.session, Toggle::Favorite, id, token).await
    }

    pub async fn toggle_save(&self, id: &str, token: Option<&ViewToken>) -> CmdResult {
        coordinator::toggle(&self.gateway, &self.session, Toggle::Save, id, token).await
    }

    pub async fn restore_prompt(&self, id: &str, token: Option<&ViewToken>) -> CmdResult {
        coordinator::toggle(&self.gateway, &self.session, Toggle::Restore, id, token).await
    }

    pub async fn delete_prompt(&self, id: &str, token: Option<&ViewToken>) -> CmdResult {
        coordinator::toggle(&self.gateway, &self.session, Toggle::Delete, id, token).await
    }

    pub async fn create_collection(&self, insert: CollectionInsert) -> CmdResult {
        settle(
            "create collection",
            commands::collections::create(&self.gateway, &self.session, insert).await,
        )
    }

    pub async fn update_collection(&self, id: &str, update: CollectionUpdate) -> CmdResult {
        settle(
            "update collection",
            commands::collections::update(&self.gateway, &self.session, id, update).await,
        )
    }

    pub async fn delete_collection(&self, id: &str) -> CmdResult {
        settle(
            "delete collection",
            commands::collections::delete(&self.gateway, &self.session, id).await,
        )
    }

    pub async fn add_to_collection(&self, collection_id: &str, prompt_id: &str) -> CmdResult {
        settle(
            "add prompt to collection",
            commands::collections::add_prompt(
                &self.gateway,
                &self.session,
                collection_id,
                prompt_id,
            )
            .await,
        )
    }

    pub async fn remove_from_collection(&self, collection_id: &str, prompt_id: &str) -> CmdResult {
        settle(
            "remove prompt from collection",
            commands::collections::remove_prompt(
                &self.gateway,
                &self.session,
                collection_id,
                prompt_id,
            )
            .await,
        )
    }

    /// Tags known to the backend.
    pub async fn tags(&self) -> CmdResult {
        commands::tags::run(&self.gateway).await
    }

    /// Tags of the prompts currently loaded, without a request.
    pub fn local_tags(&self) -> Vec<String> {
        view::distinct_tags(self.session.read().prompts())
    }

    pub fn prompts(&self, key: FilterKey, query: &ViewQuery) -> Vec<PromptView> {
        let store = self.session.read();
        let user = store.user();
        view::filter_prompts(store.prompts(), user, key, query)
            .into_iter()
            .map(|p| PromptView::project(p, user))
            .collect()
    }

    /// Same as [`WispApi::prompts`] with the key as typed by a user.
    pub fn prompts_by_key(&self, key: &str, query: &ViewQuery) -> Vec<PromptView> {
        let store = self.session.read();
        let user = store.user();
        view::filter_prompts_by_key(store.prompts(), user, key, query)
            .into_iter()
            .map(|p| PromptView::project(p, user))
            .collect()
    }

    pub fn collections(&self, filter: CollectionFilter, search: &str) -> Vec<Collection> {
        let store = self.session.read();
        view::filter_collections(store.collections(), store.user(), filter, search)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn available_for_collection(&self, collection_id: &str) -> Vec<Prompt> {
        let store = self.session.read();
        view::available_for_collection(store.prompts(), store.user(), collection_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn prompt(&self, id: &str) -> Option<PromptView> {
        let store = self.session.read();
        store.prompt(id).map(|p| PromptView::project(p, store.user()))
    }

    /// Full id of the loaded prompt whose id is `raw` or starts with it.
    pub fn resolve_prompt_id(&self, raw: &str) -> Result<String> {
        let store = self.session.read();
        resolve_id(store.prompts().iter().map(|p| p.id.as_str()), raw, "Prompt")
    }

    pub fn resolve_collection_id(&self, raw: &str) -> Result<String> {
        let store = self.session.read();
        resolve_id(
            store.collections().iter().map(|c| c.id.as_str()),
            raw,
            "Collection",
        )
    }

    pub fn select_prompt(&self, id: Option<&str>) {
        self.session.update(|store| store.select(id.map(str::to_string)));
    }

    /// Projection of the selected prompt, reflecting any toggle applied since selection.
    pub fn selected_prompt(&self) -> Option<PromptView> {
        let store = self.session.read();
        store
            .selected_prompt()
            .map(|p| PromptView::project(p, store.user()))
    }

    pub fn user(&self) -> Option<User> {
        self.session.read().user().cloned()
    }

    /// Fires whenever the store changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.session.read().subscribe()
    }

    /// Drops all loaded state, e.g. on sign-out. Answers still in flight are discarded.
    pub fn reset_session(&self) {
        self.session.reset();
    }

    pub fn view_scope(&self) -> ViewScope {
        ViewScope::new()
    }
}
