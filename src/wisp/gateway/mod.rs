//! # Remote Data Gateway
//!
//! The [`Gateway`] trait is the only way Wisp talks to its backend. Every
//! method is a suspension point; nothing else in the crate awaits.
//!
//! ## Implementations
//!
//! - [`http::HttpGateway`]: the REST backend, via `reqwest`
//! - [`memory::InMemoryGateway`]: an in-process backend for tests and offline
//!   use, with failure injection and response delays
//!
//! The REST endpoint table lives in the [`http`] module docs.
//!
//! Toggle endpoints answer with the final state. Callers apply that state, they
//! never infer it by flipping what they had.

use crate::error::Result;
use crate::model::{
    Collection, CollectionInsert, CollectionUpdate, FavoriteState, Prompt, PromptInsert,
    PromptUpdate, SaveState, User,
};
use async_trait::async_trait;

pub mod http;
pub mod memory;

pub use http::HttpGateway;
pub use memory::InMemoryGateway;

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn current_user(&self) -> Result<User>;

    async fn list_prompts(&self) -> Result<Vec<Prompt>>;

    async fn create_prompt(&self, insert: &PromptInsert) -> Result<Prompt>;

    async fn update_prompt(&self, id: &str, update: &PromptUpdate) -> Result<Prompt>;

    /// Soft delete. Success status only.
    async fn delete_prompt(&self, id: &str) -> Result<()>;

    async fn toggle_favorite(&self, prompt_id: &str) -> Result<FavoriteState>;

    async fn toggle_save(&self, prompt_id: &str) -> Result<SaveState>;

    async fn restore_prompt(&self, prompt_id: &str) -> Result<()>;

    async fn list_collections(&self) -> Result<Vec<Collection>>;

    async fn create_collection(&self, insert: &CollectionInsert) -> Result<Collection>;

    async fn update_collection(&self, id: &str, update: &CollectionUpdate) -> Result<Collection>;

    async fn delete_collection(&self, id: &str) -> Result<()>;

    async fn list_tags(&self) -> Result<Vec<String>>;
}
