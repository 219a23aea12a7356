//! # Wisp Architecture
//!
//! Wisp is a **UI-agnostic client library** for a prompt-sharing service: it
//! keeps a canonical copy of the signed-in user's prompts and collections,
//! derives filtered views from it, and coordinates the mutations that flip
//! favorite, saved and deleted state against the backend.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, coordinator and views         │
//! │  - Turns failures into notifications                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs, coordinator.rs, view/)       │
//! │  - Mutations: validate, call the gateway, apply the answer  │
//! │  - Views: pure functions over the store                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Store + Gateway (store/, gateway/)                         │
//! │  - EntityStore behind a Session, change notifications       │
//! │  - Gateway trait: HttpGateway (REST), InMemoryGateway       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Server Truth
//!
//! Nothing in the store changes before the gateway answers. The answer is
//! applied as state to set, never as a flip, and an answer that belongs to a
//! previous session is dropped.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** and **coordinator**: async tests against `InMemoryGateway`,
//!    which can inject failures and delay answers to reorder them.
//! 2. **Views** and **store**: plain unit tests over fixture records.
//! 3. **Gateway**: contract tests for `HttpGateway` against a `wiremock` server.
//! 4. **CLI**: `assert_cmd` tests in `tests/`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Mutations other than toggles, plus `CmdResult`
//! - [`coordinator`]: Favorite, save, restore and delete toggles
//! - [`view`]: Filter keys, search, tag narrowing and projections
//! - [`store`]: The entity store and the session around it
//! - [`gateway`]: Backend access
//! - [`model`]: Records and request payloads
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod model;
pub mod store;
pub mod view;
