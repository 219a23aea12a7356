//! # Toggle Coordinator
//!
//! Favorite, save, restore and delete share one protocol:
//!
//! 1. The gateway is called, nothing is changed locally before it answers.
//! 2. On success the answer is ground truth and is *set* in the store, so a
//!    repeated or reordered answer can never double-flip.
//! 3. On failure the store is untouched and an error message is returned.
//!
//! In-flight toggles are not de-duplicated; the last answer applied wins.
//!
//! ## Staleness
//!
//! Two guards apply to an answer that arrives late:
//!
//! - If the session was reset after the call was issued, the answer is
//!   discarded entirely (see [`Session::apply`]).
//! - If the call was issued with a [`ViewToken`] whose [`ViewScope`] has since
//!   been closed, the store is still updated but no message is produced.

use crate::commands::{failure, CmdMessage, CmdResult};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::Prompt;
use crate::store::{MembershipList, Session};
use std::fmt;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Favorite,
    Save,
    Restore,
    Delete,
}

impl Toggle {
    /// Phrase used in failure messages: "Could not {action}".
    pub fn action(&self) -> &'static str {
        match self {
            Toggle::Favorite => "update favorites",
            Toggle::Save => "update saved prompts",
            Toggle::Restore => "restore prompt",
            Toggle::Delete => "delete prompt",
        }
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Toggle::Favorite => "favorite",
            Toggle::Save => "save",
            Toggle::Restore => "restore",
            Toggle::Delete => "delete",
        };
        f.write_str(name)
    }
}

enum Outcome {
    Favorite(bool),
    Saved(bool),
    Restored,
    Deleted,
}

async fn call<G: Gateway + ?Sized>(gateway: &G, toggle: Toggle, id: &str) -> Result<Outcome> {
    Ok(match toggle {
        Toggle::Favorite => Outcome::Favorite(gateway.toggle_favorite(id).await?.is_favorite),
        Toggle::Save => Outcome::Saved(gateway.toggle_save(id).await?.is_saved),
        Toggle::Restore => {
            gateway.restore_prompt(id).await?;
            Outcome::Restored
        }
        Toggle::Delete => {
            gateway.delete_prompt(id).await?;
            Outcome::Deleted
        }
    })
}

/// Runs one toggle against the gateway and applies the answer.
pub async fn toggle<G: Gateway + ?Sized>(
    gateway: &G,
    session: &Session,
    toggle: Toggle,
    prompt_id: &str,
    token: Option<&ViewToken>,
) -> CmdResult {
    let issued = session.generation();
    tracing::debug!(%toggle, prompt_id, "toggle issued");

    let outcome = match call(gateway, toggle, prompt_id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            let message = failure(toggle.action(), &e);
            return deliver(CmdResult::default(), message, token);
        }
    };

    let applied = session.apply(issued, |store| {
        match outcome {
            Outcome::Favorite(present) => {
                store.set_membership(MembershipList::Favorites, prompt_id, present)
            }
            Outcome::Saved(present) => {
                store.set_membership(MembershipList::Bought, prompt_id, present)
            }
            Outcome::Restored => store.mark_restored::<Prompt>(prompt_id),
            Outcome::Deleted => store.mark_deleted::<Prompt>(prompt_id),
        }
        let title = store.prompt(prompt_id).map_or(prompt_id, |p| p.title.as_str());
        confirmation(&outcome, title)
    });

    match applied {
        Some(message) => {
            let mut result = CmdResult::default();
            if let Some(prompt) = session.read().prompt(prompt_id) {
                result.affected_prompts.push(prompt.clone());
            }
            deliver(result, message, token)
        }
        None => CmdResult::default(),
    }
}

fn confirmation(outcome: &Outcome, title: &str) -> CmdMessage {
    match outcome {
        Outcome::Favorite(true) => CmdMessage::success(format!("Added to favorites: {}", title)),
        Outcome::Favorite(false) => CmdMessage::success("Removed from favorites"),
        Outcome::Saved(true) => CmdMessage::success(format!("Saved: {}", title)),
        Outcome::Saved(false) => CmdMessage::success("Removed from saved"),
        Outcome::Restored => CmdMessage::success(format!("Prompt restored: {}", title)),
        Outcome::Deleted => CmdMessage::success(format!("Prompt deleted: {}", title)),
    }
}

fn deliver(mut result: CmdResult, message: CmdMessage, token: Option<&ViewToken>) -> CmdResult {
    match token {
        Some(token) if !token.is_live() => {
            tracing::debug!(message = %message.content, "view closed, message dropped");
        }
        _ => result.add_message(message),
    }
    result
}

/// The lifetime of a view that issues toggles. Closing or dropping it
/// silences messages for toggles still in flight.
#[derive(Debug, Default)]
pub struct ViewScope {
    closed: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> ViewToken {
        ViewToken {
            closed: self.closed.clone(),
        }
    }

    pub fn close(&self) {
        self.closed.cancel();
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Debug, Clone)]
pub struct ViewToken {
    closed: CancellationToken,
}

impl ViewToken {
    pub fn is_live(&self) -> bool {
        !self.closed.is_cancelled()
    }
}
