//! Collection mutations.
//!
//! Membership changes send the collection's full prompt list, computed from
//! the store, and then record the link on both records locally.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, WispError};
use crate::gateway::Gateway;
use crate::model::{Collection, CollectionInsert, CollectionUpdate};
use crate::store::Session;

pub async fn create<G: Gateway + ?Sized>(
    gateway: &G,
    session: &Session,
    insert: CollectionInsert,
) -> Result<CmdResult> {
    let insert = insert.validated()?;
    let issued = session.generation();
    let collection = gateway.create_collection(&insert).await?;

    let mut result = CmdResult::default();
    if session
        .apply(issued, |store| store.upsert_one(collection.clone()))
        .is_some()
    {
        result.add_message(CmdMessage::success(format!(
            "Collection created: {}",
            collection.title
        )));
        result.affected_collections.push(collection);
    }
    Ok(result)
}

pub async fn update<G: Gateway + ?Sized>(
    gateway: &G,
    session: &Session,
    id: &str,
    update: CollectionUpdate,
) -> Result<CmdResult> {
    if update == CollectionUpdate::default() {
        return Err(WispError::Validation("Nothing to update".to_string()));
    }
    let update = update.validated()?;
    let issued = session.generation();
    let collection = gateway.update_collection(id, &update).await?;

    let mut result = CmdResult::default();
    if session
        .apply(issued, |store| store.upsert_one(collection.clone()))
        .is_some()
    {
        result.add_message(CmdMessage::success(format!(
            "Collection updated: {}",
            collection.title
        )));
        result.affected_collections.push(collection);
    }
    Ok(result)
}

pub async fn delete<G: Gateway + ?Sized>(
    gateway: &G,
    session: &Session,
    id: &str,
) -> Result<CmdResult> {
    let title = existing(session, id)?.title;
    let issued = session.generation();
    gateway.delete_collection(id).await?;

    let mut result = CmdResult::default();
    if session
        .apply(issued, |store| store.mark_deleted::<Collection>(id))
        .is_some()
    {
        result.add_message(CmdMessage::success(format!(
            "Collection deleted: {}",
            title
        )));
    }
    Ok(result)
}

pub async fn add_prompt<G: Gateway + ?Sized>(
    gateway: &G,
    session: &Session,
    collection_id: &str,
    prompt_id: &str,
) -> Result<CmdResult> {
    let collection = existing(session, collection_id)?;
    if collection.contains_prompt(prompt_id) {
        return Ok(CmdResult::default().with_message(CmdMessage::info(format!(
            "Already in {}",
            collection.title
        ))));
    }
    let mut prompts = collection.prompts;
    prompts.push(prompt_id.to_string());
    membership(gateway, session, collection_id, prompt_id, prompts, true).await
}

pub async fn remove_prompt<G: Gateway + ?Sized>(
    gateway: &G,
    session: &Session,
    collection_id: &str,
    prompt_id: &str,
) -> Result<CmdResult> {
    let collection = existing(session, collection_id)?;
    if !collection.contains_prompt(prompt_id) {
        return Ok(CmdResult::default().with_message(CmdMessage::info(format!(
            "Not in {}",
            collection.title
        ))));
    }
    let prompts = collection
        .prompts
        .into_iter()
        .filter(|p| p != prompt_id)
        .collect();
    membership(gateway, session, collection_id, prompt_id, prompts, false).await
}

async fn membership<G: Gateway + ?Sized>(
    gateway: &G,
    session: &Session,
    collection_id: &str,
    prompt_id: &str,
    prompts: Vec<String>,
    linked: bool,
) -> Result<CmdResult> {
    let update = CollectionUpdate {
        prompts: Some(prompts),
        ..Default::default()
    };
    let issued = session.generation();
    let collection = gateway.update_collection(collection_id, &update).await?;

    let mut result = CmdResult::default();
    let applied = session.apply(issued, |store| {
        store.upsert_one(collection.clone());
        if linked {
            store.link_prompt(collection_id, prompt_id);
        } else {
            store.unlink_prompt(collection_id, prompt_id);
        }
    });
    if applied.is_some() {
        let content = if linked {
            format!("Added to {}", collection.title)
        } else {
            format!("Removed from {}", collection.title)
        };
        result.add_message(CmdMessage::success(content));
        result.affected_collections.push(collection);
    }
    Ok(result)
}

fn existing(session: &Session, id: &str) -> Result<Collection> {
    session
        .read()
        .collection(id)
        .cloned()
        .ok_or_else(|| WispError::NotFound(format!("Collection {}", id)))
}
