use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::PromptInsert;
use crate::store::Session;

pub async fn run<G: Gateway + ?Sized>(
    gateway: &G,
    session: &Session,
    insert: PromptInsert,
) -> Result<CmdResult> {
    let insert = insert.validated()?;
    let issued = session.generation();
    let prompt = gateway.create_prompt(&insert).await?;

    let mut result = CmdResult::default();
    if session
        .apply(issued, |store| store.upsert_one(prompt.clone()))
        .is_some()
    {
        result.add_message(CmdMessage::success(format!(
            "Prompt created: {}",
            prompt.title
        )));
        result.affected_prompts.push(prompt);
    }
    Ok(result)
}
