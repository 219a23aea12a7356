use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, WispError};
use crate::gateway::Gateway;
use crate::model::PromptUpdate;
use crate::store::Session;

pub async fn run<G: Gateway + ?Sized>(
    gateway: &G,
    session: &Session,
    id: &str,
    update: PromptUpdate,
) -> Result<CmdResult> {
    if update.is_empty() {
        return Err(WispError::Validation("Nothing to update".to_string()));
    }
    let update = update.validated()?;
    let issued = session.generation();
    let prompt = gateway.update_prompt(id, &update).await?;

    let mut result = CmdResult::default();
    if session
        .apply(issued, |store| store.upsert_one(prompt.clone()))
        .is_some()
    {
        result.add_message(CmdMessage::success(format!(
            "Prompt updated: {}",
            prompt.title
        )));
        result.affected_prompts.push(prompt);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;
    use crate::store::fixtures::{prompt, user};

    fn seeded() -> (InMemoryGateway, Session) {
        let records = vec![
            prompt("p1", "Email Writer", "u1", &["email"]),
            prompt("p2", "Code Review", "u1", &[]),
        ];
        let gateway = InMemoryGateway::new(user("u1")).with_prompts(records.clone());
        let session = Session::new();
        session.update(|s| s.set_all(records));
        (gateway, session)
    }

    #[tokio::test]
    async fn replaces_prompt_in_place() {
        let (gateway, session) = seeded();
        let update = PromptUpdate {
            title: Some("Email Drafter".into()),
            tags: Some(vec!["email".into(), "work".into()]),
            ..Default::default()
        };

        let result = run(&gateway, &session, "p2", update).await.unwrap();
        assert_eq!(result.affected_prompts[0].title, "Email Drafter");

        let store = session.read();
        let titles: Vec<_> = store.prompts().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Email Writer", "Email Drafter"]);
        assert_eq!(store.prompt("p2").unwrap().tags, vec!["email", "work"]);
    }

    #[tokio::test]
    async fn empty_update_is_rejected_locally() {
        let (gateway, session) = seeded();
        let err = run(&gateway, &session, "p1", PromptUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WispError::Validation(_)));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn foreign_prompt_is_left_alone() {
        let gateway = InMemoryGateway::new(user("u2"))
            .with_prompts(vec![prompt("p1", "Email Writer", "u1", &[])]);
        let session = Session::new();
        let update = PromptUpdate {
            content: Some("hijacked".into()),
            ..Default::default()
        };

        let err = run(&gateway, &session, "p1", update).await.unwrap_err();
        assert!(matches!(err, WispError::Unauthorized));
        assert_eq!(gateway.prompt("p1").unwrap().content, "");
    }
}
