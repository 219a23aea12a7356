use crate::commands::{or_empty, CmdResult};
use crate::gateway::Gateway;
use crate::store::Session;

/// Loads the user, prompts and collections concurrently into the store.
///
/// Each read degrades on its own: a failed list renders as empty, a failed
/// user lookup as signed out.
pub async fn run<G: Gateway + ?Sized>(gateway: &G, session: &Session) -> CmdResult {
    let issued = session.generation();
    let (user, prompts, collections) = tokio::join!(
        gateway.current_user(),
        gateway.list_prompts(),
        gateway.list_collections(),
    );

    let user = match user {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::error!(error = %e, "could not load current user");
            None
        }
    };
    let prompts = or_empty("prompts", prompts);
    let collections = or_empty("collections", collections);

    let result = CmdResult::default()
        .with_affected_prompts(prompts.clone())
        .with_affected_collections(collections.clone());
    let applied = session.apply(issued, |store| {
        store.set_user(user);
        store.set_all(prompts);
        store.set_all(collections);
    });
    match applied {
        Some(()) => result,
        None => CmdResult::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::InjectedFailure;
    use crate::gateway::InMemoryGateway;
    use crate::store::fixtures::{prompt, user};

    #[tokio::test]
    async fn loads_everything_into_the_store() {
        let gateway = InMemoryGateway::new(user("u1")).with_prompts(vec![
            prompt("p1", "Email Writer", "u1", &["email"]),
            prompt("p2", "Code Review", "u2", &[]),
        ]);
        let session = Session::new();

        let result = run(&gateway, &session).await;
        assert_eq!(result.affected_prompts.len(), 2);

        let store = session.read();
        assert_eq!(store.user().unwrap().id, "u1");
        assert_eq!(store.prompts().len(), 2);
    }

    #[tokio::test]
    async fn failed_reads_render_as_empty() {
        let gateway = InMemoryGateway::new(user("u1"))
            .with_prompts(vec![prompt("p1", "Email Writer", "u1", &[])]);
        let session = Session::new();
        run(&gateway, &session).await;

        gateway.fail_with(Some(InjectedFailure::Unavailable));
        let result = run(&gateway, &session).await;
        assert!(result.affected_prompts.is_empty());
        assert!(result.messages.is_empty());

        let store = session.read();
        assert!(store.prompts().is_empty());
        assert!(store.user().is_none());
    }

    #[tokio::test]
    async fn reset_during_refresh_discards_the_answer() {
        let gateway = InMemoryGateway::new(user("u1"))
            .with_prompts(vec![prompt("p1", "Email Writer", "u1", &[])]);
        gateway.queue_delay(std::time::Duration::from_millis(30));
        let session = Session::new();

        let (result, ()) = tokio::join!(run(&gateway, &session), async {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            session.reset();
        });
        assert!(result.affected_prompts.is_empty());
        assert!(session.read().prompts().is_empty());
        assert!(session.read().user().is_none());
    }
}
