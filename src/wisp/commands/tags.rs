use crate::commands::{or_empty, CmdResult};
use crate::gateway::Gateway;

pub async fn run<G: Gateway + ?Sized>(gateway: &G) -> CmdResult {
    let tags = or_empty("tags", gateway.list_tags().await);
    CmdResult::default().with_tags(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::InjectedFailure;
    use crate::gateway::InMemoryGateway;
    use crate::store::fixtures::{prompt, user};

    #[tokio::test]
    async fn lists_distinct_tags() {
        let gateway = InMemoryGateway::new(user("u1")).with_prompts(vec![
            prompt("p1", "A", "u1", &["email", "work"]),
            prompt("p2", "B", "u1", &["work"]),
        ]);
        assert_eq!(run(&gateway).await.tags, vec!["email", "work"]);
    }

    #[tokio::test]
    async fn failure_yields_no_tags() {
        let gateway = InMemoryGateway::new(user("u1"))
            .with_prompts(vec![prompt("p1", "A", "u1", &["email"])]);
        gateway.fail_with(Some(InjectedFailure::Unavailable));
        let result = run(&gateway).await;
        assert!(result.tags.is_empty());
        assert!(!result.has_errors());
    }
}
