use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn wisp(config_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("wisp").unwrap();
    cmd.env("WISP_CONFIG_DIR", config_dir)
        .env_remove("WISP_API_URL")
        .env_remove("WISP_ACCESS_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

async fn backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "username": "ada",
            "favorites": [],
            "bought": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prompts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "p1",
                "title": "Email Writer",
                "content": "Write an email",
                "tags": ["email"],
                "visibility": "public",
                "ownerId": "u1",
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            },
            {
                "id": "p2",
                "title": "Old Draft",
                "content": "",
                "visibility": "private",
                "ownerId": "u1",
                "deleted": true,
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    server
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    wisp(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("favorite").and(predicate::str::contains("collection")));
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    wisp(dir.path())
        .args(["config", "api-url", "https://wisp.example.com/api/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api-url set to https://wisp.example.com/api"));

    wisp(dir.path())
        .args(["config", "api-url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://wisp.example.com/api"));

    assert!(dir.path().join("config.json").exists());
}

#[test]
fn test_config_rejects_invalid_value() {
    let dir = tempfile::tempdir().unwrap();
    wisp(dir.path())
        .args(["config", "timeout", "soon"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("timeout must be a number"));
}

#[test]
fn test_config_hides_token() {
    let dir = tempfile::tempdir().unwrap();
    wisp(dir.path())
        .args(["config", "access-token", "secret"])
        .assert()
        .success();
    wisp(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("access-token = (set)")
                .and(predicate::str::contains("secret").not()),
        );
}

#[test]
fn test_list_with_unreachable_backend_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    wisp(dir.path())
        .env("WISP_API_URL", "http://127.0.0.1:9")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No prompts found."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_filters_against_backend() {
    let server = backend().await;
    let dir = tempfile::tempdir().unwrap();

    wisp(dir.path())
        .env("WISP_API_URL", server.uri())
        .arg("list")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Email Writer")
                .and(predicate::str::contains("Old Draft").not()),
        );

    wisp(dir.path())
        .env("WISP_API_URL", server.uri())
        .args(["list", "--filter", "deleted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Old Draft"));

    wisp(dir.path())
        .env("WISP_API_URL", server.uri())
        .args(["list", "--filter", "trending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No prompts found."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_favorite_reports_server_state() {
    let server = backend().await;
    Mock::given(method("POST"))
        .and(path("/prompts/favorite"))
        .and(body_json(json!({ "promptId": "p1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "isFavorite": true })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    wisp(dir.path())
        .env("WISP_API_URL", server.uri())
        .args(["favorite", "p1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added to favorites: Email Writer"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_prompt_id_fails() {
    let server = backend().await;
    let dir = tempfile::tempdir().unwrap();

    wisp(dir.path())
        .env("WISP_API_URL", server.uri())
        .args(["view", "zz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}
