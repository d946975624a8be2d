//! Build submission and polling against mock platform and GitHub servers.

mod common;

use common::*;
use heroku_client::{BuildStatus, Checksum, HerokuError, PollOptions, SourceBlob};
use std::time::Duration;
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPO_URL: &str = "https://github.com/acme/widgets";
const SHA: &str = "c0ffee0000000000000000000000000000000001";

/// Answer `pending` for the first `pending_polls` status checks, then `terminal`.
async fn mount_poll_sequence(server: &MockServer, pending_polls: u64, terminal: &str, url: &str) {
    if pending_polls > 0 {
        Mock::given(method("GET"))
            .and(path(build_path()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(build_json("pending", url, Some(SHA))),
            )
            .up_to_n_times(pending_polls)
            .expect(pending_polls)
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path(build_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(build_json(terminal, url, Some(SHA))))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_build_from_repository_resolves_branch_and_polls() -> anyhow::Result<()> {
    init_tracing();
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;
    let tarball = format!("{REPO_URL}/tarball/beta");

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/branches/beta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "beta",
            "commit": {"sha": SHA}
        })))
        .expect(1)
        .mount(&github)
        .await;

    Mock::given(method("POST"))
        .and(path("/apps/my-app/builds"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(body_json(serde_json::json!({
            "source_blob": {"url": tarball, "version": SHA}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(build_json("pending", &tarball, Some(SHA))))
        .expect(1)
        .mount(&heroku)
        .await;

    mount_poll_sequence(&heroku, 2, "succeeded", &tarball).await;

    let (client, clock) = test_client(&heroku, &github);
    let build = client
        .build_from_repository("my-app", REPO_URL, "beta", None, PollOptions::new())
        .await?;

    assert_eq!(build.status, BuildStatus::Succeeded);
    assert_eq!(build.id, BUILD_ID);
    assert_eq!(build.source_blob.unwrap().version.as_deref(), Some(SHA));
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(1500); 3]);
    Ok(())
}

#[tokio::test]
async fn test_build_from_repository_encodes_branch() -> anyhow::Result<()> {
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;
    let tarball = format!("{REPO_URL}/tarball/fix%231");

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/branches/fix%231"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "fix#1",
            "commit": {"sha": SHA}
        })))
        .expect(1)
        .mount(&github)
        .await;

    Mock::given(method("POST"))
        .and(path("/apps/my-app/builds"))
        .and(body_json(serde_json::json!({
            "source_blob": {"url": tarball, "version": SHA}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(build_json("succeeded", &tarball, Some(SHA))))
        .expect(1)
        .mount(&heroku)
        .await;

    let (client, _clock) = test_client(&heroku, &github);
    let build = client
        .build_from_repository("my-app", REPO_URL, "fix#1", None, PollOptions::new())
        .await?;

    assert_eq!(build.status, BuildStatus::Succeeded);
    Ok(())
}

#[tokio::test]
async fn test_build_from_repository_with_version_skips_lookup() {
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;
    let tarball = format!("{REPO_URL}/tarball/main");

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&github)
        .await;

    Mock::given(method("POST"))
        .and(path("/apps/my-app/builds"))
        .and(body_json(serde_json::json!({
            "source_blob": {"url": tarball, "version": "v1.0.0"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(build_json("succeeded", &tarball, Some("v1.0.0"))))
        .expect(1)
        .mount(&heroku)
        .await;

    let (client, clock) = test_client(&heroku, &github);
    let build = client
        .build_from_repository("my-app", REPO_URL, "main", Some("v1.0.0"), PollOptions::new())
        .await
        .unwrap();

    assert_eq!(build.status, BuildStatus::Succeeded);
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_build_from_repository_invalid_url_sends_nothing() {
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;

    for server in [&heroku, &github] {
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(server)
            .await;
    }

    let (client, _) = test_client(&heroku, &github);
    let result = client
        .build_from_repository("my-app", "not-a-url", "main", None, PollOptions::new())
        .await;

    assert!(matches!(result, Err(HerokuError::Validation(_))));
}

#[tokio::test]
async fn test_branch_lookup_failure_stops_before_submission() {
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/branches/gone"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Branch not found"})),
        )
        .mount(&github)
        .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&heroku)
        .await;

    let (client, _) = test_client(&heroku, &github);
    let err = client
        .build_from_repository("my-app", REPO_URL, "gone", None, PollOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, HerokuError::Repository(_)));
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_build_from_source_with_checksum() {
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;
    let url = "https://example.com/releases/app-1.2.3.tgz";
    let checksum = Checksum::of(b"archive bytes");

    Mock::given(method("POST"))
        .and(path("/apps/my-app/builds"))
        .and(body_json(serde_json::json!({
            "source_blob": {
                "url": url,
                "version": "1.2.3",
                "checksum": format!("SHA256:{}", checksum.hex())
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(build_json("pending", url, Some("1.2.3"))))
        .expect(1)
        .mount(&heroku)
        .await;

    mount_poll_sequence(&heroku, 0, "failed", url).await;

    let (client, clock) = test_client(&heroku, &github);
    let source = SourceBlob::new(url)
        .with_version("1.2.3")
        .with_checksum(checksum);
    let build = client
        .build_from_source("my-app", source, PollOptions::new().with_interval(Duration::from_secs(2)))
        .await
        .unwrap();

    // A failed build is a result, not an error.
    assert_eq!(build.status, BuildStatus::Failed);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(2)]);
}

#[tokio::test]
async fn test_submission_rejected_never_polls() {
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/apps/my-app/builds"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "id": "invalid_params",
            "message": "source_blob.url is invalid"
        })))
        .expect(1)
        .mount(&heroku)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&heroku)
        .await;

    let (client, clock) = test_client(&heroku, &github);
    let result = client
        .build_from_source("my-app", SourceBlob::new("ftp://nowhere"), PollOptions::new())
        .await;

    assert!(matches!(result, Err(HerokuError::Api { status: 422, .. })));
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_unrecognized_status_is_terminal() {
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;
    let url = "https://example.com/app.tgz";

    let (client, _) = test_client(&heroku, &github);
    mount_poll_sequence(&heroku, 1, "expired", url).await;

    let pending = serde_json::from_value(build_json("pending", url, None)).unwrap();
    let build = client.wait_for_build(pending, PollOptions::new()).await.unwrap();

    assert_eq!(build.status, BuildStatus::Other("expired".into()));
}

#[tokio::test]
async fn test_poll_failure_aborts_loop() {
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;
    let url = "https://example.com/app.tgz";

    Mock::given(method("GET"))
        .and(path(build_path()))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&heroku)
        .await;

    let (client, clock) = test_client(&heroku, &github);
    let pending = serde_json::from_value(build_json("pending", url, None)).unwrap();
    let err = client
        .wait_for_build(pending, PollOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(clock.sleeps().len(), 1);
}

#[tokio::test]
async fn test_max_attempts_bound() {
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;
    let url = "https://example.com/app.tgz";

    Mock::given(method("GET"))
        .and(path(build_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(build_json("pending", url, None)))
        .expect(3)
        .mount(&heroku)
        .await;

    let (client, _) = test_client(&heroku, &github);
    let pending = serde_json::from_value(build_json("pending", url, None)).unwrap();
    let err = client
        .wait_for_build(pending, PollOptions::new().with_max_attempts(3))
        .await
        .unwrap_err();

    match err {
        HerokuError::PollTimeout {
            build_id, attempts, ..
        } => {
            assert_eq!(build_id, BUILD_ID);
            assert_eq!(attempts, 3);
        }
        other => panic!("expected poll timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_bound_clamps_last_sleep() {
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;
    let url = "https://example.com/app.tgz";

    Mock::given(method("GET"))
        .and(path(build_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(build_json("pending", url, None)))
        .expect(3)
        .mount(&heroku)
        .await;

    let (client, clock) = test_client(&heroku, &github);
    let pending = serde_json::from_value(build_json("pending", url, None)).unwrap();
    let options = PollOptions::new()
        .with_interval(Duration::from_secs(1))
        .with_timeout(Duration::from_millis(2500));
    let err = client.wait_for_build(pending, options).await.unwrap_err();

    assert!(matches!(
        err,
        HerokuError::PollTimeout { attempts: 3, elapsed, .. } if elapsed == Duration::from_millis(2500)
    ));
    assert_eq!(
        clock.sleeps(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(1),
            Duration::from_millis(500)
        ]
    );
}

#[tokio::test]
async fn test_cancelled_before_first_poll() {
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&heroku)
        .await;

    let (tx, rx) = tokio::sync::watch::channel(false);
    tx.send(true).unwrap();

    let (client, clock) = test_client(&heroku, &github);
    let pending = serde_json::from_value(build_json("pending", "https://example.com/app.tgz", None)).unwrap();
    let result = client
        .wait_for_build(pending, PollOptions::new().with_cancellation(rx))
        .await;

    assert!(matches!(result, Err(HerokuError::Cancelled { .. })));
    assert!(clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_cancellation_interrupts_sleep() {
    let heroku = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&heroku)
        .await;

    // Real time: the interval is far longer than the test is allowed to run.
    let client = heroku_client::HerokuClient::with_api_key(
        "test-api-key",
        heroku.uri(),
        Duration::from_secs(5),
    )
    .unwrap();

    let (tx, rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = tx.send(true);
    });

    let pending = serde_json::from_value(build_json("pending", "https://example.com/app.tgz", None)).unwrap();
    let options = PollOptions::new()
        .with_interval(Duration::from_secs(3600))
        .with_cancellation(rx);
    let result = tokio::time::timeout(Duration::from_secs(5), client.wait_for_build(pending, options))
        .await
        .expect("cancellation should end polling promptly");

    assert!(matches!(result, Err(HerokuError::Cancelled { .. })));
}

#[tokio::test]
async fn test_dropped_cancel_sender_keeps_polling() {
    let heroku = MockServer::start().await;
    let github = MockServer::start().await;
    let url = "https://example.com/app.tgz";

    mount_poll_sequence(&heroku, 1, "succeeded", url).await;

    let (tx, rx) = tokio::sync::watch::channel(false);
    drop(tx);

    let (client, clock) = test_client(&heroku, &github);
    let pending = serde_json::from_value(build_json("pending", url, None)).unwrap();
    let build = client
        .wait_for_build(pending, PollOptions::new().with_cancellation(rx))
        .await
        .unwrap();

    assert_eq!(build.status, BuildStatus::Succeeded);
    assert_eq!(clock.sleeps().len(), 2);
}
