//! Integration tests for the seeding stages
//!
//! These tests use wiremock to stand in for the library API and drive the
//! stages and the full pipeline end-to-end.

use librarby_seeder::client::{login, open_session, ApiClient};
use librarby_seeder::config::{AdminConfig, ApiConfig, Config, SeedConfig};
use librarby_seeder::extract::IdScope;
use librarby_seeder::generate::publishers::PUBLISHER_NAMES;
use librarby_seeder::generate::seeded_rng;
use librarby_seeder::output::format_summary;
use librarby_seeder::stages::{self, StageContext};
use librarby_seeder::state::{CredentialRecord, UserRole};
use librarby_seeder::{PipelineState, SeedError, Seeder, Stage, StateKey};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use wiremock::matchers::{body_partial_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers every creation with `{"id": n}`, counting up from `start`
struct SequentialIds {
    next: AtomicI64,
}

impl SequentialIds {
    fn from(start: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
        }
    }
}

impl Respond for SequentialIds {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let id = self.next.fetch_add(1, Ordering::SeqCst);
        ResponseTemplate::new(201).set_body_json(json!({ "id": id }))
    }
}

/// Answers `GET rentals/{id}` with a returned rental of a distinct edition
struct RentalLookup;

impl Respond for RentalLookup {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id: i64 = request
            .url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|last| last.parse().ok())
            .unwrap_or(0);
        ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "readerId": 1001,
            "bookId": 1,
            "editionId": 500 + id,
            "status": "RETURNED"
        }))
    }
}

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, seed: SeedConfig) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            api_prefix: "/api/v1".to_string(),
            timeout_secs: 5,
            nested_ids: false,
        },
        admin: AdminConfig {
            username: "admin".to_string(),
            password: "admin-pass".to_string(),
            email: None,
            first_name: None,
            last_name: None,
        },
        seed,
    }
}

fn test_client(server: &MockServer) -> ApiClient {
    ApiClient::with_prefix(&server.uri(), "/api/v1", 5)
        .expect("Failed to build client")
        .with_token("test-token")
}

fn today() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date")
}

async fn posted_bodies(server: &MockServer, endpoint: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .expect("Request recording is enabled")
        .into_iter()
        .filter(|r| r.method.to_string() == "POST" && r.url.path() == endpoint)
        .map(|r| serde_json::from_slice(&r.body).expect("JSON body"))
        .collect()
}

#[tokio::test]
async fn test_zero_authors_makes_no_calls() {
    let server = MockServer::start().await;
    let client = test_client(&server);
    let seed = SeedConfig {
        authors: 0,
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();
    let mut rng = seeded_rng(Some(1));

    stages::authors::seed(&ctx, &mut state, &mut rng)
        .await
        .expect("Author stage failed");

    assert_eq!(state.author_ids, Some(vec![]));
    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "No request expected, got {}", requests.len());
}

#[tokio::test]
async fn test_authors_use_ids_from_responses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/authors"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(SequentialIds::from(100))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        authors: 3,
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();

    stages::authors::seed(&ctx, &mut state, &mut seeded_rng(Some(1)))
        .await
        .expect("Author stage failed");

    assert_eq!(state.author_ids, Some(vec![100, 101, 102]));
    for body in posted_bodies(&server, "/api/v1/authors").await {
        assert!(body["firstName"].is_string());
        assert!(body.get("middleName").is_some());
        assert!(body.get("lastName").is_some());
    }
}

#[tokio::test]
async fn test_nested_id_only_accepted_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/authors"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 42}})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        authors: 1,
        ..SeedConfig::default()
    };

    let strict = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();
    let err = stages::authors::seed(&strict, &mut state, &mut seeded_rng(Some(1)))
        .await
        .unwrap_err();
    match err {
        SeedError::MissingIdentifier { stage, entity, .. } => {
            assert_eq!(stage, Stage::Authors);
            assert_eq!(entity, "author");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(state.author_ids, Some(vec![]));

    let lenient = StageContext::new(&client, &seed, IdScope::RootOrData, today());
    let mut state = PipelineState::new();
    stages::authors::seed(&lenient, &mut state, &mut seeded_rng(Some(1)))
        .await
        .expect("Nested ids should be accepted");
    assert_eq!(state.author_ids, Some(vec![42]));
}

#[tokio::test]
async fn test_partial_results_kept_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/books"))
        .respond_with(SequentialIds::from(1))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/books"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        books: 5,
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();

    let err = stages::books::seed(&ctx, &mut state, &mut seeded_rng(Some(1)))
        .await
        .unwrap_err();

    match err {
        SeedError::Api(api) => {
            assert_eq!(api.status(), Some(500));
            assert!(api.to_string().contains("Response body: boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(state.book_ids, Some(vec![1, 2]));
}

#[tokio::test]
async fn test_editions_fail_fast_without_books() {
    let server = MockServer::start().await;
    let client = test_client(&server);
    let seed = SeedConfig::default();
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();
    state.book_ids = Some(vec![]);
    state.publisher_ids = Some(vec![1]);

    let err = stages::editions::seed(&ctx, &mut state, &mut seeded_rng(Some(1)))
        .await
        .unwrap_err();

    match &err {
        SeedError::MissingPrecondition { stage, key, producer } => {
            assert_eq!(*stage, Stage::Editions);
            assert_eq!(*key, StateKey::BookIds);
            assert_eq!(*producer, Stage::Books);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("book_ids"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_editions_have_distinct_valid_isbns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/book-editions"))
        .respond_with(SequentialIds::from(10))
        .expect(6)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        editions_per_book: 2,
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();
    state.book_ids = Some(vec![1, 2, 3]);
    state.publisher_ids = Some(vec![7]);

    stages::editions::seed(&ctx, &mut state, &mut seeded_rng(Some(2)))
        .await
        .expect("Edition stage failed");

    assert_eq!(state.book_edition_ids.as_ref().map(Vec::len), Some(6));
    let groups = state.book_edition_ids_by_book().expect("groups written");
    assert_eq!(groups.get(&2), Some(&vec![12, 13]));

    let bodies = posted_bodies(&server, "/api/v1/book-editions").await;
    let mut isbns: Vec<String> = bodies
        .iter()
        .map(|b| b["isbn"].as_str().unwrap().to_string())
        .collect();
    assert!(isbns
        .iter()
        .all(|i| librarby_seeder::generate::editions::is_valid_isbn13(i)));
    isbns.sort();
    isbns.dedup();
    assert_eq!(isbns.len(), 6);
    assert!(bodies.iter().all(|b| b["publisherId"] == 7));
}

#[tokio::test]
async fn test_copies_grouped_by_edition() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/books/exact-book/create-book"))
        .and(body_partial_json(json!({"status": "AVAILABLE"})))
        .respond_with(SequentialIds::from(1))
        .expect(4)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        copies_per_edition: 2,
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();
    state.book_edition_ids = Some(vec![30, 31]);

    stages::copies::seed(&ctx, &mut state).await.expect("Copy stage failed");

    assert_eq!(state.book_copy_ids, Some(vec![1, 2, 3, 4]));
    let groups = state.book_copy_ids_by_edition.as_ref().unwrap();
    assert_eq!(groups.get(&30), Some(&vec![1, 2]));
    assert_eq!(groups.get(&31), Some(&vec![3, 4]));
}

#[tokio::test]
async fn test_publishers_reuse_existing_names() {
    let server = MockServer::start().await;
    let existing: Vec<Value> = PUBLISHER_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| json!({"id": 900 + i as i64, "name": name}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/api/v1/publishers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "publishers": existing })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/publishers"))
        .respond_with(SequentialIds::from(1))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        publishers: 10,
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());

    let mut first = PipelineState::new();
    stages::publishers::seed(&ctx, &mut first, &mut seeded_rng(Some(3)))
        .await
        .expect("Publisher stage failed");
    let mut second = PipelineState::new();
    stages::publishers::seed(&ctx, &mut second, &mut seeded_rng(Some(3)))
        .await
        .expect("Publisher stage failed");

    let ids = first.publisher_ids.expect("ids written");
    assert_eq!(ids.len(), 10);
    assert!(ids.iter().all(|id| (900..914).contains(id)));
    assert_eq!(second.publisher_ids, Some(ids));
}

#[tokio::test]
async fn test_publishers_created_when_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/publishers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/publishers"))
        .respond_with(SequentialIds::from(1))
        .expect(4)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        publishers: 4,
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();

    stages::publishers::seed(&ctx, &mut state, &mut seeded_rng(Some(3)))
        .await
        .expect("Publisher stage failed");

    assert_eq!(state.publisher_ids, Some(vec![1, 2, 3, 4]));
}

#[tokio::test]
async fn test_users_register_and_write_ledger() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let creds_path = dir.path().join("seeded_users.json");

    // Mounted first so it wins over the catch-all registration mock
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .and(body_partial_json(json!({"username": "reader_001"})))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "exists"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [
                {"id": 1, "username": "admin", "role": "ADMIN"},
                {"id": 11, "username": "reader_000", "role": "READER"},
                {"id": 12, "username": "reader_001", "role": "READER"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        readers: 3,
        credentials_path: creds_path.display().to_string(),
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();

    stages::users::seed(&ctx, &mut state, &mut seeded_rng(Some(4)))
        .await
        .expect("User stage failed");

    assert_eq!(
        state.reader_usernames,
        Some(vec![
            "reader_000".to_string(),
            "reader_001".to_string(),
            "reader_002".to_string()
        ])
    );
    // reader_002 is not listed, so only two ids resolve
    assert_eq!(state.reader_ids, Some(vec![11, 12]));
    assert_eq!(state.user_credentials_path.as_deref(), Some(creds_path.as_path()));

    let written: Vec<CredentialRecord> =
        serde_json::from_str(&std::fs::read_to_string(&creds_path).unwrap()).unwrap();
    assert_eq!(written.len(), 3);
    assert_eq!(written[0].password, "Reader000!Pass");
    assert_eq!(written[0].email, "reader_000@example.com");
    assert!(written[0].note.is_none());
    assert!(written[1].note.as_deref().unwrap().contains("already existed"));
    assert!(written.iter().all(|r| r.role == UserRole::Reader));
}

#[tokio::test]
async fn test_users_other_failure_aborts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = test_client(&server);
    let seed = SeedConfig {
        readers: 2,
        credentials_path: dir.path().join("creds.json").display().to_string(),
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();

    let err = stages::users::seed(&ctx, &mut state, &mut seeded_rng(Some(4)))
        .await
        .unwrap_err();
    assert!(matches!(err, SeedError::Api(ref api) if api.status() == Some(500)));
    assert!(!dir.path().join("creds.json").exists());
}

#[tokio::test]
async fn test_librarians_promote_and_rewrite_ledger() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let creds_path = dir.path().join("seeded_users.json");

    Mock::given(method("POST"))
        .and(path("/api/v1/librarians"))
        .respond_with(ResponseTemplate::new(409))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        readers: 5,
        librarians: Some(2),
        credentials_path: creds_path.display().to_string(),
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();
    let mut rng = seeded_rng(Some(5));

    stages::users::seed(&ctx, &mut state, &mut rng).await.expect("User stage failed");
    stages::librarians::seed(&ctx, &mut state, &mut rng)
        .await
        .expect("Conflicts count as already promoted");

    let librarians = state.librarian_usernames.clone().unwrap();
    assert_eq!(librarians.len(), 2);

    let written: Vec<CredentialRecord> =
        serde_json::from_str(&std::fs::read_to_string(&creds_path).unwrap()).unwrap();
    let promoted: Vec<&str> = written
        .iter()
        .filter(|r| r.role == UserRole::Librarian)
        .map(|r| r.username.as_str())
        .collect();
    assert_eq!(promoted.len(), 2);
    assert!(promoted.iter().all(|u| librarians.iter().any(|l| l == u)));
}

#[tokio::test]
async fn test_librarians_require_reader_usernames() {
    let server = MockServer::start().await;
    let client = test_client(&server);
    let seed = SeedConfig::default();
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());

    let mut state = PipelineState::new();
    let err = stages::librarians::seed(&ctx, &mut state, &mut seeded_rng(Some(1)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SeedError::MissingPrecondition {
            key: StateKey::ReaderUsernames,
            ..
        }
    ));

    let mut state = PipelineState::new();
    state.reader_usernames = Some(vec![]);
    stages::librarians::seed(&ctx, &mut state, &mut seeded_rng(Some(1)))
        .await
        .expect("No readers promotes nobody");
    assert_eq!(state.librarian_usernames, Some(vec![]));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_librarians_other_failure_aborts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/librarians"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        librarians: Some(2),
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();
    state.reader_usernames = Some(vec!["reader_000".to_string(), "reader_001".to_string()]);

    let err = stages::librarians::seed(&ctx, &mut state, &mut seeded_rng(Some(2)))
        .await
        .unwrap_err();
    match err {
        SeedError::Api(api) => assert_eq!(api.status(), Some(500)),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(state.librarian_usernames, Some(vec![]));
}

#[tokio::test]
async fn test_rentals_stop_when_copies_run_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/rentals"))
        .respond_with(SequentialIds::from(1))
        .expect(5)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        rentals: 20,
        rentals_returned_pct: 0.0,
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let copies = vec![1, 2, 3, 4, 5];
    let mut state = PipelineState::new();
    state.book_copy_ids = Some(copies.clone());
    state.reader_ids = Some(vec![71, 72]);

    stages::rentals::seed(&ctx, &mut state, &mut seeded_rng(Some(6)))
        .await
        .expect("Rental stage failed");

    assert_eq!(state.rental_ids.as_ref().map(Vec::len), Some(5));
    assert_eq!(state.returned_rental_ids, Some(vec![]));

    let mut rented = state.rented_copy_ids.clone().unwrap();
    rented.sort_unstable();
    assert_eq!(rented, copies);

    let bodies = posted_bodies(&server, "/api/v1/rentals").await;
    let mut copy_ids: Vec<i64> = bodies.iter().map(|b| b["copyId"].as_i64().unwrap()).collect();
    copy_ids.sort_unstable();
    assert_eq!(copy_ids, copies);
    for body in bodies {
        assert!([71, 72].contains(&body["readerId"].as_i64().unwrap()));
        let due = chrono::NaiveDate::parse_from_str(body["dueDate"].as_str().unwrap(), "%Y-%m-%d").unwrap();
        assert!((14..=30).contains(&(due - today()).num_days()));
    }
}

#[tokio::test]
async fn test_returned_rentals_free_their_copies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/rentals"))
        .respond_with(SequentialIds::from(1))
        .expect(6)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/api/v1/rentals/\d+/return$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(6)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        rentals: 6,
        rentals_returned_pct: 100.0,
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();
    state.book_copy_ids = Some(vec![1, 2]);
    state.reader_ids = Some(vec![71]);

    stages::rentals::seed(&ctx, &mut state, &mut seeded_rng(Some(7)))
        .await
        .expect("Rental stage failed");

    assert_eq!(state.rental_ids, Some(vec![1, 2, 3, 4, 5, 6]));
    assert_eq!(state.returned_rental_ids, Some(vec![1, 2, 3, 4, 5, 6]));
    assert_eq!(state.rented_copy_ids, Some(vec![]));
}

#[tokio::test]
async fn test_failed_return_keeps_copy_on_loan() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/rentals"))
        .respond_with(SequentialIds::from(1))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/api/v1/rentals/\d+/return$"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        rentals: 3,
        rentals_returned_pct: 100.0,
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();
    state.book_copy_ids = Some(vec![1, 2, 3]);
    state.reader_ids = Some(vec![71]);

    let err = stages::rentals::seed(&ctx, &mut state, &mut seeded_rng(Some(12)))
        .await
        .unwrap_err();
    assert!(matches!(err, SeedError::Api(_)));

    assert_eq!(state.rental_ids, Some(vec![1]));
    assert_eq!(state.returned_rental_ids, Some(vec![]));

    // The rental exists remotely, so its copy must still be recorded as on loan
    let bodies = posted_bodies(&server, "/api/v1/rentals").await;
    let rented_copy = bodies[0]["copyId"].as_i64().unwrap();
    assert_eq!(state.rented_copy_ids, Some(vec![rented_copy]));
}

#[tokio::test]
async fn test_rentals_resolve_readers_from_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "username": "admin", "role": "ADMIN"},
            {"id": 2, "username": "reader_000", "role": "READER"},
            {"id": 3, "username": "reader_001", "role": "READER"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/rentals"))
        .respond_with(SequentialIds::from(1))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        rentals: 3,
        rentals_returned_pct: 0.0,
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();
    state.book_copy_ids = Some(vec![10, 11, 12]);
    state.librarian_usernames = Some(vec!["reader_001".to_string()]);

    stages::rentals::seed(&ctx, &mut state, &mut seeded_rng(Some(8)))
        .await
        .expect("Rental stage failed");

    let bodies = posted_bodies(&server, "/api/v1/rentals").await;
    assert_eq!(bodies.len(), 3);
    assert!(bodies.iter().all(|b| b["readerId"] == 2));
}

#[tokio::test]
async fn test_reviews_deduplicate_and_skip_conflicts() {
    let server = MockServer::start().await;
    let rental = |reader: i64, edition: i64| {
        json!({"readerId": reader, "copyId": 100, "bookId": 9, "editionId": edition})
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/rentals/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rental(5, 90)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/rentals/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rental(5, 90)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/rentals/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rental(6, 90)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/rentals/4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/books/9/reviews"))
        .and(body_partial_json(json!({"readerId": 6})))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/books/9/reviews"))
        .respond_with(SequentialIds::from(300))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig::default();
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();
    state.returned_rental_ids = Some(vec![1, 2, 3, 4]);

    stages::reviews::seed(&ctx, &mut state, &mut seeded_rng(Some(9)))
        .await
        .expect("Conflicts must not fail the review stage");

    assert_eq!(state.reviews_created, Some(1));
    assert_eq!(state.review_ids, Some(vec![300]));

    let bodies = posted_bodies(&server, "/api/v1/books/9/reviews").await;
    assert_eq!(bodies.len(), 2, "the repeated (reader 5, edition 90) pair is sent once");
    for body in bodies {
        let rating = body["rating"].as_i64().unwrap();
        assert!((1..=5).contains(&rating));
        assert_eq!(body["bookEditionId"], 90);
    }
}

#[tokio::test]
async fn test_reviews_fall_back_to_inactive_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/rentals"))
        .and(query_param("active", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rentals": [
                {"readerId": 5, "bookId": 9, "editionId": 90},
                {"readerId": 5, "bookId": 10}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/api/v1/books/\d+/reviews$"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig::default();
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();

    stages::reviews::seed(&ctx, &mut state, &mut seeded_rng(Some(10)))
        .await
        .expect("Review stage failed");

    // Created without an id in the response
    assert_eq!(state.reviews_created, Some(2));
    assert_eq!(state.review_ids, Some(vec![]));
}

#[tokio::test]
async fn test_reviews_server_error_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/rentals"))
        .and(query_param("active", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"readerId": 5, "bookId": 9, "editionId": 90}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/books/9/reviews"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig::default();
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();

    let err = stages::reviews::seed(&ctx, &mut state, &mut seeded_rng(Some(13)))
        .await
        .unwrap_err();
    match err {
        SeedError::Api(api) => assert_eq!(api.status(), Some(500)),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(state.reviews_created, Some(0));
}

#[tokio::test]
async fn test_review_limit_counts_unique_pairs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/rentals"))
        .and(query_param("active", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"readerId": 5, "bookId": 9, "editionId": 90},
            {"readerId": 5, "bookId": 9, "editionId": 90},
            {"readerId": 5, "bookId": 9, "editionId": 90},
            {"readerId": 6, "bookId": 9, "editionId": 90}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/books/9/reviews"))
        .respond_with(SequentialIds::from(400))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig {
        reviews: Some(2),
        ..SeedConfig::default()
    };
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();

    stages::reviews::seed(&ctx, &mut state, &mut seeded_rng(Some(14)))
        .await
        .expect("Review stage failed");

    assert_eq!(state.reviews_created, Some(2));
    let readers: Vec<i64> = posted_bodies(&server, "/api/v1/books/9/reviews")
        .await
        .iter()
        .map(|b| b["readerId"].as_i64().unwrap())
        .collect();
    assert!(readers.contains(&5) && readers.contains(&6));
}

#[tokio::test]
async fn test_reviews_without_candidates_fail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/rentals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let seed = SeedConfig::default();
    let ctx = StageContext::new(&client, &seed, IdScope::Root, today());
    let mut state = PipelineState::new();

    let err = stages::reviews::seed(&ctx, &mut state, &mut seeded_rng(Some(11)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SeedError::MissingPrecondition {
            stage: Stage::Reviews,
            ..
        }
    ));
}

#[tokio::test]
async fn test_login_token_shapes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_partial_json(json!({"username": "admin"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"accessToken": "nested-token"}})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/authors"))
        .and(header("authorization", "Bearer nested-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), SeedConfig::default());
    let session = open_session(&config).await.expect("Login failed");
    assert!(session.is_authenticated());
    session.get("authors").await.expect("Authenticated call failed");

    let anonymous = ApiClient::new(&config.api).unwrap();
    let err = login(&anonymous, "someone", "else").await.unwrap_err();
    assert!(matches!(err, SeedError::MissingToken { .. }));
}

/// Mounts every endpoint a full run touches
async fn mount_library_api(server: &MockServer, readers: usize) {
    for endpoint in [
        "/api/v1/authors",
        "/api/v1/books",
        "/api/v1/book-editions",
        "/api/v1/books/exact-book/create-book",
        "/api/v1/publishers",
        "/api/v1/rentals",
    ] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(SequentialIds::from(1))
            .mount(server)
            .await;
    }

    let users: Vec<Value> = (0..readers)
        .map(|i| json!({"id": 1000 + i as i64, "username": format!("reader_{:03}", i), "role": "READER"}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/api/v1/publishers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .respond_with(ResponseTemplate::new(201))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": users })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/librarians"))
        .respond_with(ResponseTemplate::new(201))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/api/v1/rentals/\d+/return$"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/v1/rentals/\d+$"))
        .respond_with(RentalLookup)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/rentals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rentals": []})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/api/v1/books/\d+/reviews$"))
        .respond_with(SequentialIds::from(1))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_pipeline_run() {
    let server = MockServer::start().await;
    mount_library_api(&server, 5).await;

    let dir = tempfile::tempdir().unwrap();
    let seed = SeedConfig {
        authors: 2,
        publishers: 2,
        books: 3,
        editions_per_book: 1,
        copies_per_edition: 2,
        readers: 5,
        librarians: Some(1),
        rentals: 4,
        rentals_returned_pct: 50.0,
        credentials_path: dir.path().join("seeded_users.json").display().to_string(),
        ..SeedConfig::default()
    };
    let config = create_test_config(&server.uri(), seed);
    let client = test_client(&server);

    let mut seeder = Seeder::with_client(config, client, seeded_rng(Some(42))).with_today(today());
    let state = seeder.run().await.expect("Pipeline failed");

    assert_eq!(state.completed_stages(), &Stage::ALL);
    assert_eq!(state.version(), Stage::ALL.len() as u64);
    assert_eq!(state.author_ids, Some(vec![1, 2]));
    assert_eq!(state.publisher_ids, Some(vec![1, 2]));
    assert_eq!(state.book_ids.as_ref().map(Vec::len), Some(3));
    assert_eq!(state.book_edition_ids.as_ref().map(Vec::len), Some(3));
    assert_eq!(state.book_copy_ids.as_ref().map(Vec::len), Some(6));
    assert_eq!(state.reader_ids.as_ref().map(Vec::len), Some(5));
    assert_eq!(state.librarian_usernames.as_ref().map(Vec::len), Some(1));
    assert_eq!(state.rental_ids.as_ref().map(Vec::len), Some(4));

    let returned = state.returned_rental_ids.as_ref().unwrap().len();
    let still_out = state.rented_copy_ids.as_ref().unwrap().len();
    assert_eq!(returned + still_out, 4);

    let created = state.reviews_created.expect("reviews ran");
    assert!(created >= 1);
    assert_eq!(state.review_ids.as_ref().map(Vec::len), Some(created));

    let summary = format_summary(&state);
    assert!(summary.starts_with("Seeding finished.\nState summary:\n"));
    assert!(summary.contains("  author_ids: 2\n"));
    assert!(summary.contains("  book_copy_ids: 6\n"));
    assert!(dir.path().join("seeded_users.json").exists());
}

#[tokio::test]
async fn test_skipped_stages_do_not_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/authors"))
        .respond_with(SequentialIds::from(1))
        .expect(2)
        .mount(&server)
        .await;

    let seed = SeedConfig {
        authors: 2,
        skip_stages: Stage::ALL
            .iter()
            .filter(|s| **s != Stage::Authors)
            .map(|s| s.to_string())
            .collect(),
        ..SeedConfig::default()
    };
    let config = create_test_config(&server.uri(), seed);
    let mut seeder = Seeder::with_client(config, test_client(&server), seeded_rng(Some(1)));

    let state = seeder.run().await.expect("Pipeline failed");

    assert_eq!(state.completed_stages(), &[Stage::Authors]);
    assert_eq!(state.author_ids, Some(vec![1, 2]));
    assert!(state.book_ids.is_none());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
