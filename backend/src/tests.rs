use std::sync::Arc;
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};
use time::macros::datetime;
use shared::models::*;
use crate::{
    build_rocket,
    clock::FixedClock,
    config::{AppConfig, ConfigError},
    error::ApiError,
    routes::AppState,
    service::PollService,
    store::{MemoryStore, PollStore},
};

const QUESTION: &str = "Who will win the Premier League?";

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(datetime!(2024-10-06 12:24:41 UTC)))
}

fn service(store: Arc<MemoryStore>) -> PollService {
    PollService::new(store, clock())
}

fn options(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

fn share<'a>(results: &'a [OptionTally], option: &str) -> Option<&'a str> {
    results.iter().find(|r| r.option == option).and_then(|r| r.share.as_deref())
}

mod service_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_poll_seeds_options() {
        let store = Arc::new(MemoryStore::new());
        let polls = service(store.clone());

        let id = polls
            .create_poll(QUESTION, &options(&["Manchester City", "Arsenal", "Liverpool"]))
            .await
            .unwrap();
        assert_eq!(id, 1);

        let votes = store.find_votes_by_poll(id).await.unwrap();
        assert_eq!(votes.len(), 3);
        assert!(votes.iter().all(|v| v.kind == VoteKind::Seed && v.poll == id));
        assert!(votes.iter().all(|v| v.cast_on == datetime!(2024-10-06 12:24:41 UTC)));

        let detail = polls.get_poll("1").await.unwrap();
        assert_eq!(detail.question, QUESTION);
        assert_eq!(detail.options, ["Manchester City", "Arsenal", "Liverpool"]);
    }

    #[tokio::test]
    async fn test_cast_votes_and_tally() {
        let polls = service(Arc::new(MemoryStore::new()));
        let id = polls.create_poll("A or B?", &options(&["A", "B"])).await.unwrap();

        polls.cast_vote(id, "A").await.unwrap();
        for _ in 0..3 {
            polls.cast_vote(id, "B").await.unwrap();
        }

        let votes = polls.get_votes("1").await.unwrap();
        assert_eq!(votes.len(), 6);
        assert_eq!(votes.iter().filter(|v| v.is_ballot()).count(), 4);

        let results = polls.results("1").await.unwrap();
        assert_eq!(share(&results, "A"), Some("25%"));
        assert_eq!(share(&results, "B"), Some("75%"));
    }

    #[tokio::test]
    async fn test_cast_vote_returns_all_rows() {
        let polls = service(Arc::new(MemoryStore::new()));
        let id = polls.create_poll(QUESTION, &options(&["Manchester City", "Arsenal"])).await.unwrap();

        let rows = polls.cast_vote(id, "Arsenal").await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.last().map(|v| (v.option.as_str(), v.kind)), Some(("Arsenal", VoteKind::Ballot)));
    }

    #[tokio::test]
    async fn test_undeclared_option_is_accepted_by_default() {
        let polls = service(Arc::new(MemoryStore::new()));
        let id = polls.create_poll(QUESTION, &options(&["Manchester City", "Arsenal"])).await.unwrap();

        polls.cast_vote(id, "Chelsea").await.unwrap();

        let results = polls.results("1").await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(share(&results, "Chelsea"), Some("100%"));
        assert_eq!(share(&results, "Arsenal"), Some("0%"));
        assert!(polls.get_poll("1").await.unwrap().options.contains(&"Chelsea".to_string()));
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_undeclared_option() {
        let polls = service(Arc::new(MemoryStore::new())).with_strict_options(true);
        let id = polls.create_poll(QUESTION, &options(&["Manchester City", "Arsenal"])).await.unwrap();

        let err = polls.cast_vote(id, "Chelsea").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidOption(ref o) if o == "Chelsea"));
        assert_eq!(polls.get_votes("1").await.unwrap().len(), 2);

        assert!(polls.cast_vote(id, "Arsenal").await.is_ok());
    }

    #[tokio::test]
    async fn test_strict_mode_ignores_earlier_undeclared_ballots() {
        let store = Arc::new(MemoryStore::new());
        let permissive = service(store.clone());
        let id = permissive.create_poll(QUESTION, &options(&["Manchester City", "Arsenal"])).await.unwrap();
        permissive.cast_vote(id, "Chelsea").await.unwrap();

        let strict = service(store).with_strict_options(true);
        let err = strict.cast_vote(id, "Chelsea").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidOption(ref o) if o == "Chelsea"));
        assert_eq!(strict.get_votes("1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_cast_vote_on_missing_poll() {
        let polls = service(Arc::new(MemoryStore::new()));
        let err = polls.cast_vote(42, "A").await.unwrap_err();
        assert!(matches!(err, ApiError::PollNotFound(ref id) if id == "42"));
    }

    #[tokio::test]
    async fn test_get_poll_not_found() {
        let polls = service(Arc::new(MemoryStore::new()));
        assert!(matches!(polls.get_poll("7").await, Err(ApiError::PollNotFound(_))));
    }

    #[tokio::test]
    async fn test_stale_option_rows_without_poll_are_not_found() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_vote(NewVote::seed(9, "Orphan", datetime!(2024-10-06 12:00:00 UTC)))
            .await
            .unwrap();

        let polls = service(store);
        assert!(matches!(polls.get_poll("9").await, Err(ApiError::PollNotFound(_))));
    }

    #[tokio::test]
    async fn test_malformed_identifier() {
        let polls = service(Arc::new(MemoryStore::new()));
        assert!(matches!(polls.get_votes("abc").await, Err(ApiError::MalformedIdentifier(_))));
        assert!(matches!(polls.get_poll("1.5").await, Err(ApiError::MalformedIdentifier(_))));
    }

    #[tokio::test]
    async fn test_unknown_poll_has_no_votes() {
        let polls = service(Arc::new(MemoryStore::new()));
        assert!(polls.get_votes("3").await.unwrap().is_empty());
        assert!(polls.results("3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_polls_are_isolated() {
        let polls = service(Arc::new(MemoryStore::new()));
        let first = polls.create_poll("First?", &options(&["A", "B"])).await.unwrap();
        let second = polls.create_poll("Second?", &options(&["X", "Y", "Z"])).await.unwrap();
        assert_eq!(second, first + 1);

        polls.cast_vote(second, "X").await.unwrap();

        let results = polls.results(&second.to_string()).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.poll.as_deref() == Some("2")));
        assert_eq!(polls.get_votes(&first.to_string()).await.unwrap().len(), 2);
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(!config.strict_vote_options);
        assert_eq!(config.allowed_origin, "http://localhost");
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(|key| match key {
            "STRICT_VOTE_OPTIONS" => Some("TRUE".into()),
            "CORS_ALLOWED_ORIGIN" => Some("https://polls.example.com".into()),
            _ => None,
        })
        .unwrap();
        assert!(config.strict_vote_options);
        assert_eq!(config.allowed_origin, "https://polls.example.com");
    }

    #[test]
    fn test_invalid_bool() {
        let err = AppConfig::from_lookup(|key| (key == "STRICT_VOTE_OPTIONS").then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBool { key: "STRICT_VOTE_OPTIONS", .. }));
    }
}

mod http_tests {
    use super::*;

    async fn client_with(config: AppConfig) -> Client {
        let state = AppState::with_store(Arc::new(MemoryStore::new()), clock(), config);
        Client::tracked(build_rocket(state)).await.expect("valid rocket instance")
    }

    async fn client() -> Client {
        client_with(AppConfig::default()).await
    }

    async fn create(client: &Client, body: Value) -> (Status, Value) {
        let res = client.post("/api/v1/poll")
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        let status = res.status();
        (status, res.into_json::<Value>().await.unwrap_or(Value::Null))
    }

    async fn vote(client: &Client, poll: &str, option: &str) -> (Status, Value) {
        let res = client.post(format!("/api/v1/poll/{}/vote", poll))
            .header(ContentType::JSON)
            .body(json!({ "voteCast": option }).to_string())
            .dispatch()
            .await;
        let status = res.status();
        (status, res.into_json::<Value>().await.unwrap_or(Value::Null))
    }

    async fn get(client: &Client, uri: &str) -> (Status, Value) {
        let res = client.get(uri.to_string()).dispatch().await;
        let status = res.status();
        (status, res.into_json::<Value>().await.unwrap_or(Value::Null))
    }

    fn premier_league() -> Value {
        json!({ "question": QUESTION, "options": ["Manchester City", "Arsenal", "Liverpool"] })
    }

    #[tokio::test]
    async fn test_create_and_fetch_poll() {
        let client = client().await;
        let (status, id) = create(&client, premier_league()).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(id, json!(1));

        let (status, detail) = get(&client, "/api/v1/poll/1").await;
        assert_eq!(status, Status::Ok);
        assert_eq!(detail, json!({
            "id": 1,
            "question": QUESTION,
            "options": ["Manchester City", "Arsenal", "Liverpool"]
        }));
    }

    #[tokio::test]
    async fn test_invalid_option_count_is_bad_request() {
        let client = client().await;
        let (status, body) = create(&client, json!({ "question": QUESTION, "options": ["Manchester City"] })).await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["code"], "validationFailed");
        assert_eq!(body["message"], "Invalid input - A poll can have between 2 and 7 options");
        assert_eq!(body["details"], "TooFewOptions");
    }

    #[tokio::test]
    async fn test_malformed_body_is_unprocessable() {
        let client = client().await;
        let (status, body) = create(&client, json!({ "title": QUESTION })).await;
        assert_eq!(status, Status::UnprocessableEntity);
        assert_eq!(body["status"], 422);
    }

    #[tokio::test]
    async fn test_vote_returns_distribution() {
        let client = client().await;
        create(&client, premier_league()).await;

        let (status, body) = vote(&client, "1", "Arsenal").await;
        assert_eq!(status, Status::Ok);
        assert_eq!(body, json!([
            { "option": "Manchester City", "poll": "1", "share": "0%" },
            { "option": "Arsenal", "poll": "1", "share": "100%" },
            { "option": "Liverpool", "poll": "1", "share": "0%" }
        ]));
    }

    #[tokio::test]
    async fn test_read_views() {
        let client = client().await;
        create(&client, json!({ "question": "A or B?", "options": ["A", "B"] })).await;
        vote(&client, "1", "A").await;
        for _ in 0..3 {
            vote(&client, "1", "B").await;
        }

        let (status, options) = get(&client, "/api/v1/poll/1/options").await;
        assert_eq!(status, Status::Ok);
        assert_eq!(options, json!([
            { "option": "A", "poll": "1" },
            { "option": "B", "poll": "1" }
        ]));

        let (_, results) = get(&client, "/api/v1/poll/1/votes").await;
        assert_eq!(results, json!([
            { "option": "A", "poll": "1", "share": "25%" },
            { "option": "B", "poll": "1", "share": "75%" }
        ]));

        let (status, log) = get(&client, "/api/v1/poll/1/ballots").await;
        assert_eq!(status, Status::Ok);
        let votes = log["votes"].as_array().unwrap();
        assert_eq!(votes.len(), 6);
        assert_eq!(votes[0], json!({
            "poll": 1,
            "option": "A",
            "kind": "seed",
            "castOn": "2024-10-06T12:24:41Z"
        }));
        assert_eq!(votes.iter().filter(|v| v["kind"] == "ballot").count(), 4);
    }

    #[tokio::test]
    async fn test_unknown_poll_is_not_found() {
        let client = client().await;
        let (status, body) = get(&client, "/api/v1/poll/99").await;
        assert_eq!(status, Status::NotFound);
        assert_eq!(body["code"], "notFound");
        assert_eq!(body["message"], "Could not find poll with identifier 99");

        let (status, _) = vote(&client, "99", "A").await;
        assert_eq!(status, Status::NotFound);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let client = client().await;
        let (status, body) = get(&client, "/api/v1/poll/abc/votes").await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["code"], "invalidInput");
    }

    #[tokio::test]
    async fn test_strict_mode_over_http() {
        let client = client_with(AppConfig { strict_vote_options: true, ..AppConfig::default() }).await;
        create(&client, premier_league()).await;

        let (status, body) = vote(&client, "1", "Chelsea").await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body["code"], "invalidInput");
    }

    #[tokio::test]
    async fn test_unmatched_route_uses_json_catcher() {
        let client = client().await;
        let (status, body) = get(&client, "/api/v1/nothing/here").await;
        assert_eq!(status, Status::NotFound);
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn test_cors_headers_for_allowed_origin() {
        let client = client().await;
        let res = client.get("/api/v1/poll/1/options")
            .header(Header::new("Origin", "http://localhost:8080"))
            .dispatch()
            .await;
        assert_eq!(res.headers().get_one("Access-Control-Allow-Origin"), Some("http://localhost:8080"));

        let res = client.get("/api/v1/poll/1/options")
            .header(Header::new("Origin", "https://elsewhere.example"))
            .dispatch()
            .await;
        assert_eq!(res.headers().get_one("Access-Control-Allow-Origin"), None);

        let res = client.get("/api/v1/poll/1/options")
            .header(Header::new("Origin", "http://localhost.evil.example"))
            .dispatch()
            .await;
        assert_eq!(res.headers().get_one("Access-Control-Allow-Origin"), None);

        let res = client.get("/api/v1/poll/1/options")
            .header(Header::new("Origin", "http://localhost"))
            .dispatch()
            .await;
        assert_eq!(res.headers().get_one("Access-Control-Allow-Origin"), Some("http://localhost"));
    }

    #[tokio::test]
    async fn test_preflight() {
        let client = client().await;
        let res = client.options("/api/v1/poll").dispatch().await;
        assert_eq!(res.status(), Status::Ok);
    }
}
