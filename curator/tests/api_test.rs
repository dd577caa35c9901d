use common::Config;
use curator::server::{build_rocket, AppState};
use mockito::Matcher;
use rocket::http::Status;
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};

/// Config pointing every provider at the given base URLs
fn test_config(news_url: &str, llm_url: &str) -> Config {
    let mut config = Config::default();
    config.news.base_url = news_url.to_string();
    config.news.api_key = Some("test-key".to_string());
    config.llm.summarize.api_url = format!("{}/v1/completions", llm_url);
    config.llm.chat.api_url = format!("{}/api/generate", llm_url);
    config
}

async fn client_for(config: Config) -> Client {
    let state = AppState::from_config(config).expect("state");
    let figment = rocket::Config::figment().merge(("log_level", "off"));
    Client::tracked(build_rocket(state, figment)).await.expect("rocket client")
}

#[tokio::test]
async fn test_health_and_topics() {
    let client = client_for(test_config("http://127.0.0.1:1", "http://127.0.0.1:1")).await;

    let response = client.get("/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().await.as_deref(), Some("OK"));

    let body: Value = client.get("/api/topics").dispatch().await.into_json().await.expect("json");
    let topics = body["topics"].as_array().expect("topics array");
    assert_eq!(topics.len(), 8);
    assert_eq!(topics[0]["id"], "technology");

    let status: Value = client.get("/api/status").dispatch().await.into_json().await.expect("json");
    assert_eq!(status["news_configured"], true);
    assert_eq!(status["chat_model"], "llama3.2:latest");
}

#[tokio::test]
async fn test_news_returns_provider_articles() {
    let mut news = mockito::Server::new_async().await;
    let mock = news
        .mock("GET", "/everything")
        .match_query(Matcher::UrlEncoded("q".into(), "technology".into()))
        .with_status(200)
        .with_body(
            json!({
                "status": "ok",
                "totalResults": 2,
                "articles": [
                    { "source": { "id": null, "name": "Wired" }, "title": "One", "url": "https://a", "publishedAt": "2024-01-15T10:00:00Z" },
                    { "source": { "id": null, "name": "Verge" }, "title": "Two", "url": "https://b", "publishedAt": "2024-01-15T11:00:00Z" }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(test_config(&news.url(), "http://127.0.0.1:1")).await;
    let response = client.get("/api/news?topic=technology").dispatch().await;

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("json");
    let articles = body["articles"].as_array().expect("articles array");
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[1]["title"], "Two");
    assert_eq!(articles[0]["publishedAt"], "2024-01-15T10:00:00Z");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_parameters_are_bad_requests() {
    let client = client_for(test_config("http://127.0.0.1:1", "http://127.0.0.1:1")).await;

    let response = client.get("/api/news").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.expect("json");
    assert_eq!(body["message"], "Topic parameter is required");

    let response = client.get("/api/search?q=").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);

    let response = client.post("/api/summarize").json(&json!({ "title": "X" })).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.expect("json");
    assert_eq!(body["message"], "Content and title are required");

    for path in ["/api/llama-summarize", "/api/chat"] {
        let response = client.post(path).json(&json!({ "style": "bullets" })).dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.expect("json");
        assert_eq!(body["message"], "Message is required");
    }

    let response = client
        .post("/api/llama-summarize")
        .header(rocket::http::ContentType::JSON)
        .body("{not json")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_summarize_returns_first_choice() {
    let mut llm = mockito::Server::new_async().await;
    let mock = llm
        .mock("POST", "/v1/completions")
        .match_body(Matcher::PartialJson(json!({ "model": "llama-3.2" })))
        .with_status(200)
        .with_body(r#"{"choices":[{"text":"short summary"}]}"#)
        .create_async()
        .await;

    let client = client_for(test_config("http://127.0.0.1:1", &llm.url())).await;
    let response = client
        .post("/api/summarize")
        .json(&json!({ "title": "X", "content": "Y" }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("json");
    assert_eq!(body, json!({ "summary": "short summary" }));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_replies_with_model_output() {
    let mut llm = mockito::Server::new_async().await;
    let mock = llm
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({ "stream": false })))
        .with_status(200)
        .with_body(r#"{"model":"llama3.2:latest","response":"- point one","usage":{"total_tokens":9}}"#)
        .create_async()
        .await;

    let client = client_for(test_config("http://127.0.0.1:1", &llm.url())).await;
    let response = client
        .post("/api/llama-summarize")
        .json(&json!({ "message": "Storm hits coast", "style": "bullets" }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("json");
    assert_eq!(body["response"], "- point one");
    assert_eq!(body["model"], "llama3.2:latest");
    assert_eq!(body["usage"]["total_tokens"], 9);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_with_unreachable_model_gives_hint() {
    let client = client_for(test_config("http://127.0.0.1:1", "http://127.0.0.1:1")).await;
    let response = client
        .post("/api/chat")
        .json(&json!({ "message": "hello", "style": "paragraph" }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::InternalServerError);
    let body: Value = response.into_json().await.expect("json");
    let message = body["message"].as_str().expect("message");
    assert!(message.contains("make sure it's running"));
    assert!(body["suggestion"].as_str().is_some());
}

#[tokio::test]
async fn test_whitespace_message_is_not_a_bad_request() {
    let client = client_for(test_config("http://127.0.0.1:1", "http://127.0.0.1:1")).await;

    let response = client.post("/api/chat").json(&json!({ "message": "   " })).dispatch().await;
    assert_eq!(response.status(), Status::InternalServerError);

    let response = client.post("/api/chat").json(&json!({ "message": "" })).dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_news_provider_rejection_is_reported() {
    let mut news = mockito::Server::new_async().await;
    news.mock("GET", Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let client = client_for(test_config(&news.url(), "http://127.0.0.1:1")).await;
    let response = client.get("/api/news?topic=technology").dispatch().await;

    assert_eq!(response.status(), Status::InternalServerError);
    let body: Value = response.into_json().await.expect("json");
    assert_eq!(body["message"], "Failed to fetch news");
    assert_eq!(body["error"], "Invalid API key for News API");
}

#[tokio::test]
async fn test_missing_news_key_is_a_server_error() {
    let mut config = test_config("http://127.0.0.1:1", "http://127.0.0.1:1");
    config.news.api_key = None;
    config.news.api_key_env = Some("CURATOR_TEST_UNSET_KEY".to_string());

    let client = client_for(config).await;
    let response = client.get("/api/news?topic=science").dispatch().await;

    assert_eq!(response.status(), Status::InternalServerError);
    let body: Value = response.into_json().await.expect("json");
    assert_eq!(body["error"], "NEWS_API_KEY is not configured");
}
