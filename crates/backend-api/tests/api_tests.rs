use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_HEADERS,
            ACCESS_CONTROL_REQUEST_METHOD, AUTHORIZATION, CONTENT_TYPE, ORIGIN,
        },
        Method, Request, StatusCode,
    },
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use swapshop_auth::Authenticator;
use swapshop_backend_api::{build_router, AppState, MediaStore};
use swapshop_config::{AppConfig, DatabaseConfig};
use swapshop_database::initialize_database;
use tempfile::TempDir;
use tower::ServiceExt;

type TestResult<T = ()> = anyhow::Result<T>;

const BOUNDARY: &str = "swapshop-test-boundary";

struct TestContext {
    temp_dir: TempDir,
    pool: SqlitePool,
    state: AppState,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        Self::with_config(AppConfig::default()).await
    }

    async fn with_config(mut config: AppConfig) -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("backend_api.sqlite");
        config.database = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 5,
        };
        config.media.root = temp_dir.path().join("media");

        let pool = initialize_database(&config.database).await?;
        let authenticator = Authenticator::new(pool.clone(), config.auth.clone());
        let state = AppState::new(
            authenticator,
            MediaStore::new(&config.media),
            config.geo.clone(),
        );

        Ok(Self {
            temp_dir,
            pool,
            state,
        })
    }

    fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    async fn send(&self, request: Request<Body>) -> TestResult<(StatusCode, Value)> {
        let response = self.router().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    async fn register(&self, username: &str) -> TestResult<String> {
        let (status, body) = self
            .send(json_request(
                Method::POST,
                "/auth/register/",
                None,
                json!({ "username": username, "email": "", "password": "s3cret" }),
            ))
            .await?;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        Ok(body["token"].as_str().unwrap_or_default().to_string())
    }

    async fn create_listing(&self, token: &str, payload: Value) -> TestResult<Value> {
        let (status, body) = self
            .send(json_request(Method::POST, "/listings/", Some(token), payload))
            .await?;
        assert_eq!(status, StatusCode::CREATED, "create listing failed: {body}");
        Ok(body)
    }
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Token {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Token {token}"));
    }
    builder.body(Body::empty()).expect("request should build")
}

fn multipart_request(token: &str, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/listings/")
        .header(AUTHORIZATION, format!("Token {token}"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request should build")
}

fn approx(value: &Value, expected: f64) {
    let actual = value.as_f64().expect("number expected");
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn health_reports_ok() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = ctx.send(get_request("/health", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());

    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = ctx.send(get_request("/docs/openapi.json", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/nearby-listings/"].is_object());

    Ok(())
}

#[tokio::test]
async fn register_login_and_me_share_one_token() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx.register("alice").await?;
    assert_eq!(token.len(), 40);

    let (status, body) = ctx
        .send(json_request(
            Method::POST,
            "/auth/login/",
            None,
            json!({ "username": "alice", "password": "s3cret" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"], token.as_str());
    assert_eq!(body["user"]["username"], "alice");

    let (status, body) = ctx.send(get_request("/auth/me/", Some(token.as_str()))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");

    Ok(())
}

#[tokio::test]
async fn auth_failures_render_detail() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.register("alice").await?;

    let (status, body) = ctx
        .send(json_request(
            Method::POST,
            "/auth/register/",
            None,
            json!({ "username": "alice", "password": "again" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap_or_default().contains("already exists"));

    let (status, body) = ctx
        .send(json_request(
            Method::POST,
            "/auth/login/",
            None,
            json!({ "username": "alice", "password": "wrong" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid credentials.");

    let (status, body) = ctx.send(get_request("/auth/me/", None)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].is_string());

    let (status, _) = ctx
        .send(get_request("/auth/me/", Some("0000000000000000000000000000000000000000")))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn wardrobe_exists_after_registration_and_cannot_be_duplicated() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx.register("alice").await?;

    let (status, body) = ctx.send(get_request("/wardrobes/", Some(token.as_str()))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = ctx
        .send(json_request(Method::POST, "/wardrobes/", Some(token.as_str()), json!({})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    Ok(())
}

#[tokio::test]
async fn listing_created_from_json_gets_eco_impact_and_location() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx.register("alice").await?;

    let listing = ctx
        .create_listing(
            &token,
            json!({
                "title": "Rain jacket",
                "description": "Barely worn",
                "condition": "good",
                "category": "synthetic",
                "location": "POINT(13.405 52.52)"
            }),
        )
        .await?;

    approx(&listing["eco_impact"], 6.0);
    assert_eq!(listing["location_coords"], "13.405,52.52");
    assert_eq!(listing["owner_username"], "alice");
    assert_eq!(listing["is_public"], true);
    assert!(listing["image"].is_null());
    assert!(listing.get("distance").is_none());

    let second = ctx
        .create_listing(&token, json!({ "title": "Scarf", "condition": "new" }))
        .await?;
    assert_eq!(second["category"], "mixed");
    approx(&second["eco_impact"], 6.0);

    let (status, body) = ctx.send(get_request("/listings/", Some(token.as_str()))).await?;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Scarf", "Rain jacket"]);

    Ok(())
}

#[tokio::test]
async fn invalid_listing_fields_are_rejected() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx.register("alice").await?;

    for payload in [
        json!({ "title": "", "condition": "good" }),
        json!({ "title": "Hat" }),
        json!({ "title": "Hat", "condition": "worn" }),
        json!({ "title": "Hat", "condition": "good", "category": "wool" }),
        json!({ "title": "Hat", "condition": "good", "location": "200,10" }),
        json!({ "title": "Hat", "condition": "good", "location": "1234é" }),
        json!({ "title": "Hat", "condition": "good", "location": "Pointé(1 2)" }),
    ] {
        let (status, body) = ctx
            .send(json_request(Method::POST, "/listings/", Some(token.as_str()), payload.clone()))
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload} gave {body}");
        assert!(body["detail"].is_string());
    }

    let (status, _) = ctx
        .send(json_request(
            Method::POST,
            "/listings/",
            None,
            json!({ "title": "Hat", "condition": "good" }),
        ))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn multipart_listing_stores_and_serves_the_image() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx.register("alice").await?;

    let request = multipart_request(
        &token,
        &[
            ("title", "Wool coat"),
            ("condition", "like_new"),
            ("category", "cotton"),
            ("location", "13.405,52.52"),
            ("is_public", "true"),
            ("unexpected", "ignored"),
        ],
        Some(("coat.png", b"\x89PNG fake image")),
    );
    let (status, listing) = ctx.send(request).await?;
    assert_eq!(status, StatusCode::CREATED, "{listing}");
    approx(&listing["eco_impact"], 4.0);

    let image_url = listing["image"].as_str().unwrap_or_default().to_string();
    assert!(image_url.starts_with("/media/listings/coat_"), "{image_url}");
    assert!(image_url.ends_with(".png"));

    let stored = ctx
        .temp_dir
        .path()
        .join("media")
        .join(image_url.trim_start_matches("/media/"));
    assert_eq!(std::fs::read(&stored)?, b"\x89PNG fake image");

    let response = ctx.router().oneshot(get_request(&image_url, None)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await?.to_bytes();
    assert_eq!(&bytes[..], b"\x89PNG fake image");

    Ok(())
}

#[tokio::test]
async fn multipart_rejects_unsupported_files_and_accepts_empty_image_part() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx.register("alice").await?;

    let (status, body) = ctx
        .send(multipart_request(
            &token,
            &[("title", "Notes"), ("condition", "good")],
            Some(("notes.txt", b"plain text")),
        ))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap_or_default().contains("unsupported"));

    let (status, listing) = ctx
        .send(multipart_request(
            &token,
            &[("title", "Belt"), ("condition", "fair")],
            Some(("", b"")),
        ))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(listing["image"].is_null());

    Ok(())
}

#[tokio::test]
async fn oversized_upload_is_rejected_with_413() -> TestResult {
    let mut config = AppConfig::default();
    config.media.max_upload_bytes = 16;
    let ctx = TestContext::with_config(config).await?;
    let token = ctx.register("alice").await?;

    let (status, body) = ctx
        .send(multipart_request(
            &token,
            &[("title", "Boots"), ("condition", "good")],
            Some(("boots.jpg", &[0u8; 64])),
        ))
        .await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "{body}");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
        .fetch_one(&ctx.pool)
        .await?;
    assert_eq!(count, 0);

    Ok(())
}

#[tokio::test]
async fn private_listings_are_visible_to_their_owner_only() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.register("alice").await?;
    let bob = ctx.register("bob").await?;

    let private = ctx
        .create_listing(
            &alice,
            json!({ "title": "Secret dress", "condition": "new", "is_public": false }),
        )
        .await?;
    ctx.create_listing(&alice, json!({ "title": "Open shirt", "condition": "good" }))
        .await?;
    let uri = format!("/listings/{}/", private["id"]);

    let (status, _) = ctx.send(get_request(&uri, Some(alice.as_str()))).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = ctx.send(get_request(&uri, Some(bob.as_str()))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = ctx.send(get_request(&uri, None)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx.send(get_request("/public-listings/", None)).await?;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Open shirt"]);

    Ok(())
}

#[tokio::test]
async fn nearby_listings_filter_by_radius_and_sort_by_distance() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx.register("alice").await?;

    ctx.create_listing(
        &token,
        json!({ "title": "Five km east", "condition": "good", "location": "13.4788,52.52" }),
    )
    .await?;
    ctx.create_listing(
        &token,
        json!({ "title": "Centre", "condition": "good", "location": "13.405,52.52" }),
    )
    .await?;
    ctx.create_listing(
        &token,
        json!({ "title": "Fifty km north", "condition": "good", "location": "13.405,52.97" }),
    )
    .await?;
    ctx.create_listing(
        &token,
        json!({
            "title": "Private nearby",
            "condition": "good",
            "location": "13.41,52.52",
            "is_public": false
        }),
    )
    .await?;
    ctx.create_listing(&token, json!({ "title": "Nowhere", "condition": "good" }))
        .await?;

    let (status, body) = ctx
        .send(get_request("/nearby-listings/?lat=52.52&lon=13.405&radius=10", None))
        .await?;
    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().unwrap();
    let titles: Vec<&str> = results
        .iter()
        .filter_map(|item| item["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Centre", "Five km east"]);

    approx(&results[0]["distance"], 0.0);
    let east = results[1]["distance"].as_f64().unwrap();
    assert!((4.5..5.5).contains(&east), "distance was {east}");

    let (status, body) = ctx
        .send(get_request("/nearby-listings/?lat=52.52&lon=13.405&radius=100", None))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(3));

    let (status, body) = ctx
        .send(get_request("/nearby-listings/?lat=52.52&lon=13.405", None))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    Ok(())
}

#[tokio::test]
async fn nearby_listings_reach_the_edge_of_the_radius_far_from_the_equator() -> TestResult {
    let ctx = TestContext::new().await?;
    let token = ctx.register("alice").await?;

    ctx.create_listing(
        &token,
        json!({ "title": "Svalbard coat", "condition": "good", "location": "26.5,81.06" }),
    )
    .await?;
    ctx.create_listing(
        &token,
        json!({ "title": "Dateline boots", "condition": "fair", "location": "179.95,10" }),
    )
    .await?;

    let (status, body) = ctx
        .send(get_request("/nearby-listings/?lat=80&lon=0&radius=500", None))
        .await?;
    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1, "got {body}");
    assert_eq!(results[0]["title"], "Svalbard coat");
    let distance = results[0]["distance"].as_f64().unwrap();
    assert!((490.0..500.0).contains(&distance), "distance was {distance}");

    let (status, body) = ctx
        .send(get_request("/nearby-listings/?lat=10&lon=-179.95&radius=50", None))
        .await?;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Dateline boots"]);

    Ok(())
}

#[tokio::test]
async fn nearby_listings_validate_the_query() -> TestResult {
    let ctx = TestContext::new().await?;

    for uri in [
        "/nearby-listings/?lat=95&lon=13",
        "/nearby-listings/?lat=52&lon=200",
        "/nearby-listings/?lat=52&lon=13&radius=0",
        "/nearby-listings/?lat=52&lon=13&radius=-4",
        "/nearby-listings/?lat=52",
        "/nearby-listings/?lat=north&lon=13",
    ] {
        let (status, body) = ctx.send(get_request(uri, None)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} gave {body}");
        assert!(body["detail"].is_string());
    }

    Ok(())
}

#[tokio::test]
async fn messages_reach_the_listing_owner_inbox() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.register("alice").await?;
    let bob = ctx.register("bob").await?;

    let listing = ctx
        .create_listing(&alice, json!({ "title": "Denim jacket", "condition": "good" }))
        .await?;
    let listing_id = listing["id"].as_i64().unwrap();

    let (status, message) = ctx
        .send(json_request(
            Method::POST,
            "/messages/",
            Some(bob.as_str()),
            json!({ "listing": listing_id, "content": "  Is this still available?  " }),
        ))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{message}");
    assert_eq!(message["content"], "Is this still available?");
    assert_eq!(message["sender_username"], "bob");
    assert_eq!(message["listing"]["title"], "Denim jacket");
    assert_eq!(message["is_read"], false);

    let (_, inbox) = ctx.send(get_request("/inbox/", Some(alice.as_str()))).await?;
    assert_eq!(inbox.as_array().map(Vec::len), Some(1));
    let (_, inbox) = ctx.send(get_request("/inbox/", Some(bob.as_str()))).await?;
    assert_eq!(inbox.as_array().map(Vec::len), Some(0));

    Ok(())
}

#[tokio::test]
async fn invalid_messages_are_rejected() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.register("alice").await?;
    let bob = ctx.register("bob").await?;

    let public = ctx
        .create_listing(&alice, json!({ "title": "Shirt", "condition": "good" }))
        .await?;
    let private = ctx
        .create_listing(
            &alice,
            json!({ "title": "Hidden", "condition": "good", "is_public": false }),
        )
        .await?;

    let cases = [
        (&bob, json!({ "listing": public["id"], "content": "   " })),
        (&bob, json!({ "listing": public["id"], "content": "x".repeat(2001) })),
        (&bob, json!({ "listing": private["id"], "content": "Hello" })),
        (&bob, json!({ "listing": 9999, "content": "Hello" })),
        (&alice, json!({ "listing": public["id"], "content": "Talking to myself" })),
    ];
    for (token, payload) in cases {
        let (status, body) = ctx
            .send(json_request(Method::POST, "/messages/", Some(token.as_str()), payload.clone()))
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload} gave {body}");
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
        .fetch_one(&ctx.pool)
        .await?;
    assert_eq!(count, 0);

    Ok(())
}

#[tokio::test]
async fn only_the_recipient_can_mark_a_message_read() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.register("alice").await?;
    let bob = ctx.register("bob").await?;

    let listing = ctx
        .create_listing(&alice, json!({ "title": "Boots", "condition": "fair" }))
        .await?;
    for content in ["First", "Second"] {
        let (status, _) = ctx
            .send(json_request(
                Method::POST,
                "/messages/",
                Some(bob.as_str()),
                json!({ "listing": listing["id"], "content": content }),
            ))
            .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, inbox) = ctx.send(get_request("/inbox/", Some(alice.as_str()))).await?;
    let newest = &inbox.as_array().unwrap()[0];
    assert_eq!(newest["content"], "Second");
    let uri = format!("/messages/{}/", newest["id"]);

    let (status, _) = ctx
        .send(json_request(Method::PATCH, &uri, Some(bob.as_str()), json!({ "is_read": true })))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = ctx
        .send(json_request(Method::PATCH, &uri, Some(alice.as_str()), json!({ "is_read": true })))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["is_read"], true);

    let (_, unread) = ctx
        .send(get_request("/inbox/?unread=true", Some(alice.as_str())))
        .await?;
    let unread = unread.as_array().unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0]["content"], "First");

    Ok(())
}

#[tokio::test]
async fn only_the_owner_can_delete_a_listing() -> TestResult {
    let ctx = TestContext::new().await?;
    let alice = ctx.register("alice").await?;
    let bob = ctx.register("bob").await?;

    let listing = ctx
        .create_listing(&alice, json!({ "title": "Hoodie", "condition": "good" }))
        .await?;
    let uri = format!("/listings/{}/", listing["id"]);

    let delete = |token: &str| {
        Request::builder()
            .method(Method::DELETE)
            .uri(&uri)
            .header(AUTHORIZATION, format!("Token {token}"))
            .body(Body::empty())
            .expect("request should build")
    };

    let (status, _) = ctx.send(delete(bob.as_str())).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx.send(delete(alice.as_str())).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = ctx.send(get_request(&uri, Some(alice.as_str()))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() -> TestResult {
    let ctx = TestContext::new().await?;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/listings/")
        .header(ORIGIN, "http://localhost:3000")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(Body::empty())?;

    let response = ctx.router().oneshot(request).await?;
    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );

    Ok(())
}
