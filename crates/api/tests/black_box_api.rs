use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use coffeeshop_api::app::{AppState, build_app};
use coffeeshop_auth::{JwkSet, JwksVerifier};
use coffeeshop_infra::{DrinkRepository, SqliteDrinkRepository};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

const AUDIENCE: &str = "CoffeeShop";
const ISSUER: &str = "https://coffee.test/";
const KID: &str = "test-key-1";
const SIGNING_KEY: &[u8] = include_bytes!("../../auth/tests/fixtures/test_rsa.pem");
const JWKS: &str = include_str!("../../auth/tests/fixtures/test_jwks.json");

const MANAGER: &[&str] = &["get:drinks-detail", "post:drinks", "patch:drinks", "delete:drinks"];
const BARISTA: &[&str] = &["get:drinks-detail"];

struct TestServer {
    base_url: String,
    drinks: Arc<dyn DrinkRepository>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let drinks: Arc<dyn DrinkRepository> = Arc::new(
            SqliteDrinkRepository::connect("sqlite::memory:")
                .await
                .expect("failed to open in-memory database"),
        );
        let keys: JwkSet = serde_json::from_str(JWKS).expect("fixture JWKS");
        let verifier = Arc::new(JwksVerifier::new(&keys, AUDIENCE, ISSUER));

        // Same router as prod, bound to an ephemeral port.
        let app = build_app(AppState::new(drinks.clone(), verifier));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            drinks,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt_with(claims: Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KID.to_string());
    jsonwebtoken::encode(
        &header,
        &claims,
        &EncodingKey::from_rsa_pem(SIGNING_KEY).expect("fixture key"),
    )
    .expect("failed to encode jwt")
}

fn claims(permissions: &[&str]) -> Value {
    let now = Utc::now();
    json!({
        "sub": "auth0|tester",
        "iss": ISSUER,
        "aud": AUDIENCE,
        "iat": now.timestamp(),
        "exp": (now + ChronoDuration::minutes(10)).timestamp(),
        "permissions": permissions,
    })
}

fn mint_jwt(permissions: &[&str]) -> String {
    mint_jwt_with(claims(permissions))
}

fn water() -> Value {
    json!({
        "title": "Water",
        "recipe": [{"color": "blue", "name": "water", "parts": 1}]
    })
}

async fn create(client: &reqwest::Client, srv: &TestServer, body: &Value) -> Value {
    let res = client
        .post(srv.url("/drinks"))
        .bearer_auth(mint_jwt(MANAGER))
        .json(body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn public_listing_of_empty_store() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/drinks")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "drinks": []}));
}

#[tokio::test]
async fn create_then_list_short_and_long_views() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, &water()).await;
    assert_eq!(created["success"], true);
    let drinks = created["drinks"].as_array().unwrap();
    assert_eq!(drinks.len(), 1);
    assert_eq!(drinks[0]["title"], "Water");
    assert_eq!(drinks[0]["recipe"].as_array().unwrap().len(), 1);
    assert_eq!(drinks[0]["recipe"][0]["name"], "water");

    let short: Value = reqwest::get(srv.url("/drinks")).await.unwrap().json().await.unwrap();
    assert_eq!(
        short["drinks"][0]["recipe"],
        json!([{"color": "blue", "parts": 1}])
    );

    let res = client
        .get(srv.url("/drinks-detail"))
        .bearer_auth(mint_jwt(BARISTA))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let long: Value = res.json().await.unwrap();
    assert_eq!(long["success"], true);
    assert_eq!(long["drinks"][0]["recipe"][0]["name"], "water");
    assert_eq!(long["drinks"][0]["id"], drinks[0]["id"]);
}

#[tokio::test]
async fn create_requires_post_permission() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/drinks"))
        .bearer_auth(mint_jwt(BARISTA))
        .json(&water())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"success": false, "error": 403, "message": "Permission not found."}));

    assert!(srv.drinks.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_headers_are_unauthorized_on_every_protected_route() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(MANAGER);

    let headers = [
        None,
        Some(String::new()),
        Some(token.clone()),
        Some(format!("Basic {token}")),
        Some("Bearer".to_string()),
        Some(format!("Bearer {token} extra")),
    ];

    for header in &headers {
        let requests = [
            client.get(srv.url("/drinks-detail")),
            client.post(srv.url("/drinks")).json(&water()),
            client.patch(srv.url("/drinks/1")).json(&json!({"title": "x"})),
            client.delete(srv.url("/drinks/1")),
        ];
        for req in requests {
            let req = match header {
                Some(value) => req.header("Authorization", value),
                None => req,
            };
            let res = req.send().await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "header {header:?}");
            let body: Value = res.json().await.unwrap();
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], 401);
        }
    }
}

#[tokio::test]
async fn token_problems_map_to_auth_statuses() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut expired = claims(MANAGER);
    expired["exp"] = json!((Utc::now() - ChronoDuration::hours(1)).timestamp());

    let mut wrong_audience = claims(MANAGER);
    wrong_audience["aud"] = json!("SomeoneElse");

    let mut no_permissions = claims(MANAGER);
    no_permissions.as_object_mut().unwrap().remove("permissions");

    let cases = [
        (mint_jwt_with(expired), StatusCode::UNAUTHORIZED, "Token expired."),
        (
            mint_jwt_with(wrong_audience),
            StatusCode::UNAUTHORIZED,
            "Incorrect claims. Please, check the audience and issuer.",
        ),
        (
            mint_jwt_with(no_permissions),
            StatusCode::BAD_REQUEST,
            "Permissions not included in JWT.",
        ),
        (
            "garbage".to_string(),
            StatusCode::BAD_REQUEST,
            "Unable to parse authentication token.",
        ),
    ];

    for (token, status, message) in cases {
        let res = client
            .get(srv.url("/drinks-detail"))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), status);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["message"], message);
    }
}

#[tokio::test]
async fn unknown_signing_key_is_unauthorized() {
    let srv = TestServer::spawn().await;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some("rotated-away".to_string());
    let token = jsonwebtoken::encode(
        &header,
        &claims(MANAGER),
        &EncodingKey::from_rsa_pem(SIGNING_KEY).unwrap(),
    )
    .unwrap();

    let res = reqwest::Client::new()
        .get(srv.url("/drinks-detail"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_bodies_are_bad_requests() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(MANAGER);

    let bodies = [
        json!({"title": "Water"}),
        json!({"title": "Water", "recipe": [], "price": 2}),
        json!({"title": "   ", "recipe": []}),
        json!({"title": "Water", "recipe": [{"color": "blue", "parts": -1, "name": "w"}]}),
    ];
    for body in &bodies {
        let res = client
            .post(srv.url("/drinks"))
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "body {body}");
        let envelope: Value = res.json().await.unwrap();
        assert_eq!(envelope["error"], 400);
    }

    let res = client
        .post(srv.url("/drinks"))
        .bearer_auth(&token)
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_title_is_unprocessable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create(&client, &srv, &water()).await;
    let res = client
        .post(srv.url("/drinks"))
        .bearer_auth(mint_jwt(MANAGER))
        .json(&water())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"success": false, "error": 422, "message": "unprocessable"}));
}

#[tokio::test]
async fn patch_updates_present_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, &water()).await;
    let id = created["drinks"][0]["id"].as_i64().unwrap();

    let res = client
        .patch(srv.url(&format!("/drinks/{id}")))
        .bearer_auth(mint_jwt(&["patch:drinks"]))
        .json(&json!({"title": "Sparkling Water"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["drinks"].as_array().unwrap().len(), 1);
    assert_eq!(body["drinks"][0]["title"], "Sparkling Water");
    assert_eq!(body["drinks"][0]["recipe"][0]["name"], "water");

    let res = client
        .patch(srv.url(&format!("/drinks/{id}")))
        .bearer_auth(mint_jwt(&["patch:drinks"]))
        .json(&json!({"recipe": [{"color": "green", "name": "lime", "parts": 2}]}))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["drinks"][0]["title"], "Sparkling Water");
    assert_eq!(body["drinks"][0]["recipe"][0]["name"], "lime");
}

#[tokio::test]
async fn patch_unknown_id_is_not_found_regardless_of_body() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let token = mint_jwt(&["patch:drinks"]);

    for body in [json!({"title": "Anything"}), json!({"bogus": true}), json!([])] {
        let res = client
            .patch(srv.url("/drinks/9999"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let envelope: Value = res.json().await.unwrap();
        assert_eq!(
            envelope,
            json!({"success": false, "error": 404, "message": "resource not found"})
        );
    }

    let res = client
        .patch(srv.url("/drinks/not-a-number"))
        .bearer_auth(&token)
        .json(&json!({"title": "Anything"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_into_existing_title_is_unprocessable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create(&client, &srv, &water()).await;
    let tea = create(
        &client,
        &srv,
        &json!({"title": "Tea", "recipe": [{"color": "brown", "name": "tea", "parts": 1}]}),
    )
    .await;
    let tea_id = tea["drinks"][0]["id"].as_i64().unwrap();

    let res = client
        .patch(srv.url(&format!("/drinks/{tea_id}")))
        .bearer_auth(mint_jwt(MANAGER))
        .json(&json!({"title": "Water"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn delete_twice_is_not_found_the_second_time() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, &water()).await;
    let id = created["drinks"][0]["id"].as_i64().unwrap();
    let token = mint_jwt(&["delete:drinks"]);

    let res = client
        .delete(srv.url(&format!("/drinks/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "delete": id}));

    let res = client
        .delete(srv.url(&format!("/drinks/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_requires_delete_permission() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, &water()).await;
    let id = created["drinks"][0]["id"].as_i64().unwrap();

    for granted in [&["post:drinks"][..], &["patch:drinks"][..]] {
        let res = client
            .delete(srv.url(&format!("/drinks/{id}")))
            .bearer_auth(mint_jwt(granted))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
    assert_eq!(srv.drinks.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn public_listing_failure_is_unprocessable() {
    let sqlite = SqliteDrinkRepository::connect("sqlite::memory:")
        .await
        .unwrap();
    // A recipe column that is not a JSON array cannot be listed.
    sqlx::query("INSERT INTO drinks (title, recipe) VALUES ('Broken', 'not json')")
        .execute(sqlite.pool())
        .await
        .unwrap();

    let keys: JwkSet = serde_json::from_str(JWKS).unwrap();
    let app = build_app(AppState::new(
        Arc::new(sqlite),
        Arc::new(JwksVerifier::new(&keys, AUDIENCE, ISSUER)),
    ));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let res = reqwest::get(format!("http://{addr}/drinks")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"success": false, "error": 422, "message": "unprocessable"}));

    // The guarded listing reports the same fault as a server error.
    let res = reqwest::Client::new()
        .get(format!("http://{addr}/drinks-detail"))
        .bearer_auth(mint_jwt(BARISTA))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    handle.abort();
}

#[tokio::test]
async fn unknown_routes_use_the_error_envelope() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/coffee")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], 404);

    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let srv = TestServer::spawn().await;

    let res = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, srv.url("/drinks"))
        .header("Origin", "http://localhost:8100")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .send()
        .await
        .unwrap();

    assert!(res.status().is_success());
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    for m in ["GET", "PUT", "POST", "DELETE", "OPTIONS"] {
        assert!(methods.contains(m), "missing {m} in {methods}");
    }
    let allowed = headers["access-control-allow-headers"].to_str().unwrap().to_lowercase();
    assert!(allowed.contains("authorization"));
    assert!(allowed.contains("content-type"));
}
