use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::AuthSettings;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::app(engine, AuthSettings::new("integration-secret"))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send_raw(app, method, uri, token, body.map(|b| b.to_string())).await
}

/// Like [`send`], with the body passed through as is.
async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Signs a user up and returns its access token.
async fn signup(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": email,
            "password": "correct horse",
            "password_confirm": "correct horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["tokens"]["access"].as_str().unwrap().to_string()
}

async fn new_trip(app: &Router, token: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/trips",
        Some(token),
        Some(json!({
            "name": "Japan",
            "start_date": "2024-01-01",
            "end_date": "2024-01-05",
            "currency": "USD",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/trips", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));

    let (status, _) = send(&app, Method::GET, "/trips", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_and_refresh() {
    let app = test_app().await;
    signup(&app, "ada@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "ada@example.com", "password": "wrong password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "ada@example.com", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let refresh = body["tokens"]["refresh"].as_str().unwrap().to_string();

    // A refresh token does not open protected routes.
    let (status, _) = send(&app, Method::GET, "/auth/me", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/token/refresh",
        None,
        Some(json!({"refresh": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = body["access"].as_str().unwrap();

    let (status, body) = send(&app, Method::GET, "/auth/me", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], json!("ada@example.com"));
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let app = test_app().await;
    signup(&app, "ada@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({
            "first_name": "Ada",
            "last_name": "Again",
            "email": "ada@example.com",
            "password": "correct horse",
            "password_confirm": "correct horse",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn budget_is_aggregated_over_http() {
    let app = test_app().await;
    let token = signup(&app, "ada@example.com").await;
    let trip_id = new_trip(&app, &token).await;

    let (status, stop) = send(
        &app,
        Method::POST,
        &format!("/trips/{trip_id}/stops"),
        Some(&token),
        Some(json!({
            "city_name": "Tokyo",
            "country": "Japan",
            "start_date": "2024-01-01",
            "end_date": "2024-01-03",
            "accommodation_cost_minor": 200,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{stop}");
    let stop_id = stop["id"].as_str().unwrap();

    let (status, activity) = send(
        &app,
        Method::POST,
        &format!("/stops/{stop_id}/activities"),
        Some(&token),
        Some(json!({"name": "Senso-ji", "cost_minor": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{activity}");
    let activity_id = activity["id"].as_str().unwrap();

    let (status, budget) = send(
        &app,
        Method::GET,
        &format!("/trips/{trip_id}/budget"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(budget["stay_cost_minor"], json!(200));
    assert_eq!(budget["activity_cost_minor"], json!(50));
    assert_eq!(budget["total_cost_minor"], json!(250));

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/activities/{activity_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (_, budget) = send(
        &app,
        Method::GET,
        &format!("/trips/{trip_id}/budget"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(budget["activity_cost_minor"], json!(0));

    // Stale version.
    let version = budget["version"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/trips/{trip_id}/budget"),
        Some(&token),
        Some(json!({"meal_cost_minor": 100, "version": version - 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn validation_errors_name_the_field() {
    let app = test_app().await;
    let token = signup(&app, "ada@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/trips",
        Some(&token),
        Some(json!({
            "name": "Backwards",
            "start_date": "2024-01-05",
            "end_date": "2024-01-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], json!("end_date"));
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let app = test_app().await;
    let token = signup(&app, "ada@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/trips",
        Some(&token),
        Some(json!({"start_date": "2024-01-01", "end_date": "2024-01-05"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["field"], json!("name"));

    let (status, body) = send_raw(
        &app,
        Method::POST,
        "/trips",
        Some(&token),
        Some("{not json".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let (status, body) = send(&app, Method::GET, "/trips/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    let (status, body) = send(&app, Method::GET, "/community?page=two", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn other_users_get_not_found() {
    let app = test_app().await;
    let ada = signup(&app, "ada@example.com").await;
    let bob = signup(&app, "bob@example.com").await;
    let trip_id = new_trip(&app, &ada).await;

    for method in [Method::GET, Method::DELETE] {
        let (status, _) = send(&app, method, &format!("/trips/{trip_id}"), Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/trips/{trip_id}"),
        Some(&bob),
        Some(json!({"name": "Mine now"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_link_counts_views_without_auth() {
    let app = test_app().await;
    let token = signup(&app, "ada@example.com").await;
    let trip_id = new_trip(&app, &token).await;

    let (status, share) = send(
        &app,
        Method::POST,
        &format!("/trips/{trip_id}/share"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{share}");
    let url = share["public_url"].as_str().unwrap().to_string();

    let (status, first) = send(&app, Method::GET, &url, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["view_count"], json!(1));
    let (_, second) = send(&app, Method::GET, &url, None, None).await;
    assert_eq!(second["view_count"], json!(2));

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/trips/{trip_id}/share"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &url, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_routes_do_not_need_a_token() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/activities/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 16);

    let (status, body) = send(&app, Method::GET, "/search/cities?query=rome", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn community_board_round_trip() {
    let app = test_app().await;
    let ada = signup(&app, "ada@example.com").await;
    let bob = signup(&app, "bob@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/community",
        None,
        Some(json!({"title": "Hi", "content": "There"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, post) = send(
        &app,
        Method::POST,
        "/community",
        Some(&ada),
        Some(json!({
            "title": "Night trains",
            "content": "Sleeper from Vienna to Rome.",
            "category": "tips",
            "tags": ["Rail", "rail"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{post}");
    assert_eq!(post["tags"], json!(["rail"]));
    let post_url = format!("/community/posts/{}", post["id"].as_str().unwrap());

    let (status, liked) = send(&app, Method::POST, &format!("{post_url}/like"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liked["liked"], json!(true));

    let (status, added) = send(
        &app,
        Method::POST,
        &format!("{post_url}/comments"),
        Some(&bob),
        Some(json!({"content": "Booked it!"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["comment_count"], json!(1));

    let (status, page) = send(&app, Method::GET, "/community?category=tips", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total_posts"], json!(1));
    assert_eq!(page["posts"][0]["like_count"], json!(1));

    let (status, shown) = send(&app, Method::GET, &post_url, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["view_count"], json!(1));
    assert_eq!(shown["comments"][0]["content"], json!("Booked it!"));

    let (status, body) = send(
        &app,
        Method::PUT,
        &post_url,
        Some(&bob),
        Some(json!({"title": "Hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], json!(false));

    let (status, _) = send(&app, Method::DELETE, &post_url, Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &post_url, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_trip_listing_needs_no_token() {
    let app = test_app().await;
    let token = signup(&app, "ada@example.com").await;
    let trip_id = new_trip(&app, &token).await;

    let (status, body) = send(&app, Method::GET, "/trips/public", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/trips/{trip_id}"),
        Some(&token),
        Some(json!({"is_public": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/trips/public", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], json!(trip_id));
    assert_eq!(body[0]["stop_count"], json!(0));
}
