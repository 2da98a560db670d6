//! Integration tests for the player-facing routes

mod harness;

use axum::http::{Method, StatusCode};
use harness::{build_test_app, call, photo, register, send, upload};
use serde_json::json;

#[tokio::test]
async fn root_and_health_respond() {
    let app = build_test_app();

    let banner = call(&app, Method::GET, "/api/", None, None, StatusCode::OK).await;
    assert!(banner["message"].as_str().unwrap().contains("Fantamatto"));

    let health = call(&app, Method::GET, "/api/health", None, None, StatusCode::OK).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["storage_healthy"], true);
}

#[tokio::test]
async fn register_then_login() {
    let app = build_test_app();
    let ana = register(&app, "ana", "pescatrice").await;
    assert_eq!(ana["username"], "ana");
    assert_eq!(ana["total_points"], 0);
    assert!(ana.get("password").is_none());
    assert!(ana.get("password_hash").is_none());

    let logged_in = call(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "ana", "password": "pescatrice" })),
        StatusCode::OK,
    )
    .await;
    assert_eq!(logged_in["id"], ana["id"]);

    let wrong = call(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "ana", "password": "nope-nope" })),
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(wrong["error"], "Wrong password");

    call(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "ghost", "password": "whatever" })),
        StatusCode::UNAUTHORIZED,
    )
    .await;
}

#[tokio::test]
async fn passwordless_registration_cannot_log_in() {
    let app = build_test_app();
    call(
        &app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "username": "walkin" })),
        StatusCode::CREATED,
    )
    .await;

    let json = call(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "username": "walkin", "password": "anything" })),
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(json["error"], "No password set for this account");
}

#[tokio::test]
async fn registration_rejects_duplicates_and_bad_input() {
    let app = build_test_app();
    register(&app, "ana", "pescatrice").await;

    call(
        &app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "username": "ana", "password": "another" })),
        StatusCode::CONFLICT,
    )
    .await;
    call(
        &app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "username": "no spaces allowed", "password": "another" })),
        StatusCode::BAD_REQUEST,
    )
    .await;

    let response = send(
        &app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "name": "wrong shape" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn epic_upload_credits_fifty_points_and_leads_gallery() {
    let app = build_test_app();
    let ana = register(&app, "ana", "pescatrice").await;
    let before = ana["total_points"].as_i64().unwrap();

    let matto = upload(&app, &ana, "Il Capitano", "epic").await;
    assert_eq!(matto["points"], 50);
    assert_eq!(matto["rarity"], "epic");

    let uri = format!("/api/users/{}", ana["id"].as_str().unwrap());
    let refreshed = call(&app, Method::GET, &uri, None, None, StatusCode::OK).await;
    assert_eq!(refreshed["total_points"].as_i64().unwrap(), before + 50);

    let gallery = call(&app, Method::GET, "/api/matti", None, None, StatusCode::OK).await;
    assert_eq!(gallery[0]["username"], "ana");
    assert_eq!(gallery[0]["nickname"], "Il Capitano");
}

#[tokio::test]
async fn every_tier_credits_its_fixed_value() {
    let app = build_test_app();
    let ana = register(&app, "ana", "pescatrice").await;

    for (tier, expected) in [("common", 10), ("rare", 25), ("epic", 50), ("legendary", 100)] {
        let matto = upload(&app, &ana, "Tizio", tier).await;
        assert_eq!(matto["points"], expected, "tier {}", tier);
    }

    let uri = format!("/api/users/{}", ana["id"].as_str().unwrap());
    let refreshed = call(&app, Method::GET, &uri, None, None, StatusCode::OK).await;
    assert_eq!(refreshed["total_points"], 185);
}

#[tokio::test]
async fn upload_validation() {
    let app = build_test_app();
    let ana = register(&app, "ana", "pescatrice").await;
    let base = json!({
        "user_id": ana["id"],
        "username": "ana",
        "photo_data": photo(),
        "nickname": "Il Capitano",
        "description": "",
        "rarity": "rare",
    });

    let mut unknown_tier = base.clone();
    unknown_tier["rarity"] = json!("mythic");
    call(&app, Method::POST, "/api/matti", None, Some(unknown_tier), StatusCode::BAD_REQUEST).await;

    let mut blank_nickname = base.clone();
    blank_nickname["nickname"] = json!("   ");
    call(&app, Method::POST, "/api/matti", None, Some(blank_nickname), StatusCode::BAD_REQUEST).await;

    let mut not_a_photo = base.clone();
    not_a_photo["photo_data"] = json!("https://example.com/x.png");
    call(&app, Method::POST, "/api/matti", None, Some(not_a_photo), StatusCode::BAD_REQUEST).await;

    let mut stranger = base.clone();
    stranger["user_id"] = json!(uuid::Uuid::new_v4());
    call(&app, Method::POST, "/api/matti", None, Some(stranger), StatusCode::NOT_FOUND).await;

    let gallery = call(&app, Method::GET, "/api/matti", None, None, StatusCode::OK).await;
    assert_eq!(gallery.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn leaderboard_is_sorted_by_points() {
    let app = build_test_app();
    let ana = register(&app, "ana", "pescatrice").await;
    let bob = register(&app, "bob", "pescatore").await;
    register(&app, "cleo", "pescatora").await;

    upload(&app, &bob, "Lo Zio", "legendary").await;
    upload(&app, &ana, "La Zia", "rare").await;

    let board = call(&app, Method::GET, "/api/leaderboard", None, None, StatusCode::OK).await;
    let names: Vec<&str> = board
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["bob", "ana", "cleo"]);

    let user_matti = call(
        &app,
        Method::GET,
        &format!("/api/matti/user/{}", bob["id"].as_str().unwrap()),
        None,
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(user_matti.as_array().unwrap().len(), 1);
    assert_eq!(user_matti[0]["nickname"], "Lo Zio");
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = build_test_app();
    let uri = format!("/api/users/{}", uuid::Uuid::new_v4());
    call(&app, Method::GET, &uri, None, None, StatusCode::NOT_FOUND).await;
}
