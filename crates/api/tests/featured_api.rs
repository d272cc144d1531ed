//! HTTP-level integration tests for the featured list and pin management.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_test_app, build_test_app_with, get, get_auth, post_auth,
    put_json_auth, set_status, student_token, submit, test_config, test_db,
};
use serde_json::json;
use showcase_core::featured::PinPolicy;

fn featured_ids(json: &serde_json::Value) -> Vec<i64> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

async fn like(app: axum::Router, id: i64, users: &[&str]) {
    for user in users {
        let response = post_auth(
            app.clone(),
            &format!("/api/v1/projects/{id}/like"),
            &student_token(user),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn single_published_project_fills_one_slot() {
    let app = build_test_app(test_db().await);
    let id = submit(app.clone(), "ana", "Robot Arm").await;
    set_status(app.clone(), id, "Published").await;

    let json = body_json(get(app, "/api/v1/featured?k=3").await).await;
    assert_eq!(featured_ids(&json), vec![id]);
    assert_eq!(json["data"][0]["source"], "fallback");
}

#[tokio::test]
async fn pins_come_before_popularity() {
    let app = build_test_app(test_db().await);
    let x = submit(app.clone(), "ana", "X").await;
    let y = submit(app.clone(), "ana", "Y").await;
    set_status(app.clone(), x, "Published").await;
    set_status(app.clone(), y, "Published").await;
    like(app.clone(), x, &["u1", "u2", "u3"]).await;
    like(app.clone(), y, &["u1"]).await;

    let pinned = put_json_auth(
        app.clone(),
        "/api/v1/admin/featured-pins",
        &admin_token(),
        json!({ "pins": [y] }),
    )
    .await;
    assert_eq!(pinned.status(), StatusCode::OK);

    let json = body_json(get(app, "/api/v1/featured?k=2").await).await;
    assert_eq!(featured_ids(&json), vec![y, x]);
    assert_eq!(json["data"][0]["source"], "pinned");
    assert_eq!(json["data"][1]["source"], "popular");
    assert_eq!(json["data"][1]["likes"], 3);
}

#[tokio::test]
async fn unpublished_projects_are_not_in_the_pool() {
    let app = build_test_app(test_db().await);
    let draft = submit(app.clone(), "ana", "Draft").await;
    let live = submit(app.clone(), "ana", "Live").await;
    set_status(app.clone(), live, "Published").await;
    set_status(app.clone(), draft, "InProgress").await;

    let json = body_json(get(app, "/api/v1/featured").await).await;
    assert_eq!(featured_ids(&json), vec![live]);
}

#[tokio::test]
async fn pin_policy_decides_on_unpublished_pins() {
    let db = test_db().await;
    let keep = build_test_app(db.clone());
    let live = submit(keep.clone(), "ana", "Live").await;
    let pending = submit(keep.clone(), "ana", "Pending").await;
    set_status(keep.clone(), live, "Published").await;
    put_json_auth(
        keep.clone(),
        "/api/v1/admin/featured-pins",
        &admin_token(),
        json!({ "pins": [pending] }),
    )
    .await;

    let json = body_json(get_auth(keep.clone(), "/api/v1/featured", &admin_token()).await).await;
    assert_eq!(featured_ids(&json), vec![pending, live]);

    let json = body_json(get_auth(keep, "/api/v1/featured", &student_token("ana")).await).await;
    assert_eq!(featured_ids(&json), vec![pending, live]);

    let mut config = test_config();
    config.pin_policy = PinPolicy::Drop;
    let drop = build_test_app_with(db, config);
    let json = body_json(get_auth(drop, "/api/v1/featured", &admin_token()).await).await;
    assert_eq!(featured_ids(&json), vec![live]);
}

#[tokio::test]
async fn pinned_in_review_project_stays_hidden_from_other_viewers() {
    let app = build_test_app(test_db().await);
    let secret = submit(app.clone(), "ana", "Secret Draft").await;
    put_json_auth(
        app.clone(),
        "/api/v1/admin/featured-pins",
        &admin_token(),
        json!({ "pins": [secret] }),
    )
    .await;

    let direct = get(app.clone(), &format!("/api/v1/projects/{secret}")).await;
    assert_eq!(direct.status(), StatusCode::NOT_FOUND);

    let anonymous = body_json(get(app.clone(), "/api/v1/featured").await).await;
    assert!(featured_ids(&anonymous).is_empty());

    let other = body_json(get_auth(app, "/api/v1/featured", &student_token("bruno")).await).await;
    assert!(featured_ids(&other).is_empty());
}

#[tokio::test]
async fn featured_count_never_repeats_ids() {
    let app = build_test_app(test_db().await);
    let mut ids = Vec::new();
    for n in 0..4 {
        let id = submit(app.clone(), "ana", &format!("P{n}")).await;
        set_status(app.clone(), id, "Published").await;
        ids.push(id);
    }
    like(app.clone(), ids[2], &["u1"]).await;
    put_json_auth(
        app.clone(),
        "/api/v1/admin/featured-pins",
        &admin_token(),
        json!({ "pins": [ids[2], ids[2]] }),
    )
    .await;

    let json = body_json(get(app.clone(), "/api/v1/featured?k=10").await).await;
    assert_eq!(featured_ids(&json), vec![ids[2], ids[0], ids[1], ids[3]]);

    let json = body_json(get(app, "/api/v1/featured?k=0").await).await;
    assert_eq!(featured_ids(&json).len(), 1);
}

#[tokio::test]
async fn replacing_pins_with_unknown_ids_is_rejected() {
    let app = build_test_app(test_db().await);
    let id = submit(app.clone(), "ana", "Robot Arm").await;

    let response = put_json_auth(
        app.clone(),
        "/api/v1/admin/featured-pins",
        &admin_token(),
        json!({ "pins": [id, 999] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let pins = body_json(get_auth(app, "/api/v1/admin/featured-pins", &admin_token()).await).await;
    assert_eq!(pins["data"], json!([]));
}

#[tokio::test]
async fn pin_management_is_admin_only() {
    let app = build_test_app(test_db().await);

    let read = get_auth(
        app.clone(),
        "/api/v1/admin/featured-pins",
        &student_token("ana"),
    )
    .await;
    assert_eq!(read.status(), StatusCode::FORBIDDEN);

    let write = put_json_auth(
        app,
        "/api/v1/admin/featured-pins",
        &student_token("ana"),
        json!({ "pins": [] }),
    )
    .await;
    assert_eq!(write.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_a_pinned_project_removes_the_pin() {
    let app = build_test_app(test_db().await);
    let id = submit(app.clone(), "ana", "Robot Arm").await;
    put_json_auth(
        app.clone(),
        "/api/v1/admin/featured-pins",
        &admin_token(),
        json!({ "pins": [id] }),
    )
    .await;

    common::delete_auth(app.clone(), &format!("/api/v1/projects/{id}"), &admin_token()).await;

    let pins = body_json(get_auth(app, "/api/v1/admin/featured-pins", &admin_token()).await).await;
    assert_eq!(pins["data"], json!([]));
}
