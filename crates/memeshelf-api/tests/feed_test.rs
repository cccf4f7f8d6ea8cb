mod helpers;

use axum::http::StatusCode;
use helpers::{
    api_path, media_id, setup_test_app, setup_test_app_with_page_size, upload_png, AsCaller,
};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn feed_lists_newest_first_and_filters_by_tag() {
    let app = setup_test_app().await;
    let alice = Uuid::new_v4();
    let cat = upload_png(&app, alice, "Funny Cats").await;
    let dog = upload_png(&app, alice, "dogs").await;

    let response = app
        .client()
        .get(&api_path("/feed"))
        .as_user(Uuid::new_v4())
        .await;
    response.assert_status_ok();
    let page: serde_json::Value = response.json();
    assert_eq!(page["total"], json!(2));
    assert_eq!(page["items"][0]["id"], dog["id"]);
    assert_eq!(page["items"][1]["id"], cat["id"]);
    assert_eq!(page["items"][0]["comment_count"], json!(0));

    let response = app
        .client()
        .get(&api_path("/feed"))
        .add_query_param("tag", "funny-cats")
        .as_user(alice)
        .await;
    let page: serde_json::Value = response.json();
    assert_eq!(page["total"], json!(1));
    assert_eq!(page["current_tag"]["name"], json!("Funny Cats"));
}

#[tokio::test]
async fn unknown_tag_is_empty_feed_but_missing_random_feed() {
    let app = setup_test_app().await;
    let alice = Uuid::new_v4();
    upload_png(&app, alice, "cats").await;

    let response = app
        .client()
        .get(&api_path("/feed"))
        .add_query_param("tag", "nope")
        .as_user(alice)
        .await;
    response.assert_status_ok();
    let page: serde_json::Value = response.json();
    assert_eq!(page["items"], json!([]));
    assert_eq!(page["num_pages"], json!(1));
    assert!(page["current_tag"].is_null());

    app.client()
        .get(&api_path("/feed/random"))
        .add_query_param("tag", "nope")
        .as_user(alice)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = app
        .client()
        .get(&api_path("/feed/random"))
        .add_query_param("tag", "cats")
        .as_user(alice)
        .await;
    response.assert_status_ok();
    let page: serde_json::Value = response.json();
    assert_eq!(page["total"], json!(1));
}

#[tokio::test]
async fn page_numbers_clamp() {
    let app = setup_test_app_with_page_size(2).await;
    let alice = Uuid::new_v4();
    for _ in 0..3 {
        upload_png(&app, alice, "").await;
    }

    let page: serde_json::Value = app
        .client()
        .get(&api_path("/feed"))
        .add_query_param("page", "99")
        .as_user(alice)
        .await
        .json();
    assert_eq!(page["page"], json!(2));
    assert_eq!(page["has_next"], json!(false));

    let page: serde_json::Value = app
        .client()
        .get(&api_path("/feed"))
        .add_query_param("page", "first")
        .as_user(alice)
        .await
        .json();
    assert_eq!(page["page"], json!(1));
    assert_eq!(page["next_page_number"], json!(2));
}

#[tokio::test]
async fn tag_resolution_is_case_insensitive_and_suggestions_count_usage() {
    let app = setup_test_app().await;
    let alice = Uuid::new_v4();

    let response = app
        .client()
        .get(&api_path("/tags/resolve"))
        .add_query_param("q", "Cats, dank, cats")
        .as_user(alice)
        .await;
    response.assert_status_ok();
    let tags: serde_json::Value = response.json();
    assert_eq!(tags.as_array().map(Vec::len), Some(2));
    assert_eq!(tags[0]["slug"], json!("cats"));

    let media = upload_png(&app, alice, "CATS").await;
    assert_eq!(media["tags"][0]["id"], tags[0]["id"]);

    let response = app
        .client()
        .get(&api_path("/tags/suggestions"))
        .add_query_param("q", "ca")
        .as_user(alice)
        .await;
    response.assert_status_ok();
    let suggestions: serde_json::Value = response.json();
    assert_eq!(suggestions[0]["name"], json!("Cats"));
    assert_eq!(suggestions[0]["count"], json!(1));
    assert_eq!(suggestions.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn overlong_tag_text_is_bad_request() {
    let app = setup_test_app().await;

    app.client()
        .get(&api_path("/tags/resolve"))
        .add_query_param("q", "x".repeat(51))
        .as_user(Uuid::new_v4())
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn deleted_media_leaves_the_feed() {
    let app = setup_test_app().await;
    let alice = Uuid::new_v4();
    let media = upload_png(&app, alice, "").await;

    app.client()
        .delete(&api_path(&format!("/media/{}", media_id(&media))))
        .as_user(alice)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let page: serde_json::Value = app
        .client()
        .get(&api_path("/feed"))
        .as_user(alice)
        .await
        .json();
    assert_eq!(page["total"], json!(0));
}
