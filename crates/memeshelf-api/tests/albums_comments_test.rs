mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::{api_path, media_id, png_form, setup_test_app, upload_png, AsCaller, TestApp};
use serde_json::json;
use uuid::Uuid;

async fn create_album(app: &TestApp, owner: Uuid, is_private: bool) -> serde_json::Value {
    let response = app
        .client()
        .post(&api_path("/albums"))
        .as_user(owner)
        .json(&json!({ "title": " Reaction pics ", "is_private": is_private }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn albums_are_listed_for_their_owner_only() {
    let app = setup_test_app().await;
    let alice = Uuid::new_v4();
    let album = create_album(&app, alice, false).await;
    assert_eq!(album["title"], json!("Reaction pics"));

    let mine: serde_json::Value = app
        .client()
        .get(&api_path("/albums"))
        .as_user(alice)
        .await
        .json();
    assert_eq!(mine.as_array().map(Vec::len), Some(1));

    let theirs: serde_json::Value = app
        .client()
        .get(&api_path("/albums"))
        .as_user(Uuid::new_v4())
        .await
        .json();
    assert_eq!(theirs, json!([]));
}

#[tokio::test]
async fn blank_album_title_is_bad_request() {
    let app = setup_test_app().await;

    app.client()
        .post(&api_path("/albums"))
        .as_user(Uuid::new_v4())
        .json(&json!({ "title": "   " }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn uploading_into_someone_elses_album_is_rejected() {
    let app = setup_test_app().await;
    let alice = Uuid::new_v4();
    let album = create_album(&app, alice, false).await;
    let album_id = album["id"].as_str().unwrap().to_string();

    let response = app
        .client()
        .post(&api_path("/media"))
        .as_user(Uuid::new_v4())
        .multipart(png_form("a.png").add_text("album_id", album_id))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], json!("Select a valid album"));
}

#[tokio::test]
async fn forged_file_is_reported_before_a_foreign_album() {
    let app = setup_test_app().await;
    let alice = Uuid::new_v4();
    let album = create_album(&app, alice, false).await;
    let album_id = album["id"].as_str().unwrap().to_string();

    let response = app
        .client()
        .post(&api_path("/media"))
        .as_user(Uuid::new_v4())
        .multipart(
            MultipartForm::new()
                .add_part(
                    "file",
                    Part::bytes(b"GIF89a definitely a png".to_vec())
                        .file_name("fake.png")
                        .mime_type("image/png"),
                )
                .add_text("album_id", album_id),
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], json!("SIGNATURE_MISMATCH"));
    assert_eq!(body["field"], json!("file"));
}

#[tokio::test]
async fn private_album_media_is_hidden_from_strangers() {
    let app = setup_test_app().await;
    let alice = Uuid::new_v4();
    let album = create_album(&app, alice, true).await;
    let album_id = album["id"].as_str().unwrap().to_string();

    let response = app
        .client()
        .post(&api_path("/media"))
        .as_user(alice)
        .multipart(png_form("a.png").add_text("album_id", album_id))
        .await;
    response.assert_status(StatusCode::CREATED);
    let media: serde_json::Value = response.json();
    assert_eq!(media["album"]["id"], album["id"]);
    let path = api_path(&format!("/media/{}", media_id(&media)));

    app.client().get(&path).as_user(alice).await.assert_status_ok();
    app.client()
        .get(&path)
        .as_elevated(Uuid::new_v4())
        .await
        .assert_status_ok();
    app.client()
        .get(&path)
        .as_user(Uuid::new_v4())
        .await
        .assert_status_not_found();
    app.client()
        .delete(&path)
        .as_user(Uuid::new_v4())
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn deleting_an_album_keeps_its_media() {
    let app = setup_test_app().await;
    let alice = Uuid::new_v4();
    let album = create_album(&app, alice, true).await;
    let album_id = album["id"].as_str().unwrap().to_string();
    let media: serde_json::Value = app
        .client()
        .post(&api_path("/media"))
        .as_user(alice)
        .multipart(png_form("a.png").add_text("album_id", album_id.clone()))
        .await
        .json();

    let album_path = api_path(&format!("/albums/{}", album_id));
    app.client()
        .delete(&album_path)
        .as_user(Uuid::new_v4())
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.client()
        .delete(&album_path)
        .as_user(alice)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = app
        .client()
        .get(&api_path(&format!("/media/{}", media_id(&media))))
        .as_user(Uuid::new_v4())
        .await;
    response.assert_status_ok();
    let media: serde_json::Value = response.json();
    assert!(media["album"].is_null());
}

#[tokio::test]
async fn comments_are_added_listed_and_deleted_by_their_author() {
    let app = setup_test_app().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let media = upload_png(&app, alice, "").await;
    let comments_path = api_path(&format!("/media/{}/comments", media_id(&media)));

    for text in ["first", "second"] {
        app.client()
            .post(&comments_path)
            .as_user(bob)
            .json(&json!({ "text": text }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = app
        .client()
        .get(&comments_path)
        .add_query_param("cpage", "1")
        .as_user(alice)
        .await;
    response.assert_status_ok();
    let page: serde_json::Value = response.json();
    assert_eq!(page["count"], json!(2));
    assert_eq!(page["items"][0]["text"], json!("second"));

    let comment_id = page["items"][0]["id"].as_str().unwrap().to_string();
    let comment_path = api_path(&format!("/comments/{}", comment_id));
    app.client()
        .delete(&comment_path)
        .as_user(alice)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.client()
        .delete(&comment_path)
        .as_user(bob)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let feed: serde_json::Value = app
        .client()
        .get(&api_path("/feed"))
        .as_user(alice)
        .await
        .json();
    assert_eq!(feed["items"][0]["comment_count"], json!(1));
}

#[tokio::test]
async fn blank_comment_is_bad_request() {
    let app = setup_test_app().await;
    let alice = Uuid::new_v4();
    let media = upload_png(&app, alice, "").await;

    app.client()
        .post(&api_path(&format!("/media/{}/comments", media_id(&media))))
        .as_user(alice)
        .json(&json!({ "text": "   " }))
        .await
        .assert_status_bad_request();
}
