#![allow(unused)]
#[allow(unused)]
mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::*;

#[tokio::test]
async fn single_upload_stores_host_details_and_metadata() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let form = MultipartForm::new()
        .file("file", "front.png", "image/png", PNG_BYTES)
        .text("category", "Property")
        .text("tags", "front, exterior,,")
        .text("description", "Street view");

    let response = app.multipart("/api/upload", Some(&user_token()), form).await?;
    assert_status(&response, StatusCode::CREATED, "upload");
    let data = &response.body["data"];
    assert_eq!(data["originalName"], json!("front.png"));
    assert_eq!(data["mimetype"], json!("image/png"));
    assert_eq!(data["size"], json!(PNG_BYTES.len()));
    assert_eq!(data["cloudinaryId"], json!("real-estate/test-1"));
    assert_eq!(data["url"], json!("https://cdn.example.org/real-estate/test-1"));
    assert_eq!(data["uploadedBy"], json!(USER_SUBJECT));
    assert_eq!(data["category"], json!("property"));
    assert_eq!(data["tags"], json!(["front", "exterior"]));
    assert_eq!(data["description"], json!("Street view"));
    assert_eq!(app.host.uploaded(), vec!["front.png".to_string()]);
    Ok(())
}

#[tokio::test]
async fn anonymous_uploads_are_attributed_to_anonymous() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let form = MultipartForm::new().file("file", "doc.pdf", "application/pdf", b"%PDF-1.4");

    let response = app.multipart("/api/upload", None, form).await?;
    assert_status(&response, StatusCode::CREATED, "anonymous upload");
    assert_eq!(response.body["data"]["uploadedBy"], json!("anonymous"));
    assert_eq!(response.body["data"]["category"], json!("other"));
    Ok(())
}

#[tokio::test]
async fn invalid_files_never_reach_the_host() -> anyhow::Result<()> {
    let app = TestApp::new_with_config(|config| config.uploads.max_file_size_bytes = 4).await?;

    let wrong_type = MultipartForm::new().file("file", "run.sh", "text/x-shellscript", b"ls");
    let response = app.multipart("/api/upload", None, wrong_type).await?;
    assert_error(&response, StatusCode::BAD_REQUEST);

    let too_big = MultipartForm::new().file("file", "big.png", "image/png", PNG_BYTES);
    let response = app.multipart("/api/upload", None, too_big).await?;
    assert_error(&response, StatusCode::BAD_REQUEST);

    let empty = MultipartForm::new().file("file", "empty.png", "image/png", b"");
    let response = app.multipart("/api/upload", None, empty).await?;
    assert_error(&response, StatusCode::BAD_REQUEST);

    assert!(app.host.uploaded().is_empty());
    Ok(())
}

#[tokio::test]
async fn single_upload_rejects_missing_or_extra_files() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let none = MultipartForm::new().text("category", "blog");
    let response = app.multipart("/api/upload", None, none).await?;
    assert_error(&response, StatusCode::BAD_REQUEST);

    let two = MultipartForm::new()
        .file("file", "a.png", "image/png", PNG_BYTES)
        .file("file", "b.png", "image/png", PNG_BYTES);
    let response = app.multipart("/api/upload", None, two).await?;
    assert_error(&response, StatusCode::BAD_REQUEST);

    let wrong_field = MultipartForm::new().file("files", "a.png", "image/png", PNG_BYTES);
    let response = app.multipart("/api/upload", None, wrong_field).await?;
    assert_error(&response, StatusCode::BAD_REQUEST);

    let bad_category = MultipartForm::new()
        .file("file", "a.png", "image/png", PNG_BYTES)
        .text("category", "selfie");
    let response = app.multipart("/api/upload", None, bad_category).await?;
    assert_error(&response, StatusCode::BAD_REQUEST);

    assert!(app.host.uploaded().is_empty());
    Ok(())
}

#[tokio::test]
async fn multiple_upload_returns_every_record() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let form = MultipartForm::new()
        .file("files", "a.png", "image/png", PNG_BYTES)
        .file("files", "b.png", "image/png", PNG_BYTES)
        .file("files", "c.png", "image/png", PNG_BYTES)
        .text("category", "property");

    let response = app
        .multipart("/api/upload/multiple", Some(&admin_token()), form)
        .await?;
    assert_status(&response, StatusCode::CREATED, "multiple upload");
    assert_eq!(response.body["count"], json!(3));
    let data = response.body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(data.len(), 3);
    assert!(data.iter().all(|u| u["category"] == json!("property")));
    assert_eq!(app.host.uploaded().len(), 3);
    Ok(())
}

#[tokio::test]
async fn multiple_upload_enforces_the_file_limit() -> anyhow::Result<()> {
    let app = TestApp::new_with_config(|config| config.uploads.max_files = 2).await?;
    let form = MultipartForm::new()
        .file("files", "a.png", "image/png", PNG_BYTES)
        .file("files", "b.png", "image/png", PNG_BYTES)
        .file("files", "c.png", "image/png", PNG_BYTES);

    let response = app.multipart("/api/upload/multiple", None, form).await?;
    assert_error(&response, StatusCode::BAD_REQUEST);

    // One bad file rejects the whole batch before anything is sent.
    let mixed = MultipartForm::new()
        .file("files", "a.png", "image/png", PNG_BYTES)
        .file("files", "b.exe", "application/x-msdownload", b"MZ");
    let response = app.multipart("/api/upload/multiple", None, mixed).await?;
    assert_error(&response, StatusCode::BAD_REQUEST);

    assert!(app.host.uploaded().is_empty());
    Ok(())
}

#[tokio::test]
async fn listing_filters_by_category_and_paginates() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    for (name, category) in [
        ("a.png", "property"),
        ("b.png", "property"),
        ("c.png", "property"),
        ("d.png", "blog"),
    ] {
        let form = MultipartForm::new()
            .file("file", name, "image/png", PNG_BYTES)
            .text("category", category);
        let response = app.multipart("/api/upload", None, form).await?;
        assert_status(&response, StatusCode::CREATED, "seed upload");
    }

    let page = app.get("/api/upload?category=property&limit=2", None).await?;
    assert_status(&page, StatusCode::OK, "list uploads");
    assert_eq!(list_data(&page)?.len(), 2);
    assert_eq!(total(&page), 3);
    assert_eq!(
        page.body["pagination"],
        json!({ "page": 1, "pages": 2, "limit": 2 })
    );

    let all = app.get("/api/upload", None).await?;
    assert_eq!(total(&all), 4);

    let invalid = app.get("/api/upload?category=selfie", None).await?;
    assert_error(&invalid, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn get_and_delete_single_upload() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let id = app.upload_image("gone.png").await?;
    let path = format!("/api/upload/{id}");

    let found = app.get(&path, None).await?;
    assert_status(&found, StatusCode::OK, "get upload");
    let public_id = found.body["data"]["cloudinaryId"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    let forbidden = app.delete(&path, Some(&user_token())).await?;
    assert_error(&forbidden, StatusCode::FORBIDDEN);
    assert!(app.host.destroyed().is_empty());

    let deleted = app.delete(&path, Some(&admin_token())).await?;
    assert_status(&deleted, StatusCode::OK, "delete upload");
    assert_eq!(app.host.destroyed(), vec![public_id]);

    let gone = app.get(&path, None).await?;
    assert_error(&gone, StatusCode::NOT_FOUND);

    let malformed = app.get("/api/upload/nope", None).await?;
    assert_error(&malformed, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn host_failures_surface_as_server_errors() -> anyhow::Result<()> {
    let app = TestApp::with_host(RecordingHost::rejecting(), |_| {}).await?;
    let form = MultipartForm::new().file("file", "a.png", "image/png", PNG_BYTES);

    let response = app.multipart("/api/upload", None, form).await?;
    let message = assert_error(&response, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message, "Image upload failed");

    let listed = app.get("/api/upload", None).await?;
    assert_eq!(total(&listed), 0);
    Ok(())
}

#[tokio::test]
async fn failed_batch_leaves_nothing_behind() -> anyhow::Result<()> {
    let app = TestApp::with_host(RecordingHost::rejecting_file("bad.png"), |_| {}).await?;
    let form = MultipartForm::new()
        .file("files", "a.png", "image/png", PNG_BYTES)
        .file("files", "bad.png", "image/png", PNG_BYTES)
        .file("files", "c.png", "image/png", PNG_BYTES);

    let response = app
        .multipart("/api/upload/multiple", Some(&admin_token()), form)
        .await?;
    assert_error(&response, StatusCode::INTERNAL_SERVER_ERROR);

    let listed = app.get("/api/upload", None).await?;
    assert_eq!(total(&listed), 0);

    // Both accepted files were pulled back off the host.
    assert_eq!(app.host.uploaded().len(), 2);
    assert_eq!(app.host.destroyed().len(), 2);
    Ok(())
}
