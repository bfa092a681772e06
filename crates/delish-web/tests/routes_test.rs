//! HTTP integration tests.
//!
//! Starts the router against in-memory SurrealDB and a temporary uploads
//! directory, then exercises it with reqwest.

use std::io::Cursor;
use std::sync::Arc;

use delish_core::models::store::{CreateStore, LocationKind};
use delish_core::repository::StoreRepository;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use delish_db::DbConfig;
use delish_db::repository::SurrealStoreRepository;
use delish_web::flash::{FLASH_COOKIE, FlashLevel, FlashMessage};
use delish_web::{AppState, ServerConfig};
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgb};
use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use surrealdb::engine::any::Any;
use tempfile::TempDir;

struct TestApp {
    base: String,
    client: Client,
    repo: SurrealStoreRepository<Any>,
    uploads: TempDir,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn uploaded_files(&self) -> Vec<String> {
        std::fs::read_dir(self.uploads.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    async fn post_form(&self, path: &str, form: Form) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status();
        (status, resp.text().await.unwrap())
    }
}

async fn start_app() -> TestApp {
    start_app_with(ServerConfig::default()).await
}

/// Bind to port 0 and return the running app. The uploads directory in
/// `config` is replaced with a temporary one.
async fn start_app_with(config: ServerConfig) -> TestApp {
    let db = delish_db::connect(&DbConfig::in_memory()).await.unwrap();
    let repo = SurrealStoreRepository::new(db);

    let uploads = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        uploads_dir: uploads.path().to_path_buf(),
        ..config
    };
    let state = AppState::new(repo.clone(), config).unwrap();
    let app = delish_web::router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = Client::builder()
        .redirect(Policy::none())
        .cookie_store(true)
        .build()
        .unwrap();

    TestApp {
        base: format!("http://{addr}"),
        client,
        repo,
        uploads,
    }
}

fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
        .to_string()
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgb([20u8, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn photo_part(bytes: Vec<u8>, file_name: &str, mime: &str) -> Part {
    Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(mime)
        .unwrap()
}

#[tokio::test]
async fn static_pages_render() {
    let app = start_app().await;

    let (status, body) = app.get_text("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Delish"));

    let (status, body) = app.get_text("/add").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Add Store"));
    assert!(body.contains("enctype=\"multipart/form-data\""));
}

#[tokio::test]
async fn create_without_photo_redirects_to_slug_with_flash() {
    let app = start_app().await;

    let resp = app
        .post_form("/add", Form::new().text("name", "Cafe Rio"))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/store/cafe-rio");

    let store = app.repo.get_by_slug("cafe-rio").await.unwrap().unwrap();
    assert!(store.photos.is_empty());

    let (status, body) = app.get_text("/store/cafe-rio").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Successfully created Cafe Rio. Care to leave a review?"));

    // The notification is shown once.
    let (_, body) = app.get_text("/store/cafe-rio").await;
    assert!(!body.contains("Successfully created"));
}

#[tokio::test]
async fn second_store_with_same_name_gets_new_slug() {
    let app = start_app().await;

    let first = app
        .post_form("/add", Form::new().text("name", "Cafe Rio"))
        .await;
    let second = app
        .post_form("/add", Form::new().text("name", "Cafe Rio"))
        .await;

    assert_eq!(location(&first), "/store/cafe-rio");
    let second = location(&second);
    assert_ne!(second, "/store/cafe-rio");
    assert_eq!(second, "/store/cafe-rio-2");
}

#[tokio::test]
async fn non_image_upload_is_rejected_before_persistence() {
    let app = start_app().await;

    let form = Form::new().text("name", "Text Shop").part(
        "photo",
        photo_part(b"hello".to_vec(), "notes.txt", "text/plain"),
    );
    let resp = app.post_form("/add", form).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().contains("That filetype is not allowed!"));
    assert!(app.uploaded_files().is_empty());
    assert!(app.repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn unexpected_file_field_is_rejected() {
    let app = start_app().await;

    let form = Form::new()
        .text("name", "Two Files")
        .part("avatar", photo_part(png(10, 10), "a.png", "image/png"));
    let resp = app.post_form("/add", form).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(app.repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_file_input_counts_as_no_photo() {
    let app = start_app().await;

    let form = Form::new().text("name", "No Photo").part(
        "photo",
        photo_part(Vec::new(), "", "application/octet-stream"),
    );
    let resp = app.post_form("/add", form).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn unnamed_part_with_a_body_is_still_a_photo() {
    let app = start_app().await;

    let form = Form::new()
        .text("name", "Unnamed")
        .part("photo", photo_part(png(400, 300), "", "image/png"));
    let resp = app.post_form("/add", form).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let files = app.uploaded_files();
    assert_eq!(files.len(), 1);
    let store = app.repo.get_by_slug("unnamed").await.unwrap().unwrap();
    assert_eq!(store.photos, files);

    let form = Form::new().text("name", "Unnamed Text").part(
        "photo",
        photo_part(b"hello".to_vec(), "", "text/plain"),
    );
    let resp = app.post_form("/add", form).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(app.repo.get_by_slug("unnamed-text").await.unwrap().is_none());
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
    let app = start_app_with(ServerConfig {
        max_upload_bytes: 1024,
        ..Default::default()
    })
    .await;

    let form = Form::new()
        .text("name", "Huge")
        .part("photo", photo_part(vec![0u8; 16 * 1024], "huge.png", "image/png"));
    let resp = app.post_form("/add", form).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(resp.text().await.unwrap().contains("That upload is too large."));
    assert!(app.uploaded_files().is_empty());
    assert!(app.repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn extreme_aspect_ratio_photo_is_refused() {
    let app = start_app_with(ServerConfig {
        photo_max_dimension: 4000,
        ..Default::default()
    })
    .await;

    // 800px wide this would be 80_000px tall.
    let form = Form::new()
        .text("name", "Skinny")
        .part("photo", photo_part(png(10, 1000), "skinny.png", "image/png"));
    let resp = app.post_form("/add", form).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.unwrap().contains("That image is too large!"));
    assert!(app.uploaded_files().is_empty());
    assert!(app.repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn forged_flash_cookie_renders_nothing() {
    let app = start_app().await;

    let forged = vec![FlashMessage {
        level: FlashLevel::Success,
        body: "<script>alert(document.cookie)</script>".into(),
    }];
    let value = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

    let resp = app
        .client
        .get(app.url("/"))
        .header(reqwest::header::COOKIE, format!("{FLASH_COOKIE}={value}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!resp.text().await.unwrap().contains("<script>alert"));
}

#[tokio::test]
async fn photo_is_resized_written_and_referenced() {
    let app = start_app().await;

    let form = Form::new()
        .text("name", "Photo Shop")
        .part("photo", photo_part(png(1600, 1200), "shop.png", "image/png"));
    let resp = app.post_form("/add", form).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let files = app.uploaded_files();
    assert_eq!(files.len(), 1);
    let filename = &files[0];
    assert!(filename.ends_with(".png"));

    let written = image::open(app.uploads.path().join(filename)).unwrap();
    assert_eq!(written.dimensions(), (800, 600));

    let store = app.repo.get_by_slug("photo-shop").await.unwrap().unwrap();
    assert_eq!(store.photos, vec![filename.clone()]);

    let (_, body) = app.get_text("/store/photo-shop").await;
    assert!(body.contains(&format!("/uploads/{filename}")));

    let served = app
        .client
        .get(app.url(&format!("/uploads/{filename}")))
        .send()
        .await
        .unwrap();
    assert_eq!(served.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalid_submission_is_unprocessable() {
    let app = start_app().await;

    let resp = app.post_form("/add", Form::new().text("name", "  ")).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.unwrap().contains("Please enter a store name!"));

    let form = Form::new()
        .text("name", "Nowhere")
        .text("location[address]", "Main St")
        .text("location[coordinates][0]", "not a number")
        .text("location[coordinates][1]", "40.0");
    let resp = app.post_form("/add", form).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn edit_page_is_prefilled() {
    let app = start_app().await;
    let store = app
        .repo
        .create(CreateStore {
            name: "Cafe Rio".into(),
            description: "Burritos".into(),
            tags: vec!["Wifi".into()],
            ..Default::default()
        })
        .await
        .unwrap();

    let (status, body) = app.get_text(&format!("/store/{}/edit", store.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Edit Store Cafe Rio"));
    assert!(body.contains(&format!("action=\"/add/{}\"", store.id)));
    assert!(body.contains("Burritos"));
}

#[tokio::test]
async fn update_forces_point_and_redirects_to_edit() {
    let app = start_app().await;
    let store = app
        .repo
        .create(CreateStore {
            name: "Cafe Rio".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let form = Form::new()
        .text("name", "Cafe Rio Downtown")
        .text("description", "New spot")
        .text("location[type]", "Polygon")
        .text("location[address]", "Main St")
        .text("location[coordinates][0]", "-111.89")
        .text("location[coordinates][1]", "40.76")
        .text("tags", "Wifi")
        .text("tags", "Open Late");
    let resp = app.post_form(&format!("/add/{}", store.id), form).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/store/{}/edit", store.id));

    let updated = app.repo.get_by_id(store.id).await.unwrap().unwrap();
    assert_eq!(updated.name, "Cafe Rio Downtown");
    assert_eq!(updated.slug, "cafe-rio");
    assert_eq!(updated.tags, vec!["Wifi", "Open Late"]);
    let loc = updated.location.unwrap();
    assert_eq!(loc.kind, LocationKind::Point);
    assert_eq!(loc.coordinates, [-111.89, 40.76]);

    let (_, body) = app.get_text(&location(&resp)).await;
    assert!(body.contains("Successfully updated <strong>Cafe Rio Downtown</strong>."));
    assert!(body.contains("href=\"/store/cafe-rio\""));
}

#[tokio::test]
async fn update_with_photo_appends_it() {
    let app = start_app().await;
    let store = app
        .repo
        .create(CreateStore {
            name: "Gallery".into(),
            photo: Some("existing.png".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let form = Form::new()
        .text("name", "Gallery")
        .part("photo", photo_part(png(400, 400), "new.png", "image/png"));
    let resp = app.post_form(&format!("/add/{}", store.id), form).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let files = app.uploaded_files();
    let updated = app.repo.get_by_id(store.id).await.unwrap().unwrap();
    assert_eq!(updated.photos.len(), 2);
    assert_eq!(updated.photos[0], "existing.png");
    assert_eq!(updated.photos[1], files[0]);
}

#[tokio::test]
async fn missing_stores_are_not_found() {
    let app = start_app().await;
    let missing = uuid::Uuid::new_v4();

    let (status, body) = app.get_text("/store/no-such-store").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Not found"));

    let (status, _) = app.get_text(&format!("/store/{missing}/edit")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get_text("/store/not-a-uuid/edit").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let resp = app
        .post_form(
            &format!("/add/{missing}"),
            Form::new().text("name", "Ghost"),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(app.repo.list().await.unwrap().is_empty());

    let (status, _) = app.get_text("/nowhere/at/all").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stores_page_lists_everything() {
    let app = start_app().await;

    let (_, body) = app.get_text("/stores").await;
    assert!(body.contains("No stores yet."));

    for name in ["Alpha", "Beta"] {
        app.repo
            .create(CreateStore {
                name: name.into(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let (status, body) = app.get_text("/stores").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("href=\"/store/alpha\""));
    assert!(body.contains("href=\"/store/beta\""));
}

#[tokio::test]
async fn tag_pages_render_with_and_without_matches() {
    let app = start_app().await;
    app.repo
        .create(CreateStore {
            name: "Night Owl".into(),
            tags: vec!["Open Late".into(), "Wifi".into()],
            ..Default::default()
        })
        .await
        .unwrap();

    let (status, body) = app.get_text("/tags").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Open Late"));
    assert!(body.contains("href=\"/store/night-owl\""));

    let (status, body) = app.get_text("/tags/Open%20Late").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("href=\"/store/night-owl\""));

    let (status, body) = app.get_text("/tags/Licensed").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No stores tagged <strong>Licensed</strong> yet."));
    assert!(!body.contains("href=\"/store/night-owl\""));
}

#[tokio::test]
async fn autocomplete_script_is_served() {
    let app = start_app().await;

    let resp = app
        .client
        .get(app.url("/javascripts/autocomplete.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()[reqwest::header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("application/javascript"));
    assert!(resp.text().await.unwrap().contains("place_changed"));
}
