//! Route handlers.
//!
//! Each handler validates its request, delegates to the injected
//! [`StoreRepository`] and either renders a page or redirects with a flash
//! notification. Store mutations run the upload pipeline in order:
//! parse the form, resize and write the photo, then persist.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect};
use delish_core::repository::StoreRepository;
use maud::{Markup, html};
use tracing::info;
use uuid::Uuid;

use crate::error::WebError;
use crate::flash::{self, FlashJar, FlashMessage};
use crate::form::StoreSubmission;
use crate::server::AppState;
use crate::views;

const AUTOCOMPLETE_JS: &str = include_str!("../assets/autocomplete.js");

type Rendered = (FlashJar, Html<String>);

/// Consume pending flashes and render a page with them.
fn render(jar: FlashJar, page: impl FnOnce(&[FlashMessage]) -> Markup) -> Rendered {
    let (jar, flashes) = flash::take(jar);
    (jar, Html(page(&flashes).into_string()))
}

/// Malformed ids cannot name a store, so they are reported as missing.
fn parse_id(raw: &str) -> Result<Uuid, WebError> {
    Uuid::parse_str(raw).map_err(|_| WebError::NotFound)
}

pub async fn home_page<R: StoreRepository>(
    State(state): State<Arc<AppState<R>>>,
    jar: FlashJar,
) -> Rendered {
    render(jar, |flashes| views::index(state.page("Home", flashes)))
}

pub async fn add_store<R: StoreRepository>(
    State(state): State<Arc<AppState<R>>>,
    jar: FlashJar,
) -> Rendered {
    render(jar, |flashes| {
        views::store_form(state.page("Add Store", flashes), None)
    })
}

pub async fn create_store<R: StoreRepository>(
    State(state): State<Arc<AppState<R>>>,
    jar: FlashJar,
    multipart: Multipart,
) -> Result<(FlashJar, Redirect), WebError> {
    let submission = StoreSubmission::from_multipart(multipart).await?;
    let (mut input, upload) = submission.into_create()?;
    input.photo = state.photos.accept(upload).await?;

    let store = state.stores.create(input).await?;
    info!(store_id = %store.id, slug = %store.slug, "Store created");

    let jar = flash::push(
        jar,
        FlashMessage::success(html! {
            "Successfully created " (store.name) ". Care to leave a review?"
        }),
    );
    Ok((jar, Redirect::to(&format!("/store/{}", store.slug))))
}

pub async fn get_stores<R: StoreRepository>(
    State(state): State<Arc<AppState<R>>>,
    jar: FlashJar,
) -> Result<Rendered, WebError> {
    let stores = state.stores.list().await?;
    Ok(render(jar, |flashes| {
        views::stores(state.page("Stores", flashes), &stores)
    }))
}

pub async fn edit_store<R: StoreRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    jar: FlashJar,
) -> Result<Rendered, WebError> {
    let id = parse_id(&id)?;
    let store = state
        .stores
        .get_by_id(id)
        .await?
        .ok_or(WebError::NotFound)?;

    let title = format!("Edit Store {}", store.name);
    Ok(render(jar, |flashes| {
        views::store_form(state.page(&title, flashes), Some(&store))
    }))
}

pub async fn update_store<R: StoreRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    jar: FlashJar,
    multipart: Multipart,
) -> Result<(FlashJar, Redirect), WebError> {
    let id = parse_id(&id)?;
    let submission = StoreSubmission::from_multipart(multipart).await?;
    let (mut input, upload) = submission.into_update()?;
    input.photo = state.photos.accept(upload).await?;

    let store = state
        .stores
        .update(id, input.force_point())
        .await?
        .ok_or(WebError::NotFound)?;
    info!(store_id = %store.id, slug = %store.slug, "Store updated");

    let jar = flash::push(
        jar,
        FlashMessage::success(html! {
            "Successfully updated " strong { (store.name) } ". "
            a href={ "/store/" (store.slug) } { "View Store →" }
        }),
    );
    Ok((jar, Redirect::to(&format!("/store/{}/edit", store.id))))
}

pub async fn get_store_by_slug<R: StoreRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(slug): Path<String>,
    jar: FlashJar,
) -> Result<Rendered, WebError> {
    let Some(store) = state.stores.get_by_slug(&slug).await? else {
        return Err(WebError::NotFound);
    };

    Ok(render(jar, |flashes| {
        views::store(state.page(&store.name, flashes), &store)
    }))
}

/// `GET /tags`: every tag, with all tagged stores.
pub async fn get_tags<R: StoreRepository>(
    State(state): State<Arc<AppState<R>>>,
    jar: FlashJar,
) -> Result<Rendered, WebError> {
    tag_page(&state, jar, None).await
}

/// `GET /tags/{tag}`: every tag, with the stores carrying `tag`.
pub async fn get_store_by_tag<R: StoreRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(tag): Path<String>,
    jar: FlashJar,
) -> Result<Rendered, WebError> {
    tag_page(&state, jar, Some(tag)).await
}

async fn tag_page<R: StoreRepository>(
    state: &AppState<R>,
    jar: FlashJar,
    tag: Option<String>,
) -> Result<Rendered, WebError> {
    let tags = state.stores.tag_counts().await?;
    let stores = state.stores.list_by_tag(tag.as_deref()).await?;

    Ok(render(jar, |flashes| {
        views::tag_page(state.page("Tags", flashes), &tags, tag.as_deref(), &stores)
    }))
}

pub async fn autocomplete_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        AUTOCOMPLETE_JS,
    )
}

pub async fn not_found() -> WebError {
    WebError::NotFound
}
