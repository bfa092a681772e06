//! HTML pages.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating;
//! every interpolated value is escaped unless wrapped in `PreEscaped`.

use axum::http::StatusCode;
use delish_core::models::store::{Store, TAG_CHOICES, TagCount};
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::flash::FlashMessage;

const CSS: &str = "\
body{margin:0;font-family:system-ui,sans-serif;color:#303030;background:#f6f6f6}\
a{color:#2a6fb0}\
.top{display:flex;gap:1.5rem;align-items:center;padding:1rem 2rem;background:#303030}\
.top a{color:#fff;text-decoration:none;font-weight:600}\
.top .brand{font-size:1.4rem;margin-right:auto}\
main{max-width:1000px;margin:0 auto;padding:2rem}\
.flash{padding:.75rem 1rem;margin-bottom:1rem;border-radius:4px;background:#fff;border-left:5px solid #888}\
.flash--success{border-color:#3c9a5f}.flash--error{border-color:#c0392b}\
.stores{display:grid;grid-template-columns:repeat(auto-fill,minmax(280px,1fr));gap:1.5rem}\
.store{background:#fff;border-radius:4px;overflow:hidden}\
.store img{width:100%;height:180px;object-fit:cover;display:block}\
.store__details{padding:1rem}\
.tags{display:flex;flex-wrap:wrap;gap:.5rem;list-style:none;padding:0}\
.tag__link{display:block;padding:.3rem .7rem;border-radius:3px;background:#fff;text-decoration:none}\
.tag__link.active{background:#303030;color:#fff}\
.tag__count{margin-left:.4rem;opacity:.6}\
.form label{display:block;margin-top:1rem;font-weight:600}\
.form input[type=text],.form input[type=number],.form textarea{width:100%;padding:.5rem;box-sizing:border-box}\
.form .tag-choice label{display:inline;font-weight:400;margin-right:1rem}\
.single__hero{width:100%;max-height:420px;object-fit:cover}\
.empty{padding:2rem;text-align:center;background:#fff}";

/// Chrome shared by every page.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub title: &'a str,
    pub flashes: &'a [FlashMessage],
    pub maps_api_key: Option<&'a str>,
}

/// Percent-encode `segment` for use inside a URL path.
pub fn path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn layout(page: Page<'_>, scripts: Markup, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (page.title) " | Delish" }
                style { (PreEscaped(CSS)) }
            }
            body {
                nav.top {
                    a.brand href="/" { "Delish" }
                    a href="/stores" { "Stores" }
                    a href="/tags" { "Tags" }
                    a href="/add" { "Add" }
                }
                main {
                    @for flash in page.flashes {
                        div class={ "flash flash--" (flash.level.as_str()) } {
                            p.flash__text { (PreEscaped(&flash.body)) }
                        }
                    }
                    (content)
                }
                (scripts)
            }
        }
    }
}

fn store_card(store: &Store) -> Markup {
    let excerpt: Vec<&str> = store.description.split_whitespace().take(25).collect();
    html! {
        article.store {
            @if let Some(photo) = store.cover_photo() {
                a href={ "/store/" (store.slug) } {
                    img src={ "/uploads/" (photo) } alt=(store.name);
                }
            }
            div.store__details {
                h2 { a href={ "/store/" (store.slug) } { (store.name) } }
                p { (excerpt.join(" ")) }
                a.store__edit href={ "/store/" (store.id) "/edit" } { "Edit" }
            }
        }
    }
}

fn store_grid(stores: &[Store]) -> Markup {
    html! {
        div.stores {
            @for store in stores {
                (store_card(store))
            }
        }
    }
}

pub fn index(page: Page<'_>) -> Markup {
    layout(
        page,
        html! {},
        html! {
            h1 { "Delish" }
            p { "Find the best places to eat, drink and hang out near you." }
            p {
                a href="/stores" { "Browse stores" }
                " or "
                a href="/add" { "add your favourite" }
                "."
            }
        },
    )
}

/// The add/edit form. Posts to `/add` for a new store and `/add/{id}`
/// for an existing one.
pub fn store_form(page: Page<'_>, store: Option<&Store>) -> Markup {
    let action = match store {
        Some(s) => format!("/add/{}", s.id),
        None => "/add".to_string(),
    };
    let location = store.and_then(|s| s.location.as_ref());
    let has_tag = |tag: &str| store.is_some_and(|s| s.tags.iter().any(|t| t == tag));

    let scripts = html! {
        @if let Some(key) = page.maps_api_key {
            script src={ "https://maps.googleapis.com/maps/api/js?key=" (key) "&libraries=places" } {}
            script src="/javascripts/autocomplete.js" {}
        }
    };

    layout(
        page,
        scripts,
        html! {
            h1 { (page.title) }
            form.form action=(action) method="POST" enctype="multipart/form-data" {
                label for="name" { "Name" }
                input type="text" id="name" name="name" required
                    value=[store.map(|s| s.name.as_str())];

                label for="description" { "Description" }
                textarea id="description" name="description" {
                    @if let Some(s) = store { (s.description) }
                }

                label for="photo" { "Photo" }
                input type="file" id="photo" name="photo"
                    accept="image/gif, image/png, image/jpeg, image/webp";
                @if let Some(photo) = store.and_then(Store::cover_photo) {
                    img src={ "/uploads/" (photo) } alt=[store.map(|s| s.name.as_str())] width="200";
                }

                label for="address" { "Address" }
                input type="text" id="address" name="location[address]"
                    value=[location.map(|l| l.address.as_str())];

                label for="lng" { "Address Lng" }
                input type="number" step="any" id="lng" name="location[coordinates][0]"
                    value=[location.map(|l| l.lng())];

                label for="lat" { "Address Lat" }
                input type="number" step="any" id="lat" name="location[coordinates][1]"
                    value=[location.map(|l| l.lat())];

                ul.tags {
                    @for &choice in TAG_CHOICES {
                        @let id = path_segment(choice);
                        li.tag-choice {
                            input type="checkbox" id=(id) name="tags" value=(choice)
                                checked[has_tag(choice)];
                            label for=(id) { (choice) }
                        }
                    }
                }

                input type="submit" value="Save →";
            }
        },
    )
}

pub fn stores(page: Page<'_>, stores: &[Store]) -> Markup {
    layout(
        page,
        html! {},
        html! {
            h1 { (page.title) }
            @if stores.is_empty() {
                p.empty { "No stores yet. " a href="/add" { "Add one!" } }
            } @else {
                (store_grid(stores))
            }
        },
    )
}

pub fn store(page: Page<'_>, store: &Store) -> Markup {
    layout(
        page,
        html! {},
        html! {
            article.single {
                @if let Some(photo) = store.cover_photo() {
                    img.single__hero src={ "/uploads/" (photo) } alt=(store.name);
                }
                h1 { (store.name) }
                @if let Some(location) = &store.location {
                    p.single__location { (location.address) }
                }
                p { (store.description) }
                @if !store.tags.is_empty() {
                    ul.tags {
                        @for tag in &store.tags {
                            li { a.tag__link href={ "/tags/" (path_segment(tag)) } { "#" (tag) } }
                        }
                    }
                }
                @if store.photos.len() > 1 {
                    div.single__photos {
                        @for photo in &store.photos {
                            img src={ "/uploads/" (photo) } alt=(store.name) width="160";
                        }
                    }
                }
                p { a href={ "/store/" (store.id) "/edit" } { "Edit store" } }
            }
        },
    )
}

/// Tag browser: every tag with its count, and the stores carrying the
/// selected one.
pub fn tag_page(
    page: Page<'_>,
    tags: &[TagCount],
    selected: Option<&str>,
    stores: &[Store],
) -> Markup {
    layout(
        page,
        html! {},
        html! {
            h1 { @if let Some(tag) = selected { "#" (tag) } @else { (page.title) } }
            ul.tags {
                @for tag in tags {
                    @let active = selected == Some(tag.tag.as_str());
                    li {
                        a.tag__link.active[active] href={ "/tags/" (path_segment(&tag.tag)) } {
                            span.tag__text { (tag.tag) }
                            span.tag__count { (tag.count) }
                        }
                    }
                }
            }
            @if stores.is_empty() {
                p.empty {
                    @if let Some(tag) = selected {
                        "No stores tagged " strong { (tag) } " yet."
                    } @else {
                        "No tagged stores yet."
                    }
                }
            } @else {
                (store_grid(stores))
            }
        },
    )
}

pub fn not_found(page: Page<'_>) -> Markup {
    layout(
        page,
        html! {},
        html! {
            h1 { "Not found" }
            p { "That page could not be found. " a href="/stores" { "Back to stores" } }
        },
    )
}

pub fn error_page(status: StatusCode, message: &str) -> Markup {
    if status == StatusCode::NOT_FOUND {
        return not_found(Page {
            title: "Not found",
            flashes: &[],
            maps_api_key: None,
        });
    }

    let title = status.canonical_reason().unwrap_or("Error");
    layout(
        Page {
            title,
            flashes: &[],
            maps_api_key: None,
        },
        html! {},
        html! {
            h1 { (title) }
            p.error__message { (message) }
            p { a href="/stores" { "Back to stores" } }
        },
    )
}
