use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;

const BUNDLE: &str = "bundle.js";
const BUNDLE_GZ: &str = "bundle.js.gz";
const JS_MIME: &str = "application/javascript; charset=utf-8";

const INDEX_TEMPLATE: &str = include_str!("static/index.html");

/// Which bundle file to serve
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BundleChoice {
    Plain(PathBuf),
    Gzip(PathBuf),
}

/// Prefer the gzip bundle unless the plain one was modified after it
pub fn choose_bundle(dir: &Path) -> Option<BundleChoice> {
    let plain = dir.join(BUNDLE);
    let gz = dir.join(BUNDLE_GZ);
    match (modified(&plain), modified(&gz)) {
        (Some(plain_time), Some(gz_time)) if plain_time > gz_time => Some(BundleChoice::Plain(plain)),
        (_, Some(_)) => Some(BundleChoice::Gzip(gz)),
        (Some(_), None) => Some(BundleChoice::Plain(plain)),
        (None, None) => None,
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

pub(super) async fn bundle_response(dir: &Path) -> Response {
    let Some(choice) = choose_bundle(dir) else {
        warn!(target: "dashboard", dir = %dir.display(), "No bundle found");
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    let (path, gzip) = match &choice {
        BundleChoice::Plain(path) => (path, false),
        BundleChoice::Gzip(path) => (path, true),
    };
    let body = match tokio::fs::read(path).await {
        Ok(body) => body,
        Err(e) => {
            warn!(target: "dashboard", path = %path.display(), error = %e, "Failed to read bundle");
            return (StatusCode::NOT_FOUND, "Not found").into_response();
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JS_MIME));
    if gzip {
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::VARY, HeaderValue::from_static("Accept-Encoding"));
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
    (StatusCode::OK, headers, body).into_response()
}

/// UI shell with the configured title
pub(super) fn index_page(title: &str) -> Html<String> {
    Html(INDEX_TEMPLATE.replace("{{title}}", &escape_html(title)))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
