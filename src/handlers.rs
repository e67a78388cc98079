use std::path::{Path, PathBuf};

use axum::{
    extract::{Path as PathParam, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, trace, warn};

use crate::error::ServeError;
use crate::listing;
use crate::render;
use crate::resolve::{self, Rejection, ResolvedTarget};
use crate::stream;
use crate::AppState;

/// Welcome files served for a directory request, in priority order.
const WELCOME_FILES: [&str; 2] = ["index.html", "index.htm"];

const LISTING_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub root: String,
}

/// GET /health - Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        root: state.root_dir.display().to_string(),
    })
}

/// Resource handler mounted for every method under the configured prefix.
///
/// Resolves the request path inside the served root, then either streams a
/// file, streams a directory's welcome file, or sends a directory listing.
pub async fn handle_resource(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    request_headers: HeaderMap,
    path: Option<PathParam<String>>,
) -> Result<Response, ServeError> {
    let resource_path = path.map(|PathParam(path)| path).unwrap_or_default();
    trace!(resource = %resource_path, "request resource");

    match resolve::resolve(&state.root_dir, &resource_path) {
        ResolvedTarget::Rejected(Rejection::OutsideRoot) => {
            warn!(
                resource = %resource_path,
                uri = %uri,
                root = %state.root_dir.display(),
                "request resolves outside the served root"
            );
            Err(ServeError::OutsideRoot)
        }
        ResolvedTarget::Rejected(Rejection::Missing) => {
            warn!(resource = %resource_path, uri = %uri, "requested resource does not exist");
            Err(ServeError::NotFound(resource_path))
        }
        ResolvedTarget::File(file) => {
            serve_resource(&state, &file, &method, &request_headers, &uri).await
        }
        ResolvedTarget::Directory(dir) => {
            handle_directory(&state, dir, &method, &request_headers, &uri).await
        }
    }
}

async fn serve_resource(
    state: &AppState,
    file: &Path,
    method: &Method,
    request_headers: &HeaderMap,
    uri: &Uri,
) -> Result<Response, ServeError> {
    match *method {
        Method::GET | Method::HEAD => {
            stream::serve_file(file, method, request_headers, state.content_types.as_ref(), uri)
                .await
        }
        _ => Err(unsupported_method(method, uri, file)),
    }
}

async fn handle_directory(
    state: &AppState,
    dir: PathBuf,
    method: &Method,
    request_headers: &HeaderMap,
    uri: &Uri,
) -> Result<Response, ServeError> {
    if let Some(welcome) = welcome_file(&dir) {
        return serve_resource(state, &welcome, method, request_headers, uri).await;
    }

    match *method {
        Method::GET => send_listing(state, dir).await,
        Method::HEAD => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, LISTING_CONTENT_TYPE)],
        )
            .into_response()),
        _ => Err(unsupported_method(method, uri, &dir)),
    }
}

/// First welcome candidate that exists as a regular file in `dir`.
fn welcome_file(dir: &Path) -> Option<PathBuf> {
    WELCOME_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

async fn send_listing(state: &AppState, dir: PathBuf) -> Result<Response, ServeError> {
    let dir_url = directory_url(&state.config.mount(), &state.root_dir, &dir);

    let root = state.root_dir.clone();
    let url = dir_url.clone();
    let entries = tokio::task::spawn_blocking(move || listing::list_entries(&dir, &root, &url))
        .await
        .map_err(|err| {
            ServeError::Io(std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))
        })?;

    let body = match (&state.config.listing_template, &state.templates) {
        (Some(template), Some(renderer)) => {
            let summary = listing::summarize(&entries);
            let bindings =
                render::template_bindings(&entries, summary, &dir_url, &state.config.mount());
            renderer.render(template, &bindings).map_err(|err| {
                error!(%template, dir = %dir_url, %err, "listing template failed to render");
                err
            })?
        }
        _ => render::generated_listing(&entries, &state.config),
    };

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, LISTING_CONTENT_TYPE)],
        body,
    )
        .into_response())
}

/// Absolute request URL of a listed directory: the mount prefix plus the
/// directory's position relative to the root.
fn directory_url(mount: &str, root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or_else(|_| Path::new(""));
    if relative.as_os_str().is_empty() {
        format!("{mount}/")
    } else {
        format!("{mount}/{}", relative.display())
    }
}

fn unsupported_method(method: &Method, uri: &Uri, path: &Path) -> ServeError {
    warn!(
        method = %method,
        uri = %uri,
        path = %path.display(),
        "unsupported request method"
    );
    ServeError::MethodNotAllowed {
        method: method.to_string(),
        resource: uri.to_string(),
    }
}
