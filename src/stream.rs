use std::path::Path;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

use crate::cache::{self, Validation};
use crate::error::ServeError;

/// Filename-extension content-type lookup.
pub trait ContentTypeResolver: Send + Sync {
    fn content_type_for(&self, path: &Path) -> Option<String>;
}

/// Default resolver backed by mime_guess.
#[derive(Debug, Default, Clone, Copy)]
pub struct GuessContentType;

impl ContentTypeResolver for GuessContentType {
    fn content_type_for(&self, path: &Path) -> Option<String> {
        mime_guess::from_path(path).first().map(|mime| mime.to_string())
    }
}

/// Stream a resolved file, honoring conditional requests and HEAD semantics.
///
/// The file is opened only on the fresh-GET path: not-modified responses and
/// HEAD requests are answered from metadata alone. A metadata read failure is
/// fatal for the request, carrying the resource identity.
pub async fn serve_file(
    path: &Path,
    method: &Method,
    request_headers: &HeaderMap,
    content_types: &dyn ContentTypeResolver,
    uri: &Uri,
) -> Result<Response, ServeError> {
    let metadata = fs::metadata(path).await.map_err(|source| {
        error!(path = %path.display(), %uri, %source, "failed to read resource metadata");
        ServeError::Metadata {
            path: path.display().to_string(),
            source,
        }
    })?;
    let modified = metadata.modified().map_err(|source| {
        error!(path = %path.display(), %uri, %source, "failed to read resource metadata");
        ServeError::Metadata {
            path: path.display().to_string(),
            source,
        }
    })?;

    let headers = match cache::check(modified, request_headers) {
        Validation::NotModified(headers) => {
            // nothing streams out, simply return 304
            return Ok((StatusCode::NOT_MODIFIED, headers).into_response());
        }
        Validation::Fresh(headers) => headers,
    };

    if *method == Method::HEAD {
        return Ok((StatusCode::OK, headers).into_response());
    }

    let file = fs::File::open(path).await.map_err(ServeError::Io)?;
    let body = Body::from_stream(ReaderStream::new(file));

    let mut response_headers = headers;
    response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(metadata.len()));

    match content_types.content_type_for(path) {
        Some(mime) => {
            debug!(path = %path.display(), %mime, "streaming as resource");
            if let Ok(value) = HeaderValue::from_str(&mime) {
                response_headers.insert(header::CONTENT_TYPE, value);
            }
        }
        None => {
            // unknown extension: still deliver the bytes, as a plain download
            debug!(path = %path.display(), "streaming as file attachment");
            response_headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            );
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().replace('"', "'"))
                .unwrap_or_default();
            if let Ok(value) =
                HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
            {
                response_headers.insert(header::CONTENT_DISPOSITION, value);
            }
        }
    }

    Ok((StatusCode::OK, response_headers, body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn guesses_known_extensions() {
        let resolver = GuessContentType;
        assert_eq!(
            resolver.content_type_for(Path::new("page.html")).as_deref(),
            Some("text/html")
        );
        assert_eq!(
            resolver.content_type_for(Path::new("notes.txt")).as_deref(),
            Some("text/plain")
        );
        assert_eq!(resolver.content_type_for(Path::new("data.qqq")), None);
    }

    fn test_uri() -> Uri {
        Uri::from_static("/test")
    }

    #[tokio::test]
    async fn head_answers_without_a_body() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file.txt");
        std::fs::write(&path, "hello").unwrap();

        let response = serve_file(&path, &Method::HEAD, &HeaderMap::new(), &GuessContentType, &test_uri())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::LAST_MODIFIED));
        assert!(response.headers().contains_key(header::ETAG));

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn get_streams_with_content_type() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file.txt");
        std::fs::write(&path, "hello").unwrap();

        let response = serve_file(&path, &Method::GET, &HeaderMap::new(), &GuessContentType, &test_uri())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            "text/plain"
        );
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "5");

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn unknown_type_falls_back_to_attachment() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob.qqq");
        std::fs::write(&path, "bytes").unwrap();

        let response = serve_file(&path, &Method::GET, &HeaderMap::new(), &GuessContentType, &test_uri())
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            "application/octet-stream"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION]
                .to_str()
                .unwrap(),
            "attachment; filename=\"blob.qqq\""
        );
    }

    #[tokio::test]
    async fn conditional_match_short_circuits() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("file.txt");
        std::fs::write(&path, "hello").unwrap();
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();

        let mut request_headers = HeaderMap::new();
        request_headers.insert(
            header::IF_MODIFIED_SINCE,
            HeaderValue::from_str(&httpdate::fmt_http_date(modified)).unwrap(),
        );

        let response = serve_file(&path, &Method::GET, &request_headers, &GuessContentType, &test_uri())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_a_metadata_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gone.txt");

        let result = serve_file(&path, &Method::GET, &HeaderMap::new(), &GuessContentType, &test_uri()).await;
        assert!(matches!(result, Err(ServeError::Metadata { .. })));
    }
}
