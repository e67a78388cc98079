use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("path resolves outside the served root")]
    OutsideRoot,

    #[error("method {method} not supported for {resource}")]
    MethodNotAllowed { method: String, resource: String },

    #[error("failed to read metadata for {path}")]
    Metadata {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template '{template}' failed to render: {reason}")]
    Template { template: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        // Responses stay body-less: a rejected path and a missing one are
        // indistinguishable to the client. The distinction lives in the logs.
        let status = match &self {
            ServeError::NotFound(_) | ServeError::OutsideRoot => StatusCode::NOT_FOUND,
            ServeError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ServeError::Metadata { .. } | ServeError::Template { .. } | ServeError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        status.into_response()
    }
}
