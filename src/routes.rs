use axum::{
    routing::{any, get},
    Router,
};

use crate::config::Config;
use crate::handlers;
use crate::AppState;

/// Create the resource routes under the configured mount path.
///
/// The bare mount, its trailing-slash form and everything below it all land
/// in the same handler; method dispatch happens there.
pub fn resource_routes(config: &Config) -> Router<AppState> {
    let mount = config.mount();
    let router = Router::new().route("/health", get(handlers::health));

    if mount.is_empty() {
        router
            .route("/", any(handlers::handle_resource))
            .route("/*path", any(handlers::handle_resource))
    } else {
        router
            .route(&mount, any(handlers::handle_resource))
            .route(&format!("{mount}/"), any(handlers::handle_resource))
            .route(&format!("{mount}/*path"), any(handlers::handle_resource))
    }
}
