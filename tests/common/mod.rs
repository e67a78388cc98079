//! Test utilities and common setup.

use std::path::Path;

use axum::Router;
use dirserve::{routes, AppState, Config};
use tempfile::TempDir;

/// Builds the fixture tree used by the resource tests:
///
/// ```text
/// root/
///   hello.txt        "hello world"
///   B.txt            "bbb"
///   docs/
///     guide.txt      "guide"
///   site/
///     index.html     "<h1>welcome html</h1>"
///     index.htm      "<h1>welcome htm</h1>"
/// ```
pub fn sample_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("hello.txt"), "hello world").unwrap();
    std::fs::write(temp.path().join("B.txt"), "bbb").unwrap();
    std::fs::create_dir(temp.path().join("docs")).unwrap();
    std::fs::write(temp.path().join("docs/guide.txt"), "guide").unwrap();
    std::fs::create_dir(temp.path().join("site")).unwrap();
    std::fs::write(temp.path().join("site/index.html"), "<h1>welcome html</h1>").unwrap();
    std::fs::write(temp.path().join("site/index.htm"), "<h1>welcome htm</h1>").unwrap();
    temp
}

/// Router over `root` with the given config and no template engine.
pub fn test_app(root: &Path, config: Config) -> Router {
    app_for(AppState::with_config(root.canonicalize().unwrap(), config))
}

pub fn app_for(state: AppState) -> Router {
    Router::new()
        .merge(routes::resource_routes(&state.config))
        .with_state(state)
}
