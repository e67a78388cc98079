use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dirserve::{routes, AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "dirserve")]
#[command(about = "Directory resource server with listings and cache validation")]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "DIRSERVE_PORT", default_value = "8080")]
    port: u16,

    /// Address to bind to
    #[arg(short, long, env = "DIRSERVE_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Root directory to serve
    #[arg(short, long, env = "DIRSERVE_ROOT", default_value = ".")]
    root: PathBuf,

    /// URL prefix to expose the tree under (e.g. /files)
    #[arg(short, long, env = "DIRSERVE_MOUNT")]
    mount: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, env = "DIRSERVE_VERBOSE")]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long, env = "DIRSERVE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "dirserve=debug,tower_http=debug"
    } else {
        "dirserve=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config from file if provided, otherwise use defaults
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    if let Some(mount) = &cli.mount {
        config.mount_path = mount.clone();
    }

    // The binary ships no template engine; embedders install one via AppState
    if config.listing_template.is_some() {
        warn!("listing_template is set but no template engine is installed; using generated listings");
    }

    // Resolve root directory to absolute path
    let root_dir = cli.root.canonicalize().unwrap_or_else(|_| cli.root.clone());

    if !root_dir.exists() {
        return Err(format!("Root directory does not exist: {}", root_dir.display()).into());
    }

    if !root_dir.is_dir() {
        return Err(format!("Root path is not a directory: {}", root_dir.display()).into());
    }

    info!("Serving directory tree from: {}", root_dir.display());
    if !config.mount().is_empty() {
        info!("Mounted under: {}", config.mount());
    }

    let state = AppState::with_config(root_dir, config);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .merge(routes::resource_routes(&state.config))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;
    info!("Starting dirserve on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
