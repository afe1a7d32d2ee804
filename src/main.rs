use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::anyhow;
use axum::Router;
use clap::Parser;
use http::{header::CONTENT_TYPE, Method};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use voicebridge::{routes, ServerConfig, state::AppState};

/// voicebridge - streaming speech translation server
#[derive(Parser, Debug)]
#[command(name = "voicebridge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,

    /// Directory holding the compiled browser client (overrides CLIENT_BUILD_DIR)
    #[arg(long = "client-dir", value_name = "DIR")]
    client_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize crypto provider for TLS connections
    // This must be done before any TLS connections are attempted
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let mut config = ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(client_dir) = cli.client_dir {
        config.client_build_dir = client_dir;
    }

    let address = config.address();
    let cors_origins = config.cors_allowed_origins.clone();
    let client_dir = config.client_build_dir.clone();

    let app_state = AppState::new(config).await?;

    // Configure CORS
    let cors_layer = if let Some(ref origins) = cors_origins {
        if origins == "*" {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
                .allow_credentials(false)
        } else {
            // Parse comma-separated origins
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
                .allow_credentials(true)
        }
    } else {
        info!(
            "CORS not configured, defaulting to same-origin only. \
             Set CORS_ALLOWED_ORIGINS to enable cross-origin access."
        );
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE])
            .allow_credentials(false)
    };

    // Static browser client. Unknown paths fall through to index.html so
    // the client handles its own routing.
    let index = client_dir.join("index.html");
    let client = ServeDir::new(&client_dir).fallback(ServeFile::new(index));

    let app = Router::new()
        .merge(routes::api_routes())
        .merge(routes::ws_routes())
        .with_state(app_state)
        .fallback_service(client)
        .layer(cors_layer);

    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    info!("Server listening on http://{}", socket_addr);

    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
