//! `LasermazeServer` builder and server loop.
//!
//! This is the entry point for running the game server. It ties
//! together all the layers: HTTP API → real-time channel → mission
//! engine → leaderboard, plus the optional serial sensor bridge.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use lasermaze_board::Leaderboard;
use lasermaze_channel::InterruptHub;
use lasermaze_mission::MissionConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{api, bridge, ws, AppState, ServerError};

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: String,
    /// Path of the leaderboard JSON file.
    pub data_file: String,
    /// Directory served as the front-end.
    pub static_dir: String,
    /// Serial device carrying sensor lines, e.g. `/dev/ttyUSB0`. The
    /// server runs without one; interrupts then come only from the test
    /// endpoint.
    pub serial_port: Option<String>,
}

impl ServerConfig {
    /// Reads `PORT`, `SERIAL_PORT`, `LASERMAZE_DATA` and
    /// `LASERMAZE_STATIC` from the environment, with defaults matching a
    /// local checkout.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        Self {
            bind_addr: format!("0.0.0.0:{port}"),
            data_file: std::env::var("LASERMAZE_DATA")
                .unwrap_or_else(|_| "data/leaderboard.json".to_owned()),
            static_dir: std::env::var("LASERMAZE_STATIC")
                .unwrap_or_else(|_| "public".to_owned()),
            serial_port: std::env::var("SERIAL_PORT").ok(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_owned(),
            data_file: "data/leaderboard.json".to_owned(),
            static_dir: "public".to_owned(),
            serial_port: None,
        }
    }
}

/// Builder for configuring and starting a LaserMaze server.
///
/// # Example
///
/// ```rust,ignore
/// let server = LasermazeServer::builder()
///     .bind("0.0.0.0:3000")
///     .data_file("data/leaderboard.json")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct LasermazeServerBuilder {
    config: ServerConfig,
    mission_config: MissionConfig,
}

impl LasermazeServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            mission_config: MissionConfig::default(),
        }
    }

    /// Starts from a full [`ServerConfig`] (usually `from_env`).
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_owned();
        self
    }

    /// Sets the leaderboard JSON file path.
    pub fn data_file(mut self, path: &str) -> Self {
        self.config.data_file = path.to_owned();
        self
    }

    /// Sets the static front-end directory.
    pub fn static_dir(mut self, dir: &str) -> Self {
        self.config.static_dir = dir.to_owned();
        self
    }

    /// Sets the serial device to bridge sensor lines from.
    pub fn serial_port(mut self, device: &str) -> Self {
        self.config.serial_port = Some(device.to_owned());
        self
    }

    /// Overrides the mission timing parameters.
    pub fn mission_config(mut self, config: MissionConfig) -> Self {
        self.mission_config = config;
        self
    }

    /// Opens the leaderboard, binds the listener, and assembles the
    /// router.
    pub async fn build(self) -> Result<LasermazeServer, ServerError> {
        let board = Arc::new(Leaderboard::open(&self.config.data_file).await?);
        let listener = TcpListener::bind(&self.config.bind_addr).await?;

        let state = AppState {
            board,
            hub: InterruptHub::default(),
            mission_config: self.mission_config.validated(),
        };

        let router = Router::new()
            .route(
                "/api/leaderboard",
                get(api::list_entries).post(api::create_entry),
            )
            .route(
                "/api/leaderboard/{id}",
                put(api::update_entry).delete(api::delete_entry),
            )
            .route("/api/test-interrupt", post(api::test_interrupt))
            .route("/ws", get(ws::ws_handler))
            .fallback_service(ServeDir::new(&self.config.static_dir))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        Ok(LasermazeServer {
            listener,
            router,
            state,
            serial_port: self.config.serial_port,
        })
    }
}

impl Default for LasermazeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built LaserMaze server, ready to run.
pub struct LasermazeServer {
    listener: TcpListener,
    router: Router,
    state: AppState,
    serial_port: Option<String>,
}

impl LasermazeServer {
    pub fn builder() -> LasermazeServerBuilder {
        LasermazeServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server until the process is terminated.
    ///
    /// If a serial device is configured, the sensor bridge runs as a
    /// background task; losing it never takes the server down.
    pub async fn run(self) -> Result<(), ServerError> {
        if let Some(device) = self.serial_port {
            let hub = self.state.hub.clone();
            tokio::spawn(bridge::run(device, hub));
        }

        info!("lasermaze server running");
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
