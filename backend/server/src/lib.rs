//! Documentation of the Happy Thoughts API.
//!
//! Post short messages, list the newest ones, like them and delete them.
//!
//!
//!
//! # Routes
//! - `GET /` static guide
//! - `GET /thoughts` 20 newest thoughts
//! - `POST /thoughts` new thought, `{ message, name }`
//! - `POST /thoughts/{thoughtId}/like` one more like
//! - `DELETE /thoughts/{thoughtId}/delete` remove a thought
//!
//! Every thought route answers with the same envelope.
//! ```json
//! { "success": true, "response": ..., "message": "..." }
//! ```
//! Failures set `success` to false, carry a structured `response` and an `error` string,
//! and use 400. Unknown ids on like/delete are 404.
//!
//!
//!
//! # Environment
//! - `PORT` listen port, default 8080
//! - `MONGO_URL` connection string, default `mongodb://127.0.0.1:27017/project-mongo`, `memory` for no database
//! - `RUST_LOG` log filter
//!
//!
//!
//! # Setup
//!
//! Run against a local MongoDB.
//! ```sh
//! cargo run -p thoughts
//! ```
//!
//! Run without a database.
//! ```sh
//! MONGO_URL=memory cargo run -p thoughts
//! ```
//!
//! Smoke test a running server.
//! ```sh
//! cargo run -p tester -- --base-url http://localhost:8080
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{delete, get, post},
};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod memory;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use error::StartupError;
use routes::{create_handler, delete_handler, guide_handler, like_handler, list_handler};
use state::AppState;

pub async fn start_server() -> Result<(), StartupError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await?;

    info!("Starting server...");

    let address = state.config.bind_address();
    let app = app(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(guide_handler))
        .route("/thoughts", get(list_handler).post(create_handler))
        .route("/thoughts/{thought_id}/like", post(like_handler))
        .route("/thoughts/{thought_id}/delete", delete(delete_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            return std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
