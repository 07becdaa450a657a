//! HTTP front of the punch state machine.

pub mod handlers;

use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use axum::Router;
use axum::routing::{get, post};
use std::future::Future;
use std::sync::Arc;

/// Shared by every request; each request opens its own connection.
#[derive(Clone)]
pub struct AppState {
    pub db_path: Arc<String>,
    pub api_token: Arc<String>,
}

impl AppState {
    pub fn new(db_path: &str, api_token: &str) -> Self {
        Self {
            db_path: Arc::new(db_path.to_string()),
            api_token: Arc::new(api_token.to_string()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/time-in", post(handlers::time_in))
        .route("/time-out", post(handlers::time_out))
        .route("/status/:worker_id", get(handlers::status))
        .route("/presence", post(handlers::set_presence))
        .route("/presence/:worker_id", get(handlers::presence))
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_listener<F>(
    listener: std::net::TcpListener,
    state: AppState,
    shutdown: F,
) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    listener.set_nonblocking(true)?;
    let listener = tokio::net::TcpListener::from_std(listener)?;
    log::info!("punch server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Blocking entry point used by `rpunch serve`: migrate, bind, run until Ctrl-C.
pub fn serve(bind: &str, db_path: &str, api_token: &str) -> AppResult<()> {
    {
        let pool = DbPool::new(db_path)?;
        init_db(&pool.conn)?;
    }

    if api_token.is_empty() {
        log::warn!("api_token is empty: requests are not authenticated");
    }

    let listener = std::net::TcpListener::bind(bind)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(serve_listener(
        listener,
        AppState::new(db_path, api_token),
        async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("shutdown requested");
        },
    ))
}
