//! Form handling service for the Yatim's Light site: validates contact and
//! story submissions and hands accepted ones to a pluggable effect.

pub mod config;
pub mod database;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod submission;
pub mod validation;

pub use crate::config::AppConfig;
pub use database::{get_database_pool, run_migrations, DatabaseManager};
pub use error::{AppError, Result};
pub use handlers::routes::create_routes;
pub use middleware::rate_limit::RateLimiter;
pub use models::{ContactRequest, ContactSubmission, StoryRequest, StorySubmission, SubmissionOutcome};
pub use submission::{EffectError, Notifier, SqliteInbox, StoryStorage, SubmissionHandler};
pub use validation::{FieldErrors, FormSchema};

use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub submissions: SubmissionHandler,
    pub database: Option<DatabaseManager>,
}

impl AppState {
    pub fn new(submissions: SubmissionHandler) -> Self {
        Self {
            app_name: "Yatim's Light Forms".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            submissions,
            database: None,
        }
    }

    pub fn with_database(mut self, database: DatabaseManager) -> Self {
        self.database = Some(database);
        self
    }

    /// Picks the effects from configuration: SQLite when a database URL is
    /// set, logging with simulated latency otherwise.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let submissions_config = &config.submissions;

        let (handler, database) = if config.database.url.is_empty() {
            info!("No database configured, submissions will only be logged");
            (SubmissionHandler::logging(submissions_config.simulated_latency()), None)
        } else {
            let pool = get_database_pool(&config.database.url, config.database.max_connections).await?;
            run_migrations(pool.clone()).await?;

            let inbox = Arc::new(SqliteInbox::new(pool.clone()));
            info!("Submissions will be stored in {}", config.database.url);
            (
                SubmissionHandler::new(inbox.clone(), inbox),
                Some(DatabaseManager::new(pool)),
            )
        };

        let handler = match submissions_config.effect_timeout() {
            Some(timeout) => handler.with_effect_timeout(timeout),
            None => handler,
        };

        let state = Self::new(handler);
        Ok(match database {
            Some(database) => state.with_database(database),
            None => state,
        })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SubmissionHandler::default())
    }
}

pub fn create_app_with_config(state: AppState, config: &AppConfig) -> Router {
    let rate_limiter = config
        .rate_limit
        .enable
        .then(|| RateLimiter::new(&config.rate_limit));

    if let Some(limiter) = &rate_limiter {
        spawn_rate_limit_pruning(limiter.clone(), config.rate_limit.window_seconds);
    }

    let router = create_routes(rate_limiter)
        .layer(middleware::cors::cors_layer_from_config(&config.cors));

    middleware::logging::with_request_tracing(router).with_state(state)
}

fn spawn_rate_limit_pruning(limiter: RateLimiter, window_seconds: u64) {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        return;
    };

    runtime.spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(window_seconds.max(1)));
        loop {
            interval.tick().await;
            limiter.prune();
        }
    });
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let app = app.into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
