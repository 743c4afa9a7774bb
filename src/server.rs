use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::{create_pool, migrations, DbPool};
use crate::handlers;
use crate::state::AppState;

/// Assemble the development category API over an existing pool. The pool
/// must already be migrated.
pub fn build_router(db: DbPool) -> (AppState, Router) {
    let state = AppState::new(db);

    let app = Router::new()
        .merge(handlers::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (state, app)
}

/// Build the application state and Axum router from a [`Config`].
///
/// Opens the server database, runs migrations and returns the shared state
/// with a ready-to-serve router.
pub fn build_app(config: &Config) -> Result<(AppState, Router), Box<dyn std::error::Error>> {
    let db = create_pool(&config.server_database_path)?;

    {
        let conn = db.get()?;
        migrations::run_migrations(&conn)?;
    }

    Ok(build_router(db))
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the actual port the server bound to (useful when `port` is 0 for
/// OS-assigned ports) and a [`JoinHandle`] for the server task.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Category server stopped");
        }
    });

    Ok((actual_port, handle))
}
