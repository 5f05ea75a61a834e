pub mod config;
pub mod db;
pub mod entries;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::{DatabaseProxy, DbInitError};
use crate::state::AppState;

/// Connects the document store and builds the full application.
pub async fn create_app(config: &Config) -> Result<(axum::Router, AppState), DbInitError> {
    let db_proxy = DatabaseProxy::connect(config.db.clone()).await?;
    let state = AppState::new(db_proxy, config.entry_schema, config.max_page_limit);
    Ok((build_app(state.clone()), state))
}

pub fn build_app(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(middleware::catch_panic_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
