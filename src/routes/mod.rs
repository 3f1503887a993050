pub mod assets;
pub mod auth;
pub mod home;
pub mod posts;
pub mod profile;
pub mod questions;
pub mod search;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full application: every page, the asset route, and the 404 fallback.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/assets/{*path}", get(assets::serve))
        .merge(auth::router())
        .merge(questions::router())
        .merge(posts::router())
        .merge(profile::router())
        .merge(search::router())
        .fallback(home::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
