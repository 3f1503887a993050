use askama::Template;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::db::models::Question;
use crate::db::questions;
use crate::error::AppResult;
use crate::extractors::{CurrentUser, Flash};
use crate::routes::home::{Html, Layout};
use crate::state::AppState;

const SEARCH_LIMIT: i64 = 50;

#[derive(Template)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub layout: Layout,
    pub term: String,
    pub results: Vec<Question>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

/// GET /search?q= — questions whose text contains the term.
pub async fn search(
    State(state): State<AppState>,
    user: CurrentUser,
    flash: Flash,
    Query(query): Query<SearchQuery>,
) -> AppResult<Response> {
    let term = query.q.trim().to_string();
    let results = if term.is_empty() {
        Vec::new()
    } else {
        let conn = state.db.get()?;
        questions::search(&conn, &term, SEARCH_LIMIT)?
    };

    Ok(Html(SearchTemplate {
        layout: Layout::new(&user, flash),
        term,
        results,
    })
    .into_response())
}
