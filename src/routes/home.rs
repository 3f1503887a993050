use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::db::models::{Post, User};
use crate::db::{posts, users};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, Flash};
use crate::state::AppState;

const FEED_LIMIT: i64 = 20;
const TRENDING_LIMIT: i64 = 5;
const PEOPLE_LIMIT: i64 = 5;

/// Values every page's layout needs: who is looking and any pending flash.
#[derive(Debug, Default)]
pub struct Layout {
    pub viewer: Option<String>,
    pub flash: Option<String>,
}

impl Layout {
    pub fn new(user: &CurrentUser, Flash(flash): Flash) -> Self {
        Self {
            viewer: Some(user.name.clone()),
            flash,
        }
    }

    pub fn with_flash(user: &CurrentUser, flash: impl Into<String>) -> Self {
        Self {
            viewer: Some(user.name.clone()),
            flash: Some(flash.into()),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub posts: Vec<Post>,
    pub trending: Vec<Post>,
    pub people: Vec<User>,
}

#[derive(Template)]
#[template(path = "pages/404.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// GET / — the feed of recent answers.
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    flash: Flash,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let posts = posts::feed(&conn, user.id, FEED_LIMIT)?;
    let trending = posts::trending(&conn, user.id, TRENDING_LIMIT)?;
    let people = users::newest(&conn, PEOPLE_LIMIT)?;

    Ok(Html(HomeTemplate {
        layout: Layout::new(&user, flash),
        posts,
        trending,
        people,
    })
    .into_response())
}

/// Fallback for unmatched paths. The login guard runs first, so anonymous
/// visitors are sent to `/login` instead.
pub async fn not_found(user: CurrentUser) -> Response {
    let page = Html(NotFoundTemplate {
        layout: Layout {
            viewer: Some(user.name),
            flash: None,
        },
    });
    (StatusCode::NOT_FOUND, page).into_response()
}
