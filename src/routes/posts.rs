use askama::Template;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;

use crate::auth::flash;
use crate::db::models::{Comment, Post};
use crate::db::{comments, likes, posts};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, Flash, PathId};
use crate::routes::home::{Html, Layout};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/post.html")]
pub struct PostTemplate {
    pub layout: Layout,
    pub post: Post,
    pub comments: Vec<Comment>,
    pub own: bool,
}

#[derive(Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub comment: String,
}

/// Query for the combined toggle endpoint: `lp_id` likes, `dp_id` unlikes.
#[derive(Deserialize)]
pub struct ToggleQuery {
    pub lp_id: Option<i64>,
    pub dp_id: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/{id}", get(show))
        .route("/posts/{id}/comments", post(comment))
        .route("/posts/{id}/like", post(like))
        .route("/posts/{id}/unlike", post(unlike))
        .route("/posts/{id}/delete", post(delete))
        .route("/like", post(toggle))
}

/// GET /posts/{id} — one answer with its comments.
pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(post_id): PathId,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let post = posts::find(&conn, post_id, user.id)?.ok_or(AppError::NotFound)?;
    let comments = comments::for_post(&conn, post_id)?;
    let own = post.user_id == user.id;
    let flash = Flash::take(&conn, &user.token)?;

    Ok(Html(PostTemplate {
        layout: Layout::new(&user, flash),
        post,
        comments,
        own,
    })
    .into_response())
}

/// POST /posts/{id}/comments — append a comment. Empty comments are dropped.
pub async fn comment(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(post_id): PathId,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    posts::find(&conn, post_id, user.id)?.ok_or(AppError::NotFound)?;

    let text = form.comment.trim();
    if !text.is_empty() {
        let comment_id = comments::insert(&conn, post_id, user.id, &user.name, text)?;
        tracing::info!(user_id = user.id, post_id, comment_id, "Comment added");
    }

    Ok(Redirect::to(&format!("/posts/{}#comments", post_id)).into_response())
}

/// POST /posts/{id}/like — 200 with the recomputed count.
pub async fn like(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(post_id): PathId,
) -> AppResult<Response> {
    like_post(&state, &user, post_id)
}

/// POST /posts/{id}/unlike — 204.
pub async fn unlike(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(post_id): PathId,
) -> AppResult<Response> {
    unlike_post(&state, &user, post_id)
}

/// POST /like?lp_id= or ?dp_id= — the single toggle endpoint older pages use.
pub async fn toggle(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ToggleQuery>,
) -> AppResult<Response> {
    match (query.lp_id, query.dp_id) {
        (Some(post_id), _) => like_post(&state, &user, post_id),
        (None, Some(post_id)) => unlike_post(&state, &user, post_id),
        (None, None) => Err(AppError::BadRequest("lp_id or dp_id is required".into())),
    }
}

fn like_post(state: &AppState, user: &CurrentUser, post_id: i64) -> AppResult<Response> {
    let conn = state.db.get()?;
    posts::find(&conn, post_id, user.id)?.ok_or(AppError::NotFound)?;

    let count = likes::like(&conn, post_id, user.id)?;
    tracing::debug!(user_id = user.id, post_id, count, "Post liked");
    Ok((StatusCode::OK, Json(serde_json::json!({ "likes": count }))).into_response())
}

fn unlike_post(state: &AppState, user: &CurrentUser, post_id: i64) -> AppResult<Response> {
    let conn = state.db.get()?;
    posts::find(&conn, post_id, user.id)?.ok_or(AppError::NotFound)?;

    let count = likes::unlike(&conn, post_id, user.id)?;
    tracing::debug!(user_id = user.id, post_id, count, "Post unliked");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// POST /posts/{id}/delete — owners only; anyone else is quietly sent back.
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(post_id): PathId,
) -> AppResult<Response> {
    let mut conn = state.db.get()?;
    if !posts::delete_owned(&mut conn, post_id, user.id)? {
        tracing::warn!(user_id = user.id, post_id, "Refused to delete post");
        return Ok(Redirect::to("/profile").into_response());
    }

    tracing::info!(user_id = user.id, post_id, "Post deleted");
    flash::redirect_with_flash(
        &conn,
        &state.config.auth,
        Some(&user.token),
        "Your answer has been deleted",
        "/profile",
    )
}
