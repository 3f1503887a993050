use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::flash;
use crate::db::models::{Post, Question, User};
use crate::db::{posts, questions, users};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, Flash, PathId};
use crate::routes::home::{Html, Layout};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub user: User,
    pub questions: Vec<Question>,
    pub posts: Vec<Post>,
    pub total_likes: i64,
    /// Viewing your own profile: show the edit form and delete buttons.
    pub own: bool,
}

#[derive(Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub about: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(own_profile).post(update_profile))
        .route("/users/{id}", get(public_profile))
        .route("/questions/{id}/delete", post(delete_question))
}

fn load_profile(state: &AppState, viewer: &CurrentUser, user_id: i64) -> AppResult<Response> {
    let conn = state.db.get()?;
    let user = users::find(&conn, user_id)?.ok_or(AppError::NotFound)?;
    let questions = questions::by_user(&conn, user_id)?;
    let posts = posts::by_user(&conn, user_id, viewer.id)?;
    let total_likes = users::total_likes(&conn, user_id)?;
    let flash = Flash::take(&conn, &viewer.token)?;

    Ok(Html(ProfileTemplate {
        layout: Layout::new(viewer, flash),
        own: user.id == viewer.id,
        user,
        questions,
        posts,
        total_likes,
    })
    .into_response())
}

/// GET /profile
pub async fn own_profile(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    load_profile(&state, &user, user.id)
}

/// GET /users/{id} — someone else's profile. Your own id goes to `/profile`.
pub async fn public_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(user_id): PathId,
) -> AppResult<Response> {
    if user_id == user.id {
        return Ok(Redirect::to("/profile").into_response());
    }
    load_profile(&state, &user, user_id)
}

/// POST /profile — change name and About.
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    let mut conn = state.db.get()?;
    let auth = &state.config.auth;

    let name = form.name.trim();
    if name.is_empty() {
        return flash::redirect_with_flash(
            &conn,
            auth,
            Some(&user.token),
            "Your name can't be empty",
            "/profile",
        );
    }
    let about = match form.about.trim() {
        "" => users::DEFAULT_ABOUT,
        about => about,
    };

    users::update_profile(&mut conn, user.id, name, about)?;
    tracing::info!(user_id = user.id, "Profile updated");

    flash::redirect_with_flash(&conn, auth, Some(&user.token), "Profile updated", "/profile")
}

/// POST /questions/{id}/delete — owners only; removes the question's answers too.
pub async fn delete_question(
    State(state): State<AppState>,
    user: CurrentUser,
    PathId(question_id): PathId,
) -> AppResult<Response> {
    let mut conn = state.db.get()?;
    if !questions::delete_owned(&mut conn, question_id, user.id)? {
        tracing::warn!(user_id = user.id, question_id, "Refused to delete question");
        return Ok(Redirect::to("/profile").into_response());
    }

    tracing::info!(user_id = user.id, question_id, "Question deleted");
    flash::redirect_with_flash(
        &conn,
        &state.config.auth,
        Some(&user.token),
        "Your question has been deleted",
        "/profile",
    )
}
