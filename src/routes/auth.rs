use askama::Template;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::{flash, password, session};
use crate::db::users;
use crate::error::AppResult;
use crate::extractors::{Anonymous, CurrentUser, Flash, SessionToken};
use crate::routes::home::{Html, Layout};
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "pages/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
}

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout).post(logout))
}

fn anonymous_layout(Flash(flash): Flash) -> Layout {
    Layout {
        viewer: None,
        flash,
    }
}

/// GET /register
pub async fn register_page(_anon: Anonymous, flash: Flash) -> Response {
    Html(RegisterTemplate {
        layout: anonymous_layout(flash),
    })
    .into_response()
}

/// POST /register — create an account and log it in.
pub async fn register(
    State(state): State<AppState>,
    _anon: Anonymous,
    SessionToken(token): SessionToken,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let auth = &state.config.auth;
    let name = form.name.trim();
    let email = form.email.trim();

    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        let conn = state.db.get()?;
        return flash::redirect_with_flash(
            &conn,
            auth,
            token.as_deref(),
            "Please fill in every field",
            "/register",
        );
    }

    let hashed = match password::hash(form.password.clone(), auth.bcrypt_cost).await {
        Ok(hashed) => hashed,
        Err(e) => {
            tracing::error!("Registration failed while hashing: {}", e);
            return Ok(Redirect::to("/register").into_response());
        }
    };

    let conn = state.db.get()?;
    if users::email_exists(&conn, email)? {
        tracing::info!("Registration refused, email already in use");
        return flash::redirect_with_flash(
            &conn,
            auth,
            token.as_deref(),
            "That email is already in use",
            "/register",
        );
    }

    let user_id = match users::insert(&conn, name, email, &hashed) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Registration failed while inserting user: {}", e);
            return Ok(Redirect::to("/register").into_response());
        }
    };

    tracing::info!(user_id, "New user registered");
    let welcome = format!("Welcome to askaround, {}!", name);
    flash::start_session(&conn, auth, token.as_deref(), user_id, Some(&welcome))
}

/// GET /login
pub async fn login_page(_anon: Anonymous, flash: Flash) -> Response {
    Html(LoginTemplate {
        layout: anonymous_layout(flash),
    })
    .into_response()
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    _anon: Anonymous,
    SessionToken(token): SessionToken,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let auth = &state.config.auth;
    let email = form.email.trim();

    let credentials = {
        let conn = state.db.get()?;
        users::find_credentials(&conn, email)?
    };

    let Some(credentials) = credentials else {
        tracing::info!("Login failed: unknown email");
        let conn = state.db.get()?;
        return flash::redirect_with_flash(
            &conn,
            auth,
            token.as_deref(),
            "Incorrect email",
            "/login",
        );
    };

    let matches = match password::verify(form.password, credentials.password_hash).await {
        Ok(matches) => matches,
        Err(e) => {
            tracing::error!(user_id = credentials.id, "Password check failed: {}", e);
            false
        }
    };

    let conn = state.db.get()?;
    if !matches {
        tracing::info!(user_id = credentials.id, "Login failed: wrong password");
        return flash::redirect_with_flash(
            &conn,
            auth,
            token.as_deref(),
            "Incorrect password",
            "/login",
        );
    }

    tracing::info!(user_id = credentials.id, "User logged in");
    flash::start_session(&conn, auth, token.as_deref(), credentials.id, None)
}

/// GET|POST /logout — destroy the whole session.
pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    let conn = state.db.get()?;
    session::delete_session(&conn, &user.token)?;
    tracing::info!(user_id = user.id, "User logged out");

    Ok((
        [(
            header::SET_COOKIE,
            session::clear_session_cookie(&state.config.auth.cookie_name),
        )],
        Redirect::to("/login"),
    )
        .into_response())
}
