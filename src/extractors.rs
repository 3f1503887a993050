use std::convert::Infallible;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use rusqlite::Connection;

use crate::auth::session;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Represents the currently authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Session token the user authenticated with.
    pub token: String,
}

/// The raw session cookie, if any. Never rejects.
pub struct SessionToken(pub Option<String>);

impl FromRequestParts<AppState> for SessionToken {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(SessionToken(
            session::cookie_value(&parts.headers, &state.config.auth.cookie_name)
                .map(str::to_string),
        ))
    }
}

/// Guard for routes that require a login. Redirects to `/login` otherwise.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.ok_or(AppError::LoginRequired)
    }
}

/// Optional user extractor, returns None instead of redirecting.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session::cookie_value(&parts.headers, &state.config.auth.cookie_name)
        else {
            return Ok(MaybeUser(None));
        };

        let conn = state.db.get()?;
        Ok(MaybeUser(session::find_user(&conn, token)?))
    }
}

/// Guard for login and registration pages. Logged-in visitors are sent home.
pub struct Anonymous;

impl FromRequestParts<AppState> for Anonymous {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(_)) => Err(AppError::AnonymousOnly),
            MaybeUser(None) => Ok(Anonymous),
        }
    }
}

/// The pending flash message. Extracting it clears it, so only use this on
/// handlers that always render a page. Handlers that may redirect or 404
/// call [`Flash::take`] once they know they are rendering.
pub struct Flash(pub Option<String>);

impl Flash {
    pub fn take(conn: &Connection, token: &str) -> AppResult<Self> {
        Ok(Flash(session::take_flash(conn, token)?))
    }
}

impl FromRequestParts<AppState> for Flash {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session::cookie_value(&parts.headers, &state.config.auth.cookie_name)
        else {
            return Ok(Flash(None));
        };

        let conn = state.db.get()?;
        Flash::take(&conn, token)
    }
}

/// Numeric `{id}` path segment. Anything unparsable is a missing page.
pub struct PathId(pub i64);

impl FromRequestParts<AppState> for PathId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;
        Ok(PathId(id))
    }
}
