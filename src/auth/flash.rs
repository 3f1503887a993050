use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use rusqlite::Connection;

use crate::auth::session;
use crate::config::AuthConfig;
use crate::error::AppResult;

/// Redirect to `to`, leaving `message` for the next rendered page.
///
/// Visitors without a live session get an anonymous one so the message has
/// somewhere to live.
pub fn redirect_with_flash(
    conn: &Connection,
    auth: &AuthConfig,
    token: Option<&str>,
    message: &str,
    to: &str,
) -> AppResult<Response> {
    if let Some(token) = token {
        if session::set_flash(conn, token, message)? {
            return Ok(Redirect::to(to).into_response());
        }
    }

    let token = session::create_session(conn, None, Some(message), auth.session_hours)?;
    Ok((
        [(
            header::SET_COOKIE,
            session::session_cookie(&auth.cookie_name, &token, auth.session_hours),
        )],
        Redirect::to(to),
    )
        .into_response())
}

/// Log `user_id` in: replace whatever session the visitor had with a fresh
/// one and redirect home, optionally with a flash message.
pub fn start_session(
    conn: &Connection,
    auth: &AuthConfig,
    old_token: Option<&str>,
    user_id: i64,
    message: Option<&str>,
) -> AppResult<Response> {
    if let Some(old) = old_token {
        session::delete_session(conn, old)?;
    }

    let token = session::create_session(conn, Some(user_id), message, auth.session_hours)?;
    Ok((
        [(
            header::SET_COOKIE,
            session::session_cookie(&auth.cookie_name, &token, auth.session_hours),
        )],
        Redirect::to("/"),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, users};
    use axum::http::StatusCode;

    fn set_cookie_token(response: &Response) -> Option<String> {
        let value = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
        let pair = value.split(';').next()?;
        pair.split_once('=').map(|(_, v)| v.to_string())
    }

    #[test]
    fn flash_reuses_live_session() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let auth = AuthConfig::default();
        let token = session::create_session(&conn, None, None, 24).unwrap();

        let response =
            redirect_with_flash(&conn, &auth, Some(&token), "Email in use", "/register").unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(set_cookie_token(&response).is_none());
        assert_eq!(
            session::take_flash(&conn, &token).unwrap().as_deref(),
            Some("Email in use")
        );
    }

    #[test]
    fn flash_creates_anonymous_session_when_needed() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let auth = AuthConfig::default();

        let response = redirect_with_flash(&conn, &auth, None, "Incorrect email", "/login").unwrap();
        let token = set_cookie_token(&response).unwrap();
        assert_eq!(
            session::take_flash(&conn, &token).unwrap().as_deref(),
            Some("Incorrect email")
        );
    }

    #[test]
    fn start_session_rotates_token() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let auth = AuthConfig::default();
        let id = users::insert(&conn, "Alice", "a@x.com", "h").unwrap();
        let old = session::create_session(&conn, None, None, 24).unwrap();

        let response = start_session(&conn, &auth, Some(&old), id, Some("Welcome")).unwrap();
        let new = set_cookie_token(&response).unwrap();

        assert_ne!(old, new);
        assert!(!session::set_flash(&conn, &old, "x").unwrap());
        assert_eq!(session::find_user(&conn, &new).unwrap().unwrap().id, id);
        assert_eq!(
            session::take_flash(&conn, &new).unwrap().as_deref(),
            Some("Welcome")
        );
    }
}
