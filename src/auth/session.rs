use axum::http::{header, HeaderMap};
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};

use crate::extractors::CurrentUser;

/// Create a session row and return its token. `user_id` is `None` for an
/// anonymous session that only exists to carry a flash message.
pub fn create_session(
    conn: &Connection,
    user_id: Option<i64>,
    flash: Option<&str>,
    hours: u64,
) -> Result<String, rusqlite::Error> {
    let token = generate_token();

    conn.execute(
        "INSERT INTO sessions (token, user_id, flash, expires_at)
         VALUES (?1, ?2, ?3, datetime('now', ?4))",
        params![token, user_id, flash, format!("+{} hours", hours)],
    )?;

    Ok(token)
}

/// Delete a session by token.
pub fn delete_session(conn: &Connection, token: &str) -> Result<(), rusqlite::Error> {
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Resolve a live session token to its logged-in user.
pub fn find_user(conn: &Connection, token: &str) -> Result<Option<CurrentUser>, rusqlite::Error> {
    conn.query_row(
        "SELECT u.id, u.name, u.email FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token = ?1 AND s.expires_at > datetime('now')",
        params![token],
        |row| {
            Ok(CurrentUser {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                token: token.to_string(),
            })
        },
    )
    .optional()
}

/// Attach a flash message to a live session. Returns false if the session
/// is gone or expired.
pub fn set_flash(conn: &Connection, token: &str, message: &str) -> Result<bool, rusqlite::Error> {
    let updated = conn.execute(
        "UPDATE sessions SET flash = ?2 WHERE token = ?1 AND expires_at > datetime('now')",
        params![token, message],
    )?;
    Ok(updated > 0)
}

/// Read and clear the session's flash message.
pub fn take_flash(conn: &Connection, token: &str) -> Result<Option<String>, rusqlite::Error> {
    let flash: Option<String> = conn
        .query_row(
            "SELECT flash FROM sessions WHERE token = ?1 AND expires_at > datetime('now')",
            params![token],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?
        .flatten();

    if flash.is_some() {
        conn.execute(
            "UPDATE sessions SET flash = NULL WHERE token = ?1",
            params![token],
        )?;
    }
    Ok(flash)
}

/// Drop every expired session. Returns the number removed.
pub fn purge_expired(conn: &Connection) -> Result<usize, rusqlite::Error> {
    conn.execute(
        "DELETE FROM sessions WHERE expires_at <= datetime('now')",
        [],
    )
}

pub fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name,
        token,
        max_age_hours * 3600
    )
}

pub fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name && !val.is_empty() {
                Some(val)
            } else {
                None
            }
        })
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}
