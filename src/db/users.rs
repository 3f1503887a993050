use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::{Credentials, User};
use crate::db::query_with_params;

pub const DEFAULT_ABOUT: &str = "Anonymous";

pub fn email_exists(conn: &Connection, email: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )
}

/// Insert a new user with the default About text and return its id.
pub fn insert(
    conn: &Connection,
    name: &str,
    email: &str,
    password_hash: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (name, email, password, about) VALUES (?1, ?2, ?3, ?4)",
        params![name, email, password_hash, DEFAULT_ABOUT],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_credentials(conn: &Connection, email: &str) -> rusqlite::Result<Option<Credentials>> {
    conn.query_row(
        "SELECT id, password FROM users WHERE email = ?1",
        params![email],
        |row| {
            Ok(Credentials {
                id: row.get(0)?,
                password_hash: row.get(1)?,
            })
        },
    )
    .optional()
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS),
        params![id],
        User::from_row,
    )
    .optional()
}

/// Most recently registered users, for the home page sidebar.
pub fn newest(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<User>> {
    query_with_params(
        conn,
        &format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id DESC LIMIT ?1",
            User::COLUMNS
        ),
        params![limit],
        User::from_row,
    )
}

/// Sum of likes across every post the user wrote.
pub fn total_likes(conn: &Connection, user_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COALESCE(SUM(likes), 0) FROM posts WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

/// Update name and About, and copy both onto the user's denormalized rows.
/// Comments keep the name they were written under.
pub fn update_profile(
    conn: &mut Connection,
    user_id: i64,
    name: &str,
    about: &str,
) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE users SET name = ?1, about = ?2 WHERE id = ?3",
        params![name, about, user_id],
    )?;
    tx.execute(
        "UPDATE posts SET name = ?1, about = ?2 WHERE user_id = ?3",
        params![name, about, user_id],
    )?;
    tx.execute(
        "UPDATE questions SET name = ?1 WHERE user_id = ?2",
        params![name, user_id],
    )?;
    tx.commit()
}
