use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::Question;
use crate::db::query_with_params;

pub fn insert(conn: &Connection, user_id: i64, name: &str, text: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO questions (question, user_id, name) VALUES (?1, ?2, ?3)",
        params![text, user_id, name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Question>> {
    conn.query_row(
        &format!("SELECT {} FROM questions WHERE id = ?1", Question::COLUMNS),
        params![id],
        Question::from_row,
    )
    .optional()
}

/// Questions waiting for answers: unanswered first, then newest first.
pub fn to_answer(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<Question>> {
    query_with_params(
        conn,
        &format!(
            "SELECT {} FROM questions ORDER BY answered ASC, created_at DESC, id DESC LIMIT ?1",
            Question::COLUMNS
        ),
        params![limit],
        Question::from_row,
    )
}

pub fn by_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Question>> {
    query_with_params(
        conn,
        &format!(
            "SELECT {} FROM questions WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            Question::COLUMNS
        ),
        params![user_id],
        Question::from_row,
    )
}

/// Substring search over question text, answered questions first.
///
/// The term is bound as a parameter; `%` and `_` in user input match literally.
pub fn search(conn: &Connection, term: &str, limit: i64) -> rusqlite::Result<Vec<Question>> {
    let pattern = format!("%{}%", escape_like(term));
    query_with_params(
        conn,
        &format!(
            "SELECT {} FROM questions WHERE question LIKE ?1 ESCAPE '\\' \
             ORDER BY answered DESC, created_at DESC, id DESC LIMIT ?2",
            Question::COLUMNS
        ),
        params![pattern, limit],
        Question::from_row,
    )
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Delete a question owned by `user_id`. Its posts, their comments and likes
/// go with it through `ON DELETE CASCADE`. Returns false when the question
/// does not exist or belongs to someone else.
pub fn delete_owned(conn: &mut Connection, question_id: i64, user_id: i64) -> rusqlite::Result<bool> {
    let tx = conn.transaction()?;
    let owner: Option<i64> = tx
        .query_row(
            "SELECT user_id FROM questions WHERE id = ?1",
            params![question_id],
            |row| row.get(0),
        )
        .optional()?;

    if owner != Some(user_id) {
        return Ok(false);
    }

    tx.execute("DELETE FROM questions WHERE id = ?1", params![question_id])?;
    tx.commit()?;
    Ok(true)
}
