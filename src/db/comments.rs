use rusqlite::{params, Connection};

use crate::db::models::Comment;
use crate::db::query_with_params;

/// Comments are append-only: there is no update or delete.
pub fn insert(
    conn: &Connection,
    post_id: i64,
    user_id: i64,
    name: &str,
    text: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO comments (post_id, comment, user_id, name) VALUES (?1, ?2, ?3, ?4)",
        params![post_id, text, user_id, name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn for_post(conn: &Connection, post_id: i64) -> rusqlite::Result<Vec<Comment>> {
    query_with_params(
        conn,
        &format!(
            "SELECT {} FROM comments WHERE post_id = ?1 ORDER BY created_at ASC, id ASC",
            Comment::COLUMNS
        ),
        params![post_id],
        Comment::from_row,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{posts, questions, test_pool, users};

    #[test]
    fn comments_come_back_in_order() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let alice = users::insert(&conn, "Alice", "a@x.com", "h").unwrap();
        let q = questions::insert(&conn, alice, "Alice", "Why?").unwrap();
        let post = posts::create(&mut conn, alice, q, "Because").unwrap();

        insert(&conn, post, alice, "Alice", "first").unwrap();
        insert(&conn, post, alice, "Alice", "second").unwrap();

        let comments = for_post(&conn, post).unwrap();
        let texts: Vec<&str> = comments.iter().map(|c| c.comment.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(comments[0].name, "Alice");
    }

    #[test]
    fn comment_on_missing_post_fails() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = users::insert(&conn, "Alice", "a@x.com", "h").unwrap();
        assert!(insert(&conn, 42, alice, "Alice", "hello?").is_err());
    }
}
