use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::Post;
use crate::db::query_with_params;

/// `liked` column for the viewer bound to `?1`.
const LIKED_BY_VIEWER: &str =
    "EXISTS(SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = ?1)";

fn select(filter: &str) -> String {
    format!(
        "SELECT {}, {} FROM posts p {}",
        Post::COLUMNS,
        LIKED_BY_VIEWER,
        filter
    )
}

/// Publish an answer to a question.
///
/// The question text, author name and author About are copied onto the post.
/// Inserting the post and marking the question answered happen in one
/// transaction so `answered`/`replies` always agree with the posts table.
pub fn create(
    conn: &mut Connection,
    author_id: i64,
    question_id: i64,
    answer: &str,
) -> rusqlite::Result<i64> {
    let tx = conn.transaction()?;

    let question: String = tx.query_row(
        "SELECT question FROM questions WHERE id = ?1",
        params![question_id],
        |row| row.get(0),
    )?;
    let (name, about): (String, String) = tx.query_row(
        "SELECT name, about FROM users WHERE id = ?1",
        params![author_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    tx.execute(
        "INSERT INTO posts (question, answer, user_id, question_id, name, about)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![question, answer, author_id, question_id, name, about],
    )?;
    let post_id = tx.last_insert_rowid();

    tx.execute(
        "UPDATE questions SET answered = 1, replies = replies + 1 WHERE id = ?1",
        params![question_id],
    )?;

    tx.commit()?;
    Ok(post_id)
}

pub fn find(conn: &Connection, post_id: i64, viewer_id: i64) -> rusqlite::Result<Option<Post>> {
    conn.query_row(
        &select("WHERE p.id = ?2"),
        params![viewer_id, post_id],
        Post::from_row,
    )
    .optional()
}

/// Newest posts across everyone, for the home feed.
pub fn feed(conn: &Connection, viewer_id: i64, limit: i64) -> rusqlite::Result<Vec<Post>> {
    query_with_params(
        conn,
        &select("ORDER BY p.created_at DESC, p.id DESC LIMIT ?2"),
        params![viewer_id, limit],
        Post::from_row,
    )
}

/// Most liked posts.
pub fn trending(conn: &Connection, viewer_id: i64, limit: i64) -> rusqlite::Result<Vec<Post>> {
    query_with_params(
        conn,
        &select("WHERE p.likes > 0 ORDER BY p.likes DESC, p.created_at DESC LIMIT ?2"),
        params![viewer_id, limit],
        Post::from_row,
    )
}

pub fn by_user(conn: &Connection, user_id: i64, viewer_id: i64) -> rusqlite::Result<Vec<Post>> {
    query_with_params(
        conn,
        &select("WHERE p.user_id = ?2 ORDER BY p.created_at DESC, p.id DESC"),
        params![viewer_id, user_id],
        Post::from_row,
    )
}

/// Delete a post owned by `user_id` and step back its question's counters.
///
/// `replies` drops by exactly one and never below zero; `answered` clears
/// once no posts remain. Returns false when the post does not exist or
/// belongs to someone else.
pub fn delete_owned(conn: &mut Connection, post_id: i64, user_id: i64) -> rusqlite::Result<bool> {
    let tx = conn.transaction()?;
    let row: Option<(i64, i64)> = tx
        .query_row(
            "SELECT user_id, question_id FROM posts WHERE id = ?1",
            params![post_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let question_id = match row {
        Some((owner, question_id)) if owner == user_id => question_id,
        _ => return Ok(false),
    };

    tx.execute(
        "UPDATE questions SET replies = MAX(replies - 1, 0) WHERE id = ?1",
        params![question_id],
    )?;
    tx.execute("DELETE FROM posts WHERE id = ?1", params![post_id])?;
    tx.execute(
        "UPDATE questions
         SET answered = EXISTS(SELECT 1 FROM posts WHERE question_id = ?1)
         WHERE id = ?1",
        params![question_id],
    )?;

    tx.commit()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{questions, test_pool, users};

    struct Fixture {
        alice: i64,
        bob: i64,
        question: i64,
    }

    fn fixture(conn: &Connection) -> Fixture {
        let alice = users::insert(conn, "Alice", "a@x.com", "h").unwrap();
        let bob = users::insert(conn, "Bob", "b@x.com", "h").unwrap();
        let question = questions::insert(conn, alice, "Alice", "What is X?").unwrap();
        Fixture {
            alice,
            bob,
            question,
        }
    }

    #[test]
    fn create_denormalizes_and_marks_answered() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let f = fixture(&conn);

        let post_id = create(&mut conn, f.bob, f.question, "X is Y").unwrap();

        let post = find(&conn, post_id, f.alice).unwrap().unwrap();
        assert_eq!(post.question, "What is X?");
        assert_eq!(post.answer, "X is Y");
        assert_eq!(post.user_id, f.bob);
        assert_eq!(post.question_id, f.question);
        assert_eq!(post.name, "Bob");
        assert_eq!(post.about, users::DEFAULT_ABOUT);
        assert_eq!(post.likes, 0);
        assert!(!post.liked);

        let question = questions::find(&conn, f.question).unwrap().unwrap();
        assert!(question.answered);
        assert_eq!(question.replies, 1);
    }

    #[test]
    fn create_for_missing_question_leaves_nothing_behind() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let f = fixture(&conn);

        assert!(create(&mut conn, f.bob, 999, "Into the void").is_err());
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM posts", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn deleting_last_post_reverts_answered() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let f = fixture(&conn);
        let post_id = create(&mut conn, f.bob, f.question, "X is Y").unwrap();

        assert!(delete_owned(&mut conn, post_id, f.bob).unwrap());

        let question = questions::find(&conn, f.question).unwrap().unwrap();
        assert!(!question.answered);
        assert_eq!(question.replies, 0);
    }

    #[test]
    fn deleting_one_of_several_posts_keeps_answered() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let f = fixture(&conn);
        let first = create(&mut conn, f.bob, f.question, "X is Y").unwrap();
        create(&mut conn, f.alice, f.question, "X is Z").unwrap();

        assert!(delete_owned(&mut conn, first, f.bob).unwrap());

        let question = questions::find(&conn, f.question).unwrap().unwrap();
        assert!(question.answered);
        assert_eq!(question.replies, 1);
    }

    #[test]
    fn replies_never_go_negative() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let f = fixture(&conn);
        let post_id = create(&mut conn, f.bob, f.question, "X is Y").unwrap();
        conn.execute("UPDATE questions SET replies = 0", []).unwrap();

        assert!(delete_owned(&mut conn, post_id, f.bob).unwrap());
        let question = questions::find(&conn, f.question).unwrap().unwrap();
        assert_eq!(question.replies, 0);
    }

    #[test]
    fn delete_by_non_owner_is_refused() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let f = fixture(&conn);
        let post_id = create(&mut conn, f.bob, f.question, "X is Y").unwrap();

        assert!(!delete_owned(&mut conn, post_id, f.alice).unwrap());
        assert!(!delete_owned(&mut conn, 12345, f.bob).unwrap());
        assert!(find(&conn, post_id, f.bob).unwrap().is_some());
    }

    #[test]
    fn feed_lists_newest_first_with_liked_flag() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let f = fixture(&conn);
        let older = create(&mut conn, f.bob, f.question, "First").unwrap();
        let newer = create(&mut conn, f.bob, f.question, "Second").unwrap();
        conn.execute(
            "INSERT INTO likes (post_id, user_id) VALUES (?1, ?2)",
            params![older, f.alice],
        )
        .unwrap();

        let feed = feed(&conn, f.alice, 10).unwrap();
        assert_eq!(feed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![newer, older]);
        assert!(!feed[0].liked);
        assert!(feed[1].liked);
    }

    #[test]
    fn trending_skips_unliked_posts() {
        let pool = test_pool();
        let mut conn = pool.get().unwrap();
        let f = fixture(&conn);
        create(&mut conn, f.bob, f.question, "Meh").unwrap();
        let popular = create(&mut conn, f.bob, f.question, "Great").unwrap();
        conn.execute("UPDATE posts SET likes = 4 WHERE id = ?1", params![popular])
            .unwrap();

        let trending = trending(&conn, f.alice, 5).unwrap();
        assert_eq!(trending.len(), 1);
        assert_eq!(trending[0].id, popular);
    }
}
