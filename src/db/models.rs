use rusqlite::Row;

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub about: String,
    pub created_at: String,
}

/// A user row including the stored password hash. Only the auth handlers see this.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub id: i64,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub user_id: i64,
    pub name: String,
    pub created_at: String,
    pub answered: bool,
    pub replies: i64,
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub user_id: i64,
    pub question_id: i64,
    pub created_at: String,
    pub likes: i64,
    pub name: String,
    pub about: String,
    /// Whether the viewing user has liked this post. Not a column.
    pub liked: bool,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub comment: String,
    pub user_id: i64,
    pub name: String,
    pub created_at: String,
}

impl User {
    pub const COLUMNS: &'static str = "id, name, email, about, created_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            about: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    pub fn date(&self) -> String {
        display_date(&self.created_at)
    }
}

impl Question {
    pub const COLUMNS: &'static str = "id, question, user_id, name, created_at, answered, replies";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            question: row.get(1)?,
            user_id: row.get(2)?,
            name: row.get(3)?,
            created_at: row.get(4)?,
            answered: row.get(5)?,
            replies: row.get(6)?,
        })
    }

    pub fn date(&self) -> String {
        display_date(&self.created_at)
    }
}

impl Post {
    /// Column list expecting the table alias `p` and a trailing `liked` expression.
    pub const COLUMNS: &'static str = "p.id, p.question, p.answer, p.user_id, p.question_id, \
         p.created_at, p.likes, p.name, p.about";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            question: row.get(1)?,
            answer: row.get(2)?,
            user_id: row.get(3)?,
            question_id: row.get(4)?,
            created_at: row.get(5)?,
            likes: row.get(6)?,
            name: row.get(7)?,
            about: row.get(8)?,
            liked: row.get(9)?,
        })
    }

    pub fn date(&self) -> String {
        display_date(&self.created_at)
    }
}

impl Comment {
    pub const COLUMNS: &'static str = "id, post_id, comment, user_id, name, created_at";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            post_id: row.get(1)?,
            comment: row.get(2)?,
            user_id: row.get(3)?,
            name: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    pub fn date(&self) -> String {
        display_date(&self.created_at)
    }
}

/// Render a SQLite `datetime('now')` timestamp as e.g. "Mar 4, 2024".
pub fn display_date(created_at: &str) -> String {
    chrono::NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}
