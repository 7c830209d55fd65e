//! Queries for the one-row-per-post content types
//!
//! Answers, links, regulars and videos differ only in their columns, so they
//! share one set of queries through the [`PostContent`] trait. Photos have
//! several rows per post and live in [`crate::db::photos`].

use crate::db::models::{Answer, Link, PostType, Regular, Video};
use crate::Result;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{FromRow, SqliteConnection};

pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Content stored in a table keyed by `post_id`
pub trait PostContent:
    for<'r> FromRow<'r, SqliteRow> + Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static
{
    /// Post type that owns this content
    const POST_TYPE: PostType;
    /// Table name; also the singular name used in routes
    const TABLE: &'static str;
    /// Columns after `post_id`, in [`PostContent::bind_columns`] order
    const COLUMNS: &'static [&'static str];

    fn post_id(&self) -> &str;

    fn set_post_id(&mut self, post_id: String);

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;

    /// Take every field from `details` except the post id
    fn update_item(&mut self, details: Self) {
        let post_id = self.post_id().to_string();
        *self = details;
        self.set_post_id(post_id);
    }
}

impl PostContent for Answer {
    const POST_TYPE: PostType = PostType::Answer;
    const TABLE: &'static str = "answer";
    const COLUMNS: &'static [&'static str] = &["question", "answer"];

    fn post_id(&self) -> &str {
        &self.post_id
    }

    fn set_post_id(&mut self, post_id: String) {
        self.post_id = post_id;
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(&self.question).bind(&self.answer)
    }
}

impl PostContent for Link {
    const POST_TYPE: PostType = PostType::Link;
    const TABLE: &'static str = "link";
    const COLUMNS: &'static [&'static str] = &["text", "url", "description"];

    fn post_id(&self) -> &str {
        &self.post_id
    }

    fn set_post_id(&mut self, post_id: String) {
        self.post_id = post_id;
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.text)
            .bind(&self.url)
            .bind(self.description.as_deref())
    }
}

impl PostContent for Regular {
    const POST_TYPE: PostType = PostType::Regular;
    const TABLE: &'static str = "regular";
    const COLUMNS: &'static [&'static str] = &["title", "body"];

    fn post_id(&self) -> &str {
        &self.post_id
    }

    fn set_post_id(&mut self, post_id: String) {
        self.post_id = post_id;
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(self.title.as_deref()).bind(&self.body)
    }
}

impl PostContent for Video {
    const POST_TYPE: PostType = PostType::Video;
    const TABLE: &'static str = "video";
    const COLUMNS: &'static [&'static str] = &[
        "content_type",
        "extension",
        "width",
        "height",
        "duration",
        "revision",
        "video_caption",
    ];

    fn post_id(&self) -> &str {
        &self.post_id
    }

    fn set_post_id(&mut self, post_id: String) {
        self.post_id = post_id;
    }

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.content_type.as_deref())
            .bind(self.extension.as_deref())
            .bind(self.width)
            .bind(self.height)
            .bind(self.duration)
            .bind(self.revision.as_deref())
            .bind(self.video_caption.as_deref())
    }
}

pub async fn get<T: PostContent>(conn: &mut SqliteConnection, post_id: &str) -> Result<Option<T>> {
    let item = sqlx::query_as::<_, T>(&format!("SELECT * FROM {} WHERE post_id = ?", T::TABLE))
        .bind(post_id)
        .fetch_optional(conn)
        .await?;
    Ok(item)
}

/// Insert, replacing any existing row for the same post
pub async fn save<T: PostContent>(conn: &mut SqliteConnection, item: &T) -> Result<()> {
    let sql = format!(
        "INSERT OR REPLACE INTO {} (post_id, {}) VALUES ({})",
        T::TABLE,
        T::COLUMNS.join(", "),
        vec!["?"; T::COLUMNS.len() + 1].join(", ")
    );
    let query = sqlx::query(&sql).bind(item.post_id());
    item.bind_columns(query).execute(conn).await?;
    Ok(())
}

pub async fn list_for_blog<T: PostContent>(conn: &mut SqliteConnection, blog: &str) -> Result<Vec<T>> {
    let items = sqlx::query_as::<_, T>(&format!(
        "SELECT c.* FROM {} c JOIN post p ON p.id = c.post_id WHERE p.tumblelog = ? ORDER BY c.post_id",
        T::TABLE
    ))
    .bind(blog)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Returns whether a row was removed
pub async fn delete<T: PostContent>(conn: &mut SqliteConnection, post_id: &str) -> Result<bool> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE post_id = ?", T::TABLE))
        .bind(post_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_all_for_blog<T: PostContent>(conn: &mut SqliteConnection, blog: &str) -> Result<u64> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE post_id IN (SELECT id FROM post WHERE tumblelog = ?)",
        T::TABLE
    ))
    .bind(blog)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
