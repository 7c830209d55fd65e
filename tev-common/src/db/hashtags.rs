//! Hashtag queries
//!
//! A hashtag row counts how many posts of one blog carry a tag. Rows with no
//! blog are tags created by hand through the API.

use crate::db::models::Hashtag;
use crate::{Error, Result};
use sqlx::SqliteConnection;

/// One row per tag with counts summed and blog names joined by ", "
pub async fn list_merged(conn: &mut SqliteConnection) -> Result<Vec<Hashtag>> {
    let tags = sqlx::query_as::<_, Hashtag>(
        r#"
        SELECT MIN(id) AS id, tag, GROUP_CONCAT(blog, ', ') AS blog, SUM(count) AS count
        FROM (SELECT * FROM hashtag ORDER BY blog)
        GROUP BY tag
        ORDER BY tag
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(tags)
}

pub async fn list_for_blog(conn: &mut SqliteConnection, blog: &str) -> Result<Vec<Hashtag>> {
    let tags = sqlx::query_as::<_, Hashtag>("SELECT * FROM hashtag WHERE blog = ? ORDER BY tag")
        .bind(blog)
        .fetch_all(conn)
        .await?;
    Ok(tags)
}

/// Exact match on tag and blog (`None` matches blog-less rows)
pub async fn find(conn: &mut SqliteConnection, tag: &str, blog: Option<&str>) -> Result<Option<Hashtag>> {
    let found = sqlx::query_as::<_, Hashtag>("SELECT * FROM hashtag WHERE tag = ? AND blog IS ?")
        .bind(tag)
        .bind(blog)
        .fetch_optional(conn)
        .await?;
    Ok(found)
}

pub async fn find_by_tag(conn: &mut SqliteConnection, tag: &str) -> Result<Vec<Hashtag>> {
    let found = sqlx::query_as::<_, Hashtag>("SELECT * FROM hashtag WHERE tag = ? ORDER BY blog")
        .bind(tag)
        .fetch_all(conn)
        .await?;
    Ok(found)
}

/// Count one more use of `tag` in `blog`, creating the row on first use
pub async fn increment(conn: &mut SqliteConnection, tag: &str, blog: &str) -> Result<Hashtag> {
    sqlx::query(
        r#"
        INSERT INTO hashtag (tag, blog, count) VALUES (?, ?, 1)
        ON CONFLICT (tag, blog) DO UPDATE SET count = count + 1
        "#,
    )
    .bind(tag)
    .bind(blog)
    .execute(&mut *conn)
    .await?;

    find(conn, tag, Some(blog))
        .await?
        .ok_or_else(|| Error::not_found("Hashtag", "tag", tag))
}

/// Create a tag that belongs to no blog; fails if any blog already uses it
pub async fn create_unassigned(conn: &mut SqliteConnection, tag: &str) -> Result<Hashtag> {
    if !find_by_tag(conn, tag).await?.is_empty() {
        return Err(Error::ExistingTag(tag.to_string()));
    }

    let result = sqlx::query("INSERT INTO hashtag (tag, blog, count) VALUES (?, NULL, 0)")
        .bind(tag)
        .execute(conn)
        .await?;

    Ok(Hashtag {
        id: result.last_insert_rowid(),
        tag: tag.to_string(),
        blog: None,
        count: 0,
    })
}

pub async fn delete(conn: &mut SqliteConnection, tag: &str, blog: Option<&str>) -> Result<()> {
    let result = sqlx::query("DELETE FROM hashtag WHERE tag = ? AND blog IS ?")
        .bind(tag)
        .bind(blog)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Hashtag", "tag", tag));
    }
    Ok(())
}

pub async fn delete_all_for_blog(conn: &mut SqliteConnection, blog: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM hashtag WHERE blog = ?")
        .bind(blog)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
