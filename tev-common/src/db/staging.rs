//! Staged posts: the per-blog selection exported as XML

use crate::{Error, Result};
use sqlx::SqliteConnection;

pub async fn list_ids(conn: &mut SqliteConnection, blog: &str) -> Result<Vec<String>> {
    let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM staging_post WHERE blog = ? ORDER BY id")
        .bind(blog)
        .fetch_all(conn)
        .await?;
    Ok(ids)
}

/// Stage a post (idempotent)
pub async fn stage(conn: &mut SqliteConnection, blog: &str, id: &str) -> Result<()> {
    sqlx::query("INSERT INTO staging_post (id, blog) VALUES (?, ?) ON CONFLICT (id) DO UPDATE SET blog = excluded.blog")
        .bind(id)
        .bind(blog)
        .execute(conn)
        .await?;
    Ok(())
}

/// Unstage a post; the staged entry must belong to `blog`
pub async fn unstage(conn: &mut SqliteConnection, blog: &str, id: &str) -> Result<()> {
    let staged_blog: Option<String> = sqlx::query_scalar("SELECT blog FROM staging_post WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match staged_blog {
        None => Err(Error::not_found("Staged post", "id", id)),
        Some(found) if found != blog => Err(Error::BlogMismatch {
            blog: blog.to_string(),
            found,
        }),
        Some(_) => {
            sqlx::query("DELETE FROM staging_post WHERE id = ?")
                .bind(id)
                .execute(conn)
                .await?;
            Ok(())
        }
    }
}

pub async fn unstage_all(conn: &mut SqliteConnection, blog: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM staging_post WHERE blog = ?")
        .bind(blog)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
