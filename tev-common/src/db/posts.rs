//! Post queries
//!
//! Deleting a post removes its content rows through `ON DELETE CASCADE`.

use crate::db::models::{Post, PostType};
use crate::{Error, Result};
use sqlx::SqliteConnection;

const SELECT_POST: &str = "SELECT * FROM post";

pub async fn list_for_blog(conn: &mut SqliteConnection, blog: &str) -> Result<Vec<Post>> {
    let posts = sqlx::query_as::<_, Post>(&format!("{} WHERE tumblelog = ? ORDER BY id", SELECT_POST))
        .bind(blog)
        .fetch_all(conn)
        .await?;
    Ok(posts)
}

pub async fn list_for_blog_and_type(
    conn: &mut SqliteConnection,
    blog: &str,
    post_type: PostType,
) -> Result<Vec<Post>> {
    let posts = sqlx::query_as::<_, Post>(&format!(
        "{} WHERE tumblelog = ? AND post_type = ? ORDER BY id",
        SELECT_POST
    ))
    .bind(blog)
    .bind(post_type)
    .fetch_all(conn)
    .await?;
    Ok(posts)
}

/// Look up a post of any blog
pub async fn find(conn: &mut SqliteConnection, id: &str) -> Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>(&format!("{} WHERE id = ?", SELECT_POST))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(post)
}

/// Look up a post that must belong to `blog`
pub async fn get(conn: &mut SqliteConnection, blog: &str, id: &str) -> Result<Post> {
    match find(conn, id).await? {
        Some(post) if post.tumblelog == blog => Ok(post),
        _ => Err(Error::not_found("Post", "id", id)),
    }
}

pub async fn exists(conn: &mut SqliteConnection, blog: &str, id: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM post WHERE id = ? AND tumblelog = ?")
        .bind(id)
        .bind(blog)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

pub async fn insert(conn: &mut SqliteConnection, post: &Post) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO post (
            id, url, url_with_slug, date_gmt, date, unix_timestamp, reblog_key, slug,
            is_reblog, tumblelog, width, height, post_type, state, is_read, is_favourite, tags
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.id)
    .bind(&post.url)
    .bind(&post.url_with_slug)
    .bind(&post.date_gmt)
    .bind(&post.date)
    .bind(post.unix_timestamp)
    .bind(&post.reblog_key)
    .bind(&post.slug)
    .bind(post.is_reblog)
    .bind(&post.tumblelog)
    .bind(post.width)
    .bind(post.height)
    .bind(post.post_type)
    .bind(&post.state)
    .bind(post.is_read)
    .bind(post.is_favourite)
    .bind(&post.tags)
    .execute(conn)
    .await?;
    Ok(())
}

/// Overwrite every column of an existing post
pub async fn update(conn: &mut SqliteConnection, post: &Post) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE post SET
            url = ?, url_with_slug = ?, date_gmt = ?, date = ?, unix_timestamp = ?,
            reblog_key = ?, slug = ?, is_reblog = ?, tumblelog = ?, width = ?, height = ?,
            post_type = ?, state = ?, is_read = ?, is_favourite = ?, tags = ?
        WHERE id = ?
        "#,
    )
    .bind(&post.url)
    .bind(&post.url_with_slug)
    .bind(&post.date_gmt)
    .bind(&post.date)
    .bind(post.unix_timestamp)
    .bind(&post.reblog_key)
    .bind(&post.slug)
    .bind(post.is_reblog)
    .bind(&post.tumblelog)
    .bind(post.width)
    .bind(post.height)
    .bind(post.post_type)
    .bind(&post.state)
    .bind(post.is_read)
    .bind(post.is_favourite)
    .bind(&post.tags)
    .bind(&post.id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Post", "id", &post.id));
    }
    Ok(())
}

pub async fn set_read(conn: &mut SqliteConnection, blog: &str, id: &str, read: bool) -> Result<Post> {
    sqlx::query("UPDATE post SET is_read = ? WHERE id = ? AND tumblelog = ?")
        .bind(read)
        .bind(id)
        .bind(blog)
        .execute(&mut *conn)
        .await?;
    get(conn, blog, id).await
}

pub async fn set_favourite(
    conn: &mut SqliteConnection,
    blog: &str,
    id: &str,
    favourite: bool,
) -> Result<Post> {
    sqlx::query("UPDATE post SET is_favourite = ? WHERE id = ? AND tumblelog = ?")
        .bind(favourite)
        .bind(id)
        .bind(blog)
        .execute(&mut *conn)
        .await?;
    get(conn, blog, id).await
}

/// Mark every post of a blog read or unread; returns the number of posts changed
pub async fn set_read_for_blog(conn: &mut SqliteConnection, blog: &str, read: bool) -> Result<u64> {
    let result = sqlx::query("UPDATE post SET is_read = ? WHERE tumblelog = ? AND is_read <> ?")
        .bind(read)
        .bind(blog)
        .bind(read)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete(conn: &mut SqliteConnection, blog: &str, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM post WHERE id = ? AND tumblelog = ?")
        .bind(id)
        .bind(blog)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Post", "id", id));
    }
    Ok(())
}

pub async fn delete_all_for_blog(conn: &mut SqliteConnection, blog: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM post WHERE tumblelog = ?")
        .bind(blog)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
