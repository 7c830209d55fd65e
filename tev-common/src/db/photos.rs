//! Photo queries (several photos per post)

use crate::db::models::Photo;
use crate::{Error, Result};
use sqlx::SqliteConnection;

pub async fn list_for_post(conn: &mut SqliteConnection, post_id: &str) -> Result<Vec<Photo>> {
    let photos = sqlx::query_as::<_, Photo>(
        "SELECT * FROM photo WHERE post_id = ? ORDER BY photo_offset, id",
    )
    .bind(post_id)
    .fetch_all(conn)
    .await?;
    Ok(photos)
}

pub async fn list_for_blog(conn: &mut SqliteConnection, blog: &str) -> Result<Vec<Photo>> {
    let photos = sqlx::query_as::<_, Photo>(
        r#"
        SELECT ph.* FROM photo ph
        JOIN post p ON p.id = ph.post_id
        WHERE p.tumblelog = ?
        ORDER BY ph.post_id, ph.photo_offset, ph.id
        "#,
    )
    .bind(blog)
    .fetch_all(conn)
    .await?;
    Ok(photos)
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<Photo> {
    sqlx::query_as::<_, Photo>("SELECT * FROM photo WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| Error::not_found("Photo", "id", id))
}

/// Insert a photo; returns it with its assigned id
pub async fn insert(conn: &mut SqliteConnection, photo: &Photo) -> Result<Photo> {
    let result = sqlx::query(
        r#"
        INSERT INTO photo (
            post_id, caption, photo_link_url, photo_offset, width, height,
            url1280, url500, url400, url250, url100, url75
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&photo.post_id)
    .bind(&photo.caption)
    .bind(photo.photo_link_url.as_deref())
    .bind(photo.offset.as_deref())
    .bind(photo.width)
    .bind(photo.height)
    .bind(photo.url1280.as_deref())
    .bind(photo.url500.as_deref())
    .bind(photo.url400.as_deref())
    .bind(photo.url250.as_deref())
    .bind(photo.url100.as_deref())
    .bind(photo.url75.as_deref())
    .execute(conn)
    .await?;

    Ok(Photo {
        id: result.last_insert_rowid(),
        ..photo.clone()
    })
}

/// Update a photo by id; the owning post cannot change
pub async fn update(conn: &mut SqliteConnection, photo: &Photo) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE photo SET
            caption = ?, photo_link_url = ?, photo_offset = ?, width = ?, height = ?,
            url1280 = ?, url500 = ?, url400 = ?, url250 = ?, url100 = ?, url75 = ?
        WHERE id = ? AND post_id = ?
        "#,
    )
    .bind(&photo.caption)
    .bind(photo.photo_link_url.as_deref())
    .bind(photo.offset.as_deref())
    .bind(photo.width)
    .bind(photo.height)
    .bind(photo.url1280.as_deref())
    .bind(photo.url500.as_deref())
    .bind(photo.url400.as_deref())
    .bind(photo.url250.as_deref())
    .bind(photo.url100.as_deref())
    .bind(photo.url75.as_deref())
    .bind(photo.id)
    .bind(&photo.post_id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Photo", "id", photo.id));
    }
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM photo WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Photo", "id", id));
    }
    Ok(())
}

pub async fn delete_for_post(conn: &mut SqliteConnection, post_id: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM photo WHERE post_id = ?")
        .bind(post_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_all_for_blog(conn: &mut SqliteConnection, blog: &str) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM photo WHERE post_id IN (SELECT id FROM post WHERE tumblelog = ?)",
    )
    .bind(blog)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
