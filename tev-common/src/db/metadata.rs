//! Blog metadata (preferences) queries

use crate::db::models::Metadata;
use crate::{Error, Result};
use sqlx::SqliteConnection;

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Metadata>> {
    let all = sqlx::query_as::<_, Metadata>("SELECT * FROM metadata ORDER BY id")
        .fetch_all(conn)
        .await?;
    Ok(all)
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<Metadata> {
    sqlx::query_as::<_, Metadata>("SELECT * FROM metadata WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| Error::not_found("Metadata", "id", id))
}

pub async fn find_by_blog(conn: &mut SqliteConnection, blog: &str) -> Result<Option<Metadata>> {
    let found = sqlx::query_as::<_, Metadata>("SELECT * FROM metadata WHERE blog = ?")
        .bind(blog)
        .fetch_optional(conn)
        .await?;
    Ok(found)
}

pub async fn find_default(conn: &mut SqliteConnection) -> Result<Option<Metadata>> {
    let found = sqlx::query_as::<_, Metadata>(
        "SELECT * FROM metadata WHERE is_default = 1 ORDER BY id LIMIT 1",
    )
    .fetch_optional(conn)
    .await?;
    Ok(found)
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM metadata")
        .fetch_one(conn)
        .await?;
    Ok(n)
}

/// Insert when `id` is 0, otherwise update; returns the stored row
pub async fn save(conn: &mut SqliteConnection, md: &Metadata) -> Result<Metadata> {
    let id = if md.id == 0 {
        let result = sqlx::query(
            r#"
            INSERT INTO metadata (
                blog, base_media_path, main_tumblr_user, main_tumblr_user_avatar_url,
                sort_column, sort_order, filter, fav_filter, page_length, show_reading_pane,
                overwrite_post_data, overwrite_convo_data, conversation_display_style,
                conversation_sort_column, conversation_sort_order, theme, is_default
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&md.blog)
        .bind(md.base_media_path.as_deref())
        .bind(md.main_tumblr_user.as_deref())
        .bind(md.main_tumblr_user_avatar_url.as_deref())
        .bind(&md.sort_column)
        .bind(&md.sort_order)
        .bind(&md.filter)
        .bind(&md.fav_filter)
        .bind(md.page_length)
        .bind(md.show_reading_pane)
        .bind(md.overwrite_post_data)
        .bind(md.overwrite_convo_data)
        .bind(&md.conversation_display_style)
        .bind(&md.conversation_sort_column)
        .bind(&md.conversation_sort_order)
        .bind(&md.theme)
        .bind(md.is_default)
        .execute(&mut *conn)
        .await?;
        result.last_insert_rowid()
    } else {
        let result = sqlx::query(
            r#"
            UPDATE metadata SET
                blog = ?, base_media_path = ?, main_tumblr_user = ?, main_tumblr_user_avatar_url = ?,
                sort_column = ?, sort_order = ?, filter = ?, fav_filter = ?, page_length = ?,
                show_reading_pane = ?, overwrite_post_data = ?, overwrite_convo_data = ?,
                conversation_display_style = ?, conversation_sort_column = ?,
                conversation_sort_order = ?, theme = ?, is_default = ?
            WHERE id = ?
            "#,
        )
        .bind(&md.blog)
        .bind(md.base_media_path.as_deref())
        .bind(md.main_tumblr_user.as_deref())
        .bind(md.main_tumblr_user_avatar_url.as_deref())
        .bind(&md.sort_column)
        .bind(&md.sort_order)
        .bind(&md.filter)
        .bind(&md.fav_filter)
        .bind(md.page_length)
        .bind(md.show_reading_pane)
        .bind(md.overwrite_post_data)
        .bind(md.overwrite_convo_data)
        .bind(&md.conversation_display_style)
        .bind(&md.conversation_sort_column)
        .bind(&md.conversation_sort_order)
        .bind(&md.theme)
        .bind(md.is_default)
        .bind(md.id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Metadata", "id", md.id));
        }
        md.id
    };

    get(conn, id).await
}

/// Metadata for `blog`, creating default preferences on first use.
/// The first blog ever created becomes the default.
pub async fn get_or_create(conn: &mut SqliteConnection, blog: &str) -> Result<Metadata> {
    if let Some(md) = find_by_blog(conn, blog).await? {
        return Ok(md);
    }

    let mut md = Metadata::new_default(blog);
    md.is_default = count(conn).await? == 0;
    save(conn, &md).await
}

/// Make `id` the only default blog
pub async fn mark_default(conn: &mut SqliteConnection, id: i64) -> Result<Metadata> {
    let md = get(conn, id).await?;
    sqlx::query("UPDATE metadata SET is_default = (id = ?)")
        .bind(md.id)
        .execute(&mut *conn)
        .await?;
    get(conn, id).await
}

/// Promote the oldest blog when no blog is the default.
/// Returns the promoted blog, if any.
pub async fn ensure_default(conn: &mut SqliteConnection) -> Result<Option<Metadata>> {
    if find_default(conn).await?.is_some() {
        return Ok(None);
    }
    match list(conn).await?.first() {
        Some(oldest) => Ok(Some(mark_default(conn, oldest.id).await?)),
        None => Ok(None),
    }
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM metadata WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Metadata", "id", id));
    }
    Ok(())
}
