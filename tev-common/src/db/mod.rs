//! Database access
//!
//! Query functions take `&mut SqliteConnection` so callers can run them on a
//! pooled connection or inside a transaction.

pub mod content;
pub mod conversations;
pub mod hashtags;
pub mod init;
pub mod metadata;
pub mod migrations;
pub mod models;
pub mod photos;
pub mod posts;
pub mod staging;

use crate::Result;
use sqlx::SqliteConnection;

/// Remove posts, their content and the hashtags of a blog
pub async fn delete_blog_content(conn: &mut SqliteConnection, blog: &str) -> Result<()> {
    hashtags::delete_all_for_blog(conn, blog).await?;
    // content rows go with their posts (ON DELETE CASCADE)
    posts::delete_all_for_blog(conn, blog).await?;
    Ok(())
}

/// Remove everything stored for a blog except its metadata row
pub async fn delete_blog_data(conn: &mut SqliteConnection, blog: &str) -> Result<()> {
    delete_blog_content(conn, blog).await?;
    conversations::delete_all_for_blog(conn, blog).await?;
    staging::unstage_all(conn, blog).await?;
    Ok(())
}
