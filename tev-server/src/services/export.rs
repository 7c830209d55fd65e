//! Re-export of staged posts as a Tumblr post document

use sqlx::SqliteConnection;
use tev_common::db::content::{self, PostContent};
use tev_common::db::models::{Answer, Link, Post, PostType, Regular, Video};
use tev_common::db::{photos, posts, staging};
use tev_common::xml::{write_posts, PostBody, PostEntry};
use tev_common::{Error, Result};
use tracing::{info, warn};

async fn content_or_empty<T: PostContent + Default>(
    conn: &mut SqliteConnection,
    post_id: &str,
) -> Result<T> {
    Ok(content::get::<T>(conn, post_id).await?.unwrap_or_else(|| {
        let mut empty = T::default();
        empty.set_post_id(post_id.to_string());
        empty
    }))
}

/// Load the content belonging to `post`
pub async fn load_entry(conn: &mut SqliteConnection, post: Post) -> Result<PostEntry> {
    let id = post.id.as_str();
    let body = match post.post_type {
        PostType::Answer => PostBody::Answer(content_or_empty::<Answer>(conn, id).await?),
        PostType::Link => PostBody::Link(content_or_empty::<Link>(conn, id).await?),
        PostType::Regular => PostBody::Regular(content_or_empty::<Regular>(conn, id).await?),
        PostType::Video => PostBody::Video(content_or_empty::<Video>(conn, id).await?),
        PostType::Photo => PostBody::Photos(photos::list_for_post(conn, id).await?),
    };
    Ok(PostEntry { post, body })
}

/// XML document holding every post staged for `blog`
pub async fn staged_document(conn: &mut SqliteConnection, blog: &str) -> Result<String> {
    let ids = staging::list_ids(conn, blog).await?;
    if ids.is_empty() {
        return Err(Error::NoStagedPosts(blog.to_string()));
    }

    let mut entries = Vec::with_capacity(ids.len());
    for id in &ids {
        match posts::find(conn, id).await? {
            Some(post) => entries.push(load_entry(conn, post).await?),
            None => warn!("Staged post {} no longer exists", id),
        }
    }

    info!("Exporting {} staged posts for blog {}", entries.len(), blog);
    write_posts(&entries)
}
