//! Media folder maintenance
//!
//! Each blog may name a `baseMediaPath`. Files in it are named after the post
//! they belong to: `<postId>_<index>.<ext>` for photos, `<postId>.<ext>` for
//! videos.

use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tev_common::db::models::PostType;
use tev_common::db::{metadata, photos, posts};
use tev_common::{Error, Result};
use tracing::{debug, info, warn};

/// Media folder configured for `blog`
pub async fn media_folder(conn: &mut SqliteConnection, blog: &str) -> Result<PathBuf> {
    let md = metadata::find_by_blog(conn, blog)
        .await?
        .ok_or_else(|| Error::not_found("Metadata", "blog", blog))?;

    match md.base_media_path.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Err(Error::InvalidInput(format!(
            "No media folder configured for blog {}",
            blog
        ))),
    }
}

/// Post id a media file belongs to: the name up to the first `_` or `.`
fn file_owner(name: &str) -> &str {
    name.split(['_', '.']).next().unwrap_or(name)
}

/// Extension (with the dot) of the last path segment of a url
fn url_extension(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rfind('.') {
        Some(dot) if dot + 1 < file.len() => file[dot..].to_string(),
        _ => ".jpg".to_string(),
    }
}

/// File names (not directories) directly inside `folder`, sorted
async fn list_files(folder: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(folder).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

async fn require_directory(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(Error::InvalidInput(format!(
            "{} is not a directory",
            path.display()
        ))),
    }
}

async fn download(client: &reqwest::Client, url: &str) -> reqwest::Result<Vec<u8>> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// Download the full-size image of every photo of a post into the media
/// folder. Returns whether every download succeeded.
pub async fn fix_photos(
    pool: &SqlitePool,
    client: &reqwest::Client,
    blog: &str,
    post_id: &str,
) -> Result<bool> {
    let (folder, post_photos) = {
        let mut conn = pool.acquire().await?;
        posts::get(&mut conn, blog, post_id).await?;
        let folder = media_folder(&mut conn, blog).await?;
        (folder, photos::list_for_post(&mut conn, post_id).await?)
    };

    let mut all_ok = true;
    for (index, photo) in post_photos.iter().enumerate() {
        let Some(url) = photo.url1280.as_deref() else {
            continue;
        };
        let target = folder.join(format!("{}_{}{}", post_id, index, url_extension(url)));

        match download(client, url).await {
            Ok(bytes) => {
                tokio::fs::write(&target, bytes).await?;
                debug!("Downloaded {} to {}", url, target.display());
            }
            Err(e) => {
                warn!("Failed to download {}: {}", url, e);
                all_ok = false;
            }
        }
    }

    Ok(all_ok)
}

/// Copy the media files of a post to `destination`, downloading photos first
pub async fn export_images(
    pool: &SqlitePool,
    client: &reqwest::Client,
    blog: &str,
    post_id: &str,
    destination: &Path,
) -> Result<usize> {
    if !fix_photos(pool, client, blog, post_id).await? {
        return Err(Error::Download(format!(
            "Unable to download all images for post {}",
            post_id
        )));
    }
    require_directory(destination).await?;

    let folder = {
        let mut conn = pool.acquire().await?;
        media_folder(&mut conn, blog).await?
    };

    let mut copied = 0;
    for name in list_files(&folder).await? {
        if file_owner(&name) != post_id {
            continue;
        }
        let target = destination.join(&name);
        if tokio::fs::try_exists(&target).await? {
            warn!("{} already exists, not overwritten", target.display());
            continue;
        }
        tokio::fs::copy(folder.join(&name), &target).await?;
        copied += 1;
    }

    info!("Exported {} files for post {} to {}", copied, post_id, destination.display());
    Ok(copied)
}

/// Remove duplicate photo downloads and files of posts the blog no longer has
pub async fn clean_images(pool: &SqlitePool, blog: &str) -> Result<usize> {
    let mut conn = pool.acquire().await?;
    let folder = media_folder(&mut conn, blog).await?;
    let mut files = list_files(&folder).await?;
    let mut removed = 0;

    for post in posts::list_for_blog_and_type(&mut conn, blog, PostType::Photo).await? {
        let photo_count = photos::list_for_post(&mut conn, &post.id).await?.len();
        let owned: Vec<&String> = files.iter().filter(|f| file_owner(f) == post.id).collect();

        // a second download of the whole set
        if photo_count > 0 && owned.len() == photo_count * 2 {
            for name in &owned[photo_count..] {
                tokio::fs::remove_file(folder.join(name.as_str())).await?;
                removed += 1;
            }
            let duplicates: HashSet<String> =
                owned[photo_count..].iter().map(|n| n.to_string()).collect();
            files.retain(|f| !duplicates.contains(f));
        }
    }

    let known: HashSet<String> = posts::list_for_blog(&mut conn, blog)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    for name in files.iter().filter(|f| !known.contains(file_owner(f))) {
        tokio::fs::remove_file(folder.join(name)).await?;
        removed += 1;
    }

    info!("Removed {} media files for blog {}", removed, blog);
    Ok(removed)
}

/// Copy every file of `source` into the media folder, then clean it up.
/// Returns the number of files copied.
pub async fn import_images(pool: &SqlitePool, blog: &str, source: &Path) -> Result<usize> {
    let folder = {
        let mut conn = pool.acquire().await?;
        media_folder(&mut conn, blog).await?
    };
    require_directory(source).await?;
    require_directory(&folder).await?;

    let mut copied = 0;
    for name in list_files(source).await? {
        let target = folder.join(&name);
        if tokio::fs::try_exists(&target).await? {
            continue;
        }
        tokio::fs::copy(source.join(&name), &target).await?;
        copied += 1;
    }

    clean_images(pool, blog).await?;
    info!("Imported {} media files for blog {}", copied, blog);
    Ok(copied)
}

/// A media file's bytes and content type
#[derive(Debug)]
pub struct MediaFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

fn content_type(name: &str) -> &'static str {
    let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Read a file from the media folder of `blog`, or of the default blog
pub async fn read_media(pool: &SqlitePool, blog: Option<&str>, name: &str) -> Result<MediaFile> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(Error::InvalidInput(format!("Invalid media name '{}'", name)));
    }

    let folder = {
        let mut conn = pool.acquire().await?;
        let blog = match blog {
            Some(blog) => blog.to_string(),
            None => metadata::find_default(&mut conn).await?.ok_or(Error::NoMetadata)?.blog,
        };
        media_folder(&mut conn, &blog).await?
    };

    let path = folder.join(name);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::not_found("Media", "name", name));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(MediaFile {
        bytes,
        content_type: content_type(name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_name_before_separator() {
        assert_eq!(file_owner("12345_0.jpg"), "12345");
        assert_eq!(file_owner("12345.mp4"), "12345");
        assert_ne!(file_owner("123456_0.jpg"), "12345");
    }

    #[test]
    fn extension_comes_from_last_segment() {
        assert_eq!(url_extension("https://64.media.tumblr.com/a/tumblr_x_1280.png"), ".png");
        assert_eq!(url_extension("https://media.example/x.gif?size=1"), ".gif");
        assert_eq!(url_extension("https://media.example/noext"), ".jpg");
    }

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type("1_0.JPG"), "image/jpeg");
        assert_eq!(content_type("1.mp4"), "video/mp4");
        assert_eq!(content_type("readme"), "application/octet-stream");
    }
}
