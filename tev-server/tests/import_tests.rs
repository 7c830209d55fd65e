//! Import service tests: overwrite modes and content replacement

use sqlx::SqlitePool;
use tempfile::TempDir;
use tev_common::db::content;
use tev_common::db::init::init_database;
use tev_common::db::models::{Link, Regular};
use tev_common::db::{conversations, hashtags, metadata, posts};
use tev_server::services::import::{import_conversations, import_posts};

async fn setup() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("tev.db")).await.unwrap();
    (dir, pool)
}

fn export(posts: &str) -> String {
    format!("<tumblr version=\"1.0\"><posts>{}</posts></tumblr>", posts)
}

fn regular(id: &str, timestamp: i64, body: &str, tag: &str) -> String {
    format!(
        r#"<post id="{id}" type="regular" state="published" tumblelog="blog" unix-timestamp="{timestamp}">
             <regular-body>{body}</regular-body><tag>{tag}</tag>
           </post>"#
    )
}

#[tokio::test]
async fn test_changed_post_replaces_content_of_new_type() {
    let (_dir, pool) = setup().await;

    import_posts(&pool, "blog", export(&regular("1", 10, "old", "a")).as_bytes())
        .await
        .unwrap();

    let as_link = r#"<post id="1" type="link" state="published" tumblelog="blog" unix-timestamp="20">
        <link-text>Now a link</link-text><link-url>https://example.com</link-url></post>"#;
    let summary = import_posts(&pool, "blog", export(as_link).as_bytes()).await.unwrap();
    assert_eq!(summary.updated, 1);

    let mut conn = pool.acquire().await.unwrap();
    assert!(content::get::<Regular>(&mut conn, "1").await.unwrap().is_none());
    let link = content::get::<Link>(&mut conn, "1").await.unwrap().unwrap();
    assert_eq!(link.text, "Now a link");
}

#[tokio::test]
async fn test_overwrite_post_data_replaces_blog() {
    let (_dir, pool) = setup().await;

    let first = export(&format!("{}{}", regular("1", 10, "one", "a"), regular("2", 10, "two", "b")));
    import_posts(&pool, "blog", first.as_bytes()).await.unwrap();

    {
        let mut conn = pool.acquire().await.unwrap();
        posts::set_read(&mut conn, "blog", "1", true).await.unwrap();
        let mut md = metadata::get_or_create(&mut conn, "blog").await.unwrap();
        md.overwrite_post_data = true;
        metadata::save(&mut conn, &md).await.unwrap();
    }

    let second = export(&regular("1", 10, "one again", "a"));
    let summary = import_posts(&pool, "blog", second.as_bytes()).await.unwrap();
    assert_eq!(summary.inserted, 1);

    let mut conn = pool.acquire().await.unwrap();
    let remaining = posts::list_for_blog(&mut conn, "blog").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(!remaining[0].is_read);
    let body = content::get::<Regular>(&mut conn, "1").await.unwrap().unwrap().body;
    assert_eq!(body, "one again");

    // hashtag counts start over with the blog's content
    let tags = hashtags::list_for_blog(&mut conn, "blog").await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].count, 1);
}

#[tokio::test]
async fn test_overwrite_convo_data_replaces_conversations() {
    let (_dir, pool) = setup().await;
    let doc = r#"<conversations>
      <conversation>
        <participants><participant>blog</participant><participant>alice</participant></participants>
        <messages>
          <message ts="1" participant="111" type="TEXT">hi</message>
          <message ts="2" participant="222" type="TEXT">hello</message>
        </messages>
      </conversation>
      <conversation>
        <participants><participant>blog</participant><participant>bob</participant></participants>
        <messages><message ts="3" participant="111" type="TEXT">yo</message></messages>
      </conversation>
    </conversations>"#;

    import_conversations(&pool, "blog", doc.as_bytes()).await.unwrap();

    {
        let mut conn = pool.acquire().await.unwrap();
        let mut md = metadata::get_or_create(&mut conn, "blog").await.unwrap();
        md.overwrite_convo_data = true;
        metadata::save(&mut conn, &md).await.unwrap();
    }

    let summary = import_conversations(&pool, "blog", doc.as_bytes()).await.unwrap();
    assert_eq!(summary.conversations_added, 2);
    assert_eq!(summary.conversations_updated, 0);

    let mut conn = pool.acquire().await.unwrap();
    assert_eq!(conversations::list_for_blog(&mut conn, "blog").await.unwrap().len(), 2);
    assert_eq!(conversations::messages_for_blog(&mut conn, "blog").await.unwrap().len(), 3);
}
