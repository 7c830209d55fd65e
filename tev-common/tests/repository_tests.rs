//! Tests for the query modules against a real SQLite file

use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool};
use tempfile::TempDir;
use tev_common::db::models::{
    Answer, Conversation, ConversationMessage, Metadata, Photo, Post, PostType, Regular,
};
use tev_common::db::content::PostContent;
use tev_common::db::init::init_database;
use tev_common::db::{self, content, conversations, hashtags, metadata, photos, posts, staging};
use tev_common::Error;

async fn setup() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("tev.db")).await.unwrap();
    (dir, pool)
}

async fn conn(pool: &SqlitePool) -> PoolConnection<Sqlite> {
    pool.acquire().await.unwrap()
}

fn post(id: &str, blog: &str, post_type: PostType) -> Post {
    let mut p = Post::new(id, blog, post_type);
    p.state = "published".to_string();
    p
}

#[tokio::test]
async fn test_post_read_and_favourite_flags() {
    let (_dir, pool) = setup().await;
    let mut c = conn(&pool).await;

    posts::insert(&mut c, &post("1", "blog", PostType::Regular)).await.unwrap();
    posts::insert(&mut c, &post("2", "blog", PostType::Regular)).await.unwrap();
    posts::insert(&mut c, &post("3", "other", PostType::Regular)).await.unwrap();

    let read = posts::set_read(&mut c, "blog", "1", true).await.unwrap();
    assert!(read.is_read);
    let fav = posts::set_favourite(&mut c, "blog", "2", true).await.unwrap();
    assert!(fav.is_favourite && !fav.is_read);

    // only the unread post of the blog changes
    assert_eq!(posts::set_read_for_blog(&mut c, "blog", true).await.unwrap(), 1);
    assert!(!posts::get(&mut c, "other", "3").await.unwrap().is_read);

    assert_eq!(posts::set_read_for_blog(&mut c, "blog", false).await.unwrap(), 2);
    assert!(posts::list_for_blog(&mut c, "blog").await.unwrap().iter().all(|p| !p.is_read));
}

#[tokio::test]
async fn test_post_of_other_blog_is_not_found() {
    let (_dir, pool) = setup().await;
    let mut c = conn(&pool).await;

    posts::insert(&mut c, &post("1", "blog", PostType::Link)).await.unwrap();

    let err = posts::get(&mut c, "other", "1").await.unwrap_err();
    assert_eq!(err.to_string(), "Post not found with id : '1'");
    assert!(matches!(
        posts::delete(&mut c, "other", "1").await,
        Err(Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_generic_content_round_trip_and_cascade() {
    let (_dir, pool) = setup().await;
    let mut c = conn(&pool).await;

    posts::insert(&mut c, &post("10", "blog", PostType::Answer)).await.unwrap();
    posts::insert(&mut c, &post("11", "blog", PostType::Regular)).await.unwrap();

    let answer = Answer {
        post_id: "10".to_string(),
        question: "Q?".to_string(),
        answer: "A.".to_string(),
    };
    content::save(&mut c, &answer).await.unwrap();
    content::save(
        &mut c,
        &Regular {
            post_id: "11".to_string(),
            title: None,
            body: "<p>body</p>".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(content::get::<Answer>(&mut c, "10").await.unwrap(), Some(answer.clone()));
    assert_eq!(content::list_for_blog::<Answer>(&mut c, "blog").await.unwrap().len(), 1);

    // saving again replaces the row
    let mut updated = answer.clone();
    updated.update_item(Answer {
        post_id: "ignored".to_string(),
        question: "New?".to_string(),
        answer: "Yes.".to_string(),
    });
    assert_eq!(updated.post_id, "10");
    content::save(&mut c, &updated).await.unwrap();
    assert_eq!(content::get::<Answer>(&mut c, "10").await.unwrap().unwrap().question, "New?");

    posts::delete(&mut c, "blog", "10").await.unwrap();
    assert_eq!(content::get::<Answer>(&mut c, "10").await.unwrap(), None);
    assert!(content::get::<Regular>(&mut c, "11").await.unwrap().is_some());
}

#[tokio::test]
async fn test_photos_ordered_by_offset() {
    let (_dir, pool) = setup().await;
    let mut c = conn(&pool).await;

    posts::insert(&mut c, &post("20", "blog", PostType::Photo)).await.unwrap();
    for offset in ["o2", "o1"] {
        photos::insert(
            &mut c,
            &Photo {
                post_id: "20".to_string(),
                offset: Some(offset.to_string()),
                ..Photo::default()
            },
        )
        .await
        .unwrap();
    }

    let listed = photos::list_for_post(&mut c, "20").await.unwrap();
    let offsets: Vec<_> = listed.iter().map(|p| p.offset.as_deref().unwrap()).collect();
    assert_eq!(offsets, vec!["o1", "o2"]);

    let mut first = listed[0].clone();
    first.caption = "edited".to_string();
    photos::update(&mut c, &first).await.unwrap();
    assert_eq!(photos::get(&mut c, first.id).await.unwrap().caption, "edited");

    assert_eq!(photos::delete_all_for_blog(&mut c, "blog").await.unwrap(), 2);
}

#[tokio::test]
async fn test_hashtag_counts_and_merge() {
    let (_dir, pool) = setup().await;
    let mut c = conn(&pool).await;

    hashtags::increment(&mut c, "rust", "blog").await.unwrap();
    let tag = hashtags::increment(&mut c, "rust", "blog").await.unwrap();
    assert_eq!(tag.count, 2);
    hashtags::increment(&mut c, "rust", "another").await.unwrap();
    hashtags::increment(&mut c, "xml", "blog").await.unwrap();

    let merged = hashtags::list_merged(&mut c).await.unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].tag, "rust");
    assert_eq!(merged[0].count, 3);
    assert_eq!(merged[0].blog.as_deref(), Some("another, blog"));

    assert!(matches!(
        hashtags::create_unassigned(&mut c, "rust").await,
        Err(Error::ExistingTag(_))
    ));
    let free = hashtags::create_unassigned(&mut c, "new").await.unwrap();
    assert!(free.blog.is_none());
    assert!(hashtags::find(&mut c, "new", None).await.unwrap().is_some());

    hashtags::delete(&mut c, "rust", Some("another")).await.unwrap();
    assert_eq!(hashtags::list_for_blog(&mut c, "blog").await.unwrap().len(), 2);
    assert_eq!(hashtags::delete_all_for_blog(&mut c, "blog").await.unwrap(), 2);
}

#[tokio::test]
async fn test_metadata_default_is_exclusive() {
    let (_dir, pool) = setup().await;
    let mut c = conn(&pool).await;

    let mut first = Metadata::new_default("first");
    first.is_default = true;
    let first = metadata::save(&mut c, &first).await.unwrap();
    let second = metadata::save(&mut c, &Metadata::new_default("second")).await.unwrap();
    assert!(second.id > first.id);

    metadata::mark_default(&mut c, second.id).await.unwrap();
    let default = metadata::find_default(&mut c).await.unwrap().unwrap();
    assert_eq!(default.blog, "second");
    assert!(!metadata::get(&mut c, first.id).await.unwrap().is_default);

    let mut edited = default.clone();
    edited.theme = "dark".to_string();
    let saved = metadata::save(&mut c, &edited).await.unwrap();
    assert_eq!(saved.theme, "dark");
    assert_eq!(metadata::count(&mut c).await.unwrap(), 2);
}

#[tokio::test]
async fn test_conversations_and_messages() {
    let (_dir, pool) = setup().await;
    let mut c = conn(&pool).await;

    let convo = conversations::insert(
        &mut c,
        &Conversation {
            id: 0,
            blog: "blog".to_string(),
            participant: "alice".to_string(),
            participant_avatar_url: None,
            participant_id: Some("222".to_string()),
            num_messages: 0,
            hide_conversation: false,
        },
    )
    .await
    .unwrap();

    for (ts, text) in [(20, "later"), (10, "earlier")] {
        conversations::insert_message(
            &mut c,
            &ConversationMessage {
                id: 0,
                conversation_id: convo.id,
                timestamp: ts,
                received: true,
                message_type: "TEXT".to_string(),
                message: text.to_string(),
            },
        )
        .await
        .unwrap();
    }
    assert_eq!(conversations::refresh_message_count(&mut c, convo.id).await.unwrap(), 2);

    let messages = conversations::messages_for_conversation(&mut c, convo.id).await.unwrap();
    assert_eq!(messages[0].message, "earlier");

    let hidden = conversations::set_hidden_for_participant(&mut c, "blog", "alice", true)
        .await
        .unwrap();
    assert!(hidden.hide_conversation);
    assert_eq!(conversations::list_by_hidden(&mut c, "blog", true).await.unwrap().len(), 1);
    assert_eq!(conversations::unhide_all(&mut c, "blog").await.unwrap(), 1);

    assert!(conversations::get(&mut c, "other", convo.id).await.is_err());

    conversations::delete(&mut c, "blog", convo.id).await.unwrap();
    assert!(conversations::messages_for_blog(&mut c, "blog").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_staging_checks_blog() {
    let (_dir, pool) = setup().await;
    let mut c = conn(&pool).await;

    staging::stage(&mut c, "blog", "1").await.unwrap();
    staging::stage(&mut c, "blog", "1").await.unwrap();
    staging::stage(&mut c, "blog", "2").await.unwrap();
    assert_eq!(staging::list_ids(&mut c, "blog").await.unwrap(), vec!["1", "2"]);

    assert!(matches!(
        staging::unstage(&mut c, "other", "1").await,
        Err(Error::BlogMismatch { .. })
    ));
    staging::unstage(&mut c, "blog", "1").await.unwrap();
    assert_eq!(staging::unstage_all(&mut c, "blog").await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_blog_data_leaves_other_blogs() {
    let (_dir, pool) = setup().await;
    let mut c = conn(&pool).await;

    posts::insert(&mut c, &post("1", "gone", PostType::Regular)).await.unwrap();
    posts::insert(&mut c, &post("2", "kept", PostType::Regular)).await.unwrap();
    hashtags::increment(&mut c, "tag", "gone").await.unwrap();
    hashtags::increment(&mut c, "tag", "kept").await.unwrap();
    staging::stage(&mut c, "gone", "1").await.unwrap();

    db::delete_blog_data(&mut c, "gone").await.unwrap();

    assert!(posts::list_for_blog(&mut c, "gone").await.unwrap().is_empty());
    assert!(staging::list_ids(&mut c, "gone").await.unwrap().is_empty());
    assert_eq!(posts::list_for_blog(&mut c, "kept").await.unwrap().len(), 1);
    assert_eq!(hashtags::list_for_blog(&mut c, "kept").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_metadata_get_or_create_makes_first_blog_default() {
    let (_dir, pool) = setup().await;
    let mut c = conn(&pool).await;

    let first = metadata::get_or_create(&mut c, "first").await.unwrap();
    assert!(first.is_default);
    let again = metadata::get_or_create(&mut c, "first").await.unwrap();
    assert_eq!(again.id, first.id);

    let second = metadata::get_or_create(&mut c, "second").await.unwrap();
    assert!(!second.is_default);
    assert_eq!(second.sort_order, "Descending");
}

#[tokio::test]
async fn test_metadata_ensure_default_promotes_oldest_blog() {
    let (_dir, pool) = setup().await;
    let mut c = conn(&pool).await;

    assert!(metadata::ensure_default(&mut c).await.unwrap().is_none());

    let mut first = metadata::get_or_create(&mut c, "first").await.unwrap();
    metadata::get_or_create(&mut c, "second").await.unwrap();
    assert!(metadata::ensure_default(&mut c).await.unwrap().is_none());

    first.is_default = false;
    metadata::save(&mut c, &first).await.unwrap();
    assert!(metadata::find_default(&mut c).await.unwrap().is_none());

    let promoted = metadata::ensure_default(&mut c).await.unwrap().unwrap();
    assert_eq!(promoted.blog, "first");
    assert!(promoted.is_default);
}
