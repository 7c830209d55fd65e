//! Loading Tumblr exports into the database
//!
//! Documents are parsed completely before anything is written, and every
//! import runs in a single transaction.

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;
use tev_common::db::models::{Answer, Conversation, ConversationMessage, Link, Post, Regular, Video};
use tev_common::db::{self, content, conversations, hashtags, metadata, photos, posts};
use tev_common::xml::{parse_conversations, parse_posts, ParsedConversation, PostBody, PostEntry};
use tev_common::{Error, Result};
use tracing::{debug, info};

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub unsupported: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationImportSummary {
    pub main_participant: String,
    pub conversations_added: usize,
    pub conversations_updated: usize,
    pub messages_added: usize,
}

/// Import a post export for `blog`
pub async fn import_posts(pool: &SqlitePool, blog: &str, xml: &[u8]) -> Result<ImportSummary> {
    let parsed = parse_posts(xml)?;

    if let Some(entry) = parsed.posts.iter().find(|e| e.post.tumblelog != blog) {
        return Err(Error::BlogMismatch {
            blog: blog.to_string(),
            found: entry.post.tumblelog.clone(),
        });
    }

    let mut summary = ImportSummary {
        unsupported: parsed.unsupported.len(),
        ..ImportSummary::default()
    };

    let mut tx = pool.begin().await?;
    let md = metadata::get_or_create(&mut tx, blog).await?;

    if md.overwrite_post_data {
        info!("Overwriting existing post data for blog {}", blog);
        db::delete_blog_content(&mut tx, blog).await?;
    }

    for entry in parsed.posts {
        if !entry.post.is_published() {
            debug!("Skipping post {} in state '{}'", entry.post.id, entry.post.state);
            summary.skipped += 1;
            continue;
        }

        let stored = if md.overwrite_post_data {
            None
        } else {
            posts::find(&mut tx, &entry.post.id).await?
        };

        match stored {
            None => {
                posts::insert(&mut tx, &entry.post).await?;
                save_body(&mut tx, &entry).await?;
                count_tags(&mut tx, blog, entry.post.tag_list()).await?;
                summary.inserted += 1;
            }
            Some(existing) if needs_resubmit(&existing, &entry.post) => {
                let known: HashSet<String> = existing.tag_list().into_iter().collect();
                let mut post = existing;
                post.update_data(&entry.post);
                posts::update(&mut tx, &post).await?;

                clear_body(&mut tx, &post.id).await?;
                save_body(&mut tx, &entry).await?;

                let added = post.tag_list().into_iter().filter(|t| !known.contains(t));
                count_tags(&mut tx, blog, added.collect()).await?;
                summary.updated += 1;
            }
            Some(_) => summary.skipped += 1,
        }
    }

    tx.commit().await?;

    info!(
        "Imported posts for {}: {} inserted, {} updated, {} skipped, {} unsupported",
        blog, summary.inserted, summary.updated, summary.skipped, summary.unsupported
    );
    Ok(summary)
}

/// Tumblr re-exports every post; only edited ones are written again
fn needs_resubmit(stored: &Post, incoming: &Post) -> bool {
    stored.state != incoming.state
        || stored.date != incoming.date
        || stored.date_gmt != incoming.date_gmt
        || stored.unix_timestamp != incoming.unix_timestamp
}

async fn count_tags(conn: &mut SqliteConnection, blog: &str, tags: Vec<String>) -> Result<()> {
    for tag in tags {
        hashtags::increment(conn, &tag, blog).await?;
    }
    Ok(())
}

async fn save_body(conn: &mut SqliteConnection, entry: &PostEntry) -> Result<()> {
    match &entry.body {
        PostBody::Answer(answer) => content::save(conn, answer).await,
        PostBody::Link(link) => content::save(conn, link).await,
        PostBody::Regular(regular) => content::save(conn, regular).await,
        PostBody::Video(video) => content::save(conn, video).await,
        PostBody::Photos(list) => {
            for photo in list {
                photos::insert(conn, photo).await?;
            }
            Ok(())
        }
    }
}

/// Remove every content row of a post, whatever its previous type
async fn clear_body(conn: &mut SqliteConnection, post_id: &str) -> Result<()> {
    content::delete::<Answer>(conn, post_id).await?;
    content::delete::<Link>(conn, post_id).await?;
    content::delete::<Regular>(conn, post_id).await?;
    content::delete::<Video>(conn, post_id).await?;
    photos::delete_for_post(conn, post_id).await?;
    Ok(())
}

/// Import a direct messaging export for `blog`
pub async fn import_conversations(
    pool: &SqlitePool,
    blog: &str,
    xml: &[u8],
) -> Result<ConversationImportSummary> {
    let parsed = parse_conversations(xml, blog)?;
    let mut summary = ConversationImportSummary {
        main_participant: parsed.main_participant.clone(),
        ..ConversationImportSummary::default()
    };

    let mut tx = pool.begin().await?;

    let mut md = metadata::get_or_create(&mut tx, blog).await?;
    md.main_tumblr_user = Some(parsed.main_participant.clone());
    if parsed.main_participant_avatar_url.is_some() {
        md.main_tumblr_user_avatar_url = parsed.main_participant_avatar_url.clone();
    }
    let md = metadata::save(&mut tx, &md).await?;

    if md.overwrite_convo_data {
        info!("Overwriting existing conversations for blog {}", blog);
        conversations::delete_all_for_blog(&mut tx, blog).await?;
    }

    for parsed_convo in parsed.conversations {
        let existing = if md.overwrite_convo_data {
            None
        } else {
            find_existing(&mut tx, blog, &parsed_convo.conversation).await?
        };

        match existing {
            None => {
                summary.messages_added += add_conversation(&mut tx, blog, parsed_convo).await?;
                summary.conversations_added += 1;
            }
            Some(stored) => {
                summary.messages_added += merge_conversation(&mut tx, stored, parsed_convo).await?;
                summary.conversations_updated += 1;
            }
        }
    }

    tx.commit().await?;

    info!(
        "Imported conversations for {}: {} added, {} updated, {} new messages",
        blog, summary.conversations_added, summary.conversations_updated, summary.messages_added
    );
    Ok(summary)
}

/// Match on participant id first; participants can rename their blogs
async fn find_existing(
    conn: &mut SqliteConnection,
    blog: &str,
    incoming: &Conversation,
) -> Result<Option<Conversation>> {
    if let Some(participant_id) = &incoming.participant_id {
        let mut by_id = conversations::list_by_participant_id(conn, blog, participant_id).await?;
        if by_id.len() == 1 {
            return Ok(by_id.pop());
        }
    }
    conversations::find_by_participant(conn, blog, &incoming.participant).await
}

async fn add_conversation(
    conn: &mut SqliteConnection,
    blog: &str,
    parsed: ParsedConversation,
) -> Result<usize> {
    let mut convo = parsed.conversation;
    convo.blog = blog.to_string();
    let stored = conversations::insert(conn, &convo).await?;

    for mut message in parsed.messages.iter().cloned() {
        message.conversation_id = stored.id;
        conversations::insert_message(conn, &message).await?;
    }
    conversations::refresh_message_count(conn, stored.id).await?;
    Ok(parsed.messages.len())
}

async fn merge_conversation(
    conn: &mut SqliteConnection,
    mut stored: Conversation,
    parsed: ParsedConversation,
) -> Result<usize> {
    let known: HashSet<MessageIdentity> = conversations::messages_for_conversation(conn, stored.id)
        .await?
        .iter()
        .map(MessageIdentity::of)
        .collect();

    let mut added = 0;
    for mut message in parsed.messages {
        if known.contains(&MessageIdentity::of(&message)) {
            continue;
        }
        message.conversation_id = stored.id;
        conversations::insert_message(conn, &message).await?;
        added += 1;
    }

    let incoming = parsed.conversation;
    stored.participant = incoming.participant;
    if incoming.participant_avatar_url.is_some() {
        stored.participant_avatar_url = incoming.participant_avatar_url;
    }
    if incoming.participant_id.is_some() {
        stored.participant_id = incoming.participant_id;
    }
    conversations::update(conn, &stored).await?;
    conversations::refresh_message_count(conn, stored.id).await?;
    Ok(added)
}

/// Identity of a message across repeated exports
#[derive(PartialEq, Eq, Hash)]
struct MessageIdentity {
    timestamp: i64,
    received: bool,
    message_type: String,
    message: String,
}

impl MessageIdentity {
    fn of(message: &ConversationMessage) -> Self {
        Self {
            timestamp: message.timestamp,
            received: message.received,
            message_type: message.message_type.clone(),
            message: message.message.clone(),
        }
    }
}
