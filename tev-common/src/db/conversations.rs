//! Conversation and message queries

use crate::db::models::{Conversation, ConversationMessage};
use crate::{Error, Result};
use sqlx::SqliteConnection;

pub async fn list_for_blog(conn: &mut SqliteConnection, blog: &str) -> Result<Vec<Conversation>> {
    let convos = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversation WHERE blog = ? ORDER BY participant",
    )
    .bind(blog)
    .fetch_all(conn)
    .await?;
    Ok(convos)
}

/// Conversations filtered on the hidden flag
pub async fn list_by_hidden(
    conn: &mut SqliteConnection,
    blog: &str,
    hidden: bool,
) -> Result<Vec<Conversation>> {
    let convos = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversation WHERE blog = ? AND hide_conversation = ? ORDER BY participant",
    )
    .bind(blog)
    .bind(hidden)
    .fetch_all(conn)
    .await?;
    Ok(convos)
}

pub async fn get(conn: &mut SqliteConnection, blog: &str, id: i64) -> Result<Conversation> {
    sqlx::query_as::<_, Conversation>("SELECT * FROM conversation WHERE id = ? AND blog = ?")
        .bind(id)
        .bind(blog)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| Error::not_found("Conversation", "id", id))
}

pub async fn find_by_participant(
    conn: &mut SqliteConnection,
    blog: &str,
    participant: &str,
) -> Result<Option<Conversation>> {
    let found = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversation WHERE blog = ? AND participant = ? ORDER BY id LIMIT 1",
    )
    .bind(blog)
    .bind(participant)
    .fetch_optional(conn)
    .await?;
    Ok(found)
}

pub async fn list_by_participant_id(
    conn: &mut SqliteConnection,
    blog: &str,
    participant_id: &str,
) -> Result<Vec<Conversation>> {
    let found = sqlx::query_as::<_, Conversation>(
        "SELECT * FROM conversation WHERE blog = ? AND participant_id = ? ORDER BY id",
    )
    .bind(blog)
    .bind(participant_id)
    .fetch_all(conn)
    .await?;
    Ok(found)
}

pub async fn insert(conn: &mut SqliteConnection, convo: &Conversation) -> Result<Conversation> {
    let result = sqlx::query(
        r#"
        INSERT INTO conversation (
            blog, participant, participant_avatar_url, participant_id, num_messages, hide_conversation
        )
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&convo.blog)
    .bind(&convo.participant)
    .bind(convo.participant_avatar_url.as_deref())
    .bind(convo.participant_id.as_deref())
    .bind(convo.num_messages)
    .bind(convo.hide_conversation)
    .execute(conn)
    .await?;

    Ok(Conversation {
        id: result.last_insert_rowid(),
        ..convo.clone()
    })
}

pub async fn update(conn: &mut SqliteConnection, convo: &Conversation) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE conversation SET
            participant = ?, participant_avatar_url = ?, participant_id = ?,
            num_messages = ?, hide_conversation = ?
        WHERE id = ? AND blog = ?
        "#,
    )
    .bind(&convo.participant)
    .bind(convo.participant_avatar_url.as_deref())
    .bind(convo.participant_id.as_deref())
    .bind(convo.num_messages)
    .bind(convo.hide_conversation)
    .bind(convo.id)
    .bind(&convo.blog)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Conversation", "id", convo.id));
    }
    Ok(())
}

/// Hide or show every conversation with `participant`
pub async fn set_hidden_for_participant(
    conn: &mut SqliteConnection,
    blog: &str,
    participant: &str,
    hidden: bool,
) -> Result<Conversation> {
    let result = sqlx::query(
        "UPDATE conversation SET hide_conversation = ? WHERE blog = ? AND participant = ?",
    )
    .bind(hidden)
    .bind(blog)
    .bind(participant)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Conversation", "participant", participant));
    }

    find_by_participant(conn, blog, participant)
        .await?
        .ok_or_else(|| Error::not_found("Conversation", "participant", participant))
}

pub async fn unhide_all(conn: &mut SqliteConnection, blog: &str) -> Result<u64> {
    let result = sqlx::query("UPDATE conversation SET hide_conversation = 0 WHERE blog = ?")
        .bind(blog)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Delete a conversation together with its messages
pub async fn delete(conn: &mut SqliteConnection, blog: &str, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM conversation WHERE id = ? AND blog = ?")
        .bind(id)
        .bind(blog)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Conversation", "id", id));
    }
    Ok(())
}

pub async fn delete_all_for_blog(conn: &mut SqliteConnection, blog: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM conversation WHERE blog = ?")
        .bind(blog)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn messages_for_conversation(
    conn: &mut SqliteConnection,
    conversation_id: i64,
) -> Result<Vec<ConversationMessage>> {
    let messages = sqlx::query_as::<_, ConversationMessage>(
        "SELECT * FROM conversation_message WHERE conversation_id = ? ORDER BY timestamp, id",
    )
    .bind(conversation_id)
    .fetch_all(conn)
    .await?;
    Ok(messages)
}

pub async fn messages_for_blog(
    conn: &mut SqliteConnection,
    blog: &str,
) -> Result<Vec<ConversationMessage>> {
    let messages = sqlx::query_as::<_, ConversationMessage>(
        r#"
        SELECT m.* FROM conversation_message m
        JOIN conversation c ON c.id = m.conversation_id
        WHERE c.blog = ?
        ORDER BY m.conversation_id, m.timestamp, m.id
        "#,
    )
    .bind(blog)
    .fetch_all(conn)
    .await?;
    Ok(messages)
}

/// Find a message that belongs to a conversation of `blog`
pub async fn get_message(conn: &mut SqliteConnection, blog: &str, id: i64) -> Result<ConversationMessage> {
    sqlx::query_as::<_, ConversationMessage>(
        r#"
        SELECT m.* FROM conversation_message m
        JOIN conversation c ON c.id = m.conversation_id
        WHERE m.id = ? AND c.blog = ?
        "#,
    )
    .bind(id)
    .bind(blog)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| Error::not_found("Conversation message", "id", id))
}

pub async fn insert_message(
    conn: &mut SqliteConnection,
    message: &ConversationMessage,
) -> Result<ConversationMessage> {
    let result = sqlx::query(
        r#"
        INSERT INTO conversation_message (conversation_id, timestamp, received, message_type, message)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(message.conversation_id)
    .bind(message.timestamp)
    .bind(message.received)
    .bind(&message.message_type)
    .bind(&message.message)
    .execute(conn)
    .await?;

    Ok(ConversationMessage {
        id: result.last_insert_rowid(),
        ..message.clone()
    })
}

pub async fn update_message(conn: &mut SqliteConnection, message: &ConversationMessage) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE conversation_message SET
            conversation_id = ?, timestamp = ?, received = ?, message_type = ?, message = ?
        WHERE id = ?
        "#,
    )
    .bind(message.conversation_id)
    .bind(message.timestamp)
    .bind(message.received)
    .bind(&message.message_type)
    .bind(&message.message)
    .bind(message.id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Conversation message", "id", message.id));
    }
    Ok(())
}

pub async fn delete_message(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM conversation_message WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::not_found("Conversation message", "id", id));
    }
    Ok(())
}

pub async fn delete_messages_for_blog(conn: &mut SqliteConnection, blog: &str) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM conversation_message WHERE conversation_id IN (SELECT id FROM conversation WHERE blog = ?)",
    )
    .bind(blog)
    .execute(&mut *conn)
    .await?;

    sqlx::query("UPDATE conversation SET num_messages = 0 WHERE blog = ?")
        .bind(blog)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

/// Recount messages after messages were added or removed
pub async fn refresh_message_count(conn: &mut SqliteConnection, conversation_id: i64) -> Result<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversation_message WHERE conversation_id = ?")
        .bind(conversation_id)
        .fetch_one(&mut *conn)
        .await?;

    sqlx::query("UPDATE conversation SET num_messages = ? WHERE id = ?")
        .bind(n)
        .bind(conversation_id)
        .execute(conn)
        .await?;

    Ok(n)
}
