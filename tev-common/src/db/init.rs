//! Database initialization
//!
//! Creates the database file on first run and the schema on every start
//! (`CREATE TABLE IF NOT EXISTS`), then applies versioned migrations.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL lets the UI keep reading while an import transaction is open
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;
    crate::db::migrations::run_migrations(&pool).await?;

    Ok(pool)
}

/// Create every table and index (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER PRIMARY KEY,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS post (
        id TEXT PRIMARY KEY,
        url TEXT NOT NULL DEFAULT '',
        url_with_slug TEXT NOT NULL DEFAULT '',
        date_gmt TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL DEFAULT '',
        unix_timestamp INTEGER NOT NULL DEFAULT 0,
        reblog_key TEXT NOT NULL DEFAULT '',
        slug TEXT NOT NULL DEFAULT '',
        is_reblog INTEGER NOT NULL DEFAULT 0,
        tumblelog TEXT NOT NULL,
        width INTEGER,
        height INTEGER,
        post_type TEXT NOT NULL,
        state TEXT NOT NULL DEFAULT '',
        is_read INTEGER NOT NULL DEFAULT 0,
        is_favourite INTEGER NOT NULL DEFAULT 0,
        tags TEXT NOT NULL DEFAULT ''
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_post_blog_type ON post (tumblelog, post_type)",
    r#"
    CREATE TABLE IF NOT EXISTS answer (
        post_id TEXT PRIMARY KEY REFERENCES post(id) ON DELETE CASCADE,
        question TEXT NOT NULL DEFAULT '',
        answer TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS link (
        post_id TEXT PRIMARY KEY REFERENCES post(id) ON DELETE CASCADE,
        text TEXT NOT NULL DEFAULT '',
        url TEXT NOT NULL DEFAULT '',
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS regular (
        post_id TEXT PRIMARY KEY REFERENCES post(id) ON DELETE CASCADE,
        title TEXT,
        body TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS video (
        post_id TEXT PRIMARY KEY REFERENCES post(id) ON DELETE CASCADE,
        content_type TEXT,
        extension TEXT,
        width INTEGER,
        height INTEGER,
        duration INTEGER,
        revision TEXT,
        video_caption TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS photo (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        post_id TEXT NOT NULL REFERENCES post(id) ON DELETE CASCADE,
        caption TEXT NOT NULL DEFAULT '',
        photo_link_url TEXT,
        photo_offset TEXT,
        width INTEGER,
        height INTEGER,
        url1280 TEXT,
        url500 TEXT,
        url400 TEXT,
        url250 TEXT,
        url100 TEXT,
        url75 TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_photo_post ON photo (post_id)",
    r#"
    CREATE TABLE IF NOT EXISTS hashtag (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tag TEXT NOT NULL,
        blog TEXT,
        count INTEGER NOT NULL DEFAULT 0,
        UNIQUE (tag, blog)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS metadata (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        blog TEXT NOT NULL UNIQUE,
        base_media_path TEXT,
        main_tumblr_user TEXT,
        main_tumblr_user_avatar_url TEXT,
        sort_column TEXT NOT NULL,
        sort_order TEXT NOT NULL,
        filter TEXT NOT NULL,
        fav_filter TEXT NOT NULL,
        page_length INTEGER NOT NULL,
        show_reading_pane INTEGER NOT NULL DEFAULT 0,
        overwrite_post_data INTEGER NOT NULL DEFAULT 0,
        overwrite_convo_data INTEGER NOT NULL DEFAULT 0,
        conversation_display_style TEXT NOT NULL,
        conversation_sort_column TEXT NOT NULL,
        conversation_sort_order TEXT NOT NULL,
        theme TEXT NOT NULL,
        is_default INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS conversation (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        blog TEXT NOT NULL,
        participant TEXT NOT NULL,
        participant_avatar_url TEXT,
        participant_id TEXT,
        num_messages INTEGER NOT NULL DEFAULT 0,
        hide_conversation INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_conversation_blog ON conversation (blog)",
    r#"
    CREATE TABLE IF NOT EXISTS conversation_message (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        conversation_id INTEGER NOT NULL REFERENCES conversation(id) ON DELETE CASCADE,
        timestamp INTEGER NOT NULL,
        received INTEGER NOT NULL,
        message_type TEXT NOT NULL,
        message TEXT NOT NULL DEFAULT ''
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_message_conversation ON conversation_message (conversation_id, timestamp)",
    r#"
    CREATE TABLE IF NOT EXISTS staging_post (
        id TEXT PRIMARY KEY,
        blog TEXT NOT NULL
    )
    "#,
];
