//! Database schema migrations
//!
//! Fresh databases get the current schema from [`crate::db::init`]; migrations
//! bring databases written by older builds up to date. Every migration must be
//! idempotent, and existing migrations are never edited: add a new one and
//! bump [`CURRENT_SCHEMA_VERSION`].

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Latest applied version, 0 for a database that has never been migrated
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("Migration v2 completed");
    }

    Ok(())
}

/// Add a column unless the table already has it
async fn add_column_if_missing(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<bool> {
    let has_column: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM pragma_table_info('{}') WHERE name = ?",
        table
    ))
    .bind(column)
    .fetch_one(pool)
    .await?;

    if has_column > 0 {
        return Ok(false);
    }

    sqlx::query(&format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        table, column, definition
    ))
    .execute(pool)
    .await?;

    info!("  Added {}.{}", table, column);
    Ok(true)
}

/// Migration v1: favourites on posts
///
/// Databases created before favourites existed only tracked read state.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    add_column_if_missing(pool, "post", "is_favourite", "INTEGER NOT NULL DEFAULT 0").await?;
    Ok(())
}

/// Migration v2: per-blog theme and conversation overwrite flag
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    add_column_if_missing(pool, "metadata", "theme", "TEXT NOT NULL DEFAULT 'base'").await?;
    add_column_if_missing(
        pool,
        "metadata",
        "overwrite_convo_data",
        "INTEGER NOT NULL DEFAULT 0",
    )
    .await?;
    Ok(())
}
