//! HTTP API handlers for tev-server

pub mod admin;
pub mod buildinfo;
pub mod content;
pub mod conversations;
pub mod hashtags;
pub mod health;
pub mod import;
pub mod media;
pub mod metadata;
pub mod photos;
pub mod posts;
pub mod staging;
pub mod ui;

pub use admin::admin_routes;
pub use content::content_routes;
pub use conversations::conversation_routes;
pub use hashtags::hashtag_routes;
pub use health::health_routes;
pub use import::import_routes;
pub use media::media_routes;
pub use metadata::metadata_routes;
pub use photos::photo_routes;
pub use posts::post_routes;
pub use staging::staging_routes;
pub use ui::ui_routes;
