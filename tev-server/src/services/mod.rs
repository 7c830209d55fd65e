//! Operations spanning the parsers, the database and the media folder

pub mod export;
pub mod import;
pub mod media;
