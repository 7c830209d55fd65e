//! Tumblr export documents
//!
//! Readers turn the post and conversation exports into models; the writer
//! produces a post export again for staged posts.

pub mod conversations;
pub mod posts;
pub mod pretty;
mod reader;
pub mod writer;

use crate::db::models::{Answer, Link, Photo, Post, Regular, Video};

/// Type-specific content of a post
#[derive(Debug, Clone, PartialEq)]
pub enum PostBody {
    Answer(Answer),
    Link(Link),
    Regular(Regular),
    Video(Video),
    Photos(Vec<Photo>),
}

/// A post together with its content, as found in (or written to) an export
#[derive(Debug, Clone, PartialEq)]
pub struct PostEntry {
    pub post: Post,
    pub body: PostBody,
}

pub use conversations::{parse_conversations, ParsedConversation, ParsedConversations};
pub use posts::{parse_posts, ParsedPosts};
pub use pretty::PrettyXmlWriter;
pub use writer::write_posts;
