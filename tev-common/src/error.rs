//! Common error types for TEV

use thiserror::Error;

/// Common result type for TEV operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the library and the HTTP service
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unexpected XML in an import document
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("{resource} not found with {field} : '{value}'")]
    NotFound {
        resource: String,
        field: String,
        value: String,
    },

    /// Content item submitted for a post that does not exist
    #[error("No parent post found with id {0}")]
    NoParentPost(String),

    #[error("Invalid post type: {0}")]
    InvalidType(String),

    #[error("Invalid theme: {0}")]
    InvalidTheme(String),

    /// Data belongs to a different blog than the one addressed
    #[error("Blog mismatch: expected {blog}, found {found}")]
    BlogMismatch { blog: String, found: String },

    #[error("Hashtag already exists: {0}")]
    ExistingTag(String),

    /// The last remaining blog cannot be removed
    #[error("Unable to delete the only metadata object")]
    UnableToDeleteMetadata,

    #[error("No metadata found")]
    NoMetadata,

    #[error("No staged posts for blog {0}")]
    NoStagedPosts(String),

    /// Message submitted for a conversation of another blog (or none)
    #[error("Conversation {conversation_id} does not belong to blog {blog}")]
    InvalidConvoParent { conversation_id: i64, blog: String },

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Media download failure
    #[error("Download failed: {0}")]
    Download(String),
}

impl Error {
    /// Shorthand for [`Error::NotFound`]
    pub fn not_found(resource: &str, field: &str, value: impl ToString) -> Self {
        Error::NotFound {
            resource: resource.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Xml(e.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_resource_and_field() {
        let err = Error::not_found("Post", "id", "12345");
        assert_eq!(err.to_string(), "Post not found with id : '12345'");
    }
}
