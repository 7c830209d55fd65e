//! Database models
//!
//! JSON field names are camelCase because the browser UI consumes them directly.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Post types that can be imported and viewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PostType {
    Answer,
    Link,
    Photo,
    Regular,
    Video,
}

impl PostType {
    pub const ALL: [PostType; 5] = [
        PostType::Answer,
        PostType::Link,
        PostType::Photo,
        PostType::Regular,
        PostType::Video,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Answer => "answer",
            PostType::Link => "link",
            PostType::Photo => "photo",
            PostType::Regular => "regular",
            PostType::Video => "video",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PostType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub url_with_slug: String,
    #[serde(default)]
    pub date_gmt: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub unix_timestamp: i64,
    #[serde(default)]
    pub reblog_key: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub is_reblog: bool,
    pub tumblelog: String,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(rename = "type")]
    pub post_type: PostType,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_favourite: bool,
    /// Lower-cased tags joined with ", "
    #[serde(default)]
    pub tags: String,
}

impl Post {
    /// Empty post of the given type, used as a starting point by the XML reader
    pub fn new(id: impl Into<String>, tumblelog: impl Into<String>, post_type: PostType) -> Self {
        Self {
            id: id.into(),
            url: String::new(),
            url_with_slug: String::new(),
            date_gmt: String::new(),
            date: String::new(),
            unix_timestamp: 0,
            reblog_key: String::new(),
            slug: String::new(),
            is_reblog: false,
            tumblelog: tumblelog.into(),
            width: None,
            height: None,
            post_type,
            state: String::new(),
            is_read: false,
            is_favourite: false,
            tags: String::new(),
        }
    }

    /// Copy content fields from `details`, keeping id and read/favourite state
    pub fn update_data(&mut self, details: &Post) {
        self.url = details.url.clone();
        self.url_with_slug = details.url_with_slug.clone();
        self.date_gmt = details.date_gmt.clone();
        self.date = details.date.clone();
        self.unix_timestamp = details.unix_timestamp;
        self.reblog_key = details.reblog_key.clone();
        self.slug = details.slug.clone();
        self.is_reblog = details.is_reblog;
        self.tumblelog = details.tumblelog.clone();
        self.width = details.width;
        self.height = details.height;
        self.post_type = details.post_type;
        self.state = details.state.clone();
        self.tags = details.tags.clone();
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Append a tag in the stored format (lower-cased, ", " separated)
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return;
        }
        if !self.tags.is_empty() {
            self.tags.push_str(", ");
        }
        self.tags.push_str(&tag);
    }

    pub fn is_published(&self) -> bool {
        self.state == "published"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Regular {
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub revision: Option<String>,
    #[serde(default)]
    pub video_caption: Option<String>,
}

/// One image of a photo post; photo posts may have several
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub photo_link_url: Option<String>,
    #[serde(default)]
    #[sqlx(rename = "photo_offset")]
    pub offset: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub url1280: Option<String>,
    #[serde(default)]
    pub url500: Option<String>,
    #[serde(default)]
    pub url400: Option<String>,
    #[serde(default)]
    pub url250: Option<String>,
    #[serde(default)]
    pub url100: Option<String>,
    #[serde(default)]
    pub url75: Option<String>,
}

impl Photo {
    /// Set the url for a `photo-url max-width` value; unknown widths are ignored
    pub fn set_url(&mut self, max_width: &str, url: String) {
        let slot = match max_width {
            "1280" => &mut self.url1280,
            "500" => &mut self.url500,
            "400" => &mut self.url400,
            "250" => &mut self.url250,
            "100" => &mut self.url100,
            "75" => &mut self.url75,
            _ => return,
        };
        *slot = Some(url);
    }

    /// Urls keyed by `max-width`, largest first
    pub fn urls(&self) -> Vec<(&'static str, &str)> {
        [
            ("1280", &self.url1280),
            ("500", &self.url500),
            ("400", &self.url400),
            ("250", &self.url250),
            ("100", &self.url100),
            ("75", &self.url75),
        ]
        .into_iter()
        .filter_map(|(width, url)| url.as_deref().map(|u| (width, u)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Hashtag {
    #[serde(default)]
    pub id: i64,
    pub tag: String,
    /// Blog name, or several names joined with ", " in merged listings
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub count: i64,
}

/// Per-blog preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub id: i64,
    pub blog: String,
    #[serde(default)]
    pub base_media_path: Option<String>,
    #[serde(default)]
    pub main_tumblr_user: Option<String>,
    #[serde(default)]
    pub main_tumblr_user_avatar_url: Option<String>,
    pub sort_column: String,
    pub sort_order: String,
    pub filter: String,
    pub fav_filter: String,
    pub page_length: i64,
    #[serde(default)]
    pub show_reading_pane: bool,
    #[serde(default)]
    pub overwrite_post_data: bool,
    #[serde(default)]
    pub overwrite_convo_data: bool,
    pub conversation_display_style: String,
    pub conversation_sort_column: String,
    pub conversation_sort_order: String,
    pub theme: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Metadata {
    pub fn new_default(blog: impl Into<String>) -> Self {
        Self {
            id: 0,
            blog: blog.into(),
            base_media_path: None,
            main_tumblr_user: None,
            main_tumblr_user_avatar_url: None,
            sort_column: SORT_COLUMNS[0].to_string(),
            sort_order: SORT_ORDERS[1].to_string(),
            filter: FILTER_TYPES[2].to_string(),
            fav_filter: FAV_FILTERS[2].to_string(),
            page_length: PAGE_LENGTHS[0],
            show_reading_pane: false,
            overwrite_post_data: false,
            overwrite_convo_data: false,
            conversation_display_style: CONVERSATION_DISPLAY_STYLES[0].to_string(),
            conversation_sort_column: CONVERSATION_SORT_COLUMNS[0].to_string(),
            conversation_sort_order: SORT_ORDERS[0].to_string(),
            theme: DEFAULT_THEME.to_string(),
            is_default: false,
        }
    }

    pub fn has_valid_theme(&self) -> bool {
        THEMES.contains(&self.theme.as_str())
    }
}

pub const FILTER_TYPES: [&str; 3] = ["Filter Read Posts", "Filter Unread Posts", "Do Not Filter"];
pub const SORT_COLUMNS: [&str; 6] = ["ID", "Type", "Slug", "Date", "Is Read", "Is Favourite"];
pub const SORT_ORDERS: [&str; 2] = ["Ascending", "Descending"];
pub const FAV_FILTERS: [&str; 3] = ["Show Favourites", "Show Non Favourites", "Show Everything"];
/// `-1` means "all posts on one page"
pub const PAGE_LENGTHS: [i64; 5] = [10, 25, 50, 100, -1];
pub const CONVERSATION_DISPLAY_STYLES: [&str; 2] = ["cloud", "table"];
pub const CONVERSATION_SORT_COLUMNS: [&str; 2] = ["participantName", "numMessages"];
pub const THEMES: [&str; 2] = ["base", "dark"];
pub const DEFAULT_THEME: &str = "base";

/// Drop-down values for the preferences UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticListData {
    pub filter_types: Vec<String>,
    pub sort_columns: Vec<String>,
    pub sort_orders: Vec<String>,
    pub fav_filters: Vec<String>,
    pub page_lengths: Vec<i64>,
    pub conversation_styles: Vec<String>,
    pub conversation_sort_columns: Vec<String>,
    pub themes: Vec<String>,
}

impl Default for StaticListData {
    fn default() -> Self {
        fn owned(values: &[&str]) -> Vec<String> {
            values.iter().map(|v| v.to_string()).collect()
        }

        Self {
            filter_types: owned(&FILTER_TYPES),
            sort_columns: owned(&SORT_COLUMNS),
            sort_orders: owned(&SORT_ORDERS),
            fav_filters: owned(&FAV_FILTERS),
            page_lengths: PAGE_LENGTHS.to_vec(),
            conversation_styles: owned(&CONVERSATION_DISPLAY_STYLES),
            conversation_sort_columns: owned(&CONVERSATION_SORT_COLUMNS),
            themes: owned(&THEMES),
        }
    }
}

/// All post data of one blog, for bulk transfer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogContents {
    pub posts: Vec<Post>,
    pub answers: Vec<Answer>,
    pub links: Vec<Link>,
    pub photos: Vec<Photo>,
    pub regulars: Vec<Regular>,
    pub videos: Vec<Video>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub blog: String,
    pub participant: String,
    #[serde(default)]
    pub participant_avatar_url: Option<String>,
    #[serde(default)]
    pub participant_id: Option<String>,
    #[serde(default)]
    pub num_messages: i64,
    #[serde(default)]
    pub hide_conversation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub conversation_id: i64,
    pub timestamp: i64,
    /// `true` when the other participant sent the message
    pub received: bool,
    /// `TEXT`, `IMAGE` or `POSTREF`
    #[serde(rename = "type")]
    pub message_type: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StagingPost {
    pub id: String,
    pub blog: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_type_parses_case_insensitively() {
        assert_eq!("Photo".parse::<PostType>().unwrap(), PostType::Photo);
        assert!(matches!(
            "quote".parse::<PostType>(),
            Err(Error::InvalidType(t)) if t == "quote"
        ));
    }

    #[test]
    fn tags_are_lowercased_and_joined() {
        let mut post = Post::new("1", "blog", PostType::Regular);
        post.add_tag("Rust");
        post.add_tag("  ");
        post.add_tag("XML Export");
        assert_eq!(post.tags, "rust, xml export");
        assert_eq!(post.tag_list(), vec!["rust", "xml export"]);
    }

    #[test]
    fn update_data_keeps_read_state() {
        let mut stored = Post::new("1", "blog", PostType::Regular);
        stored.is_read = true;
        stored.is_favourite = true;

        let mut incoming = Post::new("99", "blog", PostType::Regular);
        incoming.slug = "new-slug".to_string();
        incoming.unix_timestamp = 42;

        stored.update_data(&incoming);
        assert_eq!(stored.id, "1");
        assert_eq!(stored.slug, "new-slug");
        assert_eq!(stored.unix_timestamp, 42);
        assert!(stored.is_read && stored.is_favourite);
    }

    #[test]
    fn default_metadata_uses_first_choices() {
        let md = Metadata::new_default("blog");
        assert_eq!(md.sort_column, "ID");
        assert_eq!(md.sort_order, "Descending");
        assert_eq!(md.filter, "Do Not Filter");
        assert_eq!(md.fav_filter, "Show Everything");
        assert_eq!(md.page_length, 10);
        assert!(md.has_valid_theme());
    }

    #[test]
    fn post_json_uses_type_field() {
        let post = Post::new("7", "blog", PostType::Video);
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["isRead"], false);
        assert_eq!(json["urlWithSlug"], "");
    }
}
