//! Writer for Tumblr-format post exports

use super::pretty::PrettyXmlWriter;
use super::{PostBody, PostEntry};
use crate::db::models::{Photo, Post, PostType};
use crate::{Error, Result};
use quick_xml::events::BytesStart;
use std::io::Write;

/// Render posts as a pretty-printed `<tumblr>` document
pub fn write_posts(entries: &[PostEntry]) -> Result<String> {
    let mut w = PrettyXmlWriter::new(Vec::new());
    w.declaration()?;
    w.start(BytesStart::new("tumblr").with_attributes([("version", "1.0")]))?;
    w.start(BytesStart::new("posts"))?;

    for entry in entries {
        write_post(&mut w, entry)?;
    }

    w.end("posts")?;
    w.end("tumblr")?;

    String::from_utf8(w.into_inner()).map_err(|e| Error::Xml(e.to_string()))
}

fn post_start(post: &Post) -> BytesStart<'static> {
    let unix_timestamp = post.unix_timestamp.to_string();
    let mut start = BytesStart::new("post").with_attributes([
        ("id", post.id.as_str()),
        ("url", post.url.as_str()),
        ("url-with-slug", post.url_with_slug.as_str()),
        ("type", post.post_type.as_str()),
        ("date-gmt", post.date_gmt.as_str()),
        ("date", post.date.as_str()),
        ("unix-timestamp", unix_timestamp.as_str()),
        ("format", "html"),
        ("reblog-key", post.reblog_key.as_str()),
        ("slug", post.slug.as_str()),
        ("state", post.state.as_str()),
        ("is_reblog", if post.is_reblog { "true" } else { "false" }),
        ("tumblelog", post.tumblelog.as_str()),
    ]);

    if post.post_type == PostType::Photo {
        if let Some(width) = post.width {
            start.push_attribute(("width", width.to_string().as_str()));
        }
        if let Some(height) = post.height {
            start.push_attribute(("height", height.to_string().as_str()));
        }
    }

    start.into_owned()
}

fn write_post<W: Write>(w: &mut PrettyXmlWriter<W>, entry: &PostEntry) -> Result<()> {
    w.start(post_start(&entry.post))?;

    match &entry.body {
        PostBody::Regular(regular) => {
            if let Some(title) = regular.title.as_deref().filter(|t| !t.is_empty()) {
                w.text_element("regular-title", title)?;
            }
            w.text_element("regular-body", &regular.body)?;
        }
        PostBody::Answer(answer) => {
            w.text_element("question", &answer.question)?;
            w.text_element("answer", &answer.answer)?;
        }
        PostBody::Link(link) => {
            w.text_element("link-text", &link.text)?;
            w.text_element("link-url", &link.url)?;
            if let Some(description) = &link.description {
                w.text_element("link-description", description)?;
            }
        }
        PostBody::Video(video) => {
            w.start(BytesStart::new("video-source"))?;
            optional_element(w, "content-type", video.content_type.as_deref())?;
            optional_element(w, "extension", video.extension.as_deref())?;
            optional_element(w, "width", video.width.map(|v| v.to_string()).as_deref())?;
            optional_element(w, "height", video.height.map(|v| v.to_string()).as_deref())?;
            optional_element(w, "duration", video.duration.map(|v| v.to_string()).as_deref())?;
            optional_element(w, "revision", video.revision.as_deref())?;
            w.end("video-source")?;
            optional_element(w, "video-caption", video.video_caption.as_deref())?;
        }
        PostBody::Photos(photos) => write_photos(w, photos)?,
    }

    for tag in entry.post.tag_list() {
        w.text_element("tag", &tag)?;
    }

    w.end("post")
}

fn optional_element<W: Write>(w: &mut PrettyXmlWriter<W>, name: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) => w.text_element(name, v),
        None => Ok(()),
    }
}

fn write_photo_urls<W: Write>(w: &mut PrettyXmlWriter<W>, photo: &Photo) -> Result<()> {
    for (max_width, url) in photo.urls() {
        w.start(BytesStart::new("photo-url").with_attributes([("max-width", max_width)]))?;
        w.text(url)?;
        w.end("photo-url")?;
    }
    Ok(())
}

/// First photo's caption and urls at post level, then a photoset when there
/// are more photos or the single photo carries an offset. Photoset entries
/// repeat the caption and link url only where they differ from the first.
fn write_photos<W: Write>(w: &mut PrettyXmlWriter<W>, photos: &[Photo]) -> Result<()> {
    let Some(first) = photos.first() else {
        return Ok(());
    };

    w.text_element("photo-caption", &first.caption)?;
    optional_element(w, "photo-link-url", first.photo_link_url.as_deref())?;
    write_photo_urls(w, first)?;

    if photos.len() < 2 && first.offset.is_none() {
        return Ok(());
    }

    w.start(BytesStart::new("photoset"))?;
    for photo in photos {
        let mut start = BytesStart::new("photo");
        if let Some(offset) = &photo.offset {
            start.push_attribute(("offset", offset.as_str()));
        }
        if let Some(width) = photo.width {
            start.push_attribute(("width", width.to_string().as_str()));
        }
        if let Some(height) = photo.height {
            start.push_attribute(("height", height.to_string().as_str()));
        }
        w.start(start)?;
        if photo.caption != first.caption {
            w.text_element("photo-caption", &photo.caption)?;
        }
        if photo.photo_link_url != first.photo_link_url {
            optional_element(w, "photo-link-url", photo.photo_link_url.as_deref())?;
        }
        write_photo_urls(w, photo)?;
        w.end("photo")?;
    }
    w.end("photoset")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Link, Video};
    use crate::xml::parse_posts;

    fn entry(id: &str, post_type: PostType, body: PostBody) -> PostEntry {
        let mut post = Post::new(id, "blog", post_type);
        post.state = "published".to_string();
        post.unix_timestamp = 1_500_000_000;
        post.add_tag("one");
        post.add_tag("two");
        PostEntry { post, body }
    }

    #[test]
    fn writes_document_frame_and_tags() {
        let link = Link {
            post_id: "10".to_string(),
            text: "Rust & friends".to_string(),
            url: "https://www.rust-lang.org".to_string(),
            description: None,
        };
        let xml = write_posts(&[entry("10", PostType::Link, PostBody::Link(link))]).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<tumblr version=\"1.0\">\n  <posts>\n    <post "));
        assert!(xml.contains("\n      <link-text>Rust &amp; friends</link-text>"));
        assert!(xml.contains("\n      <tag>one</tag>\n      <tag>two</tag>\n    </post>"));
        assert!(xml.ends_with("\n  </posts>\n</tumblr>"));
        assert!(!xml.contains("link-description"));
    }

    #[test]
    fn written_posts_read_back_unchanged() {
        let photos = vec![
            Photo {
                post_id: "20".to_string(),
                caption: "set".to_string(),
                offset: Some("o1".to_string()),
                width: Some(1280),
                height: Some(720),
                url1280: Some("https://media/a_1280.jpg".to_string()),
                ..Photo::default()
            },
            Photo {
                post_id: "20".to_string(),
                caption: "set".to_string(),
                offset: Some("o2".to_string()),
                width: Some(500),
                height: Some(500),
                url1280: Some("https://media/b_1280.jpg".to_string()),
                url75: Some("https://media/b_75.jpg".to_string()),
                ..Photo::default()
            },
        ];
        let video = Video {
            post_id: "21".to_string(),
            content_type: Some("video/mp4".to_string()),
            width: Some(400),
            video_caption: Some("<b>clip</b>".to_string()),
            ..Video::default()
        };
        let entries = vec![
            entry("20", PostType::Photo, PostBody::Photos(photos)),
            entry("21", PostType::Video, PostBody::Video(video)),
        ];

        let xml = write_posts(&entries).unwrap();
        let parsed = parse_posts(xml.as_bytes()).unwrap();

        assert!(parsed.unsupported.is_empty());
        assert_eq!(parsed.posts, entries);
    }

    #[test]
    fn per_photo_link_urls_and_single_offset_read_back() {
        let set = vec![
            Photo {
                post_id: "30".to_string(),
                caption: "set".to_string(),
                photo_link_url: Some("https://example.com/a".to_string()),
                offset: Some("o1".to_string()),
                url1280: Some("https://media/a_1280.png".to_string()),
                ..Photo::default()
            },
            Photo {
                post_id: "30".to_string(),
                caption: "set".to_string(),
                photo_link_url: Some("https://example.com/b".to_string()),
                offset: Some("o2".to_string()),
                url1280: Some("https://media/b_1280.gif".to_string()),
                ..Photo::default()
            },
        ];
        let single = vec![Photo {
            post_id: "31".to_string(),
            caption: "alone".to_string(),
            offset: Some("o1".to_string()),
            width: Some(640),
            height: Some(480),
            url1280: Some("https://media/c_1280.jpg".to_string()),
            ..Photo::default()
        }];
        let entries = vec![
            entry("30", PostType::Photo, PostBody::Photos(set)),
            entry("31", PostType::Photo, PostBody::Photos(single)),
        ];

        let xml = write_posts(&entries).unwrap();
        assert_eq!(xml.matches("<photo-link-url>https://example.com/a</photo-link-url>").count(), 1);
        assert!(xml.contains("<photo-link-url>https://example.com/b</photo-link-url>"));

        let parsed = parse_posts(xml.as_bytes()).unwrap();
        assert_eq!(parsed.posts, entries);
    }
}
