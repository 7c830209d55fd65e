//! Reader for the Tumblr post export (`posts.xml`)

use super::reader::{attributes, local_name, parse_number, premature_eof, XmlSource};
use super::{PostBody, PostEntry};
use crate::db::models::{Answer, Link, Photo, Post, PostType, Regular, Video};
use crate::Result;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use tracing::debug;

/// Result of reading a post export
#[derive(Debug, Default)]
pub struct ParsedPosts {
    pub posts: Vec<PostEntry>,
    /// `(id, type)` of posts whose type is not supported
    pub unsupported: Vec<(String, String)>,
}

/// Read every `<post>` element of an export document
pub fn parse_posts(xml: &[u8]) -> Result<ParsedPosts> {
    let mut src = XmlSource::new(xml);
    let mut parsed = ParsedPosts::default();

    loop {
        match src.next_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"post" => {
                parsed.push(read_post(&mut src, &e, true)?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"post" => {
                parsed.push(read_post(&mut src, &e, false)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(parsed)
}

impl ParsedPosts {
    fn push(&mut self, item: PostOrSkip) {
        match item {
            PostOrSkip::Post(entry) => self.posts.push(entry),
            PostOrSkip::Unsupported(id, post_type) => {
                debug!("Skipping post {} of unsupported type {}", id, post_type);
                self.unsupported.push((id, post_type));
            }
        }
    }
}

enum PostOrSkip {
    Post(PostEntry),
    Unsupported(String, String),
}

/// Content gathered while reading the children of one `<post>`
#[derive(Default)]
struct Draft {
    answer: Answer,
    link: Link,
    regular: Regular,
    video: Video,
    photo: Photo,
    photoset: Vec<Photo>,
}

fn read_post(
    src: &mut XmlSource<'_>,
    start: &BytesStart<'_>,
    has_children: bool,
) -> Result<PostOrSkip> {
    let attrs = attributes(start)?;
    let attr = |name: &str| attrs.get(name).cloned().unwrap_or_default();

    let id = attr("id");
    let type_name = attr("type");
    let post_type = match type_name.parse::<PostType>() {
        Ok(t) => t,
        Err(_) => {
            if has_children {
                src.skip_element()?;
            }
            return Ok(PostOrSkip::Unsupported(id, type_name));
        }
    };

    let mut post = Post::new(id, attr("tumblelog"), post_type);
    post.url = attr("url");
    post.url_with_slug = attr("url-with-slug");
    post.date_gmt = attr("date-gmt");
    post.date = attr("date");
    post.unix_timestamp = parse_number("unix-timestamp", attrs.get("unix-timestamp").map(String::as_str))?
        .unwrap_or_default();
    post.reblog_key = attr("reblog-key");
    post.slug = attr("slug");
    post.state = attr("state");
    post.is_reblog = attr("is_reblog") == "true";
    post.width = parse_number("width", attrs.get("width").map(String::as_str))?;
    post.height = parse_number("height", attrs.get("height").map(String::as_str))?;

    let mut draft = Draft::default();
    // depth of open containers whose children are read in this loop
    let mut depth = 0usize;

    while has_children {
        match src.next_event()? {
            Event::Start(e) => {
                let name = local_name(&e);
                match name.as_str() {
                    "video-source" => depth += 1,
                    "photoset" => draft.photoset = read_photoset(src)?,
                    "tag" => {
                        let tag = src.read_text()?;
                        post.add_tag(&tag);
                    }
                    "photo-url" => {
                        let max_width = attributes(&e)?.remove("max-width").unwrap_or_default();
                        let url = src.read_text()?;
                        draft.photo.set_url(&max_width, url);
                    }
                    _ => {
                        let text = src.read_text()?;
                        apply_field(&mut draft, &name, text)?;
                    }
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => return Err(premature_eof()),
            _ => {}
        }
    }

    let body = build_body(&post, draft);
    Ok(PostOrSkip::Post(PostEntry { post, body }))
}

/// Store the text of a simple child element; unknown elements are ignored
fn apply_field(draft: &mut Draft, name: &str, text: String) -> Result<()> {
    match name {
        "regular-title" => draft.regular.title = Some(text),
        "regular-body" => draft.regular.body = text,
        "question" => draft.answer.question = text,
        "answer" => draft.answer.answer = text,
        "link-text" => draft.link.text = text,
        "link-url" => draft.link.url = text,
        "link-description" => draft.link.description = Some(text),
        "photo-caption" => draft.photo.caption = text,
        "photo-link-url" => draft.photo.photo_link_url = Some(text),
        "content-type" => draft.video.content_type = Some(text),
        "extension" => draft.video.extension = Some(text),
        "width" => draft.video.width = parse_number(name, Some(&text))?,
        "height" => draft.video.height = parse_number(name, Some(&text))?,
        "duration" => draft.video.duration = parse_number(name, Some(&text))?,
        "revision" => draft.video.revision = Some(text),
        "video-caption" => draft.video.video_caption = Some(text),
        _ => {}
    }
    Ok(())
}

fn read_photoset(src: &mut XmlSource<'_>) -> Result<Vec<Photo>> {
    let mut photos = Vec::new();
    loop {
        match src.next_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"photo" => {
                photos.push(read_photoset_photo(src, attributes(&e)?)?);
            }
            Event::Start(_) => src.skip_element()?,
            Event::End(_) => return Ok(photos),
            Event::Eof => return Err(premature_eof()),
            _ => {}
        }
    }
}

fn read_photoset_photo(src: &mut XmlSource<'_>, attrs: HashMap<String, String>) -> Result<Photo> {
    let mut photo = Photo {
        offset: attrs.get("offset").cloned(),
        width: parse_number("width", attrs.get("width").map(String::as_str))?,
        height: parse_number("height", attrs.get("height").map(String::as_str))?,
        caption: attrs.get("caption").cloned().unwrap_or_default(),
        ..Photo::default()
    };

    loop {
        match src.next_event()? {
            Event::Start(e) => match local_name(&e).as_str() {
                "photo-url" => {
                    let max_width = attributes(&e)?.remove("max-width").unwrap_or_default();
                    let url = src.read_text()?;
                    photo.set_url(&max_width, url);
                }
                "photo-caption" => photo.caption = src.read_text()?,
                "photo-link-url" => photo.photo_link_url = Some(src.read_text()?),
                _ => src.skip_element()?,
            },
            Event::End(_) => return Ok(photo),
            Event::Eof => return Err(premature_eof()),
            _ => {}
        }
    }
}

fn build_body(post: &Post, draft: Draft) -> PostBody {
    let post_id = post.id.clone();
    match post.post_type {
        PostType::Answer => PostBody::Answer(Answer { post_id, ..draft.answer }),
        PostType::Link => PostBody::Link(Link { post_id, ..draft.link }),
        PostType::Regular => PostBody::Regular(Regular { post_id, ..draft.regular }),
        PostType::Video => PostBody::Video(Video { post_id, ..draft.video }),
        PostType::Photo => {
            let main = draft.photo;
            let photos = if draft.photoset.is_empty() {
                vec![Photo {
                    post_id,
                    width: post.width,
                    height: post.height,
                    ..main
                }]
            } else {
                draft
                    .photoset
                    .into_iter()
                    .map(|p| Photo {
                        post_id: post_id.clone(),
                        caption: if p.caption.is_empty() { main.caption.clone() } else { p.caption },
                        photo_link_url: p.photo_link_url.or_else(|| main.photo_link_url.clone()),
                        ..p
                    })
                    .collect()
            };
            PostBody::Photos(photos)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGULAR_POST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tumblr version="1.0">
  <posts>
    <post id="180371366195" url="https://blog.tumblr.com/post/180371366195" url-with-slug="https://blog.tumblr.com/post/180371366195/first-post"
          type="regular" date-gmt="2018-11-21 12:00:00 GMT" date="Wed, 21 Nov 2018 07:00:00" unix-timestamp="1542801600"
          format="html" reblog-key="abc123" slug="first-post" state="published" is_reblog="false" tumblelog="blog">
      <regular-title>First Post</regular-title>
      <regular-body>&lt;p&gt;Hello&lt;/p&gt;</regular-body>
      <tag>Rust</tag>
      <tag>Tumblr</tag>
    </post>
  </posts>
</tumblr>"#;

    #[test]
    fn reads_regular_post_attributes_and_tags() {
        let parsed = parse_posts(REGULAR_POST.as_bytes()).unwrap();
        assert_eq!(parsed.posts.len(), 1);

        let entry = &parsed.posts[0];
        assert_eq!(entry.post.id, "180371366195");
        assert_eq!(entry.post.post_type, PostType::Regular);
        assert_eq!(entry.post.unix_timestamp, 1542801600);
        assert_eq!(entry.post.slug, "first-post");
        assert_eq!(entry.post.tags, "rust, tumblr");
        assert!(!entry.post.is_reblog);
        assert!(entry.post.is_published());

        match &entry.body {
            PostBody::Regular(r) => {
                assert_eq!(r.post_id, "180371366195");
                assert_eq!(r.title.as_deref(), Some("First Post"));
                assert_eq!(r.body, "<p>Hello</p>");
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn reads_photoset_and_inherits_caption() {
        let doc = r#"<tumblr><posts>
          <post id="2" type="photo" tumblelog="blog" state="published" width="1280" height="720">
            <photo-caption>Two pictures</photo-caption>
            <photo-url max-width="1280">https://media/first_1280.jpg</photo-url>
            <photoset>
              <photo offset="o1" width="1280" height="720">
                <photo-url max-width="1280">https://media/first_1280.jpg</photo-url>
                <photo-url max-width="500">https://media/first_500.jpg</photo-url>
              </photo>
              <photo offset="o2" width="640" height="480">
                <photo-url max-width="1280">https://media/second_1280.jpg</photo-url>
              </photo>
            </photoset>
          </post>
        </posts></tumblr>"#;

        let parsed = parse_posts(doc.as_bytes()).unwrap();
        let PostBody::Photos(photos) = &parsed.posts[0].body else {
            panic!("expected photos");
        };
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].offset.as_deref(), Some("o1"));
        assert_eq!(photos[0].url500.as_deref(), Some("https://media/first_500.jpg"));
        assert_eq!(photos[1].width, Some(640));
        assert!(photos.iter().all(|p| p.caption == "Two pictures" && p.post_id == "2"));
    }

    #[test]
    fn single_photo_uses_post_dimensions() {
        let doc = r#"<tumblr><posts>
          <post id="3" type="photo" tumblelog="blog" state="published" width="500" height="400">
            <photo-caption>One</photo-caption>
            <photo-link-url>https://example.com</photo-link-url>
            <photo-url max-width="1280">https://media/one_1280.jpg</photo-url>
            <photo-url max-width="75">https://media/one_75sq.jpg</photo-url>
          </post>
        </posts></tumblr>"#;

        let parsed = parse_posts(doc.as_bytes()).unwrap();
        let PostBody::Photos(photos) = &parsed.posts[0].body else {
            panic!("expected photos");
        };
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].width, Some(500));
        assert_eq!(photos[0].photo_link_url.as_deref(), Some("https://example.com"));
        assert_eq!(photos[0].url75.as_deref(), Some("https://media/one_75sq.jpg"));
    }

    #[test]
    fn reads_video_source_details() {
        let doc = r#"<tumblr><posts>
          <post id="4" type="video" tumblelog="blog" state="published">
            <video-source>
              <content-type>video/mp4</content-type>
              <extension>mp4</extension>
              <width>480</width>
              <height>270</height>
              <duration>12</duration>
              <revision>0</revision>
            </video-source>
            <video-caption>Clip</video-caption>
            <video-player>&lt;video&gt;&lt;/video&gt;</video-player>
            <tag>cats</tag>
          </post>
        </posts></tumblr>"#;

        let parsed = parse_posts(doc.as_bytes()).unwrap();
        let entry = &parsed.posts[0];
        let PostBody::Video(video) = &entry.body else {
            panic!("expected video");
        };
        assert_eq!(video.content_type.as_deref(), Some("video/mp4"));
        assert_eq!(video.width, Some(480));
        assert_eq!(video.duration, Some(12));
        assert_eq!(video.video_caption.as_deref(), Some("Clip"));
        assert_eq!(entry.post.tags, "cats");
    }

    #[test]
    fn unsupported_types_are_reported_not_parsed() {
        let doc = r#"<tumblr><posts>
          <post id="5" type="quote" tumblelog="blog"><quote-text>q</quote-text></post>
          <post id="6" type="answer" tumblelog="blog" state="published">
            <question>Why?</question><answer>Because.</answer>
          </post>
        </posts></tumblr>"#;

        let parsed = parse_posts(doc.as_bytes()).unwrap();
        assert_eq!(parsed.unsupported, vec![("5".to_string(), "quote".to_string())]);
        assert_eq!(parsed.posts.len(), 1);
        assert!(matches!(&parsed.posts[0].body, PostBody::Answer(a) if a.answer == "Because."));
    }

    #[test]
    fn invalid_numbers_are_errors() {
        let doc = r#"<tumblr><posts><post id="7" type="link" unix-timestamp="soon"/></posts></tumblr>"#;
        assert!(parse_posts(doc.as_bytes()).is_err());
    }
}
