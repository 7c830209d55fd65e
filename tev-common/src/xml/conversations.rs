//! Reader for the Tumblr messaging export (`conversations.xml`)
//!
//! The export does not say which participant owns the blog. The owner is the
//! participant present in the most conversations, and their id is the message
//! sender id seen in the most conversations.

use super::reader::{attributes, local_name, premature_eof, XmlSource};
use crate::db::models::{Conversation, ConversationMessage};
use crate::{Error, Result};
use quick_xml::events::Event;
use std::collections::{BTreeMap, BTreeSet};

/// Suffix Tumblr appends to deactivated accounts
const DEACTIVATED_MARKER: &str = "-deact";

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConversation {
    pub conversation: Conversation,
    pub messages: Vec<ConversationMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConversations {
    pub main_participant: String,
    pub main_participant_avatar_url: Option<String>,
    pub main_participant_id: Option<String>,
    pub conversations: Vec<ParsedConversation>,
}

struct RawParticipant {
    name: String,
    avatar_url: Option<String>,
}

struct RawMessage {
    timestamp: i64,
    sender: String,
    message_type: String,
    text: String,
}

#[derive(Default)]
struct RawConversation {
    participants: Vec<RawParticipant>,
    messages: Vec<RawMessage>,
}

/// Read a conversation export belonging to `blog`
pub fn parse_conversations(xml: &[u8], blog: &str) -> Result<ParsedConversations> {
    let raw = read_raw(xml)?;

    if raw.is_empty() {
        return Ok(ParsedConversations {
            main_participant: blog.to_string(),
            main_participant_avatar_url: None,
            main_participant_id: None,
            conversations: Vec::new(),
        });
    }

    let main_participant = main_participant_name(&raw, blog);
    if main_participant != blog {
        return Err(Error::BlogMismatch {
            blog: blog.to_string(),
            found: main_participant,
        });
    }

    let main_participant_avatar_url = raw
        .iter()
        .flat_map(|c| &c.participants)
        .find(|p| p.name == main_participant)
        .and_then(|p| p.avatar_url.clone());

    let main_id = main_participant_id(&raw)?;

    let conversations = raw
        .into_iter()
        .map(|c| build_conversation(c, blog, &main_participant, &main_id))
        .collect();

    Ok(ParsedConversations {
        main_participant,
        main_participant_avatar_url,
        main_participant_id: Some(main_id),
        conversations,
    })
}

fn read_raw(xml: &[u8]) -> Result<Vec<RawConversation>> {
    let mut src = XmlSource::new(xml);
    let mut conversations = Vec::new();

    loop {
        match src.next_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"conversation" => {
                conversations.push(read_conversation(&mut src)?);
            }
            Event::Eof => return Ok(conversations),
            _ => {}
        }
    }
}

fn read_conversation(src: &mut XmlSource<'_>) -> Result<RawConversation> {
    let mut convo = RawConversation::default();
    // <participants> and <messages> are read in place
    let mut depth = 0usize;

    loop {
        match src.next_event()? {
            Event::Start(e) => match local_name(&e).as_str() {
                "participants" | "messages" => depth += 1,
                "participant" => {
                    let avatar_url = attributes(&e)?.remove("avatar_url");
                    let name = src.read_text()?;
                    convo.participants.push(RawParticipant { name, avatar_url });
                }
                "message" => {
                    let mut attrs = attributes(&e)?;
                    let timestamp = attrs
                        .get("ts")
                        .and_then(|ts| ts.trim().parse::<i64>().ok())
                        .ok_or_else(|| Error::Xml("Message without a valid ts attribute".to_string()))?;
                    let text = src.read_text()?;
                    convo.messages.push(RawMessage {
                        timestamp,
                        sender: attrs.remove("participant").unwrap_or_default(),
                        message_type: attrs.remove("type").unwrap_or_else(|| "TEXT".to_string()),
                        text,
                    });
                }
                _ => src.skip_element()?,
            },
            Event::End(_) => {
                if depth == 0 {
                    return Ok(convo);
                }
                depth -= 1;
            }
            Event::Eof => return Err(premature_eof()),
            _ => {}
        }
    }
}

/// Blog name when it takes part in every conversation, otherwise the most
/// frequent participant (ties broken alphabetically)
fn main_participant_name(raw: &[RawConversation], blog: &str) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for convo in raw {
        let names: BTreeSet<&str> = convo.participants.iter().map(|p| p.name.as_str()).collect();
        for name in names {
            *counts.entry(name).or_default() += 1;
        }
    }

    if counts.get(blog) == Some(&raw.len()) {
        return blog.to_string();
    }

    counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(name, _)| name.to_string())
        .unwrap_or_default()
}

/// Sender id present in the most conversations; must be unique and seen in
/// more than one conversation
fn main_participant_id(raw: &[RawConversation]) -> Result<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for convo in raw {
        let ids: BTreeSet<&str> = convo.messages.iter().map(|m| m.sender.as_str()).collect();
        for id in ids {
            *counts.entry(id).or_default() += 1;
        }
    }

    let best = counts.values().copied().max().unwrap_or(0);
    let leaders: Vec<&str> = counts
        .iter()
        .filter(|(_, n)| **n == best)
        .map(|(id, _)| *id)
        .collect();

    match leaders.as_slice() {
        [id] if best > 1 => Ok(id.to_string()),
        _ => Err(Error::Xml(
            "Unable to determine the main participant id".to_string(),
        )),
    }
}

fn strip_deactivated(name: &str) -> &str {
    match name.find(DEACTIVATED_MARKER) {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

fn build_conversation(
    raw: RawConversation,
    blog: &str,
    main_participant: &str,
    main_id: &str,
) -> ParsedConversation {
    let other = raw
        .participants
        .iter()
        .find(|p| p.name != main_participant)
        .or_else(|| raw.participants.first());

    let participant_id = raw
        .messages
        .iter()
        .find(|m| m.sender != main_id)
        .map(|m| m.sender.clone());

    let messages: Vec<ConversationMessage> = raw
        .messages
        .into_iter()
        .map(|m| ConversationMessage {
            id: 0,
            conversation_id: 0,
            timestamp: m.timestamp,
            received: m.sender != main_id,
            message_type: m.message_type,
            message: m.text,
        })
        .collect();

    let conversation = Conversation {
        id: 0,
        blog: blog.to_string(),
        participant: other
            .map(|p| strip_deactivated(&p.name).to_string())
            .unwrap_or_default(),
        participant_avatar_url: other.and_then(|p| p.avatar_url.clone()),
        participant_id,
        num_messages: messages.len() as i64,
        hide_conversation: false,
    };

    ParsedConversation {
        conversation,
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONVERSATIONS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<conversations>
  <conversation>
    <participants>
      <participant avatar_url="https://avatars/me.png">blog</participant>
      <participant avatar_url="https://avatars/alice.png">alice</participant>
    </participants>
    <messages>
      <message ts="1544197586" participant="111" type="TEXT">Hi Alice</message>
      <message ts="1544197590" participant="222" type="TEXT">Hi!</message>
      <message ts="1544197600" participant="222" type="IMAGE"><photo-url>https://media/img.png</photo-url></message>
    </messages>
  </conversation>
  <conversation>
    <participants>
      <participant avatar_url="https://avatars/me.png">blog</participant>
      <participant avatar_url="https://avatars/bob.png">bob-deactivated201901</participant>
    </participants>
    <messages>
      <message ts="1544197700" participant="111" type="POSTREF">https://blog.tumblr.com/post/1</message>
      <message ts="1544197800" participant="333" type="TEXT">Thanks</message>
    </messages>
  </conversation>
</conversations>"#;

    #[test]
    fn identifies_main_participant_and_direction() {
        let parsed = parse_conversations(CONVERSATIONS.as_bytes(), "blog").unwrap();
        assert_eq!(parsed.main_participant, "blog");
        assert_eq!(parsed.main_participant_id.as_deref(), Some("111"));
        assert_eq!(parsed.main_participant_avatar_url.as_deref(), Some("https://avatars/me.png"));
        assert_eq!(parsed.conversations.len(), 2);

        let alice = &parsed.conversations[0];
        assert_eq!(alice.conversation.participant, "alice");
        assert_eq!(alice.conversation.participant_id.as_deref(), Some("222"));
        assert_eq!(alice.conversation.num_messages, 3);
        assert!(!alice.messages[0].received);
        assert!(alice.messages[1].received);
        assert_eq!(alice.messages[2].message_type, "IMAGE");
        assert_eq!(alice.messages[2].message, "https://media/img.png");
    }

    #[test]
    fn strips_deactivated_suffix() {
        let parsed = parse_conversations(CONVERSATIONS.as_bytes(), "blog").unwrap();
        let bob = &parsed.conversations[1].conversation;
        assert_eq!(bob.participant, "bob");
        assert_eq!(bob.participant_avatar_url.as_deref(), Some("https://avatars/bob.png"));
    }

    #[test]
    fn rejects_export_of_another_blog() {
        let err = parse_conversations(CONVERSATIONS.as_bytes(), "someone-else").unwrap_err();
        assert!(matches!(err, Error::BlogMismatch { found, .. } if found == "blog"));
    }

    #[test]
    fn empty_export_has_no_conversations() {
        let parsed = parse_conversations(b"<conversations/>", "blog").unwrap();
        assert!(parsed.conversations.is_empty());
        assert_eq!(parsed.main_participant, "blog");
    }

    #[test]
    fn single_two_sided_conversation_is_ambiguous() {
        let doc = r#"<conversations><conversation>
            <participants><participant>blog</participant><participant>zed</participant></participants>
            <messages>
              <message ts="1" participant="1" type="TEXT">a</message>
              <message ts="2" participant="2" type="TEXT">b</message>
            </messages>
          </conversation></conversations>"#;
        assert!(matches!(
            parse_conversations(doc.as_bytes(), "blog"),
            Err(Error::Xml(_))
        ));
    }
}
