use serde::{Serialize, Deserialize};
use chrono::{DateTime, SecondsFormat, Utc};

pub const POST_COLLECTION: &str = "app.bsky.feed.post";

/// AT Protocol strong ref: 帖子的 (uri, cid)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRef {
    pub uri: String,
    pub cid: String,
}

impl PostRef {
    pub fn new(uri: impl Into<String>, cid: impl Into<String>) -> Self {
        Self { uri: uri.into(), cid: cid.into() }
    }
}

/// Places a reply in a thread. `root` never changes within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyLink {
    pub root: PostRef,
    pub parent: PostRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostRequest {
    Root { text: String },
    Reply { text: String, link: ReplyLink },
}

impl PostRequest {
    pub fn text(&self) -> &str {
        match self {
            PostRequest::Root { text } | PostRequest::Reply { text, .. } => text,
        }
    }

    pub fn reply_link(&self) -> Option<&ReplyLink> {
        match self {
            PostRequest::Root { .. } => None,
            PostRequest::Reply { link, .. } => Some(link),
        }
    }

    pub fn to_record(&self, created_at: DateTime<Utc>) -> PostRecord<'_> {
        PostRecord {
            record_type: POST_COLLECTION,
            text: self.text(),
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            reply: self.reply_link(),
        }
    }
}

/// `app.bsky.feed.post` record body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord<'a> {
    #[serde(rename = "$type")]
    pub record_type: &'static str,
    pub text: &'a str,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<&'a ReplyLink>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn root_record_has_no_reply_block() {
        let req = PostRequest::Root { text: "Hear ye!".to_string() };
        let value = serde_json::to_value(req.to_record(at_noon())).unwrap();
        assert_eq!(value, json!({
            "$type": "app.bsky.feed.post",
            "text": "Hear ye!",
            "createdAt": "2024-05-01T12:30:00.000Z",
        }));
    }

    #[test]
    fn reply_record_links_root_and_parent() {
        let req = PostRequest::Reply {
            text: "Markets rally!".to_string(),
            link: ReplyLink {
                root: PostRef::new("at://did:plc:abc/app.bsky.feed.post/1", "cid1"),
                parent: PostRef::new("at://did:plc:abc/app.bsky.feed.post/2", "cid2"),
            },
        };
        let value = serde_json::to_value(req.to_record(at_noon())).unwrap();
        assert_eq!(value["reply"], json!({
            "root": {"uri": "at://did:plc:abc/app.bsky.feed.post/1", "cid": "cid1"},
            "parent": {"uri": "at://did:plc:abc/app.bsky.feed.post/2", "cid": "cid2"},
        }));
        assert_eq!(value["text"], "Markets rally!");
    }
}
