//! JSON event envelopes exchanged over `/ws`: `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Events sent by clients
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinMedia(Uuid),
    LeaveMedia(Uuid),
    NewComment {
        #[serde(rename = "mediaId")]
        media_id: Uuid,
        comment: Value,
    },
    NewAnnotation {
        #[serde(rename = "mediaId")]
        media_id: Uuid,
        annotation: Value,
    },
}

/// Events sent by the server
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    JoinedMedia {
        #[serde(rename = "mediaId")]
        media_id: Uuid,
    },
    LeftMedia {
        #[serde(rename = "mediaId")]
        media_id: Uuid,
    },
    NewComment(Value),
    NewAnnotation(Value),
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"event":"error","data":{{"message":"Failed to encode event: {}"}}}}"#,
                e.to_string().replace('"', "'")
            )
        })
    }
}

impl ClientEvent {
    pub fn decode(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_join_and_leave() {
        let id = Uuid::new_v4();
        assert_eq!(
            ClientEvent::decode(&json!({"event": "join-media", "data": id}).to_string()).unwrap(),
            ClientEvent::JoinMedia(id)
        );
        assert_eq!(
            ClientEvent::decode(&json!({"event": "leave-media", "data": id}).to_string()).unwrap(),
            ClientEvent::LeaveMedia(id)
        );
    }

    #[test]
    fn test_decode_new_comment() {
        let id = Uuid::new_v4();
        let frame = json!({
            "event": "new-comment",
            "data": {"mediaId": id, "comment": {"content": "nice cut", "timestamp": 4.2}}
        })
        .to_string();

        match ClientEvent::decode(&frame).unwrap() {
            ClientEvent::NewComment { media_id, comment } => {
                assert_eq!(media_id, id);
                assert_eq!(comment["content"], "nice cut");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_malformed_frames() {
        assert!(ClientEvent::decode("not json").is_err());
        assert!(ClientEvent::decode(r#"{"event":"join-media","data":"not-a-uuid"}"#).is_err());
        assert!(ClientEvent::decode(r#"{"event":"shout","data":1}"#).is_err());
    }

    #[test]
    fn test_encode_relay_and_error() {
        let relayed: Value =
            serde_json::from_str(&ServerEvent::NewAnnotation(json!({"id": 1})).encode()).unwrap();
        assert_eq!(relayed, json!({"event": "new-annotation", "data": {"id": 1}}));

        let error: Value = serde_json::from_str(&ServerEvent::error("nope").encode()).unwrap();
        assert_eq!(error, json!({"event": "error", "data": {"message": "nope"}}));

        let id = Uuid::nil();
        let joined: Value =
            serde_json::from_str(&ServerEvent::JoinedMedia { media_id: id }.encode()).unwrap();
        assert_eq!(joined["event"], "joined-media");
        assert_eq!(joined["data"]["mediaId"], id.to_string());
    }
}
