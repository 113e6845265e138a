use serde_json::Value;

use crate::types::Direction;

#[derive(Debug, PartialEq, Eq)]
pub enum ClientMessage {
    /// `direction` is `None` when the token is missing, not a string, or not
    /// one of the four cardinal directions.
    PlayerMove { direction: Option<Direction> },
}

/// Parses an inbound `{"type": ..., "data": ...}` frame. Unknown or
/// malformed frames yield `None`.
pub fn parse_client_message(raw: &str) -> Option<ClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "playerMove" => {
            let direction = object
                .get("data")
                .and_then(Value::as_object)
                .and_then(|data| data.get("direction"))
                .and_then(Value::as_str)
                .and_then(Direction::parse);
            Some(ClientMessage::PlayerMove { direction })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_player_move() {
        assert_eq!(
            parse_client_message(r#"{"type":"playerMove","data":{"direction":"left"}}"#),
            Some(ClientMessage::PlayerMove {
                direction: Some(Direction::Left)
            })
        );
    }

    #[test]
    fn bad_direction_is_carried_as_none() {
        for raw in [
            r#"{"type":"playerMove","data":{"direction":"sideways"}}"#,
            r#"{"type":"playerMove","data":{"direction":3}}"#,
            r#"{"type":"playerMove","data":{}}"#,
            r#"{"type":"playerMove","data":null}"#,
            r#"{"type":"playerMove"}"#,
        ] {
            assert_eq!(
                parse_client_message(raw),
                Some(ClientMessage::PlayerMove { direction: None }),
                "{raw}"
            );
        }
    }

    #[test]
    fn unknown_or_malformed_frames_are_rejected() {
        assert_eq!(parse_client_message("not json"), None);
        assert_eq!(parse_client_message("[]"), None);
        assert_eq!(parse_client_message(r#"{"data":{"direction":"up"}}"#), None);
        assert_eq!(parse_client_message(r#"{"type":7}"#), None);
        assert_eq!(parse_client_message(r#"{"type":"scoreUpdate","data":{}}"#), None);
    }
}
