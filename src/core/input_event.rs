//! Raw terminal input split into typed events.

use crate::core::input::{parse_key, parse_key_event_type, parse_text, KeyEventType};

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

/// One decoded unit of terminal input.
///
/// `raw` keeps the exact chunk so handlers can still run key matching on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key {
        raw: String,
        key_id: String,
        event_type: KeyEventType,
    },
    Text {
        raw: String,
        text: String,
    },
    Paste {
        text: String,
    },
    UnknownRaw {
        raw: String,
    },
}

impl InputEvent {
    pub fn key_id(&self) -> Option<&str> {
        match self {
            InputEvent::Key { key_id, .. } => Some(key_id),
            _ => None,
        }
    }
}

/// Splits `data` into events. Bracketed paste is kept intact even if it
/// contains newlines or escape bytes; an unterminated paste is reported raw.
pub fn parse_input_events(data: &str) -> Vec<InputEvent> {
    let mut events = Vec::new();
    let mut rest = data;

    while !rest.is_empty() {
        let Some(start) = rest.find(PASTE_START) else {
            events.extend(classify(rest));
            break;
        };
        events.extend(classify(&rest[..start]));

        let body = &rest[start + PASTE_START.len()..];
        let Some(end) = body.find(PASTE_END) else {
            events.push(InputEvent::UnknownRaw {
                raw: rest[start..].to_string(),
            });
            break;
        };
        events.push(InputEvent::Paste {
            text: body[..end].to_string(),
        });
        rest = &body[end + PASTE_END.len()..];
    }

    events
}

fn classify(chunk: &str) -> Option<InputEvent> {
    if chunk.is_empty() {
        return None;
    }
    let event_type = parse_key_event_type(chunk);
    if let Some(text) = parse_text(chunk) {
        // Release reports for printable keys carry no input.
        return (event_type != KeyEventType::Release).then(|| InputEvent::Text {
            raw: chunk.to_string(),
            text,
        });
    }
    Some(match parse_key(chunk) {
        Some(key_id) => InputEvent::Key {
            raw: chunk.to_string(),
            key_id,
            event_type,
        },
        None => InputEvent::UnknownRaw {
            raw: chunk.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trigger_characters_are_text() {
        assert_eq!(
            parse_input_events("<>"),
            vec![InputEvent::Text {
                raw: "<>".to_string(),
                text: "<>".to_string(),
            }]
        );
    }

    #[test]
    fn control_keys_are_key_events() {
        let events = parse_input_events("\x1b[B");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key_id(), Some("down"));
        assert_eq!(parse_input_events("\r")[0].key_id(), Some("enter"));
    }

    #[test]
    fn paste_is_split_from_surrounding_text() {
        assert_eq!(
            parse_input_events("a\x1b[200~x\ny\x1b[201~b"),
            vec![
                InputEvent::Text {
                    raw: "a".to_string(),
                    text: "a".to_string(),
                },
                InputEvent::Paste {
                    text: "x\ny".to_string(),
                },
                InputEvent::Text {
                    raw: "b".to_string(),
                    text: "b".to_string(),
                },
            ]
        );
    }

    #[test]
    fn unterminated_paste_is_raw() {
        assert_eq!(
            parse_input_events("\x1b[200~abc"),
            vec![InputEvent::UnknownRaw {
                raw: "\x1b[200~abc".to_string(),
            }]
        );
    }

    #[test]
    fn key_release_text_is_dropped() {
        assert!(parse_input_events("\x1b[97;1:3u").is_empty());
    }
}
