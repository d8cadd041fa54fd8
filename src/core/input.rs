//! Terminal key parsing and key-id matching.
//!
//! Key ids look like `enter`, `shift+enter`, `ctrl+-` or `alt+left`.
//! Modifier order in a key id does not matter when matching.

const MOD_SHIFT: u8 = 1;
const MOD_ALT: u8 = 2;
const MOD_CTRL: u8 = 4;

const CODEPOINT_TAB: u32 = 9;
const CODEPOINT_ENTER: u32 = 13;
const CODEPOINT_ESCAPE: u32 = 27;
const CODEPOINT_SPACE: u32 = 32;
const CODEPOINT_BACKSPACE: u32 = 127;
const CODEPOINT_KP_ENTER: u32 = 57414;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventType {
    Press,
    Repeat,
    Release,
}

pub fn is_key_release(data: &str) -> bool {
    parse_key_event_type(data) == KeyEventType::Release
}

pub fn parse_key_event_type(data: &str) -> KeyEventType {
    parse_kitty_sequence(data)
        .map(|sequence| sequence.event_type)
        .unwrap_or(KeyEventType::Press)
}

/// Returns whether raw terminal input corresponds to `key_id`.
pub fn matches_key(data: &str, key_id: &str) -> bool {
    let Some(parsed) = parse_key(data) else {
        return false;
    };
    match (split_key_id(&parsed), split_key_id(key_id)) {
        (Some(actual), Some(expected)) => actual == expected,
        _ => false,
    }
}

/// Normalized key id for a raw input chunk, if it is a recognized key.
pub fn parse_key(data: &str) -> Option<String> {
    if let Some(sequence) = parse_kitty_sequence(data) {
        let name = codepoint_name(sequence.codepoint)?;
        return Some(with_modifiers(sequence.modifier, &name));
    }
    if let Some(key) = legacy_sequence_key_id(data) {
        return Some(key.to_string());
    }
    if let Some(key) = parse_modified_csi(data) {
        return Some(key);
    }

    let mut chars = data.chars();
    let first = chars.next()?;
    let rest: Vec<char> = chars.collect();

    if first == '\x1b' && rest.len() == 1 {
        let inner = parse_key(&rest[0].to_string())?;
        return Some(format!("alt+{inner}"));
    }
    if !rest.is_empty() {
        return None;
    }

    match first {
        '\r' => Some("enter".to_string()),
        '\n' => Some("shift+enter".to_string()),
        '\t' => Some("tab".to_string()),
        '\x1b' => Some("escape".to_string()),
        '\x7f' | '\x08' => Some("backspace".to_string()),
        '\x00' => Some("ctrl+space".to_string()),
        '\x1c' => Some("ctrl+\\".to_string()),
        '\x1d' => Some("ctrl+]".to_string()),
        '\x1f' => Some("ctrl+-".to_string()),
        ' ' => Some("space".to_string()),
        ch if ('\x01'..='\x1a').contains(&ch) => {
            let letter = (b'a' + (ch as u8 - 1)) as char;
            Some(format!("ctrl+{letter}"))
        }
        ch if ch.is_ascii_uppercase() => Some(format!("shift+{}", ch.to_ascii_lowercase())),
        ch if !ch.is_control() => Some(ch.to_string()),
        _ => None,
    }
}

/// Printable text carried by an input chunk, if any.
pub fn parse_text(data: &str) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    if let Some(sequence) = parse_kitty_sequence(data) {
        if sequence.modifier & !MOD_SHIFT != 0 {
            return None;
        }
        let ch = char::from_u32(sequence.codepoint)?;
        if ch.is_control() || sequence.codepoint >= CODEPOINT_KP_ENTER {
            return None;
        }
        let ch = if sequence.modifier & MOD_SHIFT != 0 {
            ch.to_uppercase().next().unwrap_or(ch)
        } else {
            ch
        };
        return Some(ch.to_string());
    }
    if data.chars().any(|ch| ch.is_control()) {
        return None;
    }
    Some(data.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KittySequence {
    codepoint: u32,
    modifier: u8,
    event_type: KeyEventType,
}

/// Parses `CSI codepoint[:alternates] [; modifiers[:event]] u`.
fn parse_kitty_sequence(data: &str) -> Option<KittySequence> {
    let body = data.strip_prefix("\x1b[")?.strip_suffix('u')?;
    let mut fields = body.split(';');
    let codepoint_field = fields.next()?;
    let codepoint = codepoint_field.split(':').next()?.parse::<u32>().ok()?;

    let (modifier, event_type) = match fields.next() {
        Some(field) => {
            let mut parts = field.split(':');
            let raw_modifier = parts.next()?.parse::<u8>().ok()?;
            let event_type = match parts.next() {
                Some("2") => KeyEventType::Repeat,
                Some("3") => KeyEventType::Release,
                _ => KeyEventType::Press,
            };
            (raw_modifier.saturating_sub(1) & (MOD_SHIFT | MOD_ALT | MOD_CTRL), event_type)
        }
        None => (0, KeyEventType::Press),
    };

    Some(KittySequence {
        codepoint,
        modifier,
        event_type,
    })
}

/// Parses `CSI 1 ; modifiers X` and `CSI n ; modifiers ~` forms.
fn parse_modified_csi(data: &str) -> Option<String> {
    let body = data.strip_prefix("\x1b[")?;
    let last = body.chars().last()?;
    let params = &body[..body.len() - last.len_utf8()];
    let (code, raw_modifier) = params.split_once(';')?;
    let modifier = raw_modifier.parse::<u8>().ok()?.saturating_sub(1);
    let name = match (code, last) {
        ("1", 'A') => "up",
        ("1", 'B') => "down",
        ("1", 'C') => "right",
        ("1", 'D') => "left",
        ("1", 'H') => "home",
        ("1", 'F') => "end",
        ("3", '~') => "delete",
        ("5", '~') => "pageUp",
        ("6", '~') => "pageDown",
        _ => return None,
    };
    Some(with_modifiers(modifier, name))
}

fn legacy_sequence_key_id(data: &str) -> Option<&'static str> {
    let key = match data {
        "\x1b[A" | "\x1bOA" => "up",
        "\x1b[B" | "\x1bOB" => "down",
        "\x1b[C" | "\x1bOC" => "right",
        "\x1b[D" | "\x1bOD" => "left",
        "\x1b[H" | "\x1bOH" | "\x1b[1~" | "\x1b[7~" => "home",
        "\x1b[F" | "\x1bOF" | "\x1b[4~" | "\x1b[8~" => "end",
        "\x1b[3~" => "delete",
        "\x1b[5~" => "pageUp",
        "\x1b[6~" => "pageDown",
        "\x1b[Z" => "shift+tab",
        "\x1b\r" => "alt+enter",
        "\x1b\x7f" => "alt+backspace",
        "\x1bb" => "alt+left",
        "\x1bf" => "alt+right",
        _ => return None,
    };
    Some(key)
}

fn codepoint_name(codepoint: u32) -> Option<String> {
    let name = match codepoint {
        CODEPOINT_ENTER | CODEPOINT_KP_ENTER => "enter".to_string(),
        CODEPOINT_TAB => "tab".to_string(),
        CODEPOINT_ESCAPE => "escape".to_string(),
        CODEPOINT_SPACE => "space".to_string(),
        CODEPOINT_BACKSPACE => "backspace".to_string(),
        _ => {
            let ch = char::from_u32(codepoint)?;
            if ch.is_control() {
                return None;
            }
            ch.to_lowercase().collect()
        }
    };
    Some(name)
}

fn with_modifiers(modifier: u8, name: &str) -> String {
    let mut id = String::new();
    if modifier & MOD_CTRL != 0 {
        id.push_str("ctrl+");
    }
    if modifier & MOD_ALT != 0 {
        id.push_str("alt+");
    }
    if modifier & MOD_SHIFT != 0 {
        id.push_str("shift+");
    }
    id.push_str(name);
    id
}

/// Splits a key id into (modifier bits, lowercase key name).
fn split_key_id(key_id: &str) -> Option<(u8, String)> {
    let lowered = key_id.to_ascii_lowercase();
    // A trailing `+` is the plus key itself (`ctrl++`).
    let (mods, key) = match lowered.strip_suffix("++") {
        Some(prefix) => (prefix, "+"),
        None => match lowered.rsplit_once('+') {
            Some((mods, key)) if !key.is_empty() => (mods, key),
            Some(_) => return None,
            None => ("", lowered.as_str()),
        },
    };
    let mut bits = 0u8;
    for part in mods.split('+').filter(|part| !part.is_empty()) {
        bits |= match part {
            "shift" => MOD_SHIFT,
            "alt" | "option" | "meta" => MOD_ALT,
            "ctrl" | "control" => MOD_CTRL,
            _ => return None,
        };
    }
    Some((bits, key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_keys_parse() {
        assert_eq!(parse_key("\r").as_deref(), Some("enter"));
        assert_eq!(parse_key("\x1b[A").as_deref(), Some("up"));
        assert_eq!(parse_key("\x1b[3~").as_deref(), Some("delete"));
        assert_eq!(parse_key("\x7f").as_deref(), Some("backspace"));
        assert_eq!(parse_key("\x19").as_deref(), Some("ctrl+y"));
        assert_eq!(parse_key("\x1f").as_deref(), Some("ctrl+-"));
        assert_eq!(parse_key("\x1b[1;5D").as_deref(), Some("ctrl+left"));
    }

    #[test]
    fn kitty_sequences_parse_with_modifiers() {
        assert_eq!(parse_key("\x1b[13;2u").as_deref(), Some("shift+enter"));
        assert_eq!(parse_key("\x1b[45;5u").as_deref(), Some("ctrl+-"));
        assert_eq!(parse_key_event_type("\x1b[97;1:3u"), KeyEventType::Release);
        assert!(is_key_release("\x1b[97;1:3u"));
    }

    #[test]
    fn matching_ignores_modifier_order() {
        assert!(matches_key("\x1b[13;4u", "shift+alt+enter"));
        assert!(matches_key("\x1b[13;4u", "alt+shift+enter"));
        assert!(!matches_key("\r", "shift+enter"));
        assert!(matches_key("\n", "shift+enter"));
        assert!(matches_key("\x1b", "escape"));
        assert!(matches_key("\t", "tab"));
    }

    #[test]
    fn printable_input_is_text() {
        assert_eq!(parse_text("hé").as_deref(), Some("hé"));
        assert_eq!(parse_text("<").as_deref(), Some("<"));
        assert_eq!(parse_text("\x1b[A"), None);
        assert_eq!(parse_text("\r"), None);
        assert_eq!(parse_text("\x1b[97;2u").as_deref(), Some("A"));
        assert_eq!(parse_text("\x1b[97;5u"), None);
    }
}
