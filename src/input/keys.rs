//! Abstract key events and the `<...>` key notation.
//!
//! The host captures terminal events and turns them into [`Key`]s; scripts
//! and tests write keys in vim notation and go through [`parse_keys`].
//!
//! # Example
//!
//! ```
//! use jsonvim::input::keys::{parse_keys, Key};
//!
//! let keys = parse_keys("ix<Esc>:wq<CR>");
//! assert_eq!(keys[0], Key::Char('i'));
//! assert_eq!(keys[2], Key::Esc);
//! assert_eq!(keys.last(), Some(&Key::Enter));
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    /// A control chord, e.g. `Ctrl('r')`.
    Ctrl(char),
    Esc,
    Enter,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

impl fmt::Display for Key {
    /// Formats the key in the notation [`parse_keys`] accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char('<') => write!(f, "<lt>"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Ctrl(c) => write!(f, "<C-{}>", c),
            Key::Esc => write!(f, "<Esc>"),
            Key::Enter => write!(f, "<CR>"),
            Key::Backspace => write!(f, "<BS>"),
            Key::Delete => write!(f, "<Del>"),
            Key::Tab => write!(f, "<Tab>"),
            Key::Up => write!(f, "<Up>"),
            Key::Down => write!(f, "<Down>"),
            Key::Left => write!(f, "<Left>"),
            Key::Right => write!(f, "<Right>"),
            Key::Home => write!(f, "<Home>"),
            Key::End => write!(f, "<End>"),
            Key::PageUp => write!(f, "<PageUp>"),
            Key::PageDown => write!(f, "<PageDown>"),
        }
    }
}

fn named_key(name: &str) -> Option<Key> {
    let lower = name.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("c-") {
        let mut chars = rest.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Key::Ctrl(c)),
            _ => None,
        };
    }
    Some(match lower.as_str() {
        "esc" => Key::Esc,
        "cr" | "enter" | "return" => Key::Enter,
        "bs" | "backspace" => Key::Backspace,
        "del" | "delete" => Key::Delete,
        "tab" => Key::Tab,
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "lt" => Key::Char('<'),
        "space" => Key::Char(' '),
        _ => return None,
    })
}

/// Parses a key script. `<name>` sequences become special keys; an unknown
/// or unterminated `<...>` is taken literally.
pub fn parse_keys(script: &str) -> Vec<Key> {
    let chars: Vec<char> = script.chars().collect();
    let mut keys = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '<' {
            if let Some(len) = chars[i + 1..].iter().position(|&c| c == '>') {
                let name: String = chars[i + 1..i + 1 + len].iter().collect();
                if let Some(key) = named_key(&name) {
                    keys.push(key);
                    i += len + 2;
                    continue;
                }
            }
        }
        keys.push(match chars[i] {
            '\n' => Key::Enter,
            '\t' => Key::Tab,
            c => Key::Char(c),
        });
        i += 1;
    }
    keys
}

/// Formats keys back into notation.
pub fn format_keys(keys: &[Key]) -> String {
    keys.iter().map(Key::to_string).collect()
}
