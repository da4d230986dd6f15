//! Frame parser for the Twitch IRC line protocol.
//!
//! One WebSocket delivery may carry several `\r\n`-terminated lines. Each line
//! has the shape `[@tags ][:prefix ]COMMAND [params...][ :trailing]`. Lines
//! without a command token are protocol noise and are dropped silently.

use std::collections::HashMap;
use std::fmt::Write;

/// A single parsed protocol line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IrcMessage {
    pub tags: HashMap<String, String>,
    /// Sender identity without the leading `:` (e.g. `alice!alice@alice.tmi.twitch.tv`).
    pub prefix: String,
    pub command: String,
    pub params: Vec<String>,
    pub trailing: String,
}

impl IrcMessage {
    /// Nickname part of the prefix (everything before `!`).
    pub fn nick(&self) -> &str {
        self.prefix.split('!').next().unwrap_or("")
    }

    /// Serialize back into a single protocol line (without terminator).
    ///
    /// Tags are written in key order so the output is deterministic.
    pub fn to_line(&self) -> String {
        let mut line = String::new();
        if !self.tags.is_empty() {
            let mut keys: Vec<&String> = self.tags.keys().collect();
            keys.sort();
            line.push('@');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    line.push(';');
                }
                line.push_str(key);
                let value = &self.tags[*key];
                if !value.is_empty() {
                    let _ = write!(line, "={}", escape_tag_value(value));
                }
            }
            line.push(' ');
        }
        if !self.prefix.is_empty() {
            let _ = write!(line, ":{} ", self.prefix);
        }
        line.push_str(&self.command);
        for param in &self.params {
            let _ = write!(line, " {}", param);
        }
        if !self.trailing.is_empty() {
            let _ = write!(line, " :{}", self.trailing);
        }
        line
    }
}

/// Split a raw frame into lines and parse every well-formed one.
pub fn parse_frame(raw: &str) -> Vec<IrcMessage> {
    raw.lines()
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

/// Parse one protocol line. Returns `None` for lines without a command.
pub fn parse_line(line: &str) -> Option<IrcMessage> {
    let mut rest = line;

    let mut tags = HashMap::new();
    if let Some(stripped) = rest.strip_prefix('@') {
        let (raw_tags, remainder) = stripped.split_once(' ')?;
        tags = parse_tags(raw_tags);
        rest = remainder.trim_start_matches(' ');
    }

    let mut prefix = String::new();
    if let Some(stripped) = rest.strip_prefix(':') {
        let (raw_prefix, remainder) = stripped.split_once(' ')?;
        prefix = raw_prefix.to_string();
        rest = remainder.trim_start_matches(' ');
    }

    // The trailing sentinel is only searched after tags and prefix are gone.
    let (head, trailing) = rest.split_once(" :").unwrap_or((rest, ""));

    let mut tokens = head.split_whitespace();
    let command = tokens.next()?;
    if command.starts_with(':') {
        return None;
    }

    Some(IrcMessage {
        tags,
        prefix,
        command: command.to_string(),
        params: tokens.map(str::to_string).collect(),
        trailing: trailing.to_string(),
    })
}

fn parse_tags(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter(|item| !item.is_empty())
        .filter_map(|item| {
            let (key, value) = match item.split_once('=') {
                Some((key, value)) => (key, unescape_tag_value(value)),
                None => (item, String::new()),
            };
            (!key.is_empty()).then(|| (key.to_string(), value))
        })
        .collect()
}

/// Unescape an IRCv3 tag value (`\:` `\s` `\\` `\r` `\n`).
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}

fn escape_tag_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ';' => escaped.push_str("\\:"),
            ' ' => escaped.push_str("\\s"),
            '\\' => escaped.push_str("\\\\"),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}
