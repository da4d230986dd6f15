//! Outbound protocol lines.
//!
//! Every line the bot writes goes through [`OutboundCommand`], so the wire
//! format for the handshake, liveness replies and chat lives in one place.

use std::fmt;

/// Capability that makes the server attach IRCv3 tags to messages.
pub const TAGS_CAPABILITY: &str = "twitch.tv/tags";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    Pass { token: String },
    Nick { nick: String },
    CapReq { capability: String },
    Join { channel: String },
    Pong { server: String },
    Privmsg { channel: String, text: String },
}

impl fmt::Display for OutboundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundCommand::Pass { token } => {
                let token = token.strip_prefix("oauth:").unwrap_or(token);
                write!(f, "PASS oauth:{}", sanitize(token))
            }
            OutboundCommand::Nick { nick } => write!(f, "NICK {}", sanitize(nick)),
            OutboundCommand::CapReq { capability } => write!(f, "CAP REQ :{}", sanitize(capability)),
            OutboundCommand::Join { channel } => write!(f, "JOIN #{}", sanitize(channel)),
            OutboundCommand::Pong { server } => write!(f, "PONG :{}", sanitize(server)),
            OutboundCommand::Privmsg { channel, text } => {
                write!(f, "PRIVMSG #{} :{}", sanitize(channel), sanitize(text))
            }
        }
    }
}

/// Strip characters that could end the line early or smuggle in CTCP.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\x01'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_lines() {
        assert_eq!(
            OutboundCommand::Pass { token: "abc123".into() }.to_string(),
            "PASS oauth:abc123"
        );
        assert_eq!(
            OutboundCommand::Pass { token: "oauth:abc123".into() }.to_string(),
            "PASS oauth:abc123"
        );
        assert_eq!(OutboundCommand::Nick { nick: "mybot".into() }.to_string(), "NICK mybot");
        assert_eq!(
            OutboundCommand::CapReq { capability: TAGS_CAPABILITY.into() }.to_string(),
            "CAP REQ :twitch.tv/tags"
        );
        assert_eq!(OutboundCommand::Join { channel: "ch".into() }.to_string(), "JOIN #ch");
    }

    #[test]
    fn test_pong() {
        assert_eq!(
            OutboundCommand::Pong { server: "tmi.twitch.tv".into() }.to_string(),
            "PONG :tmi.twitch.tv"
        );
    }

    #[test]
    fn test_privmsg_strips_line_breaks_and_ctcp() {
        let cmd = OutboundCommand::Privmsg {
            channel: "ch".into(),
            text: "hi\r\nPRIVMSG #other :spam\x01".into(),
        };
        assert_eq!(cmd.to_string(), "PRIVMSG #ch :hiPRIVMSG #other :spam");
    }
}
