use std::collections::HashMap;

/// WebSocket close code for a clean, intentional shutdown.
pub const CLOSE_NORMAL: u16 = 1000;
/// Close code reported when the socket went away without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Everything the transport can tell the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Socket is open and ready for the handshake.
    Opened,
    /// One text delivery, possibly holding several protocol lines.
    FrameReceived(String),
    Errored(String),
    Closed { code: u16, reason: String },
}

/// A channel message handed from the session to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub sender: String,
    pub channel: String,
    pub text: String,
    pub tags: HashMap<String, String>,
}

/// How a session ended, as seen by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Clean,
    Abnormal { code: u16, reason: String },
}

impl SessionEnd {
    pub fn from_close(code: u16, reason: String) -> Self {
        if code == CLOSE_NORMAL {
            SessionEnd::Clean
        } else {
            SessionEnd::Abnormal { code, reason }
        }
    }
}
