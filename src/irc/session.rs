//! Protocol session: handshake, liveness and dispatch for one connection.
//!
//! The session consumes [`TransportEvent`]s one at a time, so all of its
//! state is mutated from a single task. It writes only to the outbound line
//! queue and forwards chat messages to the pipeline worker; it never waits on
//! either of them.

use crate::app::event::{ChatEvent, SessionEnd, TransportEvent, CLOSE_ABNORMAL};
use crate::config::nickname::generate_anonymous_nickname;
use crate::config::AppConfig;
use crate::irc::command::{OutboundCommand, TAGS_CAPABILITY};
use crate::irc::parser::{parse_frame, IrcMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connecting,
    Authenticating,
    Joined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    pub joined_channel: Option<String>,
}

pub struct Session {
    config: Arc<AppConfig>,
    state: SessionState,
    outbound: mpsc::UnboundedSender<OutboundCommand>,
    chat_tx: mpsc::Sender<ChatEvent>,
}

impl Session {
    pub fn new(
        config: Arc<AppConfig>,
        outbound: mpsc::UnboundedSender<OutboundCommand>,
        chat_tx: mpsc::Sender<ChatEvent>,
    ) -> Self {
        Self {
            config,
            state: SessionState {
                phase: Phase::Connecting,
                joined_channel: None,
            },
            outbound,
            chat_tx,
        }
    }

    /// Drive the session until the transport closes.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<TransportEvent>) -> SessionEnd {
        while let Some(event) = events.recv().await {
            if let Some(end) = self.handle_event(event) {
                return end;
            }
        }
        self.state.phase = Phase::Disconnected;
        SessionEnd::Abnormal {
            code: CLOSE_ABNORMAL,
            reason: "transport stopped without a close event".to_string(),
        }
    }

    /// Apply one transport event. Returns `Some` once the session is over.
    pub fn handle_event(&mut self, event: TransportEvent) -> Option<SessionEnd> {
        match event {
            TransportEvent::Opened => {
                self.on_open();
                None
            }
            TransportEvent::FrameReceived(raw) => self.on_frame(&raw),
            TransportEvent::Errored(cause) => {
                warn!(error = %cause, "WebSocket error");
                None
            }
            TransportEvent::Closed { code, reason } => {
                info!(code, reason = %reason, "Connection closed");
                self.state.phase = Phase::Disconnected;
                self.state.joined_channel = None;
                Some(SessionEnd::from_close(code, reason))
            }
        }
    }

    fn on_open(&mut self) {
        info!("IRC connection opened, authenticating");
        self.state.phase = Phase::Authenticating;

        let twitch = &self.config.twitch;
        let nick = match &twitch.oauth_token {
            Some(token) if twitch.can_send() => {
                self.send(OutboundCommand::Pass { token: token.clone() });
                if twitch.bot_username.is_empty() {
                    generate_anonymous_nickname()
                } else {
                    twitch.bot_username.clone()
                }
            }
            _ => generate_anonymous_nickname(),
        };
        self.send(OutboundCommand::Nick { nick });
        self.send(OutboundCommand::CapReq {
            capability: TAGS_CAPABILITY.to_string(),
        });
        self.send(OutboundCommand::Join {
            channel: twitch.channel.clone(),
        });

        self.state.phase = Phase::Joined;
        self.state.joined_channel = Some(twitch.channel.clone());
        info!(channel = %twitch.channel, "Joined");
    }

    fn on_frame(&mut self, raw: &str) -> Option<SessionEnd> {
        let messages = parse_frame(raw);

        // Answer liveness checks before anything else in this frame.
        for msg in messages.iter().filter(|m| m.command == "PING") {
            let server = if msg.trailing.is_empty() {
                msg.params.first().cloned().unwrap_or_else(|| "tmi.twitch.tv".to_string())
            } else {
                msg.trailing.clone()
            };
            trace!(server = %server, "PING");
            self.send(OutboundCommand::Pong { server });
        }

        for msg in messages {
            match msg.command.as_str() {
                "PING" => {}
                "PRIVMSG" => self.forward_chat(msg),
                "RECONNECT" => {
                    info!("Server requested reconnect");
                    self.state.phase = Phase::Disconnected;
                    return Some(SessionEnd::Abnormal {
                        code: CLOSE_ABNORMAL,
                        reason: "server requested reconnect".to_string(),
                    });
                }
                _ => trace!(line = %msg.to_line(), "Ignored"),
            }
        }
        None
    }

    fn forward_chat(&self, msg: IrcMessage) {
        let event = ChatEvent {
            sender: msg.nick().to_string(),
            channel: msg.params.first().cloned().unwrap_or_default(),
            text: msg.trailing,
            tags: msg.tags,
        };
        match self.chat_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                debug!(sender = %event.sender, "Pipeline backlog full, chat message dropped");
            }
            Err(TrySendError::Closed(_)) => debug!("Pipeline worker gone, chat message dropped"),
        }
    }

    fn send(&self, command: OutboundCommand) {
        if self.outbound.send(command).is_err() {
            debug!("Outbound queue closed");
        }
    }
}
