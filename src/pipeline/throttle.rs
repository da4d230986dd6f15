//! Minimum-interval gate for outbound chat replies.
//!
//! Replies that arrive too soon after the last accepted one are dropped, not
//! queued. Without an OAuth token nothing is ever sent; replies are only logged.
//!
//! A reply counts as sent once it is on the outbound queue. The interval is
//! charged even if the socket write fails afterwards.

use crate::config::AppConfig;
use crate::irc::command::OutboundCommand;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct Throttle {
    channel: String,
    min_interval: Duration,
    can_send: bool,
    outbound: mpsc::UnboundedSender<OutboundCommand>,
    last_send: Option<Instant>,
}

impl Throttle {
    pub fn new(config: &AppConfig, outbound: mpsc::UnboundedSender<OutboundCommand>) -> Self {
        Self {
            channel: config.twitch.channel.clone(),
            min_interval: config.throttle.min_interval(),
            can_send: config.twitch.can_send(),
            outbound,
            last_send: None,
        }
    }

    /// Carry the previous session's send time over a reconnect.
    pub fn with_last_send(mut self, last_send: Option<Instant>) -> Self {
        self.last_send = last_send;
        self
    }

    pub fn last_send(&self) -> Option<Instant> {
        self.last_send
    }

    /// Send `text` to the channel if the interval allows it. Returns whether
    /// the line was handed to the transport.
    pub fn try_send(&mut self, text: &str) -> bool {
        self.try_send_at(text, Instant::now())
    }

    pub fn try_send_at(&mut self, text: &str, now: Instant) -> bool {
        if !self.can_send {
            info!(reply = %text, "No OAuth token, printing translation only");
            return false;
        }

        if !self.min_interval.is_zero() {
            if let Some(last) = self.last_send {
                if now.saturating_duration_since(last) < self.min_interval {
                    info!(reply = %text, "Rate limited, skipping send");
                    return false;
                }
            }
        }

        let command = OutboundCommand::Privmsg {
            channel: self.channel.clone(),
            text: text.to_string(),
        };
        if self.outbound.send(command).is_err() {
            warn!("Outbound queue closed, reply dropped");
            return false;
        }
        self.last_send = Some(now);
        info!(channel = %self.channel, reply = %text, "Sent");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle(
        interval_secs: u64,
        token: Option<&str>,
    ) -> (Throttle, mpsc::UnboundedReceiver<OutboundCommand>) {
        let mut cfg = AppConfig::default();
        cfg.twitch.channel = "ch".into();
        cfg.twitch.oauth_token = token.map(str::to_string);
        cfg.throttle.rate_limit_delay_secs = interval_secs;
        let (tx, rx) = mpsc::unbounded_channel();
        (Throttle::new(&cfg, tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundCommand>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            lines.push(cmd.to_string());
        }
        lines
    }

    #[test]
    fn test_sends_closer_than_interval_are_dropped() {
        let (mut t, mut rx) = throttle(3, Some("token"));
        let start = Instant::now();
        assert!(t.try_send_at("first", start));
        assert!(!t.try_send_at("second", start + Duration::from_secs(1)));
        assert_eq!(drain(&mut rx), vec!["PRIVMSG #ch :first"]);
    }

    #[test]
    fn test_sends_further_apart_than_interval_pass() {
        let (mut t, mut rx) = throttle(3, Some("token"));
        let start = Instant::now();
        assert!(t.try_send_at("first", start));
        assert!(t.try_send_at("second", start + Duration::from_secs(4)));
        assert_eq!(drain(&mut rx).len(), 2);
    }

    #[test]
    fn test_suppressed_send_does_not_move_the_window() {
        let (mut t, _rx) = throttle(3, Some("token"));
        let start = Instant::now();
        assert!(t.try_send_at("a", start));
        assert!(!t.try_send_at("b", start + Duration::from_secs(2)));
        assert!(t.try_send_at("c", start + Duration::from_secs(3)));
        assert_eq!(t.last_send(), Some(start + Duration::from_secs(3)));
    }

    #[test]
    fn test_zero_interval_is_unlimited() {
        let (mut t, mut rx) = throttle(0, Some("token"));
        let now = Instant::now();
        for i in 0..5 {
            assert!(t.try_send_at(&format!("msg {i}"), now));
        }
        assert_eq!(drain(&mut rx).len(), 5);
    }

    #[test]
    fn test_without_token_nothing_is_sent_or_counted() {
        let (mut t, mut rx) = throttle(3, None);
        assert!(!t.try_send_at("hello", Instant::now()));
        assert!(drain(&mut rx).is_empty());
        assert_eq!(t.last_send(), None);
    }

    #[test]
    fn test_closed_queue_is_not_a_send() {
        let (mut t, rx) = throttle(0, Some("token"));
        drop(rx);
        assert!(!t.try_send_at("hello", Instant::now()));
        assert_eq!(t.last_send(), None);
    }

    #[test]
    fn test_queued_reply_charges_interval_even_if_never_written() {
        let (mut t, rx) = throttle(3, Some("token"));
        let start = Instant::now();
        assert!(t.try_send_at("queued", start));
        drop(rx);
        assert!(!t.try_send_at("retry", start + Duration::from_secs(1)));
        assert_eq!(t.last_send(), Some(start));
    }

    #[test]
    fn test_last_send_carries_over() {
        let (t, _rx) = throttle(3, Some("token"));
        let earlier = Instant::now();
        let mut t = t.with_last_send(Some(earlier));
        assert!(!t.try_send_at("too soon", earlier + Duration::from_secs(1)));
    }
}
