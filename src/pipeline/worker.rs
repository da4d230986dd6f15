//! Background task that runs the pipeline for one session.
//!
//! Keeping translation off the session loop means a slow translator call can
//! never delay a PONG. Events are processed one at a time, so the throttle's
//! send time is only ever touched from this task.

use super::{Outcome, Pipeline, Throttle};
use crate::app::event::ChatEvent;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Chat messages waiting for the worker. Further messages are dropped.
pub const CHAT_BACKLOG: usize = 32;

/// Process chat events until `shutdown` fires or the session drops its sender,
/// then hand the throttle back so its send time survives a reconnect.
///
/// Shutdown abandons the backlog and any call in flight: the transport is
/// gone by then, so no reply could be delivered.
pub async fn run_worker(
    pipeline: Arc<Pipeline>,
    mut throttle: Throttle,
    mut events: mpsc::Receiver<ChatEvent>,
    mut shutdown: oneshot::Receiver<()>,
) -> Throttle {
    loop {
        let event = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                debug!(sender = %event.sender, "Session ended mid-translation");
                break;
            }
            outcome = pipeline.process(&event) => {
                if let Outcome::Replied(reply) = outcome {
                    throttle.try_send(&reply);
                }
            }
        }
    }
    debug!("Pipeline worker stopped");
    throttle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::pipeline::testing::{FixedDetector, FixedTranslator};
    use std::collections::HashMap;
    use std::time::Duration;

    fn config() -> Arc<AppConfig> {
        let mut cfg = AppConfig::default();
        cfg.twitch.channel = "ch".into();
        cfg.twitch.oauth_token = Some("token".into());
        cfg.filter.allowed_languages = vec!["tr".into()];
        Arc::new(cfg)
    }

    fn chat(text: &str) -> ChatEvent {
        ChatEvent {
            sender: "alice".into(),
            channel: "#ch".into(),
            text: text.into(),
            tags: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_worker_sends_replies_and_returns_throttle() {
        let cfg = config();
        let pipeline = Pipeline::new(
            cfg.clone(),
            Box::new(FixedDetector::new(Some("tr"))),
            Box::new(FixedTranslator::new(Some("hello world"))),
        )
        .unwrap();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (chat_tx, chat_rx) = mpsc::channel(CHAT_BACKLOG);
        let (_stop_tx, stop_rx) = oneshot::channel();
        let worker = tokio::spawn(run_worker(
            Arc::new(pipeline),
            Throttle::new(&cfg, out_tx),
            chat_rx,
            stop_rx,
        ));

        chat_tx.send(chat("merhaba dünya")).await.unwrap();
        drop(chat_tx);

        let throttle = worker.await.unwrap();
        assert!(throttle.last_send().is_some());
        assert_eq!(
            out_rx.recv().await.unwrap().to_string(),
            "PRIVMSG #ch :[by alice] hello world (tr > en)"
        );
    }

    #[tokio::test]
    async fn test_shutdown_abandons_backlog() {
        let cfg = config();
        let translator =
            FixedTranslator::new(Some("hello")).with_delay(Duration::from_secs(1));
        let pipeline = Pipeline::new(
            cfg.clone(),
            Box::new(FixedDetector::new(Some("tr"))),
            Box::new(translator.clone()),
        )
        .unwrap();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let (chat_tx, chat_rx) = mpsc::channel(CHAT_BACKLOG);
        let (stop_tx, stop_rx) = oneshot::channel();
        for _ in 0..4 {
            chat_tx.send(chat("merhaba dünya")).await.unwrap();
        }

        let started = tokio::time::Instant::now();
        let worker = tokio::spawn(run_worker(
            Arc::new(pipeline),
            Throttle::new(&cfg, out_tx),
            chat_rx,
            stop_rx,
        ));
        tokio::time::sleep(Duration::from_millis(50)).await;
        stop_tx.send(()).unwrap();

        let throttle = worker.await.unwrap();
        assert!(started.elapsed() < Duration::from_millis(500));
        assert!(translator.calls() <= 1);
        assert_eq!(throttle.last_send(), None);
        assert!(out_rx.try_recv().is_err());
    }
}
