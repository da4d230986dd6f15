//! One translator bot session: transport, protocol session and pipeline worker
//! wired together for a single connection.

use crate::app::event::{SessionEnd, TransportEvent, CLOSE_ABNORMAL};
use crate::app::supervisor::SessionRunner;
use crate::config::AppConfig;
use crate::irc::command::OutboundCommand;
use crate::irc::connection::spawn_connection;
use crate::irc::session::Session;
use crate::pipeline::worker::{run_worker, CHAT_BACKLOG};
use crate::pipeline::{Pipeline, Throttle};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

pub struct Bot {
    config: Arc<AppConfig>,
    pipeline: Arc<Pipeline>,
    last_send: Option<Instant>,
}

impl Bot {
    pub fn new(config: Arc<AppConfig>, pipeline: Pipeline) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
            last_send: None,
        }
    }

    /// Run the session and its pipeline worker over an already-open transport.
    ///
    /// Returns as soon as the session ends; chat still queued for the worker
    /// is discarded.
    async fn drive(
        &mut self,
        events: mpsc::UnboundedReceiver<TransportEvent>,
        outbound: mpsc::UnboundedSender<OutboundCommand>,
    ) -> SessionEnd {
        let (chat_tx, chat_rx) = mpsc::channel(CHAT_BACKLOG);
        let (stop_tx, stop_rx) = oneshot::channel();
        let throttle = Throttle::new(&self.config, outbound.clone()).with_last_send(self.last_send);
        let worker = tokio::spawn(run_worker(self.pipeline.clone(), throttle, chat_rx, stop_rx));

        let end = Session::new(self.config.clone(), outbound, chat_tx)
            .run(events)
            .await;
        let _ = stop_tx.send(());

        match worker.await {
            Ok(throttle) => self.last_send = throttle.last_send(),
            Err(e) => warn!(error = %e, "Pipeline worker failed"),
        }
        end
    }
}

#[async_trait]
impl SessionRunner for Bot {
    async fn run_session(&mut self) -> SessionEnd {
        info!(channel = %self.config.twitch.channel, url = %self.config.twitch.irc_url, "Connecting");
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        let connection = match spawn_connection(&self.config.twitch.irc_url, event_tx, out_rx).await {
            Ok(connection) => connection,
            Err(e) => {
                let error = format!("{:#}", e);
                warn!(error = %error, "Connection failed");
                return SessionEnd::Abnormal {
                    code: CLOSE_ABNORMAL,
                    reason: e.to_string(),
                };
            }
        };

        let end = self.drive(event_rx, out_tx).await;
        connection.finish().await;
        end
    }
}
