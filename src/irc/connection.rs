use crate::app::event::{TransportEvent, CLOSE_ABNORMAL, CLOSE_NORMAL};
use crate::irc::command::OutboundCommand;
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
/// Close code used when the server closed without giving one.
const CLOSE_NO_STATUS: u16 = 1005;

/// Handle to the background task that owns the WebSocket.
pub struct IrcConnection {
    task: JoinHandle<()>,
}

impl IrcConnection {
    /// Give the pump a moment to send its close frame, then stop it.
    pub async fn finish(mut self) {
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.task).await.is_err() {
            debug!("Transport did not stop in time, aborting");
        }
    }
}

impl Drop for IrcConnection {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Open the WebSocket and spawn the task that pumps it.
///
/// Inbound traffic is reported on `event_tx` starting with
/// [`TransportEvent::Opened`]; lines queued on `outbound` are written in
/// order. When every outbound sender is dropped the socket is closed cleanly.
pub async fn spawn_connection(
    url: &str,
    event_tx: mpsc::UnboundedSender<TransportEvent>,
    mut outbound: mpsc::UnboundedReceiver<OutboundCommand>,
) -> Result<IrcConnection> {
    let (ws_stream, _) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(url))
        .await
        .with_context(|| format!("Timed out connecting to {}", url))?
        .with_context(|| format!("Failed to connect to {}", url))?;

    let (mut write, mut read) = ws_stream.split();
    let _ = event_tx.send(TransportEvent::Opened);

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                command = outbound.recv() => match command {
                    Some(command) => {
                        let line = format!("{}\r\n", command);
                        if let Err(e) = write.send(Message::Text(line)).await {
                            let _ = event_tx.send(TransportEvent::Errored(e.to_string()));
                            let _ = event_tx.send(TransportEvent::Closed {
                                code: CLOSE_ABNORMAL,
                                reason: "write failed".to_string(),
                            });
                            break;
                        }
                    }
                    None => {
                        debug!("Outbound queue closed, closing socket");
                        let frame = CloseFrame {
                            code: CloseCode::Normal,
                            reason: "".into(),
                        };
                        let _ = write.send(Message::Close(Some(frame))).await;
                        let _ = event_tx.send(TransportEvent::Closed {
                            code: CLOSE_NORMAL,
                            reason: "client closed".to_string(),
                        });
                        break;
                    }
                },
                message = read.next() => match message {
                    Some(Ok(Message::Text(text))) => {
                        if event_tx.send(TransportEvent::FrameReceived(text)).is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        let text = String::from_utf8_lossy(&bytes).into_owned();
                        if event_tx.send(TransportEvent::FrameReceived(text)).is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if write.send(Message::Pong(data)).await.is_err() {
                            warn!("Failed to send pong");
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.into_owned()))
                            .unwrap_or((CLOSE_NO_STATUS, String::new()));
                        let _ = event_tx.send(TransportEvent::Closed { code, reason });
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        let _ = event_tx.send(TransportEvent::Errored(e.to_string()));
                        let _ = event_tx.send(TransportEvent::Closed {
                            code: CLOSE_ABNORMAL,
                            reason: e.to_string(),
                        });
                        break;
                    }
                    None => {
                        let _ = event_tx.send(TransportEvent::Closed {
                            code: CLOSE_ABNORMAL,
                            reason: "stream ended".to_string(),
                        });
                        break;
                    }
                },
            }
        }
    });

    Ok(IrcConnection { task })
}
