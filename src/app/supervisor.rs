//! Reconnect supervisor.
//!
//! Runs sessions in a loop: a clean close ends the loop, anything else waits a
//! fixed delay and starts a fresh session. There is no retry limit.

use crate::app::event::SessionEnd;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// Something that can run one session from connect to close.
#[async_trait]
pub trait SessionRunner: Send {
    async fn run_session(&mut self) -> SessionEnd;
}

/// Run sessions until one ends cleanly. Returns the number of sessions run.
pub async fn run_supervised<R: SessionRunner>(runner: &mut R, delay: Duration) -> u64 {
    let mut sessions = 0;
    loop {
        sessions += 1;
        match runner.run_session().await {
            SessionEnd::Clean => {
                info!("Connection closed cleanly, not reconnecting");
                return sessions;
            }
            SessionEnd::Abnormal { code, reason } => {
                warn!(
                    code,
                    reason = %reason,
                    delay_secs = delay.as_secs_f32(),
                    "Connection lost, reconnecting"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
