//! Top-level driver
//!
//! Runs authenticate, bootstrap and the stable keepalive loop inside an
//! unbounded outer loop. Anything that escapes a session, short of
//! cancellation, is logged and followed by a full restart after
//! `timeout_retry`. Cancellation ends the loop with a best-effort logout.

use drcom_core::{Error, Result, Session, SessionState};
use tracing::{error, info, warn};

use crate::cancel::Cancellation;
use crate::machine::Machine;
use crate::transport::Transport;
use crate::tunables::Tunables;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Sessions started, including the first
    pub sessions: u32,
    /// Gateway acknowledged the final logout
    pub logout_acknowledged: bool,
}

pub struct Driver<T: Transport> {
    machine: Machine<T>,
    session: Session,
}

impl<T: Transport> Driver<T> {
    pub fn new(session: Session, transport: T, tunables: Tunables, cancel: Cancellation) -> Self {
        Self {
            machine: Machine::new(transport, tunables, cancel),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn machine(&self) -> &Machine<T> {
        &self.machine
    }

    async fn run_session(&mut self) -> Result<()> {
        self.machine.authenticate(&mut self.session).await?;
        self.machine.bootstrap(&mut self.session).await?;
        self.machine.keep_alive(&mut self.session).await
    }

    /// Run until cancelled, then log out
    pub async fn run(&mut self) -> Result<RunSummary> {
        let cancel = self.machine.cancellation().clone();
        let retry = self.machine.tunables().timeout_retry;
        let mut sessions = 0u32;

        while !cancel.is_cancelled() {
            sessions += 1;
            info!(session = sessions, server = %self.session.server_addr, "Starting session");

            match self.run_session().await {
                Err(Error::Cancelled) => break,
                Ok(()) => warn!(state = %self.session.state, "Session ended, restarting"),
                Err(e) if e.is_transient() => {
                    warn!(state = %self.session.state, error = %e, "Session lost, restarting");
                    self.session.state = SessionState::Aborted;
                }
                Err(e) => {
                    error!(state = %self.session.state, error = %e, "Session failed, restarting");
                    self.session.state = SessionState::Aborted;
                }
            }

            if cancel.sleep(retry).await.is_err() {
                break;
            }
            self.session.reset();
        }

        info!(state = %self.session.state, "Shutdown requested, logging out");
        let logout_acknowledged = match self.machine.logout(&mut self.session).await {
            Ok(acknowledged) => acknowledged,
            Err(e) => {
                warn!(error = %e, "Logout failed");
                self.session.state = SessionState::Aborted;
                false
            }
        };

        Ok(RunSummary {
            sessions,
            logout_acknowledged,
        })
    }
}
