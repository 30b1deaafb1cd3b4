//! Protocol state machine
//!
//! Each phase is an async method that takes the [`Session`] by `&mut` and
//! returns an explicit `Result`. Expected branches such as timeouts and
//! rejections are matched on by the caller instead of unwinding.
//!
//! Phases, in order:
//!
//! 1. **Challenging** - obtain a fresh salt ([`Machine::challenge`])
//! 2. **LoggingIn** - send the login, store the auth token ([`Machine::authenticate`])
//! 3. **KeepAliveBootstrap** - phase-1 plus three phase-2/3 exchanges ([`Machine::bootstrap`])
//! 4. **KeepAliveStable** - repeat the keepalive cycle forever ([`Machine::keep_alive`])
//!
//! [`Machine::logout`] may run from any phase.

use std::time::{SystemTime, UNIX_EPOCH};

use drcom_core::{AuthInfo, Error, Result, Salt, Session, SessionState};
use drcom_protocol::{
    logout_acknowledged, parse_challenge_reply, parse_login_reply, ChallengePacket,
    KeepAlive1Packet, KeepAlive2Packet, KeepAliveType, LoginPacket, LogoutPacket, Reply,
};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::cancel::Cancellation;
use crate::transport::{RecvOutcome, Transport};
use crate::tunables::Tunables;

/// Challenge attempts spent on obtaining a salt for a logout
const LOGOUT_CHALLENGE_ATTEMPTS: u32 = 3;

/// Stable-phase sequence numbers wrap at this modulus
const SEQUENCE_MODULUS: u16 = 127;

fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Drives one [`Session`] over a [`Transport`]
pub struct Machine<T: Transport> {
    transport: T,
    tunables: Tunables,
    cancel: Cancellation,
}

impl<T: Transport> Machine<T> {
    pub fn new(transport: T, tunables: Tunables, cancel: Cancellation) -> Self {
        Self {
            transport,
            tunables,
            cancel,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancel
    }

    async fn send(&mut self, phase: &'static str, packet: &[u8]) -> Result<()> {
        debug!(phase, bytes = %hex::encode(packet), "send");
        self.transport.send(packet).await
    }

    /// Wait for the next datagram from the gateway
    ///
    /// Datagrams from other peers are logged and skipped without consuming the
    /// retry budget of the caller.
    async fn recv_reply(&mut self, phase: &'static str) -> Result<Vec<u8>> {
        loop {
            match self.transport.recv().await? {
                RecvOutcome::Reply(data) => {
                    debug!(phase, bytes = %hex::encode(&data), "recv");
                    return Ok(data);
                }
                RecvOutcome::Timeout => return Err(Error::TransportTimeout),
                RecvOutcome::AddressMismatch(from, data) => {
                    let desync = Error::ProtocolDesync { from };
                    debug!(phase, error = %desync, bytes = %hex::encode(&data), "Ignoring datagram");
                }
            }
        }
    }

    /// Send one packet and wait for its reply
    async fn exchange(&mut self, phase: &'static str, packet: &[u8]) -> Result<Vec<u8>> {
        self.send(phase, packet).await?;
        self.recv_reply(phase).await
    }

    async fn request_salt(&mut self, attempts: Option<u32>, cancellable: bool) -> Result<Salt> {
        let mut sent = 0u32;

        loop {
            if cancellable {
                self.cancel.check()?;
            }
            if attempts.is_some_and(|max| sent >= max) {
                return Err(Error::TransportTimeout);
            }

            let jitter = rand::thread_rng().gen_range(0x0f..=0xff);
            let packet = ChallengePacket::from_clock(unix_secs(), jitter).build();
            self.send("challenge", &packet).await?;
            sent += 1;

            match self.recv_reply("challenge").await {
                Ok(data) => return parse_challenge_reply(&data),
                Err(Error::TransportTimeout) => {
                    warn!(attempt = sent, "Challenge timed out, resending");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Challenging: obtain a fresh salt
    ///
    /// Timeouts resend without limit. A reply with the wrong leading byte is
    /// `ChallengeRejected` and left to the caller.
    pub async fn challenge(&mut self, session: &mut Session) -> Result<Salt> {
        session.state = SessionState::Challenging;
        let salt = self.request_salt(None, true).await?;
        debug!(salt = %salt, "Received salt");
        session.salt = Some(salt);
        Ok(salt)
    }

    /// LoggingIn: one login attempt with the salt just obtained
    pub async fn login(&mut self, session: &mut Session, salt: Salt) -> Result<AuthInfo> {
        session.state = SessionState::LoggingIn;
        let packet = LoginPacket::new(session, salt).build()?;
        let data = self.exchange("login", &packet).await?;

        let auth_info = parse_login_reply(&data)?;
        session.auth_info = Some(auth_info);
        Ok(auth_info)
    }

    /// Challenging and LoggingIn until the gateway accepts the credentials
    ///
    /// On success the socket is drained and the session moves to
    /// KeepAliveBootstrap.
    pub async fn authenticate(&mut self, session: &mut Session) -> Result<()> {
        loop {
            self.cancel.check()?;

            let salt = match self.challenge(session).await {
                Ok(salt) => salt,
                Err(e @ Error::ChallengeRejected { .. }) => {
                    warn!(error = %e, "Challenge rejected, backing off");
                    self.cancel.sleep(self.tunables.challenge_retry).await?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match self.login(session, salt).await {
                Ok(_) => {
                    info!(username = %session.username, "Logged in");
                    let dropped = self.transport.drain().await?;
                    if dropped > 0 {
                        debug!(dropped, "Drained stale datagrams after login");
                    }
                    session.state = SessionState::KeepAliveBootstrap;
                    return Ok(());
                }
                Err(Error::TransportTimeout) => {
                    warn!("Login timed out, re-challenging");
                }
                Err(e @ Error::LoginRejected { .. }) => {
                    warn!(error = %e, "Login rejected, logging out before retry");
                    self.cancel.sleep(self.tunables.login_retry).await?;
                    if let Err(e) = self.send_logout(session, true).await {
                        if matches!(e, Error::Cancelled) {
                            return Err(e);
                        }
                        warn!(error = %e, "Clearing logout failed");
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn keepalive1(&mut self, session: &Session) -> Result<()> {
        let (salt, auth_info) = match (session.salt, session.auth_info) {
            (Some(salt), Some(auth_info)) => (salt, auth_info),
            _ => {
                return Err(Error::PacketConstruction(
                    "keepalive requires a salt and an auth token".to_string(),
                ))
            }
        };

        let packet = KeepAlive1Packet::new(salt, &session.password, auth_info, unix_secs()).build();
        let data = self.exchange("keepalive-1", &packet).await?;
        Reply::new(&data).expect_keepalive("phase-1")
    }

    async fn keepalive2(
        &mut self,
        session: &Session,
        sequence: u8,
        kind: KeepAliveType,
        first: bool,
    ) -> Result<Vec<u8>> {
        let mut packet = KeepAlive2Packet::new(
            sequence,
            kind,
            session.profile.keep_alive_version,
            session.tail,
            session.host_ip,
        );
        if first {
            packet = packet.first();
        }

        let phase = match kind {
            KeepAliveType::Type1 => "keepalive-2",
            KeepAliveType::Type3 => "keepalive-3",
        };
        self.exchange(phase, &packet.build()).await
    }

    /// One pass of the bootstrap exchange
    ///
    /// Resets the counters, then: phase-1; first type-1 (lenient acceptance);
    /// type-1 capturing the tail; type-3 capturing the tail. Every accepted
    /// reply advances the sequence number by one.
    pub async fn bootstrap_once(&mut self, session: &mut Session) -> Result<()> {
        session.state = SessionState::KeepAliveBootstrap;
        session.reset_keepalive();

        self.keepalive1(session).await?;

        let seq = session.sequence_number;
        let data = self.keepalive2(session, seq, KeepAliveType::Type1, true).await?;
        let reply = Reply::new(&data);
        if !reply.accepts_first_keepalive(seq) {
            return Err(Error::keepalive_rejected("type-1 first", reply.code()));
        }
        if reply.is_file_push() {
            info!("Gateway pushed a file during bootstrap");
        }
        session.sequence_number += 1;

        let seq = session.sequence_number;
        let data = self.keepalive2(session, seq, KeepAliveType::Type1, false).await?;
        let reply = Reply::new(&data);
        reply.expect_keepalive("type-1")?;
        session.sequence_number += 1;
        session.tail = reply.tail();

        let seq = session.sequence_number;
        let data = self.keepalive2(session, seq, KeepAliveType::Type3, false).await?;
        let reply = Reply::new(&data);
        reply.expect_keepalive("type-3")?;
        session.sequence_number += 1;
        session.tail = reply.tail();

        Ok(())
    }

    /// KeepAliveBootstrap
    ///
    /// A rejection restarts the bootstrap from phase-1 after `keepalive_retry`,
    /// without limit unless `max_bootstrap_attempts` is non-zero. It never
    /// falls back to LoggingIn on its own. Timeouts are returned to the caller.
    /// On success sleeps one keepalive interval.
    pub async fn bootstrap(&mut self, session: &mut Session) -> Result<()> {
        let mut attempt = 0u32;

        loop {
            self.cancel.check()?;
            attempt += 1;

            match self.bootstrap_once(session).await {
                Ok(()) => break,
                Err(e @ Error::KeepAliveRejected { .. }) => {
                    let limit = self.tunables.max_bootstrap_attempts;
                    if limit > 0 && attempt >= limit {
                        return Err(e);
                    }
                    warn!(attempt, error = %e, "Keepalive bootstrap rejected, restarting");
                    self.cancel.sleep(self.tunables.keepalive_retry).await?;
                }
                Err(e) => return Err(e),
            }
        }

        info!(seq = session.sequence_number, tail = %hex::encode(session.tail.as_bytes()), "Keepalive established");
        self.cancel.sleep(self.tunables.keep_alive_interval).await
    }

    /// One stable keepalive cycle
    ///
    /// Phase-1, then type-1 with `seq`, then type-3 with `seq + 1`, each
    /// capturing the tail. Finally `seq = (seq + 2) mod 127`.
    pub async fn stable_cycle(&mut self, session: &mut Session) -> Result<()> {
        self.keepalive1(session).await?;

        let seq = session.sequence_number;
        let data = self.keepalive2(session, seq, KeepAliveType::Type1, false).await?;
        let reply = Reply::new(&data);
        reply.expect_keepalive("type-1")?;
        session.tail = reply.tail();

        let data = self
            .keepalive2(session, seq.wrapping_add(1), KeepAliveType::Type3, false)
            .await?;
        let reply = Reply::new(&data);
        reply.expect_keepalive("type-3")?;
        session.tail = reply.tail();

        session.sequence_number = ((u16::from(seq) + 2) % SEQUENCE_MODULUS) as u8;
        Ok(())
    }

    /// KeepAliveStable: run cycles until cancelled
    ///
    /// A failed cycle is logged and retried from its start after
    /// `keepalive_retry`. With `max_keepalive_failures` set, that many
    /// consecutive failures return the last error.
    pub async fn keep_alive(&mut self, session: &mut Session) -> Result<()> {
        session.state = SessionState::KeepAliveStable;
        let mut failures = 0u32;

        loop {
            self.cancel.check()?;

            match self.stable_cycle(session).await {
                Ok(()) => {
                    failures = 0;
                    debug!(seq = session.sequence_number, "Keepalive cycle complete");
                    self.cancel.sleep(self.tunables.keep_alive_interval).await?;
                }
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    failures += 1;
                    let limit = self.tunables.max_keepalive_failures;
                    if limit > 0 && failures >= limit {
                        return Err(e);
                    }
                    warn!(failures, error = %e, "Keepalive cycle failed, retrying");
                    self.cancel.sleep(self.tunables.keepalive_retry).await?;
                }
            }
        }
    }

    async fn send_logout(&mut self, session: &mut Session, cancellable: bool) -> Result<bool> {
        let salt = self
            .request_salt(Some(LOGOUT_CHALLENGE_ATTEMPTS), cancellable)
            .await?;
        session.salt = Some(salt);

        let packet = LogoutPacket::new(session, salt).build();
        match self.exchange("logout", &packet).await {
            Ok(data) => Ok(logout_acknowledged(&data)),
            Err(Error::TransportTimeout) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Logout: fresh challenge, one logout packet, one receive
    ///
    /// Returns whether the gateway acknowledged. Runs even after cancellation.
    pub async fn logout(&mut self, session: &mut Session) -> Result<bool> {
        let acknowledged = self.send_logout(session, false).await?;
        if acknowledged {
            info!(username = %session.username, "Logged out");
        } else {
            warn!("Gateway did not acknowledge logout");
        }
        session.state = SessionState::LoggedOut;
        Ok(acknowledged)
    }
}
