//! UDP transport to the gateway
//!
//! The state machine only talks to the gateway through the [`Transport`]
//! trait. A receive either yields a datagram from the gateway, times out, or
//! yields a datagram from somebody else. The three are distinct outcomes
//! because the state machine reacts to each differently.

use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use drcom_core::{Error, Result};
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

/// Large enough for any gateway reply
const RECV_BUFFER_LEN: usize = 2048;

/// Result of a single receive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecvOutcome {
    /// Datagram from the gateway
    Reply(Vec<u8>),
    /// Nothing arrived within the receive window
    Timeout,
    /// Datagram from an unexpected peer, to be ignored
    AddressMismatch(SocketAddr, Vec<u8>),
}

/// Datagram channel between the state machine and the gateway
#[async_trait]
pub trait Transport: Send {
    /// Send one datagram to the gateway
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Wait for one datagram, bounded by the receive timeout
    ///
    /// Each call gets a fresh timeout budget.
    async fn recv(&mut self) -> Result<RecvOutcome>;

    /// Discard every datagram already queued, returning how many were dropped
    async fn drain(&mut self) -> Result<usize>;

    /// Local address the transport is bound to
    fn local_addr(&self) -> Result<SocketAddr>;
}

/// UDP socket bound to the first free port of a range
pub struct UdpTransport {
    socket: UdpSocket,
    server: SocketAddr,
    recv_timeout: Duration,
}

impl UdpTransport {
    /// Bind the first free port in `port_range` on `bind_ip`
    ///
    /// Ports already in use are skipped. Any other bind error is returned
    /// immediately, and an exhausted range is [`Error::PortExhaustion`].
    pub async fn bind(
        bind_ip: IpAddr,
        port_range: RangeInclusive<u16>,
        server: SocketAddr,
        recv_timeout: Duration,
    ) -> Result<Self> {
        let (start, end) = (*port_range.start(), *port_range.end());

        for port in port_range {
            match UdpSocket::bind(SocketAddr::new(bind_ip, port)).await {
                Ok(socket) => {
                    info!(local = %socket.local_addr()?, server = %server, "Bound UDP socket");
                    return Ok(Self {
                        socket,
                        server,
                        recv_timeout,
                    });
                }
                Err(e) if matches!(e.kind(), ErrorKind::AddrInUse | ErrorKind::PermissionDenied) => {
                    debug!(port, error = %e, "Port unavailable, trying next");
                }
                Err(e) => return Err(Error::Io(e)),
            }
        }

        Err(Error::PortExhaustion { start, end })
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.socket.send_to(data, self.server).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<RecvOutcome> {
        let mut buf = [0u8; RECV_BUFFER_LEN];

        match tokio::time::timeout(self.recv_timeout, self.socket.recv_from(&mut buf)).await {
            Err(_) => Ok(RecvOutcome::Timeout),
            Ok(Err(e)) => Err(Error::Io(e)),
            Ok(Ok((len, from))) => {
                let data = buf[..len].to_vec();
                if from == self.server {
                    Ok(RecvOutcome::Reply(data))
                } else {
                    Ok(RecvOutcome::AddressMismatch(from, data))
                }
            }
        }
    }

    async fn drain(&mut self) -> Result<usize> {
        let mut buf = [0u8; RECV_BUFFER_LEN];
        let mut dropped = 0;

        loop {
            match self.socket.try_recv_from(&mut buf) {
                Ok((len, from)) => {
                    dropped += 1;
                    warn!(from = %from, bytes = %hex::encode(&buf[..len]), "Discarding stale datagram");
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(dropped),
                Err(e) => return Err(Error::Io(e)),
            }
        }
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}
