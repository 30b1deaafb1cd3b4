//! Session state shared by the codec and the state machine
//!
//! A [`Session`] holds everything that must persist across the lifetime of one
//! client run: credentials, the local environment copied into payloads, the
//! gateway-specific [`GatewayProfile`] and the values negotiated with the
//! gateway (salt, auth token, keepalive counters).

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};

use crate::types::{AuthInfo, MacAddr, Salt, Tail};

/// Gateway-specific constants, normally extracted once from a capture
///
/// These are opaque to the client. The codec copies them into packets verbatim
/// and nothing mutates them after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayProfile {
    pub control_check_status: u8,
    pub adapter_num: u8,
    pub ip_dog: u8,
    pub auth_version: [u8; 2],
    pub keep_alive_version: [u8; 2],
    /// Gateway wants the rotate-XOR extended password block in the login packet
    pub ror_version: bool,
}

impl Default for GatewayProfile {
    fn default() -> Self {
        Self {
            control_check_status: 0x20,
            adapter_num: 0x01,
            ip_dog: 0x01,
            auth_version: [0x0a, 0x00],
            keep_alive_version: [0xdc, 0x02],
            ror_version: false,
        }
    }
}

/// Where the state machine currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Challenging,
    LoggingIn,
    KeepAliveBootstrap,
    KeepAliveStable,
    LoggedOut,
    Aborted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Challenging => "challenging",
            SessionState::LoggingIn => "logging-in",
            SessionState::KeepAliveBootstrap => "keepalive-bootstrap",
            SessionState::KeepAliveStable => "keepalive-stable",
            SessionState::LoggedOut => "logged-out",
            SessionState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// All per-run protocol state
///
/// The session is owned by exactly one state machine and passed by `&mut` into
/// each transition. `salt` and `auth_info` are only ever set from datagrams the
/// gateway sent.
#[derive(Debug, Clone)]
pub struct Session {
    pub server_addr: SocketAddr,
    pub username: String,
    pub password: String,
    pub mac: MacAddr,
    pub host_ip: Ipv4Addr,
    pub dns_ip: Ipv4Addr,
    pub dhcp_ip: Ipv4Addr,
    pub host_name: String,
    pub host_os: String,
    pub profile: GatewayProfile,

    pub salt: Option<Salt>,
    pub auth_info: Option<AuthInfo>,
    pub sequence_number: u8,
    pub tail: Tail,
    pub state: SessionState,
}

impl Session {
    /// Create an idle session with no negotiated values
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        server_addr: SocketAddr,
        username: impl Into<String>,
        password: impl Into<String>,
        mac: MacAddr,
        host_ip: Ipv4Addr,
        dns_ip: Ipv4Addr,
        dhcp_ip: Ipv4Addr,
        host_name: impl Into<String>,
        host_os: impl Into<String>,
        profile: GatewayProfile,
    ) -> Self {
        Self {
            server_addr,
            username: username.into(),
            password: password.into(),
            mac,
            host_ip,
            dns_ip,
            dhcp_ip,
            host_name: host_name.into(),
            host_os: host_os.into(),
            profile,
            salt: None,
            auth_info: None,
            sequence_number: 0,
            tail: Tail::ZERO,
            state: SessionState::Idle,
        }
    }

    /// Forget everything negotiated with the gateway
    ///
    /// Used when the driver restarts the whole session from Challenging.
    pub fn reset(&mut self) {
        self.salt = None;
        self.auth_info = None;
        self.sequence_number = 0;
        self.tail = Tail::ZERO;
        self.state = SessionState::Idle;
    }

    /// Reset the keepalive counters before a bootstrap attempt
    pub fn reset_keepalive(&mut self) {
        self.sequence_number = 0;
        self.tail = Tail::ZERO;
    }

    /// Password with every character masked, for log output
    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.chars().count())
    }
}
