//! TOML configuration
//!
//! The file has four tables: `[application]` (logging, bind address, PID
//! file), `[drcom]` (gateway, credentials, host environment), `[core]`
//! (gateway-specific constants, usually produced by `drcom analyse`) and
//! `[tunables]` (timing). Everything is validated into a `Session` and
//! `Tunables` before the client starts.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use drcom_capture::{CaptureAnalysis, NetworkInfo};
use drcom_client::Tunables;
use drcom_core::{Error, GatewayProfile, MacAddr, Result, Session, DRCOM_PORT};
use drcom_protocol::constants::ACCOUNT_LEN;
use drcom_protocol::ROR_MAX_PASSWORD_LEN;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default search order when no `--config` is given
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("drcom.toml")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join("drcom").join("drcom.toml"));
    }
    paths.push(PathBuf::from("/etc/drcom/drcom.toml"));
    paths
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub application: ApplicationConfig,
    pub drcom: DrcomConfig,
    pub core: CoreConfig,
    pub tunables: TunablesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub bind_ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid_file: Option<PathBuf>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            bind_ip: "0.0.0.0".to_string(),
            pid_file: None,
        }
    }
}

/// MAC given either as an integer or as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MacSetting {
    Int(u64),
    Text(String),
}

impl MacSetting {
    pub fn to_mac(&self) -> Result<MacAddr> {
        match self {
            MacSetting::Int(value) if *value > 0xFFFF_FFFF_FFFF => Err(Error::config(format!(
                "mac 0x{value:x} is wider than 48 bits"
            ))),
            MacSetting::Int(value) => Ok(MacAddr::from_u64(*value)),
            MacSetting::Text(text) => text.parse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrcomConfig {
    pub server: String,
    pub server_port: u16,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<MacSetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
    pub host_name: String,
    pub host_os: String,
    pub dhcp: String,
    pub dns: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

impl Default for DrcomConfig {
    fn default() -> Self {
        Self {
            server: "10.0.0.1".to_string(),
            server_port: DRCOM_PORT,
            username: "username".to_string(),
            password: "password".to_string(),
            mac: None,
            host_ip: None,
            host_name: "DRCOM".to_string(),
            host_os: "Linux".to_string(),
            dhcp: "0.0.0.0".to_string(),
            dns: "8.8.8.8".to_string(),
            interface: None,
        }
    }
}

/// Gateway constants, each stored as a byte array like the analyser prints them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    #[serde(rename = "CONTROL_CHECK_STATUS")]
    pub control_check_status: Vec<u8>,
    #[serde(rename = "ADAPTER_NUM")]
    pub adapter_num: Vec<u8>,
    #[serde(rename = "IP_DOG")]
    pub ip_dog: Vec<u8>,
    #[serde(rename = "AUTH_VERSION")]
    pub auth_version: Vec<u8>,
    #[serde(rename = "KEEP_ALIVE_VERSION")]
    pub keep_alive_version: Vec<u8>,
    #[serde(rename = "ROR_VERSION")]
    pub ror_version: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::from(&GatewayProfile::default())
    }
}

impl From<&GatewayProfile> for CoreConfig {
    fn from(profile: &GatewayProfile) -> Self {
        Self {
            control_check_status: vec![profile.control_check_status],
            adapter_num: vec![profile.adapter_num],
            ip_dog: vec![profile.ip_dog],
            auth_version: profile.auth_version.to_vec(),
            keep_alive_version: profile.keep_alive_version.to_vec(),
            ror_version: profile.ror_version,
        }
    }
}

/// `[drcom]` part of an analysis report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ServerSetting {
    server: String,
}

/// Configuration fragment printed by `drcom analyse`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct AnalysisReport {
    drcom: ServerSetting,
    core: CoreConfig,
}

/// Render a capture analysis as `[drcom]` and `[core]` tables
pub fn analysis_toml(analysis: &CaptureAnalysis) -> Result<String> {
    let report = AnalysisReport {
        drcom: ServerSetting {
            server: analysis.server.to_string(),
        },
        core: CoreConfig::from(&analysis.profile()),
    };
    toml::to_string_pretty(&report).map_err(|e| Error::config(e.to_string()))
}

fn exact<const N: usize>(name: &str, bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        Error::config(format!(
            "[core] {name} must hold exactly {N} byte(s), got {}",
            bytes.len()
        ))
    })
}

impl CoreConfig {
    pub fn profile(&self) -> Result<GatewayProfile> {
        let [control_check_status] = exact::<1>("CONTROL_CHECK_STATUS", &self.control_check_status)?;
        let [adapter_num] = exact::<1>("ADAPTER_NUM", &self.adapter_num)?;
        let [ip_dog] = exact::<1>("IP_DOG", &self.ip_dog)?;

        Ok(GatewayProfile {
            control_check_status,
            adapter_num,
            ip_dog,
            auth_version: exact::<2>("AUTH_VERSION", &self.auth_version)?,
            keep_alive_version: exact::<2>("KEEP_ALIVE_VERSION", &self.keep_alive_version)?,
            ror_version: self.ror_version,
        })
    }
}

/// Timing knobs in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunablesConfig {
    pub keep_alive_interval: u64,
    pub recv_timeout: u64,
    pub challenge_retry: u64,
    pub login_retry: u64,
    pub timeout_retry: u64,
    pub keepalive_retry: u64,
    pub max_bootstrap_attempts: u32,
    pub max_keepalive_failures: u32,
    pub port_range: [u16; 2],
}

impl Default for TunablesConfig {
    fn default() -> Self {
        let t = Tunables::default();
        Self {
            keep_alive_interval: t.keep_alive_interval.as_secs(),
            recv_timeout: t.recv_timeout.as_secs(),
            challenge_retry: t.challenge_retry.as_secs(),
            login_retry: t.login_retry.as_secs(),
            timeout_retry: t.timeout_retry.as_secs(),
            keepalive_retry: t.keepalive_retry.as_secs(),
            max_bootstrap_attempts: t.max_bootstrap_attempts,
            max_keepalive_failures: t.max_keepalive_failures,
            port_range: [*t.port_range.start(), *t.port_range.end()],
        }
    }
}

impl TunablesConfig {
    pub fn tunables(&self) -> Result<Tunables> {
        let [start, end] = self.port_range;
        if start > end {
            return Err(Error::config(format!("[tunables] port_range {start}-{end} is empty")));
        }
        if self.recv_timeout == 0 {
            return Err(Error::config("[tunables] recv_timeout must be at least 1 second"));
        }

        Ok(Tunables {
            keep_alive_interval: Duration::from_secs(self.keep_alive_interval),
            recv_timeout: Duration::from_secs(self.recv_timeout),
            challenge_retry: Duration::from_secs(self.challenge_retry),
            login_retry: Duration::from_secs(self.login_retry),
            timeout_retry: Duration::from_secs(self.timeout_retry),
            keepalive_retry: Duration::from_secs(self.keepalive_retry),
            max_bootstrap_attempts: self.max_bootstrap_attempts,
            max_keepalive_failures: self.max_keepalive_failures,
            port_range: start..=end,
        })
    }
}

fn parse_ipv4(field: &str, value: &str) -> Result<Ipv4Addr> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("[drcom] {field} '{value}' is not an IPv4 address")))
}

impl Config {
    /// Parse configuration text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Load the explicit path, or the first existing default path
    pub fn discover(explicit: Option<&Path>) -> Result<(PathBuf, Self)> {
        if let Some(path) = explicit {
            return Ok((path.to_path_buf(), Self::load(path)?));
        }

        for path in default_paths() {
            if path.is_file() {
                debug!(path = %path.display(), "Using configuration file");
                let config = Self::load(&path)?;
                return Ok((path, config));
            }
        }

        Err(Error::config(
            "no configuration file found (try `drcom generate-config > drcom.toml`)",
        ))
    }

    /// Template printed by `drcom generate-config`
    pub fn template() -> Result<String> {
        toml::to_string_pretty(&Self::default()).map_err(|e| Error::config(e.to_string()))
    }

    pub fn bind_ip(&self) -> Result<IpAddr> {
        self.application.bind_ip.trim().parse().map_err(|_| {
            Error::config(format!(
                "[application] bind_ip '{}' is not an IP address",
                self.application.bind_ip
            ))
        })
    }

    /// Resolve `server:server_port` to the first IPv4 address
    pub fn server_addr(&self) -> Result<SocketAddr> {
        let server = self.drcom.server.trim();
        if server.is_empty() {
            return Err(Error::config("[drcom] server is empty"));
        }

        (server, self.drcom.server_port)
            .to_socket_addrs()
            .map_err(|e| Error::config(format!("[drcom] cannot resolve server '{server}': {e}")))?
            .find(SocketAddr::is_ipv4)
            .ok_or_else(|| Error::config(format!("[drcom] server '{server}' has no IPv4 address")))
    }

    pub fn tunables(&self) -> Result<Tunables> {
        self.tunables.tunables()
    }

    /// Validate everything into a fresh session
    ///
    /// MAC and host IP fall back to `net` when not configured.
    pub fn session(&self, net: &dyn NetworkInfo) -> Result<Session> {
        let d = &self.drcom;
        if d.username.is_empty() {
            return Err(Error::config("[drcom] username is empty"));
        }
        if d.username.len() > ACCOUNT_LEN {
            return Err(Error::config(format!(
                "[drcom] username longer than {ACCOUNT_LEN} bytes does not fit the account field"
            )));
        }

        let profile = self.core.profile()?;
        if profile.ror_version && d.password.len() > ROR_MAX_PASSWORD_LEN {
            return Err(Error::config(format!(
                "[drcom] password longer than {ROR_MAX_PASSWORD_LEN} bytes is not supported with ROR_VERSION"
            )));
        }

        let mac = match &d.mac {
            Some(setting) => setting.to_mac()?,
            None => net.local_mac()?,
        };
        let host_ip = match &d.host_ip {
            Some(ip) => parse_ipv4("host_ip", ip)?,
            None => net.local_ipv4()?,
        };

        Ok(Session::new(
            self.server_addr()?,
            d.username.clone(),
            d.password.clone(),
            mac,
            host_ip,
            parse_ipv4("dns", &d.dns)?,
            parse_ipv4("dhcp", &d.dhcp)?,
            d.host_name.clone(),
            d.host_os.clone(),
            profile,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedNetwork;

    impl NetworkInfo for FixedNetwork {
        fn local_ipv4(&self) -> Result<Ipv4Addr> {
            Ok(Ipv4Addr::new(172, 16, 0, 9))
        }

        fn local_mac(&self) -> Result<MacAddr> {
            Ok(MacAddr::from_u64(0xAABB_CCDD_EEFF))
        }
    }

    const SAMPLE: &str = r#"
[application]
log_level = "debug"
bind_ip = "0.0.0.0"

[drcom]
server = "10.100.61.3"
username = "student"
password = "secret"
mac = 0x001122334455
host_ip = "10.30.22.17"
host_name = "laptop"
host_os = "Linux"
dhcp = "10.30.22.1"
dns = "10.10.10.10"

[core]
CONTROL_CHECK_STATUS = [32]
ADAPTER_NUM = [5]
IP_DOG = [1]
AUTH_VERSION = [10, 0]
KEEP_ALIVE_VERSION = [220, 2]
ROR_VERSION = false

[tunables]
keep_alive_interval = 15
"#;

    #[test]
    fn test_parse_sample() {
        let config = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.drcom.server_port, 61440, "default port");
        assert_eq!(config.drcom.mac, Some(MacSetting::Int(0x0011_2233_4455)));
        assert_eq!(config.tunables.keep_alive_interval, 15);
        assert_eq!(config.tunables.login_retry, 30, "unset tunables keep defaults");
    }

    #[test]
    fn test_session_from_sample() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let session = config.session(&FixedNetwork).unwrap();

        assert_eq!(session.server_addr, "10.100.61.3:61440".parse().unwrap());
        assert_eq!(session.mac, MacAddr::from_u64(0x0011_2233_4455));
        assert_eq!(session.host_ip, Ipv4Addr::new(10, 30, 22, 17));
        assert_eq!(session.profile.adapter_num, 5);
        assert_eq!(session.profile.keep_alive_version, [0xdc, 0x02]);
    }

    #[test]
    fn test_session_discovers_missing_addresses() {
        let mut config = Config::from_toml(SAMPLE).unwrap();
        config.drcom.mac = None;
        config.drcom.host_ip = None;

        let session = config.session(&FixedNetwork).unwrap();
        assert_eq!(session.mac, MacAddr::from_u64(0xAABB_CCDD_EEFF));
        assert_eq!(session.host_ip, Ipv4Addr::new(172, 16, 0, 9));
    }

    #[test]
    fn test_mac_as_text() {
        let text = SAMPLE.replace("mac = 0x001122334455", "mac = \"00:11:22:33:44:55\"");
        let config = Config::from_toml(&text).unwrap();
        assert_eq!(
            config.drcom.mac,
            Some(MacSetting::Text("00:11:22:33:44:55".to_string()))
        );
        let session = config.session(&FixedNetwork).unwrap();
        assert_eq!(session.mac, MacAddr::from_u64(0x0011_2233_4455));
    }

    #[test]
    fn test_rejects_wrong_byte_lengths() {
        let text = SAMPLE.replace("AUTH_VERSION = [10, 0]", "AUTH_VERSION = [10]");
        let config = Config::from_toml(&text).unwrap();
        match config.session(&FixedNetwork) {
            Err(Error::Config(msg)) => assert!(msg.contains("AUTH_VERSION"), "{msg}"),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_ip_and_empty_username() {
        let mut config = Config::from_toml(SAMPLE).unwrap();
        config.drcom.dns = "10.10.10".to_string();
        assert!(matches!(config.session(&FixedNetwork), Err(Error::Config(_))));

        let mut config = Config::from_toml(SAMPLE).unwrap();
        config.drcom.username.clear();
        assert!(matches!(config.session(&FixedNetwork), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_long_username() {
        let mut config = Config::from_toml(SAMPLE).unwrap();
        config.drcom.username = "u".repeat(36);
        assert!(config.session(&FixedNetwork).is_ok());

        config.drcom.username = "u".repeat(37);
        match config.session(&FixedNetwork) {
            Err(Error::Config(msg)) => assert!(msg.contains("username"), "{msg}"),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_long_password_with_ror() {
        let mut config = Config::from_toml(SAMPLE).unwrap();
        config.core.ror_version = true;
        config.drcom.password = "p".repeat(17);
        assert!(matches!(config.session(&FixedNetwork), Err(Error::Config(_))));
    }

    #[test]
    fn test_tunables_conversion() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let tunables = config.tunables().unwrap();
        assert_eq!(tunables.keep_alive_interval, Duration::from_secs(15));
        assert_eq!(tunables.port_range, 60000..=65535);

        let mut bad = config.clone();
        bad.tunables.port_range = [65000, 60000];
        assert!(bad.tunables().is_err());
    }

    #[test]
    fn test_template_parses_back() {
        let text = Config::template().unwrap();
        assert!(text.contains("[core]"));
        assert!(text.contains("CONTROL_CHECK_STATUS"));
        assert_eq!(Config::from_toml(&text).unwrap(), Config::default());
    }

    #[test]
    fn test_analysis_toml_merges_into_config() {
        let analysis = CaptureAnalysis {
            server: Ipv4Addr::new(192, 168, 1, 1),
            control_check_status: 0x20,
            adapter_num: 0x03,
            ip_dog: 0x01,
            auth_version: [0x0a, 0x00],
            keep_alive_version: Some([0xdc, 0x02]),
            ror_version: true,
        };

        let text = analysis_toml(&analysis).unwrap();
        assert!(text.contains("ADAPTER_NUM"), "{text}");

        let config = Config::from_toml(&text).unwrap();
        assert_eq!(config.drcom.server, "192.168.1.1");
        assert_eq!(config.core.profile().unwrap(), analysis.profile());
    }

    #[test]
    fn test_discover_explicit_missing_file() {
        let missing = Path::new("/nonexistent/drcom.toml");
        assert!(matches!(Config::discover(Some(missing)), Err(Error::Io(_))));
    }
}
