//! Login and logout packets
//!
//! Both packets are fixed-offset structures. Several fields are derived from
//! bytes that were already written, so the builders append strictly in wire
//! order and each derived field names the exact prefix it covers.
//!
//! Login layout (offsets in bytes):
//!
//! | Offset | Len | Field |
//! |-------:|----:|-------|
//! | 0   | 4  | `03 01 00 <len(username)+20>` |
//! | 4   | 16 | `md5(03 01 ‖ salt ‖ password)` |
//! | 20  | 36 | account, NUL padded |
//! | 56  | 1  | control check status |
//! | 57  | 1  | adapter number |
//! | 58  | 6  | `u48(packet[4..10]) XOR mac` |
//! | 64  | 16 | `md5(01 ‖ password ‖ salt ‖ 00 00 00 00)` |
//! | 80  | 1  | host IP count (`01`) |
//! | 81  | 4  | host IP |
//! | 85  | 12 | reserved host IPs |
//! | 97  | 8  | `md5(packet[0..97] ‖ 14 00 07 0b)[..8]` |
//! | 105 | 1  | IP dog flag |
//! | 106 | 4  | reserved |
//! | 110 | 32 | host name |
//! | 142 | 4  | DNS |
//! | 146 | 4  | DHCP server |
//! | 150 | 12 | secondary DNS, WINS x2 |
//! | 162 | 20 | OS version block |
//! | 182 | 32 | host OS |
//! | 214 | 96 | padding |
//! | 310 | 2  | auth version |
//! | 312 | .. | optional ROR block, then the extension block |

use bytes::{BufMut, BytesMut};
use drcom_core::{AuthInfo, Error, GatewayProfile, MacAddr, Result, Salt, Session};
use drcom_packet::{
    fixed_field, gateway_checksum, int_to_fixed_bytes, login_md5, md5_concat, password_md5,
    rotate_xor_password,
};

use crate::constants::*;

/// Length of a login packet without the ROR block
pub const LOGIN_LEN: usize = 330;

/// Length of a logout packet
pub const LOGOUT_LEN: usize = 80;

/// Longest password the ROR block can cover (one digest byte per character)
pub const ROR_MAX_PASSWORD_LEN: usize = 16;

/// Login request built from a session and a freshly issued salt
#[derive(Debug, Clone)]
pub struct LoginPacket<'a> {
    session: &'a Session,
    salt: Salt,
}

impl<'a> LoginPacket<'a> {
    pub fn new(session: &'a Session, salt: Salt) -> Self {
        Self { session, salt }
    }

    /// Expected serialized length for the given profile and password
    pub fn expected_len(profile: &GatewayProfile, password: &str) -> usize {
        if profile.ror_version {
            LOGIN_LEN + 2 + password.len()
        } else {
            LOGIN_LEN
        }
    }

    pub fn build(&self) -> Result<Vec<u8>> {
        let s = self.session;
        let profile = &s.profile;
        let password = s.password.as_bytes();

        if profile.ror_version && password.len() > ROR_MAX_PASSWORD_LEN {
            return Err(Error::PacketConstruction(format!(
                "password longer than {ROR_MAX_PASSWORD_LEN} bytes cannot be ROR encoded"
            )));
        }

        let mut buffer = BytesMut::with_capacity(Self::expected_len(profile, &s.password));
        let digest = login_md5(&self.salt.0, password);

        put_auth_header(
            &mut buffer,
            CODE_LOGIN,
            &s.username,
            &digest,
            profile,
            s.mac,
        );

        buffer.put_slice(&password_md5(&self.salt.0, password));
        buffer.put_u8(0x01);
        buffer.put_slice(&s.host_ip.octets());
        buffer.put_bytes(0x00, 12);

        // Covers bytes 0..97
        let half = md5_concat(&[&buffer[..], &HALF_MD5_SUFFIX]);
        buffer.put_slice(&half[..8]);

        buffer.put_u8(profile.ip_dog);
        buffer.put_bytes(0x00, 4);

        buffer.put_slice(&fixed_field(s.host_name.as_bytes(), HOST_FIELD_LEN));
        buffer.put_slice(&s.dns_ip.octets());
        buffer.put_slice(&s.dhcp_ip.octets());
        buffer.put_bytes(0x00, 12);
        buffer.put_slice(&OS_VERSION_BLOCK);
        buffer.put_slice(&fixed_field(s.host_os.as_bytes(), HOST_FIELD_LEN));
        buffer.put_bytes(0x00, 96);

        buffer.put_slice(&profile.auth_version);

        if profile.ror_version {
            buffer.put_u8(0x00);
            buffer.put_u8(password.len() as u8);
            buffer.put_slice(&rotate_xor_password(&digest, password));
        }

        let mac = s.mac.octets();
        buffer.put_u8(0x02);
        buffer.put_u8(0x0c);

        // Covers everything so far, including the `02 0c` just written
        let mut covered = buffer.to_vec();
        covered.extend_from_slice(&CHECKSUM_SUFFIX);
        covered.extend_from_slice(&mac);
        buffer.put_slice(&gateway_checksum(&covered));

        buffer.put_bytes(0x00, 2);
        buffer.put_slice(&mac);
        buffer.put_u8(0x00); // auto logout
        buffer.put_u8(0x00); // broadcast mode
        buffer.put_slice(&LOGIN_TRAILER);

        Ok(buffer.to_vec())
    }
}

/// Logout request
///
/// Shares the first 64 bytes of the login layout and appends the auth token.
/// A logout sent before any login succeeded carries 16 zero bytes there.
#[derive(Debug, Clone)]
pub struct LogoutPacket<'a> {
    session: &'a Session,
    salt: Salt,
}

impl<'a> LogoutPacket<'a> {
    pub fn new(session: &'a Session, salt: Salt) -> Self {
        Self { session, salt }
    }

    pub fn build(&self) -> Vec<u8> {
        let s = self.session;
        let mut buffer = BytesMut::with_capacity(LOGOUT_LEN);
        let digest = login_md5(&self.salt.0, s.password.as_bytes());

        put_auth_header(
            &mut buffer,
            CODE_LOGOUT,
            &s.username,
            &digest,
            &s.profile,
            s.mac,
        );

        let auth = s.auth_info.unwrap_or(AuthInfo([0u8; 16]));
        buffer.put_slice(auth.as_bytes());

        buffer.to_vec()
    }
}

/// Writes the 64-byte prefix shared by login and logout
///
/// The 6-byte field at offset 58 covers bytes 4..10, the head of `digest`.
fn put_auth_header(
    buffer: &mut BytesMut,
    code: [u8; 2],
    username: &str,
    digest: &[u8; 16],
    profile: &GatewayProfile,
    mac: MacAddr,
) {
    buffer.put_slice(&code);
    buffer.put_u8(0x00);
    // Saturates instead of wrapping; longer names are refused at config time
    buffer.put_u8(u8::try_from(username.len() + 20).unwrap_or(u8::MAX));
    buffer.put_slice(digest);
    buffer.put_slice(&fixed_field(username.as_bytes(), ACCOUNT_LEN));
    buffer.put_u8(profile.control_check_status);
    buffer.put_u8(profile.adapter_num);

    let mut head = [0u8; 8];
    head[2..].copy_from_slice(&digest[..6]);
    let xored = u64::from_be_bytes(head) ^ mac.to_u64();
    buffer.put_slice(&int_to_fixed_bytes::<6>(xored));
}

/// Extract the auth token from a login reply
///
/// Success is a leading `0x04` with the token at bytes 23..39.
pub fn parse_login_reply(data: &[u8]) -> Result<AuthInfo> {
    let code = data.first().copied().unwrap_or(0);
    if code != CODE_LOGIN_SUCCESS || data.len() < 39 {
        return Err(Error::LoginRejected { code });
    }

    let mut auth = [0u8; 16];
    auth.copy_from_slice(&data[23..39]);
    Ok(AuthInfo(auth))
}

/// Whether a logout reply acknowledges the logout
pub fn logout_acknowledged(data: &[u8]) -> bool {
    data.first() == Some(&CODE_LOGIN_SUCCESS)
}
