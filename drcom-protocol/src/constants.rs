//! Discriminant bytes and fixed blocks of the Drcom wire format

/// Challenge request header
pub const CODE_CHALLENGE: [u8; 2] = [0x01, 0x02];

/// Leading byte of a valid challenge reply
pub const CODE_CHALLENGE_REPLY: u8 = 0x02;

/// Login request discriminant
pub const CODE_LOGIN: [u8; 2] = [0x03, 0x01];

/// Leading byte of a successful login (and acknowledged logout) reply
pub const CODE_LOGIN_SUCCESS: u8 = 0x04;

/// Logout request discriminant
pub const CODE_LOGOUT: [u8; 2] = [0x06, 0x01];

/// Leading byte of every keepalive reply, and of phase-2/3 requests
pub const CODE_KEEPALIVE: u8 = 0x07;

/// Leading byte of the keepalive phase-1 request
pub const CODE_KEEPALIVE_AUTH: u8 = 0xff;

/// Version bytes sent in place of `keep_alive_version` on the first type-1 packet
pub const KEEPALIVE_FIRST_VERSION: [u8; 2] = [0x0f, 0x27];

/// Third byte of a keepalive reply carrying a file or notice push
pub const KEEPALIVE_FILE_MARKER: u8 = 0x10;

/// Suffix mixed into the half-MD5 of the login packet
pub const HALF_MD5_SUFFIX: [u8; 4] = [0x14, 0x00, 0x07, 0x0b];

/// `_tagOSVersionInfo` block: size, major, minor, build, platform
pub const OS_VERSION_BLOCK: [u8; 20] = [
    0x94, 0x00, 0x00, 0x00, // size
    0x05, 0x00, 0x00, 0x00, // major
    0x01, 0x00, 0x00, 0x00, // minor
    0x28, 0x0a, 0x00, 0x00, // build
    0x02, 0x00, 0x00, 0x00, // platform
];

/// Extension block prefix mixed into the gateway checksum before the MAC
pub const CHECKSUM_SUFFIX: [u8; 6] = [0x01, 0x26, 0x07, 0x11, 0x00, 0x00];

/// Filler closing the login packet, not validated by the gateway
pub const LOGIN_TRAILER: [u8; 2] = [0xe9, 0x13];

/// Width of the NUL-padded account field
pub const ACCOUNT_LEN: usize = 36;

/// Width of the NUL-padded host name and host OS fields
pub const HOST_FIELD_LEN: usize = 32;
