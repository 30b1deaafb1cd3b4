//! Tests for the Drcom packet codec
//!
//! Offsets are pinned against the fixed-layout tables in [`crate::login`] and
//! [`crate::keepalive`]. Digest values were computed independently for the
//! session returned by `session()`.

#[cfg(test)]
mod packet_tests {
    use std::net::Ipv4Addr;

    use drcom_core::{AuthInfo, Error, GatewayProfile, MacAddr, Salt, Session, Tail};

    use crate::challenge::*;
    use crate::keepalive::*;
    use crate::login::*;
    use crate::reply::Reply;

    const SALT: Salt = Salt([0xAA, 0xBB, 0xCC, 0xDD]);

    fn session() -> Session {
        Session::new(
            "10.0.0.1:61440".parse().unwrap(),
            "student",
            "secret",
            MacAddr::from_u64(0x0011_2233_4455),
            Ipv4Addr::new(10, 0, 0, 2),
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 1),
            "host",
            "linux",
            GatewayProfile::default(),
        )
    }

    fn with_username(name: &str) -> Session {
        let mut s = session();
        s.username = name.to_string();
        s
    }

    #[test]
    fn test_challenge_layout() {
        let packet = ChallengePacket::new(0x1234).build();
        assert_eq!(packet.len(), CHALLENGE_LEN);
        assert_eq!(&packet[..5], &[0x01, 0x02, 0x34, 0x12, 0x09]);
        assert!(packet[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_challenge_nonce_from_clock() {
        assert_eq!(ChallengePacket::from_clock(0xffff, 0x0f).nonce, 0x0f);
        assert_eq!(ChallengePacket::from_clock(100, 0x10).nonce, 116);
    }

    #[test]
    fn test_challenge_reply_salt() {
        let mut reply = vec![0x02, 0x00, 0x00, 0x00, 0xAA, 0xBB, 0xCC, 0xDD];
        reply.extend_from_slice(&[0u8; 8]);
        assert_eq!(parse_challenge_reply(&reply).unwrap(), SALT);
    }

    #[test]
    fn test_challenge_reply_rejected() {
        let err = parse_challenge_reply(&[0x05, 0, 0, 0, 1, 2, 3, 4]).unwrap_err();
        assert!(matches!(err, Error::ChallengeRejected { code: 0x05 }));

        // Truncated reply is rejected rather than panicking
        let err = parse_challenge_reply(&[0x02, 0x00]).unwrap_err();
        assert!(matches!(err, Error::ChallengeRejected { code: 0x02 }));
    }

    #[test]
    fn test_login_offsets() {
        let packet = LoginPacket::new(&session(), SALT).build().unwrap();

        assert_eq!(packet.len(), LOGIN_LEN);
        assert_eq!(&packet[..4], &[0x03, 0x01, 0x00, 27]);
        assert_eq!(hex::encode(&packet[4..20]), "b1e25fbe79ec521af7eb031e30b6c44e");
        assert_eq!(&packet[20..27], b"student");
        assert!(packet[27..56].iter().all(|&b| b == 0));
        assert_eq!(packet[56], 0x20, "control check status");
        assert_eq!(packet[57], 0x01, "adapter number");
        assert_eq!(hex::encode(&packet[58..64]), "b1f37d8d3db9");
        assert_eq!(packet[80], 0x01, "host IP count");
        assert_eq!(&packet[81..85], &[10, 0, 0, 2]);
        assert_eq!(hex::encode(&packet[97..105]), "aa8cd9c4416f283f");
        assert_eq!(packet[105], 0x01, "ip dog");
        assert_eq!(&packet[110..114], b"host");
        assert_eq!(&packet[142..146], &[10, 0, 0, 1]);
        assert_eq!(&packet[146..150], &[10, 0, 0, 1]);
        assert_eq!(packet[162], 0x94);
        assert_eq!(&packet[182..187], b"linux");
        assert!(packet[214..310].iter().all(|&b| b == 0));
        assert_eq!(&packet[310..312], &[0x0a, 0x00]);
        assert_eq!(&packet[312..314], &[0x02, 0x0c]);
        assert_eq!(hex::encode(&packet[314..318]), "d00191b9");
        assert_eq!(&packet[318..320], &[0x00, 0x00]);
        assert_eq!(&packet[320..326], &[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(&packet[326..330], &[0x00, 0x00, 0xe9, 0x13]);
    }

    #[test]
    fn test_login_is_deterministic_for_same_salt() {
        let s = session();
        let a = LoginPacket::new(&s, SALT).build().unwrap();
        let b = LoginPacket::new(&s, SALT).build().unwrap();
        assert_eq!(a, b);

        let c = LoginPacket::new(&s, Salt([1, 2, 3, 4])).build().unwrap();
        assert_ne!(a, c, "a new salt must change the packet");
    }

    #[test]
    fn test_login_length_independent_of_username() {
        for len in [1usize, 8, 36] {
            let name = "u".repeat(len);
            let packet = LoginPacket::new(&with_username(&name), SALT).build().unwrap();
            assert_eq!(packet.len(), LOGIN_LEN, "username length {len}");
            assert_eq!(packet[3], (len + 20) as u8, "header length byte for {len}");
            assert_eq!(&packet[310..312], &[0x0a, 0x00], "auth version offset for {len}");
            assert_eq!(&packet[326..330], &[0x00, 0x00, 0xe9, 0x13]);
        }
    }

    #[test]
    fn test_login_truncates_long_username() {
        let name = "x".repeat(40);
        let packet = LoginPacket::new(&with_username(&name), SALT).build().unwrap();
        assert_eq!(packet.len(), LOGIN_LEN);
        assert_eq!(packet[3], 60);
        assert_eq!(&packet[20..56], "x".repeat(36).as_bytes());
    }

    #[test]
    fn test_login_length_byte_saturates() {
        let name = "y".repeat(300);
        let packet = LoginPacket::new(&with_username(&name), SALT).build().unwrap();
        assert_eq!(packet.len(), LOGIN_LEN);
        assert_eq!(packet[3], 0xff);
    }

    #[test]
    fn test_login_ror_block() {
        let mut s = session();
        s.profile.ror_version = true;
        let packet = LoginPacket::new(&s, SALT).build().unwrap();

        assert_eq!(packet.len(), LoginPacket::expected_len(&s.profile, &s.password));
        assert_eq!(packet.len(), 338);
        assert_eq!(packet[312], 0x00);
        assert_eq!(packet[313], 6, "password length");
        assert_eq!(hex::encode(&packet[314..320]), "163ce166e0c4");
        assert_eq!(&packet[320..322], &[0x02, 0x0c]);
        assert_eq!(hex::encode(&packet[322..326]), "20dc11ad");
    }

    #[test]
    fn test_login_ror_rejects_long_password() {
        let mut s = session();
        s.profile.ror_version = true;
        s.password = "p".repeat(17);
        assert!(matches!(
            LoginPacket::new(&s, SALT).build(),
            Err(Error::PacketConstruction(_))
        ));
    }

    #[test]
    fn test_small_mac_fills_fixed_fields() {
        let mut s = session();
        s.mac = MacAddr::from_u64(0x1);
        let packet = LoginPacket::new(&s, SALT).build().unwrap();
        assert_eq!(packet.len(), LOGIN_LEN);
        assert_eq!(&packet[320..326], &[0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_logout_layout() {
        let mut s = session();
        s.auth_info = Some(AuthInfo([0x42; 16]));
        let packet = LogoutPacket::new(&s, SALT).build();

        assert_eq!(packet.len(), LOGOUT_LEN);
        assert_eq!(&packet[..4], &[0x06, 0x01, 0x00, 27]);
        assert_eq!(hex::encode(&packet[4..20]), "b1e25fbe79ec521af7eb031e30b6c44e");
        assert_eq!(hex::encode(&packet[58..64]), "b1f37d8d3db9");
        assert_eq!(&packet[64..80], &[0x42; 16]);
    }

    #[test]
    fn test_logout_without_auth_info() {
        let packet = LogoutPacket::new(&session(), SALT).build();
        assert_eq!(packet.len(), LOGOUT_LEN);
        assert_eq!(&packet[64..80], &[0u8; 16]);
    }

    #[test]
    fn test_login_reply_auth_info() {
        let mut reply = vec![0x04];
        reply.extend_from_slice(&[0u8; 22]);
        reply.extend((0..16u8).map(|i| 0xA0 + i));
        reply.extend_from_slice(&[0u8; 8]);

        let auth = parse_login_reply(&reply).unwrap();
        assert_eq!(auth.as_bytes(), &reply[23..39]);
    }

    #[test]
    fn test_login_reply_rejected() {
        let err = parse_login_reply(&[0x05; 64]).unwrap_err();
        assert!(matches!(err, Error::LoginRejected { code: 0x05 }));
        assert!(parse_login_reply(&[0x04; 20]).is_err());
        assert!(parse_login_reply(&[]).is_err());
    }

    #[test]
    fn test_logout_acknowledged() {
        assert!(logout_acknowledged(&[0x04, 0x00]));
        assert!(!logout_acknowledged(&[0x05]));
        assert!(!logout_acknowledged(&[]));
    }

    #[test]
    fn test_keepalive1_layout() {
        let auth = AuthInfo([0x11; 16]);
        let packet = KeepAlive1Packet::new(SALT, "secret", auth, 0x1_2345).build();

        assert_eq!(packet.len(), KEEPALIVE1_LEN);
        assert_eq!(packet[0], 0xff);
        assert_eq!(hex::encode(&packet[1..17]), "b1e25fbe79ec521af7eb031e30b6c44e");
        assert_eq!(&packet[17..20], &[0, 0, 0]);
        assert_eq!(&packet[20..36], &[0x11; 16]);
        assert_eq!(&packet[36..38], &[0x23, 0x45], "time mod 65536, big endian");
        assert_eq!(&packet[38..42], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_keepalive2_first_type1() {
        let packet = KeepAlive2Packet::new(
            0,
            KeepAliveType::Type1,
            [0xdc, 0x02],
            Tail::ZERO,
            Ipv4Addr::new(10, 0, 0, 2),
        )
        .first()
        .build();

        assert_eq!(packet.len(), KEEPALIVE2_LEN);
        assert_eq!(&packet[..6], &[0x07, 0x00, 0x28, 0x00, 0x0b, 0x01]);
        assert_eq!(&packet[6..8], &[0x0f, 0x27]);
        assert_eq!(&packet[8..10], &[0x2f, 0x12]);
        assert!(packet[10..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_keepalive2_type3_carries_tail_and_ip() {
        let packet = KeepAlive2Packet::new(
            5,
            KeepAliveType::Type3,
            [0xdc, 0x02],
            Tail([1, 2, 3, 4]),
            Ipv4Addr::new(10, 0, 0, 2),
        )
        .build();

        assert_eq!(packet.len(), KEEPALIVE2_LEN);
        assert_eq!(&packet[..6], &[0x07, 0x05, 0x28, 0x00, 0x0b, 0x03]);
        assert_eq!(&packet[6..8], &[0xdc, 0x02]);
        assert_eq!(&packet[16..20], &[1, 2, 3, 4]);
        assert_eq!(&packet[20..24], &[0; 4]);
        assert_eq!(&packet[24..28], &[0; 4], "checksum slot");
        assert_eq!(&packet[28..32], &[10, 0, 0, 2]);
        assert_eq!(&packet[32..40], &[0; 8]);
    }

    #[test]
    fn test_reply_tail_defaults_to_zero() {
        let short = [0x07, 0x01, 0x28, 0x00];
        assert_eq!(Reply::new(&short).tail(), Tail::ZERO);

        let mut full = vec![0x07; 16];
        full.extend_from_slice(&[9, 8, 7, 6]);
        assert_eq!(Reply::new(&full).tail(), Tail([9, 8, 7, 6]));
    }

    #[test]
    fn test_reply_first_keepalive_acceptance() {
        assert!(Reply::new(&[0x07, 0x00, 0x28, 0x00]).accepts_first_keepalive(3));
        assert!(Reply::new(&[0x07, 0x03, 0x28, 0x00]).accepts_first_keepalive(3));
        assert!(Reply::new(&[0x07, 0x00, 0x10, 0x00]).accepts_first_keepalive(3));
        assert!(Reply::new(&[0x07, 0x00, 0x10, 0x00]).is_file_push());
        assert!(!Reply::new(&[0x07, 0x04, 0x28, 0x00]).accepts_first_keepalive(3));
        assert!(!Reply::new(&[0x4d, 0x00, 0x28, 0x00]).accepts_first_keepalive(0));
    }

    #[test]
    fn test_reply_expect_keepalive() {
        assert!(Reply::new(&[0x07]).expect_keepalive("phase-1").is_ok());
        let err = Reply::new(&[0x4d]).expect_keepalive("phase-1").unwrap_err();
        assert!(matches!(
            err,
            Error::KeepAliveRejected {
                phase: "phase-1",
                code: 0x4d
            }
        ));
    }
}
