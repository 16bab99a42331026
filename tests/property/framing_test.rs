// tests/property/framing_test.rs

//! Property-based tests for the wire framing.
//! Any valid frame survives encoding and decoding, however the bytes are split.

use bytes::BytesMut;
use proptest::prelude::*;
use relaychat::core::CommandCode;
use relaychat::core::protocol::{ClientFrame, Inbound, RelayCodec};
use tokio_util::codec::Decoder;

fn code_strategy() -> impl Strategy<Value = CommandCode> {
    prop_oneof![
        Just(CommandCode::Chat),
        Just(CommandCode::Promote),
        Just(CommandCode::Kick),
        Just(CommandCode::Mute),
        Just(CommandCode::PrivateMessage),
        Just(CommandCode::Quit),
        Just(CommandCode::Unknown(b'0')),
        Just(CommandCode::Unknown(b'Z')),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_frames_decode_from_any_split(
        frames in prop::collection::vec(
            ("[a-z0-9_]{0,99}", code_strategy(), "[ -~]{0,999}"),
            1..5,
        ),
        chunk in 1usize..64,
    ) {
        let frames: Vec<ClientFrame> = frames
            .into_iter()
            .map(|(u, c, m)| ClientFrame::new(u, c, m))
            .collect();
        let mut wire = Vec::new();
        for frame in &frames {
            wire.extend(frame.encode_to_vec().unwrap());
        }

        let mut codec = RelayCodec;
        let mut buf = BytesMut::new();
        let mut decoded = Vec::new();
        for piece in wire.chunks(chunk) {
            buf.extend_from_slice(piece);
            while let Some(item) = codec.decode(&mut buf).unwrap() {
                decoded.push(item);
            }
        }

        let expected: Vec<Inbound> = frames.into_iter().map(Inbound::Frame).collect();
        prop_assert_eq!(decoded, expected);
        prop_assert!(buf.is_empty());
    }

    #[test]
    fn test_unicode_lengths_are_byte_counts(
        username in "\\PC{0,30}",
        content in "\\PC{0,300}",
    ) {
        let frame = ClientFrame::new(username.clone(), CommandCode::Chat, content.clone());
        let encoded = frame.encode_to_vec();
        if username.len() > 99 || content.len() > 999 {
            prop_assert!(encoded.is_err());
        } else {
            let bytes = encoded.unwrap();
            prop_assert_eq!(bytes.len(), 2 + username.len() + 1 + 3 + content.len());
            let mut buf = BytesMut::from(&bytes[..]);
            let item = RelayCodec.decode(&mut buf).unwrap();
            prop_assert_eq!(item, Some(Inbound::Frame(frame)));
        }
    }

    #[test]
    fn test_oversized_fields_are_rejected(
        extra_user in 1usize..50,
        extra_content in 1usize..500,
    ) {
        let long_user = ClientFrame::new("u".repeat(99 + extra_user), CommandCode::Chat, "x");
        prop_assert!(long_user.encode_to_vec().is_err());
        let long_content = ClientFrame::new("u", CommandCode::Chat, "c".repeat(999 + extra_content));
        prop_assert!(long_content.encode_to_vec().is_err());
    }
}
