// src/core/protocol/codec.rs

//! `tokio_util::codec` implementations for both directions of the wire protocol.

use super::frame::{ClientFrame, Inbound, encode_payload, parse_client_frame, parse_payload};
use crate::core::RelayError;
use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// The server side codec: decodes client frames and encodes server payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct RelayCodec;

impl Decoder for RelayCodec {
    type Item = Inbound;
    type Error = RelayError;

    /// A frame with an unparseable length field cannot be skipped precisely, so
    /// everything buffered is dropped and reported as a single malformed item.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        match parse_client_frame(src) {
            Ok((frame, len)) => {
                src.advance(len);
                Ok(Some(Inbound::Frame(frame)))
            }
            Err(RelayError::IncompleteData) => Ok(None),
            Err(RelayError::MalformedFrame(reason)) => {
                src.clear();
                Ok(Some(Inbound::Malformed(reason)))
            }
            Err(e) => Err(e),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None if src.is_empty() => Ok(None),
            None => {
                let buffered = src.len();
                src.clear();
                Ok(Some(Inbound::Malformed(format!(
                    "stream ended inside a frame ({buffered} bytes buffered)"
                ))))
            }
        }
    }
}

impl Encoder<String> for RelayCodec {
    type Error = RelayError;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_payload(&item, dst)
    }
}

/// The client side codec: encodes client frames and decodes server payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientCodec;

impl Encoder<ClientFrame> for ClientCodec {
    type Error = RelayError;

    fn encode(&mut self, item: ClientFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.encode_into(dst)
    }
}

impl Decoder for ClientCodec {
    type Item = String;
    type Error = RelayError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        match parse_payload(src) {
            Ok((payload, len)) => {
                src.advance(len);
                Ok(Some(payload))
            }
            Err(RelayError::IncompleteData) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
