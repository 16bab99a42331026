// src/core/protocol/mod.rs

pub mod codec;
pub mod frame;
pub use codec::{ClientCodec, RelayCodec};
pub use frame::{
    ClientFrame, Inbound, KICKED_SENTINEL, MAX_CONTENT_LEN, MAX_PAYLOAD_LEN, MAX_USERNAME_LEN,
};
