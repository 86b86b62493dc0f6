//! Framing and payload helpers shared by the client and the workers.
//!
//! Every request and every reply travels as a single length-delimited frame.
//! A zero-length frame is an empty reply: workers send it to acknowledge a
//! shutdown or to reject a request without changing anything.

use serde::Serialize;
use tokio_util::codec::LengthDelimitedCodec;

use crate::{domain::Spell, error::ProtocolError};

pub const MAX_FRAME_LENGTH: usize = 8 * 1024 * 1024;
pub const DICE_REPLY_WIDTH: usize = std::mem::size_of::<i64>();

pub fn frame_codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .big_endian()
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec()
}

pub fn encode_payload<T: Serialize>(payload: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(payload)?)
}

pub fn encode_collection(spells: &[Spell]) -> Result<Vec<u8>, ProtocolError> {
    encode_payload(&spells)
}

/// `Ok(None)` for an empty reply.
pub fn decode_collection(bytes: &[u8]) -> Result<Option<Vec<Spell>>, ProtocolError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(bytes)?))
}

pub fn encode_roll_result(value: i64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

pub fn decode_roll_result(bytes: &[u8]) -> Result<i64, ProtocolError> {
    let raw: [u8; DICE_REPLY_WIDTH] = bytes.try_into().map_err(|_| ProtocolError::ScalarWidth {
        expected: DICE_REPLY_WIDTH,
        actual: bytes.len(),
    })?;
    Ok(i64::from_be_bytes(raw))
}

#[cfg(test)]
#[path = "tests/codec_tests.rs"]
mod tests;
