//! Frame encoder and decoder
//!
//! Binary layout (all integers big-endian):
//!
//! ```text
//!  0  : 4 bytes  magic = b"SP02"
//!  4  : 1 byte   version = 2
//!  5  : 1 byte   flags (reserved, 0)
//!  6  : 2 bytes  reserved (0)
//!  8  : 8 bytes  frame_id (u64)
//! 16  : 8 bytes  send_timestamp_ns (u64)
//! 24  : 4 bytes  meta_len (u32)             UTF-8 JSON bytes
//! 28  : 4 bytes  image_count (u32)
//! 32  : meta bytes
//! ...  : { role (u8) | image_len (u32) | image bytes } x image_count
//! ```
//!
//! Image entries are emitted in ascending numeric role order, so encoding
//! the same logical frame always yields identical bytes.
//!
//! Decoding is pure and allocates only the output [`Frame`]; image blobs are
//! zero-copy slices of the input payload. The meta object is parsed
//! structurally but not validated against any schema; that is the
//! [`StreamState`](crate::state::StreamState) layer, applied by the caller.

use std::collections::BTreeMap;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde_json::Value;

use crate::error::{ProtocolError, Result};
use crate::protocol::constants::{HEADER_SIZE, IMAGE_PREFIX_SIZE, MAGIC, VERSION};
use crate::protocol::frame::{Frame, ImageRole};

/// Encode a frame into its wire representation
///
/// Fails with a serialization error only if the meta object contains a
/// value JSON cannot represent; this never happens for meta built through
/// the validated `StreamState` path.
pub fn encode(frame: &Frame) -> Result<Bytes> {
    let meta_bytes = serde_json::to_vec(&frame.meta)?;

    let images_len: usize = frame
        .images
        .values()
        .map(|img| IMAGE_PREFIX_SIZE + img.len())
        .sum();
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + meta_bytes.len() + images_len);

    buf.put_slice(&MAGIC);
    buf.put_u8(VERSION);
    buf.put_u8(0); // flags
    buf.put_u16(0); // reserved
    buf.put_u64(frame.frame_id);
    buf.put_u64(frame.send_timestamp_ns);
    buf.put_u32(meta_bytes.len() as u32);
    buf.put_u32(frame.images.len() as u32);
    buf.put_slice(&meta_bytes);

    // BTreeMap iterates in ascending role order
    for (role, img) in &frame.images {
        buf.put_u8(role.wire());
        buf.put_u32(img.len() as u32);
        buf.put_slice(img);
    }

    Ok(buf.freeze())
}

/// Decode a wire payload into a frame
///
/// Checks are applied in a fixed total order: header length, magic,
/// version, meta length, meta JSON, per-image prefix/role/body, trailing
/// bytes. See [`ProtocolError`] for the failure taxonomy.
pub fn decode(payload: Bytes) -> Result<Frame> {
    let total = payload.len();
    let mut buf = payload;

    if buf.remaining() < HEADER_SIZE {
        return Err(ProtocolError::Truncated {
            needed: HEADER_SIZE,
            remaining: buf.remaining(),
        }
        .into());
    }

    let mut magic = [0u8; 4];
    buf.copy_to_slice(&mut magic);
    if magic != MAGIC {
        return Err(ProtocolError::BadMagic(magic).into());
    }

    let version = buf.get_u8();
    if version != VERSION {
        return Err(ProtocolError::UnsupportedVersion(version).into());
    }

    let _flags = buf.get_u8();
    let _reserved = buf.get_u16();
    let frame_id = buf.get_u64();
    let send_timestamp_ns = buf.get_u64();
    let meta_len = buf.get_u32() as usize;
    let image_count = buf.get_u32() as usize;

    if buf.remaining() < meta_len {
        return Err(ProtocolError::Truncated {
            needed: meta_len,
            remaining: buf.remaining(),
        }
        .into());
    }
    let meta_bytes = buf.copy_to_bytes(meta_len);
    let meta = match serde_json::from_slice::<Value>(&meta_bytes) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(ProtocolError::MetaParse(format!(
                "expected JSON object, got {}",
                json_type_name(&other)
            ))
            .into());
        }
        Err(e) => return Err(ProtocolError::MetaParse(e.to_string()).into()),
    };

    let mut images = BTreeMap::new();
    for _ in 0..image_count {
        if buf.remaining() < IMAGE_PREFIX_SIZE {
            return Err(ProtocolError::Truncated {
                needed: IMAGE_PREFIX_SIZE,
                remaining: buf.remaining(),
            }
            .into());
        }
        let role_byte = buf.get_u8();
        let role = ImageRole::from_wire(role_byte)
            .ok_or(ProtocolError::UnknownImageRole(role_byte))?;
        let image_len = buf.get_u32() as usize;
        if buf.remaining() < image_len {
            return Err(ProtocolError::Truncated {
                needed: image_len,
                remaining: buf.remaining(),
            }
            .into());
        }
        // copy_to_bytes on Bytes is a zero-copy slice
        images.insert(role, buf.copy_to_bytes(image_len));
    }

    if buf.has_remaining() {
        return Err(ProtocolError::LengthMismatch {
            expected: total - buf.remaining(),
            actual: total,
        }
        .into());
    }

    Ok(Frame {
        frame_id,
        send_timestamp_ns,
        meta,
        images,
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;
    use crate::error::Error;

    fn meta_with(key: &str, value: Value) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(key.to_string(), value);
        map
    }

    fn four_image_frame() -> Frame {
        Frame::new(42, 123, meta_with("note", json!("quad")))
            .with_image(ImageRole::Left, Bytes::from_static(b"\xff\xd8LEFT\xff\xd9"))
            .with_image(ImageRole::Center, Bytes::from_static(b"\xff\xd8CENTER\xff\xd9"))
            .with_image(ImageRole::Right, Bytes::from_static(b"\xff\xd8RIGHT\xff\xd9"))
            .with_image(ImageRole::Back, Bytes::from_static(b"\xff\xd8BACK\xff\xd9"))
    }

    fn protocol_err(err: Error) -> ProtocolError {
        match err {
            Error::Protocol(e) => e,
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    #[test]
    fn test_roundtrip_four_images() {
        let frame = four_image_frame();
        let payload = encode(&frame).unwrap();
        let decoded = decode(payload).unwrap();

        assert_eq!(decoded.frame_id, 42);
        assert_eq!(decoded.send_timestamp_ns, 123);
        assert_eq!(decoded.meta, frame.meta);
        assert_eq!(decoded.images, frame.images);
    }

    #[test]
    fn test_roundtrip_no_images() {
        let frame = Frame::new(7, 9, meta_with("k", json!([1, 2, 3])));
        let decoded = decode(encode(&frame).unwrap()).unwrap();

        assert_eq!(decoded, frame);
        assert!(decoded.images.is_empty());
    }

    #[test]
    fn test_roundtrip_role_subset() {
        let frame = Frame::new(1, 2, Map::new())
            .with_image(ImageRole::Back, Bytes::from_static(b"back"))
            .with_image(ImageRole::Center, Bytes::from_static(b"center"));
        let decoded = decode(encode(&frame).unwrap()).unwrap();

        assert_eq!(decoded.images.len(), 2);
        assert_eq!(decoded.images[&ImageRole::Center], Bytes::from_static(b"center"));
        assert_eq!(decoded.images[&ImageRole::Back], Bytes::from_static(b"back"));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let frame = four_image_frame();
        assert_eq!(encode(&frame).unwrap(), encode(&frame).unwrap());
    }

    #[test]
    fn test_rejects_short_header() {
        let err = protocol_err(decode(Bytes::from_static(b"SP02")).unwrap_err());
        assert!(matches!(err, ProtocolError::Truncated { .. }));
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut payload = BytesMut::from(&encode(&four_image_frame()).unwrap()[..]);
        payload[0] = b'X';

        let err = protocol_err(decode(payload.freeze()).unwrap_err());
        assert!(matches!(err, ProtocolError::BadMagic(_)));
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut payload = BytesMut::from(&encode(&four_image_frame()).unwrap()[..]);
        payload[4] = 1;

        let err = protocol_err(decode(payload.freeze()).unwrap_err());
        assert_eq!(err, ProtocolError::UnsupportedVersion(1));
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut payload = BytesMut::from(&encode(&four_image_frame()).unwrap()[..]);
        payload.put_u8(0);

        let err = protocol_err(decode(payload.freeze()).unwrap_err());
        assert!(matches!(err, ProtocolError::LengthMismatch { .. }));
    }

    #[test]
    fn test_rejects_unknown_role_byte() {
        let frame = four_image_frame();
        let meta_len = serde_json::to_vec(&frame.meta).unwrap().len();
        let mut payload = BytesMut::from(&encode(&frame).unwrap()[..]);

        // First image entry's role byte sits right after header + meta
        payload[HEADER_SIZE + meta_len] = 255;

        let err = protocol_err(decode(payload.freeze()).unwrap_err());
        assert_eq!(err, ProtocolError::UnknownImageRole(255));
    }

    #[test]
    fn test_rejects_truncated_mid_image() {
        let payload = encode(&four_image_frame()).unwrap();
        let cut = payload.slice(..payload.len() - 3);

        let err = protocol_err(decode(cut).unwrap_err());
        assert!(matches!(err, ProtocolError::Truncated { .. }));
    }

    #[test]
    fn test_rejects_truncated_mid_meta() {
        let frame = Frame::new(1, 1, meta_with("k", json!("a long enough value")));
        let payload = encode(&frame).unwrap();
        let cut = payload.slice(..HEADER_SIZE + 4);

        let err = protocol_err(decode(cut).unwrap_err());
        assert!(matches!(err, ProtocolError::Truncated { .. }));
    }

    #[test]
    fn test_rejects_non_object_meta() {
        // Hand-build a payload whose meta is a bare JSON array
        let mut buf = BytesMut::new();
        buf.put_slice(&MAGIC);
        buf.put_u8(VERSION);
        buf.put_u8(0);
        buf.put_u16(0);
        buf.put_u64(1);
        buf.put_u64(1);
        buf.put_u32(2);
        buf.put_u32(0);
        buf.put_slice(b"[]");

        let err = protocol_err(decode(buf.freeze()).unwrap_err());
        assert!(matches!(err, ProtocolError::MetaParse(_)));
    }

    #[test]
    fn test_rejects_malformed_meta_json() {
        let mut buf = BytesMut::new();
        buf.put_slice(&MAGIC);
        buf.put_u8(VERSION);
        buf.put_u8(0);
        buf.put_u16(0);
        buf.put_u64(1);
        buf.put_u64(1);
        buf.put_u32(3);
        buf.put_u32(0);
        buf.put_slice(b"{\xff}");

        let err = protocol_err(decode(buf.freeze()).unwrap_err());
        assert!(matches!(err, ProtocolError::MetaParse(_)));
    }

    #[test]
    fn test_meta_is_compact_json() {
        let frame = Frame::new(1, 1, meta_with("a", json!({"b": [1, 2]})));
        let payload = encode(&frame).unwrap();
        let meta = &payload[HEADER_SIZE..];

        assert_eq!(meta, &br#"{"a":{"b":[1,2]}}"#[..]);
    }
}
