//! Protocol constants

/// Magic value at the start of every payload
pub const MAGIC: [u8; 4] = *b"SP02";

/// Wire format version (exact match required, no negotiation)
pub const VERSION: u8 = 2;

/// Fixed header size in bytes:
/// magic(4) + version(1) + flags(1) + reserved(2)
/// + frame_id(8) + send_timestamp_ns(8) + meta_len(4) + image_count(4)
pub const HEADER_SIZE: usize = 32;

/// Per-image entry prefix: role(1) + image_len(4)
pub const IMAGE_PREFIX_SIZE: usize = 5;
