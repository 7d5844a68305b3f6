//! Frame and image role types
//!
//! A [`Frame`] is one timestamped unit of transmission bundling a metadata
//! blob and zero or more role-tagged images. Images are held in a `BTreeMap`
//! keyed by [`ImageRole`], so iteration order is always ascending role value
//! and encoding the same logical frame yields identical bytes.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde_json::{Map, Value};

/// Which camera/view an embedded image represents
///
/// Closed enumeration: decoding any other wire byte is a hard error
/// ([`crate::error::ProtocolError::UnknownImageRole`]), never a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ImageRole {
    Left = 0,
    Center = 1,
    Right = 2,
    Back = 3,
}

impl ImageRole {
    /// All roles in ascending wire order
    pub const ALL: [ImageRole; 4] = [
        ImageRole::Left,
        ImageRole::Center,
        ImageRole::Right,
        ImageRole::Back,
    ];

    /// Wire byte for this role
    pub fn wire(self) -> u8 {
        self as u8
    }

    /// Parse a wire byte, rejecting anything outside the known set
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ImageRole::Left),
            1 => Some(ImageRole::Center),
            2 => Some(ImageRole::Right),
            3 => Some(ImageRole::Back),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImageRole::Left => "left",
            ImageRole::Center => "center",
            ImageRole::Right => "right",
            ImageRole::Back => "back",
        };
        f.write_str(name)
    }
}

/// One timestamped unit of transmission
///
/// Cheap to clone: image blobs are reference-counted `Bytes`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Monotonically increasing per stream, assigned by the producer.
    /// Not guaranteed gap-free under drop-latest semantics.
    pub frame_id: u64,

    /// Producer-side clock reading (ns) at the moment the frame was
    /// assembled. Used by the consumer only to compute latency.
    pub send_timestamp_ns: u64,

    /// Arbitrary JSON object, carried as opaque compact UTF-8 bytes on the
    /// wire. In this domain it holds a serialized
    /// [`StreamState`](crate::state::StreamState).
    pub meta: Map<String, Value>,

    /// Role-tagged compressed-image blobs
    pub images: BTreeMap<ImageRole, Bytes>,
}

impl Frame {
    /// Create a frame with an empty image set
    pub fn new(frame_id: u64, send_timestamp_ns: u64, meta: Map<String, Value>) -> Self {
        Self {
            frame_id,
            send_timestamp_ns,
            meta,
            images: BTreeMap::new(),
        }
    }

    /// Attach an image blob under a role (builder style)
    pub fn with_image(mut self, role: ImageRole, data: Bytes) -> Self {
        self.images.insert(role, data);
        self
    }
}
