//! Wire framing protocol
//!
//! Pure encode/decode between an in-memory [`Frame`] and its bit-exact
//! binary wire representation. No I/O, no state.

pub mod codec;
pub mod constants;
pub mod frame;

pub use codec::{decode, encode};
pub use frame::{Frame, ImageRole};
