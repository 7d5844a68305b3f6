//! Single-item latest-value slot
//!
//! Last-write-wins container used on both ends of a stream: the server
//! holds "next payload to send", the client holds "most recently decoded
//! frame". Memory stays O(1) no matter how mismatched producer and
//! consumer speeds are.
//!
//! All operations are whole-value. A reader can never observe a value
//! assembled from two different writes.

use std::sync::Mutex;

/// Single-item, overwrite-on-write container
///
/// Share across tasks as `Arc<LatestSlot<T>>`.
#[derive(Debug, Default)]
pub struct LatestSlot<T> {
    inner: Mutex<Option<T>>,
}

impl<T> LatestSlot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Replace any existing content with `value`
    ///
    /// Returns the displaced value, if there was one.
    pub fn set(&self, value: T) -> Option<T> {
        self.inner.lock().unwrap().replace(value)
    }

    /// Atomically return and clear the content
    pub fn take(&self) -> Option<T> {
        self.inner.lock().unwrap().take()
    }

    /// Whether the slot currently holds a value
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_none()
    }
}

impl<T: Clone> LatestSlot<T> {
    /// Atomically snapshot the content without clearing it
    pub fn peek(&self) -> Option<T> {
        self.inner.lock().unwrap().clone()
    }
}
