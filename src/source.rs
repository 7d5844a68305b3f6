//! Frame inputs: preloaded image sets and per-tick state feeds
//!
//! The image bank is loaded once at startup and shared read-only across
//! every connection; load failure is fatal before serving. Video decoding
//! and JPEG compression live outside this crate — the bank serves files
//! that are already compressed at the configured size/quality.

use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;
use rand::Rng;

use crate::error::SourceError;
use crate::protocol::ImageRole;
use crate::state::{StreamState, ACTION_DIM, MAX_CHUNK_ROWS, MIN_CHUNK_ROWS, STATE_LEN};

/// One role-tagged set of image blobs, ready to embed in a frame
pub type ImageSet = BTreeMap<ImageRole, Bytes>;

/// Preloaded, immutable bank of image sets
///
/// Built from consecutive source images: window `i` maps images
/// `i..i+4` onto `Left/Center/Right/Back`. Never mutated after load, so an
/// `Arc<ImageBank>` is safe to read from every connection concurrently.
#[derive(Debug)]
pub struct ImageBank {
    sets: Vec<ImageSet>,
}

impl ImageBank {
    /// Build a bank from raw image blobs, one overlapping window of
    /// [`ImageRole::ALL`] per starting index
    pub fn from_blobs(blobs: Vec<Bytes>) -> Result<Self, SourceError> {
        let need = ImageRole::ALL.len();
        if blobs.len() < need {
            return Err(SourceError::TooFewImages {
                found: blobs.len(),
                need,
            });
        }

        let sets = blobs
            .windows(need)
            .map(|window| {
                ImageRole::ALL
                    .iter()
                    .zip(window)
                    .map(|(role, blob)| (*role, blob.clone()))
                    .collect()
            })
            .collect();

        Ok(Self { sets })
    }

    /// Load every `.jpg`/`.jpeg` file in a directory, in name order
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| SourceError::Open {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("jpg") | Some("jpeg")
                )
            })
            .collect();
        paths.sort();

        let mut blobs = Vec::with_capacity(paths.len());
        for path in paths {
            let data = std::fs::read(&path).map_err(|e| SourceError::Open {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            blobs.push(Bytes::from(data));
        }

        Self::from_blobs(blobs)
    }

    /// Number of image sets in the bank
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether the bank holds no sets (never true for a constructed bank)
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Image set for a tick index, cycling through the bank
    pub fn set(&self, index: u64) -> &ImageSet {
        &self.sets[(index % self.sets.len() as u64) as usize]
    }
}

/// Produces one fresh [`StreamState`] per tick
pub trait StateFeed: Send {
    /// Build the state for a frame assembled at `timestamp_ns`
    fn next(&mut self, timestamp_ns: u64) -> StreamState;
}

/// Stock feed producing uniformly random state vectors and a random number
/// of action chunk rows within the schema bounds
#[derive(Debug, Clone, Default)]
pub struct RandomStateFeed;

impl StateFeed for RandomStateFeed {
    fn next(&mut self, timestamp_ns: u64) -> StreamState {
        let mut rng = rand::thread_rng();
        let state = (0..STATE_LEN).map(|_| rng.gen::<f64>()).collect();
        let rows = rng.gen_range(MIN_CHUNK_ROWS..=MAX_CHUNK_ROWS);
        let chunks = (0..rows)
            .map(|_| (0..ACTION_DIM).map(|_| rng.gen::<f64>()).collect())
            .collect();

        // Shapes above match the schema, so construction cannot fail
        StreamState::new(state, chunks, timestamp_ns)
            .expect("random feed produces schema-valid shapes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs(n: usize) -> Vec<Bytes> {
        (0..n).map(|i| Bytes::from(vec![i as u8; 4])).collect()
    }

    #[test]
    fn test_rejects_too_few_images() {
        let result = ImageBank::from_blobs(blobs(3));
        assert!(matches!(
            result,
            Err(SourceError::TooFewImages { found: 3, need: 4 })
        ));
    }

    #[test]
    fn test_windows_overlap() {
        let bank = ImageBank::from_blobs(blobs(6)).unwrap();
        assert_eq!(bank.len(), 3);

        let first = bank.set(0);
        assert_eq!(first[&ImageRole::Left], Bytes::from(vec![0u8; 4]));
        assert_eq!(first[&ImageRole::Back], Bytes::from(vec![3u8; 4]));

        let second = bank.set(1);
        assert_eq!(second[&ImageRole::Left], Bytes::from(vec![1u8; 4]));
    }

    #[test]
    fn test_set_index_cycles() {
        let bank = ImageBank::from_blobs(blobs(5)).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.set(0), bank.set(2));
        assert_eq!(bank.set(1), bank.set(7));
    }

    #[test]
    fn test_from_dir_missing_path() {
        let result = ImageBank::from_dir("/nonexistent/framecast-test");
        assert!(matches!(result, Err(SourceError::Open { .. })));
    }

    #[test]
    fn test_random_feed_is_schema_valid() {
        let mut feed = RandomStateFeed;
        let state = feed.next(42);

        assert_eq!(state.state().len(), STATE_LEN);
        assert!(state.remaining_action_chunks().len() >= MIN_CHUNK_ROWS);
        assert!(state.remaining_action_chunks().len() <= MAX_CHUNK_ROWS);
        assert!(state
            .remaining_action_chunks()
            .iter()
            .all(|row| row.len() == ACTION_DIM));
        assert_eq!(state.timestamp_ns(), 42);
    }
}
