//! StreamState — the structured metadata payload carried inside a frame
//!
//! A fixed-shape numeric record: a `state` vector of exactly
//! [`STATE_LEN`] floats and a sequence of action chunk rows, each exactly
//! [`ACTION_DIM`] floats, with the outer row count bounded by
//! [`MIN_CHUNK_ROWS`]`..=`[`MAX_CHUNK_ROWS`].
//!
//! Validation happens once, at construction: the fields are private and the
//! only ways to obtain a value are [`StreamState::new`] and serde
//! deserialization, which routes through the same checks. Once a value
//! exists it is trusted everywhere downstream.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Required length of the state vector
pub const STATE_LEN: usize = 50;

/// Required length of every action chunk row
pub const ACTION_DIM: usize = 22;

/// Minimum number of action chunk rows
pub const MIN_CHUNK_ROWS: usize = 20;

/// Maximum number of action chunk rows
pub const MAX_CHUNK_ROWS: usize = 50;

/// Validated stream state payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStreamState")]
pub struct StreamState {
    state: Vec<f64>,
    remaining_action_chunks: Vec<Vec<f64>>,
    timestamp_ns: u64,
}

/// Unvalidated mirror used as the serde entry point
#[derive(Deserialize)]
struct RawStreamState {
    state: Vec<f64>,
    remaining_action_chunks: Vec<Vec<f64>>,
    timestamp_ns: u64,
}

impl TryFrom<RawStreamState> for StreamState {
    type Error = ValidationError;

    fn try_from(raw: RawStreamState) -> Result<Self, ValidationError> {
        StreamState::new(raw.state, raw.remaining_action_chunks, raw.timestamp_ns)
    }
}

impl StreamState {
    /// Validate and construct a stream state
    pub fn new(
        state: Vec<f64>,
        remaining_action_chunks: Vec<Vec<f64>>,
        timestamp_ns: u64,
    ) -> Result<Self, ValidationError> {
        if state.len() != STATE_LEN {
            return Err(ValidationError::StateLength(state.len()));
        }
        let rows = remaining_action_chunks.len();
        if !(MIN_CHUNK_ROWS..=MAX_CHUNK_ROWS).contains(&rows) {
            return Err(ValidationError::ChunkCount(rows));
        }
        for (index, row) in remaining_action_chunks.iter().enumerate() {
            if row.len() != ACTION_DIM {
                return Err(ValidationError::ChunkRowLength {
                    index,
                    len: row.len(),
                });
            }
        }

        Ok(Self {
            state,
            remaining_action_chunks,
            timestamp_ns,
        })
    }

    /// The state vector (always [`STATE_LEN`] long)
    pub fn state(&self) -> &[f64] {
        &self.state
    }

    /// Action chunk rows (each always [`ACTION_DIM`] long)
    pub fn remaining_action_chunks(&self) -> &[Vec<f64>] {
        &self.remaining_action_chunks
    }

    /// Producer timestamp in nanoseconds
    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    /// Serialize into a frame's meta object
    ///
    /// Cannot fail for a validated value, hence the infallible signature.
    pub fn to_meta(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // A struct with named fields always serializes to an object
            _ => unreachable!("StreamState serializes to a JSON object"),
        }
    }

    /// Parse and validate a frame's meta object
    pub fn from_meta(meta: &Map<String, Value>) -> Result<Self, ValidationError> {
        let value = Value::Object(meta.clone());
        let raw = serde_json::from_value::<RawStreamState>(value)
            .map_err(|e| ValidationError::Schema(e.to_string()))?;
        StreamState::try_from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good_state() -> Vec<f64> {
        (0..STATE_LEN).map(|i| i as f64).collect()
    }

    fn good_chunks(rows: usize) -> Vec<Vec<f64>> {
        (0..rows).map(|_| vec![0.0; ACTION_DIM]).collect()
    }

    #[test]
    fn test_accepts_valid_shape() {
        let state = StreamState::new(good_state(), good_chunks(50), 123).unwrap();
        assert_eq!(state.state().len(), STATE_LEN);
        assert_eq!(state.remaining_action_chunks().len(), 50);
        assert_eq!(state.timestamp_ns(), 123);
    }

    #[test]
    fn test_accepts_chunk_count_bounds() {
        assert!(StreamState::new(good_state(), good_chunks(MIN_CHUNK_ROWS), 0).is_ok());
        assert!(StreamState::new(good_state(), good_chunks(MAX_CHUNK_ROWS), 0).is_ok());
    }

    #[test]
    fn test_rejects_wrong_state_length() {
        for len in [49, 51] {
            let result = StreamState::new(vec![0.0; len], good_chunks(20), 0);
            assert_eq!(result.unwrap_err(), ValidationError::StateLength(len));
        }
    }

    #[test]
    fn test_rejects_chunk_count_out_of_bounds() {
        for rows in [MIN_CHUNK_ROWS - 1, MAX_CHUNK_ROWS + 1] {
            let result = StreamState::new(good_state(), good_chunks(rows), 0);
            assert_eq!(result.unwrap_err(), ValidationError::ChunkCount(rows));
        }
    }

    #[test]
    fn test_rejects_short_chunk_row() {
        let mut chunks = good_chunks(30);
        chunks[7] = vec![0.0; 21];

        let result = StreamState::new(good_state(), chunks, 0);
        assert_eq!(
            result.unwrap_err(),
            ValidationError::ChunkRowLength { index: 7, len: 21 }
        );
    }

    #[test]
    fn test_meta_roundtrip() {
        let state = StreamState::new(good_state(), good_chunks(22), 99).unwrap();
        let meta = state.to_meta();
        let parsed = StreamState::from_meta(&meta).unwrap();

        assert_eq!(parsed, state);
    }

    #[test]
    fn test_deserialize_enforces_shape() {
        let json = serde_json::json!({
            "state": vec![0.0; STATE_LEN],
            "remaining_action_chunks": vec![vec![0.0; 21]; 30],
            "timestamp_ns": 0,
        });
        assert!(serde_json::from_value::<StreamState>(json).is_err());
    }

    #[test]
    fn test_from_meta_rejects_missing_field() {
        let mut meta = Map::new();
        meta.insert("state".into(), serde_json::json!(vec![0.0; STATE_LEN]));

        assert!(StreamState::from_meta(&meta).is_err());
    }
}
