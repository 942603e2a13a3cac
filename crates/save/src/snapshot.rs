// ---------------------------------------------------------------------------
// snapshot – compressed grid snapshots with magic bytes and checksum
// ---------------------------------------------------------------------------
//
// File format (little-endian):
//   [0..4]  Magic bytes: "TRKS"
//   [4..8]  xxHash32 checksum of the payload (everything after the header)
//   [8..]   lz4 block (size-prepended) of the bitcode-encoded GridSnapshot
//
// On write: encode -> compress -> prepend header -> atomic write
// On read:  check magic -> verify checksum -> decompress -> decode -> check
//           version and grid digest

use std::fs;
use std::path::Path;

use bitcode::{Decode, Encode};
use xxhash_rust::xxh32::xxh32;

use track::kernel::{GridState, TrackGrid};
use track::state_hash::grid_digest;
use track::store::StoreError;

use crate::atomic_write::atomic_write;

/// Magic bytes identifying a track snapshot file.
pub const MAGIC: [u8; 4] = *b"TRKS";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Current [`GridSnapshot`] layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

const XXHASH_SEED: u32 = 0;

/// The grid after an edit, together with the plan that produced it.
#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct GridSnapshot {
    pub version: u32,
    pub plan_text: String,
    /// [`grid_digest`] of `grid` at capture time.
    pub digest: u32,
    pub grid: Option<GridState>,
}

impl GridSnapshot {
    pub fn capture(grid: &TrackGrid, plan_text: &str) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            plan_text: plan_text.to_string(),
            digest: grid_digest(grid),
            grid: grid.state().cloned(),
        }
    }

    /// Rebuild the grid resource this snapshot was taken from.
    pub fn restore(&self) -> TrackGrid {
        match &self.grid {
            Some(state) => TrackGrid::from_state(state.clone()),
            None => TrackGrid::default(),
        }
    }
}

/// Encode, compress and frame a snapshot.
pub fn encode_snapshot(snapshot: &GridSnapshot) -> Vec<u8> {
    let encoded = bitcode::encode(snapshot);
    let payload = lz4_flex::compress_prepend_size(&encoded);

    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&xxh32(&payload, XXHASH_SEED).to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

/// Validate and decode bytes produced by [`encode_snapshot`].
pub fn decode_snapshot(bytes: &[u8]) -> Result<GridSnapshot, StoreError> {
    if bytes.len() < HEADER_SIZE || bytes[..4] != MAGIC {
        return Err(StoreError::Decode(
            "not a track snapshot (missing TRKS header)".to_string(),
        ));
    }
    let expected = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let payload = &bytes[HEADER_SIZE..];
    let found = xxh32(payload, XXHASH_SEED);
    if found != expected {
        return Err(StoreError::ChecksumMismatch { expected, found });
    }

    let encoded = lz4_flex::decompress_size_prepended(payload)
        .map_err(|e| StoreError::Decode(format!("lz4: {e}")))?;
    let snapshot: GridSnapshot = bitcode::decode(&encoded)?;

    if snapshot.version > SNAPSHOT_VERSION {
        return Err(StoreError::VersionMismatch {
            expected_max: SNAPSHOT_VERSION,
            found: snapshot.version,
        });
    }
    let restored = grid_digest(&snapshot.restore());
    if restored != snapshot.digest {
        return Err(StoreError::ChecksumMismatch {
            expected: snapshot.digest,
            found: restored,
        });
    }
    Ok(snapshot)
}

pub fn write_snapshot(path: &Path, snapshot: &GridSnapshot) -> Result<(), StoreError> {
    atomic_write(path, &encode_snapshot(snapshot))?;
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<GridSnapshot, StoreError> {
    decode_snapshot(&fs::read(path)?)
}
