//! Integration tests using the `TestTrack` harness.
//!
//! These tests spin up a headless Bevy App with `TrackEditPlugin`, push
//! requests through the edit queue and check the persisted plan and the
//! resulting grid.

mod determinism_tests;
