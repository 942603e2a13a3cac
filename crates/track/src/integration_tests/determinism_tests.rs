//! Identical plan text and seed must always produce the identical grid.

use crate::test_harness::TestTrack;

const SESSION: &[&str] = &[
    "build 60 by 4",
    "random holes 25%",
    "slopes -8 to 8 every 6 rows",
    "s-bend 20 degrees over rows 10 to 40 gain 1.5",
    "smooth heights 2 passes",
];

fn digest_after(seed: u64) -> (u32, String) {
    let mut track = TestTrack::new().with_seed_source(seed);
    for text in SESSION {
        track.edit(text);
    }
    (track.digest(), track.plan_text())
}

#[test]
fn test_same_session_same_grid() {
    let (a, plan_a) = digest_after(7);
    let (b, plan_b) = digest_after(7);
    assert_eq!(a, b);
    assert_eq!(plan_a, plan_b);
    assert!(plan_a.starts_with("seed(7)\n"), "{plan_a}");
}

#[test]
fn test_seed_changes_random_geometry() {
    let (a, _) = digest_after(7);
    let (b, _) = digest_after(8);
    assert_ne!(a, b);
}

#[test]
fn test_persisted_plan_reproduces_grid() {
    let mut original = TestTrack::new().with_seed_source(11);
    for text in SESSION {
        original.edit(text);
    }

    // An empty request keeps the plan as it is and re-executes it.
    let mut reloaded = TestTrack::new()
        .with_seed_source(999)
        .with_plan(&original.plan_text());
    reloaded.edit("");

    assert_eq!(reloaded.plan_text(), original.plan_text());
    assert_eq!(reloaded.digest(), original.digest());
    assert_eq!(reloaded.seed_log_len(), 0);
}

#[test]
fn test_auto_seed_is_logged_once() {
    let mut track = TestTrack::new().with_seed_source(3);
    track.edit("build 30 by 3");
    assert_eq!(track.seed_log_len(), 0);

    track.edit("random holes 10%");
    track.edit("random holes 20%");
    assert_eq!(track.seed_log_len(), 1);
    track.assert_plan_text("seed(3)\nbuildAbs(30,3)\nrandomHoles(10)\nrandomHoles(20)\n");
}

#[test]
fn test_batched_edits_match_sequential_edits() {
    let mut sequential = TestTrack::new();
    for text in SESSION {
        sequential.edit(text);
    }
    let mut batched = TestTrack::new();
    batched.edit_all(SESSION);

    assert_eq!(batched.digest(), sequential.digest());
}
