use super::*;
use crate::normalize::normalize;
use crate::plan::Direction;

fn builtin() -> RuleRepository {
    RuleRepository::builtin().expect("built-in rules")
}

fn compile_text(text: &str) -> CompiledRequest {
    compile(&normalize(text), &builtin())
}

fn ops_of(text: &str) -> Vec<TrackOp> {
    compile_text(text).ops
}

// ---------------------------------------------------------------------------
// Built-in phrases
// ---------------------------------------------------------------------------

#[test]
fn build_by_dimensions() {
    let compiled = compile_text("build 40 by 3");
    assert_eq!(compiled.ops, vec![TrackOp::BuildAbs { rows: 40, cols: 3 }]);
    assert!(compiled.creation_intent);
    assert!(compiled.diagnostics.is_empty(), "{:?}", compiled.diagnostics);
}

#[test]
fn build_variants() {
    assert_eq!(
        ops_of("rebuild a new track 60x5"),
        vec![TrackOp::BuildAbs { rows: 60, cols: 5 }]
    );
    assert_eq!(
        ops_of("build 25 rows"),
        vec![TrackOp::BuildAbs { rows: 25, cols: 3 }]
    );
    assert_eq!(
        ops_of("create a 30 by 4 track"),
        vec![TrackOp::BuildAbs { rows: 30, cols: 4 }]
    );
}

#[test]
fn bare_rebuild_is_a_creation_intent_without_ops() {
    let compiled = compile_text("rebuild");
    assert!(compiled.ops.is_empty());
    assert!(compiled.creation_intent);
}

#[test]
fn edits_without_build_word_are_amendments() {
    let compiled = compile_text("remove rows 5 to 8");
    assert_eq!(compiled.ops, vec![TrackOp::DeleteRows { a: 5, b: 8 }]);
    assert!(!compiled.creation_intent);
}

#[test]
fn single_row_deletion_defaults_end_to_start() {
    assert_eq!(
        ops_of("delete row 7"),
        vec![TrackOp::DeleteRows { a: 7, b: 7 }]
    );
}

#[test]
fn tile_deletion_with_column_list() {
    assert_eq!(
        ops_of("remove tiles 2 and 3 in row 12"),
        vec![TrackOp::DeleteTiles {
            cols: vec![2, 3],
            row: 12
        }]
    );
}

#[test]
fn holes_gaps_and_margins() {
    assert_eq!(
        ops_of("random holes 100%"),
        vec![TrackOp::RandomHoles { pct: 100.0 }]
    );
    assert_eq!(
        ops_of("insert 2 jump gaps"),
        vec![TrackOp::InsertJumpGaps { n: 2 }]
    );
    assert_eq!(
        ops_of("protect start 5 and end 3"),
        vec![
            TrackOp::SafeMarginStart { n: 5 },
            TrackOp::SafeMarginEnd { n: 3 }
        ]
    );
}

#[test]
fn curves_in_both_phrasings() {
    let expected = TrackOp::CurveRows {
        a: 10,
        b: 30,
        dir: Direction::Left,
        deg: 20.0,
    };
    assert_eq!(
        ops_of("curve left 20 degrees over rows 10 to 30"),
        vec![expected.clone()]
    );
    assert_eq!(ops_of("curve rows 10-30 LEFT by 20"), vec![expected]);
}

#[test]
fn s_bend_with_gain() {
    assert_eq!(
        ops_of("s-bend 15 over rows 40-80 gain 1.5"),
        vec![TrackOp::SBend {
            a: 40,
            b: 80,
            deg: 15.0,
            gain: 1.5,
            ratio: 0.5
        }]
    );
}

#[test]
fn random_slopes_with_segment_length() {
    assert_eq!(
        ops_of("random slopes \u{2212}2 to 4 degrees every 8 rows"),
        vec![TrackOp::SlopesRandomAuto {
            min_deg: -2.0,
            max_deg: 4.0,
            seg_len: 8
        }]
    );
}

#[test]
fn macros_and_fill_directives() {
    assert_eq!(
        ops_of("fork rows 10 to 20 gap 1 to 3"),
        vec![TrackOp::YSplit {
            a: 10,
            b: 20,
            gap_start: 1.0,
            gap_end: 3.0
        }]
    );
    assert_eq!(
        ops_of("rejoin rows 21-25"),
        vec![TrackOp::Rejoin {
            a: 21,
            b: 25,
            target: 0.0
        }]
    );
    assert_eq!(
        ops_of("smooth heights 2 times"),
        vec![TrackOp::SmoothHeights { passes: 2 }]
    );
    assert_eq!(ops_of("fill all"), vec![TrackOp::FillAll]);
    assert_eq!(
        ops_of("fill rows 5-6"),
        vec![TrackOp::FillRows { a: 5, b: 6 }]
    );
    assert_eq!(
        ops_of("fill tile 2 in row 4"),
        vec![TrackOp::FillTiles {
            cols: vec![2],
            row: 4
        }]
    );
}

#[test]
fn seed_phrase() {
    assert_eq!(ops_of("seed 1234"), vec![TrackOp::Seed { value: 1234 }]);
}

#[test]
fn synonyms_feed_the_matcher() {
    assert_eq!(
        ops_of("erase rows 2-3"),
        vec![TrackOp::DeleteRows { a: 2, b: 3 }]
    );
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn intents_precede_commands_regardless_of_text_order() {
    assert_eq!(
        ops_of("remove rows 1-2\nbuild 10 by 3"),
        vec![
            TrackOp::BuildAbs { rows: 10, cols: 3 },
            TrackOp::DeleteRows { a: 1, b: 2 }
        ]
    );
}

#[test]
fn repeated_matches_keep_text_order() {
    assert_eq!(
        ops_of("remove row 9 and remove row 3"),
        vec![
            TrackOp::DeleteRows { a: 9, b: 9 },
            TrackOp::DeleteRows { a: 3, b: 3 }
        ]
    );
}

// ---------------------------------------------------------------------------
// Cast failures
// ---------------------------------------------------------------------------

const CAST_RULES: &str = r#"{
    "commands": [
        {"name": "rows", "regex": "rows (\\w+)",
         "kernel": [{"op": "deleteRows", "args": {"a": "$1:int"}}]},
        {"name": "holes", "regex": "holes (\\d+)",
         "kernel": [{"op": "randomHoles", "args": {"pct": "$1:float"}}]},
        {"name": "drop", "regex": "drop(?: (\\d+))?",
         "kernel": [{"op": "deleteRows", "args": {"a": "$1:int"}}]}
    ]
}"#;

#[test]
fn cast_failure_drops_every_op_of_the_rule() {
    let rules = RuleRepository::from_json_str(CAST_RULES).unwrap();
    let compiled = compile("rows 4 rows x holes 5", &rules);
    assert_eq!(compiled.ops, vec![TrackOp::RandomHoles { pct: 5.0 }]);
    let casts: Vec<_> = compiled
        .diagnostics
        .of_kind(DiagnosticKind::MatchCast)
        .collect();
    assert_eq!(casts.len(), 1);
    assert!(casts[0].message.contains("`rows`"), "{}", casts[0].message);
}

#[test]
fn unmatched_optional_group_on_required_param_is_a_cast_failure() {
    let rules = RuleRepository::from_json_str(CAST_RULES).unwrap();
    let compiled = compile("drop", &rules);
    assert!(compiled.ops.is_empty());
    assert_eq!(
        compiled
            .diagnostics
            .of_kind(DiagnosticKind::MatchCast)
            .count(),
        1
    );
}

#[test]
fn out_of_range_seed_is_a_cast_failure() {
    let compiled = compile_text("seed 99999999999999999999");
    assert!(compiled.ops.is_empty());
    assert_eq!(
        compiled
            .diagnostics
            .of_kind(DiagnosticKind::MatchCast)
            .count(),
        1
    );
}

// ---------------------------------------------------------------------------
// Unrecognized input
// ---------------------------------------------------------------------------

#[test]
fn unknown_words_are_warnings_only() {
    let compiled = compile_text("build 40 by 3 with sparkles");
    assert_eq!(compiled.ops, vec![TrackOp::BuildAbs { rows: 40, cols: 3 }]);
    let words: Vec<_> = compiled
        .diagnostics
        .of_kind(DiagnosticKind::UnrecognizedInput)
        .map(|d| d.message.clone())
        .collect();
    assert_eq!(words.len(), 2, "{words:?}");
    assert!(words[0].contains("`with`"));
    assert!(words[1].contains("`sparkles`"));
}

#[test]
fn empty_input_compiles_to_nothing() {
    let compiled = compile_text("   \n  ");
    assert!(compiled.ops.is_empty());
    assert!(!compiled.creation_intent);
    assert!(compiled.diagnostics.is_empty());
}
