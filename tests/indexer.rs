//! Frame pairing tests.

use filmgrain::GrainError;
use filmgrain::indexer::{FramePair, resolve, total_iterations};

fn pairs(total: i64, source_len: usize, grain_len: usize) -> Vec<(usize, usize)> {
    (0..total)
        .map(|iteration| {
            let FramePair { source, grain } =
                resolve(iteration, source_len, grain_len).expect("Failed to resolve");
            (source, grain)
        })
        .collect()
}

// ── Pairing ────────────────────────────────────────────────────────

#[test]
fn three_sources_two_grains_doubled() {
    let total = total_iterations(3, 2).unwrap();
    assert_eq!(total, 6);
    assert_eq!(
        pairs(total, 3, 2),
        vec![(0, 0), (1, 1), (2, 0), (0, 1), (1, 0), (2, 1)]
    );
}

#[test]
fn equal_lengths_move_in_lockstep() {
    assert_eq!(pairs(8, 4, 4), (0..8_usize).map(|i| (i % 4, i % 4)).collect::<Vec<_>>());
}

#[test]
fn pairing_repeats_after_lcm() {
    // lcm(4, 6) = 12
    let first = pairs(12, 4, 6);
    let second: Vec<_> = (12..24)
        .map(|iteration| {
            let pair = resolve(iteration, 4, 6).unwrap();
            (pair.source, pair.grain)
        })
        .collect();
    assert_eq!(first, second);

    let distinct: std::collections::HashSet<_> = first.iter().collect();
    assert_eq!(distinct.len(), 12);
}

#[test]
fn single_source_cycles_grain() {
    assert_eq!(pairs(5, 1, 3), vec![(0, 0), (0, 1), (0, 2), (0, 0), (0, 1)]);
}

// ── Ranges and periodicity ─────────────────────────────────────────

#[test]
fn indices_in_range_for_many_lengths() {
    for source_len in 1..9 {
        for grain_len in 1..9 {
            for iteration in 0..100 {
                let pair = resolve(iteration, source_len, grain_len).unwrap();
                assert!(pair.source < source_len);
                assert!(pair.grain < grain_len);

                let later = resolve(iteration + source_len as i64, source_len, grain_len).unwrap();
                assert_eq!(later.source, pair.source);
                let later = resolve(iteration + grain_len as i64, source_len, grain_len).unwrap();
                assert_eq!(later.grain, pair.grain);
            }
        }
    }
}

#[test]
fn matches_plain_modulo_for_non_negative() {
    for iteration in 0..1000_i64 {
        let pair = resolve(iteration, 7, 7).unwrap();
        assert_eq!(pair.source, (iteration % 7) as usize);
        assert_eq!(pair.grain, pair.source);
    }
}

#[test]
fn huge_lengths_resolve_without_panicking() {
    let pair = resolve(i64::MAX, usize::MAX, 1).unwrap();
    assert_eq!(pair, FramePair { source: i64::MAX as usize, grain: 0 });
    let pair = resolve(-1, usize::MAX, i64::MAX as usize).unwrap();
    assert_eq!(
        pair,
        FramePair {
            source: usize::MAX - 1,
            grain: i64::MAX as usize - 1,
        }
    );
}

#[test]
fn negative_iterations_do_not_fault() {
    let pair = resolve(-1, 3, 2).unwrap();
    assert_eq!(pair, FramePair { source: 2, grain: 1 });
    let pair = resolve(i64::MIN, 5, 3).unwrap();
    assert!(pair.source < 5 && pair.grain < 3);
}

// ── Empty sequences ────────────────────────────────────────────────

#[test]
fn empty_source_is_an_error() {
    for iteration in [0, 1, 17, -4] {
        match resolve(iteration, 0, 3) {
            Err(GrainError::EmptySequence { sequence }) => assert_eq!(sequence, "source"),
            other => panic!("Expected EmptySequence, got: {other:?}"),
        }
    }
}

#[test]
fn empty_grain_is_an_error() {
    let error = resolve(2, 3, 0).unwrap_err();
    assert!(matches!(error, GrainError::EmptySequence { sequence: "grain" }));
    assert!(error.to_string().contains("Empty sequence"));
}
